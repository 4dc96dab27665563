pub const SCREEN_WIDTH: u8 = 64;
pub const SCREEN_HEIGHT: u8 = 32;
pub const FRAMEBUFFER_SIZE: usize = SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize;

pub const TOTAL_RAM_SIZE: u16 = 4096;
pub const INITIAL_PC: u16 = 0x200;
/// Largest program that fits between `INITIAL_PC` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = (TOTAL_RAM_SIZE - INITIAL_PC) as usize;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const KEY_COUNT: usize = 16;

/// Address of glyph `0`; glyph `n` lives at `FONT_BASE + n * FONT_GLYPH_SIZE`.
pub const FONT_BASE: u16 = 0x000;
pub const FONT_GLYPH_SIZE: u16 = 5;

/// No instruction emits more than this many host commands in one cycle.
pub const MAX_COMMANDS_PER_CYCLE: usize = 2;

/// Seed installed into the machine's generator on every initialization.
pub const RNG_SEED: u64 = 0;

/// Cycles and timers share one cadence: 60 Hz.
pub const TIMER_HZ: u32 = 60;

pub const FONT_DATA: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
