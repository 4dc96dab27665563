use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::consts::{
    FONT_BASE, FONT_DATA, FRAMEBUFFER_SIZE, INITIAL_PC, KEY_COUNT, MAX_PROGRAM_SIZE,
    REGISTER_COUNT, RNG_SEED, SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE, TOTAL_RAM_SIZE,
};
use crate::{Error, Result};

/// Flat framebuffer index of pixel `(x, y)`. No wrapping is applied, so an
/// `x` past the right edge lands on the following row.
pub fn index_1d(x: usize, y: usize) -> usize {
    x + y * SCREEN_WIDTH as usize
}

/// The complete mutable machine: memory, registers, stack, timers,
/// framebuffer and key states.
///
/// The host owns it for its whole lifetime and lends it to
/// [`crate::interpreter::tick_cycle`] once per cycle.
#[derive(Clone, Debug)]
pub struct State {
    pub ram: [u8; TOTAL_RAM_SIZE as usize],
    pub registers: [u8; REGISTER_COUNT],
    pub index_register: u16,
    pub pc: u16,
    pub stack: [u16; STACK_SIZE],
    /// Number of valid entries in `stack`.
    pub sp: usize,
    /// One byte per pixel, always 0 or 1.
    pub gfx: [u8; FRAMEBUFFER_SIZE],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub keys: [bool; KEY_COUNT],
    pub draw_flag: bool,
    /// Last fetched instruction.
    pub opcode: u16,
    rng: StdRng,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> Self {
        let mut state = State {
            ram: [0; _],
            registers: [0; _],
            index_register: 0,
            pc: INITIAL_PC,
            stack: [0; _],
            sp: 0,
            gfx: [0; _],
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; _],
            draw_flag: false,
            opcode: 0,
            rng: StdRng::seed_from_u64(RNG_SEED),
        };
        state.initialize();
        state
    }

    /// Resets the machine to its power-on state and installs the font set.
    ///
    /// The generator is reseeded as well, so calling this twice leaves the
    /// machine exactly as calling it once.
    pub fn initialize(&mut self) {
        self.pc = INITIAL_PC;
        self.opcode = 0;
        self.index_register = 0;
        self.sp = 0;
        self.gfx.fill(0);
        self.draw_flag = false;
        self.stack.fill(0);
        self.registers.fill(0);
        self.ram.fill(0);

        let font_start = FONT_BASE as usize;
        self.ram[font_start..font_start + FONT_DATA.len()].copy_from_slice(&FONT_DATA);

        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keys.fill(false);
        self.rng = StdRng::seed_from_u64(RNG_SEED);

        log::debug!("machine initialized, pc={:#06X}", self.pc);
    }

    /// Copies `program` into memory starting at `INITIAL_PC`.
    ///
    /// Memory is left untouched when the program does not fit.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        let start = INITIAL_PC as usize;
        let end = start + program.len();
        self.ram[start..end].copy_from_slice(program);
        log::info!("loaded {} program bytes at {:#06X}", program.len(), start);
        Ok(())
    }

    /// Reads a ROM image in full and loads it. Returns the number of bytes
    /// loaded.
    pub fn load_program_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        log::info!("read {} bytes from '{}'", buffer.len(), path.display());
        self.load_program(&buffer)?;
        Ok(buffer.len())
    }

    pub fn is_draw_flag_set(&self) -> bool {
        self.draw_flag
    }

    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<()> {
        let slot = self
            .keys
            .get_mut(key)
            .ok_or(Error::InvalidKey { key })?;
        *slot = pressed;
        Ok(())
    }

    pub fn key_pressed(&self, key: u8) -> Result<bool> {
        self.keys
            .get(key as usize)
            .copied()
            .ok_or(Error::InvalidKey { key: key as usize })
    }

    /// Pixel at `(x, y)`, or `None` outside the 64x32 screen.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= SCREEN_WIDTH as usize || y >= SCREEN_HEIGHT as usize {
            return None;
        }
        Some(self.gfx[index_1d(x, y)])
    }

    /// Fails unless every address in `start..start + len` is inside memory.
    pub fn check_ram_range(&self, start: usize, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let last = start + len - 1;
        if last >= self.ram.len() {
            return Err(Error::MemoryOutOfBounds { address: last });
        }
        Ok(())
    }

    pub fn push_return(&mut self, address: u16) -> Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(Error::StackOverflow { depth: STACK_SIZE });
        }
        self.stack[self.sp] = address;
        self.sp += 1;
        Ok(())
    }

    pub fn pop_return(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// Decrements each nonzero timer by one.
    pub fn update_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    /// Next byte from the machine's own generator, in `0..=254`.
    pub fn random_byte(&mut self) -> u8 {
        self.rng.random_range(0..255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_installs_font_and_resets_pc() {
        let state = State::new();
        assert_eq!(state.ram[..80], FONT_DATA);
        assert!(state.ram[80..].iter().all(|&b| b == 0));
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
        assert!(!state.draw_flag);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut state = State::new();
        state.registers[3] = 9;
        state.ram[0x300] = 0xAB;
        state.gfx[17] = 1;
        state.pc = 0x456;
        state.delay_timer = 4;
        state.keys[2] = true;
        state.push_return(0x222).unwrap();
        state.random_byte();

        state.initialize();
        let mut once = state.clone();
        state.initialize();

        assert_eq!(state.ram, once.ram);
        assert_eq!(state.registers, [0; REGISTER_COUNT]);
        assert_eq!(state.gfx, [0; FRAMEBUFFER_SIZE]);
        assert_eq!(state.stack, [0; STACK_SIZE]);
        assert_eq!(state.sp, 0);
        assert_eq!(state.pc, INITIAL_PC);
        assert_eq!(state.delay_timer, 0);
        assert_eq!(state.keys, [false; KEY_COUNT]);
        assert_eq!(state.random_byte(), once.random_byte());
    }

    #[test]
    fn test_load_program_at_initial_pc() {
        let mut state = State::new();
        state.load_program(&[0x12, 0x34, 0x56]).unwrap();
        assert_eq!(state.ram[0x200..0x203], [0x12, 0x34, 0x56]);
        assert_eq!(state.ram[0x203], 0);
    }

    #[test]
    fn test_load_program_fills_memory_exactly() {
        let mut state = State::new();
        let program = vec![0xAA; MAX_PROGRAM_SIZE];
        state.load_program(&program).unwrap();
        assert_eq!(state.ram[TOTAL_RAM_SIZE as usize - 1], 0xAA);
    }

    #[test]
    fn test_load_program_too_large_leaves_memory_untouched() {
        let mut state = State::new();
        let program = vec![0xAA; MAX_PROGRAM_SIZE + 1];
        let err = state.load_program(&program).unwrap_err();
        assert!(matches!(
            err,
            Error::ProgramTooLarge { size, max_size } if size == 3585 && max_size == 3584
        ));
        assert!(state.ram[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_program_file() {
        let path = std::env::temp_dir().join(format!("chip8vm-load-{}.ch8", std::process::id()));
        std::fs::write(&path, [0x00, 0xE0, 0x12, 0x00]).unwrap();

        let mut state = State::new();
        let loaded = state.load_program_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, 4);
        assert_eq!(state.ram[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let mut state = State::new();
        let err = state
            .load_program_file("/nonexistent/chip8vm/rom.ch8")
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_stack_push_pop_and_limits() {
        let mut state = State::new();
        assert!(matches!(state.pop_return(), Err(Error::StackUnderflow)));

        for i in 0..STACK_SIZE as u16 {
            state.push_return(0x200 + i * 2).unwrap();
        }
        assert!(matches!(
            state.push_return(0x300),
            Err(Error::StackOverflow { depth: 16 })
        ));
        assert_eq!(state.pop_return().unwrap(), 0x21E);
        assert_eq!(state.sp, 15);
    }

    #[test]
    fn test_ram_bounds() {
        let state = State::new();
        assert!(state.check_ram_range(4094, 2).is_ok());
        assert!(state.check_ram_range(4096, 0).is_ok());
        assert!(matches!(
            state.check_ram_range(4094, 3),
            Err(Error::MemoryOutOfBounds { address: 4096 })
        ));
        assert!(matches!(
            state.check_ram_range(0, 4097),
            Err(Error::MemoryOutOfBounds { address: 4096 })
        ));
    }

    #[test]
    fn test_keys() {
        let mut state = State::new();
        state.set_key(0xF, true).unwrap();
        assert!(state.key_pressed(0xF).unwrap());
        assert!(!state.key_pressed(0).unwrap());
        assert!(matches!(state.key_pressed(16), Err(Error::InvalidKey { key: 16 })));
        assert!(state.set_key(16, true).is_err());
        assert!(matches!(
            state.set_key(256, true),
            Err(Error::InvalidKey { key: 256 })
        ));
        assert!(!state.keys[0]);
    }

    #[test]
    fn test_timers_stop_at_zero() {
        let mut state = State::new();
        state.delay_timer = 1;
        state.sound_timer = 2;
        state.update_timers();
        assert_eq!((state.delay_timer, state.sound_timer), (0, 1));
        state.update_timers();
        state.update_timers();
        assert_eq!((state.delay_timer, state.sound_timer), (0, 0));
    }

    #[test]
    fn test_random_bytes_are_reproducible() {
        let mut a = State::new();
        let mut b = State::new();
        let first: Vec<u8> = (0..32).map(|_| a.random_byte()).collect();
        let second: Vec<u8> = (0..32).map(|_| b.random_byte()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|&n| n < 255));
    }

    #[test]
    fn test_pixel_and_index() {
        let mut state = State::new();
        assert_eq!(index_1d(3, 2), 131);
        state.gfx[index_1d(63, 31)] = 1;
        assert_eq!(state.pixel(63, 31), Some(1));
        assert_eq!(state.pixel(64, 0), None);
        assert_eq!(state.pixel(0, 32), None);
    }
}
