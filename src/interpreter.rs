//! The fetch-decode-execute step.
//!
//! [`tick_cycle`] runs exactly one instruction against a borrowed [`State`]
//! and reports what the host has to do through a [`Commands`] buffer. Timers
//! are decremented once per executed cycle, so the host must call it at the
//! timer rate (`consts::TIMER_HZ`) for timers to keep real time. Decoupling
//! instruction rate from timer rate would mean moving
//! [`State::update_timers`] out of the cycle and into the host loop.

use crate::consts::{FONT_BASE, FONT_GLYPH_SIZE, FRAMEBUFFER_SIZE, MAX_COMMANDS_PER_CYCLE};
use crate::parser::Instruction;
use crate::state::{State, index_1d};
use crate::{Error, Result};

/// A request from the interpreter to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Blank the presentation surface.
    ClearDisplay,
    /// Do not advance game time until a key is pressed.
    AwaitKey,
}

/// Commands emitted by one cycle. Holds at most `MAX_COMMANDS_PER_CYCLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commands {
    buffer: [Command; MAX_COMMANDS_PER_CYCLE],
    len: usize,
}

impl Default for Commands {
    fn default() -> Self {
        Self::new()
    }
}

impl Commands {
    pub fn new() -> Self {
        Commands {
            buffer: [Command::ClearDisplay; MAX_COMMANDS_PER_CYCLE],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn push(&mut self, command: Command) -> Result<()> {
        if self.len == MAX_COMMANDS_PER_CYCLE {
            return Err(Error::CommandBufferFull {
                capacity: MAX_COMMANDS_PER_CYCLE,
            });
        }
        self.buffer[self.len] = command;
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.buffer[..self.len]
    }

    pub fn contains(&self, command: Command) -> bool {
        self.as_slice().contains(&command)
    }
}

/// How a cycle that did not fault ended.
#[derive(Debug)]
pub enum StepResult {
    /// One instruction ran and timers were updated.
    Executed,
    /// Either `Error::ProgramCounterOutOfBounds` (nothing ran, timers
    /// untouched) or `Error::UnknownOpcode` (treated as a no-op, timers
    /// updated).
    Diagnosed(Error),
}

/// Resets `state` to power-on and installs the font set.
pub fn initialize(state: &mut State) {
    state.initialize();
}

/// Runs one fetch-decode-execute step.
///
/// `commands` is cleared first; on return it holds whatever the host must act
/// on. An `Err` is a bounds fault of the fetched instruction (memory, stack,
/// framebuffer or key index); the machine is left as it was apart from the
/// cleared draw flag and the recorded `opcode`.
pub fn tick_cycle(state: &mut State, commands: &mut Commands) -> Result<StepResult> {
    commands.clear();
    state.draw_flag = false;

    let pc = state.pc;
    if pc as usize > state.ram.len() - 2 {
        let error = Error::ProgramCounterOutOfBounds { pc };
        log::warn!("{error}");
        return Ok(StepResult::Diagnosed(error));
    }

    let opcode = (state.ram[pc as usize] as u16) << 8 | state.ram[pc as usize + 1] as u16;
    state.opcode = opcode;

    let result = match Instruction::from_opcode(opcode) {
        Ok(instruction) => {
            log::trace!("{pc:#06X}: {opcode:#06X} {instruction:?}");
            state.pc = execute(state, instruction, commands)?;
            StepResult::Executed
        }
        Err(error) => {
            log::warn!("{error} at {pc:#06X}");
            if unknown_opcode_advances_pc(opcode) {
                state.pc = pc + 2;
            }
            StepResult::Diagnosed(error)
        }
    };

    state.update_timers();

    Ok(result)
}

/// Unknown ALU (8XY_) and key (EX__) opcodes leave the program counter where
/// it is, so the same word is fetched again next cycle. Every other family
/// skips past it.
fn unknown_opcode_advances_pc(opcode: u16) -> bool {
    !matches!(opcode & 0xF000, 0x8000 | 0xE000)
}

/// Applies `instruction` and returns the next program counter.
fn execute(state: &mut State, instruction: Instruction, commands: &mut Commands) -> Result<u16> {
    let pc = state.pc;
    let next = pc + 2;
    let skip = pc + 4;

    let next_pc = match instruction {
        Instruction::ClearScreen => {
            commands.push(Command::ClearDisplay)?;
            state.gfx.fill(0);
            state.draw_flag = true;
            next
        }
        Instruction::ReturnFromSubroutine => state.pop_return()?,
        Instruction::MachineRoutine(address) => {
            log::debug!("ignoring machine code routine {address:#05X} at {pc:#06X}");
            next
        }
        Instruction::Jump(address) => address,
        Instruction::Call(address) => {
            state.push_return(next)?;
            address
        }
        Instruction::SkipIfEqualByte(register, value) => {
            if state.registers[register] == value { skip } else { next }
        }
        Instruction::SkipIfNotEqualByte(register, value) => {
            if state.registers[register] != value { skip } else { next }
        }
        Instruction::SkipIfRegistersEqual(register_x, register_y) => {
            if state.registers[register_x] == state.registers[register_y] {
                skip
            } else {
                next
            }
        }
        Instruction::SetRegisterToValue(register, value) => {
            state.registers[register] = value;
            next
        }
        Instruction::AddToRegister(register, value) => {
            state.registers[register] = state.registers[register].wrapping_add(value);
            next
        }
        Instruction::SetRegisterToRegisterValue(register_x, register_y) => {
            state.registers[register_x] = state.registers[register_y];
            next
        }
        Instruction::RegistersBitwiseOr(register_x, register_y) => {
            state.registers[register_x] |= state.registers[register_y];
            next
        }
        Instruction::RegistersBitwiseAnd(register_x, register_y) => {
            state.registers[register_x] &= state.registers[register_y];
            next
        }
        Instruction::RegistersBitwiseXor(register_x, register_y) => {
            state.registers[register_x] ^= state.registers[register_y];
            next
        }
        // VF is written before the result, so an operand that is VF reads the
        // new flag.
        Instruction::RegistersSumWithCarry(register_x, register_y) => {
            let carry = state.registers[register_y] > 0xFF - state.registers[register_x];
            state.registers[0xF] = carry as u8;
            state.registers[register_x] =
                state.registers[register_x].wrapping_add(state.registers[register_y]);
            next
        }
        Instruction::SubtractRegisterFromRegisterValue(register_x, register_y) => {
            let no_borrow = state.registers[register_x] > state.registers[register_y];
            state.registers[0xF] = no_borrow as u8;
            state.registers[register_x] =
                state.registers[register_x].wrapping_sub(state.registers[register_y]);
            next
        }
        Instruction::HalveRegister(register) => {
            state.registers[0xF] = state.registers[register] & 1;
            state.registers[register] /= 2;
            next
        }
        Instruction::SubtractRegisterValueFromRegister(register_x, register_y) => {
            let no_borrow = state.registers[register_y] > state.registers[register_x];
            state.registers[0xF] = no_borrow as u8;
            state.registers[register_x] =
                state.registers[register_y].wrapping_sub(state.registers[register_x]);
            next
        }
        Instruction::DoubleRegister(register) => {
            state.registers[0xF] = (state.registers[register] & 0x80 != 0) as u8;
            state.registers[register] = state.registers[register].wrapping_mul(2);
            next
        }
        Instruction::SkipIfRegistersNotEqual(register_x, register_y) => {
            if state.registers[register_x] != state.registers[register_y] {
                skip
            } else {
                next
            }
        }
        Instruction::SetIndexRegisterToValue(value) => {
            state.index_register = value;
            next
        }
        Instruction::JumpByValue(value) => value + state.registers[0] as u16,
        Instruction::SetRegisterToRandAndValue(register, value) => {
            state.registers[register] = state.random_byte() & value;
            next
        }
        Instruction::DrawSprite(register_x, register_y, rows) => {
            let x = state.registers[register_x] as usize;
            let y = state.registers[register_y] as usize;
            draw_sprite(state, x, y, rows as usize)?;
            next
        }
        Instruction::SkipIfKeyPressed(register) => {
            if state.key_pressed(state.registers[register])? { skip } else { next }
        }
        Instruction::SkipIfKeyNotPressed(register) => {
            if state.key_pressed(state.registers[register])? { next } else { skip }
        }
        Instruction::SetRegisterToDelayTimerValue(register) => {
            state.registers[register] = state.delay_timer;
            next
        }
        Instruction::WaitForKey(register) => match state.keys.iter().position(|&k| k) {
            Some(key) => {
                state.registers[register] = key as u8;
                next
            }
            None => {
                commands.push(Command::AwaitKey)?;
                pc
            }
        },
        Instruction::SetDelayTimerToRegisterValue(register) => {
            state.delay_timer = state.registers[register];
            next
        }
        Instruction::SetSoundTimerToRegisterValue(register) => {
            state.sound_timer = state.registers[register];
            next
        }
        Instruction::AddRegisterToIndexRegister(register) => {
            state.index_register = state
                .index_register
                .wrapping_add(state.registers[register] as u16);
            next
        }
        Instruction::SetIndexRegisterToSpriteForRegister(register) => {
            let character = state.registers[register] as u16;
            state.index_register = FONT_BASE + FONT_GLYPH_SIZE * character;
            next
        }
        Instruction::StoreBinaryCodedDecimalAtIndexRegisterValue(register) => {
            let num = state.registers[register];
            let i = state.index_register as usize;
            state.check_ram_range(i, 3)?;
            state.ram[i] = num / 100;
            state.ram[i + 1] = (num / 10) % 10;
            state.ram[i + 2] = num % 10;
            next
        }
        Instruction::DumpRegistersToMemoryAtIndexRegister(register) => {
            let i = state.index_register as usize;
            state.check_ram_range(i, register + 1)?;
            state.ram[i..=i + register].copy_from_slice(&state.registers[..=register]);
            next
        }
        Instruction::LoadMemoryToRegistersAtIndexRegister(register) => {
            let i = state.index_register as usize;
            state.check_ram_range(i, register + 1)?;
            state.registers[..=register].copy_from_slice(&state.ram[i..=i + register]);
            next
        }
    };

    Ok(next_pc)
}

/// XORs `rows` sprite rows from `ram[I..]` onto the framebuffer at `(x, y)`
/// and sets VF on collision.
///
/// Positions are flattened without wrapping. Every touched index is checked
/// before the first pixel flips.
fn draw_sprite(state: &mut State, x: usize, y: usize, rows: usize) -> Result<()> {
    let start = state.index_register as usize;
    state.check_ram_range(start, rows)?;

    let mut touched = Vec::with_capacity(rows * 8);
    for (yline, &sprite_row) in state.ram[start..start + rows].iter().enumerate() {
        for xline in 0..8 {
            if sprite_row & (0x80 >> xline) != 0 {
                let index = index_1d(x + xline, y + yline);
                if index >= FRAMEBUFFER_SIZE {
                    return Err(Error::FramebufferOutOfBounds { index });
                }
                touched.push(index);
            }
        }
    }

    let mut collision = false;
    for index in touched {
        if state.gfx[index] == 1 {
            collision = true;
        }
        state.gfx[index] ^= 1;
    }

    state.registers[0xF] = collision as u8;
    state.draw_flag = true;
    Ok(())
}
