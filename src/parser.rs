use crate::{Error, Result};

/// A decoded CHIP-8 instruction. Register operands are indices into `V`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - clear screen
    ClearScreen,
    /// 00EE - return from subroutine
    ReturnFromSubroutine,
    /// 0NNN - machine code routine, ignored
    MachineRoutine(u16),
    /// 1NNN - jump to NNN
    Jump(u16),
    /// 2NNN - call subroutine at NNN
    Call(u16),
    /// 3XNN - skip next if VX equals NN
    SkipIfEqualByte(usize, u8),
    /// 4XNN - skip next if VX does not equal NN
    SkipIfNotEqualByte(usize, u8),
    /// 5XY0 - skip next if VX equals VY
    SkipIfRegistersEqual(usize, usize),
    /// 6XNN - set VX to NN
    SetRegisterToValue(usize, u8),
    /// 7XNN - add NN to VX, VF untouched
    AddToRegister(usize, u8),
    /// 8XY0 - set VX to value of VY
    SetRegisterToRegisterValue(usize, usize),
    /// 8XY1 - set VX | VY
    RegistersBitwiseOr(usize, usize),
    /// 8XY2 - set VX & VY
    RegistersBitwiseAnd(usize, usize),
    /// 8XY3 - set VX ^ VY
    RegistersBitwiseXor(usize, usize),
    /// 8XY4 - add VY to VX, VF = carry
    RegistersSumWithCarry(usize, usize),
    /// 8XY5 - VX = VX - VY, VF = VX > VY
    SubtractRegisterFromRegisterValue(usize, usize),
    /// 8XY6 - VX = VX / 2, VF = old LSB
    HalveRegister(usize),
    /// 8XY7 - VX = VY - VX, VF = VY > VX
    SubtractRegisterValueFromRegister(usize, usize),
    /// 8XYE - VX = VX * 2, VF = old MSB
    DoubleRegister(usize),
    /// 9XY0 - skip next if VX does not equal VY
    SkipIfRegistersNotEqual(usize, usize),
    /// ANNN - set I to NNN
    SetIndexRegisterToValue(u16),
    /// BNNN - jump to V0 + NNN
    JumpByValue(u16),
    /// CXNN - set VX to rand() & NN
    SetRegisterToRandAndValue(usize, u8),
    /// DXYN - draw an N-row sprite at (VX, VY)
    DrawSprite(usize, usize, u8),
    /// EX9E - skip next if key VX is pressed
    SkipIfKeyPressed(usize),
    /// EXA1 - skip next if key VX is not pressed
    SkipIfKeyNotPressed(usize),
    /// FX07 - set VX to delay timer value
    SetRegisterToDelayTimerValue(usize),
    /// FX0A - wait for a key press, store it in VX
    WaitForKey(usize),
    /// FX15 - set delay timer to VX
    SetDelayTimerToRegisterValue(usize),
    /// FX18 - set sound timer to VX
    SetSoundTimerToRegisterValue(usize),
    /// FX1E - add VX to I
    AddRegisterToIndexRegister(usize),
    /// FX29 - set I to location of sprite for character in VX
    SetIndexRegisterToSpriteForRegister(usize),
    /// FX33 - store binary coded decimal of VX at I, I+1, I+2
    StoreBinaryCodedDecimalAtIndexRegisterValue(usize),
    /// FX55 - dump registers V0 to VX in memory, starting from I
    DumpRegistersToMemoryAtIndexRegister(usize),
    /// FX65 - load memory starting from I into V0 to VX
    LoadMemoryToRegistersAtIndexRegister(usize),
}

impl Instruction {
    /// Decodes one instruction.
    ///
    /// The top nibble selects the family. Families 0, 8 and E are further
    /// split on the low nibble and family F on the low byte; every other
    /// family ignores the remaining bits, so `5XY3` still decodes as `5XY0`.
    pub fn from_opcode(opcode: u16) -> Result<Instruction> {
        let x = ((opcode & 0x0F00) >> 8) as usize;
        let y = ((opcode & 0x00F0) >> 4) as usize;
        let n = (opcode & 0x000F) as u8;
        let byte_value = (opcode & 0x00FF) as u8;
        let address = opcode & 0x0FFF;

        let instruction = match opcode & 0xF000 {
            0x0000 => match n {
                0x0 => Instruction::ClearScreen,
                0xE => Instruction::ReturnFromSubroutine,
                _ => Instruction::MachineRoutine(address),
            },
            0x1000 => Instruction::Jump(address),
            0x2000 => Instruction::Call(address),
            0x3000 => Instruction::SkipIfEqualByte(x, byte_value),
            0x4000 => Instruction::SkipIfNotEqualByte(x, byte_value),
            0x5000 => Instruction::SkipIfRegistersEqual(x, y),
            0x6000 => Instruction::SetRegisterToValue(x, byte_value),
            0x7000 => Instruction::AddToRegister(x, byte_value),
            0x8000 => match n {
                0x0 => Instruction::SetRegisterToRegisterValue(x, y),
                0x1 => Instruction::RegistersBitwiseOr(x, y),
                0x2 => Instruction::RegistersBitwiseAnd(x, y),
                0x3 => Instruction::RegistersBitwiseXor(x, y),
                0x4 => Instruction::RegistersSumWithCarry(x, y),
                0x5 => Instruction::SubtractRegisterFromRegisterValue(x, y),
                0x6 => Instruction::HalveRegister(x),
                0x7 => Instruction::SubtractRegisterValueFromRegister(x, y),
                0xE => Instruction::DoubleRegister(x),
                _ => return Err(Error::UnknownOpcode { opcode }),
            },
            0x9000 => Instruction::SkipIfRegistersNotEqual(x, y),
            0xA000 => Instruction::SetIndexRegisterToValue(address),
            0xB000 => Instruction::JumpByValue(address),
            0xC000 => Instruction::SetRegisterToRandAndValue(x, byte_value),
            0xD000 => Instruction::DrawSprite(x, y, n),
            0xE000 => match n {
                0xE => Instruction::SkipIfKeyPressed(x),
                0x1 => Instruction::SkipIfKeyNotPressed(x),
                _ => return Err(Error::UnknownOpcode { opcode }),
            },
            0xF000 => match byte_value {
                0x07 => Instruction::SetRegisterToDelayTimerValue(x),
                0x0A => Instruction::WaitForKey(x),
                0x15 => Instruction::SetDelayTimerToRegisterValue(x),
                0x18 => Instruction::SetSoundTimerToRegisterValue(x),
                0x1E => Instruction::AddRegisterToIndexRegister(x),
                0x29 => Instruction::SetIndexRegisterToSpriteForRegister(x),
                0x33 => Instruction::StoreBinaryCodedDecimalAtIndexRegisterValue(x),
                0x55 => Instruction::DumpRegistersToMemoryAtIndexRegister(x),
                0x65 => Instruction::LoadMemoryToRegistersAtIndexRegister(x),
                _ => return Err(Error::UnknownOpcode { opcode }),
            },
            _ => return Err(Error::UnknownOpcode { opcode }),
        };

        Ok(instruction)
    }
}
