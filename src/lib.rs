pub mod chip_core;
pub mod config;
pub mod consts;
pub mod display;
pub mod interpreter;
pub mod parser;
pub mod state;

/// Everything that can go wrong while loading or running a program.
///
/// `ProgramCounterOutOfBounds` and `UnknownOpcode` are diagnoses: the cycle
/// that produced them still completed (see [`interpreter::StepResult`]).
/// The remaining variants are faults that stop the offending instruction
/// before it mutates the machine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("program counter is out of memory bounds: {pc:#06X}")]
    ProgramCounterOutOfBounds { pc: u16 },

    #[error("unknown opcode: {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("framebuffer access out of bounds at index {index}")]
    FramebufferOutOfBounds { index: usize },

    #[error("stack overflow: call depth exceeds {depth} entries")]
    StackOverflow { depth: usize },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("key index {key:#04X} is not a valid key")]
    InvalidKey { key: usize },

    #[error("command buffer is full ({capacity} commands)")]
    CommandBufferFull { capacity: usize },

    #[error("program is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
