use std::fmt;
use std::io;

use thiserror::Error as ThisError;

/// Everything that can go wrong inside the virtual machine, or while handing it a program
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("memory access out of bounds at address {addr:#06X}")]
    OutOfBounds { addr: usize },

    #[error("program image is too large ({size} bytes), at most {max} bytes fit at the origin")]
    ImageTooLarge { size: usize, max: usize },

    #[error("illegal instruction {opcode:#06X}")]
    IllegalInstruction { opcode: u16 },

    #[error("stack overflow: more than 16 nested subroutine calls")]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("invalid key index {index:#X}, keys are 0x0 through 0xF")]
    InvalidKeyIndex { index: usize },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to get a ROM file off disk and into the emulator
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("unable to read program image: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Vm(#[from] Error),
}

/// A runtime error together with where it happened. Once the interpreter returns a `Fault` it
/// stays faulted and hands back the same fault from every later step until it is reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub error: Error,
    /// address of the instruction that faulted
    pub pc: u16,
    /// `None` when the opcode itself could not be fetched
    pub opcode: Option<u16>,
}

impl Fault {
    pub(crate) fn new(error: Error, pc: u16, opcode: Option<u16>) -> Self {
        Fault { error, pc, opcode }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Some(opcode) => write!(
                f,
                "fault at pc {:#06X} (opcode {:#06X}): {}",
                self.pc, opcode, self.error
            ),
            None => write!(f, "fault at pc {:#06X}: {}", self.pc, self.error),
        }
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
