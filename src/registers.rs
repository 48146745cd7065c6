use crate::error::{Error, Result};
use crate::memory::STARTING_MEMORY_BYTE;

pub const NUM_REGISTERS: usize = 16;

/// CHIP 8 can hold up to 16 return addresses
pub const STACK_DEPTH: usize = 16;

/// Index of VF, which doubles as the carry, borrow and collision flag
pub const FLAG: usize = 0xF;

/// The register file: V0 - VF, the address register I, the program counter, the call stack and
/// the two 60 Hz timers
#[derive(Clone, Debug, PartialEq)]
pub struct Registers {
    pub v: [u8; NUM_REGISTERS],
    /// address register I. 16 bits wide but only 12 of them can reach memory
    pub i: u16,
    pub pc: u16,
    sp: usize,
    stack: [u16; STACK_DEPTH],
    /// 60 Hz timer that can be set and read
    pub delay_timer: u8,
    /// 60 Hz timer that beeps whenever it is nonzero
    pub sound_timer: u8,
}

impl Registers {
    pub fn new() -> Self {
        Self::with_pc(STARTING_MEMORY_BYTE)
    }

    pub fn with_pc(pc: u16) -> Self {
        Registers {
            v: [0; NUM_REGISTERS],
            i: 0,
            pc,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
        }
    }

    /// Read Vx. `x` is a nibble pulled out of an opcode so it's always in range
    pub fn get(&self, x: u8) -> u8 {
        self.v[x as usize & 0xF]
    }

    pub fn set(&mut self, x: u8, value: u8) {
        self.v[x as usize & 0xF] = value;
    }

    /// Store `result` in Vx and then `flag` in VF, in that order, so when Vx is VF the
    /// flag is what's left behind
    pub fn set_with_flag(&mut self, x: u8, result: u8, flag: u8) {
        self.set(x, result);
        self.v[FLAG] = flag;
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG]
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.sp >= STACK_DEPTH {
            return Err(Error::StackOverflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// Number of return addresses currently on the stack
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// The return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
