use std::convert::TryFrom;
use std::fmt;

use crate::error::Error;

/// The CHIP 8 instruction set, decoded once per cycle from the raw 16 bit opcode.
/// Register operands are nibbles, so they're guaranteed to be between 0x0 and 0xF.
/// Addresses are the low 12 bits of the opcode
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Op {
    // 00E0 	Display 	disp_clear() 	Clears the screen.
    DispClear,
    // 00EE 	Flow 	return; 	Returns from a subroutine.
    Return,

    // 1NNN 	Flow 	goto NNN;
    Goto(u16),
    // 2NNN 	Flow 	*(0xNNN)()
    GotoSubRtn(u16),

    // 3XNN 	Cond 	if(Vx==NN)
    CondVxEq(u8, u8),
    // 4XNN 	Cond 	if(Vx!=NN)
    CondVxNe(u8, u8),
    // 5XY0 	Cond 	if(Vx==Vy)
    CondVxVyEq(u8, u8),

    // 6XNN 	Const 	Vx = NN
    ConstSetVx(u8, u8),
    // 7XNN 	Const 	Vx += NN, carry flag untouched
    ConstAddVx(u8, u8),

    // 8XY0 - 8XYE
    AssignVyToVx(u8, u8),
    BitOpOr(u8, u8),
    BitOpAnd(u8, u8),
    BitOpXor(u8, u8),
    MathVxAddVy(u8, u8),
    MathVxMinusVy(u8, u8),
    BitOpRtShift(u8, u8),
    MathVyMinusVx(u8, u8),
    BitOpLftShift(u8, u8),

    // 9XY0 	Cond 	if(Vx!=Vy)
    CondVxVyNe(u8, u8),

    // ANNN 	MEM 	I = NNN
    MemSetI(u16),
    // BNNN 	Flow 	PC = V0 + NNN
    GotoPlusV0(u16),
    // CXNN 	Rand 	Vx = rand() & NN
    Rand(u8, u8),
    // DXYN 	Disp 	draw(Vx, Vy, N)
    DispDraw(u8, u8, u8),

    // EX9E, EXA1
    KeyOpEqVx(u8),
    KeyOpNeVx(u8),

    // FX07 - FX65
    DelayGet(u8),
    KeyOpGet(u8),
    DelaySet(u8),
    SoundSet(u8),
    MemIPlusEqVx(u8),
    MemISetSprite(u8),
    Bcd(u8),
    RegDump(u8),
    RegLoad(u8),
}

impl Op {
    /// Returns true for the ops that change what's on the screen, so a host only needs to redraw
    /// after one of these
    pub fn is_display_op(&self) -> bool {
        matches!(self, Op::DispClear | Op::DispDraw(..))
    }
}

impl TryFrom<u16> for Op {
    type Error = Error;

    fn try_from(item: u16) -> Result<Self, Self::Error> {
        let mask = 0xF;

        // these are the 4 nibbles of item, where nibb_1 is the MSB and nibb_4 is the LSB
        let nibb_1 = ((item >> 12) & mask) as u8;
        let nibb_2 = ((item >> 8) & mask) as u8;
        let nibb_3 = ((item >> 4) & mask) as u8;
        let nibb_4 = (item & mask) as u8;

        let addr = item & 0x0FFF;
        let byte = (item & 0x00FF) as u8;

        let op = match [nibb_1, nibb_2, nibb_3, nibb_4] {
            [0x0, 0x0, 0xE, 0x0] => Op::DispClear,
            [0x0, 0x0, 0xE, 0xE] => Op::Return,
            [0x1, ..] => Op::Goto(addr),
            [0x2, ..] => Op::GotoSubRtn(addr),
            [0x3, x, ..] => Op::CondVxEq(x, byte),
            [0x4, x, ..] => Op::CondVxNe(x, byte),
            [0x5, x, y, 0x0] => Op::CondVxVyEq(x, y),
            [0x6, x, ..] => Op::ConstSetVx(x, byte),
            [0x7, x, ..] => Op::ConstAddVx(x, byte),
            [0x8, x, y, n] => match n {
                0x0 => Op::AssignVyToVx(x, y),
                0x1 => Op::BitOpOr(x, y),
                0x2 => Op::BitOpAnd(x, y),
                0x3 => Op::BitOpXor(x, y),
                0x4 => Op::MathVxAddVy(x, y),
                0x5 => Op::MathVxMinusVy(x, y),
                0x6 => Op::BitOpRtShift(x, y),
                0x7 => Op::MathVyMinusVx(x, y),
                0xE => Op::BitOpLftShift(x, y),
                _ => return Err(Error::IllegalInstruction { opcode: item }),
            },
            [0x9, x, y, 0x0] => Op::CondVxVyNe(x, y),
            [0xA, ..] => Op::MemSetI(addr),
            [0xB, ..] => Op::GotoPlusV0(addr),
            [0xC, x, ..] => Op::Rand(x, byte),
            [0xD, x, y, n] => Op::DispDraw(x, y, n),
            [0xE, x, 0x9, 0xE] => Op::KeyOpEqVx(x),
            [0xE, x, 0xA, 0x1] => Op::KeyOpNeVx(x),
            [0xF, x, n3, n4] => match [n3, n4] {
                [0x0, 0x7] => Op::DelayGet(x),
                [0x0, 0xA] => Op::KeyOpGet(x),
                [0x1, 0x5] => Op::DelaySet(x),
                [0x1, 0x8] => Op::SoundSet(x),
                [0x1, 0xE] => Op::MemIPlusEqVx(x),
                [0x2, 0x9] => Op::MemISetSprite(x),
                [0x3, 0x3] => Op::Bcd(x),
                [0x5, 0x5] => Op::RegDump(x),
                [0x6, 0x5] => Op::RegLoad(x),
                _ => return Err(Error::IllegalInstruction { opcode: item }),
            },
            // 0NNN calls RCA 1802 machine code, which there's no way to run here
            _ => return Err(Error::IllegalInstruction { opcode: item }),
        };

        Ok(op)
    }
}

/// Disassembles the op into the usual CHIP-8 assembler mnemonics
impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Op::DispClear => write!(f, "CLS"),
            Op::Return => write!(f, "RET"),
            Op::Goto(addr) => write!(f, "JP {:#05X}", addr),
            Op::GotoSubRtn(addr) => write!(f, "CALL {:#05X}", addr),
            Op::CondVxEq(x, kk) => write!(f, "SE V{:X}, {:#04X}", x, kk),
            Op::CondVxNe(x, kk) => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            Op::CondVxVyEq(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            Op::ConstSetVx(x, kk) => write!(f, "LD V{:X}, {:#04X}", x, kk),
            Op::ConstAddVx(x, kk) => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Op::AssignVyToVx(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Op::BitOpOr(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            Op::BitOpAnd(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Op::BitOpXor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Op::MathVxAddVy(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Op::MathVxMinusVy(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Op::BitOpRtShift(x, y) => write!(f, "SHR V{:X}, V{:X}", x, y),
            Op::MathVyMinusVx(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Op::BitOpLftShift(x, y) => write!(f, "SHL V{:X}, V{:X}", x, y),
            Op::CondVxVyNe(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            Op::MemSetI(addr) => write!(f, "LD I, {:#05X}", addr),
            Op::GotoPlusV0(addr) => write!(f, "JP V0, {:#05X}", addr),
            Op::Rand(x, kk) => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Op::DispDraw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Op::KeyOpEqVx(x) => write!(f, "SKP V{:X}", x),
            Op::KeyOpNeVx(x) => write!(f, "SKNP V{:X}", x),
            Op::DelayGet(x) => write!(f, "LD V{:X}, DT", x),
            Op::KeyOpGet(x) => write!(f, "LD V{:X}, K", x),
            Op::DelaySet(x) => write!(f, "LD DT, V{:X}", x),
            Op::SoundSet(x) => write!(f, "LD ST, V{:X}", x),
            Op::MemIPlusEqVx(x) => write!(f, "ADD I, V{:X}", x),
            Op::MemISetSprite(x) => write!(f, "LD F, V{:X}", x),
            Op::Bcd(x) => write!(f, "LD B, V{:X}", x),
            Op::RegDump(x) => write!(f, "LD [I], V{:X}", x),
            Op::RegLoad(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
