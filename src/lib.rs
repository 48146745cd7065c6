//! A CHIP-8 virtual machine. The crate is only the interpreter: memory, registers, timers and
//! the fetch/decode/execute loop. Whatever hosts it supplies a window, input and sound, and talks
//! to the [`Emulator`] through a handful of calls made once per frame
#[macro_use]
extern crate slog;

// # Interpreter
// * 4096 (0x1000) bytes of memory
// * interpreter exists in the first 512 (0x200) bytes, the hex font is stored at its very start
// * 16 8-bit registers: V0 - VF
// * VF if used is the carry flag in addition operations, "no borrow" flag in subtraction and
// the shifted out bit in shifts. In draw operations VF is set to denote pixel collision
// * the address register I is 16 bits wide
// * the stack is only used to store return addresses when subroutines are called, 16 deep

// # Timers
// * two timers running at 60 hertz, no matter how fast instructions run
//  - delay timer is used for events, it can be set and read
//  - sound timer beeps when its value is nonzero

// # Input
// there is a 16 symbol hex keyboard with values 0 - F. There are 3 opcodes that deal with handling input
//  - one skips an instruction if a specific key is pressed
//  - one skips an instruction if a specific key is NOT pressed
//  - waits for a key press and stores it in a register once it detects it

// # Graphics
// 64x32 pixels

use std::cmp;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slog::Logger;

mod config;
mod error;
pub mod graphics;
mod keyboard;
mod logging;
pub mod memory;
mod op;
pub mod registers;
pub mod timer;


pub use config::{
    Config, Quirks, DEFAULT_INSTRUCTIONS_PER_SECOND, MAX_INSTRUCTIONS_PER_SECOND,
};
pub use error::{Error, Fault, LoadError, Result};
pub use graphics::{Graphics, HEIGHT, WIDTH};
pub use keyboard::{AsKeyboard, Key, KeyWait, Keypad, NUM_KEYS};
pub use logging::{discard_logger, terminal_logger};
pub use memory::{Memory, STARTING_MEMORY_BYTE};
pub use op::Op;
pub use registers::Registers;
pub use sloggers::types::Severity;
pub use timer::{Schedule, TimerDriver, TIMER_HZ};

use registers::FLAG;

/// Where the interpreter is in its fetch/decode/execute cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CpuState {
    /// ready to fetch the instruction at PC
    Fetching,
    /// in the middle of an instruction; only ever seen from inside `execute`
    Executing,
    /// blocked on FX0A until a key goes down. Timers keep running
    WaitingForKey(KeyWait),
    /// stopped at the host's request
    Halted,
    /// stopped on an error. Nothing runs again until the program is reset or reloaded
    Faulted(Fault),
}

/// The whole virtual machine. All state lives here, so any number of them can exist side by side
pub struct Emulator {
    memory: Memory,
    regs: Registers,
    graphics: Graphics,
    keypad: Keypad,
    state: CpuState,
    timers: TimerDriver,
    cpu_clock: Schedule,
    config: Config,
    rng: StdRng,
    // last program image loaded, kept around for `reset`
    program: Vec<u8>,
    // set by ops that change the screen, cleared by `take_redraw`
    redraw: bool,
    logger: Logger,
}

impl Emulator {
    /// An emulator with the default configuration and nothing loaded. Pass `None` to discard
    /// log output
    pub fn new(logger: Option<Logger>) -> Self {
        let config = Config::default();
        let rng = StdRng::from_entropy();
        Self::build(config, rng, logger)
    }

    pub fn with_config(config: Config, logger: Option<Logger>) -> Result<Self> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::build(config, rng, logger))
    }

    /// Read the ROM at `path` and load it with the default configuration
    pub fn with_game_file<P: AsRef<Path>>(
        path: P,
        logger: Option<Logger>,
    ) -> std::result::Result<Self, LoadError> {
        let program = fs::read(path)?;
        let mut emulator = Self::new(logger);
        emulator.load_program(&program)?;
        Ok(emulator)
    }

    fn build(config: Config, rng: StdRng, logger: Option<Logger>) -> Self {
        let logger = logger.unwrap_or_else(discard_logger);
        let cpu_clock = Schedule::from_hz(config.instructions_per_second);

        Emulator {
            memory: Memory::new(),
            regs: Registers::with_pc(config.origin),
            graphics: Graphics::new(),
            keypad: Keypad::new(),
            state: CpuState::Fetching,
            timers: TimerDriver::new(),
            cpu_clock,
            config,
            rng,
            program: Vec::new(),
            redraw: false,
            logger,
        }
    }

    /// Load a raw program image at the configured origin. The machine is put back in its
    /// power-on state first, so this also recovers from a fault. An image that doesn't fit is
    /// rejected before anything changes
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        let mut memory = Memory::new();
        if let Err(e) = memory.load_program(program, self.config.origin) {
            error!(self.logger, "rejected program image"; "size" => program.len(), "error" => %e);
            return Err(e);
        }

        self.power_on(memory);
        self.program = program.to_vec();
        info!(self.logger, "loaded program";
            "size" => program.len(),
            "origin" => format!("{:#06X}", self.config.origin));
        Ok(())
    }

    /// Put the machine back to how it was right after the last `load_program`
    pub fn reset(&mut self) -> Result<()> {
        let mut memory = Memory::new();
        memory.load_program(&self.program, self.config.origin)?;
        self.power_on(memory);
        info!(self.logger, "reset");
        Ok(())
    }

    fn power_on(&mut self, memory: Memory) {
        self.memory = memory;
        self.regs = Registers::with_pc(self.config.origin);
        self.graphics.clear();
        self.redraw = true;
        self.state = CpuState::Fetching;
        self.timers = TimerDriver::new();
        self.cpu_clock.reset();
    }

    /// Stop running. Takes effect between instructions, and has no effect on a faulted machine
    pub fn halt(&mut self) {
        if let CpuState::Faulted(_) = self.state {
            return;
        }
        info!(self.logger, "halted"; "pc" => format!("{:#06X}", self.regs.pc));
        self.state = CpuState::Halted;
    }

    /// Run a single instruction. Returns the op that completed, or `None` if nothing did because
    /// the machine is halted or waiting for a key.
    ///
    /// A fault is returned from the cycle that caused it and from every cycle after
    pub fn cycle(&mut self) -> std::result::Result<Option<Op>, Fault> {
        match &mut self.state {
            CpuState::Faulted(fault) => return Err(fault.clone()),
            CpuState::Halted => return Ok(None),
            CpuState::WaitingForKey(wait) => {
                let register = wait.register;
                return match wait.poll(&self.keypad) {
                    Some(key) => {
                        self.regs.set(register, key);
                        self.state = CpuState::Fetching;
                        debug!(self.logger, "key wait over"; "key" => key, "register" => register);
                        Ok(Some(Op::KeyOpGet(register)))
                    }
                    None => Ok(None),
                };
            }
            CpuState::Fetching | CpuState::Executing => {}
        }

        let pc = self.regs.pc;
        let opcode = match self.memory.read_word(pc as usize) {
            Ok(opcode) => opcode,
            Err(e) => return Err(self.enter_fault(e, pc, None)),
        };
        let op = match Op::try_from(opcode) {
            Ok(op) => op,
            Err(e) => return Err(self.enter_fault(e, pc, Some(opcode))),
        };

        trace!(self.logger, "execute";
            "pc" => format!("{:#06X}", pc),
            "opcode" => format!("{:#06X}", opcode),
            "op" => %op);

        self.state = CpuState::Executing;
        if let Err(e) = self.execute(op) {
            self.regs.pc = pc;
            return Err(self.enter_fault(e, pc, Some(opcode)));
        }
        if self.state == CpuState::Executing {
            self.state = CpuState::Fetching;
        }
        if op.is_display_op() {
            self.redraw = true;
        }

        Ok(Some(op))
    }

    fn enter_fault(&mut self, error: Error, pc: u16, opcode: Option<u16>) -> Fault {
        let fault = Fault::new(error, pc, opcode);
        error!(self.logger, "interpreter faulted"; "fault" => %fault);
        self.state = CpuState::Faulted(fault.clone());
        fault
    }

    /// One cycle, reporting whether a new instruction ran. The cycle that ends a key wait
    /// finishes FX0A rather than running anything new, so it doesn't count
    fn step(&mut self) -> std::result::Result<bool, Fault> {
        let resuming = matches!(self.state, CpuState::WaitingForKey(_));
        Ok(self.cycle()?.is_some() && !resuming)
    }

    /// Run up to `n` cycles back to back, without touching the timers. Returns how many
    /// instructions were started. FX0A counts once, however long it waits
    pub fn run_instructions(&mut self, n: usize) -> std::result::Result<usize, Fault> {
        let mut executed = 0;
        for _ in 0..n {
            if self.state == CpuState::Halted {
                break;
            }
            if self.step()? {
                executed += 1;
            }
        }
        Ok(executed)
    }

    /// Run everything due between now and the next 60 Hz timer tick, including that tick
    pub fn run_frame(&mut self) -> std::result::Result<usize, Fault> {
        let until_tick = self.timers.schedule().until_next();
        self.update(until_tick)
    }

    /// Let `elapsed` of wall clock time pass. Instructions run at the configured rate and the
    /// timers tick at 60 Hz, interleaved in the order they fall due. Waiting on a key only holds
    /// up instructions, the timers carry on. Returns how many instructions completed
    pub fn update(&mut self, elapsed: Duration) -> std::result::Result<usize, Fault> {
        if let CpuState::Faulted(fault) = &self.state {
            return Err(fault.clone());
        }

        let mut remaining = elapsed;
        let mut executed = 0;
        while self.state != CpuState::Halted {
            let next = cmp::min(
                self.cpu_clock.until_next(),
                self.timers.schedule().until_next(),
            );
            if next > remaining {
                self.cpu_clock.advance(remaining);
                self.timers.schedule_mut().advance(remaining);
                break;
            }
            self.cpu_clock.advance(next);
            self.timers.schedule_mut().advance(next);
            remaining -= next;

            if self.timers.schedule_mut().take_due() {
                TimerDriver::tick(&mut self.regs);
            }
            if self.cpu_clock.take_due() && self.step()? {
                executed += 1;
            }
        }

        Ok(executed)
    }

    /// Apply the effect of `op`. Anything that can fail is checked before state changes, so on
    /// error the machine is exactly as it was apart from PC, which `cycle` puts back
    fn execute(&mut self, op: Op) -> Result<()> {
        let next = self.regs.pc + 2;
        self.regs.pc = next;

        match op {
            Op::DispClear => self.graphics.clear(),
            Op::Return => self.regs.pc = self.regs.pop()?,
            Op::Goto(addr) => self.regs.pc = addr,
            Op::GotoSubRtn(addr) => {
                self.regs.push(next)?;
                self.regs.pc = addr;
            }
            Op::CondVxEq(x, kk) => self.skip_if(self.regs.get(x) == kk),
            Op::CondVxNe(x, kk) => self.skip_if(self.regs.get(x) != kk),
            Op::CondVxVyEq(x, y) => self.skip_if(self.regs.get(x) == self.regs.get(y)),
            Op::ConstSetVx(x, kk) => self.regs.set(x, kk),
            Op::ConstAddVx(x, kk) => self.regs.set(x, self.regs.get(x).wrapping_add(kk)),
            Op::AssignVyToVx(x, y) => self.regs.set(x, self.regs.get(y)),
            Op::BitOpOr(x, y) => self.regs.set(x, self.regs.get(x) | self.regs.get(y)),
            Op::BitOpAnd(x, y) => self.regs.set(x, self.regs.get(x) & self.regs.get(y)),
            Op::BitOpXor(x, y) => self.regs.set(x, self.regs.get(x) ^ self.regs.get(y)),
            // the flagged ops compute result and flag from the operands first, then write Vx,
            // then VF. When x is F the flag overwrites the result
            Op::MathVxAddVy(x, y) => {
                let (result, carry) = self.regs.get(x).overflowing_add(self.regs.get(y));
                self.regs.set_with_flag(x, result, carry as u8);
            }
            Op::MathVxMinusVy(x, y) => {
                let (vx, vy) = (self.regs.get(x), self.regs.get(y));
                self.regs.set_with_flag(x, vx.wrapping_sub(vy), (vx >= vy) as u8);
            }
            Op::MathVyMinusVx(x, y) => {
                let (vx, vy) = (self.regs.get(x), self.regs.get(y));
                self.regs.set_with_flag(x, vy.wrapping_sub(vx), (vy >= vx) as u8);
            }
            Op::BitOpRtShift(x, y) => {
                let src = self.shift_source(x, y);
                self.regs.set_with_flag(x, src >> 1, src & 1);
            }
            Op::BitOpLftShift(x, y) => {
                let src = self.shift_source(x, y);
                self.regs.set_with_flag(x, src << 1, src >> 7);
            }
            Op::CondVxVyNe(x, y) => self.skip_if(self.regs.get(x) != self.regs.get(y)),
            Op::MemSetI(addr) => self.regs.i = addr,
            Op::GotoPlusV0(addr) => self.regs.pc = addr + u16::from(self.regs.get(0)),
            Op::Rand(x, kk) => {
                let random: u8 = self.rng.gen();
                self.regs.set(x, random & kk);
            }
            Op::DispDraw(x, y, n) => {
                let sprite = self.memory.slice(self.regs.i as usize, n as usize)?;
                let collision =
                    self.graphics
                        .draw_sprite(self.regs.get(x), self.regs.get(y), sprite);
                self.regs.v[FLAG] = collision as u8;
            }
            Op::KeyOpEqVx(x) => {
                let pressed = self.keypad.is_pressed(self.regs.get(x) as usize)?;
                self.skip_if(pressed);
            }
            Op::KeyOpNeVx(x) => {
                let pressed = self.keypad.is_pressed(self.regs.get(x) as usize)?;
                self.skip_if(!pressed);
            }
            Op::DelayGet(x) => self.regs.set(x, self.regs.delay_timer),
            Op::KeyOpGet(x) => {
                debug!(self.logger, "waiting for key"; "register" => x);
                self.state = CpuState::WaitingForKey(KeyWait::new(x, &self.keypad));
            }
            Op::DelaySet(x) => self.regs.delay_timer = self.regs.get(x),
            Op::SoundSet(x) => self.regs.sound_timer = self.regs.get(x),
            Op::MemIPlusEqVx(x) => {
                self.regs.i = self.regs.i.wrapping_add(u16::from(self.regs.get(x)))
            }
            Op::MemISetSprite(x) => self.regs.i = Memory::font_addr(self.regs.get(x)),
            Op::Bcd(x) => {
                let value = self.regs.get(x);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                self.memory.write_slice(self.regs.i as usize, &digits)?;
            }
            Op::RegDump(x) => {
                let count = x as usize + 1;
                self.memory
                    .write_slice(self.regs.i as usize, &self.regs.v[..count])?;
                self.advance_index_after_load_store(count);
            }
            Op::RegLoad(x) => {
                let count = x as usize + 1;
                let data = self.memory.slice(self.regs.i as usize, count)?;
                self.regs.v[..count].copy_from_slice(data);
                self.advance_index_after_load_store(count);
            }
        }

        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.regs.pc += 2;
        }
    }

    fn shift_source(&self, x: u8, y: u8) -> u8 {
        if self.config.quirks.shift_uses_vy {
            self.regs.get(y)
        } else {
            self.regs.get(x)
        }
    }

    fn advance_index_after_load_store(&mut self, count: usize) {
        if self.config.quirks.load_store_increments_index {
            self.regs.i = self.regs.i.wrapping_add(count as u16);
        }
    }

    /// Press or release key `index` (0x0 - 0xF)
    pub fn set_key(&mut self, index: usize, pressed: bool) -> Result<()> {
        self.keypad.set_key(index, pressed)
    }

    /// Ask the host's keyboard which keys are down and update the keypad to match
    pub fn handle_key_input(&mut self, keyboard: &impl AsKeyboard) {
        self.keypad.update_with_keys(&keyboard.keys_down());
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn graphics(&self) -> &Graphics {
        &self.graphics
    }

    /// Owned copy of the screen, for hosts that render on another thread
    pub fn display_snapshot(&self) -> Graphics {
        self.graphics.clone()
    }

    /// True if the screen changed since the last call. Hosts can skip redrawing otherwise
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }

    /// True while the sound timer is nonzero, i.e. while the host should be beeping
    pub fn sound_active(&self) -> bool {
        self.regs.sound_timer > 0
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn fault(&self) -> Option<&Fault> {
        match &self.state {
            CpuState::Faulted(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
