//! Wall clock bookkeeping for the two independent schedules the emulator runs on: instructions
//! at a configurable rate and the delay/sound timers at a fixed 60 Hz
use std::time::Duration;

use crate::registers::Registers;

/// Frequency both the delay and sound timers count down at
pub const TIMER_HZ: u32 = 60;

/// Accumulates elapsed time and hands it back out one fixed period at a time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    period: Duration,
    accumulated: Duration,
}

impl Schedule {
    /// A schedule firing `hz` times per second. The period never drops below 1ns, so anything
    /// faster than 1 GHz runs at 1 GHz
    pub fn from_hz(hz: u32) -> Self {
        let nanos = 1_000_000_000 / u64::from(hz.max(1));
        Schedule {
            period: Duration::from_nanos(nanos.max(1)),
            accumulated: Duration::from_secs(0),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left before the next event is due. Zero when one is already due
    pub fn until_next(&self) -> Duration {
        self.period
            .checked_sub(self.accumulated)
            .unwrap_or_else(|| Duration::from_secs(0))
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.accumulated += elapsed;
    }

    /// Consume one due event, if there is one
    pub fn take_due(&mut self) -> bool {
        if self.accumulated >= self.period {
            self.accumulated -= self.period;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::from_secs(0);
    }
}

/// Drives the delay and sound timers at 60 Hz regardless of how fast instructions execute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerDriver {
    schedule: Schedule,
}

impl TimerDriver {
    pub fn new() -> Self {
        TimerDriver {
            schedule: Schedule::from_hz(TIMER_HZ),
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    /// One 60 Hz tick: count each nonzero timer down by one. They never go below 0
    pub fn tick(regs: &mut Registers) {
        regs.delay_timer = regs.delay_timer.saturating_sub(1);
        regs.sound_timer = regs.sound_timer.saturating_sub(1);
    }

    /// Add `elapsed` wall clock time and apply every tick that became due. Returns how many
    /// ticks were applied
    pub fn run_for(&mut self, elapsed: Duration, regs: &mut Registers) -> u32 {
        self.schedule.advance(elapsed);
        let mut ticks = 0;
        while self.schedule.take_due() {
            Self::tick(regs);
            ticks += 1;
        }
        ticks
    }
}

impl Default for TimerDriver {
    fn default() -> Self {
        Self::new()
    }
}
