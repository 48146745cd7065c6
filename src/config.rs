use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::memory::{MEMORY_SIZE, STARTING_MEMORY_BYTE};

/// How fast instructions run unless configured otherwise. Most ROMs are written for somewhere
/// between 500 and 1000
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

/// Fastest instruction rate accepted. Well past anything a ROM expects, and keeps the clock
/// period a whole number of nanoseconds
pub const MAX_INSTRUCTIONS_PER_SECOND: u32 = 1_000_000;

/// Behaviours CHIP-8 interpreters disagree on. The defaults are the ones most ROMs written since
/// the 90s expect
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quirks {
    /// 8XY6 and 8XYE shift Vy and store the result in Vx, as the COSMAC VIP did. When false
    /// Vx is shifted in place and Vy is ignored
    pub shift_uses_vy: bool,
    /// FX55 and FX65 leave I pointing just past the last register copied
    pub load_store_increments_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub instructions_per_second: u32,
    /// where programs are loaded and execution starts
    pub origin: u16,
    /// seed for CXNN. Leave unset to seed from the OS
    pub rng_seed: Option<u64>,
    pub quirks: Quirks,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.instructions_per_second == 0 {
            return Err(Error::InvalidConfig {
                reason: "instructions_per_second must be greater than 0".to_string(),
            });
        }
        if self.instructions_per_second > MAX_INSTRUCTIONS_PER_SECOND {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "instructions_per_second must be at most {}",
                    MAX_INSTRUCTIONS_PER_SECOND
                ),
            });
        }
        if self.origin as usize >= MEMORY_SIZE {
            return Err(Error::InvalidConfig {
                reason: format!("origin {:#06X} is outside of memory", self.origin),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            origin: STARTING_MEMORY_BYTE,
            rng_seed: None,
            quirks: Quirks::default(),
        }
    }
}
