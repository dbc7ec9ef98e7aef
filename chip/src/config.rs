//! Runtime configuration of a [`ChipSet`](crate::chip8::ChipSet).
use crate::definitions::timer;

/// What the chipset does after decoding an opcode that is not part of the
/// instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Report the opcode and continue with the next instruction.
    Skip,
    /// Report the opcode and halt the chipset.
    Halt,
}

impl Default for UnknownOpcodePolicy {
    fn default() -> Self {
        UnknownOpcodePolicy::Skip
    }
}

/// The configuration used when creating a chipset.
///
/// # Example
/// ```rust
/// # use chip::{Config, UnknownOpcodePolicy};
/// let config = Config::new()
///     .unknown_opcode(UnknownOpcodePolicy::Halt)
///     .timer_divider(0)
///     .seed(42);
/// assert_eq!(config.get_unknown_opcode(), UnknownOpcodePolicy::Halt);
/// assert_eq!(config.get_timer_divider(), 0);
/// assert_eq!(config.get_seed(), Some(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    unknown_opcode: UnknownOpcodePolicy,
    /// Amount of cpu cycles between two timer ticks, `0` leaves the
    /// ticking to the host.
    timer_divider: u32,
    /// Seed for the random number generator used by `CXNN`.
    seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unknown_opcode: UnknownOpcodePolicy::default(),
            timer_divider: timer::DIVIDER,
            seed: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unknown_opcode(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.unknown_opcode = policy;
        self
    }

    pub fn timer_divider(mut self, divider: u32) -> Self {
        self.timer_divider = divider;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn get_unknown_opcode(&self) -> UnknownOpcodePolicy {
        self.unknown_opcode
    }

    pub fn get_timer_divider(&self) -> u32 {
        self.timer_divider
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.get_unknown_opcode(), UnknownOpcodePolicy::Skip);
        assert_eq!(config.get_timer_divider(), 8);
        assert_eq!(config.get_seed(), None);
    }
}
