use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum LoadError {
    #[error("The program is {len} bytes long, but only {max} bytes fit into memory.")]
    ProgramTooLarge { len: usize, max: usize },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("The chipset was halted by an earlier error.")]
    Halted,
}

impl ProcessError {
    /// Only unknown opcodes leave the chipset in a state where
    /// execution can continue with the next instruction.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProcessError::Opcode(OpcodeError::InvalidOpcode(_)))
    }
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable() {
        assert!(ProcessError::from(OpcodeError::InvalidOpcode(0xF000)).is_recoverable());
        let fetch = OpcodeError::MemoryInvalid {
            pointer: 0xFFF,
            len: 0x1000,
        };
        assert!(!ProcessError::from(fetch).is_recoverable());
        assert!(!ProcessError::from(StackError::Full).is_recoverable());
        assert!(!ProcessError::from(StackError::Empty).is_recoverable());
        assert!(!ProcessError::Halted.is_recoverable());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            "Invalid opcode state 'An unsupported opcode was used 0xF000.'.",
            format!("{}", ProcessError::from(OpcodeError::InvalidOpcode(0xF000)))
        );
        assert_eq!(
            "The program is 3585 bytes long, but only 3584 bytes fit into memory.",
            format!(
                "{}",
                LoadError::ProgramTooLarge {
                    len: 3585,
                    max: 3584
                }
            )
        );
    }
}
