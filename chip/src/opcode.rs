//! Opcode abstractions, functionality and constants.
use std::convert::TryFrom;

use crate::{definitions::memory, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(
/// #    Err(err),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode family (the highest nibble)
    fn t(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `NNN` is an address
    fn nnn(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a constant or a opcode subtype
    fn xyn(&self) -> (usize, usize, usize);

    /// this is an opcode extractor for the opcode type `TXYT`
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> usize {
        const SHIFT: u16 = 3 * BYTE_SIZE / 2;
        ((self & OPCODE_MASK_F000) >> SHIFT) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, usize) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as usize;
        (x, y, n)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents the program steps that the chip can take after an
/// instruction was executed. The program counter was already moved past
/// the instruction during the fetch.
pub enum ProgramCounterStep {
    /// Continue with the instruction after the current one
    Next,
    /// Skip the instruction after the current one
    Skip,
    /// Run the current instruction again on the next cycle
    Repeat,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Maps the step onto the program counter that was already advanced
    /// past the executed instruction.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(0x202, ProgramCounterStep::Next.apply(0x202));
    /// assert_eq!(0x204, ProgramCounterStep::Skip.apply(0x202));
    /// assert_eq!(0x200, ProgramCounterStep::Repeat.apply(0x202));
    /// assert_eq!(0x300, ProgramCounterStep::Jump(0x300).apply(0x202));
    /// ```
    #[inline]
    pub fn apply(&self, pointer: usize) -> usize {
        match *self {
            ProgramCounterStep::Next => pointer,
            ProgramCounterStep::Skip => pointer + memory::opcodes::SIZE,
            ProgramCounterStep::Repeat => pointer.saturating_sub(memory::opcodes::SIZE),
            ProgramCounterStep::Jump(target) => target,
        }
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents a command from the interpreter up to the host.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The instruction waits for a key press and will
    /// be run again on the next cycle.
    Wait,
    /// The framebuffer changed and should be redrawn.
    Draw,
}

/// The operations that arithmetic and logic opcodes `8XYN` can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    /// `8XY0` VX = VY
    Assign,
    /// `8XY1` VX |= VY
    Or,
    /// `8XY2` VX &= VY
    And,
    /// `8XY3` VX ^= VY
    Xor,
    /// `8XY4` VX += VY, VF = carry
    Add,
    /// `8XY5` VX -= VY, VF = not borrow
    Sub,
    /// `8XY6` VX >>= 1, VF = shifted out bit
    ShiftRight,
    /// `8XY7` VX = VY - VX, VF = not borrow
    SubReverse,
    /// `8XYE` VX <<= 1, VF = shifted out bit
    ShiftLeft,
}

impl TryFrom<usize> for Arithmetic {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        let res = match value {
            0x0 => Arithmetic::Assign,
            0x1 => Arithmetic::Or,
            0x2 => Arithmetic::And,
            0x3 => Arithmetic::Xor,
            0x4 => Arithmetic::Add,
            0x5 => Arithmetic::Sub,
            0x6 => Arithmetic::ShiftRight,
            0x7 => Arithmetic::SubReverse,
            0xE => Arithmetic::ShiftLeft,
            _ => return Err(()),
        };
        Ok(res)
    }
}

/// The closed set of instructions the chipset understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0NNN` Calls the machine code routine at NNN, ignored by interpreters.
    Sys { nnn: usize },
    /// `00E0` Clears the display
    Clear,
    /// `00EE` Returns from the subroutine
    Return,
    /// `1NNN` Jumps to address NNN.
    Jump { nnn: usize },
    /// `2NNN` Calls subroutine at NNN.
    Call { nnn: usize },
    /// `3XNN` Skips the next instruction if VX equals NN.
    SkipEqual { x: usize, nn: u8 },
    /// `4XNN` Skips the next instruction if VX doesn't equal NN.
    SkipNotEqual { x: usize, nn: u8 },
    /// `5XY0` Skips the next instruction if VX equals VY.
    SkipRegisterEqual { x: usize, y: usize },
    /// `6XNN` Sets VX to NN.
    Set { x: usize, nn: u8 },
    /// `7XNN` Adds NN to VX, the carry flag is not changed.
    Add { x: usize, nn: u8 },
    /// `8XYN` Register to register arithmetic.
    Arithmetic { ops: Arithmetic, x: usize, y: usize },
    /// `9XY0` Skips the next instruction if VX doesn't equal VY.
    SkipRegisterNotEqual { x: usize, y: usize },
    /// `ANNN` Sets I to the address NNN.
    SetIndex { nnn: usize },
    /// `BNNN` Jumps to the address NNN plus V0.
    JumpOffset { nnn: usize },
    /// `CXNN` Sets VX to a random number and NN.
    Random { x: usize, nn: u8 },
    /// `DXYN` Draws a sprite of N rows at (VX, VY).
    Draw { x: usize, y: usize, n: usize },
    /// `EX9E` Skips the next instruction if the key stored in VX is pressed.
    SkipPressed { x: usize },
    /// `EXA1` Skips the next instruction if the key stored in VX isn't pressed.
    SkipNotPressed { x: usize },
    /// `FX07` Sets VX to the value of the delay timer.
    GetDelayTimer { x: usize },
    /// `FX0A` A key press is awaited, and then stored in VX.
    AwaitKeyPress { x: usize },
    /// `FX15` Sets the delay timer to VX.
    SetDelayTimer { x: usize },
    /// `FX18` Sets the sound timer to VX.
    SetSoundTimer { x: usize },
    /// `FX1E` Adds VX to I. VF is not affected.
    AddToIndex { x: usize },
    /// `FX29` Sets I to the location of the font sprite for the character in VX.
    SetIndexToSprite { x: usize },
    /// `FX33` Stores the binary-coded decimal representation of VX at I, I+1 and I+2.
    StoreBcd { x: usize },
    /// `FX55` Stores V0 to VX (including VX) in memory starting at address I.
    StoreRegisters { x: usize },
    /// `FX65` Fills V0 to VX (including VX) with values from memory starting at address I.
    LoadRegisters { x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    /// # Example
    /// ```rust
    /// # use std::convert::TryFrom;
    /// # use chip::{opcode::*, OpcodeError};
    /// assert_eq!(Ok(Instruction::Draw { x: 0xE, y: 0xD, n: 0xA }), Instruction::try_from(0xDEDA as Opcode));
    /// assert_eq!(Err(OpcodeError::InvalidOpcode(0xF000)), Instruction::try_from(0xF000 as Opcode));
    /// ```
    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let err = OpcodeError::InvalidOpcode(value);
        let (x, y, n) = value.xyn();
        let (_, nn) = value.xnn();
        let nnn = value.nnn();

        let res = match value.t() {
            0x0 => match value {
                0x00E0 => Instruction::Clear,
                0x00EE => Instruction::Return,
                _ => Instruction::Sys { nnn },
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipEqual { x, nn },
            0x4 => Instruction::SkipNotEqual { x, nn },
            0x5 if n == 0 => Instruction::SkipRegisterEqual { x, y },
            0x6 => Instruction::Set { x, nn },
            0x7 => Instruction::Add { x, nn },
            0x8 => {
                let ops = Arithmetic::try_from(n).map_err(|_| err)?;
                Instruction::Arithmetic { ops, x, y }
            }
            0x9 if n == 0 => Instruction::SkipRegisterNotEqual { x, y },
            0xA => Instruction::SetIndex { nnn },
            0xB => Instruction::JumpOffset { nnn },
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => match nn {
                0x9E => Instruction::SkipPressed { x },
                0xA1 => Instruction::SkipNotPressed { x },
                _ => return Err(err),
            },
            0xF => match nn {
                0x07 => Instruction::GetDelayTimer { x },
                0x0A => Instruction::AwaitKeyPress { x },
                0x15 => Instruction::SetDelayTimer { x },
                0x18 => Instruction::SetSoundTimer { x },
                0x1E => Instruction::AddToIndex { x },
                0x29 => Instruction::SetIndexToSprite { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => return Err(err),
            },
            _ => return Err(err),
        };
        Ok(res)
    }
}
