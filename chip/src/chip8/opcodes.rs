use crate::{
    definitions::{cpu, display, memory},
    opcode::{Arithmetic, Instruction, Operation, ProgramCounterStep},
    ProcessError,
};

use super::ChipSet;

/// The largest sprite `DXYN` can draw
const MAX_SPRITE_ROWS: usize = 0xF;

impl ChipSet {
    /// Folds an address derived from the index register into memory.
    #[inline]
    fn address(&self, offset: usize) -> usize {
        (self.index_register + offset) & memory::ADDRESS_MASK
    }

    /// Writes through the index register. Writes past the end of memory
    /// are dropped, they never wrap around into the font.
    fn store(&mut self, offset: usize, value: u8) {
        let address = self.index_register + offset;
        match self.memory.get_mut(address) {
            Some(byte) => *byte = value,
            None => log::warn!("Dropping write to {:#06X} past the end of memory", address),
        }
    }

    /// Runs the decoded instruction, the program counter already points to the
    /// next instruction.
    pub(super) fn execute(
        &mut self,
        instruction: Instruction,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let mut op = Operation::None;
        let step = match instruction {
            Instruction::Sys { nnn } => {
                // 0NNN
                // Machine code routines only existed on the original hardware.
                log::debug!("Ignoring machine code routine at {:#05X}", nnn);
                ProgramCounterStep::Next
            }
            Instruction::Clear => {
                // 00E0
                self.framebuffer.clear();
                op = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.pop_stack()?;
                ProgramCounterStep::Jump(pc)
            }
            Instruction::Jump { nnn } => ProgramCounterStep::Jump(nnn),
            Instruction::Call { nnn } => {
                // 2NNN
                // the program counter already points to the instruction
                // after the call, which is where the return lands
                self.push_stack(self.program_counter)?;
                ProgramCounterStep::Jump(nnn)
            }
            Instruction::SkipEqual { x, nn } => ProgramCounterStep::cond(self.registers[x] == nn),
            Instruction::SkipNotEqual { x, nn } => {
                ProgramCounterStep::cond(self.registers[x] != nn)
            }
            Instruction::SkipRegisterEqual { x, y } => {
                ProgramCounterStep::cond(self.registers[x] == self.registers[y])
            }
            Instruction::Set { x, nn } => {
                self.registers[x] = nn;
                ProgramCounterStep::Next
            }
            Instruction::Add { x, nn } => {
                // let VX overflow, but ignore carry
                self.registers[x] = self.registers[x].wrapping_add(nn);
                ProgramCounterStep::Next
            }
            Instruction::Arithmetic { ops, x, y } => {
                self.arithmetic(ops, x, y);
                ProgramCounterStep::Next
            }
            Instruction::SkipRegisterNotEqual { x, y } => {
                ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            Instruction::SetIndex { nnn } => {
                self.index_register = nnn;
                ProgramCounterStep::Next
            }
            Instruction::JumpOffset { nnn } => {
                ProgramCounterStep::Jump(nnn + self.registers[0] as usize)
            }
            Instruction::Random { x, nn } => {
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand = [0u8; 1];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = nn & rand[0];
                ProgramCounterStep::Next
            }
            Instruction::Draw { x, y, n } => {
                self.draw(x, y, n);
                op = Operation::Draw;
                ProgramCounterStep::Next
            }
            Instruction::SkipPressed { x } => {
                ProgramCounterStep::cond(self.keypad.is_pressed(self.registers[x] as usize))
            }
            Instruction::SkipNotPressed { x } => {
                ProgramCounterStep::cond(!self.keypad.is_pressed(self.registers[x] as usize))
            }
            Instruction::GetDelayTimer { x } => {
                self.registers[x] = self.delay_timer.get_value();
                ProgramCounterStep::Next
            }
            Instruction::AwaitKeyPress { x } => match self.keypad.first_pressed() {
                Some(key) => {
                    self.registers[x] = key as u8;
                    ProgramCounterStep::Next
                }
                None => {
                    // polled again on the next cycle instead of blocking
                    op = Operation::Wait;
                    ProgramCounterStep::Repeat
                }
            },
            Instruction::SetDelayTimer { x } => {
                self.delay_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::SetSoundTimer { x } => {
                self.sound_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::AddToIndex { x } => {
                // VF is not affected
                let vx = self.registers[x] as usize;
                self.index_register = (self.index_register + vx) & cpu::register::INDEX_MASK;
                ProgramCounterStep::Next
            }
            Instruction::SetIndexToSprite { x } => {
                let glyph = (self.registers[x] & 0xF) as usize;
                self.index_register =
                    display::fontset::LOCATION + display::fontset::GLYPH_SIZE * glyph;
                ProgramCounterStep::Next
            }
            Instruction::StoreBcd { x } => {
                let r = self.registers[x];

                self.store(0, r / 100); // 246u8 / 100 => 2
                self.store(1, r / 10 % 10); // 246u8 / 10 => 24 % 10 => 4
                self.store(2, r % 10); // 246u8 % 10 => 6
                ProgramCounterStep::Next
            }
            Instruction::StoreRegisters { x } => {
                // I itself is left unmodified
                for i in 0..=x {
                    self.store(i, self.registers[i]);
                }
                ProgramCounterStep::Next
            }
            Instruction::LoadRegisters { x } => {
                for i in 0..=x {
                    self.registers[i] = self.memory[self.address(i)];
                }
                ProgramCounterStep::Next
            }
        };
        Ok((step, op))
    }

    /// `8XYN` the flag is written after the result, so `VF` holds the flag
    /// even if it was the target.
    fn arithmetic(&mut self, ops: Arithmetic, x: usize, y: usize) {
        let vx = self.registers[x];
        let vy = self.registers[y];

        let (res, flag) = match ops {
            Arithmetic::Assign => (vy, None),
            Arithmetic::Or => (vx | vy, None),
            Arithmetic::And => (vx & vy, None),
            Arithmetic::Xor => (vx ^ vy, None),
            Arithmetic::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry as u8))
            }
            Arithmetic::Sub => {
                let (res, borrow) = vx.overflowing_sub(vy);
                (res, Some(!borrow as u8))
            }
            Arithmetic::ShiftRight => (vx >> 1, Some(vx & 0x1)),
            Arithmetic::SubReverse => {
                let (res, borrow) = vy.overflowing_sub(vx);
                (res, Some(!borrow as u8))
            }
            Arithmetic::ShiftLeft => (vx << 1, Some(vx >> 7)),
        };

        self.registers[x] = res;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
    }

    /// `DXYN`
    /// Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
    /// pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
    /// value doesn’t change after the execution of this instruction. VF is
    /// set to 1 if any screen pixels are flipped from set to unset when the sprite is drawn, and
    /// to 0 if that doesn’t happen
    fn draw(&mut self, x: usize, y: usize, n: usize) {
        let mut sprite = [0u8; MAX_SPRITE_ROWS];
        for (i, row) in sprite[..n].iter_mut().enumerate() {
            *row = self.memory[self.address(i)];
        }

        let coorx = self.registers[x] as usize;
        let coory = self.registers[y] as usize;

        let collision = self.framebuffer.draw_sprite(coorx, coory, &sprite[..n]);
        self.registers[cpu::register::LAST] = collision as u8;
    }
}
