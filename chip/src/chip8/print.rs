//! The pretty print implementation of the [`chipset`](super::ChipSet) state.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::ChipSet;
use once_cell::sync::Lazy;
use std::fmt::{self, Write};

/// The amount of bytes shown on a single memory line.
const HEX_PRINT_STEP: usize = 16;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// The line used instead of a run of at least two lines of only zeros.
static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
    let mut line = String::new();
    indent_helper(&mut line, 2);
    line.push_str("...");
    line.push(END_OF_LINE);
    line
});

/// The capacity of a formatted memory line
static LENLINE: Lazy<usize> = Lazy::new(|| {
    let mut line = String::new();
    // writing into a string does not fail
    memory_print::line(&mut line, 0, &[0; HEX_PRINT_STEP]).unwrap_or_default();
    line.len()
});

/// Handles all the memory prints
mod memory_print {
    use super::{indent_helper, END_OF_LINE};
    use std::fmt::{self, Write};

    /// will format a single line of memory, starting at the pointer
    pub(super) fn line(text: &mut String, pointer: usize, data: &[u8]) -> fmt::Result {
        indent_helper(text, 2);
        write!(text, "{:#06X} - {:#06X} :", pointer, pointer + data.len() - 1)?;
        for byte in data {
            write!(text, " {:02X}", byte)?;
        }
        text.push(END_OF_LINE);
        Ok(())
    }
}

impl ChipSet {
    fn memory_dump(&self) -> Result<String, fmt::Error> {
        let lines = self.memory.len() / HEX_PRINT_STEP;
        let mut text = String::with_capacity(*LENLINE * lines);
        let mut zeros = 0;

        for (i, chunk) in self.memory.chunks(HEX_PRINT_STEP).enumerate() {
            if chunk.iter().all(|byte| *byte == 0) {
                zeros += 1;
                // the first zero line is still printed
                if zeros == 2 {
                    text.push_str(&ZERO_FILLER);
                }
                if zeros >= 2 {
                    continue;
                }
            } else {
                zeros = 0;
            }
            memory_print::line(&mut text, i * HEX_PRINT_STEP, chunk)?;
        }
        Ok(text)
    }
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        writeln!(text, "Chipset {{")?;
        writeln!(text, "\topcode: {:#06X}", self.opcode)?;
        writeln!(text, "\tprogram counter: {:#06X}", self.program_counter)?;
        writeln!(text, "\tindex register: {:#06X}", self.index_register)?;
        writeln!(text, "\tdelay timer: {}", self.delay_timer.get_value())?;
        writeln!(text, "\tsound timer: {}", self.sound_timer.get_value())?;
        writeln!(text, "\tcycles: {}", self.cycles)?;

        write!(text, "\tregisters:")?;
        for (i, register) in self.registers.iter().enumerate() {
            write!(text, " V{:X}={:#04X}", i, register)?;
        }
        text.push(END_OF_LINE);

        write!(text, "\tstack:")?;
        for pointer in self.stack.iter() {
            write!(text, " {:#06X}", pointer)?;
        }
        text.push(END_OF_LINE);

        writeln!(text, "\tmemory:")?;
        text.push_str(&self.memory_dump()?);
        text.push('}');

        write!(f, "{}", text)
    }
}
