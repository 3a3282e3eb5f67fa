//! The pretty print implementation of the [`ChipSet`](super::ChipSet) state.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::*;
use crate::definitions::cpu;
use once_cell::sync::Lazy;
use std::fmt::{self, Write};

/// The length of the pretty print data
/// as a single instruction is u16 the octa
/// size will show how often the block shall
/// be repeated has to be bigger then 0
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// Will add an indent
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// Removes the trailing new line of a block
fn trim_block(text: &mut String) {
    if let Some(index) = text.rfind(END_OF_LINE) {
        text.truncate(index);
    }
}

/// The length of a single formatted integer (`0x0000`)
static INTEGER_LEN: Lazy<usize> = Lazy::new(|| integer_print::format(0u8).len());

/// Handles all the printing of the pointer values.
mod pointer_print {
    use std::fmt::Write;
    /// will formatt the pointers according to definition
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> std::fmt::Result {
        write!(line, "{:#06X} - {:#06X} :", from, to)
    }
}

/// handles printting of any and all of intergers.
mod integer_print {
    use super::{indent_helper, pointer_print, trim_block, END_OF_LINE, HEX_PRINT_STEP};
    use num_traits::Unsigned;
    use std::fmt::{self, Write};

    /// will format all integer types
    pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        write!(line, "{:#06X}", data)
    }

    /// same as [`formatter`] into a new string
    pub(super) fn format<T>(data: T) -> String
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        format!("{:#06X}", data)
    }

    /// will pretty print all the integer data given
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        let mut res = String::new();
        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = row * HEX_PRINT_STEP;
            indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;
            for entry in chunk {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
            res.push(END_OF_LINE);
        }
        trim_block(&mut res);
        Ok(res)
    }
}

/// Handles the memory, printed as opcodes.
mod opcode_print {
    use super::{indent_helper, integer_print, pointer_print, trim_block, END_OF_LINE, HEX_PRINT_STEP};
    use crate::opcode::{build_opcode, Opcode};
    use once_cell::sync::Lazy;
    use std::fmt::{self, Write};

    /// The amount of bytes a single row shows
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * 2;
    /// The values that are used when there are at lease two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// Prepares the line that will be used, in the case that a row only contains zeros.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let formatted = integer_print::format(0u16);
        let lenght = formatted.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1)
            - FILLER_BASE.len();
        let filler = " ".repeat(lenght / 2);
        format!("{0}{1}{2}{1}{0}", formatted, filler, FILLER_BASE)
    });

    /// this struct will simulate a single row of opcodes (only in this context)
    struct Row {
        from: usize,
        to: usize,
        data: Vec<Opcode>,
    }

    impl Row {
        fn only_null(&self) -> bool {
            self.data.iter().all(|opcode| *opcode == 0)
        }
    }

    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::new();
            pointer_print::formatter(&mut res, self.from, self.to)?;
            if self.only_null() {
                res.push(' ');
                res.push_str(&ZERO_FILLER);
            } else {
                for entry in self.data.iter() {
                    res.push(' ');
                    integer_print::formatter(&mut res, *entry)?;
                }
            }
            write!(f, "{}", res)
        }
    }

    /// will pretty print the content of the raw memory, consecutive rows that only
    /// hold zeros are merged
    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / POINTER_INCREMENT);

        for from in (0..memory.len()).step_by(POINTER_INCREMENT) {
            let to = (from + POINTER_INCREMENT).min(memory.len()) - 1;
            let data = (from..=to)
                .step_by(2)
                .map(|index| build_opcode(memory, index).unwrap_or_default())
                .collect();
            let row = Row { from, to, data };

            match rows.last_mut() {
                Some(last) if last.only_null() && row.only_null() => last.to = row.to,
                _ => rows.push(row),
            }
        }

        let mut string = String::new();
        for row in rows {
            indent_helper(&mut string, indent);
            write!(string, "{}{}", row, END_OF_LINE)?;
        }
        trim_block(&mut string);
        Ok(string)
    }
}

/// Handles all the boolean data types.
mod bool_print {
    use super::{indent_helper, pointer_print, trim_block, END_OF_LINE, HEX_PRINT_STEP};

    /// a function to keep the correct format length
    fn formatter(value: bool) -> String {
        format!("{:<width$}", value, width = *super::INTEGER_LEN)
    }

    /// will pretty print all the boolean data given
    pub(super) fn printer(data: &[bool], indent: usize) -> Result<String, std::fmt::Error> {
        let mut res = String::new();

        for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = row * HEX_PRINT_STEP;
            indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;

            let line = chunk
                .iter()
                .map(|value| formatter(*value))
                .collect::<Vec<_>>()
                .join(" ");
            res.push(' ');
            res.push_str(line.trim_end());
            res.push(END_OF_LINE);
        }
        trim_block(&mut res);
        Ok(res)
    }
}

/// Formats a single value on its own indented line
fn single<T>(value: T) -> Result<String, fmt::Error>
where
    T: fmt::UpperHex + num_traits::Unsigned + Copy,
{
    let mut line = String::new();
    indent_helper(&mut line, INDENT_SIZE);
    integer_print::formatter(&mut line, value)?;
    Ok(line)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mem = opcode_print::printer(self.memory.as_slice(), INDENT_SIZE)?;
        let reg = integer_print::printer(&self.registers, INDENT_SIZE)?;

        // handle stack specially as it needes to be filled up if empty
        let mut stack = [0u16; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(&self.stack);
        let sta = integer_print::printer(&stack, INDENT_SIZE)?;

        let key = bool_print::printer(&self.keypad.keys(), INDENT_SIZE)?;

        let mut tim = String::new();
        indent_helper(&mut tim, INDENT_SIZE);
        write!(
            tim,
            "delay {:#06X} sound {:#06X}",
            self.timers.get_delay(),
            self.timers.get_sound()
        )?;

        write!(
            f,
            "Chipset {{\n\
                \tOpcode :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex Register :\n{}\n\
                \tTimers :\n{}\n\
                \tKey Wait :\n\t\t{:?}\n\
                \tMemory :\n{}\n\
                \tKeybord :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                }}",
            single(self.opcode)?,
            single(self.program_counter)?,
            single(self.index_register)?,
            tim,
            self.key_wait,
            mem,
            key,
            sta,
            reg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ChipSet;

    const OUTPUT_PRINT: &str = "\
        Chipset {\n\
            \tOpcode :\n\
                \t\t0x7005\n\
            \tProgram Counter :\n\
                \t\t0x0204\n\
            \tIndex Register :\n\
                \t\t0x0000\n\
            \tTimers :\n\
                \t\tdelay 0x0000 sound 0x0000\n\
            \tKey Wait :\n\
                \t\tIdle\n\
            \tMemory :\n\
                \t\t0x0000 - 0x004F : 0x0000                    ...                    0x0000\n\
                \t\t0x0050 - 0x005F : 0xF090 0x9090 0xF020 0x6020 0x2070 0xF010 0xF080 0xF0F0\n\
                \t\t0x0060 - 0x006F : 0x10F0 0x10F0 0x9090 0xF010 0x10F0 0x80F0 0x10F0 0xF080\n\
                \t\t0x0070 - 0x007F : 0xF090 0xF0F0 0x1020 0x4040 0xF090 0xF090 0xF0F0 0x90F0\n\
                \t\t0x0080 - 0x008F : 0x10F0 0xF090 0xF090 0x90E0 0x90E0 0x90E0 0xF080 0x8080\n\
                \t\t0x0090 - 0x009F : 0xF0E0 0x9090 0x90E0 0xF080 0xF080 0xF0F0 0x80F0 0x8080\n\
                \t\t0x00A0 - 0x01FF : 0x0000                    ...                    0x0000\n\
                \t\t0x0200 - 0x020F : 0x600A 0x7005 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0210 - 0x0FFF : 0x0000                    ...                    0x0000\n\
            \tKeybord :\n\
                \t\t0x0000 - 0x0007 : false  true   false  true   false  true   false  true\n\
                \t\t0x0008 - 0x000F : false  true   false  true   false  true   false  true\n\
            \tStack :\n\
                \t\t0x0000 - 0x0007 : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
            \tRegister :\n\
                \t\t0x0000 - 0x0007 : 0x000F 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
                \t\t0x0008 - 0x000F : 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000 0x0000\n\
        }";

    #[test]
    /// tests if the pretty print output is as expected
    fn test_full_print() {
        let mut chip = ChipSet::with_rom(&[0x60, 0x0A, 0x70, 0x05]).unwrap();
        assert!(chip.step().is_ok());
        assert!(chip.step().is_ok());

        let keypad = chip.keypad();
        for key in (1..16).step_by(2) {
            keypad.key_down(key);
        }

        let actual_full = format!("{}", chip);
        let actual = actual_full.split('\n').collect::<Vec<_>>();
        let expected = OUTPUT_PRINT.split('\n').collect::<Vec<_>>();

        assert_eq!(expected.len(), actual.len());
        for (exp, act) in expected.iter().zip(actual.iter()) {
            assert_eq!(exp, act);
        }
    }
}
