use crate::{
    definitions::{
        cpu,
        display::{fontset, sprite},
    },
    memory,
    opcode::{Instruction, Operation, ProgramCounterStep},
    ProcessError,
};

use super::{ChipSet, KeyWait};

/// The flag register `VF`
const VF: usize = cpu::register::LAST;

impl ChipSet {
    /// Runs a single decoded instruction. The program counter already points to the next
    /// instruction, the returned step tells how to move on from there.
    pub(super) fn execute(
        &mut self,
        instruction: Instruction,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        use Instruction::*;

        let mut step = ProgramCounterStep::Next;
        let mut operation = Operation::None;

        match instruction {
            ClearDisplay => {
                self.display.write().clear();
                operation = Operation::Draw;
            }
            Return => {
                // Return from sub routine => pop from stack
                step = ProgramCounterStep::Jump(self.pop_stack()?);
            }
            Sys { nnn } => {
                // machine code routines of the COSMAC VIP are not supported
                log::debug!("Ignoring machine code call to {:#05X}", nnn);
            }
            Jump { nnn } => step = ProgramCounterStep::Jump(nnn),
            Call { nnn } => {
                // the program counter already points to the return address
                self.push_stack(self.program_counter)?;
                step = ProgramCounterStep::Jump(nnn);
            }
            SkipEqualConst { x, nn } => step = ProgramCounterStep::cond(self.registers[x] == nn),
            SkipNotEqualConst { x, nn } => {
                step = ProgramCounterStep::cond(self.registers[x] != nn)
            }
            SkipEqual { x, y } => {
                step = ProgramCounterStep::cond(self.registers[x] == self.registers[y])
            }
            SkipNotEqual { x, y } => {
                step = ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            SetConst { x, nn } => self.registers[x] = nn,
            // VF is not touched
            AddConst { x, nn } => self.registers[x] = self.registers[x].wrapping_add(nn),
            Assign { x, y } => self.registers[x] = self.registers[y],
            Or { x, y } => self.registers[x] |= self.registers[y],
            And { x, y } => self.registers[x] &= self.registers[y],
            Xor { x, y } => self.registers[x] ^= self.registers[y],
            // VF is written last, with VF as target the carry wins
            Add { x, y } => {
                let (res, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.registers[x] = res;
                self.registers[VF] = carry as u8;
            }
            // the flag goes first, with VX as target the result wins
            Sub { x, y } => {
                let (left, right) = (self.registers[x], self.registers[y]);
                self.registers[VF] = (left >= right) as u8;
                self.registers[x] = left.wrapping_sub(right);
            }
            ShiftRight { x, .. } => {
                let value = self.registers[x];
                self.registers[VF] = value & 0x01;
                self.registers[x] = value >> 1;
            }
            SubReverse { x, y } => {
                let (left, right) = (self.registers[y], self.registers[x]);
                self.registers[VF] = (left >= right) as u8;
                self.registers[x] = left.wrapping_sub(right);
            }
            ShiftLeft { x, .. } => {
                let value = self.registers[x];
                self.registers[VF] = (value >> 7) & 0x01;
                self.registers[x] = value << 1;
            }
            SetIndex { nnn } => self.index_register = nnn,
            JumpOffset { nnn } => {
                step = ProgramCounterStep::Jump(nnn + self.registers[0] as u16);
            }
            Random { x, nn } => {
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand = [0u8; 1];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = rand[0] & nn;
            }
            Draw { x, y, n } => {
                self.draw(x, y, n)?;
                operation = Operation::Draw;
            }
            SkipKeyPressed { x } => {
                step = ProgramCounterStep::cond(self.keypad.is_down(self.registers[x]))
            }
            SkipKeyNotPressed { x } => {
                step = ProgramCounterStep::cond(!self.keypad.is_down(self.registers[x]))
            }
            GetDelayTimer { x } => self.registers[x] = self.timers.get_delay(),
            AwaitKey { x } => {
                let (s, o) = self.await_key(x);
                step = s;
                operation = o;
            }
            SetDelayTimer { x } => self.timers.set_delay(self.registers[x]),
            SetSoundTimer { x } => self.timers.set_sound(self.registers[x]),
            AddToIndex { x } => {
                // VF is not affected
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
            }
            FontSprite { x } => {
                // only the glyphs 0-F exist
                let glyph = (self.registers[x] & 0x0F) as u16;
                self.index_register = fontset::LOCATION + glyph * fontset::GLYPH_SIZE;
            }
            StoreBcd { x } => {
                let value = self.registers[x];
                let digits = [value / 100, value / 10 % 10, value % 10];
                for (offset, digit) in (0u16..).zip(digits.iter()) {
                    self.write_indexed(offset, *digit)?;
                }
            }
            StoreRegisters { x } => {
                // I itself is left unmodified
                for offset in 0..=x {
                    self.write_indexed(offset as u16, self.registers[offset])?;
                }
            }
            LoadRegisters { x } => {
                for offset in 0..=x {
                    self.registers[offset] = self.read_indexed(offset as u16)?;
                }
            }
        }
        Ok((step, operation))
    }

    /// Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
    /// pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
    /// value doesn’t change after the execution of this instruction. VF is set to 1 if any
    /// screen pixels are flipped from set to unset when the sprite is drawn, and to 0 if that
    /// doesn’t happen.
    fn draw(&mut self, x: usize, y: usize, n: usize) -> Result<(), ProcessError> {
        let mut rows = [0u8; sprite::MAX_HEIGHT];
        for (offset, row) in (0u16..).zip(rows.iter_mut().take(n)) {
            *row = self.read_indexed(offset)?;
        }

        let coorx = self.registers[x] as usize;
        let coory = self.registers[y] as usize;

        // the lock is held for the whole sprite
        let collision = self.display.write().draw_sprite(coorx, coory, &rows[..n]);
        self.registers[VF] = collision as u8;
        Ok(())
    }

    /// A key release is awaited, and then stored in VX. The instruction is repeated until
    /// a key was released.
    fn await_key(&mut self, x: usize) -> (ProgramCounterStep, Operation) {
        match self.key_wait {
            KeyWait::Idle => {
                // a release from before the instruction does not count
                if let Some(stale) = self.keypad.take_released_key() {
                    log::debug!("Discarding stale key release {:#X}", stale);
                }
                self.key_wait = KeyWait::AwaitingKey;
                (ProgramCounterStep::Rewind, Operation::Wait)
            }
            KeyWait::AwaitingKey => match self.keypad.take_released_key() {
                Some(key) => {
                    self.registers[x] = key;
                    self.key_wait = KeyWait::Idle;
                    (ProgramCounterStep::Next, Operation::None)
                }
                None => (ProgramCounterStep::Rewind, Operation::Wait),
            },
        }
    }

    fn read_indexed(&self, offset: u16) -> Result<u8, ProcessError> {
        let address = memory::wrap(self.index_register.wrapping_add(offset));
        Ok(self.memory.read8(address)?)
    }

    fn write_indexed(&mut self, offset: u16, value: u8) -> Result<(), ProcessError> {
        let address = memory::wrap(self.index_register.wrapping_add(offset));
        Ok(self.memory.write8(address, value)?)
    }
}
