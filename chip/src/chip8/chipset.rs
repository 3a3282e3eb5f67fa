use std::convert::TryFrom;

use {
    crate::{
        definitions::{cpu, memory::opcodes},
        devices::Keypad,
        display::SharedDisplay,
        memory::{self, Memory},
        opcode::{Instruction, Opcode, Operation},
        timer::Timers,
        MemoryError, ProcessError, StackError,
    },
    rand::RngCore,
    tinyvec::ArrayVec,
};

/// The state of the blocking key wait instruction `FX0A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    Idle,
    AwaitingKey,
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Memory,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// The delay and the sound timer, both count down at 60 hertz, until they reach 0.
    /// They are decremented by an outside driver.
    pub(super) timers: Timers,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`.
    pub(super) display: SharedDisplay,
    /// The hex keyboard, written to by the input source.
    pub(super) keypad: Keypad,
    pub(super) key_wait: KeyWait,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSet {
    /// will create a new chipset object, with the fonts loaded
    /// but without any program.
    pub fn new() -> Self {
        Self {
            opcode: 0,
            memory: Memory::with_font(),
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            timers: Timers::new(),
            display: SharedDisplay::new(),
            keypad: Keypad::new(),
            key_wait: KeyWait::Idle,
            rng: Box::new(rand::rngs::OsRng),
        }
    }

    /// will create a new chipset object with the given rom loaded
    pub fn with_rom(rom: &[u8]) -> Result<Self, MemoryError> {
        let mut chip = Self::new();
        chip.load_rom(rom)?;
        Ok(chip)
    }

    /// Replaces the random number generator used by `CXNN`.
    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
        self
    }

    /// Will write the rom data into memory, starting at the program counter
    /// base.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), MemoryError> {
        self.memory.load(cpu::PROGRAM_COUNTER as usize, rom)?;
        log::info!("Loaded rom of {} bytes", rom.len());
        Ok(())
    }

    /// will get the next opcode from memory
    pub(super) fn fetch(&self) -> Result<Opcode, MemoryError> {
        let high = self.memory.read8(memory::wrap(self.program_counter))?;
        let low = self
            .memory
            .read8(memory::wrap(self.program_counter.wrapping_add(1)))?;
        Ok(Opcode::from_be_bytes([high, low]))
    }

    /// will advance the program by a single step
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        let opcode = self.fetch()?;
        log::trace!("fetched {:#06X} at {:#05X}", opcode, self.program_counter);
        self.calc(opcode)
    }

    /// Will run the given opcode, as if it was fetched from the
    /// current program counter.
    pub fn calc(&mut self, opcode: Opcode) -> Result<Operation, ProcessError> {
        self.opcode = opcode;
        self.program_counter = self.program_counter.wrapping_add(opcodes::SIZE);

        let instruction = Instruction::try_from(opcode)?;
        log::debug!("{:#05X}: {}", self.program_counter, instruction);

        let (step, operation) = self.execute(instruction)?;
        self.program_counter = step.apply(self.program_counter);
        Ok(operation)
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        if self.stack.len() == self.stack.capacity() {
            Err(StackError::Full)
        } else {
            self.stack.push(pointer);
            Ok(())
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }

    /// A handle to the screen for a renderer.
    pub fn display(&self) -> SharedDisplay {
        self.display.clone()
    }

    /// A handle to the keyboard for the input source.
    pub fn keypad(&self) -> Keypad {
        self.keypad.clone()
    }

    /// A handle to the timers for the 60 hertz driver.
    pub fn timers(&self) -> Timers {
        self.timers.clone()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.timers.get_sound()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.timers.get_delay()
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The last opcode that was run.
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn key_wait(&self) -> KeyWait {
        self.key_wait
    }
}
