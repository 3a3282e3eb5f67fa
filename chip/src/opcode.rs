//! Opcode abstractions, functionality and constants.
use std::{convert::TryFrom, fmt};

use crate::{definitions::memory, MemoryError, OpcodeError};

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
/// # use chip::MemoryError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # assert_eq!(
/// #    Err(MemoryError::OutOfBounds { address: 4, len: SPLIT_OPCODE.len() }),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, MemoryError> {
    match (data.get(pointer), data.get(pointer + 1)) {
        (Some(high), Some(low)) => Ok(Opcode::from_be_bytes([*high, *low])),
        _ => Err(MemoryError::OutOfBounds {
            address: pointer + 1,
            len: data.len(),
        }),
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode type nibble form any opcode
    /// - `T` is the opcode type
    fn t(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address
    fn nnn(&self) -> u16;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a opcode subtype or a constant
    fn xyn(&self) -> (usize, usize, usize);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * 4)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
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

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the change of the program counter after an instruction ran.
/// The fetch already moved the counter to the next instruction.
pub enum ProgramCounterStep {
    /// Continue with the instruction after the current one
    Next,
    /// Skip the instruction after the current one
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(u16),
    /// Run the current instruction again
    Rewind,
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

    /// Will apply the step to the already advanced program counter.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next.apply(0x202), 0x202);
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x202), 0x204);
    /// assert_eq!(ProgramCounterStep::Rewind.apply(0x202), 0x200);
    /// assert_eq!(ProgramCounterStep::Jump(0x300).apply(0x202), 0x300);
    /// ```
    #[inline]
    pub fn apply(&self, pc: u16) -> u16 {
        match *self {
            ProgramCounterStep::Next => pc,
            ProgramCounterStep::Skip => pc.wrapping_add(memory::opcodes::SIZE),
            ProgramCounterStep::Rewind => pc.wrapping_sub(memory::opcodes::SIZE),
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// What kind of work the last instruction did, so a driver
/// knows if it has to redraw or is waiting for input.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operation {
    None,
    Draw,
    Wait,
}

/// A decoded instruction with all its operands extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`
    ClearDisplay,
    /// `00EE`
    Return,
    /// `0NNN` machine code routine, not supported and treated as no-op
    Sys { nnn: u16 },
    /// `1NNN`
    Jump { nnn: u16 },
    /// `2NNN`
    Call { nnn: u16 },
    /// `3XNN`
    SkipEqualConst { x: usize, nn: u8 },
    /// `4XNN`
    SkipNotEqualConst { x: usize, nn: u8 },
    /// `5XY0`
    SkipEqual { x: usize, y: usize },
    /// `6XNN`
    SetConst { x: usize, nn: u8 },
    /// `7XNN`
    AddConst { x: usize, nn: u8 },
    /// `8XY0`
    Assign { x: usize, y: usize },
    /// `8XY1`
    Or { x: usize, y: usize },
    /// `8XY2`
    And { x: usize, y: usize },
    /// `8XY3`
    Xor { x: usize, y: usize },
    /// `8XY4`
    Add { x: usize, y: usize },
    /// `8XY5`
    Sub { x: usize, y: usize },
    /// `8XY6`
    ShiftRight { x: usize, y: usize },
    /// `8XY7`
    SubReverse { x: usize, y: usize },
    /// `8XYE`
    ShiftLeft { x: usize, y: usize },
    /// `9XY0`
    SkipNotEqual { x: usize, y: usize },
    /// `ANNN`
    SetIndex { nnn: u16 },
    /// `BNNN`
    JumpOffset { nnn: u16 },
    /// `CXNN`
    Random { x: usize, nn: u8 },
    /// `DXYN`
    Draw { x: usize, y: usize, n: usize },
    /// `EX9E`
    SkipKeyPressed { x: usize },
    /// `EXA1`
    SkipKeyNotPressed { x: usize },
    /// `FX07`
    GetDelayTimer { x: usize },
    /// `FX0A`
    AwaitKey { x: usize },
    /// `FX15`
    SetDelayTimer { x: usize },
    /// `FX18`
    SetSoundTimer { x: usize },
    /// `FX1E`
    AddToIndex { x: usize },
    /// `FX29`
    FontSprite { x: usize },
    /// `FX33`
    StoreBcd { x: usize },
    /// `FX55`
    StoreRegisters { x: usize },
    /// `FX65`
    LoadRegisters { x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    /// # Example
    /// ```rust
    /// # use std::convert::TryFrom;
    /// # use chip::{opcode::Instruction, OpcodeError};
    /// assert_eq!(Instruction::try_from(0x8AB4), Ok(Instruction::Add { x: 0xA, y: 0xB }));
    /// assert_eq!(Instruction::try_from(0x0123), Ok(Instruction::Sys { nnn: 0x123 }));
    /// assert_eq!(Instruction::try_from(0x5121), Err(OpcodeError::InvalidOpcode(0x5121)));
    /// ```
    fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
        use Instruction::*;

        let nnn = opcode.nnn();
        let (x, nn) = opcode.xnn();
        let (_, y, n) = opcode.xyn();

        let instruction = match opcode.t() {
            0x0 => match opcode {
                0x00E0 => ClearDisplay,
                0x00EE => Return,
                _ => Sys { nnn },
            },
            0x1 => Jump { nnn },
            0x2 => Call { nnn },
            0x3 => SkipEqualConst { x, nn },
            0x4 => SkipNotEqualConst { x, nn },
            0x5 if n == 0 => SkipEqual { x, y },
            0x6 => SetConst { x, nn },
            0x7 => AddConst { x, nn },
            0x8 => match n {
                0x0 => Assign { x, y },
                0x1 => Or { x, y },
                0x2 => And { x, y },
                0x3 => Xor { x, y },
                0x4 => Add { x, y },
                0x5 => Sub { x, y },
                0x6 => ShiftRight { x, y },
                0x7 => SubReverse { x, y },
                0xE => ShiftLeft { x, y },
                _ => return Err(OpcodeError::InvalidOpcode(opcode)),
            },
            0x9 if n == 0 => SkipNotEqual { x, y },
            0xA => SetIndex { nnn },
            0xB => JumpOffset { nnn },
            0xC => Random { x, nn },
            0xD => Draw { x, y, n },
            0xE => match nn {
                0x9E => SkipKeyPressed { x },
                0xA1 => SkipKeyNotPressed { x },
                _ => return Err(OpcodeError::InvalidOpcode(opcode)),
            },
            0xF => match nn {
                0x07 => GetDelayTimer { x },
                0x0A => AwaitKey { x },
                0x15 => SetDelayTimer { x },
                0x18 => SetSoundTimer { x },
                0x1E => AddToIndex { x },
                0x29 => FontSprite { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return Err(OpcodeError::InvalidOpcode(opcode)),
            },
            _ => return Err(OpcodeError::InvalidOpcode(opcode)),
        };
        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearDisplay => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Sys { nnn } => write!(f, "SYS  {:#05X}", nnn),
            Jump { nnn } => write!(f, "JP   {:#05X}", nnn),
            Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            SkipEqualConst { x, nn } => write!(f, "SE   V{:X}, {:#04X}", x, nn),
            SkipNotEqualConst { x, nn } => write!(f, "SNE  V{:X}, {:#04X}", x, nn),
            SkipEqual { x, y } => write!(f, "SE   V{:X}, V{:X}", x, y),
            SetConst { x, nn } => write!(f, "LD   V{:X}, {:#04X}", x, nn),
            AddConst { x, nn } => write!(f, "ADD  V{:X}, {:#04X}", x, nn),
            Assign { x, y } => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR   V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR  V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB  V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR  V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SkipNotEqual { x, y } => write!(f, "SNE  V{:X}, V{:X}", x, y),
            SetIndex { nnn } => write!(f, "LD   I, {:#05X}", nnn),
            JumpOffset { nnn } => write!(f, "JP   V0, {:#05X}", nnn),
            Random { x, nn } => write!(f, "RND  V{:X}, {:#04X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW  V{:X}, V{:X}, {:#X}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP  V{:X}", x),
            SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            GetDelayTimer { x } => write!(f, "LD   V{:X}, DT", x),
            AwaitKey { x } => write!(f, "LD   V{:X}, K", x),
            SetDelayTimer { x } => write!(f, "LD   DT, V{:X}", x),
            SetSoundTimer { x } => write!(f, "LD   ST, V{:X}", x),
            AddToIndex { x } => write!(f, "ADD  I, V{:X}", x),
            FontSprite { x } => write!(f, "LD   F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD   B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD   [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD   V{:X}, [I]", x),
        }
    }
}
