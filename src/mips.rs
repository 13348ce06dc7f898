use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use self::opcode::{find_register, Format, Mnemonic, OPCODE_MAPPING};

/// Mapping from mnemonics to encodings, and register names.
pub mod opcode;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Unknown mnemonic: {0}")]
    UnknownMnemonic(String),
    #[error("{mnemonic} takes {expected} operands, found {found}")]
    OperandCount {
        mnemonic: Mnemonic,
        expected: usize,
        found: usize,
    },
    #[error("Invalid register: {0}")]
    InvalidRegister(String),
    #[error("Invalid immediate: {0}")]
    InvalidImmediate(String),
    #[error("Immediate {value:#x} does not fit {mnemonic}")]
    ImmediateOutOfRange { mnemonic: Mnemonic, value: i64 },
    #[error("Jump target {0:#010x} is not word aligned")]
    MisalignedTarget(u32),
}

/// Turns one line of instruction text into its 32-bit encoding.
///
/// Used to hand-place short instruction sequences without going through a full assembler.
pub trait InstructionEncoder {
    fn encode(&self, text: &str) -> Result<u32, EncodeError>;

    /// Encode every line and return the words in order.
    fn encode_all(&self, lines: &[String]) -> Result<Vec<u32>, EncodeError> {
        lines.iter().map(|line| self.encode(line)).collect()
    }
}

/// Encoder for the small MIPS subset in [`opcode::Mnemonic`].
///
/// Branch operands are signed instruction counts relative to the delay slot and jump
/// operands are absolute addresses, e.g. `bne t8, t9, 18` or `j 0x800C4004`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MipsEncoder;

impl MipsEncoder {
    pub fn new() -> Self {
        Self
    }
}

fn parse_immediate(text: &str) -> Result<i64, EncodeError> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| EncodeError::InvalidImmediate(text.to_owned()))?;

    Ok(if negative { -value } else { value })
}

fn register(text: &str) -> Result<u32, EncodeError> {
    find_register(text).ok_or_else(|| EncodeError::InvalidRegister(text.trim().to_owned()))
}

/// Split `offset(base)` into its parts. A missing offset means zero.
fn memory_operand(text: &str) -> Result<(i64, u32), EncodeError> {
    let text = text.trim();
    let invalid = || EncodeError::InvalidImmediate(text.to_owned());
    let open = text.find('(').ok_or_else(invalid)?;
    let base = text[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
    let offset = text[..open].trim();
    let offset = if offset.is_empty() {
        0
    } else {
        parse_immediate(offset)?
    };
    Ok((offset, register(base)?))
}

fn signed16(mnemonic: Mnemonic, value: i64) -> Result<u32, EncodeError> {
    i16::try_from(value)
        .map(|v| v as u16 as u32)
        .map_err(|_| EncodeError::ImmediateOutOfRange { mnemonic, value })
}

fn unsigned16(mnemonic: Mnemonic, value: i64) -> Result<u32, EncodeError> {
    u16::try_from(value)
        .map(u32::from)
        .map_err(|_| EncodeError::ImmediateOutOfRange { mnemonic, value })
}

fn i_type(opcode: u32, rs: u32, rt: u32, immediate: u32) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | (immediate & 0xFFFF)
}

impl InstructionEncoder for MipsEncoder {
    #[tracing::instrument]
    fn encode(&self, text: &str) -> Result<u32, EncodeError> {
        let text = text.trim();
        let (name, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));
        let mnemonic =
            Mnemonic::from_str(name).map_err(|_| EncodeError::UnknownMnemonic(name.to_owned()))?;
        let format = OPCODE_MAPPING
            .find_format(mnemonic)
            .ok_or_else(|| EncodeError::UnknownMnemonic(name.to_owned()))?;

        let operands: Vec<&str> = if rest.trim().is_empty() {
            vec![]
        } else {
            rest.split(',').map(str::trim).collect()
        };
        if operands.len() != format.operand_count() {
            return Err(EncodeError::OperandCount {
                mnemonic,
                expected: format.operand_count(),
                found: operands.len(),
            });
        }

        let word = match format {
            Format::Fixed(word) => word,
            Format::Register { funct } => (register(operands[0])? << 21) | funct,
            Format::Immediate { opcode } => i_type(
                opcode,
                register(operands[1])?,
                register(operands[0])?,
                signed16(mnemonic, parse_immediate(operands[2])?)?,
            ),
            Format::Logical { opcode } => i_type(
                opcode,
                register(operands[1])?,
                register(operands[0])?,
                unsigned16(mnemonic, parse_immediate(operands[2])?)?,
            ),
            Format::Upper { opcode } => i_type(
                opcode,
                0,
                register(operands[0])?,
                unsigned16(mnemonic, parse_immediate(operands[1])?)?,
            ),
            Format::Memory { opcode } => {
                let (offset, base) = memory_operand(operands[1])?;
                i_type(
                    opcode,
                    base,
                    register(operands[0])?,
                    signed16(mnemonic, offset)?,
                )
            }
            Format::Branch { opcode } => i_type(
                opcode,
                register(operands[0])?,
                register(operands[1])?,
                signed16(mnemonic, parse_immediate(operands[2])?)?,
            ),
            Format::Jump { opcode } => {
                let target = u32::try_from(parse_immediate(operands[0])?).map_err(|_| {
                    EncodeError::InvalidImmediate(operands[0].to_owned())
                })?;
                if target % 4 != 0 {
                    return Err(EncodeError::MisalignedTarget(target));
                }
                (opcode << 26) | ((target >> 2) & 0x03FF_FFFF)
            }
        };

        Ok(word)
    }
}

/// Split an address into the `(upper, lower)` halves used by a `lui` + signed offset pair.
pub fn hi_lo(address: u32) -> (u16, i16) {
    let lo = address as u16 as i16;
    let hi = (address.wrapping_add(0x8000) >> 16) as u16;
    (hi, lo)
}

/// Format a signed 16-bit offset as instruction text, e.g. `-0x5600`.
pub fn format_offset(value: i16) -> String {
    if value < 0 {
        format!("-0x{:X}", -i32::from(value))
    } else {
        format!("0x{:X}", value)
    }
}

/// Lay out instruction words in ROM byte order.
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = vec![0; words.len() * 4];
    BigEndian::write_u32_into(words, &mut bytes);
    bytes
}
