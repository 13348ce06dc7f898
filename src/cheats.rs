use std::fmt;

use thiserror::Error;

use crate::mips::{EncodeError, InstructionEncoder};

/// Turns parsed codes into a machine code routine.
pub mod compiler;

/// Marker OR'd into every code address to put it in the cached RAM segment.
pub const RAM_SEGMENT: u32 = 0x8000_0000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheatFormatError {
    #[error("Cheat text is empty")]
    Empty,
    #[error("Cheat text has an odd number of tokens ({0})")]
    OddTokenCount(usize),
    #[error("Invalid cheat token: '{0}'")]
    InvalidToken(String),
    #[error("Unknown cheat opcode {opcode:#04x} in '{token}'")]
    UnknownOpcode { opcode: u8, token: String },
    #[error("16-bit cheat code '{token}' targets odd address {address:#010x}")]
    UnalignedAddress { address: u32, token: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheatError {
    #[error("Cheat format error: {0}")]
    Format(#[from] CheatFormatError),
    #[error("Cheat compile error: {0}")]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum CheatOpcode {
    Write8 = 0x80,
    Write16 = 0x81,
    If8 = 0xD0,
    If16 = 0xD1,
    IfNot8 = 0xD2,
    IfNot16 = 0xD3,
}

impl CheatOpcode {
    pub fn is_byte_sized(&self) -> bool {
        matches!(
            self,
            CheatOpcode::Write8 | CheatOpcode::If8 | CheatOpcode::IfNot8
        )
    }

    pub fn is_conditional(&self) -> bool {
        !matches!(self, CheatOpcode::Write8 | CheatOpcode::Write16)
    }
}

impl TryFrom<u8> for CheatOpcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x80 => Ok(CheatOpcode::Write8),
            0x81 => Ok(CheatOpcode::Write16),
            0xD0 => Ok(CheatOpcode::If8),
            0xD1 => Ok(CheatOpcode::If16),
            0xD2 => Ok(CheatOpcode::IfNot8),
            0xD3 => Ok(CheatOpcode::IfNot16),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheatCode {
    pub opcode: CheatOpcode,
    pub address: u32,
    pub value: u16,
}

impl fmt::Display for CheatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}{:06X} {:04X} ({} {:#010x} = {:#x})",
            self.opcode as u8,
            self.address & 0x00FF_FFFF,
            self.value,
            self.opcode,
            self.address,
            self.value
        )
    }
}

fn parse_hex_u32(token: &str) -> Result<u32, CheatFormatError> {
    if token.is_empty() || token.len() > 8 {
        return Err(CheatFormatError::InvalidToken(token.to_owned()));
    }
    u32::from_str_radix(token, 16).map_err(|_| CheatFormatError::InvalidToken(token.to_owned()))
}

fn parse_code(instruction: &str, value_token: &str) -> Result<CheatCode, CheatFormatError> {
    let word = parse_hex_u32(instruction)?;
    let value = u16::try_from(parse_hex_u32(value_token)?)
        .map_err(|_| CheatFormatError::InvalidToken(value_token.to_owned()))?;

    let opcode_byte = (word >> 24) as u8;
    let opcode =
        CheatOpcode::try_from(opcode_byte).map_err(|opcode| CheatFormatError::UnknownOpcode {
            opcode,
            token: instruction.to_owned(),
        })?;

    let address = (word & 0x00FF_FFFF) | RAM_SEGMENT;
    if !opcode.is_byte_sized() && address % 2 != 0 {
        return Err(CheatFormatError::UnalignedAddress {
            address,
            token: instruction.to_owned(),
        });
    }

    Ok(CheatCode {
        opcode,
        address,
        value: if opcode.is_byte_sized() {
            value & 0xFF
        } else {
            value
        },
    })
}

/// Parse a whitespace separated list of `XXXXXXXX YYYY` codes.
///
/// Either every pair parses or nothing is returned.
#[tracing::instrument(skip(text))]
pub fn parse(text: &str) -> Result<Vec<CheatCode>, CheatFormatError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let result = if tokens.is_empty() {
        Err(CheatFormatError::Empty)
    } else if tokens.len() % 2 != 0 {
        Err(CheatFormatError::OddTokenCount(tokens.len()))
    } else {
        tokens
            .chunks(2)
            .map(|pair| parse_code(pair[0], pair[1]))
            .collect()
    };

    if let Err(err) = &result {
        tracing::warn!("rejected cheat list: {}", err);
    }
    result
}

/// Compiled cheat routines of one patching run, in the order they were added.
///
/// The session is append-only until [`CheatSession::reset`]; the ROM hook stores
/// [`CheatSession::joined`] as one routine.
#[derive(Debug, Default, Clone)]
pub struct CheatSession {
    routines: Vec<Vec<u8>>,
}

impl CheatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already compiled routine.
    pub fn push(&mut self, routine: Vec<u8>) {
        self.routines.push(routine);
    }

    /// Parse and compile `text`, then append the result. Returns the routine size in bytes.
    #[tracing::instrument(skip(self, text, encoder))]
    pub fn add_text(
        &mut self,
        text: &str,
        encoder: &dyn InstructionEncoder,
    ) -> Result<usize, CheatError> {
        let codes = parse(text)?;
        let routine = compiler::compile(&codes, encoder)?;
        let len = routine.len();
        self.push(routine);
        Ok(len)
    }

    /// Total size of all routines in bytes.
    pub fn len(&self) -> usize {
        self.routines.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn routine_count(&self) -> usize {
        self.routines.len()
    }

    /// All routines concatenated in the order they were added.
    pub fn joined(&self) -> Vec<u8> {
        self.routines.concat()
    }

    pub fn reset(&mut self) {
        self.routines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse() -> Result<(), CheatFormatError> {
        let tests = vec![
            (
                "8125AA00 0005",
                CheatCode {
                    opcode: CheatOpcode::Write16,
                    address: 0x8025AA00,
                    value: 0x0005,
                },
            ),
            (
                "8025AA00 0005",
                CheatCode {
                    opcode: CheatOpcode::Write8,
                    address: 0x8025AA00,
                    value: 0x05,
                },
            ),
            (
                "800F93AA 01FF",
                CheatCode {
                    opcode: CheatOpcode::Write8,
                    address: 0x800F93AA,
                    value: 0xFF,
                },
            ),
            (
                "D30F93AA 1234",
                CheatCode {
                    opcode: CheatOpcode::IfNot16,
                    address: 0x800F93AA,
                    value: 0x1234,
                },
            ),
        ];

        for (input, expected) in tests {
            assert_eq!(parse(input)?, vec![expected]);
        }
        Ok(())
    }

    #[test]
    fn test_parse_multiple_lines() -> Result<(), CheatFormatError> {
        let codes = parse("D00F93AA 0001\n  810F93AC 0063\n")?;
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].opcode, CheatOpcode::If8);
        assert_eq!(codes[1].opcode, CheatOpcode::Write16);
        assert_eq!(codes[1].value, 0x63);
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        let tests = vec![
            ("", CheatFormatError::Empty),
            ("  \n ", CheatFormatError::Empty),
            ("8025AA00", CheatFormatError::OddTokenCount(1)),
            (
                "8025AA00 0005 8025AA01",
                CheatFormatError::OddTokenCount(3),
            ),
            (
                "8025AA00 0005 7025AA00 0001",
                CheatFormatError::UnknownOpcode {
                    opcode: 0x70,
                    token: "7025AA00".to_string(),
                },
            ),
            (
                "8025AG00 0005",
                CheatFormatError::InvalidToken("8025AG00".to_string()),
            ),
            (
                "8025AA00 10005",
                CheatFormatError::InvalidToken("10005".to_string()),
            ),
            (
                "8125AA01 0005",
                CheatFormatError::UnalignedAddress {
                    address: 0x8025AA01,
                    token: "8125AA01".to_string(),
                },
            ),
            (
                "D00F93AB 0001 D30F93AB 0001",
                CheatFormatError::UnalignedAddress {
                    address: 0x800F93AB,
                    token: "D30F93AB".to_string(),
                },
            ),
            (
                "8025AA0000 0005",
                CheatFormatError::InvalidToken("8025AA0000".to_string()),
            ),
        ];

        for (input, expected) in tests {
            assert_eq!(parse(input), Err(expected), "{}", input);
        }
    }

    #[test]
    fn test_session() {
        let mut session = CheatSession::new();
        assert!(session.is_empty());

        session.push(vec![1, 2, 3, 4]);
        session.push(vec![5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(session.routine_count(), 2);
        assert_eq!(session.len(), 12);
        assert_eq!(session.joined(), (1..=12).collect::<Vec<u8>>());

        session.reset();
        assert!(session.is_empty());
        assert_eq!(session.joined(), Vec::<u8>::new());
    }
}
