use lazy_static::lazy_static;
use std::collections::HashMap;

/// Mnemonics of the instructions the patch generators emit.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mnemonic {
    NOP,
    JR,
    ADDIU,
    ORI,
    LUI,
    LB,
    LBU,
    LH,
    LHU,
    LW,
    SB,
    SH,
    SW,
    BEQ,
    BNE,
    J,
    JAL,
}

/// How the operands of an instruction are laid out, both in text and in the encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// No operands, encodes to the given word.
    Fixed(u32),
    /// `rs` only, special opcode with the given function field.
    Register { funct: u32 },
    /// `rt, rs, imm` with a signed immediate.
    Immediate { opcode: u32 },
    /// `rt, rs, imm` with a zero-extended immediate.
    Logical { opcode: u32 },
    /// `rt, imm` with the immediate in the upper half.
    Upper { opcode: u32 },
    /// `rt, offset(base)`.
    Memory { opcode: u32 },
    /// `rs, rt, offset` where the offset counts instructions from the delay slot.
    Branch { opcode: u32 },
    /// `target` absolute address.
    Jump { opcode: u32 },
}

impl Format {
    pub fn operand_count(&self) -> usize {
        match self {
            Format::Fixed(_) => 0,
            Format::Register { .. } | Format::Jump { .. } => 1,
            Format::Upper { .. } | Format::Memory { .. } => 2,
            Format::Immediate { .. } | Format::Logical { .. } | Format::Branch { .. } => 3,
        }
    }
}

/// A mapper between mnemonics and their encodings.
#[derive(Debug)]
pub struct OpcodeMapping {
    map: HashMap<Mnemonic, Format>,
}

impl OpcodeMapping {
    /// Find the format of the given mnemonic.
    pub fn find_format(&self, mnemonic: Mnemonic) -> Option<Format> {
        self.map.get(&mnemonic).copied()
    }

    fn new() -> Self {
        let mappings = vec![
            (Mnemonic::NOP, Format::Fixed(0x0000_0000)),
            (Mnemonic::JR, Format::Register { funct: 0x08 }),
            (Mnemonic::ADDIU, Format::Immediate { opcode: 0x09 }),
            (Mnemonic::ORI, Format::Logical { opcode: 0x0D }),
            (Mnemonic::LUI, Format::Upper { opcode: 0x0F }),
            (Mnemonic::LB, Format::Memory { opcode: 0x20 }),
            (Mnemonic::LH, Format::Memory { opcode: 0x21 }),
            (Mnemonic::LW, Format::Memory { opcode: 0x23 }),
            (Mnemonic::LBU, Format::Memory { opcode: 0x24 }),
            (Mnemonic::LHU, Format::Memory { opcode: 0x25 }),
            (Mnemonic::SB, Format::Memory { opcode: 0x28 }),
            (Mnemonic::SH, Format::Memory { opcode: 0x29 }),
            (Mnemonic::SW, Format::Memory { opcode: 0x2B }),
            (Mnemonic::BEQ, Format::Branch { opcode: 0x04 }),
            (Mnemonic::BNE, Format::Branch { opcode: 0x05 }),
            (Mnemonic::J, Format::Jump { opcode: 0x02 }),
            (Mnemonic::JAL, Format::Jump { opcode: 0x03 }),
        ];

        Self {
            map: mappings.into_iter().collect(),
        }
    }
}

lazy_static! {
    pub static ref OPCODE_MAPPING: OpcodeMapping = OpcodeMapping::new();
}

/// ABI register names, indexed by register number.
pub const REGISTER_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

/// Register number of `$name`, `name` or `$n`. `r0` and `s8` are accepted as aliases.
pub fn find_register(name: &str) -> Option<u32> {
    let name = name.trim().trim_start_matches('$').to_ascii_lowercase();
    let name = match name.as_str() {
        "r0" => "zero",
        "s8" => "fp",
        other => other,
    };

    if let Some(number) = REGISTER_NAMES.iter().position(|&n| n == name) {
        return Some(number as u32);
    }
    name.parse::<u32>().ok().filter(|&n| n < 32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_register() {
        let tests = vec![
            ("zero", Some(0)),
            ("r0", Some(0)),
            ("$a0", Some(4)),
            ("K0", Some(26)),
            ("sp", Some(29)),
            ("s8", Some(30)),
            ("ra", Some(31)),
            ("$31", Some(31)),
            ("32", None),
            ("x1", None),
        ];
        for (input, expected) in tests {
            assert_eq!(find_register(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_every_mnemonic_is_mapped() {
        for mnemonic in ["nop", "jr", "addiu", "ori", "lui", "lw", "sb", "bne", "jal"] {
            let mnemonic = Mnemonic::from_str(mnemonic).unwrap();
            assert!(OPCODE_MAPPING.find_format(mnemonic).is_some());
        }
        assert!(Mnemonic::from_str("mult").is_err());
    }
}
