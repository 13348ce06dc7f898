use super::{CheatCode, CheatOpcode};
use crate::mips::{format_offset, hi_lo, words_to_bytes, EncodeError, InstructionEncoder};

/// Instructions implementing a single code, without the branch that guards it.
fn code_lines(code: &CheatCode, skip: usize) -> Vec<String> {
    let (hi, lo) = hi_lo(code.address);
    let lo = format_offset(lo);
    let mut lines = vec![format!("lui t0, 0x{:04X}", hi)];

    match code.opcode {
        CheatOpcode::Write8 | CheatOpcode::Write16 => {
            let store = if code.opcode.is_byte_sized() { "sb" } else { "sh" };
            lines.push(format!("ori t1, zero, 0x{:X}", code.value));
            lines.push(format!("{} t1, {}(t0)", store, lo));
        }
        CheatOpcode::If8 | CheatOpcode::If16 | CheatOpcode::IfNot8 | CheatOpcode::IfNot16 => {
            let load = if code.opcode.is_byte_sized() { "lbu" } else { "lhu" };
            // `If` skips the guarded code when the values differ, `IfNot` when they match.
            let branch = match code.opcode {
                CheatOpcode::If8 | CheatOpcode::If16 => "bne",
                _ => "beq",
            };
            lines.push(format!("{} t1, {}(t0)", load, lo));
            lines.push(format!("ori t2, zero, 0x{:X}", code.value));
            lines.push(format!("{} t1, t2, {}", branch, skip + 1));
            lines.push("nop".to_owned());
        }
    }

    lines
}

/// Number of instructions [`code_lines`] emits for a code.
fn code_size(code: &CheatCode) -> usize {
    if code.opcode.is_conditional() {
        5
    } else {
        3
    }
}

/// Straight-line MIPS text applying `codes` in order.
///
/// A conditional code guards exactly the code that follows it. The routine clobbers `t0`-`t2`
/// and falls through at the end, so routines can be concatenated.
pub fn routine_lines(codes: &[CheatCode]) -> Vec<String> {
    codes
        .iter()
        .enumerate()
        .flat_map(|(ix, code)| {
            let skip = codes.get(ix + 1).map_or(0, code_size);
            code_lines(code, skip)
        })
        .collect()
}

/// Compile `codes` into big-endian machine code.
#[tracing::instrument(skip_all, fields(codes = codes.len()))]
pub fn compile(
    codes: &[CheatCode],
    encoder: &dyn InstructionEncoder,
) -> Result<Vec<u8>, EncodeError> {
    let words = encoder.encode_all(&routine_lines(codes))?;
    Ok(words_to_bytes(&words))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cheats::parse;
    use crate::mips::MipsEncoder;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_codes() {
        let codes = parse("8025AA00 0005 810F93AC 8063").unwrap();
        assert_eq!(
            routine_lines(&codes),
            vec![
                "lui t0, 0x8026",
                "ori t1, zero, 0x5",
                "sb t1, -0x5600(t0)",
                "lui t0, 0x8010",
                "ori t1, zero, 0x8063",
                "sh t1, -0x6C54(t0)",
            ]
        );
    }

    #[test]
    fn test_conditional_guards_next_code() {
        let codes = parse("D00F93AA 0001 810F93AC 0063 D30F93AA 0002").unwrap();
        assert_eq!(
            routine_lines(&codes),
            vec![
                "lui t0, 0x8010",
                "lbu t1, -0x6C56(t0)",
                "ori t2, zero, 0x1",
                "bne t1, t2, 4",
                "nop",
                "lui t0, 0x8010",
                "ori t1, zero, 0x63",
                "sh t1, -0x6C54(t0)",
                "lui t0, 0x8010",
                "lhu t1, -0x6C56(t0)",
                "ori t2, zero, 0x2",
                "beq t1, t2, 1",
                "nop",
            ]
        );
    }

    #[test]
    fn test_compile() -> Result<(), EncodeError> {
        let codes = parse("8025AA00 0005").unwrap();
        let bytes = compile(&codes, &MipsEncoder::new())?;
        assert_eq!(
            bytes,
            vec![
                0x3C, 0x08, 0x80, 0x26, // lui t0, 0x8026
                0x34, 0x09, 0x00, 0x05, // ori t1, zero, 0x5
                0xA1, 0x09, 0xAA, 0x00, // sb t1, -0x5600(t0)
            ]
        );
        Ok(())
    }
}
