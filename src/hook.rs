use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::cheats::CheatSession;
use crate::fs::{FsError, PackedFileSystem};
use crate::game::GameBuild;
use crate::mips::{format_offset, hi_lo, words_to_bytes, EncodeError, InstructionEncoder};
use crate::symbols::{SymbolError, SymbolTable};

/// Symbol name of the platform routine that loads a file from the packed file system.
pub const READ_PRIMITIVE: &str = "ReadMainFS";

/// Number of instructions displaced at the controller jump site.
pub const DISPLACED_WORDS: usize = 4;

/// Registers the trampoline holds the routine pointer and the sentinel in. The trampoline
/// pushes them on entry and the stored routine pops them before the displaced code runs.
const POINTER_REGISTERS: [&str; 2] = ["t8", "t9"];

/// Registers the trampoline preserves around the call to the read primitive.
const SAVED_REGISTERS: [&str; 7] = ["ra", "v0", "v1", "a0", "a1", "a2", "a3"];

/// Registers the stored routine may clobber.
const SCRATCH_REGISTERS: [&str; 3] = ["t0", "t1", "t2"];

/// Words after the displaced instructions at the end of a stored routine: `j` and its delay slot.
const RETURN_WORDS: usize = 2;

/// Keys of a hook descriptor file, in field order.
const DESCRIPTOR_FIELDS: [&str; 7] = [
    "fs_dir",
    "fs_file",
    "hook_rom_offset",
    "hook_ram_offset",
    "controller_jump_rom_offset",
    "controller_jump_ram_offset",
    "cache_sentinel",
];

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Missing platform read primitive: {0}")]
    MissingPrimitive(#[source] SymbolError),
    #[error("Hook encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Packed file system error: {0}")]
    Fs(#[from] FsError),
    #[error("ROM is {len:#x} bytes but the patch at {offset:#x} needs {needed:#x}")]
    RomTooSmall {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("ROM is already hooked but the stored routine is too short ({0} bytes)")]
    MissingDisplacedCode(usize),
    #[error("Malformed hook descriptor line {line}: '{text}'")]
    Descriptor { line: usize, text: String },
    #[error("Hook descriptor sets {0} twice")]
    DuplicateField(&'static str),
    #[error("Hook descriptor is missing {0}")]
    MissingField(&'static str),
    #[error("Hook descriptor {field} {value:#010x} is not word aligned")]
    UnalignedField { field: &'static str, value: u32 },
}

/// Where a build's hook lives.
///
/// `hook_ram_offset` is the cache cell; it holds `cache_sentinel` until the stored routine has
/// been loaded once, and the trampoline itself starts one word after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookDescriptor {
    pub fs_dir: u32,
    pub fs_file: u32,
    pub hook_rom_offset: usize,
    pub hook_ram_offset: u32,
    pub controller_jump_rom_offset: usize,
    pub controller_jump_ram_offset: u32,
    pub cache_sentinel: u32,
}

fn parse_word(text: &str) -> Option<u32> {
    match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

impl HookDescriptor {
    /// Read a descriptor from `key value` lines, e.g. `hook_rom_offset 0x33F00`.
    ///
    /// Every field of [`HookDescriptor`] must be set exactly once. Blank lines and lines
    /// starting with `#` or `;` are skipped.
    #[tracing::instrument(skip(text))]
    pub fn load(text: &str) -> Result<HookDescriptor, HookError> {
        let mut values = [None; DESCRIPTOR_FIELDS.len()];

        for (ix, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let invalid = || HookError::Descriptor {
                line: ix + 1,
                text: line.to_owned(),
            };
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(invalid());
            };
            let field = DESCRIPTOR_FIELDS
                .iter()
                .position(|name| name.eq_ignore_ascii_case(key))
                .ok_or_else(invalid)?;
            let value = parse_word(value).ok_or_else(invalid)?;
            if values[field].replace(value).is_some() {
                return Err(HookError::DuplicateField(DESCRIPTOR_FIELDS[field]));
            }
        }

        let field = |ix: usize| values[ix].ok_or(HookError::MissingField(DESCRIPTOR_FIELDS[ix]));
        let descriptor = HookDescriptor {
            fs_dir: field(0)?,
            fs_file: field(1)?,
            hook_rom_offset: field(2)? as usize,
            hook_ram_offset: field(3)?,
            controller_jump_rom_offset: field(4)? as usize,
            controller_jump_ram_offset: field(5)?,
            cache_sentinel: field(6)?,
        };

        let aligned = [
            (3, descriptor.hook_ram_offset),
            (5, descriptor.controller_jump_ram_offset),
        ];
        for (ix, value) in aligned {
            if value % 4 != 0 {
                return Err(HookError::UnalignedField {
                    field: DESCRIPTOR_FIELDS[ix],
                    value,
                });
            }
        }
        tracing::debug!(?descriptor, "loaded hook descriptor");
        Ok(descriptor)
    }

    /// The jump written at the controller site.
    fn site_jump(&self) -> String {
        format!("j 0x{:08X}", self.hook_ram_offset.wrapping_add(4))
    }

    /// Where the stored routine returns to once the displaced instructions have run.
    fn return_address(&self) -> u32 {
        self.controller_jump_ram_offset
            .wrapping_add((DISPLACED_WORDS * 4) as u32)
    }
}

fn frame_size(registers: usize) -> usize {
    (registers * 4 + 7) & !7
}

fn save_lines(registers: &[&str]) -> Vec<String> {
    let mut lines = vec![format!("addiu sp, sp, -0x{:X}", frame_size(registers.len()))];
    lines.extend(
        registers
            .iter()
            .enumerate()
            .map(|(ix, reg)| format!("sw {}, 0x{:X}(sp)", reg, ix * 4)),
    );
    lines
}

fn restore_lines(registers: &[&str]) -> Vec<String> {
    let mut lines: Vec<String> = registers
        .iter()
        .enumerate()
        .map(|(ix, reg)| format!("lw {}, 0x{:X}(sp)", reg, ix * 4))
        .collect();
    lines.push(format!("addiu sp, sp, 0x{:X}", frame_size(registers.len())));
    lines
}

/// Instruction text of the lazy-resolve trampoline placed at `hook_ram_offset + 4`.
///
/// On the first frame the cache cell still holds the sentinel, so the trampoline loads the
/// stored routine through the read primitive and caches the returned pointer. Every later
/// frame jumps straight to the cached pointer.
///
/// The pointer and the sentinel live in `t8`/`t9`, which are pushed first and stay pushed
/// until the stored routine's epilogue pops them.
pub fn trampoline_lines(descriptor: &HookDescriptor, read_primitive: u32) -> Vec<String> {
    let (cache_hi, cache_lo) = hi_lo(descriptor.hook_ram_offset);
    let cache_lo = format_offset(cache_lo);

    let mut lines = save_lines(&POINTER_REGISTERS);
    lines.push(format!("lui t8, 0x{:04X}", cache_hi));
    lines.push(format!("lw t8, {}(t8)", cache_lo));
    lines.push(format!("lui t9, 0x{:04X}", descriptor.cache_sentinel >> 16));
    lines.push(format!(
        "ori t9, t9, 0x{:04X}",
        descriptor.cache_sentinel & 0xFFFF
    ));
    let branch = lines.len();
    lines.push(String::new());
    lines.push("nop".to_owned());

    lines.extend(save_lines(&SAVED_REGISTERS));
    lines.push(format!("ori a0, zero, 0x{:X}", descriptor.fs_dir));
    lines.push(format!("jal 0x{:08X}", read_primitive));
    lines.push(format!("ori a1, zero, 0x{:X}", descriptor.fs_file));
    lines.push(format!("lui t9, 0x{:04X}", cache_hi));
    lines.push(format!("sw v0, {}(t9)", cache_lo));
    lines.push("addiu t8, v0, 0".to_owned());
    lines.extend(restore_lines(&SAVED_REGISTERS));

    let resolved = lines.len();
    lines[branch] = format!("bne t8, t9, {}", resolved - (branch + 1));
    lines.push("jr t8".to_owned());
    lines.push("nop".to_owned());
    lines
}

/// Instructions the stored routine runs before the cheats.
fn routine_prologue_lines() -> Vec<String> {
    save_lines(&SCRATCH_REGISTERS)
}

/// Instructions the stored routine runs after the cheats and before the displaced code.
fn routine_epilogue_lines() -> Vec<String> {
    let mut lines = restore_lines(&SCRATCH_REGISTERS);
    lines.extend(restore_lines(&POINTER_REGISTERS));
    lines
}

fn check_bounds(rom: &[u8], offset: usize, needed: usize) -> Result<(), HookError> {
    match offset.checked_add(needed) {
        Some(end) if end <= rom.len() => Ok(()),
        _ => Err(HookError::RomTooSmall {
            offset,
            needed,
            len: rom.len(),
        }),
    }
}

/// Everything [`apply_hook`] changes, computed without touching the ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPatch {
    /// Words to write at the controller jump site.
    pub site: Vec<u32>,
    /// Routine to store in the descriptor's packed file slot.
    pub stored_routine: Vec<u8>,
    /// The instructions the site held before it was first hooked.
    pub displaced: Vec<u32>,
}

/// Read the displaced instructions back out of a stored routine.
pub fn displaced_words(stored_routine: &[u8]) -> Result<Vec<u32>, HookError> {
    let tail = (DISPLACED_WORDS + RETURN_WORDS) * 4;
    if stored_routine.len() < tail {
        return Err(HookError::MissingDisplacedCode(stored_routine.len()));
    }
    let start = stored_routine.len() - tail;
    let mut words = vec![0; DISPLACED_WORDS];
    BigEndian::read_u32_into(
        &stored_routine[start..start + DISPLACED_WORDS * 4],
        &mut words,
    );
    Ok(words)
}

/// Work out the site patch and the stored routine for `routine`.
///
/// A site that already holds the trampoline jump has lost its original instructions, so they
/// are recovered from the routine stored by the previous run.
#[tracing::instrument(skip(rom, routine, fs, encoder))]
pub fn plan_hook(
    rom: &[u8],
    descriptor: &HookDescriptor,
    routine: &[u8],
    fs: &dyn PackedFileSystem,
    encoder: &dyn InstructionEncoder,
) -> Result<HookPatch, HookError> {
    let offset = descriptor.controller_jump_rom_offset;
    check_bounds(rom, offset, DISPLACED_WORDS * 4)?;

    let mut current = vec![0; DISPLACED_WORDS];
    BigEndian::read_u32_into(&rom[offset..offset + DISPLACED_WORDS * 4], &mut current);

    let jump = encoder.encode(&descriptor.site_jump())?;
    let displaced = if current[0] == jump {
        tracing::warn!("ROM is already hooked, recovering displaced code from the stored routine");
        displaced_words(&fs.read(descriptor.fs_dir, descriptor.fs_file)?)?
    } else {
        current
    };

    let mut site = vec![jump];
    site.resize(DISPLACED_WORDS, encoder.encode("nop")?);

    let return_lines = vec![
        format!("j 0x{:08X}", descriptor.return_address()),
        "nop".to_owned(),
    ];
    let mut stored_routine = words_to_bytes(&encoder.encode_all(&routine_prologue_lines())?);
    stored_routine.extend_from_slice(routine);
    stored_routine.extend(words_to_bytes(
        &encoder.encode_all(&routine_epilogue_lines())?,
    ));
    stored_routine.extend(words_to_bytes(&displaced));
    stored_routine.extend(words_to_bytes(&encoder.encode_all(&return_lines)?));

    Ok(HookPatch {
        site,
        stored_routine,
        displaced,
    })
}

fn write_words(rom: &mut [u8], offset: usize, words: &[u32]) -> Result<(), HookError> {
    check_bounds(rom, offset, words.len() * 4)?;
    BigEndian::write_u32_into(words, &mut rom[offset..offset + words.len() * 4]);
    Ok(())
}

/// Redirect the controller jump site to the hook and store `routine` out of line.
///
/// The stored routine runs `routine`, then the displaced instructions, then returns to the
/// instruction after the site.
#[tracing::instrument(skip(rom, routine, fs, encoder))]
pub fn apply_hook(
    rom: &mut [u8],
    descriptor: &HookDescriptor,
    routine: &[u8],
    fs: &mut dyn PackedFileSystem,
    encoder: &dyn InstructionEncoder,
) -> Result<HookPatch, HookError> {
    let patch = plan_hook(rom, descriptor, routine, &*fs, encoder)?;
    fs.write(descriptor.fs_dir, descriptor.fs_file, &patch.stored_routine)?;
    write_words(rom, descriptor.controller_jump_rom_offset, &patch.site)?;
    Ok(patch)
}

fn hook_code_words(
    descriptor: &HookDescriptor,
    read_primitive: u32,
    encoder: &dyn InstructionEncoder,
) -> Result<Vec<u32>, HookError> {
    let mut words = vec![descriptor.cache_sentinel];
    words.extend(encoder.encode_all(&trampoline_lines(descriptor, read_primitive))?);
    Ok(words)
}

/// Write the cache cell and the trampoline at `hook_rom_offset`.
#[tracing::instrument(skip(rom, encoder))]
pub fn write_hook_code(
    rom: &mut [u8],
    descriptor: &HookDescriptor,
    read_primitive: u32,
    encoder: &dyn InstructionEncoder,
) -> Result<usize, HookError> {
    let words = hook_code_words(descriptor, read_primitive, encoder)?;
    write_words(rom, descriptor.hook_rom_offset, &words)?;
    Ok(words.len() * 4)
}

/// Store the session's cheats in the packed file system and hook them into `rom`.
///
/// The read primitive is resolved and every instruction encoded before anything is written,
/// so on error neither the ROM nor the file system has changed.
#[tracing::instrument(skip(rom, symbols, session, fs, encoder))]
pub fn embed_cheats(
    rom: &mut [u8],
    descriptor: &HookDescriptor,
    game: GameBuild,
    symbols: &SymbolTable,
    session: &CheatSession,
    fs: &mut dyn PackedFileSystem,
    encoder: &dyn InstructionEncoder,
) -> Result<HookPatch, HookError> {
    let read_primitive = symbols
        .get_symbol(game, READ_PRIMITIVE)
        .map_err(HookError::MissingPrimitive)?;

    let hook_code = hook_code_words(descriptor, read_primitive, encoder)?;
    check_bounds(rom, descriptor.hook_rom_offset, hook_code.len() * 4)?;
    let patch = plan_hook(rom, descriptor, &session.joined(), &*fs, encoder)?;

    fs.write(descriptor.fs_dir, descriptor.fs_file, &patch.stored_routine)?;
    write_words(rom, descriptor.controller_jump_rom_offset, &patch.site)?;
    write_words(rom, descriptor.hook_rom_offset, &hook_code)?;

    tracing::debug!(
        "embedded {} cheat routines ({} bytes stored)",
        session.routine_count(),
        patch.stored_routine.len()
    );
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::mips::MipsEncoder;

    use pretty_assertions::assert_eq;

    const ORIGINAL: [u8; 16] = [
        0x27, 0xBD, 0xFF, 0xE8, // addiu sp, sp, -0x18
        0xAF, 0xBF, 0x00, 0x10, // sw ra, 0x10(sp)
        0x3C, 0x04, 0x80, 0x0C, // lui a0, 0x800C
        0x8C, 0x84, 0x40, 0x00, // lw a0, 0x4000(a0)
    ];

    const DESCRIPTOR: &str = "
# test layout
fs_dir 0x0A
fs_file 0xF0
hook_rom_offset 0x41A00
hook_ram_offset 0x80040E00
controller_jump_rom_offset 0x6B30
controller_jump_ram_offset 0x80005F30
cache_sentinel 0x4D503243
";

    fn descriptor() -> HookDescriptor {
        HookDescriptor {
            fs_dir: 0x09,
            fs_file: 0xF0,
            hook_rom_offset: 0x0003_3F00,
            hook_ram_offset: 0x8003_3300,
            controller_jump_rom_offset: 0x0000_5A10,
            controller_jump_ram_offset: 0x8000_4E10,
            cache_sentinel: 0x4D50_3143,
        }
    }

    fn rom_for(descriptor: &HookDescriptor) -> Vec<u8> {
        let mut rom = vec![0; descriptor.hook_rom_offset + 0x200];
        let site = descriptor.controller_jump_rom_offset;
        rom[site..site + 16].copy_from_slice(&ORIGINAL);
        rom
    }

    fn registers(line: &str) -> Vec<&str> {
        line.split(|ch: char| !ch.is_ascii_alphanumeric())
            .filter(|token| !token.is_empty())
            .skip(1)
            .collect()
    }

    #[test]
    fn test_load_descriptor() -> Result<(), HookError> {
        assert_eq!(
            HookDescriptor::load(DESCRIPTOR)?,
            HookDescriptor {
                fs_dir: 0x0A,
                fs_file: 0xF0,
                hook_rom_offset: 0x0004_1A00,
                hook_ram_offset: 0x8004_0E00,
                controller_jump_rom_offset: 0x0000_6B30,
                controller_jump_ram_offset: 0x8000_5F30,
                cache_sentinel: 0x4D50_3243,
            }
        );
        Ok(())
    }

    #[test]
    fn test_load_descriptor_errors() {
        let without = |key: &str| {
            DESCRIPTOR
                .lines()
                .filter(|line| !line.starts_with(key))
                .map(|line| format!("{}\n", line))
                .collect::<String>()
        };

        let result = HookDescriptor::load(&without("cache_sentinel"));
        assert!(matches!(result, Err(HookError::MissingField("cache_sentinel"))));

        let result = HookDescriptor::load(&format!("{}fs_dir 1\n", DESCRIPTOR));
        assert!(matches!(result, Err(HookError::DuplicateField("fs_dir"))));

        let result = HookDescriptor::load(&format!("{}hook_size 0x20\n", DESCRIPTOR));
        assert!(matches!(
            result,
            Err(HookError::Descriptor { line: 10, ref text }) if text == "hook_size 0x20"
        ));

        let result = HookDescriptor::load(&format!("{}fs_dir\n", without("fs_dir")));
        assert!(matches!(result, Err(HookError::Descriptor { .. })));

        let result = HookDescriptor::load(&format!(
            "{}hook_ram_offset 0x80040E02\n",
            without("hook_ram_offset")
        ));
        assert!(matches!(
            result,
            Err(HookError::UnalignedField {
                field: "hook_ram_offset",
                value: 0x8004_0E02
            })
        ));
    }

    #[test]
    fn test_trampoline_branches_to_resolved_jump() -> Result<(), EncodeError> {
        let descriptor = descriptor();
        let lines = trampoline_lines(&descriptor, 0x8001_0C58);

        let branch = lines.iter().position(|l| l.starts_with("bne")).unwrap();
        let offset: usize = lines[branch].rsplit(' ').next().unwrap().parse().unwrap();
        assert_eq!(lines[branch + 1 + offset], "jr t8");
        assert_eq!(lines.last().unwrap(), "nop");
        assert!(lines.contains(&"jal 0x80010C58".to_string()));
        assert!(lines.contains(&"sw v0, 0x3300(t9)".to_string()));

        let words = MipsEncoder::new().encode_all(&lines)?;
        assert_eq!(words.len(), lines.len());
        assert_eq!(words[0], 0x27BD_FFF8); // addiu sp, sp, -0x8
        Ok(())
    }

    #[test]
    fn test_hook_leaves_kernel_registers_alone() {
        let descriptor = descriptor();
        let mut lines = trampoline_lines(&descriptor, 0x8001_0C58);
        lines.extend(routine_prologue_lines());
        lines.extend(routine_epilogue_lines());

        for line in &lines {
            let used = registers(line);
            assert!(
                !used.contains(&"k0") && !used.contains(&"k1"),
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_pointer_registers_popped_by_routine() {
        let trampoline = trampoline_lines(&descriptor(), 0x8001_0C58);
        let epilogue = routine_epilogue_lines();

        assert_eq!(
            trampoline[..3].to_vec(),
            vec!["addiu sp, sp, -0x8", "sw t8, 0x0(sp)", "sw t9, 0x4(sp)"]
        );
        assert_eq!(
            epilogue[epilogue.len() - 3..].to_vec(),
            vec!["lw t8, 0x0(sp)", "lw t9, 0x4(sp)", "addiu sp, sp, 0x8"]
        );
        // Both paths through the trampoline reach the jump with the pointer frame still pushed.
        let frames: i32 = trampoline
            .iter()
            .filter_map(|line| line.strip_prefix("addiu sp, sp, "))
            .map(|size| match size.strip_prefix('-') {
                Some(hex) => -i32::from_str_radix(&hex[2..], 16).unwrap(),
                None => i32::from_str_radix(&size[2..], 16).unwrap(),
            })
            .sum();
        assert_eq!(frames, -8);
    }

    #[test]
    fn test_apply_hook_preserves_displaced_code() -> Result<(), HookError> {
        let descriptor = HookDescriptor::load(DESCRIPTOR)?;
        let encoder = MipsEncoder::new();
        let mut rom = rom_for(&descriptor);
        let mut fs = MemoryFileSystem::new();

        let patch = apply_hook(&mut rom, &descriptor, &[0; 8], &mut fs, &encoder)?;

        let site = descriptor.controller_jump_rom_offset;
        assert_eq!(
            rom[site..site + 16].to_vec(),
            vec![0x08, 0x01, 0x03, 0x81, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        let stored = fs.read(descriptor.fs_dir, descriptor.fs_file)?;
        assert_eq!(stored, patch.stored_routine);
        let tail = &stored[stored.len() - 24..stored.len() - 8];
        assert_eq!(tail, &ORIGINAL[..]);
        Ok(())
    }

    #[test]
    fn test_apply_hook_twice_is_stable() -> Result<(), HookError> {
        let descriptor = descriptor();
        let encoder = MipsEncoder::new();
        let mut rom = rom_for(&descriptor);
        let mut fs = MemoryFileSystem::new();

        let first = apply_hook(&mut rom, &descriptor, &[1, 2, 3, 4], &mut fs, &encoder)?;
        let hooked = rom.clone();
        let second = apply_hook(&mut rom, &descriptor, &[1, 2, 3, 4], &mut fs, &encoder)?;

        assert_eq!(rom, hooked);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_write_hook_code() -> Result<(), HookError> {
        let descriptor = descriptor();
        let mut rom = rom_for(&descriptor);

        let len = write_hook_code(&mut rom, &descriptor, 0x8001_0C58, &MipsEncoder::new())?;

        let offset = descriptor.hook_rom_offset;
        assert_eq!(rom[offset..offset + 4].to_vec(), vec![0x4D, 0x50, 0x31, 0x43]);
        assert_eq!(rom[offset + 4..offset + 8].to_vec(), vec![0x27, 0xBD, 0xFF, 0xF8]);
        assert_eq!(
            len,
            4 * (1 + trampoline_lines(&descriptor, 0x8001_0C58).len())
        );
        Ok(())
    }

    #[test]
    fn test_rom_too_small() {
        let descriptor = descriptor();
        let mut rom = vec![0; 0x100];
        let mut fs = MemoryFileSystem::new();

        let result = apply_hook(&mut rom, &descriptor, &[], &mut fs, &MipsEncoder::new());
        assert!(matches!(result, Err(HookError::RomTooSmall { .. })));
        assert!(fs.is_empty());
    }

    #[test]
    fn test_missing_primitive_leaves_rom_untouched() {
        let descriptor = descriptor();
        let mut rom = rom_for(&descriptor);
        let original = rom.clone();
        let mut fs = MemoryFileSystem::new();
        let symbols = SymbolTable::new();
        let mut session = CheatSession::new();
        session.push(vec![0; 4]);

        let result = embed_cheats(
            &mut rom,
            &descriptor,
            GameBuild::Mp1Usa,
            &symbols,
            &session,
            &mut fs,
            &MipsEncoder::new(),
        );

        assert!(matches!(result, Err(HookError::MissingPrimitive(_))));
        assert_eq!(rom, original);
        assert!(fs.is_empty());
    }
}
