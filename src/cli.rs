use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    cheats::{self, compiler, CheatSession},
    event_table::EventTable,
    events::{CustomAsmEvent, Event, EventOutput},
    fs::DirectoryFileSystem,
    game::GameBuild,
    hexdump::hexdump_words,
    hook::{embed_cheats, HookDescriptor},
    mips::MipsEncoder,
    params::{ParameterType, ParameterValue, ParameterValues},
    scoping::scope_labels,
    snippet::GenerationContext,
    symbols::{SymbolKind, SymbolTable},
};

/// Parse `0x`-prefixed hex or decimal.
fn parse_number(text: &str) -> Result<u32, String> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|err| format!("invalid number '{}': {}", text, err))
}

/// Parse a number that may carry a leading `-`, e.g. `-5` or `-0x10`.
fn parse_signed(text: &str) -> Result<i64, String> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = i64::from(parse_number(digits)?);
    Ok(if negative { -value } else { value })
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Unable to read {}", path.display()))
}

#[derive(Args, Debug)]
pub struct ScopeArgs {
    #[clap(help = "Assembly file to scope")]
    pub input: PathBuf,
    #[clap(long, help = "Keep .beginglobal/.endglobal lines in the output")]
    pub keep_markers: bool,
}

#[tracing::instrument]
pub fn scope(args: &ScopeArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let scoped = scope_labels(&text, args.keep_markers)
        .with_context(|| format!("Unable to scope {}", args.input.display()))?;
    print!("{}", scoped);
    Ok(())
}

#[derive(Args, Debug)]
pub struct CheatArgs {
    #[clap(help = "File holding a cheat list")]
    pub input: PathBuf,
    #[clap(long, help = "Print the compiled routine as instructions instead of words")]
    pub asm: bool,
}

#[tracing::instrument]
pub fn cheats(args: &CheatArgs) -> Result<()> {
    let codes = cheats::parse(&read_text(&args.input)?).with_context(|| "Invalid cheat list")?;
    for code in &codes {
        println!("{}", code);
    }
    println!();

    if args.asm {
        for line in compiler::routine_lines(&codes) {
            println!("  {}", line);
        }
    } else {
        let routine = compiler::compile(&codes, &MipsEncoder::new())
            .with_context(|| "Compilation failed")?;
        println!("{}", hexdump_words(&routine, 0, 4));
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct EventTableArgs {
    #[clap(help = "ROM image")]
    pub rom: PathBuf,
    #[clap(value_parser = parse_number, help = "Offset of the event table in the ROM")]
    pub offset: u32,
}

#[tracing::instrument]
pub fn events(args: &EventTableArgs) -> Result<()> {
    let rom = read_bytes(&args.rom)?;
    let table = EventTable::parse(&rom, args.offset as usize)
        .with_context(|| format!("No event table at {:#x}", args.offset))?;
    print!("{}", table);
    println!(
        "{} entries, {} bytes",
        table.len(),
        EventTable::byte_length(table.len())
    );
    Ok(())
}

#[derive(Args, Debug)]
pub struct SymbolArgs {
    #[clap(help = "Symbol file")]
    pub input: PathBuf,
    #[clap(help = "Game build, e.g. MP1_USA")]
    pub game: GameBuild,
    #[clap(long, help = "Only list symbols of this kind (F or D)")]
    pub kind: Option<SymbolKind>,
}

#[tracing::instrument]
pub fn symbols(args: &SymbolArgs) -> Result<()> {
    let mut table = SymbolTable::new();
    table
        .load(args.game, &read_text(&args.input)?)
        .with_context(|| format!("Unable to load {}", args.input.display()))?;
    for symbol in table.get_symbols(args.game, args.kind) {
        println!("{}", symbol);
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct CustomEventArgs {
    #[clap(help = "Custom event assembly file")]
    pub input: PathBuf,
    #[clap(help = "Game build, e.g. MP1_USA")]
    pub game: GameBuild,
    #[clap(help = "Index of the space the event is placed on")]
    pub space: u16,
    #[clap(long = "value", help = "Parameter value as NAME=VALUE")]
    pub values: Vec<String>,
}

fn parse_value(kind: &ParameterType, text: &str) -> Result<ParameterValue> {
    let number = |text: &str| -> Result<i64> {
        parse_signed(text.trim()).map_err(anyhow::Error::msg)
    };
    Ok(match kind {
        ParameterType::Boolean => ParameterValue::Boolean(matches!(text, "1" | "true")),
        ParameterType::Number | ParameterType::PositiveNumber => {
            ParameterValue::Number(number(text)?)
        }
        ParameterType::Space => ParameterValue::Space(u16::try_from(number(text)?)?),
        ParameterType::NumberArray => ParameterValue::NumberArray(
            text.split(',').map(number).collect::<Result<Vec<i64>>>()?,
        ),
        ParameterType::Other(_) => ParameterValue::Text(text.to_owned()),
    })
}

#[tracing::instrument]
pub fn custom_event(args: &CustomEventArgs) -> Result<()> {
    let event = CustomAsmEvent::parse(&read_text(&args.input)?)
        .with_context(|| format!("Invalid event header in {}", args.input.display()))?;

    let mut values = ParameterValues::new();
    for assignment in &args.values {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected NAME=VALUE, found '{}'", assignment))?;
        let parameter = event
            .parameters()
            .iter()
            .find(|p| p.name == name)
            .with_context(|| format!("{} has no parameter '{}'", event.name(), name))?;
        values.insert(name.to_owned(), parse_value(&parameter.kind, value)?);
    }

    let ctx = GenerationContext::new(args.game, 0, event.parameters(), &values);
    match event.write(&mut [], &ctx, args.space)? {
        EventOutput::Asm(asm) => print!("{}", asm),
        EventOutput::Bytes { offset, len } => println!("{} bytes at {:#x}", len, offset),
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct EmbedArgs {
    #[clap(help = "ROM image to patch")]
    pub rom: PathBuf,
    #[clap(help = "Game build, e.g. MP1_USA")]
    pub game: GameBuild,
    #[clap(help = "Symbol file of the game build")]
    pub symbols: PathBuf,
    #[clap(help = "Directory holding the unpacked file system")]
    pub fs: PathBuf,
    #[clap(long, help = "Hook descriptor file of the game build")]
    pub hook: PathBuf,
    #[clap(required = true, help = "Cheat list files, applied in order")]
    pub cheats: Vec<PathBuf>,
    #[clap(short, long, help = "Output ROM, defaults to overwriting the input")]
    pub output: Option<PathBuf>,
}

#[tracing::instrument]
pub fn embed(args: &EmbedArgs) -> Result<()> {
    let encoder = MipsEncoder::new();
    let mut symbols = SymbolTable::new();
    symbols
        .load(args.game, &read_text(&args.symbols)?)
        .with_context(|| format!("Unable to load {}", args.symbols.display()))?;

    let descriptor = HookDescriptor::load(&read_text(&args.hook)?)
        .with_context(|| format!("Unable to load {}", args.hook.display()))?;

    let mut session = CheatSession::new();
    for path in &args.cheats {
        let len = session
            .add_text(&read_text(path)?, &encoder)
            .with_context(|| format!("Unable to compile {}", path.display()))?;
        eprintln!("{}: {} bytes", path.display(), len);
    }

    let mut rom = read_bytes(&args.rom)?;
    let mut fs = DirectoryFileSystem::new(&args.fs);
    let patch = embed_cheats(
        &mut rom,
        &descriptor,
        args.game,
        &symbols,
        &session,
        &mut fs,
        &encoder,
    )
    .with_context(|| "Embedding cheats failed")?;

    let output = args.output.as_ref().unwrap_or(&args.rom);
    std::fs::write(output, &rom).with_context(|| "Unable to write file")?;
    eprintln!(
        "Wrote {} ({} bytes of cheat code stored)",
        output.display(),
        patch.stored_routine.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0x1A"), Ok(0x1A));
        assert_eq!(parse_number("26"), Ok(26));
        assert!(parse_number("0xZZ").is_err());
        assert_eq!(parse_signed("-0x10"), Ok(-16));
        assert_eq!(parse_signed("7"), Ok(7));
        assert!(parse_signed("--7").is_err());
    }

    #[test]
    fn test_parse_value() -> Result<()> {
        assert_eq!(
            parse_value(&ParameterType::Space, "12")?,
            ParameterValue::Space(12)
        );
        assert_eq!(
            parse_value(&ParameterType::NumberArray, "1, 0x2")?,
            ParameterValue::NumberArray(vec![1, 2])
        );
        assert_eq!(
            parse_value(&ParameterType::Boolean, "true")?,
            ParameterValue::Boolean(true)
        );
        assert_eq!(
            parse_value(&ParameterType::Number, "-5")?,
            ParameterValue::Number(-5)
        );
        assert_eq!(
            parse_value(&ParameterType::NumberArray, "-1,0x10,-0x10")?,
            ParameterValue::NumberArray(vec![-1, 16, -16])
        );
        assert!(parse_value(&ParameterType::Space, "70000").is_err());
        assert!(parse_value(&ParameterType::Space, "-1").is_err());
        Ok(())
    }
}
