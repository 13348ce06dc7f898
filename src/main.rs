use anyhow::Result;
use clap::{Parser, Subcommand};

use boardpatch::{
    cli::{
        cheats, custom_event, embed, events, scope, symbols, CheatArgs, CustomEventArgs,
        EmbedArgs, EventTableArgs, ScopeArgs, SymbolArgs,
    },
    instrumentation,
};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[clap(long)]
    #[clap(help = "Enable chrome tracing")]
    #[clap(long_help = "Enable chrome tracing which on program exit will generate
a json file to be opened with a chrome tracing compatible
viewer.")]
    trace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[clap(about = "Make the labels of an assembly file static")]
    #[clap(aliases = &["s"])]
    Scope(ScopeArgs),
    #[clap(about = "Parse and compile a cheat list")]
    #[clap(aliases = &["c"])]
    Cheats(CheatArgs),
    #[clap(about = "Dump the event table at a ROM offset")]
    #[clap(aliases = &["e"])]
    Events(EventTableArgs),
    #[clap(about = "List the public symbols of a symbol file")]
    #[clap(aliases = &["sym"])]
    Symbols(SymbolArgs),
    #[clap(about = "Generate the code of a custom assembly event")]
    #[clap(aliases = &["cu"])]
    Custom(CustomEventArgs),
    #[clap(about = "Embed cheat lists into a ROM")]
    Embed(EmbedArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _trace_guard = instrumentation::init(cli.trace);

    match &cli.command {
        Command::Scope(args) => scope(args),
        Command::Cheats(args) => cheats(args),
        Command::Events(args) => events(args),
        Command::Symbols(args) => symbols(args),
        Command::Custom(args) => custom_event(args),
        Command::Embed(args) => embed(args),
    }
}
