/// Game builds patches are generated for.
pub mod game;

/// Per-build symbol tables loaded from symbol files.
pub mod symbols;

/// Makes the labels of a generated assembly block static so that blocks can be concatenated.
///
/// The steps are:
/// 1. **Regions** - splitting the text on `.beginglobal`/`.endglobal` markers
/// 2. **Candidates** - collecting the labels declared outside global regions
/// 3. **Rewriting** - prefixing whole-identifier occurrences of the candidates with `@`
pub mod scoping;

/// Turns event parameter values into `.definelabel` directives.
pub mod params;

/// Builds assemblable text blocks from a body, symbols and parameters.
pub mod snippet;

/// Binary codec for the per-space event tables.
pub mod event_table;

/// The interface every board event implements, and events written as plain assembly.
pub mod events;

/// Cheat lists and the session buffer of compiled cheat routines.
pub mod cheats;

/// Single-instruction MIPS encoder.
pub mod mips;

/// Access to the game's packed file system.
pub mod fs;

/// Hooks stored cheat routines into a ROM through a lazily resolved trampoline.
pub mod hook;

/// Command line front-end.
pub mod cli;

/// Hexdump utility
pub mod hexdump;

/// Tracing setup
pub mod instrumentation;
