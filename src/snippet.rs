use crate::{
    game::GameBuild,
    params::{make_parameter_symbol_labels, EventParameter, ParameterValues},
    scoping::{scope_labels, ScopeError, RESERVED_PREFIX},
    symbols::SymbolTable,
};

/// Everything a generator knows about the snippet it is producing.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub game: GameBuild,
    /// Address the assembled snippet will be loaded at.
    pub address: u32,
    /// Chain table of the board, when the caller has one.
    pub chains: Option<&'a [Vec<u16>]>,
    pub parameters: &'a [EventParameter],
    pub values: &'a ParameterValues,
    /// Distinguishes several snippets generated for the same space.
    pub ordinal: Option<usize>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        game: GameBuild,
        address: u32,
        parameters: &'a [EventParameter],
        values: &'a ParameterValues,
    ) -> Self {
        Self {
            game,
            address,
            chains: None,
            parameters,
            values,
            ordinal: None,
        }
    }

    pub fn with_chains(mut self, chains: &'a [Vec<u16>]) -> Self {
        self.chains = Some(chains);
        self
    }

    pub fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    fn parameter_labels(&self) -> Vec<String> {
        make_parameter_symbol_labels(self.parameters, self.values, self.chains)
    }
}

/// `name` with every character that cannot appear in a label replaced by `_`.
pub fn label_safe(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

/// `.definelabel` directives for every public symbol of the build.
pub fn make_symbol_directives(symbols: &SymbolTable, game: GameBuild) -> Vec<String> {
    symbols
        .get_symbols(game, None)
        .into_iter()
        .map(|symbol| format!(".definelabel {},0x{:08X}", symbol.name, symbol.address))
        .collect()
}

/// Name of the label marking the entry of an event's block-scoped snippet.
pub fn event_entry_label(event_id: &str, space_index: u16, ordinal: Option<usize>) -> String {
    let mut label = format!("{}EVENT_{}_{}", RESERVED_PREFIX, label_safe(event_id), space_index);
    if let Some(ordinal) = ordinal {
        label.push_str(&format!("_{}", ordinal));
    }
    label
}

/// Name of the label marking the entry of a background choice snippet.
pub fn bg_choice_entry_label(choice_index: usize) -> String {
    format!("{}BG_CHOICE_{}", RESERVED_PREFIX, choice_index)
}

/// Assemble a snippet that is the only occupant of its address range.
///
/// The result is `.org`, symbol directives, parameter directives, the body and a trailing
/// alignment, ready for the assembler.
#[tracing::instrument(skip_all, fields(game = %ctx.game, address = ctx.address))]
pub fn assemble_fixed(ctx: &GenerationContext, symbols: &SymbolTable, body: &str) -> String {
    let mut lines = vec![format!(".org 0x{:08X}", ctx.address)];
    lines.extend(make_symbol_directives(symbols, ctx.game));
    lines.extend(ctx.parameter_labels());
    lines.push(body.trim_end().to_owned());
    lines.push(".align 4".to_owned());
    lines.join("\n") + "\n"
}

fn wrap_block(entry_label: &str, directives: Vec<String>, body: &str) -> String {
    let mut lines = vec![".beginfile".to_owned(), format!("{}:", entry_label)];
    lines.extend(directives);
    lines.push(body.trim_end().to_owned());
    lines.push(".endfile".to_owned());
    lines.join("\n") + "\n"
}

/// Assemble an event body that will be concatenated with many others into one unit.
///
/// Body and parameter directives are wrapped in a `.beginfile` block behind a unique entry
/// label (see [`event_entry_label`]) and every label they declare is made static.
#[tracing::instrument(skip(ctx, body))]
pub fn assemble_scoped(
    ctx: &GenerationContext,
    event_id: &str,
    space_index: u16,
    body: &str,
) -> Result<String, ScopeError> {
    let entry_label = event_entry_label(event_id, space_index, ctx.ordinal);
    scope_labels(&wrap_block(&entry_label, ctx.parameter_labels(), body), false)
}

/// Assemble the code of one background choice, block-scoped like [`assemble_scoped`].
///
/// The body can read its own index through the `BG_CHOICE_INDEX` constant.
#[tracing::instrument(skip(ctx, body))]
pub fn assemble_bg_choice(
    ctx: &GenerationContext,
    choice_index: usize,
    body: &str,
) -> Result<String, ScopeError> {
    let mut directives = vec![format!(".definelabel BG_CHOICE_INDEX,{}", choice_index)];
    directives.extend(ctx.parameter_labels());
    scope_labels(
        &wrap_block(&bg_choice_entry_label(choice_index), directives, body),
        false,
    )
}
