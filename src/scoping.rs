use std::collections::HashSet;

use thiserror::Error;

use self::scanner::{Piece, Scanner};

/// Splits assembly text into identifiers, comments, strings and everything else.
pub mod scanner;

/// Prefix put in front of a label to make it static, i.e. local to its `.beginfile` block.
pub const SCOPE_MARKER: char = '@';

/// Labels with this prefix belong to the generator itself and are never scoped.
pub const RESERVED_PREFIX: &str = "__INTERNAL_";

/// Opens a region whose label declarations stay global.
pub const REGION_BEGIN: &str = ".beginglobal";
/// Closes a region opened by [`REGION_BEGIN`].
pub const REGION_END: &str = ".endglobal";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Line {line}: .beginglobal inside another .beginglobal region")]
    NestedRegion { line: usize },
    #[error("Line {line}: unbalanced .beginglobal/.endglobal")]
    UnbalancedRegion { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Begin,
    End,
}

fn region_marker(line: &str) -> Option<Marker> {
    let code: String = Scanner::new(line)
        .filter(|piece| !matches!(piece, Piece::Comment(_)))
        .map(|piece| piece.as_str())
        .collect();
    let code = code.trim();
    if code.eq_ignore_ascii_case(REGION_BEGIN) {
        Some(Marker::Begin)
    } else if code.eq_ignore_ascii_case(REGION_END) {
        Some(Marker::End)
    } else {
        None
    }
}

/// The three variants of the input produced by walking the region markers.
#[derive(Debug, Default)]
struct Regions {
    /// Text outside every global region; the only place candidates are taken from.
    outside: String,
    /// Full text with the marker lines removed.
    unmarked: String,
    /// Full text, markers included.
    marked: String,
}

fn split_regions(text: &str) -> Result<Regions, ScopeError> {
    let mut regions = Regions::default();
    let mut open_line: Option<usize> = None;

    for (ix, line) in text.split_inclusive('\n').enumerate() {
        let line_number = ix + 1;
        regions.marked.push_str(line);
        match region_marker(line) {
            Some(Marker::Begin) => {
                if open_line.is_some() {
                    return Err(ScopeError::NestedRegion { line: line_number });
                }
                open_line = Some(line_number);
            }
            Some(Marker::End) => {
                if open_line.take().is_none() {
                    return Err(ScopeError::UnbalancedRegion { line: line_number });
                }
            }
            None => {
                regions.unmarked.push_str(line);
                if open_line.is_none() {
                    regions.outside.push_str(line);
                }
            }
        }
    }

    match open_line {
        Some(line) => Err(ScopeError::UnbalancedRegion { line }),
        None => Ok(regions),
    }
}

fn is_scopable(name: &str) -> bool {
    !name.starts_with(SCOPE_MARKER)
        && !name.starts_with(RESERVED_PREFIX)
        && !name.starts_with('.')
        && name.chars().next().map_or(false, |ch| !ch.is_ascii_digit())
}

/// Name declared on a line, either `NAME:` or `.definelabel NAME, value`.
fn declared_name(line: &str) -> Option<&str> {
    let mut pieces = Scanner::new(line).filter(|piece| match piece {
        Piece::Text(text) => !text.trim().is_empty(),
        _ => true,
    });

    match (pieces.next()?, pieces.next()) {
        (Piece::Identifier(directive), Some(Piece::Identifier(name)))
            if directive.eq_ignore_ascii_case(".definelabel") =>
        {
            Some(name)
        }
        (Piece::Identifier(label), Some(Piece::Text(text))) if text.trim_start().starts_with(':') => {
            // `FOO :` is not a label, only `FOO:` is.
            let after_label = &line[line.find(label)? + label.len()..];
            after_label.starts_with(':').then_some(label)
        }
        _ => None,
    }
}

fn collect_candidates(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .filter_map(declared_name)
        .filter(|name| is_scopable(name))
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_owned)
        .collect()
}

/// Labels of `text` that [`scope_labels`] would make static, in declaration order.
#[tracing::instrument(skip(text))]
pub fn scoping_candidates(text: &str) -> Result<Vec<String>, ScopeError> {
    let regions = split_regions(text)?;
    Ok(collect_candidates(&regions.outside))
}

/// Prefix every standalone occurrence of a candidate with [`SCOPE_MARKER`].
///
/// Comments and string literals are copied untouched. An occurrence only matches when it is a
/// whole identifier, so `FOOBAR`, `BARFOO` and an already scoped `@FOO` are left alone for the
/// candidate `FOO`; running this twice gives the same text as running it once.
pub fn rescope<S: AsRef<str>>(text: &str, candidates: &[S]) -> String {
    let candidates: HashSet<&str> = candidates.iter().map(|c| c.as_ref()).collect();
    let mut output = String::with_capacity(text.len() + candidates.len() * 4);

    for piece in Scanner::new(text) {
        if let Piece::Identifier(ident) = piece {
            if candidates.contains(ident) {
                output.push(SCOPE_MARKER);
            }
        }
        output.push_str(piece.as_str());
    }

    output
}

/// Make every label declared in `text` static so that independently written snippets can
/// be concatenated into one assembly unit without name collisions.
///
/// Labels declared between `.beginglobal` and `.endglobal` keep their global names. With
/// `keep_markers` the marker lines stay in the output, otherwise they are removed.
#[tracing::instrument(skip(text))]
pub fn scope_labels(text: &str, keep_markers: bool) -> Result<String, ScopeError> {
    let regions = split_regions(text)?;
    let candidates = collect_candidates(&regions.outside);
    tracing::debug!(candidates = candidates.len(), "scoping labels");

    let base = if keep_markers {
        &regions.marked
    } else {
        &regions.unmarked
    };

    Ok(rescope(base, &candidates))
}
