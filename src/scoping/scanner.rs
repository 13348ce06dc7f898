/// A slice of assembly text, classified just enough to rewrite identifiers safely.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Piece<'a> {
    /// A maximal run of identifier characters, e.g. `FOO`, `@FOO`, `.definelabel`, `0x10`.
    Identifier(&'a str),
    /// `; ...`, `// ...` up to (not including) the newline, or a `/* ... */` block.
    Comment(&'a str),
    /// A double-quoted string literal including its quotes.
    Str(&'a str),
    /// Everything else: whitespace, punctuation, newlines.
    Text(&'a str),
}

impl<'a> Piece<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Piece::Identifier(s) | Piece::Comment(s) | Piece::Str(s) | Piece::Text(s) => s,
        }
    }
}

/// Characters that may appear inside a label or constant name.
///
/// A label occurrence only counts as a reference when neither neighbour is one of these.
pub fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '@' || ch == '.'
}

/// Splits text into [`Piece`]s. Concatenating the pieces gives back the input unchanged.
pub struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_comment(&self) -> bool {
        let rest = self.rest();
        rest.starts_with(';') || rest.starts_with("//") || rest.starts_with("/*")
    }

    fn take(&mut self, len: usize) -> &'a str {
        let start = self.position;
        self.position += len;
        &self.input[start..self.position]
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, ch)| !predicate(ch))
            .map_or(self.rest().len(), |(ix, _)| ix);
        self.take(len)
    }

    fn read_comment(&mut self) -> &'a str {
        let rest = self.rest();
        let len = if rest.starts_with("/*") {
            rest.find("*/").map_or(rest.len(), |ix| ix + 2)
        } else {
            rest.find('\n').unwrap_or(rest.len())
        };
        self.take(len)
    }

    fn read_string(&mut self) -> &'a str {
        // Skip the opening quote, then stop after the first unescaped closing quote.
        let mut escaped = false;
        let len = self
            .rest()
            .char_indices()
            .skip(1)
            .find(|&(_, ch)| {
                let closes = ch == '"' && !escaped;
                escaped = ch == '\\' && !escaped;
                closes || ch == '\n'
            })
            .map_or(self.rest().len(), |(ix, ch)| if ch == '"' { ix + 1 } else { ix });
        self.take(len)
    }

    fn read_text(&mut self) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if is_identifier_char(ch) || ch == '"' || self.at_comment() {
                break;
            }
            self.position += ch.len_utf8();
        }
        &self.input[start..self.position]
    }

    pub fn next_piece(&mut self) -> Option<Piece<'a>> {
        let ch = self.peek_char()?;
        let piece = if self.at_comment() {
            Piece::Comment(self.read_comment())
        } else if ch == '"' {
            Piece::Str(self.read_string())
        } else if is_identifier_char(ch) {
            Piece::Identifier(self.read_while(is_identifier_char))
        } else {
            Piece::Text(self.read_text())
        };
        Some(piece)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_piece()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_label_line() {
        let pieces: Vec<Piece> = Scanner::new("loop: addiu t0, t0, 1").collect();
        assert_eq!(
            pieces,
            vec![
                Piece::Identifier("loop"),
                Piece::Text(": "),
                Piece::Identifier("addiu"),
                Piece::Text(" "),
                Piece::Identifier("t0"),
                Piece::Text(", "),
                Piece::Identifier("t0"),
                Piece::Text(", "),
                Piece::Identifier("1"),
            ]
        );
    }

    #[test]
    fn test_comments_and_strings() {
        let input = "lw a0, lo(FOO)(a0) ; FOO\n.ascii \"FOO \\\" x\" // FOO\n/* FOO */ FOO";
        let pieces: Vec<Piece> = Scanner::new(input).collect();
        assert_eq!(
            pieces,
            vec![
                Piece::Identifier("lw"),
                Piece::Text(" "),
                Piece::Identifier("a0"),
                Piece::Text(", "),
                Piece::Identifier("lo"),
                Piece::Text("("),
                Piece::Identifier("FOO"),
                Piece::Text(")("),
                Piece::Identifier("a0"),
                Piece::Text(") "),
                Piece::Comment("; FOO"),
                Piece::Text("\n"),
                Piece::Identifier(".ascii"),
                Piece::Text(" "),
                Piece::Str("\"FOO \\\" x\""),
                Piece::Text(" "),
                Piece::Comment("// FOO"),
                Piece::Text("\n"),
                Piece::Comment("/* FOO */"),
                Piece::Text(" "),
                Piece::Identifier("FOO"),
            ]
        );
    }

    #[test]
    fn test_pieces_reassemble() {
        let input = "  .definelabel Ünïcode_1,0x10\r\n@scoped: jal @scoped\n\"open";
        let joined: String = Scanner::new(input).map(|piece| piece.as_str()).collect();
        assert_eq!(joined, input);
    }
}
