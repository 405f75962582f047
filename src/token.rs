//! Tokens and the rewindable character stream the lexer scans over.

/// The category of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The sentinel "no token yet" state used to seed the adjacency DFA.
    None,
    /// An identifier matching `[A-Za-z_][A-Za-z_0-9]*`.
    Variable,
    /// A double-quoted string literal.
    String,
    /// A numeric literal matching `-?[0-9]+(\.[0-9]+)?`.
    Number,
    /// The literals `true` or `false`.
    Bool,
    /// A built-in or user-defined binary operator lexeme.
    Operator,
    /// `(`.
    LeftParen,
    /// `)`.
    RightParen,
    /// Reserved for future keyword tokens; unused by the current
    /// grammar but kept in the tag enumeration per the source model.
    Keyword,
    /// The synthetic end-of-line token the adjacency DFA checks
    /// against at the end of a successful scan.
    Eol,
    /// A lexeme that could not be classified.
    Unknown,
}

/// The payload carried by a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenPayload {
    /// No payload (used by parens, Eol, and the `None` sentinel).
    None,
    /// The lexeme text, used by `Variable`, `String`, and `Operator`
    /// tokens.
    Str(String),
    /// The parsed numeric value of a `Number` token.
    Number(f64),
    /// The parsed boolean value of a `Bool` token.
    Bool(bool),
}

/// A lexical token produced by the lexer.
///
/// Tokens are immutable once constructed; the lexer never mutates a
/// token after emitting it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// This token's category.
    pub kind: TokenKind,
    /// This token's payload.
    pub payload: TokenPayload,
    /// The byte offset in the source string where this token starts.
    pub index: usize,
}

impl Token {
    /// Constructs a new token.
    pub fn new(kind: TokenKind, payload: TokenPayload, index: usize) -> Self {
        Self {
            kind,
            payload,
            index,
        }
    }

    /// Returns the lexeme text for `Variable`, `String`, or `Operator`
    /// tokens. Panics if called on a token with a non-`Str` payload;
    /// only the parser and evaluator call this, and only on tokens
    /// they already know carry a lexeme.
    pub fn text(&self) -> &str {
        match &self.payload {
            TokenPayload::Str(s) => s,
            _ => panic!("token {:?} has no text payload", self.kind),
        }
    }
}

/// A rewindable stream of `char`s over a source string.
///
/// Mirrors the original source's rune stream: `get_next` advances and
/// returns the next character (or the end-of-stream sentinel), and
/// `rewind` steps back by one position so a lookahead character can be
/// "put back."
pub struct Stream {
    chars: Vec<char>,
    pos: usize,
}

/// The sentinel character returned once the stream is exhausted.
pub const END_OF_STREAM: char = '\n';

impl Stream {
    /// Builds a stream over `source`.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    /// Returns the next character and advances the position, or
    /// [`END_OF_STREAM`] if the stream is exhausted.
    pub fn get_next(&mut self) -> char {
        if self.pos >= self.chars.len() {
            return END_OF_STREAM;
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        c
    }

    /// Returns the current byte-offset-equivalent position (here, a
    /// char index, since the grammar is ASCII-only).
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Steps the position back by one, saturating at zero.
    pub fn rewind(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_rewind_replays_last_char() {
        let mut s = Stream::new("ab");
        assert_eq!(s.get_next(), 'a');
        s.rewind();
        assert_eq!(s.get_next(), 'a');
        assert_eq!(s.get_next(), 'b');
        assert_eq!(s.get_next(), END_OF_STREAM);
    }

    #[test]
    fn stream_rewind_at_start_saturates() {
        let mut s = Stream::new("a");
        s.rewind();
        assert_eq!(s.position(), 0);
        assert_eq!(s.get_next(), 'a');
    }
}
