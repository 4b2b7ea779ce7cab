//! The scanner: source text to coarse, position-tagged tokens.
//!
//! The scanner is deliberately under-informed. It tracks only what lexing
//! itself requires: a stack of bracket shapes (so `}` inside a template
//! substitution resumes the literal), line numbers, and a few one-token
//! heuristic flags. Everything position-dependent is deferred to the caller:
//! a leading `/` is returned as an unresolved [`TokenKind::Slash`] lookahead,
//! and the caller states whether the previous token produced a value when it
//! promotes it via [`Tokenizer::next`].

use bstr::decode_utf8;

use crate::{
    error::ClassifyError,
    lit,
    token::{Bracket, Mark, Token, TokenKind},
};

#[cfg(test)]
mod tests;

/// What the caller knows about the token before an unresolved `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueHint {
    /// The previous token produced a value: `/` is a division operator.
    Value,
    /// The previous token produced no value: `/` opens a regular expression.
    NoValue,
    /// The caller has no opinion; the scanner falls back on its own
    /// heuristic.
    Unknown,
}

impl ValueHint {
    pub(crate) fn has_value(self) -> i8 {
        match self {
            ValueHint::Value => 1,
            ValueHint::NoValue => 0,
            ValueHint::Unknown => -1,
        }
    }

    pub(crate) fn from_has_value(v: i8) -> Self {
        match v {
            1 => ValueHint::Value,
            0 => ValueHint::NoValue,
            _ => ValueHint::Unknown,
        }
    }
}

/// Maximum bracket nesting depth, including template substitutions.
pub const MAX_NEST_DEPTH: usize = 224;

// One-token-lived heuristic flags.
const FLAG_SLASH_IS_OP: u8 = 1;
const FLAG_AFTER_OP: u8 = 2;
const FLAG_EXPECT_ID: u8 = 4;

#[derive(Debug, Clone, Copy)]
struct Nest {
    shape: Bracket,
    // the next `}` closes the mandatory body of a hoisted decl used as a
    // value, e.g. `var x = class {};`
    statement: bool,
}

const ROOT_NEST: Nest = Nest { shape: Bracket::Brace, statement: false };

/// A pull scanner over a single complete source string.
///
/// Always exactly one token of lookahead: [`peek`](Self::peek) exposes it,
/// [`next`](Self::next) promotes it and reads the following one. Past the end
/// of input it returns [`TokenKind::Eof`] tokens forever.
#[derive(Debug)]
pub struct Tokenizer<'s> {
    src: &'s str,
    pos: usize,
    line: u32,
    flags: u8,
    depth: usize,
    nests: [Nest; MAX_NEST_DEPTH],
    // a `${` was found at the end of a template part
    pending_slot: bool,
    // a `}` closed a template substitution; continue the literal
    resume_template: bool,
    peeked: Token<'s>,
    // heuristic resolution for the current Slash lookahead
    peek_slash_op: bool,
}

impl<'s> Tokenizer<'s> {
    /// Starts scanning `src`, reading the first lookahead token.
    pub fn new(src: &'s str) -> Result<Self, ClassifyError> {
        let mut t = Tokenizer {
            src,
            pos: 0,
            line: 1,
            flags: 0,
            depth: 0,
            nests: [ROOT_NEST; MAX_NEST_DEPTH],
            pending_slot: false,
            resume_template: false,
            peeked: Token::EMPTY,
            peek_slash_op: false,
        };
        t.peeked = t.lex()?;
        Ok(t)
    }

    /// The unconsumed lookahead token.
    ///
    /// A `/` shows up here as [`TokenKind::Slash`]; its final shape is only
    /// decided when it is promoted.
    pub fn peek(&self) -> &Token<'s> {
        &self.peeked
    }

    /// Promotes the lookahead and reads the next one.
    ///
    /// `hint` resolves an unresolved `/`: with [`ValueHint::Value`] it is
    /// re-read as a division operator, with [`ValueHint::NoValue`] as a
    /// regular expression literal, and with [`ValueHint::Unknown`] the
    /// scanner's own flag heuristic decides.
    pub fn next(&mut self, hint: ValueHint) -> Result<Token<'s>, ClassifyError> {
        let mut out = self.peeked;
        if out.kind == TokenKind::Slash {
            let as_op = match hint {
                ValueHint::Value => true,
                ValueHint::NoValue => false,
                ValueHint::Unknown => self.peek_slash_op,
            };
            out = self.resolve_slash(out.offset, out.line, as_op);
        }
        self.peeked = if out.kind == TokenKind::Eof { out } else { self.lex()? };
        Ok(out)
    }

    fn make(&self, kind: TokenKind, start: usize, len: usize, line: u32, hash: u32) -> Token<'s> {
        Token { kind, text: &self.src[start..start + len], offset: start, line, hash, mark: Mark::None }
    }

    fn push_nest(&mut self, shape: Bracket) -> Result<(), ClassifyError> {
        if self.depth == MAX_NEST_DEPTH - 1 {
            return Err(ClassifyError::CapacityExceeded);
        }
        self.depth += 1;
        self.nests[self.depth] = Nest { shape, statement: false };
        Ok(())
    }

    fn pop_nest(&mut self, shape: Bracket) -> Result<(), ClassifyError> {
        if self.depth == 0 {
            return Err(ClassifyError::MalformedBracket);
        }
        let prev = self.nests[self.depth].shape;
        self.depth -= 1;
        if prev == shape { Ok(()) } else { Err(ClassifyError::MalformedBracket) }
    }

    /// Re-reads a deferred `/` from its offset with its shape decided.
    fn resolve_slash(&mut self, start: usize, line: u32, as_op: bool) -> Token<'s> {
        let b = self.src.as_bytes();
        if as_op {
            let len = if b.get(start + 1) == Some(&b'=') { 2 } else { 1 };
            self.pos = start + len;
            self.flags = FLAG_AFTER_OP;
            return self.make(TokenKind::Op, start, len, line, 0);
        }

        // regex body: `/` terminates only outside a character class, and a
        // backslash escapes anything
        let mut i = start + 1;
        let mut in_class = false;
        while i < b.len() {
            match b[i] {
                b'[' => in_class = true,
                b']' => in_class = false,
                b'\\' => i += 1,
                b'\n' => self.line += 1,
                b'/' if !in_class => {
                    i += 1;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        // trailing flag letters
        while i < b.len() && b[i].is_ascii_alphanumeric() {
            i += 1;
        }
        let i = i.min(b.len());
        self.pos = i;
        self.flags = FLAG_SLASH_IS_OP;
        self.make(TokenKind::Regexp, start, i - start, line, 0)
    }

    fn comment(&mut self, start: usize, line: u32, block: bool) -> Token<'s> {
        let b = self.src.as_bytes();
        let mut i = start + 2;
        if block {
            loop {
                if i + 1 >= b.len() {
                    i = b.len();
                    break;
                }
                if b[i] == b'*' && b[i + 1] == b'/' {
                    i += 2;
                    break;
                }
                if b[i] == b'\n' {
                    self.line += 1;
                }
                i += 1;
            }
        } else {
            while i < b.len() && b[i] != b'\n' {
                i += 1;
            }
        }
        self.pos = i;
        self.make(TokenKind::Comment, start, i - start, line, 0)
    }

    fn template_part(&mut self, start: usize, skip_open: bool) -> Token<'s> {
        let line = self.line;
        let b = self.src.as_bytes();
        let mut i = start + usize::from(skip_open);
        while i < b.len() {
            match b[i] {
                b'`' => {
                    i += 1;
                    self.flags = FLAG_SLASH_IS_OP;
                    break;
                }
                b'$' if b.get(i + 1) == Some(&b'{') => {
                    self.pending_slot = true;
                    break;
                }
                b'\\' => {
                    i += 1;
                    if b.get(i) == Some(&b'\n') {
                        self.line += 1;
                    }
                }
                b'\n' => self.line += 1,
                _ => {}
            }
            i += 1;
        }
        let i = i.min(b.len());
        self.pos = i;
        self.make(TokenKind::String, start, i - start, line, 0)
    }

    #[allow(clippy::too_many_lines)]
    fn lex(&mut self) -> Result<Token<'s>, ClassifyError> {
        if self.pending_slot {
            self.pending_slot = false;
            self.flags = 0;
            self.push_nest(Bracket::TemplateSlot)?;
            let start = self.pos;
            self.pos += 2;
            return Ok(self.make(TokenKind::Open(Bracket::TemplateSlot), start, 2, self.line, 0));
        }
        if self.resume_template {
            self.resume_template = false;
            self.flags = 0;
            return Ok(self.template_part(self.pos, false));
        }

        let b = self.src.as_bytes();
        while self.pos < b.len() {
            let c = b[self.pos];
            if c == b'\n' {
                self.line += 1;
            } else if !c.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }

        let start = self.pos;
        let line = self.line;
        if start >= b.len() {
            return Ok(self.make(TokenKind::Eof, start, 0, line, 0));
        }
        let c = b[start];
        let next = b.get(start + 1).copied().unwrap_or(0);

        // comments don't consume the one-token flags
        if c == b'/' && (next == b'/' || next == b'*') {
            return Ok(self.comment(start, line, next == b'*'));
        }

        let flags = core::mem::take(&mut self.flags);

        match c {
            b';' => {
                self.pos = start + 1;
                return Ok(self.make(TokenKind::Semicolon, start, 1, line, 0));
            }
            b',' => {
                self.pos = start + 1;
                return Ok(self.make(TokenKind::Comma, start, 1, line, lit::COMMA));
            }
            b':' => {
                self.pos = start + 1;
                return Ok(self.make(TokenKind::Colon, start, 1, line, 0));
            }
            b'?' => {
                if next == b'.' && !b.get(start + 2).copied().unwrap_or(0).is_ascii_digit() {
                    // `?.` but not `?.5`, which is a ternary over a number
                    self.flags = FLAG_EXPECT_ID;
                    self.pos = start + 2;
                    return Ok(self.make(TokenKind::Op, start, 2, line, lit::CHAIN));
                }
                if next == b'?' {
                    let len = if b.get(start + 2) == Some(&b'=') { 3 } else { 2 };
                    self.flags = FLAG_AFTER_OP;
                    self.pos = start + len;
                    return Ok(self.make(TokenKind::Op, start, len, line, 0));
                }
                self.pos = start + 1;
                return Ok(self.make(TokenKind::Ternary, start, 1, line, 0));
            }
            b'(' => return self.open_bracket(Bracket::Paren, start, line),
            b'[' => return self.open_bracket(Bracket::Array, start, line),
            b'{' => return self.open_bracket(Bracket::Brace, start, line),
            b')' => return self.close_bracket(Bracket::Paren, start, line),
            b']' => return self.close_bracket(Bracket::Array, start, line),
            b'}' => return self.close_brace(start, line),
            _ => {}
        }

        if c == b'/' {
            // genuinely ambiguous; kept as lookahead until promotion
            self.peek_slash_op = flags & FLAG_SLASH_IS_OP != 0;
            self.pos = start + 1;
            return Ok(self.make(TokenKind::Slash, start, 1, line, 0));
        }

        // runs of operator characters, longest valid munch
        let allowed = match c {
            b'=' | b'&' | b'|' | b'^' | b'~' | b'!' | b'%' | b'+' | b'-' => Some(1),
            b'*' | b'<' => Some(2), // `**`, shifts
            b'>' => Some(3),        // `>>>`
            _ => None,
        };
        if let Some(allowed) = allowed {
            let mut len = 0usize;
            let mut cc = c;
            while len < allowed {
                len += 1;
                cc = b.get(start + len).copied().unwrap_or(0);
                if cc != c {
                    break;
                }
            }
            if c == b'=' && cc == b'>' {
                self.flags = FLAG_AFTER_OP;
                self.pos = start + 2;
                return Ok(self.make(TokenKind::Arrow, start, 2, line, lit::ARROW));
            }
            if cc == c && matches!(c, b'+' | b'-' | b'|' | b'&') {
                len += 1; // ++ -- || &&
            } else if cc == b'=' {
                len += 1; // comparison or compound assignment
                if (c == b'=' || c == b'!') && b.get(start + len) == Some(&b'=') {
                    len += 1; // === !==
                }
            }
            self.flags = FLAG_AFTER_OP;
            self.pos = start + len;
            let hash = match &self.src[start..start + len] {
                "*" => lit::STAR,
                "=" => lit::EQUALS,
                "!" => lit::NOT,
                "~" => lit::BITNOT,
                "++" | "--" => lit::INCDEC,
                _ => 0,
            };
            return Ok(self.make(TokenKind::Op, start, len, line, hash));
        }

        if c.is_ascii_digit() || (c == b'.' && next.is_ascii_digit()) {
            // over-accepting on purpose: anything alphanumeric glues on, so
            // `0x1f`, `1e-7` and bad numbers alike come out whole
            let mut i = start + 1;
            while i < b.len() {
                let d = b[i];
                let sign_after_exp =
                    (d == b'+' || d == b'-') && matches!(b[i - 1], b'e' | b'E');
                if !(d.is_ascii_alphanumeric() || d == b'.' || d == b'_' || sign_after_exp) {
                    break;
                }
                i += 1;
            }
            self.flags = FLAG_SLASH_IS_OP;
            self.pos = i;
            return Ok(self.make(TokenKind::Number, start, i - start, line, 0));
        }

        if c == b'.' {
            if next == b'.' && b.get(start + 2) == Some(&b'.') {
                self.pos = start + 3;
                return Ok(self.make(TokenKind::Op, start, 3, line, lit::SPREAD));
            }
            self.flags = FLAG_EXPECT_ID;
            self.pos = start + 1;
            return Ok(self.make(TokenKind::Op, start, 1, line, lit::DOT));
        }

        if c == b'\'' || c == b'"' {
            let mut i = start + 1;
            while i < b.len() {
                let d = b[i];
                if d == c {
                    i += 1;
                    break;
                }
                if d == b'\\' {
                    i += 1;
                    if b.get(i) == Some(&b'\n') {
                        self.line += 1;
                    }
                } else if d == b'\n' {
                    // invalid, but count it anyway
                    self.line += 1;
                }
                i += 1;
            }
            let i = i.min(b.len());
            self.flags = FLAG_SLASH_IS_OP;
            self.pos = i;
            return Ok(self.make(TokenKind::String, start, i - start, line, 0));
        }
        if c == b'`' {
            return Ok(self.template_part(start, true));
        }

        // words: ASCII letters, $, _, escapes, and any non-ASCII scalar
        let mut i = start;
        while i < b.len() {
            let d = b[i];
            if d == b'\\' {
                i += 2; // the escape lead, e.g. `\u`
                if b.get(i) == Some(&b'{') {
                    while i < b.len() && b[i] != b'}' {
                        i += 1;
                    }
                    i += 1;
                }
                continue;
            }
            if d < 0x80 {
                let valid = d == b'$'
                    || d == b'_'
                    || if i == start { d.is_ascii_alphabetic() } else { d.is_ascii_alphanumeric() };
                if !valid {
                    break;
                }
                i += 1;
            } else {
                let (_, n) = decode_utf8(&b[i..]);
                i += n.max(1);
            }
        }
        let mut i = i.min(b.len());
        while !self.src.is_char_boundary(i) {
            i += 1; // an escape lead may sit before a multibyte scalar
        }
        if i == start {
            return Err(ClassifyError::Internal("unexpected character"));
        }
        self.pos = i;
        let text = &self.src[start..i];

        // after `.` or `?.` every word is a plain member name
        let hash = if flags & FLAG_EXPECT_ID != 0 { 0 } else { lit::word_hash(text) };

        if hash != 0 && !lit::flags(hash).contains(lit::LitFlags::VARIABLE) {
            if lit::is_hoist(hash)
                && (self.nests[self.depth].shape != Bracket::Brace || flags & FLAG_AFTER_OP != 0)
            {
                // hoisted decl in value position: its body brace closes back
                // into a value, e.g. `(class {} / 1)`
                self.nests[self.depth].statement = true;
            }
        } else {
            self.flags = FLAG_SLASH_IS_OP;
        }
        Ok(self.make(TokenKind::Word, start, i - start, line, hash))
    }

    fn open_bracket(&mut self, shape: Bracket, start: usize, line: u32) -> Result<Token<'s>, ClassifyError> {
        self.push_nest(shape)?;
        self.pos = start + 1;
        Ok(self.make(TokenKind::Open(shape), start, 1, line, 0))
    }

    fn close_bracket(&mut self, shape: Bracket, start: usize, line: u32) -> Result<Token<'s>, ClassifyError> {
        self.pop_nest(shape)?;
        self.pos = start + 1;
        Ok(self.make(TokenKind::Close(shape), start, 1, line, 0))
    }

    fn close_brace(&mut self, start: usize, line: u32) -> Result<Token<'s>, ClassifyError> {
        if self.depth > 0 && self.nests[self.depth].shape == Bracket::TemplateSlot {
            self.depth -= 1;
            self.resume_template = true;
            self.pos = start + 1;
            return Ok(self.make(TokenKind::Close(Bracket::TemplateSlot), start, 1, line, 0));
        }
        self.pop_nest(Bracket::Brace)?;
        if self.nests[self.depth].statement {
            // the mandatory body of a hoisted decl used as a value just
            // closed, so a following slash divides
            self.nests[self.depth].statement = false;
            self.flags = FLAG_SLASH_IS_OP;
        }
        self.pos = start + 1;
        Ok(self.make(TokenKind::Close(Bracket::Brace), start, 1, line, 0))
    }
}
