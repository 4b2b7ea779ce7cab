//! The context tracker: a lighter companion to the grammar engine.
//!
//! Instead of statement grammar, the tracker keeps one small record per
//! bracket depth and answers a single question after every token: would a
//! `/` here start a regular expression? That is exactly the feedback the
//! scanner needs, so [`stream`] wires the two together for callers that want
//! a classified-enough stream without grammar-engine emission rules.

use crate::{
    error::ClassifyError,
    lit,
    token::{Bracket, Token, TokenKind},
    tokenizer::{Tokenizer, ValueHint},
};

/// Maximum bracket depth the tracker follows.
pub const MAX_STREAM_DEPTH: usize = 256;

const MAX_PENDING_COLON: u8 = u8::MAX;

#[derive(Debug, Clone, Copy, Default)]
struct Record {
    /// A `/` at this position starts a regular expression.
    regex_legal: bool,
    is_brace: bool,
    is_dict: bool,
    /// At the start of a statement.
    initial: bool,
    /// Ternary `?`s awaiting their `:`.
    pending_colon: u8,
    /// Saw `function`, awaiting its body brace.
    pending_function: bool,
    /// A hoisted declaration's body brace is coming; its close is no value.
    pending_hoist_brace: bool,
}

/// Tracks bracket-synchronized context over an observed token stream.
pub struct StreamTracker<'s> {
    prev: Token<'s>,
    depth: usize,
    records: [Record; MAX_STREAM_DEPTH],
}

impl Default for StreamTracker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> StreamTracker<'s> {
    #[must_use]
    pub fn new() -> Self {
        let mut t = StreamTracker {
            prev: Token::EMPTY,
            depth: 0,
            records: [Record::default(); MAX_STREAM_DEPTH],
        };
        t.records[0] = Record { regex_legal: true, is_brace: true, initial: true, ..Record::default() };
        t
    }

    /// Whether a `/` after everything observed so far starts a regex.
    #[must_use]
    pub fn regex_legal(&self) -> bool {
        self.records[self.depth].regex_legal
    }

    /// Observes one token. Comments are ignored.
    pub fn observe(&mut self, t: &Token<'s>) -> Result<(), ClassifyError> {
        if t.kind == TokenKind::Comment {
            return Ok(());
        }
        self.adjust_depth(t)?;
        self.update(t)?;
        self.prev = *t;
        Ok(())
    }

    fn adjust_depth(&mut self, t: &Token<'s>) -> Result<(), ClassifyError> {
        match t.kind {
            TokenKind::Open(shape) => {
                if self.depth == MAX_STREAM_DEPTH - 1 {
                    return Err(ClassifyError::CapacityExceeded);
                }
                self.depth += 1;
                self.records[self.depth] = Record { regex_legal: true, ..Record::default() };
                if shape == Bracket::Brace {
                    self.records[self.depth].is_brace = true;
                    self.records[self.depth].initial = true;
                }
            }
            TokenKind::Close(_) => {
                if self.depth == 0 {
                    return Err(ClassifyError::MalformedBracket);
                }
                self.depth -= 1;
            }
            _ => {}
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn update(&mut self, t: &Token<'s>) -> Result<(), ClassifyError> {
        let prev = self.prev;
        // for opens this is the fresh record's state, for closes the
        // enclosing record's state before this token
        let initial = self.records[self.depth].initial;
        self.records[self.depth].initial = false;

        match t.kind {
            TokenKind::Semicolon => {
                let curr = &mut self.records[self.depth];
                curr.regex_legal = true;
                curr.initial = curr.is_brace;
                // anything pending here was malformed, drop it
                curr.pending_colon = 0;
                curr.pending_function = false;
                curr.pending_hoist_brace = false;
            }

            TokenKind::Comma | TokenKind::Arrow | TokenKind::Open(Bracket::TemplateSlot) => {
                self.records[self.depth].regex_legal = true;
            }

            TokenKind::Ternary => {
                let curr = &mut self.records[self.depth];
                if curr.pending_colon == MAX_PENDING_COLON - 1 {
                    return Err(ClassifyError::CapacityExceeded);
                }
                curr.pending_colon += 1;
                curr.regex_legal = true;
            }

            TokenKind::Colon => {
                let curr = &mut self.records[self.depth];
                curr.regex_legal = true;
                if curr.pending_colon > 0 {
                    // the ternary's value side follows
                    curr.pending_colon -= 1;
                } else if prev.kind == TokenKind::Word {
                    curr.initial = true; // a label, back to initial
                }
            }

            TokenKind::String | TokenKind::Regexp | TokenKind::Number => {
                self.records[self.depth].regex_legal = false;
            }

            TokenKind::Op => {
                let curr = &mut self.records[self.depth];
                if t.hash == lit::INCDEC {
                    // ++/-- change nothing about value state
                } else if t.hash == lit::DOT || t.hash == lit::CHAIN {
                    curr.regex_legal = false;
                } else {
                    curr.regex_legal = true;
                }
            }

            TokenKind::Open(Bracket::Array) => {
                self.records[self.depth].regex_legal = true;
            }
            TokenKind::Close(Bracket::Array) => {
                self.records[self.depth].regex_legal = false;
            }

            TokenKind::Close(Bracket::Brace | Bracket::Paren | Bracket::TemplateSlot) => {
                // ends of statements and control clauses; regex legality was
                // already decided when the bracket opened
                self.records[self.depth].initial = initial;
            }

            TokenKind::Open(Bracket::Brace) => {
                let p_word = prev.kind == TokenKind::Word;
                let up = &mut self.records[self.depth - 1];
                let mut is_block = up.pending_function
                    || up.initial
                    || prev.kind == TokenKind::Arrow
                    || (p_word && lit::is_block_creator(prev.hash));

                if up.pending_hoist_brace {
                    if p_word && prev.hash == lit::EXTENDS {
                        // `class Foo extends {} {}` is invalid but the left
                        // brace pair is still a value
                        is_block = false;
                    } else {
                        // a hoisted body's close brace carries no value, so a
                        // regex may follow it
                        up.regex_legal = true;
                        up.pending_hoist_brace = false;
                        up.initial = initial;
                    }
                } else if prev.kind == TokenKind::Arrow || up.pending_function {
                    up.regex_legal = false; // these braces produce a value
                } else {
                    up.regex_legal = is_block;
                }
                up.pending_function = false;
                self.records[self.depth].is_dict = !is_block;
            }

            TokenKind::Open(Bracket::Paren) => {
                let p = prev;
                let up = &mut self.records[self.depth - 1];
                if p.kind != TokenKind::Word {
                    up.regex_legal = false;
                } else if up.is_brace {
                    // a control clause's close paren has no implicit value;
                    // a call's does. "async (" may be an arrow header.
                    let legal = p.hash != lit::ASYNC && lit::is_control_paren(p.hash);
                    up.regex_legal = legal;
                    up.initial = legal;
                }
            }

            TokenKind::Word => {
                let curr = &mut self.records[self.depth];
                if lit::is_hoist(t.hash) {
                    if t.hash == lit::FUNCTION {
                        curr.pending_function = true;
                    }
                    // an initial function/class hoists; one in an expression
                    // (after an op or oplike word) does not
                    let mut phb = initial;
                    if !phb && curr.is_brace {
                        phb = !((prev.kind == TokenKind::Word && lit::is_oplike(prev.hash))
                            || prev.kind == TokenKind::Op);
                    }
                    curr.pending_hoist_brace = phb;
                    curr.regex_legal = false;
                } else if lit::allows_regex_after(t.hash) {
                    curr.regex_legal = true;
                } else {
                    curr.regex_legal = false;
                }
            }

            _ => {}
        }

        Ok(())
    }
}

/// Scans `src` with the tracker deciding every `/`, pushing each token to
/// `emit`. Comments are pushed but not tracked.
pub fn stream<'s, F>(src: &'s str, mut emit: F) -> Result<(), ClassifyError>
where
    F: FnMut(Token<'s>),
{
    let mut source = Tokenizer::new(src)?;
    let mut tracker = StreamTracker::new();
    loop {
        let hint = if tracker.regex_legal() { ValueHint::NoValue } else { ValueHint::Value };
        let t = source.next(hint)?;
        if t.kind == TokenKind::Eof {
            return Ok(());
        }
        tracker.observe(&t)?;
        emit(t);
    }
}
