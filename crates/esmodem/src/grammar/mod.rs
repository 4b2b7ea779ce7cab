//! The grammar engine: coarse tokens to a fully classified stream.
//!
//! A bounded stack of frames approximates just enough grammar to answer the
//! questions a flat token stream can't: is this word a keyword, symbol or
//! label here, does automatic semicolon insertion fire, is this `{` an object
//! literal or a block, does strict mode apply. Each frame remembers the last
//! two significant tokens recorded at its nesting level; that tiny window is
//! what every decision reads.
//!
//! Tokens are pushed to the caller in source order, with two exceptions: a
//! synthesized `;` occupies no source range, and a token whose meaning only
//! became clear later (an ambiguous `async`) is pushed a second time with
//! [`Mark::Resolve`] and its final kind.

use crate::{
    error::ClassifyError,
    lit::{self, Context, LitFlags},
    token::{Bracket, Mark, Token, TokenKind},
    tokenizer::{Tokenizer, ValueHint},
};


/// Maximum grammar frame nesting.
pub const MAX_GRAMMAR_DEPTH: usize = 256;

/// Whether the source is parsed as a classic script or as a module.
///
/// Module sources are strict from the first token and accept top-level
/// `import`/`export` grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Script,
    Module,
}

/// Classifies `src` in one pass, pushing every token to `emit`.
///
/// Comments are passed through in order. See the crate docs for the marks
/// and synthesized tokens `emit` may observe.
pub fn classify<'s, F>(src: &'s str, mode: SourceMode, emit: F) -> Result<(), ClassifyError>
where
    F: FnMut(Token<'s>),
{
    GrammarEngine::new(Tokenizer::new(src)?, mode, emit).run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// A regular statement in progress.
    Statement,
    /// Inside `( … )`, `[ … ]` or `${ … }`.
    Group,
    /// A braced (or virtual, e.g. `do` body) execution block.
    Block,
    /// The left side of an object literal, dict or class body.
    Dict,
    /// Expecting the `name ( … ) { … }` tail of a function.
    Func,
    /// Expecting the `extends …`? `{ … }` tail of a class.
    Class,
    /// Waiting for the `while ( … )` tail of a `do`.
    DoWhile,
    /// An `import`/`export` specifier list.
    Module,
}

#[derive(Clone, Copy)]
struct Frame<'s> {
    /// Most recent significant token recorded at this level.
    t1: Token<'s>,
    /// The one before it.
    t2: Token<'s>,
    kind: FrameKind,
    context: Context,
    /// Kind-specific bit: first-statement position for blocks, `for (`
    /// clause for groups, free `extends` value for classes.
    special: bool,
}

impl<'s> Frame<'s> {
    const EMPTY: Frame<'s> = Frame {
        t1: Token::EMPTY,
        t2: Token::EMPTY,
        kind: FrameKind::Statement,
        context: Context::empty(),
        special: false,
    };
}

/// Single-pass classifier over a token source.
///
/// Most callers want [`classify`]; the engine is exposed for callers that
/// construct the [`Tokenizer`] themselves.
pub struct GrammarEngine<'s, F: FnMut(Token<'s>)> {
    source: Tokenizer<'s>,
    emit: F,
    /// The committed current token being dispatched.
    tok: Token<'s>,
    /// The value hint the current token was pulled with. `-1` means unknown.
    tok_has_value: i8,
    is_module: bool,
    /// Line of the last pushed token; synthesized semicolons land there.
    last_line: u32,
    depth: usize,
    frames: [Frame<'s>; MAX_GRAMMAR_DEPTH],
}

impl<'s, F: FnMut(Token<'s>)> GrammarEngine<'s, F> {
    pub fn new(source: Tokenizer<'s>, mode: SourceMode, emit: F) -> Self {
        let mut engine = GrammarEngine {
            source,
            emit,
            tok: Token::EMPTY,
            tok_has_value: 0,
            is_module: mode == SourceMode::Module,
            last_line: 1,
            depth: 0,
            frames: [Frame::EMPTY; MAX_GRAMMAR_DEPTH],
        };
        engine.frames[0].kind = FrameKind::Block;
        engine.frames[0].special = true;
        if engine.is_module {
            engine.frames[0].context = Context::STRICT;
        }
        engine
    }

    /// Runs the whole source to completion.
    pub fn run(mut self) -> Result<(), ClassifyError> {
        // prime the first token
        self.record_walk(ValueHint::NoValue)?;

        loop {
            let at_eof = self.tok.kind == TokenKind::Eof;
            let before = (self.tok.kind, self.tok.offset);
            self.step()?;

            if at_eof {
                self.skip_walk(ValueHint::NoValue)?;
                break;
            }
            if (self.tok.kind, self.tok.offset) == before {
                return Err(ClassifyError::Internal("no forward progress"));
            }
        }

        if self.tok.kind != TokenKind::Eof || self.depth != 0 {
            return Err(ClassifyError::TrailingInput);
        }
        Ok(())
    }

    fn push_token(&mut self, t: Token<'s>) {
        if t.kind != TokenKind::Eof {
            self.last_line = t.line;
            (self.emit)(t);
        }
    }

    /// Pushes the current token and pulls the next significant one, passing
    /// comments straight through.
    fn skip_walk(&mut self, hint: ValueHint) -> Result<(), ClassifyError> {
        let t = self.tok;
        self.push_token(t);
        loop {
            let n = self.source.next(hint)?;
            if n.kind == TokenKind::Comment {
                self.push_token(n);
                continue;
            }
            self.tok = n;
            self.tok_has_value = hint.has_value();
            return Ok(());
        }
    }

    /// Like [`skip_walk`](Self::skip_walk), but also records the current
    /// token in the active frame's two-token window.
    fn record_walk(&mut self, hint: ValueHint) -> Result<(), ClassifyError> {
        let f = &mut self.frames[self.depth];
        f.t2 = f.t1;
        f.t1 = self.tok;
        self.skip_walk(hint)
    }

    /// Synthesizes a `;` into the active frame's window and pushes it.
    fn yield_virt(&mut self) {
        let semi = Token {
            kind: TokenKind::Semicolon,
            text: "",
            offset: 0,
            line: self.last_line,
            hash: 0,
            mark: Mark::None,
        };
        let f = &mut self.frames[self.depth];
        f.t2 = f.t1;
        f.t1 = semi;
        self.push_token(semi);
    }

    fn push(&mut self, kind: FrameKind) -> Result<(), ClassifyError> {
        // one spare slot stays clear above the new top; the use-strict check
        // reads the popped statement there
        if self.depth + 2 >= MAX_GRAMMAR_DEPTH {
            return Err(ClassifyError::CapacityExceeded);
        }
        let context = self.frames[self.depth].context;
        self.depth += 1;
        self.frames[self.depth] = Frame { kind, context, ..Frame::EMPTY };
        self.frames[self.depth + 1] = Frame::EMPTY;
        Ok(())
    }

    fn pop(&mut self) -> Result<(), ClassifyError> {
        if self.depth == 0 {
            return Err(ClassifyError::Internal("frame underflow"));
        }
        self.depth -= 1;
        Ok(())
    }

    /// Ends the current statement with a synthesized `;` where one is valid.
    fn yield_valid_asi(&mut self) -> Result<bool, ClassifyError> {
        if self.frames[self.depth].kind == FrameKind::Statement {
            let had_tokens = self.frames[self.depth].t1.is_present();
            self.pop()?;
            if had_tokens {
                self.yield_virt();
            }
            return Ok(true);
        }
        if self.frames[self.depth].kind == FrameKind::Block && self.frames[self.depth].t1.is_present() {
            // pretend a statement happened anyway
            self.push(FrameKind::Statement)?;
            self.depth -= 1;
            self.yield_virt();
            return Ok(true);
        }
        Ok(false)
    }

    fn peek_function(&self) -> bool {
        if self.tok.kind != TokenKind::Word {
            return false;
        }
        if self.tok.hash == lit::ASYNC {
            let next = self.source.peek();
            return next.kind == TokenKind::Word && next.hash == lit::FUNCTION;
        }
        self.tok.hash == lit::FUNCTION
    }

    /// Consumes a function header up to (not including) its name. Returns
    /// the context its body will run under.
    fn match_function(&mut self) -> Result<Option<Context>, ClassifyError> {
        if !self.peek_function() {
            return Ok(None);
        }
        let mut context = self.frames[self.depth].context & Context::STRICT;
        if self.tok.hash == lit::ASYNC {
            context |= Context::ASYNC;
            self.tok.kind = TokenKind::Keyword;
            self.skip_walk(ValueHint::NoValue)?;
        }
        self.tok.kind = TokenKind::Keyword;
        self.record_walk(ValueHint::NoValue)?;

        if self.tok.kind == TokenKind::Op && self.tok.hash == lit::STAR {
            self.skip_walk(ValueHint::NoValue)?;
            context |= Context::GENERATOR;
        }
        Ok(Some(context))
    }

    /// Consumes `class`, an optional name and an optional `extends` keyword.
    /// Returns whether a free-standing extends value follows.
    fn match_class(&mut self) -> Result<Option<bool>, ClassifyError> {
        if self.tok.hash != lit::CLASS {
            return Ok(None);
        }
        self.tok.kind = TokenKind::Keyword;
        self.record_walk(ValueHint::NoValue)?;

        let mut free_value = false;
        if self.tok.kind == TokenKind::Word {
            if self.tok.hash == lit::EXTENDS {
                free_value = true;
            } else {
                let context = self.frames[self.depth].context;
                if !lit::is_valid_name(self.tok.hash, context)
                    || self.tok.hash == lit::YIELD
                    || self.tok.hash == lit::LET
                {
                    // "yield" and "let" are invalid class names even outside
                    // strict mode; "class if" is invalid outright
                    self.tok.kind = TokenKind::Keyword;
                } else {
                    self.tok.kind = TokenKind::Symbol;
                }
                self.skip_walk(ValueHint::NoValue)?;
            }
        }

        if free_value || (self.tok.kind == TokenKind::Word && self.tok.hash == lit::EXTENDS) {
            self.tok.kind = TokenKind::Keyword;
            self.skip_walk(ValueHint::NoValue)?;
            free_value = true;
        }
        Ok(Some(free_value))
    }

    /// Consumes `var`/`let`/`const` where it opens a declaration. Loose-mode
    /// `let` only counts when what follows could be a binding.
    fn match_decl(&mut self) -> Result<bool, ClassifyError> {
        if !lit::flags(self.tok.hash).contains(LitFlags::DECL) {
            return Ok(false);
        }
        if !self.frames[self.depth].context.contains(Context::STRICT) && self.tok.hash == lit::LET {
            let next = self.source.peek();
            let binding = next.kind == TokenKind::Open(Bracket::Brace)
                || next.kind == TokenKind::Open(Bracket::Array)
                || !lit::flags(next.hash).contains(LitFlags::REL_OP);
            if !binding {
                // e.g. "let instanceof Foo": here "let" is a plain name
                return Ok(false);
            }
        }
        self.tok.kind = TokenKind::Keyword;
        self.record_walk(ValueHint::NoValue)?;
        Ok(true)
    }

    /// Consumes `break`/`continue` with an optional same-line label, ending
    /// the statement immediately.
    fn match_label_keyword(&mut self) -> Result<bool, ClassifyError> {
        if self.tok.hash != lit::BREAK && self.tok.hash != lit::CONTINUE {
            return Ok(false);
        }
        let line = self.tok.line;
        self.tok.kind = TokenKind::Keyword;
        self.skip_walk(ValueHint::NoValue)?;

        if self.tok.line == line
            && self.tok.kind == TokenKind::Word
            && lit::is_label(self.tok.hash, self.frames[self.depth].context)
        {
            self.tok.kind = TokenKind::Label;
            self.skip_walk(ValueHint::NoValue)?;
        }

        if self.tok.line != line {
            // e.g. "break\n" or "break foo\n"
            self.yield_virt();
        } else if self.tok.kind == TokenKind::Semicolon {
            self.skip_walk(ValueHint::NoValue)?;
        }
        Ok(true)
    }

    /// One dispatch of the current token. Restarts internally when a frame
    /// is abandoned without consuming it.
    #[allow(clippy::too_many_lines)]
    fn step(&mut self) -> Result<(), ClassifyError> {
        'restart: loop {
            // import/export specifier lists
            if self.frames[self.depth].kind == FrameKind::Module {
                match self.tok.kind {
                    TokenKind::Open(Bracket::Brace) => {
                        self.record_walk(ValueHint::NoValue)?;
                        self.push(FrameKind::Module)?;
                        return Ok(());
                    }
                    // unexpected groups, but handle anyway
                    TokenKind::Open(_) => {
                        self.record_walk(ValueHint::NoValue)?;
                        self.push(FrameKind::Group)?;
                        return Ok(());
                    }
                    TokenKind::Comma => return self.record_walk(ValueHint::NoValue),
                    TokenKind::Close(_) => {
                        if self.frames[self.depth - 1].kind != FrameKind::Module {
                            return Err(ClassifyError::Internal("specifier close at top level"));
                        }
                        let line = self.tok.line;
                        self.skip_walk(ValueHint::NoValue)?;
                        self.pop()?; // close inner list

                        if self.frames[self.depth - 1].kind == FrameKind::Module {
                            return Ok(()); // invalid nested specifier case
                        }
                        self.pop()?; // close outer list

                        if self.tok.kind == TokenKind::Word && self.tok.hash == lit::FROM {
                            self.tok.kind = TokenKind::Keyword;
                            self.record_walk(ValueHint::NoValue)?;
                            if self.tok.kind == TokenKind::String {
                                self.tok.mark = Mark::ImportSource;
                            }
                        } else if self.tok.kind != TokenKind::Semicolon && self.tok.line != line {
                            // abandon, with a semi where the export form
                            // makes one valid
                            self.yield_virt();
                        }
                        return Ok(());
                    }
                    TokenKind::Op if self.tok.hash == lit::STAR => {
                        // "* as ns": treat the star as a name
                        self.tok.kind = TokenKind::Symbol;
                        return self.record_walk(ValueHint::NoValue);
                    }
                    TokenKind::Word => {}
                    _ => {
                        if self.frames[self.depth - 1].kind != FrameKind::Module {
                            // not inside a sublist, give up on module state
                            self.pop()?;
                            continue 'restart;
                        }
                        return self.record_walk(ValueHint::NoValue);
                    }
                }

                // "from" after a symbol ends the outer list
                if self.frames[self.depth - 1].kind != FrameKind::Module
                    && self.frames[self.depth].t1.kind == TokenKind::Symbol
                    && self.tok.hash == lit::FROM
                {
                    self.pop()?;
                    self.tok.kind = TokenKind::Keyword;
                    self.record_walk(ValueHint::NoValue)?;
                    if self.tok.kind == TokenKind::String {
                        self.tok.mark = Mark::ImportSource;
                    }
                    return Ok(());
                }

                // "as" after a symbol renames it
                if self.frames[self.depth].t1.kind == TokenKind::Symbol && self.tok.hash == lit::AS {
                    self.tok.kind = TokenKind::Keyword;
                    return self.record_walk(ValueHint::NoValue);
                }

                let context = self.frames[self.depth].context;
                self.tok.kind = if lit::is_valid_name(self.tok.hash, context) {
                    TokenKind::Symbol
                } else {
                    TokenKind::Keyword
                };
                return self.record_walk(ValueHint::NoValue);
            }

            // the left side of a dict or class body
            if self.frames[self.depth].kind == FrameKind::Dict {
                let mut context = Context::empty();

                if self.tok.kind == TokenKind::Word
                    && self.tok.hash == lit::STATIC
                    && self.source.peek().kind != TokenKind::Open(Bracket::Paren)
                {
                    self.tok.kind = TokenKind::Keyword;
                    self.record_walk(ValueHint::NoValue)?;
                }
                if self.tok.kind == TokenKind::Word
                    && self.tok.hash == lit::ASYNC
                    && self.source.peek().kind != TokenKind::Open(Bracket::Paren)
                {
                    self.tok.kind = TokenKind::Keyword;
                    self.record_walk(ValueHint::NoValue)?;
                    context |= Context::ASYNC;
                }
                if self.tok.kind == TokenKind::Op && self.tok.hash == lit::STAR {
                    context |= Context::GENERATOR;
                    self.record_walk(ValueHint::NoValue)?;
                }
                if self.tok.kind == TokenKind::Word
                    && (self.tok.hash == lit::GET || self.tok.hash == lit::SET)
                    && self.source.peek().kind != TokenKind::Open(Bracket::Paren)
                {
                    self.tok.kind = TokenKind::Keyword;
                    self.record_walk(ValueHint::NoValue)?;
                }

                match self.tok.kind {
                    // anything that looks like it could be a method, that way
                    TokenKind::Word
                    | TokenKind::Open(Bracket::Paren | Bracket::Brace | Bracket::Array) => {
                        self.push(FrameKind::Func)?;
                        self.frames[self.depth].context = context;
                        continue 'restart;
                    }
                    TokenKind::Open(Bracket::TemplateSlot) | TokenKind::Colon => {
                        self.record_walk(ValueHint::NoValue)?;
                        self.push(FrameKind::Group)?;
                        return Ok(());
                    }
                    TokenKind::Close(_) => {
                        self.skip_walk(ValueHint::Value)?;
                        self.pop()?;
                        continue 'restart;
                    }
                    // comma is valid; anything else is invalid but recorded
                    _ => return self.record_walk(ValueHint::NoValue),
                }
            }

            // the `name () {}` tail of a function
            if self.frames[self.depth].kind == FrameKind::Func {
                match self.tok.kind {
                    TokenKind::Open(Bracket::Array) => {
                        // computed name: "{async [await 'name']() {}}" does
                        // not take await from the header's context
                        self.record_walk(ValueHint::NoValue)?;
                        let outer = self.frames[self.depth - 1].context;
                        self.push(FrameKind::Group)?;
                        self.frames[self.depth].context = outer;
                        return Ok(());
                    }
                    TokenKind::Word => {
                        // "async function await() {}" is valid, so the name
                        // is judged in the surrounding context
                        let context = self.frames[self.depth - 1].context;
                        let parent = self.frames[self.depth - 1].kind;
                        self.tok.kind =
                            if parent != FrameKind::Dict && !lit::is_valid_name(self.tok.hash, context) {
                                TokenKind::Keyword
                            } else {
                                TokenKind::Symbol
                            };
                        return self.record_walk(ValueHint::NoValue);
                    }
                    TokenKind::Open(Bracket::Paren) => {
                        self.record_walk(ValueHint::NoValue)?;
                        self.push(FrameKind::Group)?;
                        return Ok(());
                    }
                    TokenKind::Open(Bracket::Brace) => {
                        // terminal state: the body runs under the gathered
                        // context
                        let context = self.frames[self.depth].context;
                        self.pop()?;
                        self.record_walk(ValueHint::NoValue)?;
                        self.push(FrameKind::Block)?;
                        self.frames[self.depth].context = context;
                        self.frames[self.depth].special = true;
                        return Ok(());
                    }
                    _ => {
                        // invalid, abandon the function
                        self.pop()?;
                        continue 'restart;
                    }
                }
            }

            // the `extends …`? `{}` tail of a class
            if self.frames[self.depth].kind == FrameKind::Class {
                if !is_token_valuelike_keyword(&self.tok) {
                    self.pop()?;
                } else if self.frames[self.depth].special {
                    // the extends value itself, parsed below
                    self.frames[self.depth].special = false;
                } else if self.tok.kind == TokenKind::Open(Bracket::Brace) {
                    // terminal state: the body is a dict
                    self.pop()?;
                    self.record_walk(ValueHint::NoValue)?;
                    self.push(FrameKind::Dict)?;
                    return Ok(());
                } else {
                    self.pop()?;
                }
            }

            // between the `do` body and its `while (…)`
            if self.frames[self.depth].kind == FrameKind::DoWhile {
                if self.frames[self.depth].t1.is_present() {
                    // end of the while group; ASI occurs regardless of any
                    // newline, e.g. "do ; while (0) foo" splits after ")"
                    if self.tok.kind == TokenKind::Semicolon {
                        self.skip_walk(ValueHint::NoValue)?;
                    } else {
                        self.yield_virt();
                    }
                    self.pop()?;
                    continue 'restart;
                }
                // start of the body
                self.push(FrameKind::Block)?;
            }

            if self.frames[self.depth].kind == FrameKind::Block {
                'bail: {
                    if self.frames[self.depth].t1.is_present() && self.frames[self.depth].special {
                        self.frames[self.depth].special = false;

                        // a lone first statement may be a strict prologue
                        if self.frames[self.depth].t1.kind == TokenKind::Semicolon {
                            let finished = self.frames[self.depth + 1];
                            if !finished.t2.is_present() && is_use_strict(&finished.t1) {
                                self.frames[self.depth].context |= Context::STRICT;
                            }
                        }
                    }

                    let t1 = self.frames[self.depth].t1.kind;
                    let has_statement =
                        t1 == TokenKind::Semicolon || t1 == TokenKind::Open(Bracket::Brace);
                    if self.depth > 0
                        && self.frames[self.depth - 1].kind == FrameKind::DoWhile
                        && has_statement
                    {
                        self.pop()?; // back to the do..while

                        if self.tok.kind == TokenKind::Word
                            && self.tok.hash == lit::WHILE
                            && self.source.peek().kind == TokenKind::Open(Bracket::Paren)
                        {
                            self.tok.kind = TokenKind::Keyword;
                            self.record_walk(ValueHint::NoValue)?;
                            self.record_walk(ValueHint::NoValue)?;
                            self.push(FrameKind::Group)?;
                            return Ok(());
                        }
                        // no trailing "while (", drop the construct
                        self.pop()?;
                        continue 'restart;
                    }

                    // anonymous block
                    if self.tok.kind == TokenKind::Open(Bracket::Brace) {
                        self.record_walk(ValueHint::NoValue)?;
                        self.push(FrameKind::Block)?;
                        return Ok(());
                    }

                    if self.tok.kind != TokenKind::Word {
                        break 'bail;
                    }

                    // label, e.g. "outer: for (…)"
                    if lit::is_label(self.tok.hash, self.frames[self.depth].context)
                        && self.source.peek().kind == TokenKind::Colon
                    {
                        self.tok.kind = TokenKind::Label;
                        self.skip_walk(ValueHint::Unknown)?;
                        self.skip_walk(ValueHint::NoValue)?;
                        return Ok(());
                    }

                    // hoisted function, no statement frame around it
                    if let Some(context) = self.match_function()? {
                        self.push(FrameKind::Func)?;
                        self.frames[self.depth].context = context;
                        return Ok(());
                    }

                    // hoisted class
                    if let Some(free_value) = self.match_class()? {
                        self.push(FrameKind::Class)?;
                        self.frames[self.depth].special = free_value;
                        return Ok(());
                    }

                    if self.match_label_keyword()? {
                        return Ok(());
                    }

                    if self.tok.hash == lit::DEBUGGER {
                        let line = self.tok.line;
                        self.tok.kind = TokenKind::Keyword;
                        self.record_walk(ValueHint::NoValue)?;
                        if self.tok.line != line {
                            self.yield_valid_asi()?;
                        }
                        return Ok(());
                    }

                    // restricted statement starters
                    if self.tok.hash == lit::RETURN || self.tok.hash == lit::THROW {
                        let line = self.tok.line;
                        self.tok.kind = TokenKind::Keyword;
                        self.record_walk(ValueHint::NoValue)?;
                        if self.tok.line != line {
                            self.yield_valid_asi()?;
                            return Ok(());
                        }
                        break 'bail; // "return …" opens a statement
                    }

                    if self.depth == 0 && self.is_module {
                        if self.tok.hash == lit::IMPORT {
                            self.tok.kind = TokenKind::Keyword;
                            self.record_walk(ValueHint::NoValue)?;

                            // short-circuit for "import 'foo'"
                            if self.tok.kind == TokenKind::String {
                                self.tok.mark = Mark::ImportSource;
                                break 'bail;
                            }
                            self.push(FrameKind::Module)?;
                            return Ok(());
                        }

                        if self.tok.hash == lit::EXPORT {
                            self.tok.kind = TokenKind::Keyword;
                            self.record_walk(ValueHint::NoValue)?;

                            if (self.tok.kind == TokenKind::Op && self.tok.hash == lit::STAR)
                                || self.tok.kind == TokenKind::Open(Bracket::Brace)
                            {
                                self.push(FrameKind::Module)?;
                                return Ok(());
                            }

                            if self.tok.kind == TokenKind::Word && self.tok.hash == lit::DEFAULT {
                                self.tok.kind = TokenKind::Keyword;
                                self.record_walk(ValueHint::NoValue)?;
                            }
                            // "export default function() {}" is a valid
                            // anonymous decl, so no name is required next
                            return Ok(());
                        }
                    }

                    if self.match_decl()? {
                        break 'bail; // the declaration body is a statement
                    }

                    // control structures, e.g. "if", "catch"
                    if lit::flags(self.tok.hash).contains(LitFlags::CONTROL) {
                        let hash = self.tok.hash;
                        self.tok.kind = TokenKind::Keyword;
                        self.record_walk(ValueHint::NoValue)?;

                        // "for await": invalid outside async, parsed anyway
                        if hash == lit::FOR
                            && self.tok.kind == TokenKind::Word
                            && self.tok.hash == lit::AWAIT
                        {
                            self.tok.kind = TokenKind::Keyword;
                            self.record_walk(ValueHint::NoValue)?;
                        }

                        if hash == lit::DO {
                            self.push(FrameKind::DoWhile)?;
                            return Ok(());
                        }

                        // a control paren is consumed outside any statement
                        if lit::is_control_paren(hash) && self.tok.kind == TokenKind::Open(Bracket::Paren)
                        {
                            self.record_walk(ValueHint::NoValue)?;
                            self.push(FrameKind::Group)?;
                            self.frames[self.depth].special = hash == lit::FOR;
                        }
                        return Ok(());
                    }

                    break 'bail;
                }

                // ... or open a regular statement
                self.push(FrameKind::Statement)?;
            }

            return self.step_statement();
        }
    }

    /// Dispatch within a statement, group or class-extends position.
    #[allow(clippy::too_many_lines)]
    fn step_statement(&mut self) -> Result<(), ClassifyError> {
        match self.tok.kind {
            TokenKind::Semicolon => {
                if self.frames[self.depth].kind == FrameKind::Statement {
                    self.pop()?;
                }
                // the semi itself is recorded in the enclosing block
                self.record_walk(ValueHint::NoValue)
            }

            TokenKind::Comma => {
                if self.frames[self.depth - 1].kind == FrameKind::Dict {
                    self.pop()?;
                    return self.step();
                }
                // relevant in "async () => blah, foo": reset from parent
                self.frames[self.depth].context = self.frames[self.depth - 1].context;
                self.record_walk(ValueHint::NoValue)
            }

            TokenKind::Arrow => {
                let t1 = self.frames[self.depth].t1;
                if t1.kind != TokenKind::Open(Bracket::Paren) && t1.kind != TokenKind::Symbol {
                    // not an arrow function, treat as a stray op
                    return self.record_walk(ValueHint::NoValue);
                }

                let mut context = self.frames[self.depth].context & Context::STRICT;
                let t2 = self.frames[self.depth].t2;
                if t2.kind == TokenKind::Keyword && t2.hash == lit::ASYNC {
                    context |= Context::ASYNC;
                }

                if self.source.peek().kind == TokenKind::Open(Bracket::Brace) {
                    // proper body: "() => { statements }"
                    self.record_walk(ValueHint::Unknown)?;
                    self.record_walk(ValueHint::NoValue)?;
                    self.push(FrameKind::Block)?;
                    self.frames[self.depth].special = true;
                } else {
                    // expression body just changes the statement's context,
                    // e.g. "() => async () => …"
                    self.record_walk(ValueHint::NoValue)?;
                }
                self.frames[self.depth].context = context;
                Ok(())
            }

            TokenKind::Eof => {
                // the caller walks over EOF
                self.yield_valid_asi()?;
                Ok(())
            }

            TokenKind::Close(_) => self.step_close(),

            TokenKind::Open(Bracket::Brace) => {
                if self.tok_has_value != 0 && self.frames[self.depth].kind == FrameKind::Statement {
                    // a brace after a value restarts as a block
                    if self.tok.line == self.frames[self.depth].t1.line {
                        self.pop()?;
                    } else {
                        self.yield_valid_asi()?;
                    }
                    return self.step();
                }
                self.record_walk(ValueHint::NoValue)?;
                self.push(FrameKind::Dict)
            }

            TokenKind::Ternary | TokenKind::Open(_) => {
                self.record_walk(ValueHint::NoValue)?;
                self.push(FrameKind::Group)
            }

            TokenKind::Word | TokenKind::String | TokenKind::Regexp | TokenKind::Number => {
                self.step_value()
            }

            TokenKind::Op => {
                let mut hint = ValueHint::NoValue;
                if self.tok.hash == lit::INCDEC {
                    if self.tok_has_value != 0 && self.tok.line != self.frames[self.depth].t1.line {
                        // postfix ++/-- disallows a preceding line break
                        self.tok_has_value = 0;
                        self.yield_valid_asi()?;
                        return self.step();
                    }
                    // ++/-- don't change value-ness
                    hint = ValueHint::from_has_value(self.tok_has_value);
                }
                self.record_walk(hint)
            }

            TokenKind::Colon => {
                if self.frames[self.depth].kind == FrameKind::Statement {
                    // catches e.g. "case {}:", pretend that was a statement
                    self.pop()?;
                }
                self.record_walk(ValueHint::NoValue)
            }

            // comments are skipped in the walks and Slash never commits
            _ => Err(ClassifyError::Internal("unhandled token kind")),
        }
    }

    fn step_close(&mut self) -> Result<(), ClassifyError> {
        // the right side of a dict entry closing the whole dict
        if self.frames[self.depth].kind == FrameKind::Group
            && self.frames[self.depth - 1].t1.kind == TokenKind::Colon
        {
            self.pop()?;
            if self.frames[self.depth].kind != FrameKind::Dict {
                return Err(ClassifyError::Internal("colon group outside dict"));
            }
            // let the dict handle this close, as if back on the left
            return self.step();
        }

        let mut resolved: Option<Token<'s>> = None;

        match self.frames[self.depth].kind {
            FrameKind::Group => {
                self.pop()?;

                // resolve a pending "async (…)": arrow next means keyword
                let arrow_next = self.source.peek().kind == TokenKind::Arrow;
                let f = &mut self.frames[self.depth];
                if f.t1.kind == TokenKind::Open(Bracket::Paren) && f.t2.kind == TokenKind::Word {
                    f.t2.kind = if arrow_next { TokenKind::Keyword } else { TokenKind::Symbol };
                    f.t2.mark = Mark::Resolve;
                    resolved = Some(f.t2);
                }
            }
            FrameKind::Block | FrameKind::Statement => {
                self.yield_valid_asi()?;
                self.pop()?;
            }
            _ => return Err(ClassifyError::Internal("unexpected close")),
        }

        // anything but landing in a naked block has value
        let f = &self.frames[self.depth];
        let has_value = f.kind != FrameKind::Block
            && f.t1.kind != TokenKind::Ternary
            && f.kind != FrameKind::Dict;
        self.skip_walk(if has_value { ValueHint::Value } else { ValueHint::NoValue })?;

        if let Some(t) = resolved {
            self.push_token(t);
        }
        Ok(())
    }

    /// Word and literal-value handling inside a statement.
    fn step_value(&mut self) -> Result<(), ClassifyError> {
        if self.tok.kind == TokenKind::Word
            && lit::flags(self.tok.hash).contains(LitFlags::REL_OP)
        {
            // "in"/"instanceof" are operators spelled as words
            self.tok.kind = TokenKind::Op;
            return self.record_walk(ValueHint::NoValue);
        }

        if matches!(self.tok.kind, TokenKind::Word | TokenKind::String)
            && self.frames[self.depth].t1.kind == TokenKind::Open(Bracket::TemplateSlot)
        {
            // a template part following "${…}" never triggers ASI; the
            // newline lives inside the literal
            return self.record_walk(ValueHint::Value);
        }

        // value on a new line after a value: statement break
        if self.frames[self.depth].kind == FrameKind::Statement
            && self.tok.line != self.frames[self.depth].t1.line
            && self.tok_has_value != 0
        {
            self.tok_has_value = 0;
            self.yield_valid_asi()?;
            return self.step();
        }

        if self.tok.kind != TokenKind::Word {
            return self.record_walk(ValueHint::Value);
        }

        // function or class expression
        if let Some(context) = self.match_function()? {
            self.push(FrameKind::Func)?;
            self.frames[self.depth].context = context;
            return Ok(());
        }
        if let Some(free_value) = self.match_class()? {
            self.push(FrameKind::Class)?;
            self.frames[self.depth].special = free_value;
            return Ok(());
        }

        // unary ops spelled as words, including contextual await/yield
        if lit::is_unary(self.tok.hash, self.frames[self.depth].context) {
            self.tok.kind = TokenKind::Op;
            self.record_walk(ValueHint::NoValue)?;

            let f = &self.frames[self.depth];
            if f.kind == FrameKind::Statement
                && f.t1.hash == lit::YIELD
                && f.t1.line != self.tok.line
            {
                // yield is a restricted production
                self.yield_valid_asi()?;
            }
            return Ok(());
        }

        // the "for (…)" clause has its own grammar
        if self.frames[self.depth].kind == FrameKind::Group && self.frames[self.depth].special {
            if !self.frames[self.depth].t1.is_present() && self.match_decl()? {
                return self.step();
            }

            // "of" between two value-like things
            if self.tok.hash == lit::OF
                && is_token_valuelike(&self.frames[self.depth].t1)
                && is_token_valuelike(self.source.peek())
            {
                self.tok.kind = TokenKind::Op;
                return self.record_walk(ValueHint::NoValue);
            }
        }

        // aggressive keyword match inside a statement
        if lit::is_always_keyword(self.tok.hash, self.frames[self.depth].context) {
            let f = &self.frames[self.depth];
            if f.kind == FrameKind::Statement && f.t1.is_present() && self.tok.line != f.t1.line {
                // a keyword on a new line restarts the statement
                self.yield_valid_asi()?;
                return self.step();
            }
            // otherwise it's just an invalid keyword here, except that
            // "for (var x;;)" lands here validly
            self.tok.kind = TokenKind::Keyword;
            return self.record_walk(ValueHint::NoValue);
        }

        // async arrow function lookahead
        if self.tok.hash == lit::ASYNC {
            if self.frames[self.depth].t1.hash == lit::DOT {
                self.tok.kind = TokenKind::Symbol; // ".async" is a call
            } else if self.source.peek().kind == TokenKind::Word {
                self.tok.kind = TokenKind::Keyword; // "async foo =>"
            } else if self.source.peek().kind == TokenKind::Open(Bracket::Paren) {
                // genuinely ambiguous until the matching ")" resolves it
                return self.record_walk(ValueHint::NoValue);
            }
        }

        if self.tok.kind == TokenKind::Word {
            self.tok.kind = TokenKind::Symbol;
        }
        self.record_walk(ValueHint::Value)
    }
}

fn is_use_strict(t: &Token<'_>) -> bool {
    t.kind == TokenKind::String && (t.text == "'use strict'" || t.text == "\"use strict\"")
}

fn is_token_valuelike(t: &Token<'_>) -> bool {
    if t.kind == TokenKind::Word {
        return !lit::flags(t.hash).contains(LitFlags::REL_OP);
    }
    matches!(
        t.kind,
        TokenKind::Symbol | TokenKind::Number | TokenKind::String | TokenKind::Open(Bracket::Brace)
    )
}

/// Valuelike for positions following a keyword, e.g. "extends []".
fn is_token_valuelike_keyword(t: &Token<'_>) -> bool {
    is_token_valuelike(t)
        || matches!(t.kind, TokenKind::Open(Bracket::Paren | Bracket::Array | Bracket::Brace))
}
