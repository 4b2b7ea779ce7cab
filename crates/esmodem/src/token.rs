/// Bracket shape tracked by the scanner's nesting stack.
///
/// Template literal substitutions (`${` … `}`) nest like brackets and carry
/// their own shape so a plain `}` inside a template resumes the literal
/// instead of closing a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// `(` … `)`
    Paren,
    /// `[` … `]`
    Array,
    /// `{` … `}`
    Brace,
    /// `${` … `}` inside a template literal
    TemplateSlot,
}

/// The classification attached to a token.
///
/// The scanner produces the coarse kinds (`Word`, `Op`, `Slash`, brackets,
/// literals); the grammar engine retypes words into `Keyword`, `Symbol` or
/// `Label` before emitting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input. Never emitted; pulling past the end keeps returning it.
    Eof,
    /// A `//` or `/* */` comment, passed through verbatim.
    Comment,
    /// An unresolved word: identifier characters that may be a keyword,
    /// symbol or label depending on grammar position.
    Word,
    /// A word resolved to a reserved use (`if`, `function`, contextual
    /// `async`, …).
    Keyword,
    /// A word resolved to a plain identifier.
    Symbol,
    /// A word resolved to a statement label (`loop:` or after
    /// `break`/`continue`).
    Label,
    /// A numeric literal.
    Number,
    /// A string literal, including each textual part of a template literal.
    String,
    /// A regular expression literal, including its flags.
    Regexp,
    /// A punctuation or operator token (`+`, `.`, `...`, `?.`, `++`, …).
    /// `=>` is [`Arrow`](Self::Arrow).
    Op,
    /// The `=>` of an arrow function.
    Arrow,
    /// A leading `/` that the scanner cannot resolve on its own. Only ever
    /// visible through [`Tokenizer::peek`](crate::Tokenizer::peek); promotion
    /// re-reads it as `Op` or `Regexp`.
    Slash,
    /// `;`, real or synthesized. Synthesized semicolons have empty text.
    Semicolon,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// A lone `?` opening a ternary.
    Ternary,
    /// An opening bracket of the given shape.
    Open(Bracket),
    /// A closing bracket of the given shape.
    Close(Bracket),
}

/// Out-of-band annotation carried by an emitted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// No annotation.
    None,
    /// This string is a module import source (`from '…'`, `import '…'`).
    ImportSource,
    /// This token was already emitted once with a tentative kind and is being
    /// re-emitted, out of source order, with its final kind.
    Resolve,
}

/// A classified token.
///
/// Tokens borrow their text from the source and are cheap to copy. A token
/// with empty text and kind [`TokenKind::Semicolon`] was synthesized by
/// automatic semicolon insertion and occupies no source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    /// Exact source text. Empty for synthesized semicolons.
    pub text: &'s str,
    /// Byte offset of the first character.
    pub offset: usize,
    /// 1-based line number of the first character.
    pub line: u32,
    /// Literal-word hash when the text is a known word or folded operator,
    /// else 0. See [`crate::lit`].
    pub hash: u32,
    pub mark: Mark,
}

impl<'s> Token<'s> {
    pub(crate) const EMPTY: Token<'s> = Token {
        kind: TokenKind::Eof,
        text: "",
        offset: 0,
        line: 0,
        hash: 0,
        mark: Mark::None,
    };

    /// Whether this slot of a grammar record holds a real token.
    pub(crate) fn is_present(&self) -> bool {
        self.kind != TokenKind::Eof
    }

    /// Whether this token was synthesized rather than read from the source.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.text.is_empty()
    }
}
