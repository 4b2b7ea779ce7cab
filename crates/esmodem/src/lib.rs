//! Streaming ECMAScript token classifier.
//!
//! `esmodem` turns JavaScript source into a fully disambiguated token stream
//! without building a syntax tree: every word is resolved to a keyword,
//! symbol or label, every `/` to a division or regular expression, every `{`
//! to a block or object literal, and automatic semicolon insertion is made
//! explicit with synthesized `;` tokens.
//!
//! Two independent passes are provided over the same scanner:
//!
//! - [`classify`] runs the grammar engine: a bounded frame stack that
//!   resolves every token, inserts ASI semicolons, applies strict/async/
//!   generator context and understands module `import`/`export` grammar.
//! - [`stream`] runs the context tracker: one small record per bracket
//!   depth, answering only "is a regex legal here", fed back to the scanner.
//!
//! Both borrow token text from the input and emit through a callback; no
//! token buffer is kept.
//!
//! ```
//! use esmodem::{classify, SourceMode, TokenKind};
//!
//! let mut kinds = Vec::new();
//! classify("a\n++b", SourceMode::Script, |t| kinds.push((t.kind, t.text)))?;
//! // ASI splits the statements: a ; ++ b ;
//! assert_eq!(kinds[1], (TokenKind::Semicolon, ""));
//! # Ok::<(), esmodem::ClassifyError>(())
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

mod error;
mod grammar;
pub mod lit;
mod stream;
mod token;
mod tokenizer;

pub use error::ClassifyError;
pub use grammar::{GrammarEngine, MAX_GRAMMAR_DEPTH, SourceMode, classify};
pub use lit::{Context, LitFlags};
pub use stream::{MAX_STREAM_DEPTH, StreamTracker, stream};
pub use token::{Bracket, Mark, Token, TokenKind};
pub use tokenizer::{MAX_NEST_DEPTH, Tokenizer, ValueHint};
