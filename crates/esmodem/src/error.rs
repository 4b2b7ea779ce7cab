use thiserror::Error;

/// Errors surfaced while classifying a token stream.
///
/// All variants are fatal: classification stops at the first error and the
/// token callback receives nothing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// A fixed-capacity stack (bracket nesting, grammar frames, pending
    /// ternaries) overflowed.
    #[error("nesting too deep")]
    CapacityExceeded,

    /// A closing bracket did not match the innermost open bracket, or closed
    /// at the top level.
    #[error("mismatched bracket")]
    MalformedBracket,

    /// The classifier reached a state it has no rule for. Indicates a bug or
    /// input far outside the grammar.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// Input ended with unconsumed tokens or unclosed grammar frames.
    #[error("unexpected trailing input")]
    TrailingInput,
}
