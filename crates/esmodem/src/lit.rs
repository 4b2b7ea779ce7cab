//! Literal word table.
//!
//! Every interesting word of the language is interned as a `u32` hash whose
//! low ten bits double as a membership mask: whether the word is a keyword,
//! only reserved in strict mode, usable as a variable, and so on. Tokens
//! carry the hash so grammar decisions are integer compares rather than
//! string compares. A handful of operators (`.`/`...`/`?.`/`++`/`=>`/…) are
//! folded into the same space so records can test them uniformly.

use bitflags::bitflags;

bitflags! {
    /// Membership mask stored in the low ten bits of a word hash.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LitFlags: u32 {
        /// Always reserved.
        const KEYWORD = 1;
        /// Reserved in strict mode.
        const STRICT_KEYWORD = 2;
        /// Binary relational operator spelled as a word (`in`, `instanceof`).
        const REL_OP = 4;
        /// Unary operator spelled as a word (`typeof`, `void`, `new`, …).
        const UNARY_OP = 8;
        /// Reserved word that behaves like a value or a value prefix
        /// (`this`, `true`, `case`, …).
        const MASQUERADE = 16;
        /// Usable where a value is expected (`this`, `true`, `undefined`, …).
        const VARIABLE = 32;
        /// Opens a declaration (`var`, `let`, `const`).
        const DECL = 64;
        /// Opens a control structure.
        const CONTROL = 128;
        /// Control structure followed by a parenthesized clause.
        const CONTROL_PAREN = 256;
        /// Control structure followed by a braced clause.
        const CONTROL_BRACE = 512;
    }
}

bitflags! {
    /// Grammar context bits propagated through nested frames.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Context: u8 {
        /// Strict mode: module source, `'use strict'` prologue, or class
        /// body.
        const STRICT = 1;
        /// Inside an `async` function or arrow.
        const ASYNC = 2;
        /// Inside a generator function.
        const GENERATOR = 4;
    }
}

pub const AS: u32 = 389_816_320;
pub const ASYNC: u32 = 792_469_504;
pub const AWAIT: u32 = 796_663_819;
pub const BREAK: u32 = 791_429_123;
pub const CASE: u32 = 639_393_811;
pub const CATCH: u32 = 773_612_419;
pub const CLASS: u32 = 785_145_859;
pub const CONST: u32 = 788_291_651;
pub const CONTINUE: u32 = 1_190_944_771;
pub const DEBUGGER: u32 = 1_180_467_203;
pub const DEFAULT: u32 = 1_046_249_491;
pub const DELETE: u32 = 912_031_753;
pub const DO: u32 = 385_646_723;
pub const ELSE: u32 = 650_944_643;
pub const ENUM: u32 = 653_041_667;
pub const EXPORT: u32 = 931_962_883;
pub const EXTENDS: u32 = 1_066_180_611;
pub const FALSE: u32 = 773_636_144;
pub const FINALLY: u32 = 1_050_460_803;
pub const FOR: u32 = 519_881_091;
pub const FROM: u32 = 657_244_160;
pub const FUNCTION: u32 = 1_197_260_803;
pub const GET: u32 = 509_403_136;
pub const IF: u32 = 376_250_755;
pub const IMPLEMENTS: u32 = 1_457_332_226;
pub const IMPORT: u32 = 920_461_360;
pub const IN: u32 = 384_638_981;
pub const INSTANCEOF: u32 = 1_458_380_805;
pub const INTERFACE: u32 = 1_324_163_074;
pub const LET: u32 = 509_444_162;
pub const NEW: u32 = 509_460_489;
pub const NULL: u32 = 660_455_472;
pub const OF: u32 = 376_299_520;
pub const PACKAGE: u32 = 1_042_153_474;
pub const PRIVATE: u32 = 1_059_979_266;
pub const PROTECTED: u32 = 1_328_414_722;
pub const PUBLIC: u32 = 928_907_266;
pub const RETURN: u32 = 912_146_435;
pub const SET: u32 = 509_501_440;
pub const STATIC: u32 = 927_883_267;
pub const SUPER: u32 = 794_714_160;
pub const SWITCH: u32 = 931_029_891;
pub const THIS: u32 = 646_873_136;
pub const THROW: u32 = 781_090_819;
pub const TRUE: u32 = 657_358_896;
pub const TRY: u32 = 523_141_763;
pub const TYPEOF: u32 = 933_134_345;
pub const UNDEFINED: u32 = 1_324_261_408;
pub const VAR: u32 = 505_331_779;
pub const VOID: u32 = 654_229_513;
pub const WHILE: u32 = 781_115_779;
pub const WITH: u32 = 647_946_627;
pub const YIELD: u32 = 782_180_363;

// Operators folded into the hash space. None carry membership flags.
pub const ARROW: u32 = 333_946_880;
pub const BITNOT: u32 = 135_249_920;
pub const CHAIN: u32 = 317_186_048;
pub const COMMA: u32 = 134_578_176;
pub const DOT: u32 = 134_594_560;
pub const EQUALS: u32 = 134_717_440;
pub const INCDEC: u32 = 315_973_632;
pub const NOT: u32 = 134_488_064;
pub const SPREAD: u32 = 451_264_512;
pub const STAR: u32 = 134_561_792;

/// Hash of a source word, or 0 when it is not in the table.
#[must_use]
pub fn word_hash(word: &str) -> u32 {
    match word {
        "as" => AS,
        "async" => ASYNC,
        "await" => AWAIT,
        "break" => BREAK,
        "case" => CASE,
        "catch" => CATCH,
        "class" => CLASS,
        "const" => CONST,
        "continue" => CONTINUE,
        "debugger" => DEBUGGER,
        "default" => DEFAULT,
        "delete" => DELETE,
        "do" => DO,
        "else" => ELSE,
        "enum" => ENUM,
        "export" => EXPORT,
        "extends" => EXTENDS,
        "false" => FALSE,
        "finally" => FINALLY,
        "for" => FOR,
        "from" => FROM,
        "function" => FUNCTION,
        "get" => GET,
        "if" => IF,
        "implements" => IMPLEMENTS,
        "import" => IMPORT,
        "in" => IN,
        "instanceof" => INSTANCEOF,
        "interface" => INTERFACE,
        "let" => LET,
        "new" => NEW,
        "null" => NULL,
        "of" => OF,
        "package" => PACKAGE,
        "private" => PRIVATE,
        "protected" => PROTECTED,
        "public" => PUBLIC,
        "return" => RETURN,
        "set" => SET,
        "static" => STATIC,
        "super" => SUPER,
        "switch" => SWITCH,
        "this" => THIS,
        "throw" => THROW,
        "true" => TRUE,
        "try" => TRY,
        "typeof" => TYPEOF,
        "undefined" => UNDEFINED,
        "var" => VAR,
        "void" => VOID,
        "while" => WHILE,
        "with" => WITH,
        "yield" => YIELD,
        _ => 0,
    }
}

/// Membership mask of a hash. Zero hashes and folded operators have none.
#[must_use]
pub fn flags(hash: u32) -> LitFlags {
    LitFlags::from_bits_truncate(hash & 0x3ff)
}

/// Words that always classify as a keyword in the given context, regardless
/// of position.
#[must_use]
pub fn is_always_keyword(hash: u32, context: Context) -> bool {
    let f = flags(hash);
    f.contains(LitFlags::KEYWORD)
        || (context.contains(Context::STRICT) && f.contains(LitFlags::STRICT_KEYWORD))
}

/// Words reserved only by the surrounding function kind: `await` in async
/// code, `yield` in generators. `yield` is invalid but still reserved in
/// strict mode.
#[must_use]
pub fn is_optional_keyword(hash: u32, context: Context) -> bool {
    (context.contains(Context::ASYNC) && hash == AWAIT)
        || (context.intersects(Context::GENERATOR | Context::STRICT) && hash == YIELD)
}

/// Whether this word may name a statement label here.
#[must_use]
pub fn is_label(hash: u32, context: Context) -> bool {
    !is_always_keyword(hash, context) && !is_optional_keyword(hash, context)
}

/// Whether this word may name a variable here.
#[must_use]
pub fn is_valid_name(hash: u32, context: Context) -> bool {
    let mut mask = LitFlags::KEYWORD | LitFlags::MASQUERADE;
    if context.contains(Context::STRICT) {
        mask |= LitFlags::STRICT_KEYWORD;
    }
    if (context.contains(Context::ASYNC) && hash == AWAIT)
        || (context.contains(Context::GENERATOR) && hash == YIELD)
    {
        return false;
    }
    !flags(hash).intersects(mask)
}

/// Word-spelled unary operators valid in this context, including the
/// contextual `await`/`yield` prefixes. Requires the keyword bit so bare
/// `await`/`yield` outside their function kind don't match by default.
#[must_use]
pub fn is_unary(hash: u32, context: Context) -> bool {
    flags(hash).contains(LitFlags::KEYWORD | LitFlags::UNARY_OP)
        || is_optional_keyword(hash, context)
}

/// Declarations whose body brace is hoisted out of expression position.
#[must_use]
pub fn is_hoist(hash: u32) -> bool {
    hash == FUNCTION || hash == CLASS
}

/// Keywords after which a `/` begins a regular expression.
#[must_use]
pub fn allows_regex_after(hash: u32) -> bool {
    matches!(
        hash,
        CASE | DO
            | ELSE
            | RETURN
            | THROW
            | TYPEOF
            | VOID
            | DELETE
            | IN
            | INSTANCEOF
            | NEW
            | AWAIT
            | YIELD
    )
}

/// Keywords a `{` directly follows as a block rather than an object literal.
#[must_use]
pub fn is_block_creator(hash: u32) -> bool {
    matches!(hash, DO | ELSE | TRY | FINALLY)
}

/// Word-spelled operators of either arity.
#[must_use]
pub fn is_oplike(hash: u32) -> bool {
    flags(hash).intersects(LitFlags::REL_OP | LitFlags::UNARY_OP)
}

/// Control keywords followed by a parenthesized clause.
#[must_use]
pub fn is_control_paren(hash: u32) -> bool {
    flags(hash).contains(LitFlags::CONTROL_PAREN)
}
