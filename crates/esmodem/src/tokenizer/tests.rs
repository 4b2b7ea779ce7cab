use std::vec::Vec;

use super::*;
use crate::lit;

fn lex_all(src: &str) -> Vec<Token<'_>> {
    let mut t = Tokenizer::new(src).unwrap();
    let mut out = Vec::new();
    loop {
        let tok = t.next(ValueHint::Unknown).unwrap();
        if tok.kind == TokenKind::Eof {
            return out;
        }
        out.push(tok);
    }
}

fn texts(src: &str) -> Vec<&str> {
    lex_all(src).into_iter().map(|t| t.text).collect()
}

#[test]
fn words_ops_numbers() {
    let toks = lex_all("var x = 1;");
    let got: Vec<_> = toks.iter().map(|t| (t.kind, t.text, t.hash)).collect();
    assert_eq!(
        got,
        [
            (TokenKind::Word, "var", lit::VAR),
            (TokenKind::Word, "x", 0),
            (TokenKind::Op, "=", lit::EQUALS),
            (TokenKind::Number, "1", 0),
            (TokenKind::Semicolon, ";", 0),
        ]
    );
    let offsets: Vec<_> = toks.iter().map(|t| t.offset).collect();
    assert_eq!(offsets, [0, 4, 6, 8, 9]);
}

#[test]
fn line_numbers() {
    let toks = lex_all("a\n  b\n\nc");
    let got: Vec<_> = toks.iter().map(|t| (t.text, t.line, t.offset)).collect();
    assert_eq!(got, [("a", 1, 0), ("b", 2, 4), ("c", 4, 7)]);
}

#[test]
fn comments_pass_through() {
    let toks = lex_all("a // hi\nb /* x\ny */ c");
    let got: Vec<_> = toks.iter().map(|t| (t.kind, t.text, t.line)).collect();
    assert_eq!(
        got,
        [
            (TokenKind::Word, "a", 1),
            (TokenKind::Comment, "// hi", 1),
            (TokenKind::Word, "b", 2),
            (TokenKind::Comment, "/* x\ny */", 2),
            (TokenKind::Word, "c", 3),
        ]
    );
}

#[test]
fn unterminated_block_comment_runs_out() {
    let toks = lex_all("a /* never");
    assert_eq!(toks[1].kind, TokenKind::Comment);
    assert_eq!(toks[1].text, "/* never");
    assert_eq!(toks.len(), 2);
}

#[test]
fn slash_promotion_follows_hint() {
    let mut t = Tokenizer::new("a / b").unwrap();
    assert_eq!(t.next(ValueHint::Unknown).unwrap().text, "a");
    assert_eq!(t.peek().kind, TokenKind::Slash);
    let tok = t.next(ValueHint::Value).unwrap();
    assert_eq!((tok.kind, tok.text), (TokenKind::Op, "/"));
    assert_eq!(t.next(ValueHint::Unknown).unwrap().text, "b");

    let mut t = Tokenizer::new("a / b").unwrap();
    t.next(ValueHint::Unknown).unwrap();
    let tok = t.next(ValueHint::NoValue).unwrap();
    // no closing slash, so the regex consumes the rest of the input
    assert_eq!((tok.kind, tok.text), (TokenKind::Regexp, "/ b"));
}

#[test]
fn slash_heuristic_after_number() {
    let got: Vec<_> = lex_all("1 /2/ 3").iter().map(|t| (t.kind, t.text)).collect();
    assert_eq!(
        got,
        [
            (TokenKind::Number, "1"),
            (TokenKind::Op, "/"),
            (TokenKind::Number, "2"),
            (TokenKind::Op, "/"),
            (TokenKind::Number, "3"),
        ]
    );
}

#[test]
fn regex_with_class_and_flags() {
    let toks = lex_all("x = /a[/]b/gi");
    assert_eq!(toks[2].kind, TokenKind::Regexp);
    assert_eq!(toks[2].text, "/a[/]b/gi");
}

#[test]
fn regex_escapes() {
    let toks = lex_all(r"x = /a\/b/");
    assert_eq!(toks[2].kind, TokenKind::Regexp);
    assert_eq!(toks[2].text, r"/a\/b/");
}

#[test]
fn compound_operators() {
    assert_eq!(texts("a === b !== c >>>= d <<= e ** f"), [
        "a", "===", "b", "!==", "c", ">>>=", "d", "<<=", "e", "**", "f"
    ]);
    assert_eq!(texts("a ?? b ??= c"), ["a", "??", "b", "??=", "c"]);
}

#[test]
fn incdec_and_arrow_hashes() {
    let toks = lex_all("a ++ b => c");
    assert_eq!((toks[1].kind, toks[1].hash), (TokenKind::Op, lit::INCDEC));
    assert_eq!((toks[3].kind, toks[3].hash), (TokenKind::Arrow, lit::ARROW));
}

#[test]
fn spread_dot_chain() {
    let toks = lex_all("...a.b?.c");
    let got: Vec<_> = toks.iter().map(|t| (t.text, t.hash)).collect();
    assert_eq!(
        got,
        [
            ("...", lit::SPREAD),
            ("a", 0),
            (".", lit::DOT),
            ("b", 0),
            ("?.", lit::CHAIN),
            ("c", 0),
        ]
    );
}

#[test]
fn member_names_never_hash() {
    let toks = lex_all("a.return");
    assert_eq!((toks[2].kind, toks[2].hash), (TokenKind::Word, 0));
    let toks = lex_all("a?.if");
    assert_eq!((toks[2].kind, toks[2].hash), (TokenKind::Word, 0));
}

#[test]
fn ternary_over_number_is_not_chain() {
    let got: Vec<_> = lex_all("a?.5:b").iter().map(|t| (t.kind, t.text)).collect();
    assert_eq!(
        got,
        [
            (TokenKind::Word, "a"),
            (TokenKind::Ternary, "?"),
            (TokenKind::Number, ".5"),
            (TokenKind::Colon, ":"),
            (TokenKind::Word, "b"),
        ]
    );
}

#[test]
fn string_escapes() {
    let toks = lex_all(r"'a\'b' c");
    assert_eq!((toks[0].kind, toks[0].text), (TokenKind::String, r"'a\'b'"));
    assert_eq!(toks[1].text, "c");
}

#[test]
fn template_parts_and_slots() {
    let got: Vec<_> = lex_all("`a${b}c`").iter().map(|t| (t.kind, t.text)).collect();
    assert_eq!(
        got,
        [
            (TokenKind::String, "`a"),
            (TokenKind::Open(Bracket::TemplateSlot), "${"),
            (TokenKind::Word, "b"),
            (TokenKind::Close(Bracket::TemplateSlot), "}"),
            (TokenKind::String, "c`"),
        ]
    );
}

#[test]
fn nested_template() {
    let got: Vec<_> = lex_all("`${`x`}`").iter().map(|t| (t.kind, t.text)).collect();
    assert_eq!(
        got,
        [
            (TokenKind::String, "`"),
            (TokenKind::Open(Bracket::TemplateSlot), "${"),
            (TokenKind::String, "`x`"),
            (TokenKind::Close(Bracket::TemplateSlot), "}"),
            (TokenKind::String, "`"),
        ]
    );
}

#[test]
fn template_brace_disambiguation() {
    // the `}` after `b` resumes the template, the final `}` closes the block
    let got: Vec<_> = lex_all("{`${b}`}").iter().map(|t| t.kind).collect();
    assert_eq!(
        got,
        [
            TokenKind::Open(Bracket::Brace),
            TokenKind::String,
            TokenKind::Open(Bracket::TemplateSlot),
            TokenKind::Word,
            TokenKind::Close(Bracket::TemplateSlot),
            TokenKind::String,
            TokenKind::Close(Bracket::Brace),
        ]
    );
}

#[test]
fn hoist_body_close_makes_slash_divide() {
    let got: Vec<_> = lex_all("(class {} / 1)").iter().map(|t| t.kind).collect();
    assert_eq!(
        got,
        [
            TokenKind::Open(Bracket::Paren),
            TokenKind::Word,
            TokenKind::Open(Bracket::Brace),
            TokenKind::Close(Bracket::Brace),
            TokenKind::Op,
            TokenKind::Number,
            TokenKind::Close(Bracket::Paren),
        ]
    );
}

#[test]
fn statement_hoist_body_close_keeps_regex() {
    let toks = lex_all("class A {} /re/");
    let last = toks.last().unwrap();
    assert_eq!((last.kind, last.text), (TokenKind::Regexp, "/re/"));
}

#[test]
fn mismatched_brackets_fail() {
    assert_eq!(Tokenizer::new(")").unwrap_err(), ClassifyError::MalformedBracket);
    let mut t = Tokenizer::new("(]").unwrap();
    assert_eq!(t.next(ValueHint::Unknown).unwrap_err(), ClassifyError::MalformedBracket);
}

#[test]
fn nesting_capacity() {
    let src: std::string::String = core::iter::repeat('(').take(MAX_NEST_DEPTH + 8).collect();
    let mut t = match Tokenizer::new(&src) {
        Ok(t) => t,
        Err(e) => {
            assert_eq!(e, ClassifyError::CapacityExceeded);
            return;
        }
    };
    let err = loop {
        match t.next(ValueHint::Unknown) {
            Ok(_) => {}
            Err(e) => break e,
        }
    };
    assert_eq!(err, ClassifyError::CapacityExceeded);
}

#[test]
fn eof_repeats() {
    let mut t = Tokenizer::new("a").unwrap();
    t.next(ValueHint::Unknown).unwrap();
    assert_eq!(t.next(ValueHint::Unknown).unwrap().kind, TokenKind::Eof);
    assert_eq!(t.next(ValueHint::Unknown).unwrap().kind, TokenKind::Eof);
}

#[test]
fn non_ascii_words() {
    let toks = lex_all("héllo wörld");
    assert_eq!(toks[0].text, "héllo");
    assert_eq!(toks[1].text, "wörld");
}

#[test]
fn escaped_identifier() {
    let toks = lex_all(r"abc = 1");
    assert_eq!((toks[0].kind, toks[0].text), (TokenKind::Word, r"abc"));
    let toks = lex_all(r"\u{1f600}x");
    assert_eq!(toks[0].text, r"\u{1f600}x");
}
