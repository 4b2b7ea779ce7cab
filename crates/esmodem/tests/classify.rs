use std::fmt::Write;

use esmodem::{classify, stream, Mark, SourceMode, Token, TokenKind};
use rstest::rstest;

/// Renders a token stream as one line: `kind(text)`, `asi` for synthesized
/// semicolons, `!` marking a resolved token and `@` an import source.
fn render_with<E>(run: impl FnOnce(&mut dyn FnMut(Token<'_>)) -> Result<(), E>) -> String
where
    E: std::fmt::Debug,
{
    let mut out = String::new();
    run(&mut |t| {
        if !out.is_empty() {
            out.push(' ');
        }
        let name = match t.kind {
            TokenKind::Eof => "eof",
            TokenKind::Comment => "comment",
            TokenKind::Word => "word",
            TokenKind::Keyword => "kw",
            TokenKind::Symbol => "sym",
            TokenKind::Label => "label",
            TokenKind::Number => "num",
            TokenKind::String => "str",
            TokenKind::Regexp => "re",
            TokenKind::Op => "op",
            TokenKind::Arrow => "arrow",
            TokenKind::Slash => "slash",
            TokenKind::Semicolon => {
                if t.text.is_empty() {
                    "asi"
                } else {
                    "semi"
                }
            }
            TokenKind::Comma => "comma",
            TokenKind::Colon => "colon",
            TokenKind::Ternary => "ternary",
            TokenKind::Open(_) => "open",
            TokenKind::Close(_) => "close",
        };
        if t.text.is_empty() {
            out.push_str(name);
        } else {
            let _ = write!(out, "{name}({})", t.text);
        }
        match t.mark {
            Mark::None => {}
            Mark::ImportSource => out.push('@'),
            Mark::Resolve => out.push('!'),
        }
    })
    .unwrap();
    out
}

fn render(src: &str, mode: SourceMode) -> String {
    render_with(|emit| classify(src, mode, emit))
}

#[rstest]
#[case::do_while_asi(
    "do ; while (0) foo",
    "kw(do) semi kw(while) open(() num(0) close()) asi sym(foo) asi"
)]
#[case::postfix_incdec_asi("x\n++y", "sym(x) asi op(++) sym(y) asi")]
#[case::async_arrow_in_block(
    "{async () => {}}",
    "open({) word(async) open(() close()) kw(async)! arrow(=>) open({) close(}) asi close(})"
)]
#[case::async_call("async(1)", "word(async) open(() num(1) close()) sym(async)! asi")]
#[case::strict_prologue("'use strict'; interface", "str('use strict') semi kw(interface) asi")]
#[case::division("a = b / c", "sym(a) op(=) sym(b) op(/) sym(c) asi")]
#[case::regex_after_return(
    "return /x/.test(1)",
    "kw(return) re(/x/) op(.) sym(test) open(() num(1) close()) asi"
)]
#[case::labelled_for(
    "loop: for (;;) break loop",
    "label(loop) colon(:) kw(for) open(() semi(;) semi(;) close()) kw(break) label(loop)"
)]
#[case::var_decl_asi("var x = 1\nvar y", "kw(var) sym(x) op(=) num(1) asi kw(var) sym(y) asi")]
#[case::dict_getter(
    "x = {get y() {}}",
    "sym(x) op(=) open({) kw(get) sym(y) open(() close()) open({) close(}) close(}) asi"
)]
#[case::template_slot(
    "t = `a${b}c`",
    "sym(t) op(=) str(`a) open(${) sym(b) close(}) str(c`) asi"
)]
#[case::function_statement(
    "function f() {\nreturn\n1\n}",
    "kw(function) sym(f) open(() close()) open({) kw(return) asi num(1) asi close(})"
)]
#[case::class_statement(
    "class A extends B {}",
    "kw(class) sym(A) kw(extends) sym(B) open({) close(})"
)]
fn script_scenarios(#[case] src: &str, #[case] expected: &str) {
    assert_eq!(render(src, SourceMode::Script), expected);
}

#[rstest]
#[case::export_default_function(
    "export default function() {}",
    "kw(export) kw(default) kw(function) open(() close()) open({) close(})"
)]
#[case::export_const("export const x = 1", "kw(export) kw(const) sym(x) op(=) num(1) asi")]
#[case::import_list(
    "import {a as b} from './x'",
    "kw(import) open({) sym(a) kw(as) sym(b) close(}) kw(from) str('./x')@ asi"
)]
#[case::import_star(
    "import * as ns from './y'",
    "kw(import) sym(*) kw(as) sym(ns) kw(from) str('./y')@ asi"
)]
#[case::bare_import("import './z'", "kw(import) str('./z')@ asi")]
fn module_scenarios(#[case] src: &str, #[case] expected: &str) {
    assert_eq!(render(src, SourceMode::Module), expected);
}

#[rstest]
#[case::division_after_call("f(x) / 2", "word(f) open(() word(x) close()) op(/) num(2)")]
#[case::regex_after_control("if (x) /re/", "word(if) open(() word(x) close()) re(/re/)")]
#[case::regex_in_statement_position(
    "a; /re/.test(b)",
    "word(a) semi(;) re(/re/) op(.) word(test) open(() word(b) close())"
)]
fn stream_scenarios(#[case] src: &str, #[case] expected: &str) {
    assert_eq!(render_with(|emit| stream(src, emit)), expected);
}

#[test]
fn classify_and_stream_agree_on_slashes() {
    let src = "a = b / c; if (x) /re/.test(b);";
    let mut from_classify = Vec::new();
    classify(src, SourceMode::Script, |t| {
        if matches!(t.kind, TokenKind::Op | TokenKind::Regexp) && t.text.starts_with('/') {
            from_classify.push((t.kind, t.text));
        }
    })
    .unwrap();
    let mut from_stream = Vec::new();
    stream(src, |t| {
        if matches!(t.kind, TokenKind::Op | TokenKind::Regexp) && t.text.starts_with('/') {
            from_stream.push((t.kind, t.text));
        }
    })
    .unwrap();
    assert_eq!(from_classify, from_stream);
    assert_eq!(from_classify, [(TokenKind::Op, "/"), (TokenKind::Regexp, "/re/")]);
}

#[test]
fn reclassifying_emitted_spans_is_stable() {
    let src = "a = b / c; loop: for (;;) break loop\nx\n++y /* note */\nt = `a${1}b`";
    let mut covered = vec![false; src.len()];
    let mut first = Vec::new();
    classify(src, SourceMode::Script, |t| {
        if t.kind == TokenKind::Comment {
            return;
        }
        first.push(t.kind);
        if !t.is_synthetic() {
            for c in &mut covered[t.offset..t.offset + t.text.len()] {
                *c = true;
            }
        }
    })
    .unwrap();

    // rebuild the input from the emitted spans alone: everything between
    // them becomes whitespace, with newlines kept for ASI
    let rebuilt: String = src
        .bytes()
        .enumerate()
        .map(|(i, b)| if covered[i] || b == b'\n' { b as char } else { ' ' })
        .collect();
    let mut second = Vec::new();
    classify(&rebuilt, SourceMode::Script, |t| second.push(t.kind)).unwrap();
    assert_eq!(second, first);
}

#[test]
fn tokens_cover_the_source() {
    let src = "let x = `a${1}b`; /* note */ x++";
    classify(src, SourceMode::Script, |t| {
        if t.is_synthetic() {
            return;
        }
        let end = t.offset + t.text.len();
        assert_eq!(&src[t.offset..end], t.text, "token text must slice the source");
    })
    .unwrap();
}
