use pretty_assertions::assert_eq;

use super::*;

#[test]
fn string_emitter_newline_and_indent() {
    let mut emitter = StringEmitter::default();
    emitter.emit("interface Foo");
    emitter.emit_newline();
    emitter.emit_indent(4);
    emitter.emit("body");
    assert_eq!(emitter.output(), "interface Foo\n    body");
}

#[test]
fn string_emitter_trailing_newline() {
    let mut emitter = StringEmitter::with_capacity(16);
    emitter.emit("content");
    emitter.ensure_trailing_newline();
    emitter.ensure_trailing_newline();
    assert_eq!(emitter.output(), "content\n");
}

#[test]
fn string_emitter_empty_stays_empty() {
    let mut emitter = StringEmitter::default();
    emitter.ensure_trailing_newline();
    assert_eq!(emitter.output(), "");
}

#[test]
fn string_emitter_trim_trailing_blank_lines() {
    let mut emitter = StringEmitter::default();
    emitter.emit("content");
    emitter.emit_newline();
    emitter.emit_newline();
    emitter.emit_newline();
    emitter.trim_trailing_blank_lines();
    emitter.ensure_trailing_newline();
    assert_eq!(emitter.output(), "content\n");
}
