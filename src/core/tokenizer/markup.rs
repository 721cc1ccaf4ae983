//! HTML-like scanner for single-file components and Angular templates.
//!
//! Markup raw kinds carry a `.html` suffix so family mappers can tell them
//! apart from JSX kinds. Script blocks, interpolations and bound attribute
//! values are handed to the script scanner.

use super::scanner::{Scanner, is_ident_continue};
use super::script::{Stop, scan_attribute_segments, scan_script, scan_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Vue,
    Svelte,
    Angular,
}

pub(crate) fn scan_markup(sc: &mut Scanner, dialect: Dialect) {
    while let Some(c) = sc.peek() {
        if sc.starts_with("<!--") {
            let end = sc.find("-->").map(|e| e + 3).unwrap_or(sc.len());
            sc.emit_to("comment.block.html", end);
        } else if sc.starts_with("<!") {
            let end = sc.find(">").map(|e| e + 1).unwrap_or(sc.len());
            sc.emit_to("meta.tag.sgml.doctype.html", end);
        } else if dialect != Dialect::Svelte && sc.starts_with("{{") {
            sc.emit("punctuation.section.interpolation.begin.html", 2);
            sc.push_scope("meta.interpolation");
            scan_script(sc, false, Stop::Interpolation);
            sc.pop_scope();
            if sc.starts_with("}}") {
                sc.emit("punctuation.section.interpolation.end.html", 2);
            }
        } else if dialect == Dialect::Svelte && c == b'{' {
            scan_svelte_expression(sc);
        } else if sc.starts_with("</") {
            scan_closing_tag(sc);
        } else if c == b'<' && sc.peek_at(1).is_some_and(|b| b.is_ascii_alphabetic()) {
            scan_tag(sc, dialect);
        } else {
            scan_text(sc, dialect);
        }
    }
}

fn scan_text(sc: &mut Scanner, dialect: Dialect) {
    let bytes = sc.rest().as_bytes();
    let mut len = 0;
    while len < bytes.len() {
        match bytes[len] {
            b'<' if len > 0 => break,
            b'{' if len > 0
                && (dialect == Dialect::Svelte || bytes.get(len + 1) == Some(&b'{')) =>
            {
                break;
            }
            _ => len += 1,
        }
    }
    // Advance past a stray `<` or `{` that did not open anything.
    let len = len.max(1);
    let len = (len..=bytes.len())
        .find(|&l| sc.rest().is_char_boundary(l))
        .unwrap_or(bytes.len());
    if sc.rest()[..len].trim().is_empty() {
        sc.emit("whitespace", len);
    } else {
        sc.emit("text.html", len);
    }
}

fn scan_svelte_expression(sc: &mut Scanner) {
    sc.emit("punctuation.section.embedded.begin.svelte", 1);
    sc.push_scope("meta.embedded.expression");
    // Block tags: `{#if}`, `{:else}`, `{/each}`, `{@html}`.
    if matches!(sc.peek(), Some(b'#' | b'/' | b':' | b'@')) {
        let len = 1 + sc.rest()[1..].bytes().take_while(|&b| is_ident_continue(b)).count();
        sc.emit("keyword.control.block.svelte", len);
    }
    scan_script(sc, false, Stop::Brace);
    sc.pop_scope();
    if sc.peek() == Some(b'}') {
        sc.emit("punctuation.section.embedded.end.svelte", 1);
    }
}

fn tag_name_len(sc: &Scanner) -> usize {
    sc.run_len(|b| is_ident_continue(b) || matches!(b, b'-' | b':' | b'.'))
}

fn tag_name_kind(name: &str) -> &'static str {
    if name.eq_ignore_ascii_case("script") {
        "entity.name.tag.script.html"
    } else if name.eq_ignore_ascii_case("style") {
        "entity.name.tag.style.html"
    } else if name.starts_with(|c: char| c.is_ascii_uppercase()) {
        "support.class.component.html"
    } else {
        "entity.name.tag.html"
    }
}

fn scan_closing_tag(sc: &mut Scanner) {
    sc.push_scope("meta.tag");
    sc.emit("punctuation.definition.tag.closing.begin.html", 2);
    sc.whitespace();
    let len = tag_name_len(sc);
    let kind = tag_name_kind(&sc.rest()[..len]);
    sc.emit(kind, len);
    sc.whitespace();
    if sc.peek() == Some(b'>') {
        sc.emit("punctuation.definition.tag.end.html", 1);
    }
    sc.pop_scope();
}

fn scan_tag(sc: &mut Scanner, dialect: Dialect) {
    sc.push_scope("meta.tag");
    sc.emit("punctuation.definition.tag.begin.html", 1);
    let len = tag_name_len(sc);
    let name = &sc.rest()[..len];
    let kind = tag_name_kind(name);
    let is_script = name.eq_ignore_ascii_case("script");
    let is_style = name.eq_ignore_ascii_case("style");
    sc.emit(kind, len);

    loop {
        sc.whitespace();
        match sc.peek() {
            None => break,
            Some(b'/') if sc.peek_at(1) == Some(b'>') => {
                sc.emit("punctuation.definition.tag.self-closing.end.html", 2);
                break;
            }
            Some(b'>') => {
                sc.emit("punctuation.definition.tag.end.html", 1);
                sc.pop_scope();
                if is_script {
                    sc.push_scope("meta.embedded.block.script");
                    scan_script(sc, false, Stop::CloseTag("script"));
                    sc.pop_scope();
                } else if is_style {
                    skip_style(sc);
                }
                return;
            }
            Some(b'{') if dialect == Dialect::Svelte => scan_svelte_expression(sc),
            Some(b'"') | Some(b'\'') | Some(b'=') => {
                let len = sc.char_len();
                sc.emit("invalid.illegal.attribute.html", len);
            }
            Some(_) => scan_attribute(sc, dialect),
        }
    }
    sc.pop_scope();
}

fn skip_style(sc: &mut Scanner) {
    while sc.peek().is_some() && !sc.at_close_tag("style") {
        let len = sc.rest().find("</").unwrap_or(sc.rest().len()).max(1);
        let len = (len..=sc.rest().len())
            .find(|&l| sc.rest().is_char_boundary(l))
            .unwrap_or(sc.rest().len());
        sc.emit("source.css", len);
    }
}

/// Prefix and suffix shorthand of a bound attribute.
struct Binding {
    prefix: &'static str,
    suffix: &'static str,
}

fn binding_of(raw: &str, dialect: Dialect) -> Option<Binding> {
    let b = |prefix, suffix| Some(Binding { prefix, suffix });
    match dialect {
        Dialect::Vue => {
            if raw.starts_with("v-bind:") {
                b("v-bind:", "")
            } else if raw.starts_with("v-on:") {
                b("v-on:", "")
            } else if raw.starts_with("v-slot:") {
                b("v-slot:", "")
            } else if raw.starts_with(':') {
                b(":", "")
            } else if raw.starts_with('@') {
                b("@", "")
            } else if raw.starts_with('#') {
                b("#", "")
            } else if raw.starts_with("v-") {
                b("", "")
            } else {
                None
            }
        }
        Dialect::Angular => {
            if raw.starts_with("[(") && raw.ends_with(")]") {
                b("[(", ")]")
            } else if raw.starts_with('[') && raw.ends_with(']') {
                b("[", "]")
            } else if raw.starts_with('(') && raw.ends_with(')') {
                b("(", ")")
            } else if raw.starts_with('*') {
                b("*", "")
            } else {
                None
            }
        }
        Dialect::Svelte => None,
    }
}

fn scan_attribute(sc: &mut Scanner, dialect: Dialect) {
    let len = sc.run_len(|b| {
        !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'"' | b'\'' | b'{')
            && b != b'/'
    });
    if len == 0 {
        let len = sc.char_len();
        sc.emit("invalid.illegal.attribute.html", len);
        return;
    }
    let raw = &sc.rest()[..len];
    let binding = binding_of(raw, dialect);
    let bound = binding.is_some();

    match binding {
        Some(Binding { prefix, suffix }) => {
            let open_kind = match prefix {
                "[" | "[(" => "punctuation.definition.binding.begin.html",
                "(" => "punctuation.definition.event-binding.begin.html",
                "*" => "punctuation.definition.template-binding.html",
                _ => "punctuation.attribute-shorthand.html",
            };
            sc.emit(open_kind, prefix.len());
            let inner = len - prefix.len() - suffix.len();
            scan_name_with_modifiers(sc, inner, dialect);
            let close_kind = if suffix.ends_with(']') {
                "punctuation.definition.binding.end.html"
            } else {
                "punctuation.definition.event-binding.end.html"
            };
            sc.emit(close_kind, suffix.len());
        }
        None => scan_attribute_segments(sc, len, ".html"),
    }

    let ws_len = sc.run_len(|b| b.is_ascii_whitespace());
    if sc.rest().as_bytes().get(ws_len) != Some(&b'=') {
        return;
    }
    sc.whitespace();
    sc.emit("keyword.operator.assignment.html", 1);
    sc.whitespace();

    match sc.peek() {
        Some(q @ (b'"' | b'\'')) if bound => {
            sc.emit("punctuation.section.attribute-expression.begin.html", 1);
            sc.push_scope("meta.attribute.expression");
            scan_script(sc, false, Stop::Quote(q));
            sc.pop_scope();
            if sc.peek() == Some(q) {
                sc.emit("punctuation.section.attribute-expression.end.html", 1);
            }
        }
        Some(b'"') => scan_attribute_string(sc, b'"'),
        Some(b'\'') => scan_attribute_string(sc, b'\''),
        Some(b'{') if dialect == Dialect::Svelte => scan_svelte_expression(sc),
        Some(_) => {
            let len = sc.run_len(|b| !b.is_ascii_whitespace() && b != b'>');
            sc.emit("string.unquoted.html", len);
        }
        None => {}
    }
}

/// Vue modifiers (`@click.prevent`) become separate ignorable tokens.
fn scan_name_with_modifiers(sc: &mut Scanner, len: usize, dialect: Dialect) {
    let end = sc.position() + len;
    let name_len = if dialect == Dialect::Vue {
        sc.rest()[..len].find('.').unwrap_or(len)
    } else {
        len
    };
    scan_attribute_segments(sc, name_len, ".html");
    while sc.position() < end {
        if sc.peek() == Some(b'.') {
            sc.emit("punctuation.separator.modifier.html", 1);
        } else {
            let remaining = end - sc.position();
            let seg = sc.rest()[..remaining].find('.').unwrap_or(remaining);
            sc.emit("entity.other.attribute-name.modifier.html", seg);
        }
    }
}

/// Plain attribute values may span lines and have no escapes.
fn scan_attribute_string(sc: &mut Scanner, quote: u8) {
    let close = sc.rest()[1..].find(quote as char).map(|i| i + 1);
    match close {
        Some(close) => {
            sc.emit("punctuation.definition.string.begin.html", 1);
            sc.emit("string.quoted.html", close - 1);
            sc.emit("punctuation.definition.string.end.html", 1);
        }
        None => scan_string(sc, quote, "html"),
    }
}
