//! JavaScript/TypeScript scanner with optional JSX element support.

use super::scanner::{Scanner, is_ident_continue, is_ident_start};

/// Where a script region ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stop {
    Eof,
    /// Unbalanced `}` (template expressions, JSX/Svelte embedded expressions).
    Brace,
    /// Unbalanced `}}` (Vue/Angular interpolations).
    Interpolation,
    /// Closing quote of a bound attribute value.
    Quote(u8),
    /// Closing tag of an embedding element, e.g. `</script`.
    CloseTag(&'static str),
}

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "return", "for", "while", "do", "switch", "case", "break", "continue", "new",
    "typeof", "instanceof", "in", "of", "await", "yield", "throw", "try", "catch", "finally",
    "default", "as", "satisfies", "delete", "void", "extends", "implements", "super", "keyof",
];

const STORAGE_KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "class", "interface", "type", "enum", "namespace",
];

const MODIFIER_KEYWORDS: &[&str] = &[
    "async", "static", "declare", "readonly", "public", "private", "protected", "abstract",
];

/// Multi-character punctuators, longest first.
const PUNCTUATORS: &[(&str, &str)] = &[
    ("...", "keyword.operator.spread"),
    ("===", "keyword.operator.comparison"),
    ("!==", "keyword.operator.comparison"),
    ("&&=", "keyword.operator.assignment.compound"),
    ("||=", "keyword.operator.assignment.compound"),
    ("??=", "keyword.operator.assignment.compound"),
    ("**=", "keyword.operator.assignment.compound"),
    ("<<=", "keyword.operator.assignment.compound"),
    (">>=", "keyword.operator.assignment.compound"),
    ("=>", "storage.type.function.arrow"),
    ("==", "keyword.operator.comparison"),
    ("!=", "keyword.operator.comparison"),
    ("<=", "keyword.operator.relational"),
    (">=", "keyword.operator.relational"),
    ("&&", "keyword.operator.logical"),
    ("||", "keyword.operator.logical"),
    ("??", "keyword.operator.logical"),
    ("++", "keyword.operator.increment"),
    ("--", "keyword.operator.decrement"),
    ("**", "keyword.operator.arithmetic"),
    ("+=", "keyword.operator.assignment.compound"),
    ("-=", "keyword.operator.assignment.compound"),
    ("*=", "keyword.operator.assignment.compound"),
    ("/=", "keyword.operator.assignment.compound"),
    ("%=", "keyword.operator.assignment.compound"),
    ("&=", "keyword.operator.assignment.compound"),
    ("|=", "keyword.operator.assignment.compound"),
    ("^=", "keyword.operator.assignment.compound"),
    ("=", "keyword.operator.assignment"),
    ("|", "keyword.operator.bitwise.or"),
    (",", "punctuation.separator.comma"),
    (":", "punctuation.separator.key-value"),
    (";", "punctuation.terminator.statement"),
    ("?", "keyword.operator.ternary"),
    ("(", "meta.brace.round.begin"),
    (")", "meta.brace.round.end"),
    ("[", "meta.brace.square.begin"),
    ("]", "meta.brace.square.end"),
    ("<", "keyword.operator.relational"),
    (">", "keyword.operator.relational"),
];

pub(crate) fn scan_script(sc: &mut Scanner, jsx: bool, stop: Stop) {
    let mut depth = 0usize;
    while let Some(c) = sc.peek() {
        match stop {
            Stop::Brace if c == b'}' && depth == 0 => return,
            Stop::Interpolation if depth == 0 && sc.starts_with("}}") => return,
            Stop::Quote(q) if c == q => return,
            Stop::CloseTag(name) if sc.at_close_tag(name) => return,
            _ => {}
        }

        match c {
            c if c.is_ascii_whitespace() => {
                sc.whitespace();
            }
            b'/' if sc.peek_at(1) == Some(b'/') => {
                let len = sc.run_len(|b| b != b'\n');
                sc.emit("comment.line.double-slash", len);
            }
            b'/' if sc.peek_at(1) == Some(b'*') => {
                let end = sc
                    .find("*/")
                    .filter(|&e| e >= sc.position() + 2)
                    .map(|e| e + 2)
                    .unwrap_or(sc.len());
                sc.emit_to("comment.block", end);
            }
            b'\'' => scan_string(sc, b'\'', "quoted.single"),
            b'"' => scan_string(sc, b'"', "quoted.double"),
            b'`' => scan_template(sc, jsx),
            b'0'..=b'9' => scan_number(sc),
            b'.' if sc.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => scan_number(sc),
            c if is_ident_start(c) => scan_identifier(sc),
            b'{' => {
                depth += 1;
                sc.emit("punctuation.definition.block.begin", 1);
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                sc.emit("punctuation.definition.block.end", 1);
            }
            b'<' if jsx && jsx_allowed(sc) => scan_jsx_element(sc),
            b'/' if regex_allowed(sc) => scan_regex(sc),
            b'.' => {
                sc.emit("punctuation.accessor", 1);
            }
            b'?' if sc.peek_at(1) == Some(b'.')
                && !sc.peek_at(2).is_some_and(|b| b.is_ascii_digit()) =>
            {
                sc.emit("punctuation.accessor.optional", 2);
            }
            _ => scan_punctuation(sc),
        }
    }
}

fn scan_punctuation(sc: &mut Scanner) {
    for (text, kind) in PUNCTUATORS {
        if sc.starts_with(text) {
            sc.emit(kind, text.len());
            return;
        }
    }
    let len = sc.char_len();
    if len == 1 {
        sc.emit("keyword.operator", 1);
    } else {
        sc.emit("invalid.illegal", len);
    }
}

/// Scan a quoted string literal. Unterminated strings end at the line break.
pub(crate) fn scan_string(sc: &mut Scanner, quote: u8, flavor: &str) {
    sc.emit(&format!("punctuation.definition.string.begin.{flavor}"), 1);
    let body = format!("string.{flavor}");
    loop {
        match sc.peek() {
            None | Some(b'\n') => return,
            Some(q) if q == quote => {
                sc.emit(&format!("punctuation.definition.string.end.{flavor}"), 1);
                return;
            }
            Some(b'\\') => scan_escape(sc),
            Some(_) => {
                let len = sc.run_len(|b| b != quote && b != b'\\' && b != b'\n');
                sc.emit(&body, len);
            }
        }
    }
}

fn scan_escape(sc: &mut Scanner) {
    let len = match sc.peek_at(1) {
        Some(b'u') if sc.peek_at(2) == Some(b'{') => sc.rest().find('}').map(|i| i + 1).unwrap_or(2),
        Some(b'u') => 6,
        Some(b'x') => 4,
        Some(b) if b >= 0x80 => 1 + sc.rest()[1..].chars().next().map(char::len_utf8).unwrap_or(0),
        Some(_) => 2,
        None => 1,
    };
    let len = len.min(sc.rest().len());
    // Never split a multi-byte character.
    let len = (len..=sc.rest().len())
        .find(|&l| sc.rest().is_char_boundary(l))
        .unwrap_or(len);
    sc.emit("constant.character.escape", len);
}

fn scan_template(sc: &mut Scanner, jsx: bool) {
    sc.emit("punctuation.definition.string.template.begin", 1);
    loop {
        match sc.peek() {
            None => return,
            Some(b'`') => {
                sc.emit("punctuation.definition.string.template.end", 1);
                return;
            }
            Some(b'\\') => scan_escape(sc),
            Some(b'$') if sc.peek_at(1) == Some(b'{') => {
                sc.emit("punctuation.definition.template-expression.begin", 2);
                sc.push_scope("meta.template.expression");
                scan_script(sc, jsx, Stop::Brace);
                sc.pop_scope();
                if sc.peek() == Some(b'}') {
                    sc.emit("punctuation.definition.template-expression.end", 1);
                }
            }
            Some(_) => {
                let mut len = 0;
                let bytes = sc.rest().as_bytes();
                while len < bytes.len() {
                    match bytes[len] {
                        b'`' | b'\\' => break,
                        b'$' if bytes.get(len + 1) == Some(&b'{') => break,
                        _ => len += 1,
                    }
                }
                if len == 0 {
                    len = 1;
                }
                sc.emit("string.template", len);
            }
        }
    }
}

fn scan_number(sc: &mut Scanner) {
    let mut len = sc.run_len(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.');
    // Exponent sign, e.g. 1e-5.
    let rest = sc.rest().as_bytes();
    if len > 0
        && matches!(rest[len - 1], b'e' | b'E')
        && rest.first().is_some_and(|b| b.is_ascii_digit())
        && !rest.starts_with(b"0x")
        && matches!(rest.get(len), Some(b'+') | Some(b'-'))
    {
        len += 1;
        len += rest[len..].iter().take_while(|b| b.is_ascii_digit()).count();
    }
    sc.emit("constant.numeric.decimal", len);
}

fn scan_identifier(sc: &mut Scanner) {
    let len = sc.run_len(is_ident_continue);
    let word = &sc.rest()[..len];
    let after_accessor = sc
        .last_significant()
        .is_some_and(|t| t.kind.starts_with("punctuation.accessor"));
    let calls = next_significant_byte(sc, len) == Some(b'(');

    let kind = if after_accessor {
        if calls {
            "entity.name.function"
        } else {
            "variable.other.property"
        }
    } else {
        match word {
            "true" => "constant.language.boolean.true",
            "false" => "constant.language.boolean.false",
            "null" => "constant.language.null",
            "undefined" => "constant.language.undefined",
            "this" => "variable.language.this",
            "import" => "keyword.control.import",
            "export" => "keyword.control.export",
            "from" => "keyword.control.from",
            w if STORAGE_KEYWORDS.contains(&w) => "storage.type",
            w if MODIFIER_KEYWORDS.contains(&w) => "storage.modifier",
            w if CONTROL_KEYWORDS.contains(&w) => "keyword.control",
            _ if calls => "entity.name.function",
            _ => "variable.other.readwrite",
        }
    };
    sc.emit(kind, len);
}

/// First non-whitespace byte at or after `offset` from the current position.
fn next_significant_byte(sc: &Scanner, offset: usize) -> Option<u8> {
    sc.rest().as_bytes()[offset..]
        .iter()
        .copied()
        .find(|b| !b.is_ascii_whitespace())
}

/// Whether the previous token ends an operand, in which case `/` and `<`
/// are binary operators.
fn after_operand(sc: &Scanner) -> bool {
    let Some(prev) = sc.last_significant() else {
        return false;
    };
    let kind = prev.kind.as_str();
    kind.starts_with("variable")
        || kind.starts_with("entity.name.function")
        || kind.starts_with("constant")
        || kind.starts_with("punctuation.definition.string.end")
        || kind.starts_with("punctuation.definition.string.template.end")
        || kind == "meta.brace.round.end"
        || kind == "meta.brace.square.end"
        || kind == "string.regexp"
}

fn regex_allowed(sc: &Scanner) -> bool {
    !after_operand(sc)
}

fn jsx_allowed(sc: &Scanner) -> bool {
    let next = sc.peek_at(1);
    next.is_some_and(|b| b.is_ascii_alphabetic() || b == b'>') && !after_operand(sc)
}

fn scan_regex(sc: &mut Scanner) {
    let bytes = sc.rest().as_bytes();
    let mut i = 1;
    let mut in_class = false;
    let mut closed = false;
    let mut braces = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' => break,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'{' if !in_class => braces += 1,
            // An unbalanced `}` closes the enclosing expression.
            b'}' if !in_class && braces == 0 => break,
            b'}' if !in_class => braces -= 1,
            b'/' if !in_class => {
                closed = true;
                i += 1;
                break;
            }
            _ => {}
        }
        i += 1;
    }
    if !closed {
        sc.emit("keyword.operator.arithmetic", 1);
        return;
    }
    i += bytes[i..].iter().take_while(|b| b.is_ascii_alphabetic()).count();
    sc.emit("string.regexp", i);
}

fn tag_name_kind(name: &str) -> &'static str {
    if name.starts_with(|c: char| c.is_ascii_uppercase()) || name.contains('.') {
        "support.class.component"
    } else {
        "entity.name.tag"
    }
}

fn scan_jsx_element(sc: &mut Scanner) {
    sc.push_scope("meta.tag");
    sc.emit("punctuation.definition.tag.begin", 1);
    sc.whitespace();
    if sc.peek() == Some(b'>') {
        sc.emit("punctuation.definition.tag.end", 1);
        sc.pop_scope();
        scan_jsx_children(sc);
        return;
    }

    let len = sc.run_len(|b| is_ident_continue(b) || matches!(b, b'.' | b':' | b'-'));
    let kind = tag_name_kind(&sc.rest()[..len]);
    sc.emit(kind, len);

    loop {
        sc.whitespace();
        match sc.peek() {
            None => break,
            Some(b'/') if sc.peek_at(1) == Some(b'>') => {
                sc.emit("punctuation.definition.tag.self-closing.end", 2);
                break;
            }
            Some(b'>') => {
                sc.emit("punctuation.definition.tag.end", 1);
                sc.pop_scope();
                scan_jsx_children(sc);
                return;
            }
            Some(b'{') => scan_embedded(sc),
            Some(b'=') => sc.emit("keyword.operator.assignment", 1),
            Some(b'"') => scan_string(sc, b'"', "quoted.double"),
            Some(b'\'') => scan_string(sc, b'\'', "quoted.single"),
            Some(c) if is_ident_start(c) => {
                let len = sc.run_len(|b| is_ident_continue(b) || matches!(b, b':' | b'-'));
                scan_attribute_segments(sc, len, "");
            }
            Some(_) => {
                let len = sc.char_len();
                sc.emit("invalid.illegal.attribute", len);
            }
        }
    }
    sc.pop_scope();
}

/// Emit an attribute name of `len` bytes, split at hyphens.
pub(crate) fn scan_attribute_segments(sc: &mut Scanner, len: usize, suffix: &str) {
    let name_kind = format!("entity.other.attribute-name{suffix}");
    let hyphen_kind = format!("punctuation.separator.attribute-name{suffix}");
    let end = sc.position() + len;
    while sc.position() < end {
        if sc.peek() == Some(b'-') {
            sc.emit(&hyphen_kind, 1);
        } else {
            let remaining = end - sc.position();
            let seg = sc.rest()[..remaining].find('-').unwrap_or(remaining);
            sc.emit(&name_kind, seg);
        }
    }
}

fn scan_embedded(sc: &mut Scanner) {
    sc.emit("punctuation.section.embedded.begin", 1);
    sc.push_scope("meta.embedded.expression");
    scan_script(sc, true, Stop::Brace);
    sc.pop_scope();
    if sc.peek() == Some(b'}') {
        sc.emit("punctuation.section.embedded.end", 1);
    }
}

fn scan_jsx_children(sc: &mut Scanner) {
    loop {
        match sc.peek() {
            None => return,
            Some(b'{') => scan_embedded(sc),
            Some(b'<') if sc.peek_at(1) == Some(b'/') => {
                sc.push_scope("meta.tag");
                sc.emit("punctuation.definition.tag.closing.begin", 2);
                sc.whitespace();
                let len = sc.run_len(|b| is_ident_continue(b) || matches!(b, b'.' | b':' | b'-'));
                let kind = tag_name_kind(&sc.rest()[..len]);
                sc.emit(kind, len);
                sc.whitespace();
                if sc.peek() == Some(b'>') {
                    sc.emit("punctuation.definition.tag.end", 1);
                }
                sc.pop_scope();
                return;
            }
            Some(b'<') => scan_jsx_element(sc),
            Some(_) => {
                let len = sc.run_len(|b| b != b'{' && b != b'<');
                let text = &sc.rest()[..len];
                if text.trim().is_empty() {
                    sc.emit("whitespace", len);
                } else {
                    sc.emit("meta.jsx.children", len);
                }
            }
        }
    }
}
