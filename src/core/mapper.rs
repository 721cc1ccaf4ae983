//! Kind remapper.
//!
//! A mapper narrows a raw grammar kind to a semantic [`Kind`]. Families
//! compose mappers as a prioritized list; the first one returning a kind
//! wins. Tokens no mapper recognizes (whitespace, CSS, doctype) are dropped
//! before merging.

use crate::core::token::{Kind, Token};

pub type Mapper = fn(&str) -> Option<Kind>;

/// Resolve a raw kind against a prioritized mapper list.
pub fn map_kind(raw: &str, mappers: &[Mapper]) -> Option<Kind> {
    mappers.iter().find_map(|mapper| mapper(raw))
}

/// Assign semantic kinds and drop tokens without one.
pub fn remap(tokens: Vec<Token>, mappers: &[Mapper]) -> Vec<Token> {
    tokens
        .into_iter()
        .filter_map(|mut token| {
            token.semantic = map_kind(&token.kind, mappers);
            token.semantic.map(|_| token)
        })
        .collect()
}

/// Prefix table lookup: the first matching prefix wins.
fn lookup(raw: &str, table: &[(&str, Kind)]) -> Option<Kind> {
    table
        .iter()
        .find(|(prefix, _)| raw.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

const SCRIPT_TABLE: &[(&str, Kind)] = &[
    ("comment", Kind::Comment),
    ("punctuation.definition.string.template.begin", Kind::TemplateBegin),
    ("punctuation.definition.string.template.end", Kind::TemplateEnd),
    ("punctuation.definition.template-expression.begin", Kind::TemplateExprBegin),
    ("punctuation.definition.template-expression.end", Kind::TemplateExprEnd),
    ("punctuation.definition.string.begin", Kind::StringBegin),
    ("punctuation.definition.string.end", Kind::StringEnd),
    ("string.template", Kind::TemplateBody),
    ("string.quoted", Kind::StringBody),
    ("constant.character.escape", Kind::StringBody),
    ("string.unquoted", Kind::String),
    ("string.regexp", Kind::Operator),
    ("constant.numeric", Kind::Number),
    ("constant.language.boolean", Kind::Boolean),
    ("constant.language.null", Kind::Null),
    ("constant.language.undefined", Kind::Identifier),
    ("variable", Kind::Identifier),
    ("entity.name.function", Kind::Identifier),
    ("storage.type.function.arrow", Kind::Arrow),
    ("storage", Kind::Keyword),
    ("keyword.control", Kind::Keyword),
    ("keyword.operator.spread", Kind::Spread),
    ("keyword.operator.assignment.compound", Kind::Operator),
    ("keyword.operator.assignment", Kind::Assignment),
    ("keyword.operator", Kind::Operator),
    ("punctuation.accessor", Kind::Accessor),
    ("punctuation.separator.comma", Kind::Comma),
    ("punctuation.separator.key-value", Kind::Colon),
    ("punctuation.terminator.statement", Kind::Semicolon),
    ("punctuation.definition.block.begin", Kind::BlockBegin),
    ("punctuation.definition.block.end", Kind::BlockEnd),
    ("meta.brace.round.begin", Kind::ExpressionBegin),
    ("meta.brace.round.end", Kind::ExpressionEnd),
    ("meta.brace.square.begin", Kind::ListBegin),
    ("meta.brace.square.end", Kind::ListEnd),
];

/// JavaScript and TypeScript vocabulary, shared by every family.
pub fn script_mapper(raw: &str) -> Option<Kind> {
    lookup(raw, SCRIPT_TABLE)
}

const MARKUP_TABLE: &[(&str, Kind)] = &[
    ("punctuation.definition.tag.closing.begin", Kind::TagClosingBegin),
    ("punctuation.definition.tag.begin", Kind::TagOpen),
    ("punctuation.definition.tag.self-closing.end", Kind::TagSelfClosingEnd),
    ("punctuation.definition.tag.end", Kind::TagEnd),
    ("entity.name.tag", Kind::TagName),
    ("support.class.component", Kind::TagName),
    ("entity.other.attribute-name", Kind::TagAttributeName),
    ("punctuation.separator.attribute-name", Kind::TagAttributeHyphen),
    ("punctuation.section.embedded.begin", Kind::ExpressionTemplateBegin),
    ("punctuation.section.embedded.end", Kind::ExpressionTemplateEnd),
    ("punctuation.section.interpolation.begin", Kind::ExpressionTemplateBegin),
    ("punctuation.section.interpolation.end", Kind::ExpressionTemplateEnd),
    ("punctuation.section.attribute-expression.begin", Kind::ExpressionTemplateBegin),
    ("punctuation.section.attribute-expression.end", Kind::ExpressionTemplateEnd),
    ("punctuation.definition.event-binding", Kind::Ignore),
    ("punctuation.definition.template-binding", Kind::Ignore),
    ("meta.jsx.children", Kind::Text),
    ("text.html", Kind::Text),
];

/// Element vocabulary shared by JSX and the HTML-like grammars.
pub fn markup_mapper(raw: &str) -> Option<Kind> {
    lookup(raw, MARKUP_TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // Script mapper
    // ============================================================

    #[test]
    fn test_string_delimiters_collapse() {
        for raw in [
            "punctuation.definition.string.begin.quoted.single",
            "punctuation.definition.string.begin.quoted.double",
            "punctuation.definition.string.begin.html",
        ] {
            assert_eq!(script_mapper(raw), Some(Kind::StringBegin));
        }
        assert_eq!(script_mapper("constant.character.escape"), Some(Kind::StringBody));
    }

    #[test]
    fn test_template_kinds_are_distinct_from_strings() {
        assert_eq!(
            script_mapper("punctuation.definition.string.template.begin"),
            Some(Kind::TemplateBegin)
        );
        assert_eq!(script_mapper("string.template"), Some(Kind::TemplateBody));
    }

    #[test]
    fn test_operators() {
        assert_eq!(script_mapper("storage.type.function.arrow"), Some(Kind::Arrow));
        assert_eq!(script_mapper("storage.type"), Some(Kind::Keyword));
        assert_eq!(script_mapper("keyword.operator.assignment"), Some(Kind::Assignment));
        assert_eq!(
            script_mapper("keyword.operator.assignment.compound"),
            Some(Kind::Operator)
        );
    }

    #[test]
    fn test_unknown_kinds() {
        assert_eq!(script_mapper("whitespace"), None);
        assert_eq!(script_mapper("source.css"), None);
    }

    // ============================================================
    // Composition
    // ============================================================

    #[test]
    fn test_first_mapper_wins() {
        fn pipe(raw: &str) -> Option<Kind> {
            (raw == "keyword.operator.bitwise.or").then_some(Kind::Pipe)
        }
        let mappers: &[Mapper] = &[pipe, script_mapper];
        assert_eq!(map_kind("keyword.operator.bitwise.or", mappers), Some(Kind::Pipe));
        assert_eq!(map_kind("keyword.operator.logical", mappers), Some(Kind::Operator));
    }

    #[test]
    fn test_remap_drops_unmapped() {
        let tokens = vec![
            Token::new("whitespace", " ", 1, 0),
            Token::new("variable.other.readwrite", "a", 1, 1),
        ];
        let mapped = remap(tokens, &[markup_mapper, script_mapper]);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].semantic, Some(Kind::Identifier));
    }
}
