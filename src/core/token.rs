//! Tokens flowing through the extraction pipeline.
//!
//! The tokenizer produces tokens tagged with a raw grammar `kind`
//! (TextMate-style scope names). The kind remapper and the merge pipeline
//! then assign a [`Kind`], which is the only field the parser consults.

use std::fmt;

/// A lexical token.
///
/// Tokens are immutable once merged: a merge produces a new composite token
/// whose offsets and line come from the first and last absorbed tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Raw grammar kind produced by the tokenizer (or the merge machine name
    /// for composite tokens).
    pub kind: String,
    /// Semantic kind assigned by the remapper or a merge machine.
    pub semantic: Option<Kind>,
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub scopes: Vec<String>,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>, line: usize, start: usize) -> Self {
        let text = text.into();
        let end = start + text.len();
        Self {
            kind: kind.into(),
            semantic: None,
            text,
            line,
            start,
            end,
            scopes: Vec::new(),
        }
    }

    /// Attach a semantic kind (builder style, mostly used by tests).
    pub fn with_semantic(mut self, kind: Kind) -> Self {
        self.semantic = Some(kind);
        self
    }

    pub fn is(&self, kind: Kind) -> bool {
        self.semantic == Some(kind)
    }

    /// True if the token carries `kind` and its text equals `text`.
    pub fn is_text(&self, kind: Kind, text: &str) -> bool {
        self.is(kind) && self.text == text
    }

    /// Last line covered by the token (multi-line comments and strings).
    pub fn end_line(&self) -> usize {
        self.line + self.text.matches('\n').count()
    }
}

/// Semantic token vocabulary shared by all syntax families.
///
/// Kinds whose label starts with `trigger.` begin a recognized construct and
/// are looked up in the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Comment,
    Ignore,

    // Literals
    StringBegin,
    StringBody,
    StringEnd,
    String,
    TemplateBegin,
    TemplateBody,
    TemplateEnd,
    TemplateExprBegin,
    TemplateExprEnd,
    Number,
    Boolean,
    Null,
    Text,

    // Script punctuation
    Identifier,
    Keyword,
    Operator,
    Assignment,
    Arrow,
    Spread,
    Accessor,
    Comma,
    Colon,
    Semicolon,
    Pipe,
    BlockBegin,
    BlockEnd,
    ListBegin,
    ListEnd,
    ExpressionBegin,
    ExpressionEnd,
    ExpressionTemplateBegin,
    ExpressionTemplateEnd,

    // Markup
    TagOpen,
    TagName,
    TagBegin,
    TagEnd,
    TagSelfClosingEnd,
    TagClosingBegin,
    TagClosing,
    TagAttributeName,
    TagAttributeHyphen,
    TagBindBegin,
    TagBindEnd,
    ScriptBegin,
    ScriptEnd,

    // Triggers
    TriggerTFunction,
    TriggerGlobalTFunction,
    TriggerNamespaceSource,
    TriggerTComponent,
    TriggerVueSetup,
    TriggerVueDirective,
    TriggerNgxPipe,
    TriggerNgxDirective,
    TriggerNgxService,
}

impl Kind {
    /// Dotted label of the kind, as used in diagnostics and rule labels.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Comment => "comment",
            Kind::Ignore => "ignore",
            Kind::StringBegin => "string.begin",
            Kind::StringBody => "string.body",
            Kind::StringEnd => "string.end",
            Kind::String => "string",
            Kind::TemplateBegin => "string.template.begin",
            Kind::TemplateBody => "string.template.body",
            Kind::TemplateEnd => "string.template.end",
            Kind::TemplateExprBegin => "expression.template.begin",
            Kind::TemplateExprEnd => "expression.template.end",
            Kind::Number => "primitive.number",
            Kind::Boolean => "primitive.boolean",
            Kind::Null => "primitive.null",
            Kind::Text => "text",
            Kind::Identifier => "identifier",
            Kind::Keyword => "keyword",
            Kind::Operator => "operator",
            Kind::Assignment => "operator.assignment",
            Kind::Arrow => "operator.arrow",
            Kind::Spread => "operator.spread",
            Kind::Accessor => "accessor.dot",
            Kind::Comma => "separator.comma",
            Kind::Colon => "separator.colon",
            Kind::Semicolon => "separator.semicolon",
            Kind::Pipe => "operator.pipe",
            Kind::BlockBegin => "block.begin",
            Kind::BlockEnd => "block.end",
            Kind::ListBegin => "list.begin",
            Kind::ListEnd => "list.end",
            Kind::ExpressionBegin => "expression.begin",
            Kind::ExpressionEnd => "expression.end",
            Kind::ExpressionTemplateBegin => "expression.embedded.begin",
            Kind::ExpressionTemplateEnd => "expression.embedded.end",
            Kind::TagOpen => "tag.open",
            Kind::TagName => "tag.name",
            Kind::TagBegin => "tag.regular.begin",
            Kind::TagEnd => "tag.regular.end",
            Kind::TagSelfClosingEnd => "tag.self-closing.end",
            Kind::TagClosingBegin => "tag.closing.begin",
            Kind::TagClosing => "tag.closing",
            Kind::TagAttributeName => "tag.attribute.name",
            Kind::TagAttributeHyphen => "tag.attribute.hyphen",
            Kind::TagBindBegin => "tag.attribute.bind.begin",
            Kind::TagBindEnd => "tag.attribute.bind.end",
            Kind::ScriptBegin => "tag.script.begin",
            Kind::ScriptEnd => "tag.script.end",
            Kind::TriggerTFunction => "trigger.t.function",
            Kind::TriggerGlobalTFunction => "trigger.global.t.function",
            Kind::TriggerNamespaceSource => "trigger.namespace.source",
            Kind::TriggerTComponent => "trigger.t.component",
            Kind::TriggerVueSetup => "trigger.vue.setup",
            Kind::TriggerVueDirective => "trigger.vue.directive",
            Kind::TriggerNgxPipe => "trigger.ngx.pipe",
            Kind::TriggerNgxDirective => "trigger.ngx.directive",
            Kind::TriggerNgxService => "trigger.ngx.service",
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.label().starts_with("trigger.")
    }

    /// Kinds that hold a statically known literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Kind::String | Kind::Number | Kind::Boolean | Kind::Null | Kind::Text
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_labels() {
        assert!(Kind::TriggerTFunction.is_trigger());
        assert!(Kind::TriggerNgxPipe.is_trigger());
        assert!(!Kind::BlockBegin.is_trigger());
        assert_eq!(Kind::TriggerTFunction.to_string(), "trigger.t.function");
    }

    #[test]
    fn test_token_end_line() {
        let token = Token::new("comment.block", "/* a\n b\n c */", 4, 10);
        assert_eq!(token.end_line(), 6);
        assert_eq!(token.end, 10 + token.text.len());
    }

    #[test]
    fn test_is_text() {
        let token = Token::new("variable.other.readwrite", "t", 1, 0).with_semantic(Kind::Identifier);
        assert!(token.is_text(Kind::Identifier, "t"));
        assert!(!token.is_text(Kind::Identifier, "x"));
        assert!(!token.is_text(Kind::Keyword, "t"));
    }
}
