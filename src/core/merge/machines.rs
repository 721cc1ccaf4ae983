//! Merge machines shared by several families.

use super::{EndAction, Machine, Step, concat};
use crate::core::token::{Kind, Token};

// ============================================================
// Reducers
// ============================================================

/// Decode one escape sequence token (`\n`, `\x41`, `\u{1F600}`, ...).
pub fn unescape(escape: &str) -> String {
    let body = escape.strip_prefix('\\').unwrap_or(escape);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let decoded = match first {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'v' => Some('\u{b}'),
        '0' if body.len() == 1 => Some('\0'),
        // Line continuation.
        '\n' | '\r' => return String::new(),
        'x' | 'u' => {
            let hex = body[1..].trim_start_matches('{').trim_end_matches('}');
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        }
        other => Some(other),
    };
    match decoded {
        Some(c) => c.to_string(),
        None => body.to_string(),
    }
}

/// Literal content of a string or template: body tokens with escapes decoded.
pub fn literal_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| t.is(Kind::StringBody) || t.is(Kind::TemplateBody))
        .map(|t| {
            if t.kind.starts_with("constant.character.escape") {
                unescape(&t.text)
            } else {
                t.text.clone()
            }
        })
        .collect()
}

/// Text of the tag name tokens (empty for fragments).
pub fn tag_name_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| t.is(Kind::TagName))
        .map(|t| t.text.as_str())
        .collect()
}

fn attribute_name_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| t.is(Kind::TagAttributeName))
        .map(|t| t.text.as_str())
        .collect()
}

pub fn first_text(tokens: &[Token]) -> String {
    tokens.first().map(|t| t.text.clone()).unwrap_or_default()
}

// ============================================================
// Literals
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringState {
    Start,
    Body,
}

fn string_step(state: StringState, token: &Token) -> Step<StringState> {
    match (state, token.semantic) {
        (StringState::Start, Some(Kind::StringBegin)) => Step::Continue(StringState::Body),
        (StringState::Body, Some(Kind::StringBody)) => Step::Continue(StringState::Body),
        (StringState::Body, Some(Kind::StringEnd)) => Step::End(EndAction::MergeAll),
        _ => Step::Abort,
    }
}

/// `' body* '` → one `String` token holding the unescaped content.
pub static STRING: Machine<StringState> = Machine {
    name: "merged.string",
    initial: StringState::Start,
    step: string_step,
    result: Kind::String,
    reduce: literal_text,
    partition: None,
};

fn template_step(state: StringState, token: &Token) -> Step<StringState> {
    match (state, token.semantic) {
        (StringState::Start, Some(Kind::TemplateBegin)) => Step::Continue(StringState::Body),
        (StringState::Body, Some(Kind::TemplateBody | Kind::StringBody)) => {
            Step::Continue(StringState::Body)
        }
        (StringState::Body, Some(Kind::TemplateEnd)) => Step::End(EndAction::MergeAll),
        // `${` makes the template dynamic: leave it for the parser.
        _ => Step::Abort,
    }
}

/// Template literal without substitutions → `String`.
pub static TEMPLATE: Machine<StringState> = Machine {
    name: "merged.template",
    initial: StringState::Start,
    step: template_step,
    result: Kind::String,
    reduce: literal_text,
    partition: None,
};

// ============================================================
// Markup
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HyphenState {
    Start,
    SawName,
    SawHyphen,
    SawNameAfterHyphen,
}

fn attribute_hyphen_step(state: HyphenState, token: &Token) -> Step<HyphenState> {
    match (state, token.semantic) {
        (HyphenState::Start, Some(Kind::TagAttributeName)) => Step::Continue(HyphenState::SawName),
        (HyphenState::SawName | HyphenState::SawNameAfterHyphen, Some(Kind::TagAttributeHyphen)) => {
            Step::Continue(HyphenState::SawHyphen)
        }
        (HyphenState::SawHyphen, Some(Kind::TagAttributeName)) => {
            Step::Continue(HyphenState::SawNameAfterHyphen)
        }
        (HyphenState::SawNameAfterHyphen, _) => Step::End(EndAction::MergeWithoutLast),
        _ => Step::Abort,
    }
}

/// `key - name` attribute segments → one `key-name` attribute.
pub static ATTRIBUTE_HYPHEN: Machine<HyphenState> = Machine {
    name: "merged.attribute.name",
    initial: HyphenState::Start,
    step: attribute_hyphen_step,
    result: Kind::TagAttributeName,
    reduce: concat,
    partition: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    Start,
    Open,
    Named,
}

fn tag_closing_step(state: TagState, token: &Token) -> Step<TagState> {
    match (state, token.semantic) {
        (TagState::Start, Some(Kind::TagClosingBegin)) => Step::Continue(TagState::Open),
        (TagState::Open, Some(Kind::TagName)) => Step::Continue(TagState::Named),
        (TagState::Open | TagState::Named, Some(Kind::TagEnd)) => Step::End(EndAction::MergeAll),
        _ => Step::Abort,
    }
}

/// `</ name >` → `TagClosing` carrying the tag name.
pub static TAG_CLOSING: Machine<TagState> = Machine {
    name: "merged.tag.closing",
    initial: TagState::Start,
    step: tag_closing_step,
    result: Kind::TagClosing,
    reduce: tag_name_text,
    partition: None,
};

fn script_begin_step(state: TagState, token: &Token) -> Step<TagState> {
    match (state, token.semantic) {
        (TagState::Start, Some(Kind::TagOpen)) => Step::Continue(TagState::Open),
        (TagState::Open, Some(Kind::TagName)) if token.text.eq_ignore_ascii_case("script") => {
            Step::End(EndAction::MergeAll)
        }
        _ => Step::Abort,
    }
}

/// `<script` → `ScriptBegin`.
pub static SCRIPT_BEGIN: Machine<TagState> = Machine {
    name: "merged.tag.script.begin",
    initial: TagState::Start,
    step: script_begin_step,
    result: Kind::ScriptBegin,
    reduce: tag_name_text,
    partition: None,
};

fn script_end_step(_: TagState, token: &Token) -> Step<TagState> {
    if token.is(Kind::TagClosing) && token.text.eq_ignore_ascii_case("script") {
        Step::End(EndAction::MergeAll)
    } else {
        Step::Abort
    }
}

/// `</script>` → `ScriptEnd`. Runs after [`TAG_CLOSING`].
pub static SCRIPT_END: Machine<TagState> = Machine {
    name: "merged.tag.script.end",
    initial: TagState::Start,
    step: script_end_step,
    result: Kind::ScriptEnd,
    reduce: first_text,
    partition: None,
};

fn t_component_step(state: TagState, token: &Token) -> Step<TagState> {
    match (state, token.semantic) {
        (TagState::Start, Some(Kind::TagOpen)) => Step::Continue(TagState::Open),
        (TagState::Open, Some(Kind::TagName)) if token.text == "T" => {
            Step::End(EndAction::MergeAll)
        }
        _ => Step::Abort,
    }
}

/// `<T` → `TriggerTComponent`.
pub static T_COMPONENT: Machine<TagState> = Machine {
    name: "merged.trigger.t.component",
    initial: TagState::Start,
    step: t_component_step,
    result: Kind::TriggerTComponent,
    reduce: tag_name_text,
    partition: None,
};

fn tag_begin_step(state: TagState, token: &Token) -> Step<TagState> {
    match (state, token.semantic) {
        (TagState::Start, Some(Kind::TagOpen)) => Step::Continue(TagState::Open),
        (TagState::Open, Some(Kind::TagName)) => Step::End(EndAction::MergeAll),
        // Fragment `<>`: the `>` is still needed to close the tag.
        (TagState::Open, Some(Kind::TagEnd)) => Step::End(EndAction::MergeWithoutLast),
        _ => Step::Abort,
    }
}

/// `<name` → `TagBegin` carrying the tag name. Runs after the `<T` and
/// `<script` machines.
pub static TAG_BEGIN: Machine<TagState> = Machine {
    name: "merged.tag.begin",
    initial: TagState::Start,
    step: tag_begin_step,
    result: Kind::TagBegin,
    reduce: tag_name_text,
    partition: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Start,
    Open,
    Named,
}

fn binding_step(state: BindState, token: &Token) -> Step<BindState> {
    match (state, token.semantic) {
        (BindState::Start, Some(Kind::TagBindBegin)) => Step::Continue(BindState::Open),
        (BindState::Open, Some(Kind::TagAttributeName)) => Step::Continue(BindState::Named),
        (BindState::Named, Some(Kind::TagBindEnd)) => Step::End(EndAction::MergeAll),
        _ => Step::Abort,
    }
}

/// `[name]` property binding → attribute `name`.
pub static BINDING: Machine<BindState> = Machine {
    name: "merged.attribute.binding",
    initial: BindState::Start,
    step: binding_step,
    result: Kind::TagAttributeName,
    reduce: attribute_name_text,
    partition: None,
};

// ============================================================
// Script triggers
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Start,
    Callee,
    Dot,
}

/// Step shared by every `name(` trigger: the callee identifier is replaced
/// by the trigger and the `(` is left for the argument list.
pub(crate) fn callee_step(state: CallState, token: &Token, names: &[&str]) -> Step<CallState> {
    match (state, token.semantic) {
        (CallState::Start, Some(Kind::Identifier)) if names.contains(&token.text.as_str()) => {
            Step::Continue(CallState::Callee)
        }
        (CallState::Callee, Some(Kind::ExpressionBegin)) => Step::End(EndAction::ReplaceFirst),
        _ => Step::Abort,
    }
}

fn t_function_step(state: CallState, token: &Token) -> Step<CallState> {
    callee_step(state, token, &["t"])
}

/// `t(` → `TriggerTFunction`. Runs after [`GLOBAL_T_FUNCTION`] so member
/// calls are already claimed.
pub static T_FUNCTION: Machine<CallState> = Machine {
    name: "merged.trigger.t.function",
    initial: CallState::Start,
    step: t_function_step,
    result: Kind::TriggerTFunction,
    reduce: first_text,
    partition: None,
};

fn global_t_step(state: CallState, token: &Token) -> Step<CallState> {
    match (state, token.semantic) {
        (CallState::Start, Some(Kind::Accessor)) => Step::Continue(CallState::Dot),
        (CallState::Dot, Some(Kind::Identifier)) if token.text == "t" => {
            Step::Continue(CallState::Callee)
        }
        (CallState::Callee, Some(Kind::ExpressionBegin)) => Step::End(EndAction::MergeWithoutLast),
        _ => Step::Abort,
    }
}

/// `.t(` member call → `TriggerGlobalTFunction` (e.g. `tolgee.t(`).
pub static GLOBAL_T_FUNCTION: Machine<CallState> = Machine {
    name: "merged.trigger.global.t.function",
    initial: CallState::Start,
    step: global_t_step,
    result: Kind::TriggerGlobalTFunction,
    reduce: concat,
    partition: None,
};

fn use_translate_step(state: CallState, token: &Token) -> Step<CallState> {
    callee_step(state, token, &["useTranslate"])
}

/// `useTranslate(` → `TriggerNamespaceSource`.
pub static USE_TRANSLATE: Machine<CallState> = Machine {
    name: "merged.trigger.use.translate",
    initial: CallState::Start,
    step: use_translate_step,
    result: Kind::TriggerNamespaceSource,
    reduce: first_text,
    partition: None,
};

fn get_translate_step(state: CallState, token: &Token) -> Step<CallState> {
    callee_step(state, token, &["getTranslate"])
}

/// `getTranslate(` → `TriggerNamespaceSource`.
pub static GET_TRANSLATE: Machine<CallState> = Machine {
    name: "merged.trigger.get.translate",
    initial: CallState::Start,
    step: get_translate_step,
    result: Kind::TriggerNamespaceSource,
    reduce: first_text,
    partition: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::merge::{Merger, run_pipeline};
    use pretty_assertions::assert_eq;

    fn tok(raw: &str, kind: Kind, text: &str) -> Token {
        Token::new(raw, text, 1, 0).with_semantic(kind)
    }

    // ============================================================
    // Unescape
    // ============================================================

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("\\n"), "\n");
        assert_eq!(unescape("\\'"), "'");
        assert_eq!(unescape("\\x41"), "A");
        assert_eq!(unescape("\\u0042"), "B");
        assert_eq!(unescape("\\u{1F600}"), "\u{1F600}");
        assert_eq!(unescape("\\\n"), "");
    }

    // ============================================================
    // Machines
    // ============================================================

    #[test]
    fn test_string_merge_unescapes() {
        let tokens = vec![
            tok("punctuation.definition.string.begin.quoted.single", Kind::StringBegin, "'"),
            tok("string.quoted.single", Kind::StringBody, "it"),
            tok("constant.character.escape", Kind::StringBody, "\\'"),
            tok("string.quoted.single", Kind::StringBody, "s"),
            tok("punctuation.definition.string.end.quoted.single", Kind::StringEnd, "'"),
        ];
        let out = STRING.run(tokens).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "it's");
        assert_eq!(out[0].semantic, Some(Kind::String));
    }

    #[test]
    fn test_empty_string() {
        let tokens = vec![
            tok("punctuation.definition.string.begin", Kind::StringBegin, "'"),
            tok("punctuation.definition.string.end", Kind::StringEnd, "'"),
        ];
        let out = STRING.run(tokens).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "");
    }

    #[test]
    fn test_template_with_substitution_is_left_alone() {
        let tokens = vec![
            tok("t", Kind::TemplateBegin, "`"),
            tok("t", Kind::TemplateBody, "a"),
            tok("t", Kind::TemplateExprBegin, "${"),
            tok("t", Kind::Identifier, "b"),
            tok("t", Kind::TemplateExprEnd, "}"),
            tok("t", Kind::TemplateEnd, "`"),
        ];
        let out = TEMPLATE.run(tokens.clone()).unwrap();
        assert_eq!(out, tokens);
    }

    #[test]
    fn test_attribute_hyphen() {
        let tokens = vec![
            tok("a", Kind::TagAttributeName, "key"),
            tok("a", Kind::TagAttributeHyphen, "-"),
            tok("a", Kind::TagAttributeName, "name"),
            tok("a", Kind::Assignment, "="),
        ];
        let out = ATTRIBUTE_HYPHEN.run(tokens).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "key-name");
        assert_eq!(out[1].semantic, Some(Kind::Assignment));
    }

    #[test]
    fn test_t_function_versus_member_call() {
        let pipeline: &[&(dyn Merger + Sync)] = &[&GLOBAL_T_FUNCTION, &T_FUNCTION];
        let tokens = vec![
            tok("v", Kind::Identifier, "i18n"),
            tok("p", Kind::Accessor, "."),
            tok("v", Kind::Identifier, "t"),
            tok("b", Kind::ExpressionBegin, "("),
            tok("b", Kind::ExpressionEnd, ")"),
            tok("v", Kind::Identifier, "t"),
            tok("b", Kind::ExpressionBegin, "("),
        ];
        let out = run_pipeline(tokens, pipeline).unwrap();
        let kinds: Vec<_> = out.iter().filter_map(|t| t.semantic).collect();
        assert_eq!(
            kinds,
            vec![
                Kind::Identifier,
                Kind::TriggerGlobalTFunction,
                Kind::ExpressionBegin,
                Kind::ExpressionEnd,
                Kind::TriggerTFunction,
                Kind::ExpressionBegin,
            ]
        );
    }

    #[test]
    fn test_t_without_call_is_not_a_trigger() {
        let tokens = vec![
            tok("v", Kind::Identifier, "t"),
            tok("o", Kind::Assignment, "="),
        ];
        let out = T_FUNCTION.run(tokens.clone()).unwrap();
        assert_eq!(out, tokens);
    }

    #[test]
    fn test_tags() {
        let pipeline: &[&(dyn Merger + Sync)] =
            &[&TAG_CLOSING, &SCRIPT_BEGIN, &SCRIPT_END, &T_COMPONENT, &TAG_BEGIN];
        let tokens = vec![
            tok("o", Kind::TagOpen, "<"),
            tok("n", Kind::TagName, "T"),
            tok("e", Kind::TagEnd, ">"),
            tok("o", Kind::TagOpen, "<"),
            tok("n", Kind::TagName, "div"),
            tok("e", Kind::TagSelfClosingEnd, "/>"),
            tok("c", Kind::TagClosingBegin, "</"),
            tok("n", Kind::TagName, "T"),
            tok("e", Kind::TagEnd, ">"),
            tok("o", Kind::TagOpen, "<"),
            tok("n", Kind::TagName, "script"),
            tok("e", Kind::TagEnd, ">"),
            tok("c", Kind::TagClosingBegin, "</"),
            tok("n", Kind::TagName, "script"),
            tok("e", Kind::TagEnd, ">"),
        ];
        let out = run_pipeline(tokens, pipeline).unwrap();
        let kinds: Vec<_> = out.iter().map(|t| (t.semantic, t.text.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (Some(Kind::TriggerTComponent), "T"),
                (Some(Kind::TagEnd), ">"),
                (Some(Kind::TagBegin), "div"),
                (Some(Kind::TagSelfClosingEnd), "/>"),
                (Some(Kind::TagClosing), "T"),
                (Some(Kind::ScriptBegin), "script"),
                (Some(Kind::TagEnd), ">"),
                (Some(Kind::ScriptEnd), "script"),
            ]
        );
    }
}
