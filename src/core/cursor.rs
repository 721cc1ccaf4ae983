//! One-token-lookahead cursor over a merged token stream.
//!
//! Comment tokens are never returned by the cursor: they are skipped and
//! handed to the [`AdvanceHook`] along with every consumed token, which is
//! how magic comments learn the line of the token that follows them.

use crate::core::ExtractError;
use crate::core::token::{Kind, Token};

/// Called with every token the cursor moves past, comments included.
pub trait AdvanceHook {
    fn before_advance(&mut self, token: &Token);
}

impl AdvanceHook for () {
    fn before_advance(&mut self, _: &Token) {}
}

pub struct Cursor<'h> {
    tokens: Vec<Token>,
    pos: usize,
    /// Rule labels with the position at which each rule started.
    labels: Vec<(String, usize)>,
    hook: &'h mut dyn AdvanceHook,
}

impl<'h> Cursor<'h> {
    pub fn new(tokens: Vec<Token>, hook: &'h mut dyn AdvanceHook) -> Self {
        let mut cursor = Self {
            tokens,
            pos: 0,
            labels: Vec::new(),
            hook,
        };
        cursor.skip_comments();
        cursor
    }

    fn skip_comments(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.is(Kind::Comment) {
                break;
            }
            self.hook.before_advance(token);
            self.pos += 1;
        }
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Semantic kind of the current token.
    pub fn kind(&self) -> Option<Kind> {
        self.current().and_then(|t| t.semantic)
    }

    pub fn at(&self, kind: Kind) -> bool {
        self.kind() == Some(kind)
    }

    /// Token after the current one.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .skip(self.pos + 1)
            .find(|t| !t.is(Kind::Comment))
    }

    /// Consume the current token.
    pub fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.clone();
        self.hook.before_advance(&token);
        self.pos += 1;
        self.skip_comments();
        Some(token)
    }

    /// Consume the current token if it has the given kind.
    pub fn eat(&mut self, kind: Kind) -> Option<Token> {
        if self.at(kind) { self.next() } else { None }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Line of the current token, or of the last token at the end of the stream.
    pub fn line(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    pub fn depth(&self) -> usize {
        self.labels.len()
    }

    /// Label for a rule started at the current token: the trigger kind, or
    /// a synthetic depth marker.
    pub fn label_for(&self, kind: Kind) -> String {
        if kind.is_trigger() {
            kind.label().to_string()
        } else {
            format!("depth.{}", self.depth())
        }
    }

    pub fn push_label(&mut self, label: String) {
        self.labels.push((label, self.pos));
    }

    /// Pop the innermost label. A rule that consumed nothing is fatal.
    pub fn pop_label(&mut self) -> Result<(), ExtractError> {
        let (label, start) = self.labels.pop().ok_or(ExtractError::LabelUnderflow)?;
        if start == self.pos {
            return Err(ExtractError::NoProgress {
                label,
                line: self.line(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl AdvanceHook for Recorder {
        fn before_advance(&mut self, token: &Token) {
            self.0.push(token.text.clone());
        }
    }

    fn tok(kind: Kind, text: &str, line: usize) -> Token {
        Token::new("test", text, line, 0).with_semantic(kind)
    }

    #[test]
    fn test_comments_are_skipped_and_reported() {
        let tokens = vec![
            tok(Kind::Comment, "// a", 1),
            tok(Kind::Identifier, "x", 2),
            tok(Kind::Comment, "// b", 2),
            tok(Kind::Identifier, "y", 3),
        ];
        let mut recorder = Recorder::default();
        {
            let mut cursor = Cursor::new(tokens, &mut recorder);
            assert_eq!(cursor.current().map(|t| t.text.as_str()), Some("x"));
            assert_eq!(cursor.peek().map(|t| t.text.as_str()), Some("y"));
            cursor.next();
            assert_eq!(cursor.current().map(|t| t.text.as_str()), Some("y"));
            cursor.next();
            assert!(cursor.is_done());
        }
        assert_eq!(recorder.0, vec!["// a", "x", "// b", "y"]);
    }

    #[test]
    fn test_label_without_progress_is_fatal() {
        let tokens = vec![tok(Kind::TriggerTFunction, "t", 4)];
        let mut hook = ();
        let mut cursor = Cursor::new(tokens, &mut hook);
        let label = cursor.label_for(Kind::TriggerTFunction);
        cursor.push_label(label);
        assert_eq!(
            cursor.pop_label(),
            Err(ExtractError::NoProgress {
                label: "trigger.t.function".to_string(),
                line: 4,
            })
        );
    }

    #[test]
    fn test_label_with_progress() {
        let tokens = vec![tok(Kind::BlockBegin, "{", 1), tok(Kind::BlockEnd, "}", 1)];
        let mut hook = ();
        let mut cursor = Cursor::new(tokens, &mut hook);
        assert_eq!(cursor.label_for(Kind::BlockBegin), "depth.0");
        cursor.push_label("depth.0".to_string());
        cursor.next();
        assert_eq!(cursor.pop_label(), Ok(()));
        assert_eq!(cursor.pop_label(), Err(ExtractError::LabelUnderflow));
    }
}
