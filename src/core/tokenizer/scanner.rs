//! Byte-level cursor shared by the script and markup scanners.

use crate::core::token::Token;

pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    scopes: Vec<&'static str>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str, root_scope: &'static str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            scopes: vec![root_scope],
        }
    }

    pub(crate) fn finish(self) -> Vec<Token> {
        self.tokens
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Case-insensitive check for a closing tag such as `</script`.
    pub(crate) fn at_close_tag(&self, name: &str) -> bool {
        let rest = self.rest().as_bytes();
        rest.len() >= name.len() + 2
            && rest[0] == b'<'
            && rest[1] == b'/'
            && rest[2..2 + name.len()].eq_ignore_ascii_case(name.as_bytes())
    }

    /// Byte length of the character at the current position.
    pub(crate) fn char_len(&self) -> usize {
        self.rest().chars().next().map(char::len_utf8).unwrap_or(0)
    }

    /// Length of the run of bytes (from the current position) matching `pred`.
    ///
    /// Non-ASCII bytes are only ever consumed as a whole run, so the returned
    /// length always ends on a char boundary as long as `pred` accepts every
    /// byte >= 0x80 or none of them.
    pub(crate) fn run_len(&self, pred: impl Fn(u8) -> bool) -> usize {
        self.rest().bytes().take_while(|b| pred(*b)).count()
    }

    /// Emit the next `len` bytes as a token of the given raw kind.
    pub(crate) fn emit(&mut self, kind: &str, len: usize) {
        if len == 0 {
            return;
        }
        let end = (self.pos + len).min(self.src.len());
        let text = &self.src[self.pos..end];
        let mut token = Token::new(kind, text, self.line, self.pos);
        token.scopes = self.scopes.iter().map(|s| s.to_string()).collect();
        self.line += text.matches('\n').count();
        self.pos = end;
        self.tokens.push(token);
    }

    /// Emit everything up to (not including) `end` as one token.
    pub(crate) fn emit_to(&mut self, kind: &str, end: usize) {
        let len = end.saturating_sub(self.pos);
        self.emit(kind, len);
    }

    /// Emit a whitespace run if one starts here. Returns true if anything was emitted.
    pub(crate) fn whitespace(&mut self) -> bool {
        let len = self.run_len(|b| b.is_ascii_whitespace());
        self.emit("whitespace", len);
        len > 0
    }

    pub(crate) fn push_scope(&mut self, scope: &'static str) {
        self.scopes.push(scope);
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Last token that is neither whitespace nor a comment.
    pub(crate) fn last_significant(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.kind != "whitespace" && !t.kind.starts_with("comment"))
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Find `needle` at or after the current position, returning its absolute offset.
    pub(crate) fn find(&self, needle: &str) -> Option<usize> {
        self.rest().find(needle).map(|i| self.pos + i)
    }

    pub(crate) fn len(&self) -> usize {
        self.src.len()
    }
}

pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

pub(crate) fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_tracks_lines_and_offsets() {
        let mut sc = Scanner::new("ab\ncd", "source.js");
        sc.emit("a", 3);
        sc.emit("b", 2);
        let tokens = sc.finish();
        assert_eq!(tokens[0].text, "ab\n");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].start, 3);
        assert_eq!(tokens[1].end, 5);
    }

    #[test]
    fn test_at_close_tag_is_case_insensitive() {
        let sc = Scanner::new("</SCRIPT>", "text.html");
        assert!(sc.at_close_tag("script"));
        assert!(!sc.at_close_tag("style"));
    }
}
