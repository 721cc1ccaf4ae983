//! Merge machine engine.
//!
//! A [`Machine`] is a finite-state transducer declared as data: an initial
//! state, a step function `state × token → Step`, the semantic kind of the
//! composite token it produces, and a reducer computing the composite text.
//! One generic interpreter ([`Merger::run`]) drives every machine; a family's
//! merge pipeline is an ordered list of machines, each consuming the output
//! stream of the previous one.

pub mod machines;

use std::collections::VecDeque;

use tracing::trace;

use crate::core::ExtractError;
use crate::core::token::{Kind, Token};

/// How a finished match is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Collapse the whole buffer.
    MergeAll,
    /// Collapse all but the last buffered token, which is processed again.
    MergeWithoutLast,
    /// Collapse only the first buffered token; the rest is processed again.
    ReplaceFirst,
    /// The machine's partition function picks the range to collapse. Tokens
    /// before it are emitted as-is, tokens after it are processed again.
    MergeCustom,
}

/// Outcome of feeding one token to a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<S> {
    Continue(S),
    Abort,
    End(EndAction),
}

pub type StepFn<S> = fn(S, &Token) -> Step<S>;
pub type ReduceFn = fn(&[Token]) -> String;
/// Returns the `start..end` range of the buffer to collapse.
pub type PartitionFn = fn(&[Token]) -> (usize, usize);

pub struct Machine<S: 'static> {
    pub name: &'static str,
    pub initial: S,
    pub step: StepFn<S>,
    pub result: Kind,
    pub reduce: ReduceFn,
    pub partition: Option<PartitionFn>,
}

/// Type-erased machine, so pipelines can mix machines with different state types.
pub trait Merger {
    fn name(&self) -> &'static str;
    fn run(&self, tokens: Vec<Token>) -> Result<Vec<Token>, ExtractError>;
}

pub type Pipeline = &'static [&'static (dyn Merger + Sync)];

/// Default reducer: concatenated text of the absorbed tokens.
pub fn concat(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

impl<S: Copy> Machine<S> {
    fn composite(&self, tokens: &[Token]) -> Option<Token> {
        let first = tokens.first()?;
        let last = tokens.last()?;
        Some(Token {
            kind: self.name.to_string(),
            semantic: Some(self.result),
            text: (self.reduce)(tokens),
            line: first.line,
            start: first.start,
            end: last.end,
            scopes: first.scopes.clone(),
        })
    }

    /// Collapse a finished buffer. Returns the tokens to emit now and the
    /// tokens to feed back into the machine.
    fn finish(
        &self,
        action: EndAction,
        mut buffer: Vec<Token>,
    ) -> Result<(Vec<Token>, Vec<Token>), ExtractError> {
        let (before, merged, after) = match action {
            EndAction::MergeAll => (Vec::new(), buffer, Vec::new()),
            EndAction::MergeWithoutLast => {
                let last = buffer.pop().into_iter().collect();
                (Vec::new(), buffer, last)
            }
            EndAction::ReplaceFirst => {
                let rest = if buffer.is_empty() {
                    Vec::new()
                } else {
                    buffer.split_off(1)
                };
                (Vec::new(), buffer, rest)
            }
            EndAction::MergeCustom => {
                let partition = self
                    .partition
                    .ok_or(ExtractError::MissingPartition { machine: self.name })?;
                let (start, end) = partition(&buffer);
                let end = end.min(buffer.len());
                let start = start.min(end);
                let after = buffer.split_off(end);
                let merged = buffer.split_off(start);
                (buffer, merged, after)
            }
        };

        let mut emit = before;
        let mut after = after;
        match self.composite(&merged) {
            Some(token) => emit.push(token),
            // Nothing collapsed: pass one token through so the machine advances.
            None if !after.is_empty() => emit.push(after.remove(0)),
            None => {}
        }
        Ok((emit, after))
    }
}

impl<S: Copy> Merger for Machine<S> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, tokens: Vec<Token>) -> Result<Vec<Token>, ExtractError> {
        let mut queue: VecDeque<Token> = tokens.into();
        let mut out = Vec::with_capacity(queue.len());
        let mut buffer: Vec<Token> = Vec::new();
        let mut state = self.initial;
        let mut merges = 0usize;

        while let Some(token) = queue.pop_front() {
            match (self.step)(state, &token) {
                Step::Continue(next) => {
                    state = next;
                    buffer.push(token);
                }
                Step::Abort => {
                    state = self.initial;
                    if buffer.is_empty() {
                        out.push(token);
                    } else {
                        out.append(&mut buffer);
                        queue.push_front(token);
                    }
                }
                Step::End(action) => {
                    state = self.initial;
                    buffer.push(token);
                    let (emit, retry) = self.finish(action, std::mem::take(&mut buffer))?;
                    out.extend(emit);
                    for token in retry.into_iter().rev() {
                        queue.push_front(token);
                    }
                    merges += 1;
                }
            }
        }
        out.append(&mut buffer);

        trace!(machine = self.name, merges, tokens = out.len(), "merge machine done");
        Ok(out)
    }
}

/// Run every machine of a pipeline in order.
pub fn run_pipeline(
    tokens: Vec<Token>,
    pipeline: &[&(dyn Merger + Sync)],
) -> Result<Vec<Token>, ExtractError> {
    pipeline
        .iter()
        .try_fold(tokens, |tokens, machine| machine.run(tokens))
}

/// Drop tokens the pipeline marked as meaningless.
pub fn drop_ignored(tokens: Vec<Token>) -> Vec<Token> {
    tokens.into_iter().filter(|t| !t.is(Kind::Ignore)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tok(kind: Kind, text: &str, start: usize) -> Token {
        Token::new("test", text, 1, start).with_semantic(kind)
    }

    fn texts(tokens: &[Token]) -> Vec<(&str, Option<Kind>)> {
        tokens.iter().map(|t| (t.text.as_str(), t.semantic)).collect()
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ab {
        Start,
        SawA,
    }

    fn ab_step(state: Ab, token: &Token, action: EndAction) -> Step<Ab> {
        match (state, token.text.as_str()) {
            (Ab::Start, "a") => Step::Continue(Ab::SawA),
            (Ab::SawA, "b") => Step::End(action),
            _ => Step::Abort,
        }
    }

    fn merge_all(s: Ab, t: &Token) -> Step<Ab> {
        ab_step(s, t, EndAction::MergeAll)
    }

    fn merge_without_last(s: Ab, t: &Token) -> Step<Ab> {
        ab_step(s, t, EndAction::MergeWithoutLast)
    }

    fn replace_first(s: Ab, t: &Token) -> Step<Ab> {
        ab_step(s, t, EndAction::ReplaceFirst)
    }

    fn merge_custom(s: Ab, t: &Token) -> Step<Ab> {
        ab_step(s, t, EndAction::MergeCustom)
    }

    fn middle(_: &[Token]) -> (usize, usize) {
        (1, 2)
    }

    /// `a b` → one Identifier token.
    fn machine(step: StepFn<Ab>) -> Machine<Ab> {
        Machine {
            name: "test.ab",
            initial: Ab::Start,
            step,
            result: Kind::Identifier,
            reduce: concat,
            partition: None,
        }
    }

    fn input() -> Vec<Token> {
        vec![
            tok(Kind::Operator, "x", 0),
            tok(Kind::Operator, "a", 1),
            tok(Kind::Operator, "b", 2),
            tok(Kind::Operator, "y", 3),
        ]
    }

    // ============================================================
    // End actions
    // ============================================================

    #[test]
    fn test_merge_all() {
        let out = machine(merge_all).run(input()).unwrap();
        assert_eq!(
            texts(&out),
            vec![
                ("x", Some(Kind::Operator)),
                ("ab", Some(Kind::Identifier)),
                ("y", Some(Kind::Operator)),
            ]
        );
        assert_eq!(out[1].start, 1);
        assert_eq!(out[1].end, 3);
        assert_eq!(out[1].kind, "test.ab");
    }

    #[test]
    fn test_merge_without_last() {
        let out = machine(merge_without_last).run(input()).unwrap();
        assert_eq!(
            texts(&out),
            vec![
                ("x", Some(Kind::Operator)),
                ("a", Some(Kind::Identifier)),
                ("b", Some(Kind::Operator)),
                ("y", Some(Kind::Operator)),
            ]
        );
    }

    #[test]
    fn test_replace_first() {
        let out = machine(replace_first).run(input()).unwrap();
        assert_eq!(out[1].semantic, Some(Kind::Identifier));
        assert_eq!(out[1].text, "a");
        assert_eq!(out[2].semantic, Some(Kind::Operator));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_merge_custom_without_partition_is_fatal() {
        let err = machine(merge_custom).run(input()).unwrap_err();
        assert_eq!(err, ExtractError::MissingPartition { machine: "test.ab" });
    }

    #[test]
    fn test_merge_custom_partition() {
        let mut m = machine(merge_custom);
        m.partition = Some(middle as PartitionFn);
        let out = m.run(input()).unwrap();
        assert_eq!(
            texts(&out),
            vec![
                ("x", Some(Kind::Operator)),
                ("a", Some(Kind::Operator)),
                ("b", Some(Kind::Identifier)),
                ("y", Some(Kind::Operator)),
            ]
        );
    }

    // ============================================================
    // Abort and retry
    // ============================================================

    #[test]
    fn test_abort_retries_current_token() {
        // `a a b`: the second `a` aborts the first match and starts a new one.
        let tokens = vec![
            tok(Kind::Operator, "a", 0),
            tok(Kind::Operator, "a", 1),
            tok(Kind::Operator, "b", 2),
        ];
        let out = machine(merge_all).run(tokens).unwrap();
        assert_eq!(
            texts(&out),
            vec![("a", Some(Kind::Operator)), ("ab", Some(Kind::Identifier))]
        );
    }

    #[test]
    fn test_unfinished_buffer_is_flushed_at_end() {
        let tokens = vec![tok(Kind::Operator, "x", 0), tok(Kind::Operator, "a", 1)];
        let out = machine(merge_all).run(tokens.clone()).unwrap();
        assert_eq!(out, tokens);
    }

    #[test]
    fn test_drop_ignored() {
        let tokens = vec![tok(Kind::Ignore, ":", 0), tok(Kind::Identifier, "a", 1)];
        let out = drop_ignored(tokens);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "a");
    }
}
