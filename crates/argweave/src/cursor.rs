use std::borrow::Cow;

/// Cursor over the caller's token slice.
///
/// Fragments produced by splitting a glued delimiter off a token are pushed
/// back onto a small stack and are always read before the next input token.
#[derive(Debug)]
pub(crate) struct TokenCursor<'t> {
    tokens: &'t [&'t str],
    pos: usize,
    pushed: Vec<String>,
}

impl<'t> TokenCursor<'t> {
    pub(crate) fn new(tokens: &'t [&'t str]) -> Self {
        Self {
            tokens,
            pos: 0,
            pushed: Vec::new(),
        }
    }

    pub(crate) fn peek(&self) -> Option<&str> {
        match self.pushed.last() {
            Some(t) => Some(t.as_str()),
            None => self.tokens.get(self.pos).copied(),
        }
    }

    pub(crate) fn next(&mut self) -> Option<Cow<'t, str>> {
        if let Some(t) = self.pushed.pop() {
            return Some(Cow::Owned(t));
        }
        let t = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(Cow::Borrowed(t))
    }

    /// Make `token` the next token read.
    pub(crate) fn push_front(&mut self, token: impl Into<String>) {
        self.pushed.push(token.into());
    }

    /// Every token not yet read, in stream order.
    pub(crate) fn drain_rest(&mut self) -> Vec<String> {
        let mut rest: Vec<String> = self.pushed.drain(..).rev().collect();
        rest.extend(self.tokens[self.pos..].iter().map(|t| t.to_string()));
        self.pos = self.tokens.len();
        rest
    }
}
