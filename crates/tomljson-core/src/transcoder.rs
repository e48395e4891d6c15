//! The streaming transcoder: bytes of TOML in, bytes of JSON out.
//!
//! A [`Transcoder`] is fed arbitrary byte chunks and drained concurrently.
//! Internally it decodes UTF-8 incrementally (a partial trailing sequence
//! waits for the next feed), folds `\r\n` to `\n`, tracks the position for
//! error reporting, strips comments, and pumps one rune at a time through
//! the scope stack. Output becomes available as soon as it is decided;
//! every drained prefix is a valid prefix of the final JSON document.

use crate::error::{ParseError, Result};
use crate::parser::top;
use crate::rune::Rune;
use crate::scope::{Flow, Scope, ScopeKind, State};

/// Characters the transcoder accepts outside of any specific rule:
/// whitespace is always fine, control characters never are, and the two
/// trailing noncharacters are reserved.
fn acceptable(c: char) -> bool {
    if c.is_whitespace() {
        return true;
    }
    if c.is_control() {
        return false;
    }
    !matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

/// Streaming TOML-to-JSON transcoder.
///
/// Lifecycle: construct, then any interleaving of [`feed`](Self::feed)
/// and [`drain`](Self::drain), then [`end_input`](Self::end_input), then
/// drain the rest. [`finish`](Self::finish) bundles the tail end for
/// callers that hold the whole document. The first parse error is sticky:
/// the transcoder is dead afterwards and keeps returning it.
pub struct Transcoder {
    state: State,
    /// Undecoded tail of the last fed chunk (a UTF-8 sequence split
    /// across feeds).
    pending: Vec<u8>,
    input_done: bool,
    closed: bool,
    err: Option<ParseError>,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder {
    pub fn new() -> Self {
        let mut state = State::new();
        state.scopes.push(Scope::new(top, ScopeKind::Generic));
        Transcoder {
            state,
            pending: Vec::new(),
            input_done: false,
            closed: false,
            err: None,
        }
    }

    /// Feed a chunk of TOML bytes. Chunks may split anywhere, including
    /// mid-character. Returns the first parse error; the same error is
    /// returned for every later call.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.input_done {
            return Ok(());
        }

        self.pending.extend_from_slice(bytes);
        let text = match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                let text = s.to_owned();
                self.pending.clear();
                text
            }
            Err(e) if e.error_len().is_none() => {
                // incomplete trailing sequence: run the decoded prefix,
                // keep the tail for the next feed
                let tail = self.pending.split_off(e.valid_up_to());
                let prefix = std::mem::replace(&mut self.pending, tail);
                match String::from_utf8(prefix) {
                    Ok(text) => text,
                    Err(_) => return Err(self.fail("invalid UTF-8")),
                }
            }
            Err(_) => return Err(self.fail("invalid UTF-8")),
        };
        self.run_text(&text)
    }

    /// Signal that no more input is coming. A final newline and the
    /// end-of-input sentinel run through the machine; if the document is
    /// complete, the output is closed. Errors raised here surface through
    /// [`drain`](Self::drain) / [`finish`](Self::finish).
    pub fn end_input(&mut self) {
        if self.input_done {
            return;
        }
        self.input_done = true;
        if self.err.is_some() {
            return;
        }
        if !self.pending.is_empty() {
            self.err = Some(self.state.error("invalid UTF-8"));
            return;
        }
        if self.run_text("\n").is_err() {
            return;
        }
        if !self.state.scopes.is_empty() {
            if let Err(err) = self.dispatch(Rune::Eof) {
                self.err = Some(err);
                return;
            }
        }
        if self.state.scopes.is_empty() {
            self.close();
        }
    }

    /// Move a prefix of the buffered output into `buf`. Returns `Ok(0)`
    /// when nothing is buffered; once input has ended, `Ok(0)` means the
    /// stream is complete. An input that ended mid-construct surfaces
    /// here as an error.
    pub fn drain(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.state.out.is_empty() {
            return Ok(self.state.out.drain_into(buf));
        }
        if !self.input_done {
            return Ok(0);
        }
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if !self.state.scopes.is_empty() {
            return Err(self.state.error("invalid EOF"));
        }
        Ok(0)
    }

    /// Bytes of output currently buffered.
    pub fn buffered(&self) -> usize {
        self.state.out.len()
    }

    /// Close the JSON document: emit the closing braces for everything
    /// the emitter still has open, then the final `}`. Idempotent.
    /// Called automatically when `end_input` finds a complete document.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let State { defs, out, .. } = &mut self.state;
        if let Some(document) = defs.first_mut() {
            document.filter.close(out);
        }
        out.push_char('}');
    }

    /// End the input and return the complete JSON document.
    pub fn finish(mut self) -> Result<String> {
        self.end_input();
        if let Some(err) = self.err {
            return Err(err);
        }
        if !self.state.scopes.is_empty() {
            return Err(self.state.error("invalid EOF"));
        }
        String::from_utf8(self.state.out.take_bytes())
            .map_err(|_| self.state.error("output is not UTF-8"))
    }

    fn fail(&mut self, message: &str) -> ParseError {
        let err = self.state.error(message);
        self.err = Some(err.clone());
        err
    }

    fn run_text(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            // \r\n folds to \n; a stray \r is dropped the same way
            if c == '\r' {
                continue;
            }
            if c == '\n' {
                self.state.line += 1;
                self.state.column = 0;
            } else {
                self.state.column += 1;
            }
            if !acceptable(c) {
                return Err(self.fail("invalid character"));
            }
            if self.state.scopes.is_empty() {
                // the document ended; remaining input is not ours to judge
                break;
            }
            if let Err(err) = self.dispatch(Rune::Scalar(c)) {
                self.err = Some(err.clone());
                return Err(err);
            }
        }
        Ok(())
    }

    /// Hand one rune to the top scope, re-dispatching for as long as
    /// parse functions answer "not mine".
    fn dispatch(&mut self, r: Rune) -> Result<()> {
        loop {
            if self.state.in_comment {
                if r == '\n' {
                    self.state.in_comment = false;
                } else {
                    return Ok(());
                }
            }

            let (kind, parse) = match self.state.scopes.last() {
                Some(scope) => (scope.kind, scope.parse),
                None => return Ok(()),
            };
            if kind == ScopeKind::Generic && r == '#' {
                self.state.in_comment = true;
                return Ok(());
            }

            match parse(r, &mut self.state)? {
                Flow::Advance => return Ok(()),
                Flow::Redo => continue,
            }
        }
    }
}

/// Transcode a complete TOML document into a JSON string.
///
/// ```
/// let json = tomljson_core::transcode("a.\"b\".d = 2").unwrap();
/// assert_eq!(json, r#"{"a":{"b":{"d":2}}}"#);
/// ```
pub fn transcode(toml: &str) -> Result<String> {
    let mut transcoder = Transcoder::new();
    transcoder.feed(toml.as_bytes())?;
    transcoder.finish()
}
