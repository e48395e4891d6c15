//! The parser's scope stack: one frame per active grammatical context.
//!
//! Every context (top level, header, key, value, string body, number, …)
//! is the same fixed record shape with a different parse function plugged
//! in. The dispatcher always feeds the current rune to the top frame;
//! frames push children for nested constructs and pop themselves when
//! their construct ends. A frame that pops on a terminator it does not own
//! (a `]`, a comma, a newline) answers [`Flow::Redo`] so the dispatcher
//! re-delivers the same rune to the frame underneath.

use crate::buffer::OutBuf;
use crate::error::{ParseError, Result};
use crate::namespace::{Defs, Var};
use crate::rune::Rune;

/// What a parse function did with the rune it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Rune consumed; fetch the next one.
    Advance,
    /// Rune not consumed; dispatch it again to the (possibly changed) top
    /// frame.
    Redo,
}

/// Tag remembering the most recent significant token inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Token {
    #[default]
    None,
    Quote,
    Quote2,
    Quote3,
    Quote4,
    SingleQuote,
    SingleQuote2,
    SingleQuote3,
    SingleQuote4,
    Escape,
    Bracket,
    Bracket2,
    BracketSpace,
    Digit,
    Sign,
    Dot,
    Comma,
    Underscore,
    Exp,
    Space,
}

/// Minor state within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    #[default]
    None,
    Init,
    Done,
    AfterZero,
    AfterDot,
    AfterExp,
    EscapeEol,
    EscapeEolSkip,
    AfterHeader,
    AfterKey,
    AfterValue,
    AfterFirstValue,
    AfterQuote,
    AfterTime,
}

/// Which comment/escaping regime a frame runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ScopeKind {
    /// Ordinary syntax; `#` starts a comment here.
    #[default]
    Generic,
    /// Inside a string body.
    Quoted,
    /// Collecting a key; string fragments land in the key buffer instead
    /// of the output.
    Key,
}

pub(crate) type ParseFn = fn(Rune, &mut State) -> Result<Flow>;

/// One frame on the parse stack.
///
/// The parameter fields after `counter` configure the generic parse
/// functions at push time: the radix for prefixed integers, the expected
/// text for fixed literals, the hour-minute-only flag for timezone
/// offsets, and the base key under an active header.
#[derive(Debug)]
pub(crate) struct Scope {
    pub parse: ParseFn,
    pub kind: ScopeKind,
    pub phase: Phase,
    pub last: Token,
    pub counter: i64,
    pub key: Vec<String>,
    pub insert_table: bool,
    pub radix: u32,
    pub expect: &'static str,
    pub minutes_only: bool,
}

impl Scope {
    pub(crate) fn new(parse: ParseFn, kind: ScopeKind) -> Self {
        Scope {
            parse,
            kind,
            phase: Phase::default(),
            last: Token::default(),
            counter: 0,
            key: Vec::new(),
            insert_table: false,
            radix: 0,
            expect: "",
            minutes_only: false,
        }
    }
}

/// Mutable parser state shared by every parse function.
pub(crate) struct State {
    /// JSON output. Opened with `{`; everything else appends.
    pub out: OutBuf,
    pub scopes: Vec<Scope>,
    /// Namespace + emitter contexts. The document's sits at the bottom;
    /// each open inline table pushes its own private one.
    pub defs: Vec<Defs>,
    pub line: usize,
    pub column: usize,
    pub in_comment: bool,
    /// Key segments collected so far, separated by `\n` (a byte that can
    /// never occur inside a segment).
    pub key_data: String,
    /// Scratch runes for the current leaf frame (number lookahead, hex
    /// escape digits, date/time components). Cleared on every pop.
    pub data: String,
}

impl State {
    pub(crate) fn new() -> Self {
        let mut out = OutBuf::new();
        out.push_char('{');
        State {
            out,
            scopes: Vec::new(),
            defs: vec![Defs::new()],
            line: 1,
            column: 0,
            in_comment: false,
            key_data: String::new(),
            data: String::new(),
        }
    }

    /// The active frame. Dispatch never runs on an empty stack.
    pub(crate) fn top(&mut self) -> &mut Scope {
        let idx = self.scopes.len() - 1;
        &mut self.scopes[idx]
    }

    /// Push a child frame and hand it back for parameter initialization.
    pub(crate) fn push(&mut self, parse: ParseFn, kind: ScopeKind) -> &mut Scope {
        self.scopes.push(Scope::new(parse, kind));
        self.top()
    }

    /// Discard the top frame. The shared scratch buffer is cleared so the
    /// next leaf at this level starts clean.
    pub(crate) fn pop(&mut self) {
        self.data.clear();
        self.scopes.pop();
    }

    /// Split the collected key buffer into its segments and reset it.
    pub(crate) fn take_keys(&mut self) -> Vec<String> {
        let segments = self.key_data.split('\n').map(String::from).collect();
        self.key_data.clear();
        segments
    }

    /// Declare `key` in the innermost namespace and stream the resulting
    /// opens/closes to the output. `insert_table_len` is the length of the
    /// enclosing explicit table header, or 0 when there is none.
    pub(crate) fn define_and_push(
        &mut self,
        key: &[String],
        insert_table_len: usize,
        var: Var,
    ) -> bool {
        let State { defs, out, .. } = self;
        match defs.last_mut() {
            Some(d) => {
                if !d.define(key, insert_table_len, var) {
                    return false;
                }
                d.filter.push(key, var, out);
                true
            }
            None => false,
        }
    }

    /// A parse error at the current position.
    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }
}
