//! String scopes: basic (`"`), multi-line basic (`"""`), literal (`'`),
//! multi-line literal (`'''`), and the unicode escape scopes they push.
//!
//! String content is re-emitted as JSON string content on the fly. In key
//! mode the same fragments land in the key buffer instead of the output,
//! already escaped, so the emitter can write key segments verbatim.

use crate::rune::Rune;
use crate::scope::{Flow, Phase, ScopeKind, State, Token};
use crate::error::Result;

/// JSON escape for characters that cannot appear raw in a JSON string.
fn json_escape(c: char) -> Option<&'static str> {
    match c {
        '"' => Some("\\\""),
        '\\' => Some("\\\\"),
        '/' => Some("\\/"),
        '\u{8}' => Some("\\b"),
        '\u{c}' => Some("\\f"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\t' => Some("\\t"),
        _ => None,
    }
}

/// Write `s` to the output, or to the key buffer in key mode.
fn emit_raw(st: &mut State, kind: ScopeKind, s: &str) {
    if kind == ScopeKind::Key {
        st.key_data.push_str(s);
    } else {
        st.out.push_str(s);
    }
}

/// Write one content character, JSON-escaped as needed.
fn emit_content(st: &mut State, kind: ScopeKind, c: char) {
    match json_escape(c) {
        Some(escaped) => emit_raw(st, kind, escaped),
        None => {
            if kind == ScopeKind::Key {
                st.key_data.push(c);
            } else {
                st.out.push_char(c);
            }
        }
    }
}

/// The escapes TOML allows after a backslash in basic strings.
fn is_escape_char(r: Rune) -> bool {
    matches!(
        r,
        Rune::Scalar('\\' | 'b' | 't' | 'n' | 'f' | 'r' | '"')
    )
}

/// Body of a single-line basic string (after the opening `"`).
pub(crate) fn quoted_string(r: Rune, st: &mut State) -> Result<Flow> {
    if matches!(r, Rune::Scalar('\u{8}' | '\n' | '\u{c}')) {
        return Err(st.error("character not allowed in quoted string"));
    }
    if r.is_space() && r != '\t' && r != ' ' {
        return Err(st.error("character not allowed in quoted string"));
    }

    let kind = st.top().kind;

    if st.top().last != Token::Escape && r == '\\' {
        st.top().last = Token::Escape;
        return Ok(Flow::Advance);
    }

    if r == '"' && st.top().last != Token::Escape {
        st.pop();
        if kind != ScopeKind::Key {
            st.out.push_char('"');
        }
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Escape && r == 'U' {
        emit_raw(st, kind, "\\\\U");
        st.top().last = Token::None;
        st.push(unicode6, kind);
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Escape && r == 'u' {
        emit_raw(st, kind, "\\u");
        st.top().last = Token::None;
        st.push(unicode4, kind);
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Escape && !is_escape_char(r) {
        return Err(st.error("invalid escape in quoted string"));
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("unterminated string"));
    };

    if st.top().last == Token::Escape {
        st.top().last = Token::None;
        if kind == ScopeKind::Key {
            st.key_data.push('\\');
            st.key_data.push(c);
        } else {
            st.out.push_char('\\');
            st.out.push_char(c);
        }
        return Ok(Flow::Advance);
    }

    st.top().last = Token::None;
    emit_content(st, kind, c);
    Ok(Flow::Advance)
}

/// Body of a `"""` string (after the opening quotes).
///
/// The closing run of quotes is recognized by counting: up to two quotes
/// beyond the terminator belong to the string content and are re-emitted
/// escaped. A backslash at end of line swallows whitespace through the
/// newline and into the next line.
pub(crate) fn multiline_basic_string(r: Rune, st: &mut State) -> Result<Flow> {
    if r.is_space() && !matches!(r, Rune::Scalar('\t' | '\n' | '\u{c}' | ' ')) {
        return Err(st.error("character not allowed in multi-line string"));
    }

    if st.top().phase == Phase::Done {
        if r != '"' {
            if st.top().last == Token::Quote4 {
                st.out.push_str("\\\"");
            }
            st.out.push_char('"');
            st.pop();
            return Ok(Flow::Redo);
        }
        if st.top().last == Token::Quote3 {
            st.top().last = Token::Quote4;
            return Ok(Flow::Advance);
        }
        st.out.push_str("\\\"\\\"\"");
        st.pop();
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::EscapeEolSkip {
        if !r.is_space() {
            st.top().phase = Phase::Init;
            return Ok(Flow::Redo);
        }
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::EscapeEol {
        if r == '\n' {
            st.top().phase = Phase::EscapeEolSkip;
            return Ok(Flow::Advance);
        }
        if !r.is_space() {
            return Err(st.error("invalid character in line escape"));
        }
        return Ok(Flow::Advance);
    }

    let entry = st.top().phase;
    if entry == Phase::None {
        st.top().phase = Phase::Init;
        // a newline immediately after the opening quotes is dropped
        if r == '\n' {
            return Ok(Flow::Advance);
        }
    }

    if st.top().last != Token::Escape && r == '\\' {
        if st.top().last == Token::Quote2 {
            st.out.push_str("\\\"\\\"");
        }
        if st.top().last == Token::Quote {
            st.out.push_str("\\\"");
        }
        st.top().last = Token::Escape;
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Escape && r == 'U' {
        st.top().last = Token::None;
        st.out.push_str("\\\\U");
        st.push(unicode6, ScopeKind::Quoted);
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Escape && r == 'u' {
        st.top().last = Token::None;
        st.out.push_str("\\u");
        st.push(unicode4, ScopeKind::Quoted);
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Escape && r.is_space() {
        st.top().last = Token::None;
        st.top().phase = Phase::EscapeEol;
        return Ok(Flow::Redo);
    }

    if st.top().last == Token::Escape && r == '"' {
        st.top().last = Token::None;
        st.out.push_str("\\\"");
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Quote2 && r == '"' {
        st.top().last = Token::Quote3;
        st.top().phase = Phase::Done;
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Quote && r == '"' {
        st.top().last = Token::Quote2;
        return Ok(Flow::Advance);
    }

    if st.top().last != Token::Escape && r == '"' {
        st.top().last = Token::Quote;
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Escape && !is_escape_char(r) {
        return Err(st.error("invalid escape in multi-line string"));
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("unterminated string"));
    };

    if st.top().last == Token::Escape {
        st.out.push_char('\\');
        if c == '\\' {
            st.top().last = Token::None;
            st.out.push_char('\\');
            return Ok(Flow::Advance);
        }
    }

    if st.top().last == Token::Quote {
        st.out.push_str("\\\"");
    }
    if st.top().last == Token::Quote2 {
        st.out.push_str("\\\"\\\"");
    }

    st.top().last = Token::None;
    emit_content(st, ScopeKind::Quoted, c);
    Ok(Flow::Advance)
}

/// Body of a `'...'` literal string. No escapes; a backslash is content.
pub(crate) fn literal_string(r: Rune, st: &mut State) -> Result<Flow> {
    if r == '\n' {
        return Err(st.error("newline in literal string"));
    }

    let kind = st.top().kind;
    if r == '\'' {
        st.pop();
        if kind != ScopeKind::Key {
            st.out.push_char('"');
        }
        return Ok(Flow::Advance);
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("unterminated string"));
    };
    emit_content(st, kind, c);
    Ok(Flow::Advance)
}

/// Body of a `'''` string. Raw newlines allowed, still no escapes.
pub(crate) fn multiline_literal_string(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().phase == Phase::Done {
        if r != '\'' {
            if st.top().last == Token::SingleQuote4 {
                st.out.push_char('\'');
            }
            st.out.push_char('"');
            st.pop();
            return Ok(Flow::Redo);
        }
        if st.top().last == Token::SingleQuote3 {
            st.top().last = Token::SingleQuote4;
            return Ok(Flow::Advance);
        }
        st.out.push_str("''\"");
        st.pop();
        return Ok(Flow::Advance);
    }

    let entry = st.top().phase;
    if entry == Phase::None {
        st.top().phase = Phase::Init;
        if r == '\n' {
            return Ok(Flow::Advance);
        }
    }

    if st.top().last == Token::SingleQuote2 && r == '\'' {
        st.top().last = Token::SingleQuote3;
        st.top().phase = Phase::Done;
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::SingleQuote && r == '\'' {
        st.top().last = Token::SingleQuote2;
        return Ok(Flow::Advance);
    }

    if r == '\'' {
        st.top().last = Token::SingleQuote;
        return Ok(Flow::Advance);
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("unterminated string"));
    };

    if st.top().last == Token::SingleQuote {
        st.out.push_char('\'');
    }
    if st.top().last == Token::SingleQuote2 {
        st.out.push_str("''");
    }

    st.top().last = Token::None;
    emit_content(st, ScopeKind::Quoted, c);
    Ok(Flow::Advance)
}

/// Valid targets for a 4-digit `\u` escape: Unicode scalars only.
fn valid_short_escape(code: i64) -> bool {
    (0..=0xD7FF).contains(&code) || (0xE000..=0x10FFFF).contains(&code)
}

/// Accepted range for a 6-digit `\U` escape. JSON has no 6-digit escape,
/// so the digits are copied through opaquely rather than decoded; the
/// bound on the value is correspondingly loose.
fn valid_wide_escape(code: i64) -> bool {
    (0..=0xD7FF16).contains(&code)
}

/// `\uXXXX` — exactly four hex digits, uppercased on the way through.
pub(crate) fn unicode4(r: Rune, st: &mut State) -> Result<Flow> {
    let Rune::Scalar(c) = r else {
        return Err(st.error("invalid digit"));
    };
    if !c.is_ascii_hexdigit() {
        return Err(st.error("invalid digit"));
    }

    st.top().counter += 1;
    st.data.push(c);
    let kind = st.top().kind;
    let upper = c.to_ascii_uppercase();
    if kind == ScopeKind::Key {
        st.key_data.push(upper);
    } else {
        st.out.push_char(upper);
    }

    if st.top().counter == 4 {
        let code = i64::from_str_radix(&st.data, 16).map_err(|_| st.error("invalid number"))?;
        if !valid_short_escape(code) {
            return Err(st.error("invalid code"));
        }
        st.pop();
    }
    Ok(Flow::Advance)
}

/// `\UXXXXXX` — exactly six hex digits, kept as literal text.
pub(crate) fn unicode6(r: Rune, st: &mut State) -> Result<Flow> {
    let Rune::Scalar(c) = r else {
        return Err(st.error("invalid digit"));
    };
    if !c.is_ascii_hexdigit() {
        return Err(st.error("invalid digit"));
    }

    st.top().counter += 1;
    st.data.push(c);
    let kind = st.top().kind;
    let upper = c.to_ascii_uppercase();
    if kind == ScopeKind::Key {
        st.key_data.push(upper);
    } else {
        st.out.push_char(upper);
    }

    if st.top().counter == 6 {
        let code = i64::from_str_radix(&st.data, 16).map_err(|_| st.error("invalid number"))?;
        if !valid_wide_escape(code) {
            return Err(st.error("invalid code"));
        }
        st.pop();
    }
    Ok(Flow::Advance)
}
