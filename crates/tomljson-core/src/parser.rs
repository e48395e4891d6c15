//! Structural parse functions: the top level, table and array-of-tables
//! headers, keys, key-value pairs, value dispatch, and inline containers.
//!
//! Each function is one grammatical context. Dispatchers (value, zero,
//! number-date-or-time) consume just enough to classify what follows,
//! then replace themselves with the right leaf scope and re-deliver the
//! current rune to it.

use crate::datetime::{date, time};
use crate::error::Result;
use crate::namespace::{Defs, Var};
use crate::numbers::{float, prefix_number};
use crate::rune::Rune;
use crate::scope::{Flow, Phase, ScopeKind, State, Token};
use crate::strings::{literal_string, multiline_basic_string, multiline_literal_string, quoted_string};

/// Matcher for a fixed literal (`true`, `false`, `inf`, `nan`). The JSON
/// form has already been written by whoever pushed this scope; the
/// matcher only verifies the source spells the literal out.
pub(crate) fn literal_value(r: Rune, st: &mut State) -> Result<Flow> {
    let expect = st.top().expect.as_bytes();
    let idx = st.top().counter as usize;
    if idx < expect.len() && !matches!(r, Rune::Scalar(c) if c == expect[idx] as char) {
        return Err(st.error("invalid literal"));
    }
    st.top().counter += 1;
    if st.top().counter as usize >= expect.len() {
        st.pop();
    }
    Ok(Flow::Advance)
}

/// Seed a time scope continuing after the two lookahead digits `HH:`.
fn push_time_after_hours(st: &mut State) {
    let hours = st.data.clone();
    st.out.push_str(&hours);
    let sc = st.push(time, ScopeKind::Generic);
    sc.counter = 2;
}

/// Seed a date scope continuing after the four lookahead digits `YYYY-`.
fn push_date_after_year(st: &mut State) {
    let year = st.data.clone();
    st.out.push_str(&year);
    let sc = st.push(date, ScopeKind::Generic);
    sc.counter = 4;
}

/// Digits after a leading zero: a date (`0Y..`) or a time (`0H:..`).
/// The leading zero is already in the lookahead buffer.
pub(crate) fn date_or_time(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().phase == Phase::AfterValue {
        st.out.push_char('"');
        st.pop();
        return Ok(Flow::Redo);
    }

    if r == ':' && st.data.len() == 2 {
        st.out.push_char('"');
        st.top().phase = Phase::AfterValue;
        push_time_after_hours(st);
        return Ok(Flow::Redo);
    }

    if r == '-' && st.data.len() == 4 {
        st.out.push_char('"');
        st.top().phase = Phase::AfterValue;
        push_date_after_year(st);
        return Ok(Flow::Redo);
    }

    if st.data.len() == 4 {
        return Err(st.error("unexpected character in date or time"));
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("digit expected"));
    };
    if !c.is_ascii_digit() {
        return Err(st.error("digit expected"));
    }
    st.data.push(c);
    Ok(Flow::Advance)
}

/// A value starting with `+`, `-`, `n`, or `i`: a signed number, `inf`,
/// or `nan`. Infinities and NaNs become JSON strings with the sign baked
/// in.
pub(crate) fn signed_number(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().phase == Phase::None && (r == '-' || r == '+') {
        st.data.push(if r == '-' { '-' } else { '+' });
        st.top().phase = Phase::Init;
        return Ok(Flow::Advance);
    }

    if r == 'n' || r == 'i' {
        let literal = if r == 'n' { "nan" } else { "inf" };
        st.out.push_char('"');
        if let Some(sign) = st.data.chars().next() {
            st.out.push_char(sign);
        }
        st.out.push_str(literal);
        st.out.push_char('"');
        st.pop();
        let sc = st.push(literal_value, ScopeKind::Generic);
        sc.expect = literal;
        return Ok(Flow::Redo);
    }

    let seen = st.data.len() as i64;
    let first = if st.data.len() == 1 {
        if st.data.starts_with('-') {
            st.out.push_char('-');
        }
        Token::Sign
    } else {
        Token::None
    };
    st.pop();
    let sc = st.push(float, ScopeKind::Generic);
    sc.last = first;
    sc.counter = seen;
    Ok(Flow::Redo)
}

/// Lookahead dispatcher for everything that starts with a digit or sign:
/// `HH:` commits to a time, `YYYY-` to a date, anything else to the
/// float/integer machine with the buffered digits replayed.
pub(crate) fn number_date_or_time(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().phase == Phase::AfterValue {
        st.out.push_char('"');
        st.pop();
        return Ok(Flow::Redo);
    }

    if st.data.is_empty() && matches!(r, Rune::Scalar('+' | '-' | 'n' | 'i')) {
        st.pop();
        st.push(signed_number, ScopeKind::Generic);
        return Ok(Flow::Redo);
    }

    if r == '}'
        || r == ']'
        || r == ','
        || r == '_'
        || r.is_space()
        || st.top().counter >= 3
        || r == '.'
        || r == 'e'
        || r == 'E'
    {
        if st.data.is_empty() {
            return Err(st.error("invalid character in number"));
        }
        let digits = st.data.clone();
        st.out.push_str(&digits);
        let seen = digits.len() as i64;
        st.pop();
        let sc = st.push(float, ScopeKind::Generic);
        sc.last = Token::Digit;
        sc.counter = seen;
        return Ok(Flow::Redo);
    }

    if r == ':' && st.data.len() == 2 {
        st.out.push_char('"');
        st.top().phase = Phase::AfterValue;
        push_time_after_hours(st);
        return Ok(Flow::Redo);
    }

    if r == '-' && st.data.len() == 4 {
        st.out.push_char('"');
        st.top().phase = Phase::AfterValue;
        push_date_after_year(st);
        return Ok(Flow::Redo);
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("digit expected"));
    };
    if !c.is_ascii_digit() {
        return Err(st.error("digit expected"));
    }
    st.data.push(c);
    Ok(Flow::Advance)
}

/// A value that started with `0`: prefix integers, `0.x` floats, `0e`
/// exponents, zero itself, or a zero-padded date/time.
pub(crate) fn zero(r: Rune, st: &mut State) -> Result<Flow> {
    if r.is_space() || r == ',' || r == ']' || r == '}' {
        st.out.push_char('0');
        st.pop();
        return Ok(Flow::Redo);
    }

    if r == 'x' || r == 'o' || r == 'b' {
        let radix: u32 = match r {
            Rune::Scalar('x') => 16,
            Rune::Scalar('o') => 8,
            _ => 2,
        };
        st.pop();
        let sc = st.push(prefix_number, ScopeKind::Generic);
        sc.radix = radix;
        return Ok(Flow::Advance);
    }

    if r == 'e' || r == 'E' {
        st.out.push_char('0');
        st.out.push_char(if r == 'e' { 'e' } else { 'E' });
        st.pop();
        let sc = st.push(float, ScopeKind::Generic);
        sc.phase = Phase::AfterExp;
        sc.counter = 2;
        return Ok(Flow::Advance);
    }

    if r.is_ascii_digit() {
        st.pop();
        st.push(date_or_time, ScopeKind::Generic);
        st.data.push('0');
        return Ok(Flow::Redo);
    }

    if r == '.' {
        st.out.push_str("0.");
        st.pop();
        let sc = st.push(float, ScopeKind::Generic);
        sc.phase = Phase::AfterDot;
        sc.counter = 2;
        return Ok(Flow::Advance);
    }

    Err(st.error("invalid character after zero"))
}

/// Value dispatch. Counts leading quotes to distinguish `"`, `""`, and
/// `"""` forms (and the single-quote mirror), then hands off to the
/// matching scope.
pub(crate) fn value(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().last == Token::None && r == '"' {
        st.top().last = Token::Quote;
        st.top().kind = ScopeKind::Quoted;
        return Ok(Flow::Advance);
    }
    if st.top().last == Token::Quote && r != '"' {
        st.pop();
        st.push(quoted_string, ScopeKind::Quoted);
        st.out.push_char('"');
        return Ok(Flow::Redo);
    }
    if st.top().last == Token::Quote && r == '"' {
        st.top().last = Token::Quote2;
        return Ok(Flow::Advance);
    }
    if st.top().last == Token::Quote2 && r != '"' {
        st.pop();
        st.out.push_str("\"\"");
        return Ok(Flow::Redo);
    }
    if st.top().last == Token::Quote2 && r == '"' {
        st.pop();
        st.push(multiline_basic_string, ScopeKind::Quoted);
        st.out.push_char('"');
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::None && r == '\'' {
        st.top().last = Token::SingleQuote;
        st.top().kind = ScopeKind::Quoted;
        return Ok(Flow::Advance);
    }
    if st.top().last == Token::SingleQuote && r != '\'' {
        st.pop();
        st.push(literal_string, ScopeKind::Quoted);
        st.out.push_char('"');
        return Ok(Flow::Redo);
    }
    if st.top().last == Token::SingleQuote && r == '\'' {
        st.top().last = Token::SingleQuote2;
        return Ok(Flow::Advance);
    }
    if st.top().last == Token::SingleQuote2 && r != '\'' {
        st.pop();
        st.out.push_str("\"\"");
        return Ok(Flow::Redo);
    }
    if st.top().last == Token::SingleQuote2 && r == '\'' {
        st.pop();
        st.push(multiline_literal_string, ScopeKind::Quoted);
        st.out.push_char('"');
        return Ok(Flow::Advance);
    }

    if r.is_space() {
        return Ok(Flow::Advance);
    }

    if r == 't' || r == 'f' {
        let literal = if r == 't' { "true" } else { "false" };
        st.out.push_str(literal);
        st.pop();
        let sc = st.push(literal_value, ScopeKind::Generic);
        sc.expect = literal;
        return Ok(Flow::Redo);
    }

    if r == '{' {
        st.pop();
        st.push(inline_table, ScopeKind::Generic);
        st.defs.push(Defs::new());
        st.out.push_char('{');
        return Ok(Flow::Advance);
    }

    if r == '[' {
        st.pop();
        st.push(inline_array, ScopeKind::Generic);
        st.out.push_char('[');
        return Ok(Flow::Advance);
    }

    if r == '0' {
        st.pop();
        st.push(zero, ScopeKind::Generic);
        return Ok(Flow::Advance);
    }

    st.pop();
    st.push(number_date_or_time, ScopeKind::Generic);
    Ok(Flow::Redo)
}

/// A dotted key: bare segments, quoted segments, and the dots between
/// them. Segments accumulate in the key buffer; the scope pops at the
/// first rune that ends the key (`=`, `]`, whitespace after a segment).
pub(crate) fn key(r: Rune, st: &mut State) -> Result<Flow> {
    if r.is_space() && r != '\n' {
        if st.top().last != Token::Dot {
            st.top().last = Token::Space;
        }
        return Ok(Flow::Advance);
    }

    if st.top().phase != Phase::None && (r.is_space() || r == '=' || r == ']') {
        if st.top().last == Token::Dot {
            return Err(st.error("invalid '.' at end of key"));
        }
        st.pop();
        return Ok(Flow::Redo);
    }

    if (st.top().phase == Phase::None || st.top().last == Token::Dot) && r == '.' {
        return Err(st.error("invalid '.' in key"));
    }

    let entry = st.top().phase;
    if entry == Phase::None {
        st.top().phase = Phase::Init;
    }

    if st.top().phase == Phase::AfterQuote {
        if r != '.' {
            return Err(st.error("invalid character after quoted key segment"));
        }
        st.top().last = Token::Dot;
        st.top().phase = Phase::Init;
    }

    if r == '.' {
        st.top().last = Token::Dot;
        st.key_data.push('\n');
        return Ok(Flow::Advance);
    }

    if r == '"' {
        if st.top().last != Token::Dot && entry != Phase::None {
            return Err(st.error("invalid character before '\"' in key"));
        }
        st.top().last = Token::None;
        st.top().phase = Phase::AfterQuote;
        st.push(quoted_string, ScopeKind::Key);
        return Ok(Flow::Advance);
    }

    if r == '\'' {
        if st.top().last != Token::Dot && entry != Phase::None {
            return Err(st.error("invalid character before '\\'' in key"));
        }
        st.top().last = Token::None;
        st.top().phase = Phase::AfterQuote;
        st.push(literal_string, ScopeKind::Key);
        return Ok(Flow::Advance);
    }

    if !r.is_bare_key() {
        return Err(st.error("invalid character in key"));
    }
    if st.top().last == Token::Space {
        return Err(st.error("invalid space in key"));
    }

    st.top().last = Token::None;
    if let Rune::Scalar(c) = r {
        st.key_data.push(c);
    }
    Ok(Flow::Advance)
}

/// One `key = value` statement. The base key and the insert-table flag
/// are seeded by the enclosing header scope (empty at top level and in
/// inline tables). The key is committed to the namespace at the `=`.
pub(crate) fn key_value(r: Rune, st: &mut State) -> Result<Flow> {
    match st.top().phase {
        Phase::AfterValue => {
            if r == Rune::Eof || r == '\n' || r == ',' || r == '}' || r == ']' {
                st.pop();
                return Ok(Flow::Redo);
            }
            if !r.is_space() {
                return Err(st.error("invalid character after value"));
            }
            Ok(Flow::Advance)
        }
        Phase::AfterKey => {
            if r == '\n' {
                return Err(st.error("newline after key"));
            }
            if st.top().last == Token::None && r.is_space() {
                return Ok(Flow::Advance);
            }
            if r == '=' {
                let segments = st.take_keys();
                let base = st.top().key.clone();
                let insert_table_len = if st.top().insert_table { base.len() } else { 0 };
                let mut full = base;
                full.extend(segments);

                st.top().phase = Phase::AfterValue;
                if !st.define_and_push(&full, insert_table_len, Var::Basic) {
                    return Err(st.error("attempt to redefine a key"));
                }

                if let Some(name) = full.last() {
                    st.out.push_char('"');
                    st.out.push_str(name);
                    st.out.push_str("\":");
                }

                st.push(value, ScopeKind::Generic);
                return Ok(Flow::Advance);
            }
            Err(st.error("invalid key"))
        }
        _ => {
            if !r.is_space() {
                st.top().phase = Phase::AfterKey;
                st.push(key, ScopeKind::Key);
                return Ok(Flow::Redo);
            }
            Ok(Flow::Advance)
        }
    }
}

/// `[table]` header and the key-value lines that follow it until the
/// next header.
pub(crate) fn table_header(r: Rune, st: &mut State) -> Result<Flow> {
    if r == '[' || r == Rune::Eof {
        st.pop();
        return Ok(Flow::Redo);
    }

    if st.top().phase == Phase::AfterValue {
        if r == '\n' {
            st.top().phase = Phase::AfterFirstValue;
            return Ok(Flow::Advance);
        }
        if !r.is_space() {
            return Err(st.error("invalid value in table"));
        }
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::AfterHeader || st.top().phase == Phase::AfterFirstValue {
        if !r.is_space() {
            st.top().phase = Phase::AfterValue;
            let base = st.top().key.clone();
            let sc = st.push(key_value, ScopeKind::Generic);
            sc.key = base;
            sc.insert_table = true;
            return Ok(Flow::Redo);
        }
        return Ok(Flow::Advance);
    }

    if r == '\n' {
        if st.top().last != Token::Bracket {
            return Err(st.error("table header end invalid"));
        }
        let segments = st.take_keys();
        if !st.define_and_push(&segments, 0, Var::Table) {
            return Err(st.error("table attempt to redefine a key"));
        }
        st.top().key = segments;
        st.top().phase = Phase::AfterHeader;
        return Ok(Flow::Advance);
    }

    if r.is_space() {
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::AfterKey {
        if st.top().last != Token::Bracket && r == ']' {
            st.top().last = Token::Bracket;
            return Ok(Flow::Advance);
        }
        return Err(st.error("invalid character at table header end"));
    }

    if r.is_bare_key() || r == '"' || r == '\'' {
        st.top().phase = Phase::AfterKey;
        st.push(key, ScopeKind::Key);
        return Ok(Flow::Redo);
    }
    Err(st.error("invalid character at table header start"))
}

/// `[[array-of-tables]]` header and its key-value lines.
pub(crate) fn array_header(r: Rune, st: &mut State) -> Result<Flow> {
    if r == '[' || r == Rune::Eof {
        st.pop();
        return Ok(Flow::Redo);
    }

    if st.top().phase == Phase::AfterValue {
        if r == '\n' {
            st.top().phase = Phase::AfterFirstValue;
            return Ok(Flow::Advance);
        }
        if !r.is_space() {
            return Err(st.error("invalid value in array of tables"));
        }
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::AfterHeader || st.top().phase == Phase::AfterFirstValue {
        if !r.is_space() {
            st.top().phase = Phase::AfterValue;
            let base = st.top().key.clone();
            let sc = st.push(key_value, ScopeKind::Generic);
            sc.key = base;
            return Ok(Flow::Redo);
        }
        return Ok(Flow::Advance);
    }

    if r == '\n' {
        if st.top().last != Token::Bracket2 {
            return Err(st.error("array of tables header end invalid"));
        }
        let segments = st.take_keys();
        if !st.define_and_push(&segments, 0, Var::Array) {
            return Err(st.error("array attempt to redefine a key"));
        }
        st.top().key = segments;
        st.top().phase = Phase::AfterHeader;
        return Ok(Flow::Advance);
    }

    if r.is_space() {
        if st.top().last == Token::Bracket {
            st.top().last = Token::BracketSpace;
        }
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::AfterKey {
        if st.top().last == Token::Bracket && r == ']' {
            st.top().last = Token::Bracket2;
            return Ok(Flow::Advance);
        }
        if st.top().last == Token::BracketSpace && r == ']' {
            return Err(st.error("invalid ']' in array of tables header"));
        }
        if r == ']' {
            st.top().last = Token::Bracket;
            return Ok(Flow::Advance);
        }
        return Err(st.error("invalid character at array of tables header end"));
    }

    if r.is_bare_key() || r == '"' || r == '\'' {
        st.top().phase = Phase::AfterKey;
        st.push(key, ScopeKind::Key);
        return Ok(Flow::Redo);
    }
    Err(st.error("invalid character at array of tables header start"))
}

/// `{ key = value, ... }`. Owns a private namespace pushed by the value
/// dispatcher, so its keys neither see nor pollute the document's.
pub(crate) fn inline_table(r: Rune, st: &mut State) -> Result<Flow> {
    if r == '\n' {
        return Err(st.error("newline in inline table"));
    }
    if r.is_space() {
        return Ok(Flow::Advance);
    }

    if matches!(st.top().phase, Phase::None | Phase::AfterValue) && r == '}' {
        if st.top().last == Token::Comma {
            return Err(st.error("trailing comma in inline table"));
        }
        st.pop();
        if let Some(mut defs) = st.defs.pop() {
            defs.filter.close(&mut st.out);
        }
        st.out.push_char('}');
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::AfterValue {
        if r == ',' && st.top().last != Token::Comma {
            st.top().last = Token::Comma;
            return Ok(Flow::Advance);
        }
        if st.top().last != Token::Comma {
            return Err(st.error("expected comma in inline table"));
        }
    }

    if r.is_bare_key() || r == '"' || r == '\'' {
        st.top().last = Token::None;
        st.top().phase = Phase::AfterValue;
        st.push(key_value, ScopeKind::Generic);
        return Ok(Flow::Redo);
    }
    Err(st.error("invalid key in inline table"))
}

/// `[ value, ... ]`. Values separated by commas; newlines and a trailing
/// comma are fine.
pub(crate) fn inline_array(r: Rune, st: &mut State) -> Result<Flow> {
    if r.is_space() {
        return Ok(Flow::Advance);
    }

    if r == ']' {
        st.pop();
        st.out.push_char(']');
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::AfterValue {
        if r == ',' && st.top().last != Token::Comma {
            st.top().last = Token::Comma;
            return Ok(Flow::Advance);
        }
        if st.top().last != Token::Comma {
            return Err(st.error("expected comma in array"));
        }
        st.out.push_char(',');
    }

    st.top().last = Token::None;
    st.top().phase = Phase::AfterValue;
    st.push(value, ScopeKind::Generic);
    Ok(Flow::Redo)
}

/// The document root: headers and top-level key-value statements.
pub(crate) fn top(r: Rune, st: &mut State) -> Result<Flow> {
    if r == Rune::Eof {
        if st.top().last != Token::None {
            return Err(st.error("invalid end of file"));
        }
        st.pop();
        return Ok(Flow::Advance);
    }

    if st.top().phase == Phase::AfterValue {
        if r == '[' {
            st.top().phase = Phase::AfterFirstValue;
            return Ok(Flow::Redo);
        }
        if r == '\n' {
            st.top().phase = Phase::AfterFirstValue;
            return Ok(Flow::Advance);
        }
        if !r.is_space() {
            return Err(st.error("invalid character after value"));
        }
        return Ok(Flow::Advance);
    }

    if r.is_space() {
        if st.top().last == Token::Bracket {
            st.top().last = Token::BracketSpace;
        }
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::BracketSpace && r == '[' {
        return Err(st.error("invalid '[' in header"));
    }

    if st.top().last == Token::Bracket && r == '[' {
        st.top().last = Token::None;
        st.push(array_header, ScopeKind::Generic);
        return Ok(Flow::Advance);
    }

    if st.top().last == Token::Bracket || st.top().last == Token::BracketSpace {
        st.top().last = Token::None;
        st.push(table_header, ScopeKind::Generic);
        return Ok(Flow::Redo);
    }

    if r == '[' {
        st.top().last = Token::Bracket;
        return Ok(Flow::Advance);
    }

    if r.is_bare_key() || r == '"' || r == '\'' {
        st.top().last = Token::None;
        st.top().phase = Phase::AfterValue;
        st.push(key_value, ScopeKind::Generic);
        return Ok(Flow::Redo);
    }

    match r {
        Rune::Scalar(c) => Err(st.error(format!("invalid character {c:?}"))),
        Rune::Eof => Err(st.error("invalid end of file")),
    }
}
