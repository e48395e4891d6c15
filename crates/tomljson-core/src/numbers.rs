//! Numeric value scopes: the float/integer state machine and the
//! prefixed (hex/octal/binary) integer accumulator.
//!
//! Decimal integers and floats share one machine; by the time it is
//! pushed, the dispatcher has already decided the value cannot be a date
//! or a time. Digits stream straight to the output with underscores
//! dropped, so no numeric text is ever buffered. Prefixed integers are
//! accumulated into an `i64` and re-emitted in decimal.

use crate::error::Result;
use crate::rune::Rune;
use crate::scope::{Flow, Phase, State, Token};

/// `+` / `-` handling shared by the float phases. True when the rune was
/// a sign and has been recorded.
fn float_sign(r: Rune, st: &mut State) -> Result<bool> {
    if r == '-' || r == '+' {
        let phase = st.top().phase;
        let last = st.top().last;
        if phase != Phase::None && last != Token::Exp {
            return Err(st.error("invalid sign in float"));
        }
        if last == Token::Sign {
            return Err(st.error("invalid sign in float"));
        }
        st.top().last = Token::Sign;
        return Ok(true);
    }
    Ok(false)
}

/// Digit-group underscore: legal only between digits, never emitted.
fn float_underscore(r: Rune, st: &mut State) -> Result<bool> {
    if r == '_' {
        if st.top().last != Token::Digit {
            return Err(st.error("invalid underscore in float"));
        }
        st.top().counter += 1;
        st.top().last = Token::Underscore;
        return Ok(true);
    }
    Ok(false)
}

/// Exponent marker; emitted as-is, must follow a digit.
fn float_exp(r: Rune, st: &mut State) -> Result<bool> {
    if r == 'e' || r == 'E' {
        if st.top().last != Token::Digit {
            return Err(st.error("invalid exponent in float"));
        }
        st.top().counter += 1;
        st.top().last = Token::Exp;
        st.out.push_char(if r == 'e' { 'e' } else { 'E' });
        st.top().phase = Phase::AfterExp;
        return Ok(true);
    }
    Ok(false)
}

fn float_digit(r: Rune, st: &mut State) -> Result<Flow> {
    let Rune::Scalar(c) = r else {
        return Err(st.error("invalid digit in float"));
    };
    if !c.is_ascii_digit() {
        return Err(st.error("invalid digit in float"));
    }
    st.top().last = Token::Digit;
    st.top().counter += 1;
    st.out.push_char(c);
    Ok(Flow::Advance)
}

/// Decimal integer / float body. The pushing scope seeds `phase`, `last`
/// and `counter` with whatever prefix it already consumed.
pub(crate) fn float(r: Rune, st: &mut State) -> Result<Flow> {
    if r.is_space() && st.top().last == Token::Digit {
        st.pop();
        return Ok(Flow::Redo);
    }
    if (r == ']' || r == '}' || r == ',') && st.top().last == Token::Digit {
        st.pop();
        return Ok(Flow::Redo);
    }
    if r.is_space() {
        return Err(st.error("invalid float ending"));
    }

    match st.top().phase {
        Phase::None => {
            if float_sign(r, st)? {
                if r == '-' {
                    st.out.push_char('-');
                }
                return Ok(Flow::Advance);
            }

            if r == '0' && matches!(st.top().last, Token::None | Token::Sign) {
                st.out.push_char('0');
                st.top().counter += 1;
                st.top().last = Token::Digit;
                st.top().phase = Phase::AfterZero;
                return Ok(Flow::Advance);
            }

            if r == '.' {
                if st.top().last != Token::Digit {
                    return Err(st.error("invalid '.' in float"));
                }
                st.top().counter += 1;
                st.top().last = Token::Dot;
                st.out.push_char('.');
                st.top().phase = Phase::AfterDot;
                return Ok(Flow::Advance);
            }

            if float_underscore(r, st)? {
                return Ok(Flow::Advance);
            }
            if float_exp(r, st)? {
                return Ok(Flow::Advance);
            }
            float_digit(r, st)
        }

        Phase::AfterZero => {
            // after a leading zero only a fraction or an exponent may
            // follow; this is what rejects 01
            if r == '.' {
                st.top().last = Token::Dot;
                st.out.push_char('.');
                st.top().phase = Phase::AfterDot;
                return Ok(Flow::Advance);
            }
            if float_exp(r, st)? {
                return Ok(Flow::Advance);
            }
            Err(st.error("invalid character after leading zero"))
        }

        Phase::AfterDot => {
            if float_underscore(r, st)? {
                return Ok(Flow::Advance);
            }
            if float_exp(r, st)? {
                return Ok(Flow::Advance);
            }
            float_digit(r, st)
        }

        Phase::AfterExp => {
            if float_sign(r, st)? {
                if let Rune::Scalar(c) = r {
                    st.out.push_char(c);
                }
                return Ok(Flow::Advance);
            }
            if float_underscore(r, st)? {
                return Ok(Flow::Advance);
            }
            float_digit(r, st)
        }

        _ => float_digit(r, st),
    }
}

/// Body of a `0x` / `0o` / `0b` integer; the radix is seeded at push
/// time. Leading zeros collapse; the value is emitted in decimal once a
/// terminator arrives.
pub(crate) fn prefix_number(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().phase != Phase::Init && r.is_space() {
        return Err(st.error("empty number"));
    }
    st.top().phase = Phase::Init;

    if r.is_space() || r == ']' || r == '}' || r == ',' {
        if st.top().last != Token::Digit {
            return Err(st.error("invalid character at number end"));
        }
        let total = st.top().counter;
        st.pop();
        st.out.push_str(&total.to_string());
        return Ok(Flow::Redo);
    }

    if r == '_' {
        if st.top().last != Token::Digit {
            return Err(st.error("invalid underscore in number"));
        }
        st.top().last = Token::Underscore;
        return Ok(Flow::Advance);
    }

    let radix = st.top().radix;
    let digit = match r {
        Rune::Scalar(c) => c.to_digit(radix),
        Rune::Eof => None,
    };
    let Some(digit) = digit else {
        return Err(st.error("invalid character in number"));
    };

    st.top().last = Token::Digit;
    let total = st.top().counter;
    st.top().counter = if digit == 0 && total == 0 {
        0
    } else {
        total
            .wrapping_mul(i64::from(radix))
            .wrapping_add(i64::from(digit))
    };
    Ok(Flow::Advance)
}
