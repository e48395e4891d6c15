//! Date and time scopes.
//!
//! Dates and times are re-emitted as JSON strings preserving their
//! original text; the machine only validates shape and ranges as the
//! characters stream through. The surrounding quote characters belong to
//! the scope that pushed these (the number-date-or-time dispatcher), so a
//! date/time scope pops as soon as it sees a character it does not own.

use crate::error::Result;
use crate::rune::Rune;
use crate::scope::{Flow, Phase, ScopeKind, State};

/// Maximum day per month. February is fixed at 29: the calendar check
/// does not consult the year.
const DAYS_IN_MONTH: [i64; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn two_digits_at_most(value: &str, max: i64) -> bool {
    match value.parse::<i64>() {
        Ok(v) => v <= max,
        Err(_) => false,
    }
}

/// `HH:MM:SS[.fraction]` body. `counter` is the character offset within
/// the time text; a scope seeded with the two hour digits starts at 2.
/// With `minutes_only` set (timezone offsets) the scope ends after `MM`.
pub(crate) fn time(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().counter > 8 {
        if !r.is_ascii_digit() {
            st.pop();
            return Ok(Flow::Redo);
        }
    }
    if st.top().counter == 8 {
        // seconds are complete; validate them before deciding whether a
        // fraction follows
        if st.data.len() != 2 {
            return Err(st.error("invalid seconds in time"));
        }
        if !two_digits_at_most(&st.data[..2], 59) {
            return Err(st.error("seconds out of range"));
        }
        st.data.clear();
        if r != '.' {
            st.pop();
            return Ok(Flow::Redo);
        }
    }

    let offset = st.top().counter;
    if offset < 2 || (offset > 2 && offset < 5) || (offset > 5 && offset < 8) {
        let Rune::Scalar(c) = r else {
            return Err(st.error("invalid digit in time"));
        };
        if !c.is_ascii_digit() {
            return Err(st.error("invalid digit in time"));
        }
        st.data.push(c);
    }

    if offset == 5 {
        if st.data.len() != 4 {
            return Err(st.error("invalid time"));
        }
        if !two_digits_at_most(&st.data[..2], 23) {
            return Err(st.error("hours out of range"));
        }
        if !two_digits_at_most(&st.data[2..4], 59) {
            return Err(st.error("minutes out of range"));
        }
        st.data.clear();
    }

    if st.top().minutes_only && offset == 5 {
        st.pop();
        return Ok(Flow::Redo);
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("invalid character in time"));
    };
    st.out.push_char(c);

    if (offset == 2 || offset == 5) && c != ':' {
        return Err(st.error("invalid character in time"));
    }

    st.top().counter += 1;
    Ok(Flow::Advance)
}

/// `YYYY-MM-DD` body, optionally followed by `T`/space and a time, then
/// `Z` or a `±HH:MM` offset. Seeded with the four year digits, starting
/// at offset 4.
pub(crate) fn date(r: Rune, st: &mut State) -> Result<Flow> {
    if st.top().phase == Phase::AfterTime {
        if r == 'Z' {
            st.pop();
            st.out.push_char('Z');
            return Ok(Flow::Advance);
        }
        if r == '-' || r == '+' {
            st.out.push_char(if r == '-' { '-' } else { '+' });
            st.pop();
            let offset_time = st.push(time, ScopeKind::Generic);
            offset_time.minutes_only = true;
            return Ok(Flow::Advance);
        }
        st.pop();
        return Ok(Flow::Redo);
    }

    if st.top().phase == Phase::Init {
        if r == ' ' || r == 'T' {
            st.out.push_char(if r == ' ' { ' ' } else { 'T' });
            st.top().phase = Phase::AfterTime;
            st.data.clear();
            st.push(time, ScopeKind::Generic);
            return Ok(Flow::Advance);
        }
        st.pop();
        return Ok(Flow::Redo);
    }

    let offset = st.top().counter;
    if offset < 4 || (offset > 4 && offset < 7) || (offset > 7 && offset < 10) {
        let Rune::Scalar(c) = r else {
            return Err(st.error("invalid digit in date"));
        };
        if !c.is_ascii_digit() {
            return Err(st.error("invalid digit in date"));
        }
        st.data.push(c);
    }

    let Rune::Scalar(c) = r else {
        return Err(st.error("invalid character in date"));
    };
    st.out.push_char(c);

    if (offset == 4 || offset == 7) && c != '-' {
        return Err(st.error("invalid character in date"));
    }

    st.top().counter += 1;

    if st.top().counter == 10 {
        if st.data.len() != 8 {
            return Err(st.error("invalid date"));
        }
        let month = match st.data[4..6].parse::<i64>() {
            Ok(m) => m,
            Err(_) => return Err(st.error("invalid month in date")),
        };
        if !(1..=12).contains(&month) {
            return Err(st.error("invalid month in date"));
        }
        let day = match st.data[6..8].parse::<i64>() {
            Ok(d) => d,
            Err(_) => return Err(st.error("invalid day in date")),
        };
        if day < 1 || day > DAYS_IN_MONTH[(month - 1) as usize] {
            return Err(st.error("invalid number of days in month"));
        }
        st.top().phase = Phase::Init;
    }
    Ok(Flow::Advance)
}
