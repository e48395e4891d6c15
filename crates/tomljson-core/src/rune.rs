//! Input runes: decoded Unicode scalars plus the end-of-input sentinel.

/// One unit of parser input.
///
/// The dispatcher hands these to the parse functions one at a time. `Eof`
/// is fed exactly once, after the final `\n`, and is distinct from every
/// scalar, so no code point needs to be reserved for it. Carriage returns
/// never appear here; the transcoder drops them before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rune {
    Scalar(char),
    Eof,
}

impl PartialEq<char> for Rune {
    fn eq(&self, other: &char) -> bool {
        matches!(self, Rune::Scalar(c) if c == other)
    }
}

impl Rune {
    /// Unicode whitespace. `Eof` is not space.
    pub(crate) fn is_space(self) -> bool {
        matches!(self, Rune::Scalar(c) if c.is_whitespace())
    }

    /// Characters allowed in a bare key segment: ASCII letters, digits,
    /// `-` and `_`.
    pub(crate) fn is_bare_key(self) -> bool {
        matches!(self, Rune::Scalar(c) if c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// ASCII decimal digit.
    pub(crate) fn is_ascii_digit(self) -> bool {
        matches!(self, Rune::Scalar(c) if c.is_ascii_digit())
    }
}
