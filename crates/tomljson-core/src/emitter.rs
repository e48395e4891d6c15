//! Forward-only JSON structure emitter.
//!
//! The transcoder never materializes a value tree. Instead, the emitter
//! keeps the spine of the JSON object currently open in the output: an
//! ordered list of segments, each tagged with whether it is an
//! array-of-tables element and whether its object is still "fresh" (no
//! member emitted yet, so no comma needed). Every declared key path is
//! classified against that spine — close braces down to the common
//! prefix, then open braces for the new suffix — which yields properly
//! nested, properly delimited JSON one statement at a time.

use crate::buffer::OutBuf;
use crate::namespace::Var;

#[derive(Debug)]
struct Segment {
    name: String,
    var: Var,
    head: bool,
}

/// The currently-open path of the JSON output.
#[derive(Debug, Default)]
pub(crate) struct KeyFilter {
    path: Vec<Segment>,
    emitted_any: bool,
}

impl KeyFilter {
    /// Close every open segment from the innermost down to depth `upto`.
    /// Array-of-tables segments close both the element object and the
    /// array.
    fn close_segments(&self, upto: usize, out: &mut OutBuf) {
        for segment in self.path[upto..].iter().rev() {
            if segment.var == Var::Array {
                out.push_str("}]");
            } else {
                out.push_str("}");
            }
        }
    }

    /// Reposition the output at `key` and emit whatever punctuation and
    /// braces that requires.
    ///
    /// Key segments arrive already JSON-escaped (quoted-key escapes are
    /// rendered when the key is read), so they are written verbatim.
    pub(crate) fn push(&mut self, key: &[String], var: Var, out: &mut OutBuf) {
        // For an assignment only the containing object matters; the final
        // segment becomes the member name at the insertion point.
        let key = match (var, key.split_last()) {
            (Var::Basic, Some((_, parent))) => parent,
            _ => key,
        };

        let common = key.len().min(self.path.len());
        let mut idx = 0;
        while idx < common && key[idx] == self.path[idx].name {
            idx += 1;
        }

        if idx < self.path.len() {
            self.close_segments(idx, out);
            self.path.truncate(idx);
        }

        for (i, name) in key.iter().enumerate().skip(idx) {
            let (var, head) = if i < key.len() - 1 {
                (Var::Table, false)
            } else {
                (var, true)
            };
            self.path.push(Segment {
                name: name.clone(),
                var,
                head,
            });
        }

        // The same array-of-tables header again: close the element, open
        // the next one.
        if var == Var::Array && idx == self.path.len() && idx == key.len() {
            out.push_str("},{");
            if let Some(last) = self.path.last_mut() {
                last.head = true;
            }
            return;
        }

        if idx > 0 {
            let reentry = idx == key.len() && var == Var::Table && self.path[idx - 1].var == Var::Table;
            if !reentry && !self.path[idx - 1].head {
                out.push_str(",");
            }
        } else if self.emitted_any {
            out.push_str(",");
        }
        self.emitted_any = true;

        if var == Var::Basic {
            if let Some(last) = self.path.last_mut() {
                last.head = false;
            }
        }

        for segment in &self.path[idx..] {
            out.push_str("\"");
            out.push_str(&segment.name);
            if segment.var == Var::Array {
                out.push_str("\":[{");
            } else {
                out.push_str("\":{");
            }
        }

        for segment in &mut self.path[..idx] {
            segment.head = false;
        }
    }

    /// Close everything still open.
    pub(crate) fn close(&mut self, out: &mut OutBuf) {
        self.close_segments(0, out);
        self.path.clear();
    }
}
