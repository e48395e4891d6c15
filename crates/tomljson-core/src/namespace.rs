//! Key namespace bookkeeping.
//!
//! TOML's redefinition rules are non-local: an assignment, a `[table]`
//! header, or a `[[array-of-tables]]` header anywhere in the document can
//! forbid a later statement. The namespace is a trie of every declared key
//! path, each node classified by how it was introduced. A companion stack
//! tracks which array-of-tables headers are currently open so that leaving
//! an array's subtree (or re-opening the same array) resets the names its
//! finished element declared.

use std::collections::HashMap;

use crate::emitter::KeyFilter;

/// How a key path was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Var {
    /// A plain `key = value` assignment. Final: never reopened.
    Basic,
    /// An explicit `[table]` header.
    Table,
    /// An interior segment materialized by a longer path; a later
    /// explicit header may promote it to `Table`.
    ImplicitTable,
    /// A `[[header]]`; each repeat opens a fresh element.
    Array,
}

#[derive(Debug, Default)]
struct Node {
    var: Option<Var>,
    children: HashMap<String, Node>,
}

/// Trie of declared key paths.
#[derive(Debug, Default)]
struct Namespace {
    root: Node,
}

impl Namespace {
    /// Record `key` as `var`. Returns false when the declaration collides
    /// with an earlier one.
    ///
    /// `insert_table_len` is the segment count of the enclosing explicit
    /// `[table]` header (0 when none): assignments under such a header may
    /// not reach through a deeper explicitly-declared table.
    fn set(&mut self, key: &[String], insert_table_len: usize, var: Var) -> bool {
        let mut current = &mut self.root;
        for (idx, segment) in key.iter().enumerate() {
            let existing = current.children.get(segment).and_then(|n| n.var);

            if existing == Some(Var::Basic) {
                return false;
            }
            if insert_table_len > 0
                && idx > insert_table_len
                && existing == Some(Var::Table)
                && var == Var::Basic
            {
                return false;
            }

            if idx == key.len() - 1 {
                return match existing {
                    Some(Var::ImplicitTable) if var == Var::Table => {
                        if let Some(node) = current.children.get_mut(segment) {
                            node.var = Some(Var::Table);
                        }
                        true
                    }
                    Some(Var::Array) if var == Var::Table => false,
                    Some(Var::Array) => {
                        if let Some(node) = current.children.get_mut(segment) {
                            node.var = Some(var);
                        }
                        true
                    }
                    Some(_) => false,
                    None => {
                        current.children.insert(
                            segment.clone(),
                            Node {
                                var: Some(var),
                                children: HashMap::new(),
                            },
                        );
                        true
                    }
                };
            }

            current = current.children.entry(segment.clone()).or_insert_with(|| Node {
                var: Some(Var::ImplicitTable),
                children: HashMap::new(),
            });
        }
        false
    }

    #[cfg(test)]
    fn get(&self, key: &[&str]) -> Option<Var> {
        let mut current = &self.root;
        for segment in key {
            current = current.children.get(*segment)?;
        }
        current.var
    }

    /// Drop every declaration underneath `key`, keeping the node itself.
    fn clear(&mut self, key: &[String]) -> bool {
        let mut current = &mut self.root;
        for segment in key {
            match current.children.get_mut(segment) {
                Some(node) => current = node,
                None => return false,
            }
        }
        current.children.clear();
        true
    }
}

/// LIFO of array-of-tables headers whose latest element is still open.
///
/// Keys are stored fully joined with the `\n` separator so prefix checks
/// are plain string operations.
#[derive(Debug, Default)]
struct ArrayKeyStack {
    stack: Vec<String>,
}

impl ArrayKeyStack {
    /// Register a committed header. Returns the joined keys whose subtrees
    /// must be cleared: every open array the new header steps out of, plus
    /// the array itself when the header re-opens it (the previous
    /// element's names go out of scope).
    fn push(&mut self, key: &str, var: Var) -> Vec<String> {
        let mut to_close = Vec::new();
        while let Some(top) = self.stack.pop() {
            if key.starts_with(top.as_str()) {
                self.stack.push(top);
                break;
            }
            to_close.push(top);
        }

        if var == Var::Array {
            if self.stack.last().is_some_and(|top| top == key) {
                to_close.push(key.to_string());
                return to_close;
            }
            self.stack.push(key.to_string());
        }
        to_close
    }
}

/// One namespace context: the trie, the open-array stack, and the JSON
/// emitter that mirrors it. The document owns one; every inline table gets
/// its own private instance.
#[derive(Debug, Default)]
pub(crate) struct Defs {
    map: Namespace,
    array_keys: ArrayKeyStack,
    pub(crate) filter: KeyFilter,
}

impl Defs {
    pub(crate) fn new() -> Self {
        Defs::default()
    }

    /// Declare `key` as `var`, enforcing the redefinition rules and
    /// resetting subtrees of arrays the declaration leaves or re-opens.
    pub(crate) fn define(&mut self, key: &[String], insert_table_len: usize, var: Var) -> bool {
        if key.is_empty() {
            return false;
        }
        if !self.map.set(key, insert_table_len, var) {
            return false;
        }

        let joined = key.join("\n");
        for closed in self.array_keys.push(&joined, var) {
            let segments: Vec<String> = closed.split('\n').map(String::from).collect();
            if !self.map.clear(&segments) {
                return false;
            }
        }
        true
    }
}
