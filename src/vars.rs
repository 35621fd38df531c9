//! Variable store: the global name → value table shared by all nodes.
//!
//! Nodes publish their results here and downstream templates read them back
//! through `{{name}}` interpolation. The namespace is deliberately global
//! with last-writer-wins conflict resolution; the store is injected through
//! the traversal call rather than living in a singleton, so independent runs
//! (and tests) get independent environments.
//!
//! Interpolation is single-pass: substituted values are never re-scanned for
//! further tokens, and unresolved tokens are left verbatim.
//!
//! # Examples
//!
//! ```rust
//! use flowcanvas::vars::VariableStore;
//!
//! let mut vars = VariableStore::new();
//! vars.set("name", "Ada");
//! assert_eq!(vars.interpolate("Hello {{name}}, {{missing}}!"), "Hello Ada, {{missing}}!");
//!
//! // Present/absent is distinguishable from "set to empty".
//! vars.set("blank", "");
//! assert_eq!(vars.get("blank"), Some(""));
//! assert_eq!(vars.get("never"), None);
//! ```

use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
struct Entry {
    value: String,
    /// Monotonic write sequence, used for "most recent" fallback lookups.
    seq: u64,
}

/// Global mapping from variable name to current string value.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    entries: FxHashMap<String, Entry>,
    next_seq: u64,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional overwrite; last writer wins.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.next_seq += 1;
        self.entries.insert(
            name.into(),
            Entry {
                value: value.into(),
                seq: self.next_seq,
            },
        );
    }

    /// Current value, or `None` if the variable was never set (or removed).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.value.as_str())
    }

    /// Deletes the mapping. No-op if absent.
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Resets the mapping to empty. Used on workflow reset.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The most recently written value whose name starts with `prefix`.
    ///
    /// Backs the output node's documented fallback to generator-convention
    /// variables when no upstream value reached it.
    pub fn latest_with_prefix(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .max_by_key(|(_, entry)| entry.seq)
            .map(|(_, entry)| entry.value.as_str())
    }

    /// Replaces each `{{identifier}}` token with the variable's current
    /// value. Unresolved tokens are left verbatim. Single-pass and
    /// side-effect-free: substituted values are not re-interpolated.
    pub fn interpolate(&self, text: &str) -> String {
        self.interpolate_scoped(text, &[])
    }

    /// Like [`interpolate`](Self::interpolate), with `extra` bindings
    /// shadowing the store for the duration of this call. Used by the engine
    /// to bind `{{input}}` without mutating the shared namespace.
    pub fn interpolate_scoped(&self, text: &str, extra: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(text.len());
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'{' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
                if let Some((name, end)) = parse_token(bytes, i + 2) {
                    let resolved = extra
                        .iter()
                        .find(|(n, _)| *n == name)
                        .map(|(_, v)| *v)
                        .or_else(|| self.get(name));
                    match resolved {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&text[i..end]),
                    }
                    i = end;
                    continue;
                }
            }
            let ch = text[i..].chars().next().unwrap_or('\u{fffd}');
            out.push(ch);
            i += ch.len_utf8();
        }
        out
    }
}

/// Parses an identifier token body starting right after `{{`.
///
/// Identifiers match `[A-Za-z_$][A-Za-z0-9_$]*`. Returns the identifier and
/// the byte offset just past the closing `}}`.
fn parse_token(bytes: &[u8], start: usize) -> Option<(&str, usize)> {
    let mut i = start;
    let first = *bytes.get(i)?;
    if !(first.is_ascii_alphabetic() || first == b'_' || first == b'$') {
        return None;
    }
    i += 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
            i += 1;
        } else {
            break;
        }
    }
    if bytes.get(i) == Some(&b'}') && bytes.get(i + 1) == Some(&b'}') {
        // Identifier bytes are ASCII, safe to slice.
        let name = std::str::from_utf8(&bytes[start..i]).ok()?;
        Some((name, i + 2))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_is_single_pass() {
        let mut vars = VariableStore::new();
        vars.set("a", "{{b}}");
        vars.set("b", "deep");
        // The substituted "{{b}}" is not re-interpolated.
        assert_eq!(vars.interpolate("x {{a}} y"), "x {{b}} y");
    }

    #[test]
    fn malformed_tokens_stay_verbatim() {
        let vars = VariableStore::new();
        assert_eq!(vars.interpolate("{{1bad}} {{un closed"), "{{1bad}} {{un closed");
        assert_eq!(vars.interpolate("{{}}"), "{{}}");
    }

    #[test]
    fn scoped_bindings_shadow_the_store() {
        let mut vars = VariableStore::new();
        vars.set("input", "stored");
        let out = vars.interpolate_scoped("got {{input}}", &[("input", "scoped")]);
        assert_eq!(out, "got scoped");
    }

    #[test]
    fn latest_prefix_tracks_write_order() {
        let mut vars = VariableStore::new();
        vars.set("generator_1", "first");
        vars.set("generator_2", "second");
        vars.set("generator_1", "rewritten");
        assert_eq!(vars.latest_with_prefix("generator"), Some("rewritten"));
        assert_eq!(vars.latest_with_prefix("refined"), None);
    }
}
