//! Identifier utilities for SchemaDrift
//!
//! Table and column identity is case-insensitive, so every name that enters
//! the canonical model goes through [`canonical_identifier`].

/// Reduce a raw SQL identifier to its canonical form.
///
/// Surrounding quotes (`"x"`, `` `x` ``, `[x]`) are removed, a schema or
/// database qualifier is dropped (`public.users` becomes `users`) and the
/// result is lowercased.
pub fn canonical_identifier(raw: &str) -> String {
    let last = split_qualified(raw.trim()).pop().unwrap_or_default();
    strip_quotes(last.trim()).to_lowercase()
}

/// Remove one layer of identifier quoting, if present
fn strip_quotes(name: &str) -> &str {
    let pairs = [('"', '"'), ('`', '`'), ('[', ']')];

    for (open, close) in pairs {
        if name.len() >= 2 && name.starts_with(open) && name.ends_with(close) {
            return &name[open.len_utf8()..name.len() - close.len_utf8()];
        }
    }

    name
}

/// Split a dotted name into its parts, ignoring dots inside quotes
fn split_qualified(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut closing: Option<char> = None;
    let mut start = 0;

    for (i, c) in name.char_indices() {
        match closing {
            Some(close) if c == close => closing = None,
            Some(_) => {}
            None => match c {
                '"' => closing = Some('"'),
                '`' => closing = Some('`'),
                '[' => closing = Some(']'),
                '.' => {
                    parts.push(&name[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }

    parts.push(&name[start..]);
    parts
}

/// Whether `name` is a plain SQL word: letters, digits and underscores
pub fn is_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
