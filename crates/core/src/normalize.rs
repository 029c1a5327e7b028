//! Text normalization shared by the resolvers.
//!
//! Exports spell headers with arbitrary casing and surrounding whitespace,
//! and use "ё" and "е" interchangeably. Every comparison in the engine goes
//! through one of these functions.

/// Replace "ё"/"Ё" with "е"/"Е".
pub fn fold_yo(s: &str) -> String {
    s.replace('ё', "е").replace('Ё', "Е")
}

/// Trim, lowercase and fold "ё". Idempotent.
pub fn normalize_label(s: &str) -> String {
    fold_yo(&s.trim().to_lowercase())
}

/// Normalize a cell value for equality with a configured token.
pub fn normalize_value(s: &str) -> String {
    normalize_label(s)
}

/// Trim and uppercase; used for type codes and site codes.
pub fn normalize_code(s: &str) -> String {
    s.trim().to_uppercase()
}

/// [`normalize_label`] with every space and punctuation mark removed.
pub fn compact_label(s: &str) -> String {
    normalize_label(s)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}
