//! Plain substring splitting of the target value.

/// Split `value` on every occurrence of `delimiter`.
///
/// - A null target (`None`) and `""` both yield zero parts.
/// - Otherwise leading, trailing and adjacent delimiters yield empty parts; nothing is trimmed or
///   collapsed.
///
/// `delimiter` must be non-empty (enforced by [`crate::planner::plan`]).
pub fn split_parts<'a>(value: Option<&'a str>, delimiter: &str) -> Vec<&'a str> {
    match value {
        Some("") | None => Vec::new(),
        Some(s) => s.split(delimiter).collect(),
    }
}
