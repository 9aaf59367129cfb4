//! Case-insensitive requirement matching for skills, certifications and
//! drone capabilities.

use std::collections::HashSet;

/// Required items not present in any of the `held` lists.
///
/// Comparison ignores ASCII case and surrounding whitespace; the returned
/// items keep the spelling used in `required`.
pub fn missing_items<'a>(required: &'a [String], held: &[&[String]]) -> Vec<&'a str> {
    if required.is_empty() {
        return Vec::new();
    }

    let have: HashSet<String> = held
        .iter()
        .flat_map(|list| list.iter())
        .map(|item| normalize(item))
        .collect();

    required
        .iter()
        .filter(|item| !have.contains(&normalize(item)))
        .map(String::as_str)
        .collect()
}

/// Whether every required item is held
#[must_use]
pub fn covers(required: &[String], held: &[&[String]]) -> bool {
    missing_items(required, held).is_empty()
}

/// Whether a single item is present, ignoring case
#[must_use]
pub fn holds(held: &[String], wanted: &str) -> bool {
    let wanted = normalize(wanted);
    held.iter().any(|item| normalize(item) == wanted)
}

fn normalize(item: &str) -> String {
    item.trim().to_ascii_lowercase()
}
