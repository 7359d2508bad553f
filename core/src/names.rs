//! Display names
//!
//! Documents cross-reference grids, styles and layouts by name, so names
//! within one collection are kept distinct.

use hashbrown::HashSet;

/// `name` itself, or the first of `name (2)`, `name (3)`, ... not in `taken`
pub fn unique_name<'a>(name: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();
    if !taken.contains(name) {
        return name.to_string();
    }
    (2usize..)
        .map(|n| format!("{name} ({n})"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| name.to_string())
}

/// Rename every repeat of an earlier name in place. Returns the names that
/// were repeated, once per rename.
pub fn dedupe_names<'a>(names: impl IntoIterator<Item = &'a mut String>) -> Vec<String> {
    let mut names: Vec<&mut String> = names.into_iter().collect();
    let mut repeated = Vec::new();
    for i in 1..names.len() {
        let (before, rest) = names.split_at_mut(i);
        let Some((current, after)) = rest.split_first_mut() else {
            continue;
        };
        if !before.iter().any(|n| **n == **current) {
            continue;
        }
        let fresh = unique_name(
            current.as_str(),
            before.iter().chain(after.iter()).map(|n| n.as_str()),
        );
        repeated.push(std::mem::replace(&mut **current, fresh));
    }
    repeated
}
