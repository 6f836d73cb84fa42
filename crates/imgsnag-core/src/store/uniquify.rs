//! Collision-free filenames for the uniquify conflict policy.

/// Give up numbering after this many attempts.
const MAX_SUFFIX: u32 = 10_000;

/// Returns `name` if it is free, else the first free `stem (n).ext`.
///
/// `taken` reports whether a candidate is already in use. Returns `None`
/// only when every suffix up to the limit is taken.
///
/// # Examples
///
/// - `photo-1.jpg` taken → `photo-1 (1).jpg`
/// - `archive` taken → `archive (1)`
pub fn unique_filename_among(name: &str, taken: impl Fn(&str) -> bool) -> Option<String> {
    if !taken(name) {
        return Some(name.to_string());
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    (1..=MAX_SUFFIX)
        .map(|n| format!("{stem} ({n}){ext}"))
        .find(|candidate| !taken(candidate))
}
