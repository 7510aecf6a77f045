//! Entry name normalization.

/// Strips a single leading `./` from an entry name.
///
/// Every name-keyed operation normalizes its argument first, so `"./foo"`
/// and `"foo"` always address the same entry. Only one prefix is removed;
/// nothing else about the name changes.
///
/// # Examples
///
/// ```
/// use ziptools_core::types::normalize;
///
/// assert_eq!(normalize("./docs/a.txt"), "docs/a.txt");
/// assert_eq!(normalize("docs/a.txt"), "docs/a.txt");
/// assert_eq!(normalize("././a"), "./a");
/// ```
#[must_use]
pub fn normalize(name: &str) -> &str {
    name.strip_prefix("./").unwrap_or(name)
}
