/// Case-insensitive substring test of `keyword` against a folder name.
///
/// Pure-ASCII inputs are compared byte by byte without allocating. Anything
/// else goes through full Unicode lowercasing of both sides.
pub fn name_matches(name: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }

    if name.is_ascii() && keyword.is_ascii() {
        return contains_ascii_case_insensitive(name.as_bytes(), keyword.as_bytes());
    }

    name.to_lowercase().contains(&keyword.to_lowercase())
}

fn contains_ascii_case_insensitive(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }

    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
