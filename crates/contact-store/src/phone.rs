//! Phone number normalization.

/// Normalize a raw phone number to its canonical form.
///
/// Whitespace and every character other than ASCII digits are dropped and a
/// single leading `+` is ensured. No length or country-code validation is
/// done, so empty input yields `"+"`.
pub fn normalize(raw: &str) -> String {
    let mut canonical = String::with_capacity(raw.len() + 1);
    canonical.push('+');
    canonical.extend(raw.chars().filter(|c| c.is_ascii_digit()));
    canonical
}
