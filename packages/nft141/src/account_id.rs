//! Grammar for child account identifiers.
//!
//! A child is named `<label>.<suffix>`, where the suffix identifies the
//! factory and the label is chosen by the caller. Both follow the usual
//! account-id rules: lowercase alphanumerics separated by single `-` or `_`,
//! with `.` additionally separating the parts of a suffix.

pub const MIN_LABEL_LEN: usize = 2;
pub const MAX_LABEL_LEN: usize = 32;

pub const MIN_SUFFIX_LEN: usize = 2;
pub const MAX_SUFFIX_LEN: usize = 31;

/// Upper bound of `<label>.<suffix>`.
pub const MAX_ACCOUNT_ID_LEN: usize = MAX_LABEL_LEN + 1 + MAX_SUFFIX_LEN;

const fn is_separator(b: u8) -> bool {
    matches!(b, b'-' | b'_')
}

const fn is_alphanumeric(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}

fn is_valid_part(part: &[u8]) -> bool {
    // starts as if after a separator so a leading one is rejected
    let mut after_separator = true;
    for &b in part {
        if is_separator(b) {
            if after_separator {
                return false;
            }
            after_separator = true;
        } else if is_alphanumeric(b) {
            after_separator = false;
        } else {
            return false;
        }
    }

    // rejects empty parts and trailing separators
    !after_separator
}

/// Returns true if `label` can be used as the first part of a child account id.
pub fn is_valid_label(label: &[u8]) -> bool {
    (MIN_LABEL_LEN..=MAX_LABEL_LEN).contains(&label.len()) && is_valid_part(label)
}

/// Returns true if `suffix` can name a factory, e.g. `nft141factory` or
/// `factory.nft141`.
pub fn is_valid_suffix(suffix: &[u8]) -> bool {
    (MIN_SUFFIX_LEN..=MAX_SUFFIX_LEN).contains(&suffix.len())
        && suffix.split(|b| *b == b'.').all(is_valid_part)
}
