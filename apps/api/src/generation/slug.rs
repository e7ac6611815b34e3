//! URL slugs derived from article titles.

pub const MAX_SLUG_LEN: usize = 100;

/// Lowercase ASCII alphanumerics joined by single hyphens, at most 100 chars.
///
/// Every run of other characters (whitespace, punctuation, non-ASCII) collapses
/// into one hyphen; leading and trailing hyphens are dropped. Applying it to its
/// own output is a no-op.
pub fn create_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len().min(MAX_SLUG_LEN));
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}

/// Appends `-{n}` to `base`, shortening `base` so the result stays within 100 chars.
pub fn with_suffix(base: &str, n: u32) -> String {
    let suffix = format!("-{n}");
    let keep = MAX_SLUG_LEN.saturating_sub(suffix.len()).min(base.len());
    format!("{}{suffix}", base[..keep].trim_end_matches('-'))
}
