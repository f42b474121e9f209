//! Room slugs.

/// Turns free text into a URL-safe slug over `[a-z0-9-]`.
///
/// Whitespace runs become single hyphens, everything outside the slug
/// alphabet is dropped, repeated hyphens collapse and hyphens at either end
/// are stripped. Returns an empty string when nothing usable remains.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_mixed_punctuation_and_spaces() {
        assert_eq!(slugify("My Room!!  Name"), "my-room-name");
    }

    #[test]
    fn test_slugify_blank_is_empty() {
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_collapses_hyphens_and_strips_edges() {
        assert_eq!(slugify("--a -- b--"), "a-b");
        assert_eq!(slugify("Sprint 42"), "sprint-42");
    }

    #[test]
    fn test_slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Crème"), "caf-crme");
        assert_eq!(slugify("tab\tand\nnewline"), "tab-and-newline");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let once = slugify("  Team   Rocket: Q3 Planning ");
        assert_eq!(once, "team-rocket-q3-planning");
        assert_eq!(slugify(&once), once);
    }
}
