//! Stylized display names for a few known players.

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("karol", "King Karol 👑"),
    ("anastasiya", "NXtasiya"),
];

/// Returns the stylized display string for `name`, or `name` unchanged
/// when it is not in the table. Matching ignores case and surrounding
/// whitespace.
pub fn display_name(name: &str) -> String {
    let key = name.trim().to_lowercase();
    DISPLAY_NAMES
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, styled)| styled.to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_ignores_case_and_whitespace() {
        let expected = display_name("karol");
        assert_eq!(expected, "King Karol 👑");
        assert_eq!(display_name("Karol"), expected);
        assert_eq!(display_name(" KAROL "), expected);
    }

    #[test]
    fn test_display_name_unknown_is_unchanged() {
        assert_eq!(display_name("unknown"), "unknown");
        assert_eq!(display_name("  Bob "), "  Bob ");
    }

    #[test]
    fn test_display_name_second_entry() {
        assert_eq!(display_name("Anastasiya"), "NXtasiya");
    }
}
