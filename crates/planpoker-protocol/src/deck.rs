//! Vote decks.

/// The deck used when a room is created without one.
pub const DEFAULT_DECK: &[&str] = &["0", "1", "2", "3", "5", "8", "13", "21", "?", "☕"];

/// Returns the built-in default deck as owned labels.
pub fn default_deck() -> Vec<String> {
    DEFAULT_DECK.iter().map(|label| label.to_string()).collect()
}

/// Returns `deck` unchanged if it has at least one card, otherwise the
/// built-in default.
pub fn ensure_deck(deck: Option<Vec<String>>) -> Vec<String> {
    ensure_deck_or(deck, DEFAULT_DECK.iter().copied())
}

/// Like [`ensure_deck`], with a caller-chosen fallback.
///
/// An empty fallback still yields the built-in default so the result is
/// never empty.
pub fn ensure_deck_or<I, L>(deck: Option<Vec<String>>, fallback: I) -> Vec<String>
where
    I: IntoIterator<Item = L>,
    L: Into<String>,
{
    match deck {
        Some(deck) if !deck.is_empty() => deck,
        _ => {
            let fallback: Vec<String> = fallback.into_iter().map(Into::into).collect();
            if fallback.is_empty() {
                default_deck()
            } else {
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_deck_empty_yields_default() {
        assert_eq!(ensure_deck(Some(vec![])), default_deck());
    }

    #[test]
    fn test_ensure_deck_none_yields_default() {
        assert_eq!(ensure_deck(None), default_deck());
    }

    #[test]
    fn test_ensure_deck_keeps_supplied_order() {
        let deck = vec!["a".to_string(), "b".to_string()];
        assert_eq!(ensure_deck(Some(deck.clone())), deck);
    }

    #[test]
    fn test_ensure_deck_or_uses_custom_fallback() {
        let deck = ensure_deck_or(None, ["S", "M", "L"]);
        assert_eq!(deck, vec!["S", "M", "L"]);
    }

    #[test]
    fn test_ensure_deck_or_empty_fallback_is_never_empty() {
        let deck = ensure_deck_or(Some(vec![]), Vec::<String>::new());
        assert_eq!(deck, default_deck());
    }
}
