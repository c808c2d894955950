// Crisis shortcut for the presentation layer. Runs before the engine and
// never touches phase selection or the generative backend.

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "hurt myself",
    "i can't go on",
    "self harm",
    "overdose",
    "i'll kill myself",
];

/// Returned verbatim when `is_crisis` fires
pub const CRISIS_MESSAGE: &str = "I'm really sorry you're feeling this way. \
I'm not equipped to handle emergencies. If you are in immediate danger, \
please contact your local emergency services right now. \
If you can, call a crisis hotline or a trusted person and seek help.";

pub fn is_crisis(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crisis_detection() {
        assert!(is_crisis("I think I'll kill myself"));
        assert!(is_crisis("I CAN'T GO ON like this"));
        assert!(!is_crisis("my exam went badly"));
        assert!(!is_crisis(""));
    }

    #[test]
    fn test_crisis_list_is_separate_from_risk_terms() {
        // Blackmail is high risk for the engine but not a crisis shortcut
        assert!(!is_crisis("he is threatening to leak my photos"));
    }
}
