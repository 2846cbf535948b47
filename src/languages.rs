/// Review languages fetched by default, as `(hreflang, name)` pairs.
///
/// English is left out: it is the canonical page itself.
pub const TARGET_LANGUAGES: &[(&str, &str)] = &[
    ("it", "Italian"),
    ("de", "German"),
    ("es", "Spanish"),
    ("fa", "Persian"),
    ("ps", "Pashto"),
    ("ur", "Urdu"),
    ("nl", "Dutch"),
    ("tr", "Turkish"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
    ("pt", "Portuguese"),
    ("fr", "French"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("no", "Norwegian"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("sv", "Swedish"),
    ("cs", "Czech"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("uk", "Ukrainian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("el", "Greek"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
];

pub fn default_target_codes() -> Vec<String> {
    TARGET_LANGUAGES
        .iter()
        .map(|(code, _)| (*code).to_owned())
        .collect()
}

pub fn language_name(code: &str) -> Option<&'static str> {
    TARGET_LANGUAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// Whether `code` can be used as a directory name (`de`, `zh-Hant`, ...).
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 16
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_exclude_english() {
        let codes = default_target_codes();
        assert_eq!(codes.len(), TARGET_LANGUAGES.len());
        assert!(!codes.iter().any(|c| c == "en"));
        assert_eq!(language_name("nl"), Some("Dutch"));
        assert_eq!(language_name("en"), None);
    }

    #[test]
    fn codes_must_be_plain_segments() {
        assert!(is_valid_code("zh-Hant"));
        assert!(!is_valid_code("../etc"));
        assert!(!is_valid_code(""));
    }
}
