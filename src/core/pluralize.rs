//! Envelope key pluralization
//!
//! Collection envelopes carry the records under the plural entity name
//! (`{"success": true, "vacancies": [...]}`). Entity names are camelCase,
//! so only the last word is inflected.

/// Converts singular entity names to the plural envelope key
pub struct Pluralizer;

impl Pluralizer {
    /// Pluralize a camelCase entity name
    ///
    /// # Examples
    ///
    /// ```
    /// use hrms::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("applicant"), "applicants");
    /// assert_eq!(Pluralizer::pluralize("vacancy"), "vacancies");
    /// assert_eq!(Pluralizer::pluralize("vacancyRequest"), "vacancyRequests");
    /// assert_eq!(Pluralizer::pluralize("staffAddress"), "staffAddresses");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        let split = singular
            .char_indices()
            .filter(|(_, c)| c.is_ascii_uppercase())
            .map(|(i, _)| i)
            .last()
            .unwrap_or(0);
        let (head, word) = singular.split_at(split);
        format!("{}{}", head, Self::pluralize_word(word))
    }

    fn pluralize_word(word: &str) -> String {
        if word.is_empty() {
            return String::new();
        }
        let lower = word.to_ascii_lowercase();

        match lower.as_str() {
            "person" => return Self::keep_case(word, "people"),
            "staff" | "personnel" | "faculty" => return word.to_string(),
            _ => {}
        }

        let stem_len = word.len() - 1;
        if lower.ends_with('y') && word.len() > 1 {
            let before = lower.as_bytes()[word.len() - 2];
            if !matches!(before, b'a' | b'e' | b'i' | b'o' | b'u') {
                return format!("{}ies", &word[..stem_len]);
            }
        }

        if ["s", "sh", "ch", "x", "z"].iter().any(|end| lower.ends_with(end)) {
            return format!("{}es", word);
        }

        format!("{}s", word)
    }

    fn keep_case(original: &str, replacement: &str) -> String {
        if original.starts_with(|c: char| c.is_ascii_uppercase()) {
            let mut chars = replacement.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        } else {
            replacement.to_string()
        }
    }
}
