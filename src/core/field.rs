//! Field value helpers and format validation

use crate::core::error::ConfigError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Identifier carried by a reference field
///
/// Reference fields arrive either as a bare id (`"vac1"`) or populated with
/// the referenced document (`{"_id": "vac1", "position": "..."}`).
pub fn reference_id(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(object) => object.get("_id").and_then(Value::as_str),
        _ => None,
    }
}

/// Whether a field value contains `needle` ignoring case
///
/// `needle` must already be lower-cased. Strings match on substring,
/// numbers on their decimal rendering, arrays if any element matches.
/// Everything else never matches.
pub fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|item| contains_text(item, needle)),
        _ => false,
    }
}

/// Field format validators for edits
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Url,
    Phone,
    Custom(Regex),
}

impl FieldFormat {
    /// Parse a format name from configuration
    ///
    /// Accepts `email`, `url`, `phone` or `regex:<pattern>`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        match spec {
            "email" => Ok(FieldFormat::Email),
            "url" => Ok(FieldFormat::Url),
            "phone" => Ok(FieldFormat::Phone),
            s if s.starts_with("regex:") => {
                let pattern = &s["regex:".len()..];
                Regex::new(pattern)
                    .map(FieldFormat::Custom)
                    .map_err(|e| ConfigError::Invalid {
                        field: "formats".to_string(),
                        message: format!("bad pattern '{}': {}", pattern, e),
                    })
            }
            other => Err(ConfigError::Invalid {
                field: "formats".to_string(),
                message: format!("unknown format '{}'", other),
            }),
        }
    }

    /// Validate a field value against this format
    ///
    /// `null` passes so a field can still be cleared.
    pub fn validate(&self, value: &Value) -> bool {
        let string_value = match value {
            Value::Null => return true,
            Value::String(s) => s.as_str(),
            _ => return false,
        };

        match self {
            FieldFormat::Email => Self::is_valid_email(string_value),
            FieldFormat::Url => Self::is_valid_url(string_value),
            FieldFormat::Phone => Self::is_valid_phone(string_value),
            FieldFormat::Custom(regex) => regex.is_match(string_value),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FieldFormat::Email => "must be a valid email address",
            FieldFormat::Url => "must be a valid http(s) URL",
            FieldFormat::Phone => "must be a valid phone number",
            FieldFormat::Custom(_) => "has an invalid format",
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
                .expect("email pattern is valid")
        });
        regex.is_match(email)
    }

    fn is_valid_url(url: &str) -> bool {
        static URL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = URL_REGEX.get_or_init(|| {
            Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("url pattern is valid")
        });
        regex.is_match(url)
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PHONE_REGEX.get_or_init(|| {
            // spaces and dashes are common in staff records
            Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").expect("phone pattern is valid")
        });
        regex.is_match(phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_id_shapes() {
        assert_eq!(reference_id(&json!("vac2")), Some("vac2"));
        assert_eq!(
            reference_id(&json!({"_id": "vac2", "position": "Registrar"})),
            Some("vac2")
        );
        assert_eq!(reference_id(&json!({"position": "Registrar"})), None);
        assert_eq!(reference_id(&json!(42)), None);
    }

    #[test]
    fn test_contains_text() {
        assert!(contains_text(&json!("Jane Doe"), "jane"));
        assert!(contains_text(&json!(2024), "202"));
        assert!(contains_text(&json!(["Physics", "Maths"]), "math"));
        assert!(!contains_text(&json!(null), "jane"));
        assert!(!contains_text(&json!({"name": "jane"}), "jane"));
    }

    #[test]
    fn test_email_validation() {
        let format = FieldFormat::Email;
        assert!(format.validate(&json!("registrar@uni.ac.uk")));
        assert!(!format.validate(&json!("registrar")));
        assert!(!format.validate(&json!(12)));
        assert!(format.validate(&json!(null)));
    }

    #[test]
    fn test_phone_validation() {
        let format = FieldFormat::Phone;
        assert!(format.validate(&json!("+44 20 7946 0958")));
        assert!(format.validate(&json!("0712345678")));
        assert!(!format.validate(&json!("123")));
    }

    #[test]
    fn test_url_validation() {
        let format = FieldFormat::Url;
        assert!(format.validate(&json!("https://cv.example.com/jane.pdf")));
        assert!(!format.validate(&json!("not a url")));
    }

    #[test]
    fn test_parse_formats() {
        assert!(matches!(FieldFormat::parse("email"), Ok(FieldFormat::Email)));
        let custom = FieldFormat::parse(r"regex:^EMP\d{4}$").unwrap();
        assert!(custom.validate(&json!("EMP0042")));
        assert!(!custom.validate(&json!("emp42")));
        assert!(FieldFormat::parse("postcode").is_err());
        assert!(FieldFormat::parse("regex:(").is_err());
    }
}
