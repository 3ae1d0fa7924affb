use chrono::NaiveDate;

use super::{FormErrors, INVALID_CHOICE, REQUIRED};
use crate::common::{FormData, Id};

pub const SLUG_MAX_LEN: usize = 50;

/// Typed accessors over submitted form data that record a message for every
/// field that fails to parse.
///
/// ```rust,ignore
/// let mut fields = Fields::new(&data);
/// let name = fields.required_str("name", 50);
/// let slug = fields.slug("slug");
/// let input = fields.finish(CircuitTypeInput { name, slug })?;
/// ```
pub struct Fields<'a> {
    data: &'a FormData,
    errors: FormErrors,
}

impl<'a> Fields<'a> {
    pub fn new(data: &'a FormData) -> Self {
        Self {
            data,
            errors: FormErrors::new(),
        }
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.has(field)
    }

    pub fn raw(&self, field: &str) -> Option<&'a str> {
        self.data.get(field)
    }

    pub fn required_str(&mut self, field: &str, max_len: usize) -> String {
        match self.data.get(field) {
            Some(value) => self.check_length(field, value, max_len),
            None => {
                self.error(field, REQUIRED);
                String::new()
            }
        }
    }

    /// Blank input becomes an empty string.
    pub fn optional_str(&mut self, field: &str, max_len: usize) -> String {
        match self.data.get(field) {
            Some(value) => self.check_length(field, value, max_len),
            None => String::new(),
        }
    }

    fn check_length(&mut self, field: &str, value: &str, max_len: usize) -> String {
        let len = value.chars().count();
        if len > max_len {
            self.error(
                field,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max_len, len
                ),
            );
        }
        value.to_string()
    }

    pub fn slug(&mut self, field: &str) -> String {
        let slug = self.required_str(field, SLUG_MAX_LEN);
        if !slug.is_empty() && !is_valid_slug(&slug) {
            self.error(
                field,
                "Enter a valid 'slug' consisting of lowercase letters, numbers, underscores or hyphens.",
            );
        }
        slug
    }

    pub fn optional_int(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        let raw = self.data.get(field)?;
        let value = match raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.error(field, "Enter a whole number.");
                return None;
            }
        };
        if value < min {
            self.error(
                field,
                format!("Ensure this value is greater than or equal to {}.", min),
            );
            return None;
        }
        if value > max {
            self.error(
                field,
                format!("Ensure this value is less than or equal to {}.", max),
            );
            return None;
        }
        Some(value)
    }

    /// `None` means the field was missing or invalid; the error is recorded.
    pub fn required_int(&mut self, field: &str, min: i64, max: i64) -> Option<i64> {
        if self.data.get(field).is_none() {
            self.error(field, REQUIRED);
            return None;
        }
        self.optional_int(field, min, max)
    }

    /// `YYYY-MM-DD`
    pub fn optional_date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.data.get(field)?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.error(field, "Enter a valid date.");
                None
            }
        }
    }

    /// Absolute `http`/`https` URL, or blank.
    pub fn optional_url(&mut self, field: &str, max_len: usize) -> String {
        let value = self.optional_str(field, max_len);
        if value.is_empty() {
            return value;
        }
        match url::Url::parse(&value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => value,
            _ => {
                self.error(field, "Enter a valid URL.");
                value
            }
        }
    }

    pub fn optional_id<T>(&mut self, field: &str) -> Option<Id<T>> {
        let raw = self.data.get(field)?;
        match Id::parse(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                self.error(field, INVALID_CHOICE);
                None
            }
        }
    }

    pub fn required_id<T>(&mut self, field: &str) -> Option<Id<T>> {
        if self.data.get(field).is_none() {
            self.error(field, REQUIRED);
            return None;
        }
        self.optional_id(field)
    }

    pub fn into_errors(self) -> FormErrors {
        self.errors
    }

    pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        self.errors.finish(value)
    }
}

/// Non-empty, at most 50 chars of `[a-z0-9_-]`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.chars().count() <= SLUG_MAX_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ProviderId;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("acme-transit_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Acme"));
        assert!(!is_valid_slug("acme transit"));
        assert!(!is_valid_slug(&"a".repeat(51)));
    }

    #[test]
    fn test_required_and_length() {
        let form = data(&[("name", "x".repeat(60).as_str())]);
        let mut fields = Fields::new(&form);
        fields.required_str("name", 50);
        fields.required_str("slug", 50);
        let errors = fields.into_errors();
        assert_eq!(
            errors.get("name"),
            ["Ensure this value has at most 50 characters (it has 60)."]
        );
        assert_eq!(errors.get("slug"), [REQUIRED]);
    }

    #[test]
    fn test_integer_range() {
        let form = data(&[("asn", "0"), ("rate", "abc"), ("ok", "65000")]);
        let mut fields = Fields::new(&form);
        assert_eq!(fields.optional_int("asn", 1, 4_294_967_295), None);
        assert_eq!(fields.optional_int("rate", 0, i64::MAX), None);
        assert_eq!(fields.optional_int("ok", 1, 4_294_967_295), Some(65000));
        assert_eq!(fields.optional_int("missing", 1, 10), None);
        let errors = fields.into_errors();
        assert!(errors.has("asn"));
        assert_eq!(errors.get("rate"), ["Enter a whole number."]);
        assert!(!errors.has("missing"));
    }

    #[test]
    fn test_date_and_url() {
        let form = data(&[
            ("good", "2016-03-01"),
            ("bad", "03/01/2016"),
            ("portal", "ftp://example.com"),
        ]);
        let mut fields = Fields::new(&form);
        assert_eq!(
            fields.optional_date("good"),
            NaiveDate::from_ymd_opt(2016, 3, 1)
        );
        assert_eq!(fields.optional_date("bad"), None);
        fields.optional_url("portal", 200);
        let errors = fields.into_errors();
        assert_eq!(errors.get("bad"), ["Enter a valid date."]);
        assert_eq!(errors.get("portal"), ["Enter a valid URL."]);
    }

    #[test]
    fn test_id_choice() {
        let id = ProviderId::new();
        let form = data(&[("provider", &id.to_string()), ("other", "nope")]);
        let mut fields = Fields::new(&form);
        assert_eq!(fields.required_id::<crate::common::Provider>("provider"), Some(id));
        assert_eq!(fields.optional_id::<crate::common::Provider>("other"), None);
        assert_eq!(fields.into_errors().get("other"), [INVALID_CHOICE]);
    }
}
