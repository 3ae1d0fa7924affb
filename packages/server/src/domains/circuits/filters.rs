//! List filters, parsed from query parameters.
//!
//! Repeated keys are OR-ed (`provider=a&provider=b`), distinct keys are
//! AND-ed. Unknown keys are ignored.

use serde::Serialize;

use crate::common::FormData;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderFilter {
    /// Case-insensitive substring of name, account or comments
    pub q: Option<String>,
    pub asn: Option<i64>,
    /// Site slugs where the provider has a circuit placed or terminated
    pub site: Vec<String>,
}

impl ProviderFilter {
    pub fn from_params(params: &FormData) -> Self {
        Self {
            q: params.get("q").map(str::to_string),
            asn: params.get("asn").and_then(|v| v.parse().ok()),
            site: owned(params.get_all("site")),
        }
    }

    pub fn is_active(&self) -> bool {
        self != &Self::default()
    }

    pub fn matches_text(&self, haystacks: &[&str]) -> bool {
        matches_q(self.q.as_deref(), haystacks)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CircuitFilter {
    /// Case-insensitive substring of cid, description or comments
    pub q: Option<String>,
    pub provider: Vec<String>,
    #[serde(rename = "type")]
    pub circuit_type: Vec<String>,
    pub tenant: Vec<String>,
    pub site: Vec<String>,
}

impl CircuitFilter {
    pub fn from_params(params: &FormData) -> Self {
        Self {
            q: params.get("q").map(str::to_string),
            provider: owned(params.get_all("provider")),
            circuit_type: owned(params.get_all("type")),
            tenant: owned(params.get_all("tenant")),
            site: owned(params.get_all("site")),
        }
    }

    pub fn is_active(&self) -> bool {
        self != &Self::default()
    }

    pub fn matches_text(&self, haystacks: &[&str]) -> bool {
        matches_q(self.q.as_deref(), haystacks)
    }
}

/// Empty `wanted` means "no constraint".
pub fn slug_matches(wanted: &[String], slug: Option<&str>) -> bool {
    wanted.is_empty() || slug.is_some_and(|s| wanted.iter().any(|w| w == s))
}

fn matches_q(q: Option<&str>, haystacks: &[&str]) -> bool {
    match q {
        None => true,
        Some(q) => {
            let needle = q.to_lowercase();
            haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
        }
    }
}

fn owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

/// SQL `ILIKE` pattern for a free-text query, with wildcards escaped.
pub fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_circuit_filter_collects_repeated_keys() {
        let filter = CircuitFilter::from_params(&params(&[
            ("provider", "acme"),
            ("provider", "zayo"),
            ("type", "transit"),
            ("page", "2"),
        ]));
        assert_eq!(filter.provider, vec!["acme", "zayo"]);
        assert_eq!(filter.circuit_type, vec!["transit"]);
        assert!(filter.tenant.is_empty());
        assert!(filter.is_active());
    }

    #[test]
    fn test_empty_params_are_inactive() {
        assert!(!ProviderFilter::from_params(&params(&[("q", "")])).is_active());
    }

    #[test]
    fn test_bad_asn_is_ignored() {
        let filter = ProviderFilter::from_params(&params(&[("asn", "AS65000")]));
        assert_eq!(filter.asn, None);
    }

    #[test]
    fn test_text_match_is_case_insensitive() {
        let filter = ProviderFilter {
            q: Some("ACME".to_string()),
            ..Default::default()
        };
        assert!(filter.matches_text(&["Acme Networks", ""]));
        assert!(!filter.matches_text(&["Zayo"]));
    }

    #[test]
    fn test_slug_matching() {
        let wanted = vec!["dc1".to_string()];
        assert!(slug_matches(&[], None));
        assert!(slug_matches(&wanted, Some("dc1")));
        assert!(!slug_matches(&wanted, Some("dc2")));
        assert!(!slug_matches(&wanted, None));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("10%_off"), "%10\\%\\_off%");
    }
}
