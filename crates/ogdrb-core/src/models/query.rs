//! Export selections: which countries (and US states) to download.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::repeater::Repeater;

/// Alpha-2 code of the only country whose directory requires per-state queries.
pub const US_COUNTRY_CODE: &str = "US";

/// Name RepeaterBook uses for the US in repeater records.
pub const US_COUNTRY_NAME: &str = "United States";

/// Countries served by the North American export endpoint.
const NORTH_AMERICA: [(&str, &str); 3] = [
    ("US", US_COUNTRY_NAME),
    ("CA", "Canada"),
    ("MX", "Mexico"),
];

/// A country as RepeaterBook names it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
    /// Name used by the directory, both in query parameters and in records.
    pub name: String,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into().to_uppercase(),
            name: name.into(),
        }
    }

    pub fn united_states() -> Self {
        Self::new(US_COUNTRY_CODE, US_COUNTRY_NAME)
    }

    /// Parse `"US"`, `"CA"`, `"MX"` or `"CODE:Name"` (e.g. `"BR:Brazil"`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some((code, name)) = s.split_once(':') {
            let (code, name) = (code.trim(), name.trim());
            if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) && !name.is_empty() {
                return Some(Self::new(code, name));
            }
            return None;
        }
        NORTH_AMERICA
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(s))
            .map(|(code, name)| Self::new(*code, *name))
    }

    pub fn is_united_states(&self) -> bool {
        self.code == US_COUNTRY_CODE
    }

    /// Whether the country is served by `export.php` rather than `exportROW.php`.
    pub fn is_north_america(&self) -> bool {
        NORTH_AMERICA.iter().any(|(code, _)| *code == self.code)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// One download request against the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportQuery {
    pub countries: BTreeSet<Country>,
    pub state_ids: BTreeSet<String>,
}

impl ExportQuery {
    pub fn new(countries: impl IntoIterator<Item = Country>) -> Self {
        Self {
            countries: countries.into_iter().collect(),
            state_ids: BTreeSet::new(),
        }
    }

    pub fn with_state_ids(mut self, state_ids: impl IntoIterator<Item = String>) -> Self {
        self.state_ids = state_ids.into_iter().collect();
        self
    }

    pub fn includes_us(&self) -> bool {
        self.countries.iter().any(Country::is_united_states)
    }

    /// Region restriction matching this selection in the local store.
    pub fn region_filter(&self, us_state_ids: &BTreeSet<String>) -> RegionFilter {
        RegionFilter {
            country_names: self.countries.iter().map(|c| c.name.clone()).collect(),
            us_state_ids: us_state_ids.clone(),
        }
    }
}

/// Country/state restriction applied to stored repeaters.
///
/// Empty sets do not restrict. US state ids only narrow US records; other
/// countries pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFilter {
    pub country_names: BTreeSet<String>,
    pub us_state_ids: BTreeSet<String>,
}

impl RegionFilter {
    pub fn matches(&self, repeater: &Repeater) -> bool {
        if !self.country_names.is_empty() && !self.country_names.contains(&repeater.country) {
            return false;
        }
        if !self.us_state_ids.is_empty()
            && repeater.country == US_COUNTRY_NAME
            && !self.us_state_ids.contains(&repeater.state_id)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RepeaterBuilder;

    #[test]
    fn test_country_parse() {
        assert_eq!(Country::parse("us"), Some(Country::united_states()));
        assert_eq!(Country::parse("CA"), Some(Country::new("CA", "Canada")));
        assert_eq!(Country::parse("BR:Brazil"), Some(Country::new("BR", "Brazil")));
        assert_eq!(Country::parse("br: Brazil").map(|c| c.code), Some("BR".to_string()));
        assert_eq!(Country::parse("BR"), None);
        assert_eq!(Country::parse("BRA:Brazil"), None);
        assert_eq!(Country::parse("BR:"), None);
    }

    #[test]
    fn test_country_endpoint_family() {
        assert!(Country::united_states().is_north_america());
        assert!(Country::new("MX", "Mexico").is_north_america());
        assert!(!Country::new("DE", "Germany").is_north_america());
    }

    #[test]
    fn test_region_filter() {
        let query = ExportQuery::new([Country::united_states(), Country::new("CA", "Canada")]);
        let filter = query.region_filter(&BTreeSet::from(["06".to_string()]));

        let california = RepeaterBuilder::new(1).country(US_COUNTRY_NAME).state_id("06").build();
        let new_york = RepeaterBuilder::new(2).country(US_COUNTRY_NAME).state_id("36").build();
        let ontario = RepeaterBuilder::new(3).country("Canada").state_id("ON").build();
        let berlin = RepeaterBuilder::new(4).country("Germany").state_id("BE").build();

        assert!(filter.matches(&california));
        assert!(!filter.matches(&new_york));
        assert!(filter.matches(&ontario));
        assert!(!filter.matches(&berlin));

        assert!(RegionFilter::default().matches(&berlin));
    }
}
