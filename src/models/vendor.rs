use serde::{Deserialize, Serialize};

use super::query::normalize;

/// Where a search result came from. Every [`VendorRecord`] carries exactly one
/// tag so the presentation layer can partition a result list without looking
/// at anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorSource {
    /// Fetched from the business-listing provider (directly or via cache).
    Provider,
    /// A claimed/approved listing from the local vendors table.
    Local,
    /// A collected Instagram profile.
    Social,
}

impl VendorSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Local => "local",
            Self::Social => "social",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub value: f32,
    pub count: u32,
}

impl Rating {
    /// Rating values outside (0, 5] are provider noise and are dropped.
    #[must_use]
    pub fn new(value: f32, count: u32) -> Option<Self> {
        (value > 0.0 && value <= 5.0).then_some(Self { value, count })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRecord {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    /// Position assigned by whichever source produced the record.
    #[serde(default)]
    pub rank: u32,
    pub source: VendorSource,
}

impl VendorRecord {
    /// Stable identity for deduplication: the provider-assigned place id when
    /// present, otherwise normalized name+address.
    #[must_use]
    pub fn identity(&self) -> String {
        if let Some(id) = &self.place_id
            && !id.is_empty()
        {
            return id.clone();
        }

        format!(
            "{}|{}",
            normalize(&self.name),
            normalize(self.address.as_deref().unwrap_or_default())
        )
    }

    /// Case-insensitive match against the record's text fields. Used as the
    /// client-side fallback when the provider cannot filter by subcategory.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let haystacks = [
            Some(self.name.as_str()),
            self.subcategory.as_deref(),
            self.description.as_deref(),
        ];

        haystacks
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, place_id: Option<&str>) -> VendorRecord {
        VendorRecord {
            name: name.to_string(),
            category: "photographers".into(),
            subcategory: None,
            description: None,
            address: Some("123 Main St".into()),
            city: "Dallas".into(),
            state: "TX".into(),
            phone: None,
            email: None,
            website: None,
            instagram_handle: None,
            rating: None,
            place_id: place_id.map(String::from),
            rank: 1,
            source: VendorSource::Provider,
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(4.5, 10).is_some());
        assert!(Rating::new(5.0, 1).is_some());
        assert!(Rating::new(0.0, 10).is_none());
        assert!(Rating::new(5.1, 10).is_none());
        assert!(Rating::new(-1.0, 10).is_none());
    }

    #[test]
    fn test_identity_prefers_place_id() {
        let with_id = record("Studio A", Some("ChIJabc123"));
        assert_eq!(with_id.identity(), "ChIJabc123");

        let without = record("Studio A", None);
        assert_eq!(without.identity(), "studio a|123 main st");

        let empty_id = record("Studio A", Some(""));
        assert_eq!(empty_id.identity(), "studio a|123 main st");
    }

    #[test]
    fn test_matches_text() {
        let mut rec = record("Golden Hour Photography", None);
        rec.description = Some("Fine art wedding photography in Dallas".into());

        assert!(rec.matches_text("wedding"));
        assert!(rec.matches_text("GOLDEN"));
        assert!(!rec.matches_text("videography"));
        assert!(rec.matches_text(""));
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let json = serde_json::to_string(&VendorSource::Social).unwrap();
        assert_eq!(json, "\"social\"");
        let back: VendorSource = serde_json::from_str("\"provider\"").unwrap();
        assert_eq!(back, VendorSource::Provider);
    }
}
