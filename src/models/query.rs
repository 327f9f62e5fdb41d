use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel stored in `subcategory_key` when no subcategory was requested.
/// Concrete values carry an `s=` prefix, so no user-supplied subcategory
/// (including the empty string, which becomes `s=`) can collide with it.
const NO_SUBCATEGORY: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Canonicalize one cache-key component.
///
/// This is the single normalization function shared by every producer and
/// consumer of cache keys: lowercase, trim, collapse whitespace, keep only
/// alphanumerics, hyphens and apostrophes.
#[must_use]
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for c in input.trim().chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_alphanumeric() || c == '-' || c == '\'' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        }
    }

    out
}

/// The tuple identifying one cacheable search. All components are stored in
/// normalized form; construct through [`SearchQuery::cache_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: String,
    pub city: String,
    pub state: String,
    pub subcategory: Option<String>,
}

impl CacheKey {
    /// The NOT NULL column value backing the unique index. SQLite treats NULLs
    /// as distinct in unique indexes, so the nullable display column cannot be
    /// part of the key.
    #[must_use]
    pub fn subcategory_key(&self) -> String {
        self.subcategory
            .as_ref()
            .map_or_else(|| NO_SUBCATEGORY.to_string(), |s| format!("s={s}"))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}, {}", self.category, self.city, self.state)?;
        if let Some(sub) = &self.subcategory {
            write!(f, " ({sub})")?;
        }
        Ok(())
    }
}

/// An incoming vendor search. `subcategory: Some("")` and `None` are kept
/// distinct end to end; the original directory conflated the two and grew
/// duplicate cache rows out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub category: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.category.trim().is_empty() {
            return Err(QueryError::MissingField("category"));
        }
        if self.city.trim().is_empty() {
            return Err(QueryError::MissingField("city"));
        }
        if self.state.trim().is_empty() {
            return Err(QueryError::MissingField("state"));
        }
        Ok(())
    }

    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            category: normalize(&self.category),
            city: normalize(&self.city),
            state: normalize(&self.state),
            subcategory: self.subcategory.as_deref().map(normalize),
        }
    }

    /// The keyword sent to the business-listing provider. Subcategory goes
    /// first for better targeting when present.
    #[must_use]
    pub fn provider_keyword(&self) -> String {
        match self.subcategory.as_deref().map(str::trim) {
            Some(sub) if !sub.is_empty() => {
                format!("{} {} in {} {}", sub, self.category, self.city, self.state)
            }
            _ => format!("{} in {} {}", self.category, self.city, self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Wedding   Photographers "), "wedding photographers");
        assert_eq!(normalize("Dallas"), "dallas");
        assert_eq!(normalize("Coeur d'Alene"), "coeur d'alene");
        assert_eq!(normalize("St. Paul!"), "st paul");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_cache_key_normalized_identically() {
        let a = SearchQuery {
            category: "Photographers".into(),
            city: " Dallas ".into(),
            state: "TX".into(),
            subcategory: None,
        };
        let b = SearchQuery {
            category: "photographers".into(),
            city: "dallas".into(),
            state: "tx".into(),
            subcategory: None,
        };
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_subcategory_key_sentinel_is_unambiguous() {
        let base = SearchQuery {
            category: "photographers".into(),
            city: "dallas".into(),
            state: "tx".into(),
            subcategory: None,
        };

        let none = base.cache_key();
        let empty = SearchQuery { subcategory: Some(String::new()), ..base.clone() }.cache_key();
        let wedding = SearchQuery { subcategory: Some("wedding".into()), ..base.clone() }.cache_key();
        let dash = SearchQuery { subcategory: Some("-".into()), ..base }.cache_key();

        assert_eq!(none.subcategory_key(), "-");
        assert_eq!(empty.subcategory_key(), "s=");
        assert_eq!(wedding.subcategory_key(), "s=wedding");
        assert_eq!(dash.subcategory_key(), "s=-");

        let keys = [
            none.subcategory_key(),
            empty.subcategory_key(),
            wedding.subcategory_key(),
            dash.subcategory_key(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_validate_missing_fields() {
        let query = SearchQuery {
            category: String::new(),
            city: "Dallas".into(),
            state: "TX".into(),
            subcategory: None,
        };
        assert!(matches!(query.validate(), Err(QueryError::MissingField("category"))));

        let query = SearchQuery {
            category: "photographers".into(),
            city: "  ".into(),
            state: "TX".into(),
            subcategory: None,
        };
        assert!(matches!(query.validate(), Err(QueryError::MissingField("city"))));
    }

    #[test]
    fn test_provider_keyword() {
        let query = SearchQuery {
            category: "photographers".into(),
            city: "Dallas".into(),
            state: "TX".into(),
            subcategory: Some("wedding".into()),
        };
        assert_eq!(query.provider_keyword(), "wedding photographers in Dallas TX");

        let query = SearchQuery { subcategory: None, ..query };
        assert_eq!(query.provider_keyword(), "photographers in Dallas TX");
    }
}
