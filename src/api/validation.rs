use super::ApiError;
use crate::models::query::{QueryError, SearchQuery};

pub fn validate_search_query(query: &SearchQuery) -> Result<(), ApiError> {
    query.validate().map_err(|e: QueryError| {
        // Missing required fields are fatal to this request only.
        ApiError::validation(e.to_string())
    })
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 200;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between {} and {}",
            limit, MIN_LIMIT, MAX_LIMIT
        )));
    }
    Ok(limit)
}

pub fn validate_state(state: &str) -> Result<&str, ApiError> {
    let trimmed = state.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("State cannot be empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_search_query() {
        let good = SearchQuery {
            category: "photographers".into(),
            city: "Dallas".into(),
            state: "TX".into(),
            subcategory: None,
        };
        assert!(validate_search_query(&good).is_ok());

        let bad = SearchQuery {
            category: String::new(),
            ..good
        };
        assert!(validate_search_query(&bad).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(200).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(201).is_err());
    }

    #[test]
    fn test_validate_state() {
        assert_eq!(validate_state(" TX ").unwrap(), "TX");
        assert!(validate_state("   ").is_err());
    }
}
