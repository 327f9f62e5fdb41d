use reqwest::Client;
use serde::Deserialize;

use super::ProviderError;

/// Third-party Instagram profile search (RapidAPI-hosted).
const INSTAGRAM_API: &str = "https://instagram-profile-search.p.rapidapi.com";
const RAPIDAPI_HOST: &str = "instagram-profile-search.p.rapidapi.com";

#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            base_url: INSTAGRAM_API.to_string(),
            api_key: String::new(),
        }
    }
}

/// Instagram profile search used by the ingest pipeline. Like the maps
/// client, it performs a single HTTP call per invocation and leaves retries
/// to the caller.
#[derive(Clone)]
pub struct InstagramClient {
    client: Client,
    config: InstagramConfig,
}

/// One profile hit. Optional everywhere for the same schema-drift reason as
/// the maps listings.
#[derive(Debug, Clone, Deserialize)]
pub struct InstagramProfile {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub follower_count: Option<i64>,
    #[serde(default)]
    pub is_business: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    users: Option<Vec<InstagramProfile>>,
}

impl InstagramClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: InstagramConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    /// Keyword search over public profiles. Zero hits is success.
    pub async fn search_profiles(
        &self,
        keyword: &str,
    ) -> Result<Vec<InstagramProfile>, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::Disabled);
        }

        let url = format!(
            "{}/search?query={}",
            self.config.base_url,
            urlencoding::encode(keyword)
        );

        tracing::debug!(keyword, "instagram profile search");

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        let payload: SearchPayload = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(payload.users.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_profiles() {
        let json = r#"{
            "users": [
                {
                    "username": "goldenhourdallas",
                    "full_name": "Golden Hour | Dallas Weddings",
                    "biography": "Wedding photographer in Dallas, TX\ngoldenhour@example.com",
                    "external_url": "https://goldenhour.example.com",
                    "follower_count": 12400,
                    "is_business": true,
                    "unknown_field": [1, 2, 3]
                },
                {"username": "minimal"}
            ]
        }"#;

        let payload: SearchPayload = serde_json::from_str(json).unwrap();
        let users = payload.users.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "goldenhourdallas");
        assert_eq!(users[0].follower_count, Some(12_400));
        assert!(users[1].biography.is_none());
    }

    #[test]
    fn test_decode_missing_users_is_empty() {
        let payload: SearchPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.users.is_none());
    }

    #[test]
    fn test_unconfigured_client() {
        let client =
            InstagramClient::with_shared_client(reqwest::Client::new(), InstagramConfig::default());
        assert!(!client.is_configured());
    }
}
