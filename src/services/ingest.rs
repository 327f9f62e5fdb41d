use std::sync::Arc;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use sea_orm::Set;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clients::instagram::InstagramProfile;
use crate::clients::{InstagramClient, RetryPolicy};
use crate::db::Store;
use crate::entities::social_vendors;
use crate::models::query::normalize;

/// A profile has to mention at least one of these somewhere to be worth
/// keeping in a wedding directory.
const WEDDING_KEYWORDS: &[&str] = &[
    "wedding", "bride", "bridal", "groom", "marriage", "elopement", "engaged", "engagement",
];

/// Consolidates contact-extraction regexes to avoid per-call compilation.
struct ContactRegex {
    email: Regex,
    phone: Regex,
}

impl ContactRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<ContactRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").ok()?,
                    phone: Regex::new(r"\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}").ok()?,
                })
            })
            .as_ref()
    }
}

fn extract_email(text: &str) -> Option<String> {
    let re = ContactRegex::get()?;
    re.email.find(text).map(|m| m.as_str().to_string())
}

fn extract_phone(text: &str) -> Option<String> {
    let re = ContactRegex::get()?;
    re.phone.find(text).map(|m| m.as_str().to_string())
}

fn mentions_weddings(profile: &InstagramProfile) -> bool {
    let haystack = format!(
        "{} {}",
        profile.full_name.as_deref().unwrap_or_default(),
        profile.biography.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    WEDDING_KEYWORDS.iter().any(|k| haystack.contains(k))
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IngestSummary {
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
}

/// Collects Instagram vendor profiles for one (category, city, state) and
/// upserts them into the social vendors table.
pub struct IngestService {
    store: Store,
    instagram: Arc<InstagramClient>,
    retry: RetryPolicy,
}

impl IngestService {
    #[must_use]
    pub const fn new(store: Store, instagram: Arc<InstagramClient>, retry: RetryPolicy) -> Self {
        Self {
            store,
            instagram,
            retry,
        }
    }

    pub async fn ingest(&self, category: &str, city: &str, state: &str) -> Result<IngestSummary> {
        let keyword = format!("{city} {state} wedding {category}");
        info!(keyword, "collecting Instagram profiles");

        let profiles = self
            .retry
            .run(|| self.instagram.search_profiles(&keyword))
            .await
            .map_err(|e| anyhow::anyhow!("profile search failed: {e}"))?;

        let category = normalize(category);
        let mut summary = IngestSummary::default();
        let fetched_at = chrono::Utc::now().to_rfc3339();

        for profile in profiles {
            if profile.username.trim().is_empty() || !mentions_weddings(&profile) {
                summary.skipped += 1;
                continue;
            }

            let bio = profile.biography.clone().unwrap_or_default();
            let email = extract_email(&bio);
            let phone = extract_phone(&bio);
            let has_contact_info =
                email.is_some() || phone.is_some() || profile.external_url.is_some();

            let model = social_vendors::ActiveModel {
                instagram_handle: Set(profile.username.trim().to_lowercase()),
                business_name: Set(profile
                    .full_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| profile.username.clone())),
                bio: Set(profile.biography.clone()),
                category: Set(category.clone()),
                subcategory: Set(None),
                city: Set(city.trim().to_string()),
                state: Set(state.trim().to_string()),
                phone: Set(phone),
                email: Set(email),
                website_url: Set(profile.external_url.clone()),
                profile_image_url: Set(profile.profile_pic_url.clone()),
                follower_count: Set(profile
                    .follower_count
                    .and_then(|c| i32::try_from(c).ok())),
                has_contact_info: Set(has_contact_info),
                fetched_at: Set(fetched_at.clone()),
                ..Default::default()
            };

            match self.store.upsert_social_vendor(model).await {
                Ok(true) => summary.inserted += 1,
                Ok(false) => summary.updated += 1,
                Err(e) => {
                    summary.skipped += 1;
                    warn!(handle = %profile.username, "failed to upsert profile: {e}");
                }
            }
        }

        debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            "ingest complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_email() {
        assert_eq!(
            extract_email("Bookings: hello@studio.example.com \u{1f4f7}"),
            Some("hello@studio.example.com".to_string())
        );
        assert_eq!(extract_email("no contact here"), None);
    }

    #[test]
    fn test_extract_phone() {
        assert_eq!(
            extract_phone("Call us (214) 555-0134 for dates"),
            Some("(214) 555-0134".to_string())
        );
        assert_eq!(extract_phone("214.555.0134"), Some("214.555.0134".to_string()));
        assert_eq!(extract_phone("digits 12 34"), None);
    }

    #[test]
    fn test_mentions_weddings() {
        let profile = InstagramProfile {
            username: "studio".into(),
            full_name: Some("Studio".into()),
            biography: Some("Dallas wedding photographer".into()),
            external_url: None,
            profile_pic_url: None,
            follower_count: None,
            is_business: None,
        };
        assert!(mentions_weddings(&profile));

        let profile = InstagramProfile {
            biography: Some("Landscape prints and travel".into()),
            ..profile
        };
        assert!(!mentions_weddings(&profile));
    }
}
