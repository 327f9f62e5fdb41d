use crate::entities::{prelude::*, social_vendors};
use crate::models::vendor::{VendorRecord, VendorSource};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

pub struct SocialVendorRepository {
    conn: DatabaseConnection,
}

impl SocialVendorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn search(
        &self,
        category: &str,
        subcategory: Option<&str>,
        city: &str,
        state: &str,
        limit: u64,
    ) -> Result<Vec<social_vendors::Model>> {
        let mut query = SocialVendors::find()
            .filter(social_vendors::Column::Category.eq(category))
            .filter(social_vendors::Column::City.contains(city))
            .filter(social_vendors::Column::State.contains(state));

        if let Some(sub) = subcategory
            && !sub.is_empty()
        {
            query = query.filter(
                Condition::any()
                    .add(social_vendors::Column::Subcategory.eq(sub))
                    .add(social_vendors::Column::Bio.contains(sub)),
            );
        }

        query
            .order_by_desc(social_vendors::Column::FollowerCount)
            .limit(limit)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Insert-or-update keyed on (instagram_handle, category). Returns true
    /// when the handle was not previously known for the category.
    pub async fn upsert(&self, profile: social_vendors::ActiveModel) -> Result<bool> {
        let handle = match &profile.instagram_handle {
            sea_orm::ActiveValue::Set(h) => h.clone(),
            _ => String::new(),
        };
        let category = match &profile.category {
            sea_orm::ActiveValue::Set(c) => c.clone(),
            _ => String::new(),
        };

        let existed = SocialVendors::find()
            .filter(social_vendors::Column::InstagramHandle.eq(&handle))
            .filter(social_vendors::Column::Category.eq(&category))
            .count(&self.conn)
            .await?
            > 0;

        SocialVendors::insert(profile)
            .on_conflict(
                OnConflict::columns([
                    social_vendors::Column::InstagramHandle,
                    social_vendors::Column::Category,
                ])
                .update_columns([
                    social_vendors::Column::BusinessName,
                    social_vendors::Column::Bio,
                    social_vendors::Column::Subcategory,
                    social_vendors::Column::City,
                    social_vendors::Column::State,
                    social_vendors::Column::Phone,
                    social_vendors::Column::Email,
                    social_vendors::Column::WebsiteUrl,
                    social_vendors::Column::ProfileImageUrl,
                    social_vendors::Column::FollowerCount,
                    social_vendors::Column::HasContactInfo,
                    social_vendors::Column::FetchedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(!existed)
    }

    pub async fn count(&self) -> Result<u64> {
        SocialVendors::find()
            .count(&self.conn)
            .await
            .map_err(Into::into)
    }
}

impl From<social_vendors::Model> for VendorRecord {
    fn from(row: social_vendors::Model) -> Self {
        let website = row.website_url.or_else(|| {
            Some(format!(
                "https://instagram.com/{}",
                row.instagram_handle
            ))
        });

        Self {
            name: row.business_name,
            category: row.category,
            subcategory: row.subcategory,
            description: row.bio,
            address: None,
            city: row.city,
            state: row.state,
            phone: row.phone,
            email: row.email,
            website,
            instagram_handle: Some(row.instagram_handle),
            rating: None,
            place_id: None,
            rank: 0,
            source: VendorSource::Social,
        }
    }
}
