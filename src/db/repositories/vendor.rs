use crate::entities::{prelude::*, vendors};
use crate::models::vendor::{Rating, VendorRecord, VendorSource};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

const APPROVED: &str = "approved";

pub struct VendorRepository {
    conn: DatabaseConnection,
}

impl VendorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Approved listings matching a search. Subcategory matches the dedicated
    /// column first and falls back to a description text match, so listings
    /// without curated subcategories still surface.
    pub async fn search(
        &self,
        category: &str,
        subcategory: Option<&str>,
        city: &str,
        state: &str,
        limit: u64,
    ) -> Result<Vec<vendors::Model>> {
        let mut query = Vendors::find()
            .filter(vendors::Column::Status.eq(APPROVED))
            .filter(vendors::Column::Category.eq(category))
            .filter(vendors::Column::City.contains(city))
            .filter(vendors::Column::State.contains(state));

        if let Some(sub) = subcategory
            && !sub.is_empty()
        {
            query = query.filter(
                Condition::any()
                    .add(vendors::Column::Subcategory.eq(sub))
                    .add(vendors::Column::Description.contains(sub)),
            );
        }

        query
            .order_by_desc(vendors::Column::RatingValue)
            .limit(limit)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn list(
        &self,
        category: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<Vec<vendors::Model>> {
        let mut query = Vendors::find().filter(vendors::Column::Status.eq(APPROVED));

        if let Some(category) = category {
            query = query.filter(vendors::Column::Category.eq(category));
        }
        if let Some(city) = city {
            query = query.filter(vendors::Column::City.contains(city));
        }
        if let Some(state) = state {
            query = query.filter(vendors::Column::State.contains(state));
        }

        query
            .order_by_asc(vendors::Column::BusinessName)
            .limit(limit)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn add(&self, vendor: vendors::ActiveModel) -> Result<i32> {
        let result = Vendors::insert(vendor).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn count(&self) -> Result<u64> {
        Vendors::find().count(&self.conn).await.map_err(Into::into)
    }
}

/// Build an insertable approved listing. Used by seeding and tests.
#[must_use]
pub fn approved_listing(
    business_name: &str,
    category: &str,
    subcategory: Option<&str>,
    city: &str,
    state: &str,
) -> vendors::ActiveModel {
    vendors::ActiveModel {
        business_name: Set(business_name.to_string()),
        category: Set(category.to_string()),
        subcategory: Set(subcategory.map(String::from)),
        city: Set(city.to_string()),
        state: Set(state.to_string()),
        status: Set(APPROVED.to_string()),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    }
}

impl From<vendors::Model> for VendorRecord {
    fn from(row: vendors::Model) -> Self {
        let rating = match (row.rating_value, row.rating_count) {
            (Some(value), count) => {
                Rating::new(value, count.and_then(|c| u32::try_from(c).ok()).unwrap_or(0))
            }
            _ => None,
        };

        Self {
            name: row.business_name,
            category: row.category,
            subcategory: row.subcategory,
            description: row.description,
            address: row.address,
            city: row.city,
            state: row.state,
            phone: row.phone,
            email: row.email,
            website: row.website,
            instagram_handle: row.instagram_handle,
            rating,
            place_id: None,
            rank: 0,
            source: VendorSource::Local,
        }
    }
}
