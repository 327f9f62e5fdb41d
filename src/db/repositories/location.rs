use crate::entities::{prelude::*, provider_locations};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// SQLite's bound-parameter limit caps batch inserts.
const INSERT_CHUNK: usize = 200;

pub struct LocationRepository {
    conn: DatabaseConnection,
}

impl LocationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// City lookup; `state` may be a full name or a USPS code.
    pub async fn find_city(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Option<provider_locations::Model>> {
        ProviderLocations::find()
            .filter(provider_locations::Column::LocationType.eq("city"))
            .filter(provider_locations::Column::LocationName.eq(city))
            .filter(
                Condition::any()
                    .add(provider_locations::Column::StateName.eq(state))
                    .add(provider_locations::Column::StateCode.eq(state)),
            )
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_state(&self, state: &str) -> Result<Option<provider_locations::Model>> {
        ProviderLocations::find()
            .filter(provider_locations::Column::LocationType.eq("state"))
            .filter(
                Condition::any()
                    .add(provider_locations::Column::LocationName.eq(state))
                    .add(provider_locations::Column::StateCode.eq(state)),
            )
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn list_states(&self) -> Result<Vec<provider_locations::Model>> {
        ProviderLocations::find()
            .filter(provider_locations::Column::LocationType.eq("state"))
            .order_by_asc(provider_locations::Column::LocationName)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    pub async fn list_cities(&self, state: &str) -> Result<Vec<provider_locations::Model>> {
        ProviderLocations::find()
            .filter(provider_locations::Column::LocationType.eq("city"))
            .filter(
                Condition::any()
                    .add(provider_locations::Column::StateName.eq(state))
                    .add(provider_locations::Column::StateCode.eq(state)),
            )
            .order_by_asc(provider_locations::Column::LocationName)
            .all(&self.conn)
            .await
            .map_err(Into::into)
    }

    /// Replace the whole table with a freshly synced set.
    pub async fn replace_all(
        &self,
        locations: Vec<provider_locations::ActiveModel>,
    ) -> Result<usize> {
        let total = locations.len();

        ProviderLocations::delete_many().exec(&self.conn).await?;

        for chunk in locations.chunks(INSERT_CHUNK) {
            ProviderLocations::insert_many(chunk.to_vec())
                .exec(&self.conn)
                .await?;
        }

        Ok(total)
    }

    /// Timestamp of the stalest row, used to skip needless re-syncs.
    pub async fn oldest_update(&self) -> Result<Option<String>> {
        let row = ProviderLocations::find()
            .order_by_asc(provider_locations::Column::LastUpdated)
            .one(&self.conn)
            .await?;
        Ok(row.map(|l| l.last_updated))
    }

    pub async fn count(&self) -> Result<u64> {
        ProviderLocations::find()
            .count(&self.conn)
            .await
            .map_err(Into::into)
    }
}
