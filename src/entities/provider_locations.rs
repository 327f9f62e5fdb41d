use sea_orm::entity::prelude::*;

/// Provider location codes synced from the business-listing API. Cities carry
/// their parent state's name and code for resolver lookups.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "provider_locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub location_code: i32,
    pub location_name: String,
    /// "country", "state" or "city".
    pub location_type: String,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub parent_location_code: Option<i32>,
    pub country_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_updated: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
