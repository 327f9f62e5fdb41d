use sea_orm::entity::prelude::*;

/// Instagram profiles collected by the ingest pipeline. Unique per
/// (instagram_handle, category).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "social_vendors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub instagram_handle: String,
    pub business_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website_url: Option<String>,
    pub profile_image_url: Option<String>,
    pub follower_count: Option<i32>,
    pub has_contact_info: bool,
    pub fetched_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
