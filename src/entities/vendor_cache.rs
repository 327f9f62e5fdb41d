use sea_orm::entity::prelude::*;

/// One cached provider search. `subcategory` is the display value as
/// requested; `subcategory_key` is the canonical sentinel that participates in
/// the unique key (NULLs are distinct in SQLite unique indexes).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vendor_cache")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category: String,
    pub city: String,
    pub state: String,
    pub subcategory: Option<String>,
    pub subcategory_key: String,
    pub location_code: i32,
    #[sea_orm(column_type = "Text")]
    pub results_json: String,
    pub cost: Option<f64>,
    pub created_at: String,
    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
