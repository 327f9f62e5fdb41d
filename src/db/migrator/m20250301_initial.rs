use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VendorCache::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VendorCache::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VendorCache::Category).string().not_null())
                    .col(ColumnDef::new(VendorCache::City).string().not_null())
                    .col(ColumnDef::new(VendorCache::State).string().not_null())
                    .col(ColumnDef::new(VendorCache::Subcategory).string())
                    .col(
                        ColumnDef::new(VendorCache::SubcategoryKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VendorCache::LocationCode)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VendorCache::ResultsJson).text().not_null())
                    .col(ColumnDef::new(VendorCache::Cost).double())
                    .col(
                        ColumnDef::new(VendorCache::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(VendorCache::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vendor_cache_key")
                    .table(VendorCache::Table)
                    .col(VendorCache::Category)
                    .col(VendorCache::City)
                    .col(VendorCache::State)
                    .col(VendorCache::SubcategoryKey)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vendors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vendors::BusinessName).string().not_null())
                    .col(ColumnDef::new(Vendors::Category).string().not_null())
                    .col(ColumnDef::new(Vendors::Subcategory).string())
                    .col(ColumnDef::new(Vendors::Description).text())
                    .col(ColumnDef::new(Vendors::Address).string())
                    .col(ColumnDef::new(Vendors::City).string().not_null())
                    .col(ColumnDef::new(Vendors::State).string().not_null())
                    .col(ColumnDef::new(Vendors::Phone).string())
                    .col(ColumnDef::new(Vendors::Email).string())
                    .col(ColumnDef::new(Vendors::Website).string())
                    .col(ColumnDef::new(Vendors::InstagramHandle).string())
                    .col(ColumnDef::new(Vendors::RatingValue).float())
                    .col(ColumnDef::new(Vendors::RatingCount).integer())
                    .col(
                        ColumnDef::new(Vendors::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Vendors::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vendors_category_location")
                    .table(Vendors::Table)
                    .col(Vendors::Category)
                    .col(Vendors::City)
                    .col(Vendors::State)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SocialVendors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SocialVendors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SocialVendors::InstagramHandle)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SocialVendors::BusinessName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SocialVendors::Bio).text())
                    .col(ColumnDef::new(SocialVendors::Category).string().not_null())
                    .col(ColumnDef::new(SocialVendors::Subcategory).string())
                    .col(ColumnDef::new(SocialVendors::City).string().not_null())
                    .col(ColumnDef::new(SocialVendors::State).string().not_null())
                    .col(ColumnDef::new(SocialVendors::Phone).string())
                    .col(ColumnDef::new(SocialVendors::Email).string())
                    .col(ColumnDef::new(SocialVendors::WebsiteUrl).string())
                    .col(ColumnDef::new(SocialVendors::ProfileImageUrl).string())
                    .col(ColumnDef::new(SocialVendors::FollowerCount).integer())
                    .col(
                        ColumnDef::new(SocialVendors::HasContactInfo)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SocialVendors::FetchedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_social_vendors_handle_category")
                    .table(SocialVendors::Table)
                    .col(SocialVendors::InstagramHandle)
                    .col(SocialVendors::Category)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProviderLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderLocations::LocationCode)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProviderLocations::LocationName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderLocations::LocationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProviderLocations::StateCode).string())
                    .col(ColumnDef::new(ProviderLocations::StateName).string())
                    .col(ColumnDef::new(ProviderLocations::ParentLocationCode).integer())
                    .col(
                        ColumnDef::new(ProviderLocations::CountryCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProviderLocations::Latitude).double())
                    .col(ColumnDef::new(ProviderLocations::Longitude).double())
                    .col(
                        ColumnDef::new(ProviderLocations::LastUpdated)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_locations_name")
                    .table(ProviderLocations::Table)
                    .col(ProviderLocations::LocationType)
                    .col(ProviderLocations::LocationName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VendorCache::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SocialVendors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProviderLocations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VendorCache {
    Table,
    Id,
    Category,
    City,
    State,
    Subcategory,
    SubcategoryKey,
    LocationCode,
    ResultsJson,
    Cost,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
    BusinessName,
    Category,
    Subcategory,
    Description,
    Address,
    City,
    State,
    Phone,
    Email,
    Website,
    InstagramHandle,
    RatingValue,
    RatingCount,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SocialVendors {
    Table,
    Id,
    InstagramHandle,
    BusinessName,
    Bio,
    Category,
    Subcategory,
    City,
    State,
    Phone,
    Email,
    WebsiteUrl,
    ProfileImageUrl,
    FollowerCount,
    HasContactInfo,
    FetchedAt,
}

#[derive(DeriveIden)]
enum ProviderLocations {
    Table,
    LocationCode,
    LocationName,
    LocationType,
    StateCode,
    StateName,
    ParentLocationCode,
    CountryCode,
    Latitude,
    Longitude,
    LastUpdated,
}
