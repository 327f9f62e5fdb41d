pub use super::provider_locations::Entity as ProviderLocations;
pub use super::social_vendors::Entity as SocialVendors;
pub use super::vendor_cache::Entity as VendorCache;
pub use super::vendors::Entity as Vendors;
