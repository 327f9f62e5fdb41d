pub mod prelude;

pub mod provider_locations;
pub mod social_vendors;
pub mod vendor_cache;
pub mod vendors;
