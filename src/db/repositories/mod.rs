pub mod cache;
pub mod location;
pub mod social;
pub mod vendor;
