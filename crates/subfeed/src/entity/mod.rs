//! SeaORM entity definitions for the subfeed database schema.

pub mod cache_blob;
pub mod prelude;
