pub mod intent;
pub mod location;
pub mod place;
pub mod query_payload;
