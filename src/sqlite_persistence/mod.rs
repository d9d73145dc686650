mod versioned_db;
mod versioned_schema;

pub use versioned_db::open_versioned_db;
pub use versioned_schema::*;
