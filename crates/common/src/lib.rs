pub mod metadata;
pub mod types;
pub mod utils;
