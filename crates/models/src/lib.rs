pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod folder;
pub mod bookmark;
pub mod apikey;
