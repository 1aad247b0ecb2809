pub mod routes;
pub mod startup;
pub mod session;
pub mod errors;
pub mod openapi;

pub use startup::run;
