pub mod ingredients;
pub mod plan;
pub mod preferences;
pub mod server;
