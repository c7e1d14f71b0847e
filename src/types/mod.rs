mod ids;
mod models;

pub use ids::*;
pub use models::*;
