pub mod response;
pub mod types;

pub use response::{ListModelsResponse, ListObjectType};
pub use types::{Model, Permission};
