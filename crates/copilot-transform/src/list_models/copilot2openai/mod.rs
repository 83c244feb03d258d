pub mod response;

pub use response::{transform_model, transform_response, transform_response_at};
