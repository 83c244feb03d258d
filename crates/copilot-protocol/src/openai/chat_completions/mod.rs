pub mod request;
pub mod response;
pub mod types;

pub use request::ChatRequest;
pub use response::{ChatResponse, Choice};
pub use types::{Delta, Message, Role, Usage};
