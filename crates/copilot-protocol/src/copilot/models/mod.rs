pub mod response;
pub mod types;

pub use response::ModelsResponse;
pub use types::{
    Model, ModelCapabilities, ModelCapabilityLimits, ModelPolicy, ModelSupports, VisionLimits,
};
