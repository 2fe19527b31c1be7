//! External HTTP providers
//!
//! Thin clients for the geocoder, the forecast API and the image inference
//! router. Each one reports failures as [`crate::error::ProviderError`].

pub mod geocoding;
pub mod inference;
pub mod types;
pub mod weather;

pub use geocoding::NominatimClient;
pub use inference::{HuggingFaceClient, ImageGenerator, InferenceOutput};
pub use weather::OpenMeteoClient;
