/// refget request layer: URL construction, HTTP, response normalisation.
pub mod client;
pub mod errors;

pub use client::{DEFAULT_BASE_URL, MetadataClient, MetadataSource};
pub use errors::FetchError;
