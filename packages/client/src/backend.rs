pub mod api_client;
pub mod cache;
pub mod endpoint;

pub use api_client::BackendClient;
pub use cache::{CacheKey, RequestCache};
pub use endpoint::{Endpoint, SafeEndpoint, UnsafeEndpoint};
