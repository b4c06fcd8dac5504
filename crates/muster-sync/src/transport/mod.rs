//! Transport layer: an HTTP `IRemoteStore` over a versioned JSON envelope.

pub mod http_client;
pub mod http_store;
pub mod protocol;

pub use http_client::{HttpClient, HttpClientConfig};
pub use http_store::HttpRemoteStore;
pub use protocol::{RemoteRequest, RemoteResponse, PROTOCOL_VERSION};
