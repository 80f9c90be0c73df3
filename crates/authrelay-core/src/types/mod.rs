//! Request, response and URL types shared by transports and the client.

mod base_url;
mod headers;
mod request;
mod response;

pub use base_url::BaseUrl;
pub use headers::Headers;
pub use request::{Method, TransportRequest};
pub use response::{ApiResponse, TransportResponse};
