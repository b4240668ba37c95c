//! HTTP surface of the proxy.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, body buffering, error translation)
//!     → request.rs (RequestCx + ProxyRequest for the chain)
//!     → [middleware decorators → proxy forwarder]
//!     → response.rs (ProxyResponse back from the chain)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use server::HttpServer;
