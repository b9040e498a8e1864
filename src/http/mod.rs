//! HTTP message types and the server shell.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum fallback, body limit, request ID)
//!     → request.rs (http::Request → Request)
//!     → [Application::serve on a blocking thread]
//!     → response.rs (Response::write_to_writer)
//!     → writer.rs (ResponseWriter streams head + body back to axum)
//!     → Send to client
//! ```

pub mod asset;
pub mod headers;
pub mod parameters;
pub mod request;
pub mod response;
pub mod server;
pub mod types;
pub mod writer;

pub use asset::Asset;
pub use headers::{ByteRange, Headers};
pub use parameters::Parameters;
pub use request::Request;
pub use response::Response;
pub use server::{Server, X_REQUEST_ID};
pub use writer::{Recorder, Recording, ResponseWriter};
