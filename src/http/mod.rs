//! HTTP protocol layer module
//!
//! Request buffering, form decoding and response building, decoupled from
//! the API routes that use them.

pub mod form;
pub mod request;
pub mod response;

pub use form::{FormData, FormError, UploadedFile};
pub use request::ApiRequest;
pub use response::{build_options_response, json_response, with_allow, with_cors};
