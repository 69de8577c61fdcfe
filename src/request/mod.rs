//! Request assembly
//!
//! Turns an [`OperationDescriptor`](crate::descriptor::OperationDescriptor)
//! into the final URL (path template substitution plus query string) and
//! the encoded request body with its inferred Content-Type.

mod body;
mod url;

pub use body::encode_body;
pub use url::build_url;
