//! Custom extractors for Axum handlers.
//!
//! These extractors reject malformed input with the standard
//! `{ "error": ... }` body instead of axum's plain-text rejections.

pub mod body_json;
pub mod object_id_path;
pub mod query_params;

pub use body_json::BodyJson;
pub use object_id_path::ObjectIdPath;
pub use query_params::QueryParams;
