//! HTTP middleware module.
//!
//! ```ignore
//! use axum_helpers::http::cors_layer_from_env;
//!
//! let app = Router::new().layer(cors_layer_from_env()?);
//! ```

pub mod cors;

pub use cors::{
    CORS_ALLOWED_ORIGIN_ENV, cors_layer_from_env, create_cors_layer, create_permissive_cors_layer,
    parse_allowed_origins,
};
