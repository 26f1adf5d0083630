//! HTTP protocol layer module
//!
//! Query parsing and response building, independent of the feed logic.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::QueryParams;
pub use response::{
    apply_common_headers, build_404_response, build_405_response, build_health_response,
    build_html_response, build_json_response, build_options_response, build_text_response,
};
