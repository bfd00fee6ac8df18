//! examkit-report: Review export artifacts for examkit.
//!
//! Turns a finished session into a JSON export or a Markdown review.

pub mod json;
pub mod markdown;

pub use json::ReviewExport;
pub use markdown::{render_fragment, render_review};
