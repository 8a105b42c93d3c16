//! Shared utility functions.
//!
//! - `url`: platform-relative link handling
//! - `filename`: safe file names for channel record files

mod filename;
mod url;

pub use filename::sanitize_filename;
pub use url::{absolute_link, canonical_video_url};
