//! Data models for channel-links.

mod record;
mod session;

pub use record::{DescriptionLink, VideoLinkRecord, VideoRef, RECORD_HEADERS};
pub use session::{ChannelSession, Mode};
