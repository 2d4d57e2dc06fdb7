//! Media engine seam: the capability trait the core drives, the snapshot and
//! notification types it exchanges, and a headless implementation.

mod adapter;
mod headless;
pub mod models;

pub use adapter::*;
pub use headless::{AttachedTrack, HeadlessEngine, MediaProfile};
pub use models::*;
