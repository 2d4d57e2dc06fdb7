//! Sidecar lookup and ingestion of user-supplied subtitle files

mod lookup;
mod resolver;

pub use lookup::{matches_base_name, FsSidecarLookup, SidecarLookup, SubtitleCandidate};
pub use resolver::{SubtitleIngest, SubtitleResolver};
