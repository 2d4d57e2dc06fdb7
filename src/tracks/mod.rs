//! Audio and subtitle track bookkeeping for the loaded media

mod error;
pub mod models;
mod registry;

pub use error::TrackError;
pub use models::*;
pub use registry::TrackRegistry;
