mod sweeper;
mod tracker;

pub use sweeper::Sweeper;
pub use tracker::{ResourceId, ResourceKind, ResourceTracker, TrackedResource, TrackerStats};
