//! Phase scheduling: which financing phase a projection month falls in

mod timeline;

pub use timeline::{Phase, PhasePosition, PhaseTimeline};
