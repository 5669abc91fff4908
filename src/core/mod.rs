//! Time progress engine
//!
//! Progress math, duration text, segment planning, and the shared
//! scheduler that keeps every live bar updated.
//! NO imports from frontend/ or widgets/: presentation happens behind the
//! [`Renderer`] trait.

pub mod clock;
pub mod duration;
pub mod error;
pub mod progress;
pub mod renderer;
pub mod scheduler;
pub mod segments;
pub mod template;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{DurationFormatter, DurationTable, UnitLabels};
pub use error::{ProgressError, ProgressResult};
pub use progress::{ProgressCalculator, TimeState};
pub use renderer::{Renderer, SegmentFlag, SegmentMarker, SegmentPart};
pub use scheduler::{Scheduler, DEFAULT_TICK_INTERVAL};
pub use segments::SegmentPlan;
pub use widget::{BarState, InstanceId, ProgressOptions, TimeProgress, UpdateKind};
