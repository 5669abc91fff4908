//! Widget state structs (rendering-agnostic)
//!
//! This module contains state-only structures for widget types.
//! These structs hold data and provide methods for state manipulation,
//! but contain no rendering logic. Frontends render these states using
//! their respective frameworks.

pub mod time_bar;

pub use time_bar::{SegmentView, TimeBarState};
