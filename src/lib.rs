//! Time Progress - segmented time progress bars
//!
//! The engine in [`core`] computes elapsed progress, labels and segment
//! markers for any number of bars driven by one shared scheduler. The
//! `time-progress` binary renders them in a terminal with ratatui.

pub mod app;
pub mod config;
pub mod core;
pub mod frontend;
pub mod widgets;
