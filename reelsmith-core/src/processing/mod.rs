//! Filter-graph compilation and watermark location.
//!
//! This module holds everything that decides what happens to the frames:
//! canvas geometry, the watermark locator, the per-frame filter chain and the
//! two-input transition graph.

/// Canvas geometry: letterbox, delogo regions, zoom crops
pub mod geometry;

/// Watermark corner locator
pub mod watermark;

/// Per-frame filter chains and obscuring stages
pub mod filters;

/// Two-input cross-fade graph and its timing
pub mod transition;

pub use filters::{DelogoStage, VideoFilterChain, resolve_delogo};
pub use geometry::{DelogoRegion, auto_zoom_factor, delogo_region, letterbox, zoom_crop};
pub use transition::{TransitionTiming, transition_timing};
pub use watermark::{LocatedWatermark, locate_watermark};
