//! Data module: samples and their segmentation by grid cell
#![warn(missing_docs)]

pub mod samples;
pub mod segmentation;

pub use crate::debug_invariants::DebugInvariants;

pub use samples::{CategorySamples, GridId, SampleStore};
pub use segmentation::{Segmentation, aggregate};
