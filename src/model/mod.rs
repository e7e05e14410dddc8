//! Core data model for facelabel.
//!
//! This module defines the types every other part of the crate works
//! through: label ids, per-label configuration, annotation intervals and
//! the video metadata that travels with a store.
//!
//! # Design Principles
//!
//! 1. **Permissive representation**: fields are public and deserialization
//!    does not reject out-of-range values, so imported data can be loaded
//!    and then reported on by [`crate::validation`].
//!
//! 2. **Checked construction**: [`AnnotationInterval::new`] and
//!    [`LabelConfig::new`] enforce the invariants for data created in
//!    process (ordered times, unique labels, clamped intensities).
//!
//! # Example
//!
//! ```
//! use facelabel::model::{AnnotationInterval, LabelConfig};
//!
//! let interval = AnnotationInterval::new(
//!     1.0,
//!     2.5,
//!     vec![
//!         LabelConfig::linear("jawOpen", 0.8),
//!         LabelConfig::constant("tongueOut", 1.0),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(interval.display_labels(), "jawOpen+tongueOut");
//! ```

mod ids;
mod interval;
mod video;

pub use ids::LabelId;
pub use interval::{
    clamp_intensity, generate_interval_id, AnnotationInterval, IntervalError, LabelConfig,
    Progression, DEFAULT_COLOR,
};
pub use video::{VideoInfo, DEFAULT_FPS};
