//! Test support utilities for deepcheck.
//!
//! Provides mocks for every core port and builders for synthetic landmark
//! tracks, so the classification pipeline can be exercised without video
//! files, a face tracker or trained weights.
//!
//! # Example
//!
//! ```
//! use deepcheck_core::{Classifier, DualModelScorer, Label};
//! use deepcheck_test_support::{MockFrameSource, MockModelProvider, MockTracker, TrackBuilder};
//!
//! let tracker = MockTracker::new().with_track("clip", TrackBuilder::ramp(32, 4));
//! let scorer = DualModelScorer::new(MockModelProvider::constant(0.9, 0.9));
//! let classifier = Classifier::new(MockFrameSource::new(32), tracker, scorer);
//!
//! let verdict = classifier.classify("clip.mp4", 16).unwrap();
//! assert_eq!(verdict.label, Label::Fake);
//! ```

mod builders;
mod mocks;

pub use builders::TrackBuilder;
pub use mocks::{
    FailingProvider, FixedModel, MockFrameSource, MockModelProvider, MockProgressSink,
    MockResultOutput, MockTracker, ScriptedModel,
};
