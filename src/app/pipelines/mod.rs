pub mod failure_confirmation;
pub mod indicators;

pub use failure_confirmation::{FailureConfirmationPipeline, FeedWindow};
pub use indicators::IndicatorPipeline;
