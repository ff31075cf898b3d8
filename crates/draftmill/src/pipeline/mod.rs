//! The article pipeline: an ordered sequence of stages driven by a
//! persisted state machine over the queue store.

pub mod error;
pub mod input;
pub mod runner;
pub mod stage;

pub use error::{PipelineError, StageFailure};
pub use input::{ArticleRequest, ContentInput, CoverImageInput, PublishInput};
pub use runner::{PipelineOutcome, PipelineRunner};
pub use stage::Stage;
