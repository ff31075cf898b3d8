pub mod error;
pub mod model;
pub mod store;

pub use error::QueueError;
pub use model::{Job, NewJob, QueueBatchUpdate, QueueStatus, Subqueue, SubqueueUpdate};
pub use store::{QueueStore, StageProgress};
