//! Input schema for task scoring
//!
//! Task event logs (one JSON list per task administration) and the survey
//! response records that carry them.

mod adapter;
mod response;
mod task_event;

pub use adapter::*;
pub use response::*;
pub use task_event::*;
