//! cogscore - Scoring engine for behavioral cognitive tasks
//!
//! cogscore turns the raw event logs written by browser-based cognitive tasks
//! (and stored by a survey platform as embedded data) into fixed sets of
//! summary metrics: task log → decoder → metrics → merged per-response record.
//!
//! ## Modules
//!
//! - **Decoders**: spatial span, trail making, GoStop, information sampling and
//!   delay discounting scoring
//! - **Pipeline**: scoring survey response exports against a [`ScoringPlan`]

pub mod decoders;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod schema;
pub mod types;

pub use decoders::{
    DelayDiscountingDecoder, GoStopScoreDecoder, IstScoreDecoder, SpanScoreDecoder, TaskDecoder,
    TaskKind, TrailScoreDecoder,
};
pub use error::ScoreError;
pub use pipeline::{score_responses_json, ResponseScorer};
pub use plan::{ScoringPlan, TaskBinding};
pub use schema::{ResponseAdapter, ResponseRecord, TaskData, TaskEvent};
pub use types::{Metrics, ScoreReport, ScoredResponse};

/// cogscore version embedded in all score reports
pub const SCORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for score reports
pub const PRODUCER_NAME: &str = "cogscore";
