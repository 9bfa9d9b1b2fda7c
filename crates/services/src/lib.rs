#![forbid(unsafe_code)]

pub mod error;
pub mod responses;

pub use survey_core::Clock;

pub use error::ResponseError;
pub use responses::{
    PendingSave, ResponseLoopService, ResponseSession, ResumeOutcome, SaveOutcome, StepOutcome,
};
