#![forbid(unsafe_code)]

pub mod answer_store;
pub mod model;
pub mod navigator;
pub mod payload;
pub mod time;

pub use answer_store::{AnswerStore, FormProgress};
pub use navigator::StepNavigator;
pub use payload::{AnswerPayload, PartialSaveRequest, PayloadValue, SubmitRequest, format_answers};
pub use time::Clock;
