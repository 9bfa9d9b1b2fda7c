#![forbid(unsafe_code)]

pub mod config;
pub mod gateway;
pub mod http;
pub mod memory;

pub use config::{ApiConfig, ApiConfigError};
pub use gateway::{ApiError, SubmitReceipt, SurveyApi};
pub use http::HttpSurveyApi;
pub use memory::{FailPoint, InMemorySurveyApi};
