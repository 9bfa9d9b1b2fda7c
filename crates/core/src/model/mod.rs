mod answer;
mod ids;
mod instance;
mod participation;
mod question;

pub use ids::{InstanceId, OptionId, ParseIdError, ParticipationId, QuestionId, SurveyId};

pub use answer::{Answer, AnswerKindError};
pub use instance::{
    InstanceState, InstanceStats, InstanceSummary, InstanceSurvey, SurveyInstance, SurveySummary,
    UserStatus,
};
pub use participation::{
    Participation, ParticipationState, StoredAnswer, StoredOption, StoredQuestionRef,
};
pub use question::{
    Question, QuestionError, QuestionKind, QuestionOption, UnknownQuestionKind,
};
