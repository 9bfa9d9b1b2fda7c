use chrono::{DateTime, Local, Utc};

use api::{ApiError, SubmitReceipt};
use services::{PendingSave, ResponseError, ResponseLoopService, ResponseSession, ResumeOutcome};
use survey_core::SubmitRequest;
use survey_core::model::{
    Answer, InstanceId, OptionId, Participation, ParticipationId, QuestionId, QuestionKind,
};

use crate::views::ViewError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseIntent {
    Next,
    Previous,
    JumpTo(usize),
    Save,
    Submit,
    SetText {
        question: QuestionId,
        content: String,
    },
    Select {
        question: QuestionId,
        option: OptionId,
    },
    Toggle {
        question: QuestionId,
        option: OptionId,
    },
    ClearNotice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMove {
    Next,
    Previous,
    To(usize),
}

/// Flash message shown above the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub error: ViewError,
    pub detail: Option<String>,
}

impl Notice {
    #[must_use]
    pub fn from_error(err: &ResponseError) -> Self {
        Self {
            error: ViewError::from_response(err),
            detail: err
                .api_error()
                .and_then(ApiError::server_message)
                .map(str::to_owned),
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} ({detail})", self.error.message()),
            None => self.error.message().to_owned(),
        }
    }

    /// Save failures do not stop the participant; everything else needs attention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.error == ViewError::Save
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: OptionId,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub number: usize,
    pub content: String,
    pub kind: QuestionKind,
    pub text: String,
    pub options: Vec<OptionVm>,
    pub answered: bool,
    pub read_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepMarkerVm {
    pub index: usize,
    pub number: usize,
    pub answered: bool,
    pub current: bool,
}

pub struct ResponseVm {
    session: ResponseSession,
    resumed: ResumeOutcome,
    notice: Option<Notice>,
}

impl ResponseVm {
    #[must_use]
    pub fn new(session: ResponseSession, resumed: ResumeOutcome) -> Self {
        Self {
            session,
            resumed,
            notice: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &ResponseSession {
        &self.session
    }

    #[must_use]
    pub fn instance_id(&self) -> InstanceId {
        self.session.instance_id()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.session.instance().title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.session.instance().description
    }

    #[must_use]
    pub fn resumed(&self) -> ResumeOutcome {
        self.resumed
    }

    #[must_use]
    pub fn step_label(&self) -> String {
        format!(
            "Question {} of {}",
            self.session.current_step() + 1,
            self.session.total_steps()
        )
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> u32 {
        self.session.progress_percent().round() as u32
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        let progress = self.session.progress();
        format!("{} of {} answered", progress.answered, progress.total)
    }

    #[must_use]
    pub fn question(&self) -> Option<QuestionVm> {
        let question = self.session.current_question()?;
        let answer = self.session.answer_for(question.id());
        let text = match answer {
            Some(Answer::Text { content }) => content.clone(),
            _ => String::new(),
        };
        let options = question
            .options()
            .iter()
            .map(|option| OptionVm {
                id: option.id,
                label: option.content.clone(),
                selected: answer.is_some_and(|a| a.is_selected(option.id)),
            })
            .collect();

        Some(QuestionVm {
            id: question.id(),
            number: self.session.current_step() + 1,
            content: question.content().to_owned(),
            kind: question.kind(),
            text,
            options,
            answered: answer.is_some_and(Answer::is_answered),
            read_only: self.session.is_completed(),
        })
    }

    #[must_use]
    pub fn markers(&self) -> Vec<StepMarkerVm> {
        let current = self.session.current_step();
        (0..self.session.total_steps())
            .map(|index| StepMarkerVm {
                index,
                number: index + 1,
                answered: self.session.is_question_answered(index),
                current: index == current,
            })
            .collect()
    }

    #[must_use]
    pub fn is_first_step(&self) -> bool {
        self.session.is_first_step()
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.session.is_last_step()
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.session.has_unsaved_changes()
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.session.is_saving()
    }

    /// "Saved hh:mm" in local time, once a partial save went through.
    #[must_use]
    pub fn saved_label(&self) -> Option<String> {
        self.session
            .last_saved_at()
            .map(|at| format!("Saved {}", at.with_timezone(&Local).format("%H:%M")))
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.session.is_submitting()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.session.is_completed()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn record(&mut self, err: &ResponseError) {
        self.notice = Some(Notice::from_error(err));
    }

    // ─── EDITS ─────────────────────────────────────────────────────────────────

    /// Apply an edit or notice intent. Returns `false` for intents that need the network.
    pub fn apply_local(&mut self, intent: &ResponseIntent) -> bool {
        let result = match intent {
            ResponseIntent::SetText { question, content } => {
                self.session.set_text(*question, content.clone())
            }
            ResponseIntent::Select { question, option } => {
                self.session.select_option(*question, *option)
            }
            ResponseIntent::Toggle { question, option } => {
                self.session.toggle_option(*question, *option)
            }
            ResponseIntent::ClearNotice => {
                self.clear_notice();
                Ok(())
            }
            ResponseIntent::Next
            | ResponseIntent::Previous
            | ResponseIntent::JumpTo(_)
            | ResponseIntent::Save
            | ResponseIntent::Submit => return false,
        };
        if let Err(err) = result {
            self.record(&err);
        }
        true
    }

    // ─── NETWORK STEPS ─────────────────────────────────────────────────────────

    pub fn begin_save(&mut self) -> Option<PendingSave> {
        self.session.begin_save()
    }

    /// Returns the follow-up save to send, if one was queued.
    pub fn finish_save(
        &mut self,
        pending: &PendingSave,
        result: Result<Participation, ApiError>,
        now: DateTime<Utc>,
    ) -> Option<PendingSave> {
        match self.session.finish_save(pending, result, now) {
            Ok(next) => {
                if self.notice.as_ref().is_some_and(Notice::is_transient) {
                    self.notice = None;
                }
                next
            }
            Err(err) => {
                self.record(&err);
                None
            }
        }
    }

    pub fn navigate(&mut self, step: StepMove) -> bool {
        match step {
            StepMove::Next => self.session.next(),
            StepMove::Previous => self.session.previous(),
            StepMove::To(index) => self.session.jump_to(index),
        }
    }

    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        match self.session.begin_submit() {
            Ok(request) => {
                self.notice = None;
                Some(request)
            }
            Err(err) => {
                self.record(&err);
                None
            }
        }
    }

    pub fn finish_submit(
        &mut self,
        result: Result<SubmitReceipt, ApiError>,
    ) -> Option<ParticipationId> {
        match self.session.finish_submit(result) {
            Ok(id) => Some(id),
            Err(err) => {
                self.record(&err);
                None
            }
        }
    }
}

/// # Errors
///
/// Returns the `ViewError` matching the load refusal.
pub async fn open_survey(
    responses: &ResponseLoopService,
    instance_id: InstanceId,
) -> Result<ResponseVm, ViewError> {
    let (session, resumed) = responses
        .open(instance_id)
        .await
        .map_err(|err| ViewError::from_response(&err))?;
    Ok(ResponseVm::new(session, resumed))
}
