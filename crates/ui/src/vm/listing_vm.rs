use survey_core::model::InstanceSummary;

/// One row of the open surveys listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceRowVm {
    pub instance_id: u64,
    pub survey_id: u64,
    pub title: String,
    pub description: String,
    pub questions_label: String,
    pub closes_label: Option<String>,
    pub answerable: bool,
}

#[must_use]
pub fn map_open_instances(entries: &[InstanceSummary]) -> Vec<InstanceRowVm> {
    entries
        .iter()
        .map(|entry| InstanceRowVm {
            instance_id: entry.id.value(),
            survey_id: entry.survey.id.value(),
            title: entry.survey.title.clone(),
            description: entry.survey.description.clone(),
            questions_label: match entry.total_questions {
                1 => "1 question".to_owned(),
                n => format!("{n} questions"),
            },
            closes_label: entry
                .closure_date
                .map(|at| format!("Closes {}", at.format("%Y-%m-%d"))),
            answerable: entry.is_open() && entry.total_questions > 0,
        })
        .collect()
}
