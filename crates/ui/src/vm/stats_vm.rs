use survey_core::model::InstanceStats;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsVm {
    pub participants: u32,
    pub completed: u32,
    pub questions: u32,
    pub completion_label: String,
}

#[must_use]
pub fn map_instance_stats(stats: &InstanceStats) -> StatsVm {
    StatsVm {
        participants: stats.total_participations,
        completed: stats.completed_participations,
        questions: stats.total_questions,
        completion_label: format!("{:.0}%", stats.completion_rate()),
    }
}
