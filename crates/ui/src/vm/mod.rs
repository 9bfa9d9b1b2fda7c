mod listing_vm;
mod response_vm;
mod stats_vm;

pub use listing_vm::{InstanceRowVm, map_open_instances};
pub use response_vm::{
    Notice, OptionVm, QuestionVm, ResponseIntent, ResponseVm, StepMarkerVm, StepMove, open_survey,
};
pub use stats_vm::{StatsVm, map_instance_stats};
