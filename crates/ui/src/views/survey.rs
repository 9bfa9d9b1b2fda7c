mod components;
mod view;

pub use view::SurveyView;

#[cfg(test)]
pub(crate) use view::SurveyTestHandles;
