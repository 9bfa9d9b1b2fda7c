mod flash;
mod home;
mod results;
mod state;
mod survey;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use flash::{Flash, FlashBanner, FlashSlot, use_flash, use_flash_provider};
pub use home::HomeView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use survey::SurveyView;
