mod resume;
mod save_gate;
mod session;
mod workflow;

pub use resume::ResumeOutcome;
pub use save_gate::{SaveGate, SaveTicket};
pub use session::{PendingSave, ResponseSession};
pub use workflow::{ResponseLoopService, SaveOutcome, StepOutcome};
