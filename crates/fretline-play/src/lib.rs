// Play session: event scheduling and the per-frame judge loop

pub mod scheduler;
pub mod session;

pub use scheduler::{EventScheduler, SpawnRequest};
pub use session::{FrameReport, PlaySession};
