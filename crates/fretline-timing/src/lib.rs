// Audio clock abstraction and song-time arithmetic

mod clock;
mod song_timer;

pub use clock::{AudioClock, ManualClock, SystemClock};
pub use song_timer::SongTimer;
