// Keyboard polling, per-frame key snapshots, input edge buffering and autoplay

pub mod autoplay;
pub mod input_buffer;
pub mod key_frame;
pub mod key_state;
pub mod keyboard;

pub use autoplay::AutoPlayer;
pub use input_buffer::{DEFAULT_RETENTION_US, InputBuffer, InputEdge};
pub use key_frame::KeyFrame;
pub use key_state::KeyStateManager;
pub use keyboard::{KeyboardBackend, KeyboardInput, VirtualKeyboardBackend};
