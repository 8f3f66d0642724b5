// Game configuration: judge windows, timing, offsets and key maps

pub mod game_config;
pub mod keyboard_config;

pub use game_config::GameConfig;
pub use keyboard_config::{ControlMode, KeyMap, KeyboardConfig, gdx_keys};
