pub mod controller;
pub mod keys;

pub use controller::{BackendFactory, RecordingController, RecordingState};
pub use keys::{command_for_key, Key, KeyCommand, KeyContext};
