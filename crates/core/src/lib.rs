pub mod helpers;
pub mod settings;
pub mod battery;
pub mod event;
pub mod monitor;
pub mod device;
pub mod os;
pub mod audio;
pub mod net;
pub mod display;

pub use anyhow;
pub use chrono;
pub use serde_json;
