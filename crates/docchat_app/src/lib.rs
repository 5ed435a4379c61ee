//! Docchat app: interaction controller, configuration and the terminal front end.
pub mod config;
mod controller;
mod effects;
pub mod logging;
pub mod render;
pub mod terminal;
mod view_port;

pub use config::{ClientConfig, ConfigError};
pub use controller::{ControllerSettings, InteractionController};
pub use view_port::ViewPort;
