pub mod app;
pub mod company;
pub mod config;
pub mod input;
pub mod keybinds;
pub mod logging;
pub mod panel;
pub mod toast;
pub mod ui;

pub use config::Config;
