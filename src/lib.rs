pub mod app;
pub mod cli;
pub mod command;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod registry;
pub mod settings;

pub use error::UninstallError;
