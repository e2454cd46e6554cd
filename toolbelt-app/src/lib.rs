pub mod config;
pub mod logging;
pub mod models;
pub mod screens;
pub mod utils;
