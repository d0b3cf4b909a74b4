pub mod classify;
pub mod config;
pub mod generate;
pub mod train;
