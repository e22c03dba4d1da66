pub mod cli;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod export;
pub mod gateway;
pub mod generator;
pub mod preview;
