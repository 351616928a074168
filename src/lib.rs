pub mod cli;
pub mod compose;
pub mod config;
pub mod deployment;
pub mod fs;
