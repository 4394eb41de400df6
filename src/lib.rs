pub mod app;
pub mod config;
pub mod executor;
pub mod helper;
pub mod portal;
pub mod resolver;
pub mod runlog;
pub mod runtime;
pub mod shared;
pub mod shell;
pub mod tabs;
