pub mod config;
pub mod daemon;
pub mod init;
pub mod outstanding;
pub mod reminder;
pub mod trigger;
