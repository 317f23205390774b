pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod mode;
pub mod providers;
pub mod responder;
