pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod likes;
pub mod links;
pub mod log;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod route;
pub mod ux;
pub mod wire;
