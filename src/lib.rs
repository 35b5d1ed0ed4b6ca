pub mod cli;
pub mod companies;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod render;
pub mod schedule;
pub mod signup;
pub mod source;
pub mod stats;
