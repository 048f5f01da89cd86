pub mod config;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod season;
pub mod server;
