//! Command handlers -- one module per subcommand

pub mod analyzers;
pub mod blob;
pub mod config;
pub mod inspect;
