pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod io;
pub mod paths;
pub mod service;
pub mod types;

pub use error::{Result, TaskgenError};
