pub mod config;
pub mod errors;
pub mod generation;
pub mod model;
pub mod providers;
pub mod session;

pub mod report;
pub mod storage;
