pub mod config;
pub mod deletion;
pub mod logging;
pub mod models;
pub mod naming;
pub mod storage;
pub mod upload;

