// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod db;
pub mod error;
pub mod history_repo;
pub mod influx;
pub mod models;
pub mod rate_engine;
pub mod sink;
pub mod source;
pub mod state_repo;
pub mod worker;
