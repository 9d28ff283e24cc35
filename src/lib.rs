// Library for tests to access modules

pub mod broadcaster;
pub mod collector;
pub mod config;
pub mod error;
pub mod history;
pub mod metrics_source;
pub mod models;
pub mod routes;
pub mod version;
pub mod worker;
