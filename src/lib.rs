// Library for tests to access modules

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod storage;
