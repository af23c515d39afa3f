pub mod config;
pub mod dashboard;
pub mod data;
pub mod etl;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod storage;
