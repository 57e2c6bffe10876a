pub mod anomalies;
pub mod budget;
pub mod engine;
pub mod metrics;
pub mod recommendations;
pub mod redundancy;
pub mod report;
pub mod scoring;
pub mod store;
