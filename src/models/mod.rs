pub mod analytics;
pub mod common;
pub mod subscription;
