pub mod claila;
pub mod metrics_manager;
pub mod models;
pub mod relay;
pub mod session_manager;
pub mod shaping;
