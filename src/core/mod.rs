pub mod aggregate;
pub mod config;
pub mod dates;
pub mod formatter;
pub mod models;
pub mod providers;
pub mod render;
pub mod sink;
