pub mod cost;
pub mod report;
