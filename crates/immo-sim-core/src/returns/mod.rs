pub mod scoring;
pub mod yields;
