pub mod aggregation;
pub mod analyzer;
pub mod nutrition;
pub mod portion;
pub mod report;
pub mod seed;
pub mod streak;
