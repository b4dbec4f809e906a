pub mod concurrency;
pub mod lifecycle;
