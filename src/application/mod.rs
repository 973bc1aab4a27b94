pub mod circulation;
pub mod statistics;
