pub mod query;
pub mod tables;
pub mod describe;
pub mod load;
