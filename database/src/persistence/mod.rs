pub mod storage;
pub mod transaction;
