pub mod browser;
pub mod sqlite_db;
pub mod timestamp;
