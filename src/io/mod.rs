pub mod config_io;
pub mod json_store;
pub mod memory;
pub mod persist;
pub mod recovery;
