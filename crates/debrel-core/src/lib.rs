pub mod config;
pub mod logging;

// Packaging pipeline.
pub mod archive;
pub mod build;
pub mod checksum;
pub mod cmd;
pub mod debian;
pub mod fetch;
pub mod release;
pub mod retry;
pub mod storage;
pub mod verify;
