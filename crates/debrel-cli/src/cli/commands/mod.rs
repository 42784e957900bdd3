//! CLI command handlers, one per file.

mod artifact_name;
mod build;
mod checksum;
mod completions;
mod create_dir;
mod fetch;
mod verify;

pub use artifact_name::run_artifact_name;
pub use build::{run_build, BuildArgs};
pub use checksum::run_checksum;
pub use completions::{run_completions, run_man};
pub use create_dir::run_create_dir;
pub use fetch::run_fetch;
pub use verify::{run_verify, VerifyArgs};
