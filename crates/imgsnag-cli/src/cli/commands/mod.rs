//! CLI command handlers, one file per command.

mod collect;
mod download;
mod grab;
mod history;
mod serve;

pub use collect::run_collect;
pub use download::run_download;
pub use grab::run_grab;
pub use history::run_history;
pub use serve::run_serve;
