pub mod config;
pub mod document;
pub mod extract;
pub mod history;
pub mod logging;
pub mod naming;
pub mod orchestrator;
pub mod protocol;
pub mod reference;
pub mod session;
pub mod store;
