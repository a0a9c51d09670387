//! Core of the provisioning pipeline: the wizard state machine and the
//! shared primitives it runs on.

pub mod config_files;
pub mod context;
pub mod db;
pub mod error;
pub mod forms;
pub mod locale_cache;
pub mod requirements;
pub mod session;
pub mod time;
pub mod wizard;
