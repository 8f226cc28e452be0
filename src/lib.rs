//! `massren` - rename and delete files by editing their names in a text editor.
//!
//! The core turns an edited listing into actions (`diff`), applies them
//! without overwriting live files (`apply`, `staging`), records every rename
//! (`history`) and reverses renames on request (`undo`).

pub mod apply;
pub mod cli;
pub mod config;
pub mod diff;
pub mod editor;
pub mod engine;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fsops;
pub mod history;
pub mod listing;
pub mod model;
pub mod normalize;
pub mod policy;
pub mod profile;
pub mod reporter;
pub mod session;
pub mod staging;
pub mod undo;

pub use error::{Error, Result};
pub use model::{FileAction, HistoryItem};
pub use session::Session;
