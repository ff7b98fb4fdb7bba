pub mod backups;
pub mod compare;
pub mod completions;
pub mod edit;
pub mod export;
pub mod fmt;
pub mod get;
pub mod import;
pub mod info;
pub mod list;
pub mod set;
pub mod unset;
pub mod validate;
