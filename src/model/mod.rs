mod config;
mod domain;
mod event;
mod raw;

pub use config::*;
pub use domain::*;
pub use event::*;
pub use raw::*;
