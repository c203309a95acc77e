mod client;
mod model;
mod normalize;
mod session;
mod settle;
mod snapshot;
mod store;

pub use client::*;
pub use model::*;
pub use normalize::*;
pub use session::*;
pub use settle::*;
pub use snapshot::*;
pub use store::*;
