pub mod aggregate;
pub mod config;
pub mod error;
pub mod io;
pub mod keys;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod unify;

pub use error::{MergeError, Result};
