#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod error;
pub use error::*;

mod type_desc;
pub use type_desc::*;

mod model;
pub use model::*;

mod ctor;
pub use ctor::*;

mod element;
pub use element::*;

mod context;
pub use context::*;

mod provider;
pub use provider::*;

mod builder;
pub use builder::*;

mod copy;
pub use copy::*;

mod array;
pub use array::*;

mod engine;
mod placement;
mod region;
pub use region::*;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[macro_export]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}
