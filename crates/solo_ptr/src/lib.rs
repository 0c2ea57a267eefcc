#![doc = include_str!("../README.md")]
#![expect(unsafe_code, reason = "Owning raw pointers is inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Logging

/// Lifecycle tracing, compiled only with the `debug` feature.
macro_rules! trace_handle {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug")]
        ::log::trace!($($arg)*);
    };
}

// -----------------------------------------------------------------------------
// Modules

mod array;
mod deleter;
mod error;
mod unique;

// -----------------------------------------------------------------------------
// Top-level exports

pub use array::UniqueArray;
pub use deleter::{DefaultDelete, Deleter, DropInPlace};
pub use error::HandleError;
pub use unique::UniquePtr;
