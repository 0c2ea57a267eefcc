#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod compressed;

// -----------------------------------------------------------------------------
// Top-level exports

pub use compressed::CompressedPair;
