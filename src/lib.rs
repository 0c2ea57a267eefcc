#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use solo_pair as pair;
pub use solo_ptr as ptr;
