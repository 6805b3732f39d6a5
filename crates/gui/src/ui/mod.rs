#![forbid(unsafe_code)]

pub mod preview;
