#![forbid(unsafe_code)]

pub mod highlight;
