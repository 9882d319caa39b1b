#![feature(int_roundings)]

pub mod api;
pub mod normalize;
pub mod session;
pub mod window;
