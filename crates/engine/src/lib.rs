#![forbid(unsafe_code)]

pub mod credentials;
pub mod dashboard;
pub mod gate;
pub mod identity;
pub mod ops;
pub mod server;
pub mod support;
