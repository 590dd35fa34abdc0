//! Common test utilities and fixtures.

pub mod fakes;
pub mod server;

#[allow(unused_imports)]
pub use fakes::*;
#[allow(unused_imports)]
pub use server::*;
