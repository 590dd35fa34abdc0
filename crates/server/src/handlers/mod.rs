//! HTTP request handlers.

pub mod accounts;
pub mod health;
pub mod papers;

pub use accounts::*;
pub use health::*;
pub use papers::*;
