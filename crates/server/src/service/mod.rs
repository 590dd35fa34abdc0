//! Domain services behind the HTTP handlers.
//!
//! Services own no global state: each is constructed with the metadata and
//! blob stores it uses, so tests can hand them fakes.

pub mod accounts;
pub mod error;
pub mod papers;
pub mod sessions;

pub use accounts::{AccountService, UserInfo};
pub use error::{ServiceError, ServiceResult};
pub use papers::{NewUpload, PaperService};
pub use sessions::SessionStore;
