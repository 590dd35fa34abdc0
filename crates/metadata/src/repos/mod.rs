//! Repository traits for metadata operations.

pub mod papers;
pub mod sessions;
pub mod users;

pub use papers::PaperRepo;
pub use sessions::SessionRepo;
pub use users::UserRepo;
