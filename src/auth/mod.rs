pub mod dto;
mod error;
pub mod password;
mod repo;
mod repo_types;
pub mod services;
pub mod sessions;

pub use dto::{PublicUser, UserProfile};
pub use error::AccountError;
pub use repo_types::{User, UserId, SYSTEM_USERNAME, SYSTEM_USER_ID};
pub use sessions::{Session, SessionError, SessionStore};
