use thiserror::Error;

use crate::{auth::sessions::SessionError, store::StoreError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username must be at least 3 characters")]
    UsernameTooShort,
    #[error("Username cannot be more than 255 characters")]
    UsernameTooLong,
    #[error("Nickname must be at least 3 characters")]
    NicknameTooShort,
    #[error("Nickname cannot be more than 255 characters")]
    NicknameTooLong,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
    #[error("Password cannot be more than 255 characters")]
    PasswordTooLong,
    #[error("Sorry, that username is already taken")]
    UsernameTaken,
    #[error("Sorry, that display name is already taken")]
    NicknameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error("New password must be at least 8 characters")]
    NewPasswordTooShort,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
