use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        error::AccountError,
        password::{hash_password, verify_password},
        sessions::Session,
        User,
    },
    state::AppState,
};

const MIN_NAME: usize = 3;
const MAX_LEN: usize = 255;
const MIN_PASSWORD: usize = 8;

fn check_length(
    value: &str,
    min: usize,
    too_short: AccountError,
    too_long: AccountError,
) -> Result<(), AccountError> {
    let len = value.chars().count();
    if len < min {
        return Err(too_short);
    }
    if len >= MAX_LEN {
        return Err(too_long);
    }
    Ok(())
}

/// Validates and stores a new account, then signs it in.
#[instrument(skip(state, password))]
pub fn create_account(
    state: &mut AppState,
    username: &str,
    nickname: &str,
    password: &str,
) -> Result<(User, Session), AccountError> {
    let username = username.trim().to_lowercase();
    let nickname = nickname.trim();

    check_length(&username, MIN_NAME, AccountError::UsernameTooShort, AccountError::UsernameTooLong)?;
    check_length(nickname, MIN_NAME, AccountError::NicknameTooShort, AccountError::NicknameTooLong)?;
    check_length(password, MIN_PASSWORD, AccountError::PasswordTooShort, AccountError::PasswordTooLong)?;

    if state.db.user_by_username(&username).is_some() {
        warn!(%username, "username already taken");
        return Err(AccountError::UsernameTaken);
    }
    if state.db.user_by_nickname(nickname).is_some() {
        warn!(%nickname, "nickname already taken");
        return Err(AccountError::NicknameTaken);
    }

    let password_hash = hash_password(password)?;
    let user = state.db.write_user(&username, nickname, &password_hash, false)?;
    let session = state.sessions.start(&user.username, state.db.clock().now());

    info!(user_id = user.id, username = %user.username, "account created");
    Ok((user, session))
}

#[instrument(skip(state, password))]
pub fn login(state: &mut AppState, username: &str, password: &str) -> Result<(User, Session), AccountError> {
    let username = username.trim().to_lowercase();
    let user = match state.db.user_by_username(&username) {
        Some(u) if !u.is_system() => u.clone(),
        _ => {
            warn!(%username, "login unknown username");
            return Err(AccountError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AccountError::InvalidCredentials);
    }

    let session = state.sessions.start(&user.username, state.db.clock().now());
    info!(user_id = user.id, "user logged in");
    Ok((user, session))
}

#[instrument(skip(state))]
pub fn logout(state: &mut AppState, username: &str) -> Result<(), AccountError> {
    state.sessions.end(username)?;
    info!(username, "user logged out");
    Ok(())
}

/// Replaces the password hash and signs the user out everywhere.
#[instrument(skip(state, user, current, new), fields(user_id = user.id))]
pub fn change_password(
    state: &mut AppState,
    user: &User,
    current: &str,
    new: &str,
) -> Result<(), AccountError> {
    if !verify_password(current, &user.password_hash)? {
        warn!("password change with wrong current password");
        return Err(AccountError::WrongPassword);
    }
    if new.chars().count() < MIN_PASSWORD {
        return Err(AccountError::NewPasswordTooShort);
    }
    if new.chars().count() >= MAX_LEN {
        return Err(AccountError::PasswordTooLong);
    }

    let password_hash = hash_password(new)?;
    state.db.update_user_password(user.id, &password_hash)?;
    if state.sessions.end(&user.username).is_err() {
        debug!("no session to end after password change");
    }
    info!("password changed");
    Ok(())
}
