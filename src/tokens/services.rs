use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{User, SYSTEM_USER_ID},
    db::Database,
    format::eastern_week_start,
    market::{Transaction, Transfer},
    tokens::{
        error::SubmissionError,
        repo_types::{Submission, SubmissionId, Token},
    },
};

const SPECIAL_CHARACTERS: &str = "@#$%^&*()-+?_=,<>{}`~[]:|'/\"\\";
const MAX_TITLE: usize = 40;
const JPG_EXTENSIONS: [&str; 4] = ["jpg", "JPG", "jpeg", "JPEG"];

fn image_path(url: &str) -> Option<&str> {
    lazy_static! {
        static ref HTTPS_RE: Regex =
            Regex::new(r"^https://[^/?#\s]+(?P<path>/[^?#\s]*)?(?:[?#]\S*)?$").unwrap();
    }
    let caps = HTTPS_RE.captures(url)?;
    Some(caps.name("path").map_or("", |m| m.as_str()))
}

fn is_jpg(path: &str) -> bool {
    path.rsplit('.')
        .next()
        .map_or(false, |ext| JPG_EXTENSIONS.contains(&ext))
}

fn check_title(db: &Database, title: &str) -> Result<(), SubmissionError> {
    if title.is_empty() {
        return Err(SubmissionError::TitleRequired);
    }
    if title.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(SubmissionError::TitleSpecialCharacters);
    }
    if title.chars().count() >= MAX_TITLE {
        return Err(SubmissionError::TitleTooLong);
    }
    if db.tokens().any(|t| t.note == title) {
        return Err(SubmissionError::TitleTaken);
    }
    Ok(())
}

/// Submissions the author made in the current US/Eastern week.
pub fn submissions_this_week(db: &Database, author: &User) -> usize {
    let week = eastern_week_start(db.now());
    db.submissions_by(author.id)
        .filter(|s| eastern_week_start(s.created_at) == week)
        .count()
}

/// Creates a disabled token and a pending submission for it.
///
/// `hash` is the perceptual hash of the image, computed by the caller.
#[instrument(skip(db, author, hash), fields(author = author.id))]
pub fn submit_token(
    db: &mut Database,
    author: &User,
    title: &str,
    url: &str,
    hash: &str,
) -> Result<(Token, Submission), SubmissionError> {
    if submissions_this_week(db, author) > 0 {
        warn!("weekly submission limit reached");
        return Err(SubmissionError::WeeklyLimit);
    }
    check_title(db, title)?;
    if db.tokens().any(|t| t.url == url) {
        return Err(SubmissionError::DuplicateImage);
    }
    let path = image_path(url).ok_or(SubmissionError::BadUrl)?;
    if !is_jpg(path) {
        return Err(SubmissionError::NotJpg);
    }
    if db.tokens().any(|t| t.hash == hash) {
        warn!(%url, "image hash already submitted");
        return Err(SubmissionError::DuplicateImage);
    }

    let token = db.write_token(title, url, hash, true)?;
    let submission = db.write_submission(author.id, token.id)?;
    info!(token_id = token.id, submission_id = submission.id, "token submitted");
    Ok((token, submission))
}

fn pending(db: &Database, reviewer: &User, id: SubmissionId) -> Result<Submission, SubmissionError> {
    if !reviewer.admin {
        warn!(reviewer = reviewer.id, "non-admin review attempt");
        return Err(SubmissionError::NotAdmin);
    }
    let submission = db.submission(id).ok_or(SubmissionError::NotFound(id))?;
    if submission.reviewed {
        return Err(SubmissionError::AlreadyReviewed(id));
    }
    Ok(submission.clone())
}

/// Enables the token and mints it to the author.
#[instrument(skip(db, reviewer), fields(reviewer = reviewer.id))]
pub fn approve(db: &mut Database, reviewer: &User, id: SubmissionId) -> Result<Transaction, SubmissionError> {
    let submission = pending(db, reviewer, id)?;
    db.set_token_disabled(submission.token_id, false)?;
    db.mark_submission_reviewed(id)?;
    let tx = db.write_transaction(
        SYSTEM_USER_ID,
        submission.author_id,
        Transfer::Token(submission.token_id),
    )?;
    info!(submission_id = id, token_id = submission.token_id, "submission approved");
    Ok(tx)
}

#[instrument(skip(db, reviewer), fields(reviewer = reviewer.id))]
pub fn deny(db: &mut Database, reviewer: &User, id: SubmissionId) -> Result<(), SubmissionError> {
    pending(db, reviewer, id)?;
    db.mark_submission_reviewed(id)?;
    info!(submission_id = id, "submission denied");
    Ok(())
}
