use thiserror::Error;

use crate::{store::StoreError, tokens::SubmissionId};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Title is required.")]
    TitleRequired,
    #[error("You submitted a token this week. Try later!")]
    WeeklyLimit,
    #[error("Title can't contain special characters.")]
    TitleSpecialCharacters,
    #[error("Title must be less than 40 characters.")]
    TitleTooLong,
    #[error("Another token already has this title.")]
    TitleTaken,
    #[error("This image has already been submitted.")]
    DuplicateImage,
    #[error("Please submit a properly formatted url.")]
    BadUrl,
    #[error("You can only submit JPG images.")]
    NotJpg,
    #[error("Only admins can review submissions.")]
    NotAdmin,
    #[error("Submission {0} does not exist.")]
    NotFound(SubmissionId),
    #[error("Submission {0} was already reviewed.")]
    AlreadyReviewed(SubmissionId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
