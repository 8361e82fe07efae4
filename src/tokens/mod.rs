pub mod dto;
mod error;
mod repo;
mod repo_types;
pub mod services;

pub use dto::{SubmissionView, TokenView};
pub use error::SubmissionError;
pub use repo_types::{Submission, SubmissionId, Token, TokenId};
