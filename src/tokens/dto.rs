use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    auth::PublicUser,
    db::Database,
    tokens::repo_types::{Submission, SubmissionId, Token, TokenId},
};

#[derive(Debug, Clone, Serialize)]
pub struct TokenView {
    pub id: TokenId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub note: String,
    pub url: String,
}

impl From<&Token> for TokenView {
    fn from(t: &Token) -> Self {
        Self {
            id: t.id,
            created_at: t.created_at,
            note: t.note.clone(),
            url: t.url.clone(),
        }
    }
}

/// A submission as shown in the review queue.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub id: SubmissionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author: PublicUser,
    pub token: TokenView,
    pub reviewed: bool,
}

impl Database {
    pub fn submission_view(&self, s: &Submission) -> Option<SubmissionView> {
        Some(SubmissionView {
            id: s.id,
            created_at: s.created_at,
            author: PublicUser::from(self.user(s.author_id)?),
            token: TokenView::from(self.token(s.token_id)?),
            reviewed: s.reviewed,
        })
    }

    pub fn review_queue(&self) -> Vec<SubmissionView> {
        self.pending_submissions()
            .into_iter()
            .filter_map(|s| self.submission_view(s))
            .collect()
    }
}
