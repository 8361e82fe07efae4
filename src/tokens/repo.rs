use serde_json::{json, Value};

use crate::{
    auth::UserId,
    db::Database,
    store::{self, timestamp_cell, Record, Row},
    tokens::repo_types::{Submission, SubmissionId, Token, TokenId},
};

impl Record for Token {
    const TABLE: &'static str = "tokens";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> store::Result<Self> {
        Ok(Self {
            id: row.int("id")?,
            created_at: row.timestamp("created_at")?,
            note: row.text("note")?,
            url: row.text("url")?,
            hash: row.text("hash")?,
            disabled: row.flag("disabled")?,
        })
    }

    fn to_cells(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("created_at", timestamp_cell(self.created_at)),
            ("note", json!(self.note)),
            ("url", json!(self.url)),
            ("hash", json!(self.hash)),
            ("disabled", json!(self.disabled)),
        ]
    }
}

impl Record for Submission {
    const TABLE: &'static str = "submissions";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> store::Result<Self> {
        Ok(Self {
            id: row.int("id")?,
            created_at: row.timestamp("created_at")?,
            author_id: row.int("author_id")?,
            token_id: row.int("token_id")?,
            reviewed: row.flag("reviewed")?,
        })
    }

    fn to_cells(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("created_at", timestamp_cell(self.created_at)),
            ("author_id", json!(self.author_id)),
            ("token_id", json!(self.token_id)),
            ("reviewed", json!(self.reviewed)),
        ]
    }
}

impl Database {
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn submission(&self, id: SubmissionId) -> Option<&Submission> {
        self.submissions.get(&id)
    }

    pub fn submissions_by(&self, author: UserId) -> impl Iterator<Item = &Submission> {
        self.submissions.values().filter(move |s| s.author_id == author)
    }

    pub fn pending_submissions(&self) -> Vec<&Submission> {
        self.submissions.values().filter(|s| !s.reviewed).collect()
    }

    pub fn write_token(&mut self, note: &str, url: &str, hash: &str, disabled: bool) -> store::Result<Token> {
        let token = Token {
            id: self.next_id::<Token>()?,
            created_at: self.now(),
            note: note.to_string(),
            url: url.to_string(),
            hash: hash.to_string(),
            disabled,
        };
        self.append(&token)?;
        Ok(token)
    }

    pub fn write_submission(&mut self, author_id: UserId, token_id: TokenId) -> store::Result<Submission> {
        let submission = Submission {
            id: self.next_id::<Submission>()?,
            created_at: self.now(),
            author_id,
            token_id,
            reviewed: false,
        };
        self.append(&submission)?;
        Ok(submission)
    }

    pub fn set_token_disabled(&mut self, id: TokenId, disabled: bool) -> store::Result<()> {
        self.update_cell::<Token>(id, "disabled", json!(disabled))
    }

    pub fn mark_submission_reviewed(&mut self, id: SubmissionId) -> store::Result<()> {
        self.update_cell::<Submission>(id, "reviewed", json!(true))
    }
}
