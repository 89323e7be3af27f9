//! The guest-book board component.
//!
//! Owns the full client-side cycle: poll the retrieval endpoint, render
//! each message through the sanitizing renderer, and submit new entries
//! with local validation first. The display layer on top only has to
//! show [`BoardState`] and forward typed input.
//!
//! Stale polls are not cancelled. Refresh and submit both take
//! `&mut self`, so one board instance never has two cycles in flight,
//! and the poll cadence is far longer than a round trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pista_render::{normalize_line_breaks, render_markdown};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub mod api;

/// One guest-book entry as the server returns it.
#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with an error body.
    #[error("{0}")]
    Server(String),

    /// The request never produced an answer.
    #[error("{0}")]
    Network(#[from] reqwest::Error),
}

#[async_trait]
pub trait Api: Send + Sync {
    async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError>;
    async fn post_message(&self, content: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: Api + ?Sized> Api for Arc<T> {
    async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError> {
        (**self).fetch_messages().await
    }

    async fn post_message(&self, content: &str) -> Result<(), ApiError> {
        (**self).post_message(content).await
    }
}

/// A message ready for display: sanitized HTML plus its formatted date.
#[derive(Clone, Debug)]
pub struct Entry {
    pub html: String,
    pub posted: String,
}

pub enum BoardState {
    Loading,
    Ready(Vec<Entry>),
    Error(String),
}

pub struct Board<A> {
    api: A,
    state: BoardState,
    input: String,
}

impl<A: Api> Board<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: BoardState::Loading,
            input: String::new(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// The current draft, kept across failed submissions.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Fetch the board and move to `Ready`, or to `Error` carrying the
    /// failure message. The next poll is the only retry.
    pub async fn refresh(&mut self) {
        match self.api.fetch_messages().await {
            Ok(messages) => {
                let entries = messages.iter().map(render_entry).collect();
                self.state = BoardState::Ready(entries);
            }
            Err(e) => self.state = BoardState::Error(e.to_string()),
        }
    }

    /// Submit the current draft. Blank drafts are dropped locally
    /// without a request. Success clears the draft and refreshes the
    /// board; failure reports the message and keeps the draft.
    pub async fn submit(&mut self) -> Result<(), ApiError> {
        let content = self.input.trim();
        if content.is_empty() {
            return Ok(());
        }

        let content = normalize_line_breaks(content);
        self.api.post_message(&content).await?;

        self.input.clear();
        self.refresh().await;
        Ok(())
    }
}

fn render_entry(message: &Message) -> Entry {
    Entry {
        html: render_markdown(&message.content),
        posted: format_posted(message.created_at),
    }
}

/// `{day} {Mon}. {year}`, e.g. `7 Jun. 2026`.
pub fn format_posted(at: DateTime<Utc>) -> String {
    at.format("%-d %b. %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockApi {
        messages: Mutex<Vec<Message>>,
        fetch_error: Option<String>,
        post_error: Option<String>,
        posts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Api for MockApi {
        async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError> {
            if let Some(e) = &self.fetch_error {
                return Err(ApiError::Server(e.clone()));
            }
            Ok(self.messages.lock().unwrap().clone())
        }

        async fn post_message(&self, content: &str) -> Result<(), ApiError> {
            self.posts.lock().unwrap().push(content.to_string());
            if let Some(e) = &self.post_error {
                return Err(ApiError::Server(e.clone()));
            }
            self.messages.lock().unwrap().insert(0, message(content));
            Ok(())
        }
    }

    fn message(content: &str) -> Message {
        Message {
            id: 0,
            content: content.to_string(),
            created_at: Utc::now(),
            user_id: None,
        }
    }

    #[test]
    fn a_new_board_is_loading() {
        let board = Board::new(Arc::new(MockApi::default()));
        assert!(matches!(board.state(), BoardState::Loading));
    }

    #[tokio::test]
    async fn refresh_renders_the_fetched_messages() {
        let api = Arc::new(MockApi::default());
        api.messages
            .lock()
            .unwrap()
            .extend([message("**hello**"), message("plain words")]);

        let mut board = Board::new(api);
        board.refresh().await;

        let BoardState::Ready(entries) = board.state() else {
            panic!("expected ready state");
        };
        assert_eq!(entries.len(), 2);
        assert!(
            entries[0].html.contains("<strong>hello</strong>"),
            "got: {}",
            entries[0].html
        );
        assert!(entries[1].html.contains("plain words"));
    }

    #[tokio::test]
    async fn refresh_failure_carries_the_message() {
        let api = Arc::new(MockApi {
            fetch_error: Some("Failed to fetch messages".to_string()),
            ..Default::default()
        });

        let mut board = Board::new(api);
        board.refresh().await;

        let BoardState::Error(message) = board.state() else {
            panic!("expected error state");
        };
        assert_eq!(message, "Failed to fetch messages");
    }

    #[tokio::test]
    async fn blank_submit_makes_no_request() {
        let api = Arc::new(MockApi::default());
        let mut board = Board::new(api.clone());

        board.set_input("   \n ");
        board.submit().await.unwrap();

        assert!(api.posts.lock().unwrap().is_empty());
        assert_eq!(board.input(), "   \n ");
    }

    #[tokio::test]
    async fn successful_submit_clears_input_and_refetches() {
        let api = Arc::new(MockApi::default());
        let mut board = Board::new(api.clone());

        board.set_input("see you friday");
        board.submit().await.unwrap();

        assert_eq!(*api.posts.lock().unwrap(), ["see you friday"]);
        assert_eq!(board.input(), "");

        let BoardState::Ready(entries) = board.state() else {
            panic!("expected ready state");
        };
        assert!(entries[0].html.contains("see you friday"));
    }

    #[tokio::test]
    async fn failed_submit_keeps_the_input() {
        let api = Arc::new(MockApi {
            post_error: Some("Too many requests. Try again later.".to_string()),
            ..Default::default()
        });
        let mut board = Board::new(api.clone());

        board.set_input("persistent draft");
        let err = board.submit().await.unwrap_err();

        assert!(matches!(err, ApiError::Server(_)));
        assert_eq!(err.to_string(), "Too many requests. Try again later.");
        assert_eq!(board.input(), "persistent draft");
        assert_eq!(api.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submit_normalizes_single_newlines() {
        let api = Arc::new(MockApi::default());
        let mut board = Board::new(api.clone());

        board.set_input("line one\nline two");
        board.submit().await.unwrap();

        assert_eq!(*api.posts.lock().unwrap(), ["line one  \nline two"]);
    }

    #[tokio::test]
    async fn submit_leaves_paragraph_breaks_alone() {
        let api = Arc::new(MockApi::default());
        let mut board = Board::new(api.clone());

        board.set_input("first\n\nsecond");
        board.submit().await.unwrap();

        assert_eq!(*api.posts.lock().unwrap(), ["first\n\nsecond"]);
    }

    #[test]
    fn posted_date_format() {
        let at = Utc.with_ymd_and_hms(2026, 6, 7, 12, 30, 0).unwrap();
        assert_eq!(format_posted(at), "7 Jun. 2026");

        let at = Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(format_posted(at), "31 Dec. 2025");
    }
}
