//! Scripted `EventSource` mock

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use repopulse_core::{Cursor, EventSource, FetchError, FetchPage};
use repopulse_domain::RawEvent;

/// Replays a queue of responses in order and records every cursor it was
/// asked for. Once the script runs out it answers with empty pages.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<FetchPage, FetchError>>>,
    requested: Mutex<Vec<Cursor>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page whose `next_page` and `resume_from` are the given tokens.
    pub fn with_page(self, records: Vec<RawEvent>, next: Option<&str>, resume: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(FetchPage {
            records,
            next_page: next.map(Cursor::from_token),
            resume_from: Cursor::from_token(resume),
            rate_limit: None,
        }));
        self
    }

    pub fn with_error(self, error: FetchError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requested(&self) -> Vec<Cursor> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<FetchPage, FetchError> {
        self.requested.lock().unwrap().push(cursor.clone());
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| Ok(FetchPage::default()))
    }
}
