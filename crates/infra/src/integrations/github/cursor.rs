//! Pagination state carried inside the opaque core cursor
//!
//! Encoded as `<page>` or `<page>:<etag>`. The etag is always the one seen on
//! page 1 of the current walk, so every page can report where the next cycle
//! should resume: page 1, conditional on that etag.

use repopulse_core::{Cursor, FetchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub etag: Option<String>,
}

impl PageCursor {
    pub fn first(etag: Option<String>) -> Self {
        Self { page: 1, etag }
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    /// Cursor for the page after this one, keeping the head etag.
    pub fn next(&self, page: u32) -> Self {
        Self { page, etag: self.etag.clone() }
    }

    /// Where the next cycle should start after this walk.
    pub fn resume(&self) -> Self {
        Self::first(self.etag.clone())
    }

    pub fn decode(cursor: &Cursor) -> Result<Self, FetchError> {
        let Some(token) = cursor.token() else {
            return Ok(Self::first(None));
        };

        let (page, etag) = match token.split_once(':') {
            Some((page, etag)) => (page, Some(etag.to_string()).filter(|e| !e.is_empty())),
            None => (token, None),
        };
        let page = page
            .parse::<u32>()
            .ok()
            .filter(|page| *page > 0)
            .ok_or_else(|| FetchError::Malformed(format!("unrecognised cursor `{token}`")))?;

        Ok(Self { page, etag })
    }

    pub fn encode(&self) -> Cursor {
        match &self.etag {
            Some(etag) => Cursor::from_token(format!("{}:{}", self.page, etag)),
            None => Cursor::from_token(self.page.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_cursor_is_first_page_without_etag() {
        assert_eq!(PageCursor::decode(&Cursor::start()).unwrap(), PageCursor::first(None));
    }

    #[test]
    fn etag_with_quotes_and_colons_survives() {
        let cursor = PageCursor { page: 3, etag: Some(r#"W/"abc:def""#.to_string()) };
        assert_eq!(PageCursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn rejects_garbage() {
        assert!(PageCursor::decode(&Cursor::from_token("zero")).is_err());
        assert!(PageCursor::decode(&Cursor::from_token("0")).is_err());
    }

    #[test]
    fn resume_returns_to_page_one() {
        let cursor = PageCursor { page: 2, etag: Some("\"x\"".into()) };
        assert_eq!(cursor.resume(), PageCursor::first(Some("\"x\"".into())));
    }
}
