//! Fetching the dialogue document.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use super::data::DialogueData;
use crate::core::error::{Result, ShellError};

/// Public endpoint serving the showcase's dialogue.
pub const MAGIC_WORDS_ENDPOINT: &str =
    "https://private-624120-softgamesassignment.apiary-mock.com/v2/magicwords";

/// A plain HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    /// A 200 response with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".into(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a URL.
pub trait JsonFetcher {
    /// Transport-level failures come back as a message.
    fn get(&self, url: &str) -> std::result::Result<HttpResponse, String>;
}

/// Fetcher serving canned responses by URL.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: FxHashMap<String, HttpResponse>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `url` (builder pattern).
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, response: HttpResponse) -> Self {
        self.responses.insert(url.into(), response);
        self
    }

    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl JsonFetcher for StaticFetcher {
    fn get(&self, url: &str) -> std::result::Result<HttpResponse, String> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| format!("no route to {url}"))
    }
}

/// GET `url` once and parse the dialogue document.
pub fn fetch_dialogue(fetcher: &dyn JsonFetcher, url: &str) -> Result<DialogueData> {
    let response = fetcher.get(url).map_err(ShellError::Fetch)?;
    if !response.is_ok() {
        return Err(ShellError::Fetch(format!(
            "Failed to fetch magic words: {} {}",
            response.status, response.status_text
        )));
    }
    serde_json::from_str(&response.body).map_err(|err| ShellError::Fetch(err.to_string()))
}
