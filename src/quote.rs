//! Quote model and the quote service's wire format.

use serde::Deserialize;

/// A quote held by the session. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }

    /// Text handed to the speech engine.
    pub fn spoken_text(&self) -> String {
        format!("{} by {}", self.text, self.author)
    }

    /// Text placed on the clipboard and sent to the share flow.
    pub fn clip_text(&self) -> String {
        format!("{} - {}", self.text, self.author)
    }
}

/// One element of the service's JSON array. Extra fields (`h`, `c`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WireQuote {
    pub q: String,
    pub a: String,
}

impl From<WireQuote> for Quote {
    fn from(w: WireQuote) -> Self {
        Self {
            text: w.q,
            author: w.a,
        }
    }
}
