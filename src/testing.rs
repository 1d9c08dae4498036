//! Mock implementations for testing
//!
//! Every platform mock appends to one shared `PlatformLog` so a test can
//! hand the mocks to a controller and still inspect what they received.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::client::QuoteSource;
use crate::error::{FetchError, PlatformError, SpeechInitError};
use crate::platform::{
    AudioOutput, ClipboardService, NotificationService, Platform, ShareRequest, ShareService,
    SpeechService, Utterance,
};
use crate::quote::Quote;
use crate::session::{Control, Pulse, SessionView};

// ============================================================================
// Mock quote source
// ============================================================================

type PendingQuote = oneshot::Receiver<Result<Quote, FetchError>>;

/// Answers each fetch with the next queued response, in call order.
/// Pending responses let a test decide when a fetch completes.
pub struct MockQuoteSource {
    responses: Mutex<VecDeque<PendingQuote>>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a response that is available immediately.
    pub fn push_ready(&self, result: Result<Quote, FetchError>) {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        self.responses.lock().unwrap().push_back(rx);
    }

    /// Queue a response the test completes later through the sender.
    pub fn push_pending(&self) -> oneshot::Sender<Result<Quote, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn fetch_random_quote(&self) -> Result<Quote, FetchError> {
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("response dropped".into()))),
            None => Err(FetchError::Network("No mock response queued".into())),
        }
    }
}

// ============================================================================
// Mock platform
// ============================================================================

/// Everything the mock platform saw, plus knobs for failure injection.
pub struct PlatformLog {
    pub init_result: Result<(), SpeechInitError>,
    pub utterances: Vec<Utterance>,
    pub stops: u32,
    pub shutdowns: u32,
    pub focus_requests: u32,
    pub focus_abandons: u32,
    pub volumes: Vec<u32>,
    pub clipboard: Vec<(String, String)>,
    pub fail_clipboard: bool,
    pub shares: Vec<ShareRequest>,
    pub notices: Vec<String>,
}

impl Default for PlatformLog {
    fn default() -> Self {
        Self {
            init_result: Ok(()),
            utterances: Vec::new(),
            stops: 0,
            shutdowns: 0,
            focus_requests: 0,
            focus_abandons: 0,
            volumes: Vec::new(),
            clipboard: Vec::new(),
            fail_clipboard: false,
            shares: Vec::new(),
            notices: Vec::new(),
        }
    }
}

pub type SharedLog = Arc<Mutex<PlatformLog>>;

/// Maximum level of the mock's music stream.
pub const MOCK_MAX_VOLUME: u32 = 15;

struct MockSpeech(SharedLog);

impl SpeechService for MockSpeech {
    fn init(&mut self, _language: &str) -> Result<(), SpeechInitError> {
        self.0.lock().unwrap().init_result.clone()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), PlatformError> {
        self.0.lock().unwrap().utterances.push(utterance.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.0.lock().unwrap().stops += 1;
    }

    fn shutdown(&mut self) {
        self.0.lock().unwrap().shutdowns += 1;
    }
}

struct MockAudio(SharedLog);

impl AudioOutput for MockAudio {
    fn request_transient_focus(&mut self) -> Result<(), PlatformError> {
        self.0.lock().unwrap().focus_requests += 1;
        Ok(())
    }

    fn abandon_focus(&mut self) {
        self.0.lock().unwrap().focus_abandons += 1;
    }

    fn max_volume(&self) -> u32 {
        MOCK_MAX_VOLUME
    }

    fn set_volume(&mut self, level: u32) -> Result<(), PlatformError> {
        self.0.lock().unwrap().volumes.push(level);
        Ok(())
    }
}

struct MockClipboard(SharedLog);

impl ClipboardService for MockClipboard {
    fn set_text(&mut self, label: &str, text: &str) -> Result<(), PlatformError> {
        let mut log = self.0.lock().unwrap();
        if log.fail_clipboard {
            return Err(PlatformError::new("clipboard unavailable"));
        }
        log.clipboard.push((label.to_string(), text.to_string()));
        Ok(())
    }
}

struct MockShare(SharedLog);

impl ShareService for MockShare {
    fn share(&mut self, request: &ShareRequest) -> Result<(), PlatformError> {
        self.0.lock().unwrap().shares.push(request.clone());
        Ok(())
    }
}

struct MockNotifier(SharedLog);

impl NotificationService for MockNotifier {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().notices.push(message.to_string());
    }
}

pub fn mock_platform() -> (Platform, SharedLog) {
    let log: SharedLog = Arc::new(Mutex::new(PlatformLog::default()));
    let platform = Platform {
        speech: Box::new(MockSpeech(log.clone())),
        audio: Box::new(MockAudio(log.clone())),
        clipboard: Box::new(MockClipboard(log.clone())),
        share: Box::new(MockShare(log.clone())),
        notifier: Arc::new(MockNotifier(log.clone())),
    };
    (platform, log)
}

// ============================================================================
// Recording view
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Quote(Quote),
    Loading(bool),
    Pulse(Control, Pulse),
}

#[derive(Clone, Default)]
pub struct RecordingView {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionView for RecordingView {
    fn show_quote(&mut self, quote: &Quote) {
        self.events.lock().unwrap().push(ViewEvent::Quote(quote.clone()));
    }

    fn set_loading(&mut self, loading: bool) {
        self.events.lock().unwrap().push(ViewEvent::Loading(loading));
    }

    fn pulse(&mut self, control: Control, pulse: Pulse) {
        self.events.lock().unwrap().push(ViewEvent::Pulse(control, pulse));
    }
}
