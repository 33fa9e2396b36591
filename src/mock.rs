//! Mock transports and sinks for tests
//!
//! Scripted stand-ins for the device and the time-series sink. A
//! [`MockTransport`] hands out pre-built sessions in order and counts
//! logins; a [`MockSession`] serves canned page documents and can be
//! broken mid-test to simulate a dropped session.

use crate::client::{DeviceSession, DeviceTransport, PageId};
use crate::emitter::MeasurementSink;
use crate::error::{KotelError, Result};
use crate::measurements::MeasurementRecord;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted device transport
pub struct MockTransport {
    sessions: Mutex<VecDeque<MockSession>>,
    logins: AtomicUsize,
}

impl MockTransport {
    /// Script the sessions successive logins will produce, in order
    pub fn new(sessions: Vec<MockSession>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
            logins: AtomicUsize::new(0),
        }
    }

    /// Number of login handshakes performed so far
    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn open_session(&self) -> Result<Box<dyn DeviceSession>> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        let session = self
            .sessions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| KotelError::authentication("No scripted session left"))?;
        Ok(Box::new(session))
    }
}

/// Scripted device session serving canned page documents
///
/// Clones share state, so a test can keep a handle to a session it gave
/// to the transport and break it or inspect its fetch count later.
#[derive(Clone)]
pub struct MockSession {
    pages: Arc<HashMap<PageId, String>>,
    broken: Arc<AtomicBool>,
    poisoned: Arc<AtomicBool>,
    fetches: Arc<AtomicUsize>,
}

impl MockSession {
    /// Create a session serving the given page bodies
    pub fn new(pages: HashMap<PageId, String>) -> Self {
        Self {
            pages: Arc::new(pages),
            broken: Arc::new(AtomicBool::new(false)),
            poisoned: Arc::new(AtomicBool::new(false)),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every subsequent fetch through this session fail
    pub fn break_session(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent fetch return an unparsable body
    ///
    /// Models a backend that answers with its login page instead of the
    /// requested content after dropping the session server-side.
    pub fn serve_malformed(&self) {
        self.poisoned.store(true, Ordering::SeqCst);
    }

    /// Number of page fetches attempted through this session
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceSession for MockSession {
    async fn fetch_page(&self, page: PageId) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.broken.load(Ordering::SeqCst) {
            return Err(KotelError::connection("Scripted transport failure"));
        }
        if self.poisoned.load(Ordering::SeqCst) {
            return Ok("<HTML><BODY><FORM><INPUT TYPE=".to_string());
        }
        self.pages
            .get(&page)
            .cloned()
            .ok_or_else(|| KotelError::connection(format!("No scripted content for page {page}")))
    }
}

/// Sink that records every written measurement
///
/// Clones share the record log, so a test can hand a clone to an emitter
/// and inspect what was written afterwards.
#[derive(Clone)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<MeasurementRecord>>>,
    ack: bool,
}

impl RecordingSink {
    /// Create a sink that acknowledges every write
    pub fn new() -> Self {
        Self::with_ack(true)
    }

    /// Create a sink with a fixed acknowledgement answer
    pub fn with_ack(ack: bool) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            ack,
        }
    }

    /// Records written so far
    pub fn records(&self) -> Vec<MeasurementRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MeasurementSink for RecordingSink {
    async fn write(&self, record: &MeasurementRecord) -> Result<bool> {
        self.records.lock().unwrap().push(record.clone());
        Ok(self.ack)
    }
}
