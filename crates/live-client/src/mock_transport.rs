//! Scripted in-memory transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use crate::transport::{Connector, Transport, TransportError, TransportReader, TransportWriter};

/// What the next connect attempt should do.
pub enum Script {
    Refuse,
    /// Deliver these frames, then close.
    Frames(Vec<&'static str>),
    /// Deliver these frames, then stay open.
    Hold(Vec<&'static str>),
}

#[derive(Default)]
pub struct Shared {
    pub scripts: Mutex<VecDeque<Script>>,
    pub attempts_at: Mutex<Vec<Instant>>,
    pub sent: Mutex<Vec<String>>,
}

impl Shared {
    pub fn attempts(&self) -> Vec<Instant> {
        self.attempts_at.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

pub struct MockConnector(pub Arc<Shared>);

impl MockConnector {
    pub fn new(scripts: Vec<Script>) -> (Self, Arc<Shared>) {
        let shared = Arc::new(Shared::default());
        *shared.scripts.lock().unwrap() = scripts.into();
        (Self(Arc::clone(&shared)), shared)
    }
}

pub struct MockTransport {
    frames: VecDeque<String>,
    hold: bool,
    shared: Arc<Shared>,
}

pub struct MockReader {
    frames: VecDeque<String>,
    hold: bool,
}

pub struct MockWriter(Arc<Shared>);

impl TransportReader for MockReader {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        match self.frames.pop_front() {
            Some(f) => Ok(Some(f)),
            None if self.hold => std::future::pending().await,
            None => Ok(None),
        }
    }
}

impl TransportWriter for MockWriter {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.0.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

impl Transport for MockTransport {
    type Reader = MockReader;
    type Writer = MockWriter;

    fn split(self) -> (MockReader, MockWriter) {
        (
            MockReader {
                frames: self.frames,
                hold: self.hold,
            },
            MockWriter(self.shared),
        )
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, _url: &str) -> Result<MockTransport, TransportError> {
        self.0.attempts_at.lock().unwrap().push(Instant::now());
        let script = self.0.scripts.lock().unwrap().pop_front();
        let (frames, hold) = match script {
            Some(Script::Refuse) | None => {
                return Err(TransportError::Connect("refused".into()));
            }
            Some(Script::Frames(f)) => (f, false),
            Some(Script::Hold(f)) => (f, true),
        };
        Ok(MockTransport {
            frames: frames.into_iter().map(String::from).collect(),
            hold,
            shared: Arc::clone(&self.0),
        })
    }
}
