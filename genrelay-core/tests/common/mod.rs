//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use futures::Stream;
use genrelay_core::config::RequestDefaults;
use genrelay_core::{Backend, BackendError, BackendResult, FragmentStream, GenerationRequest, Relay};
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

/// What a scripted backend does when called
#[derive(Clone)]
pub enum Script {
    Text(String),
    Fragments(Vec<BackendResult<String>>),
    Fail(BackendError),
    Panic,
}

/// Backend fake that replays a fixed script and records its calls
pub struct ScriptedBackend {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::new(Script::Text(text.to_string()))
    }

    pub fn fragments(fragments: &[&str]) -> Arc<Self> {
        Self::new(Script::Fragments(
            fragments.iter().map(|f| Ok(f.to_string())).collect(),
        ))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn record(&self, request: &GenerationRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_once(&self, request: &GenerationRequest) -> BackendResult<String> {
        self.record(request);
        match &self.script {
            Script::Text(text) => Ok(text.clone()),
            Script::Fragments(items) => items.iter().cloned().collect(),
            Script::Fail(err) => Err(err.clone()),
            Script::Panic => panic!("scripted backend exploded"),
        }
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> BackendResult<FragmentStream> {
        self.record(request);
        match &self.script {
            Script::Text(text) => Ok(Box::pin(futures::stream::iter(vec![Ok(text.clone())]))),
            Script::Fragments(items) => Ok(Box::pin(futures::stream::iter(items.clone()))),
            Script::Fail(err) => Err(err.clone()),
            Script::Panic => panic!("scripted backend exploded"),
        }
    }
}

/// Relay over a scripted backend with default request settings
pub fn relay_with(backend: Arc<ScriptedBackend>) -> Relay {
    Relay::new(backend, RequestDefaults::default())
}

/// Fragment source that records how often it is polled and whether it was dropped
pub struct Tracked {
    items: VecDeque<String>,
    polls: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

/// Observers for a `Tracked` source
#[derive(Clone)]
pub struct SourceWatch {
    pub polls: Arc<AtomicUsize>,
    pub dropped: Arc<AtomicBool>,
}

impl SourceWatch {
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

impl Tracked {
    pub fn new(items: &[&str]) -> (Self, SourceWatch) {
        let watch = SourceWatch {
            polls: Arc::new(AtomicUsize::new(0)),
            dropped: Arc::new(AtomicBool::new(false)),
        };
        let tracked = Self {
            items: items.iter().map(|s| s.to_string()).collect(),
            polls: Arc::clone(&watch.polls),
            dropped: Arc::clone(&watch.dropped),
        };
        (tracked, watch)
    }

    pub fn boxed(self) -> FragmentStream {
        Box::pin(self)
    }
}

impl Stream for Tracked {
    type Item = BackendResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(self.items.pop_front().map(Ok))
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a debug-level subscriber installed for the current thread and
/// return its result with everything that was logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}
