//! Scripted fetcher and in-memory sink shared by the export tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::fetcher::ImageFetcher;
use super::plan::DownloadTask;
use super::sink::SaveSink;
use crate::error::{Error, FetchError};

/// How a scripted URL behaves
#[derive(Clone, Copy, Debug)]
pub(crate) enum Script {
    Succeed { delay: Duration },
    Fail { status: u16 },
    FailTimes { status: u16, times: usize },
}

impl Script {
    pub(crate) fn delay_ms(ms: u64) -> Self {
        Script::Succeed {
            delay: Duration::from_millis(ms),
        }
    }

    pub(crate) fn fail(status: u16) -> Self {
        Script::Fail { status }
    }

    /// Fail with `status` for the first `times` calls, then succeed
    pub(crate) fn fail_times(status: u16, times: usize) -> Self {
        Script::FailTimes { status, times }
    }
}

/// Ordered start/end events, one sequence number per event
#[derive(Clone, Debug, Default)]
pub(crate) struct FetchLog {
    starts: HashMap<String, usize>,
    ends: HashMap<String, usize>,
}

impl FetchLog {
    pub(crate) fn start_of(&self, url: &str) -> usize {
        *self.starts.get(url).unwrap_or_else(|| panic!("{url} never started"))
    }

    pub(crate) fn end_of(&self, url: &str) -> usize {
        *self.ends.get(url).unwrap_or_else(|| panic!("{url} never ended"))
    }
}

/// [`ImageFetcher`] answering from per-URL scripts; successful bodies are the URL bytes
pub(crate) struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    default: Script,
    sequence: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    log: Mutex<FetchLog>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            default: Script::delay_ms(0),
            sequence: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            log: Mutex::new(FetchLog::default()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    pub(crate) fn with_default(mut self, script: Script) -> Self {
        self.default = script;
        self
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn log(&self) -> FetchLog {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn next_sequence(&self) -> usize {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let seq = self.next_sequence();
        self.log.lock().unwrap().starts.insert(url.to_string(), seq);

        let script = self.scripts.get(url).copied().unwrap_or(self.default);
        let outcome = match script {
            Script::Succeed { delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(url.as_bytes().to_vec())
            }
            Script::Fail { status } => Err(FetchError::Status { status }),
            Script::FailTimes { status, times } if call <= times => {
                Err(FetchError::Status { status })
            }
            Script::FailTimes { .. } => Ok(url.as_bytes().to_vec()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let seq = self.next_sequence();
        self.log.lock().unwrap().ends.insert(url.to_string(), seq);
        outcome
    }
}

/// `n` tasks for `https://img.test/{i}.jpg`, one image per record
pub(crate) fn tasks(n: usize) -> Vec<DownloadTask> {
    (1..=n)
        .map(|i| DownloadTask {
            source_url: format!("https://img.test/{i}.jpg"),
            target_name: format!("image_{i}_1.jpg"),
        })
        .collect()
}

/// [`SaveSink`] keeping every saved file in memory
#[derive(Default)]
pub(crate) struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub(crate) fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SaveSink for MemorySink {
    async fn save(&self, filename: &str, contents: Vec<u8>) -> crate::Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), contents));
        Ok(())
    }
}

/// [`SaveSink`] that rejects every file
pub(crate) struct FailingSink;

#[async_trait::async_trait]
impl SaveSink for FailingSink {
    async fn save(&self, _filename: &str, _contents: Vec<u8>) -> crate::Result<()> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "disk is read-only",
        )))
    }
}
