//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lorenzo_client::blockchain::{
    msg_type, AnyMsg, ChainProvider, Msg, ProviderError, RelayerMessage, RelayerTxResponse,
    TxCallback,
};
use lorenzo_client::{Cancellation, ClientConfig};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the mock provider does on one broadcast.
#[derive(Debug, Clone)]
pub enum Step {
    /// Fail synchronously with this message.
    Fail(String),
    /// Hand off, then report an included tx with this code.
    Respond(u32),
    /// Hand off, then report this error through the callback.
    CallbackError(String),
    /// Hand off, then drop the callback without calling it.
    DropCallback,
    /// Hand off and keep the callback without ever calling it.
    Hold,
}

impl Step {
    pub fn fail(message: impl Into<String>) -> Self {
        Step::Fail(message.into())
    }

    pub fn callback_error(message: impl Into<String>) -> Self {
        Step::CallbackError(message.into())
    }
}

/// Scripted provider. Steps are consumed in order, then `fallback` repeats.
pub struct MockProvider {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    hold: Duration,
    calls: AtomicU32,
    in_flight: AtomicU32,
    peak: AtomicU32,
    stopped: AtomicBool,
    held: Mutex<Vec<TxCallback>>,
}

impl MockProvider {
    pub fn new(script: impl IntoIterator<Item = Step>, fallback: Step) -> Arc<Self> {
        Self::with_hold(script, fallback, Duration::ZERO)
    }

    /// Like `new`, but each broadcast takes `hold` to return.
    pub fn with_hold(
        script: impl IntoIterator<Item = Step>,
        fallback: Step,
        hold: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            hold,
            calls: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            peak: AtomicU32::new(0),
            stopped: AtomicBool::new(false),
            held: Mutex::new(Vec::new()),
        })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new([], step)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of broadcasts observed running at once.
    pub fn peak_concurrency(&self) -> u32 {
        self.peak.load(Ordering::SeqCst)
    }

    /// Callbacks kept by `Step::Hold` and never resolved.
    pub fn held_callbacks(&self) -> usize {
        self.held.lock().unwrap().len()
    }

    fn next_step(&self) -> Step {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl ChainProvider for MockProvider {
    async fn send_messages_to_mempool(
        &self,
        _ctx: &Cancellation,
        _msgs: &[RelayerMessage],
        _memo: &str,
        callbacks: Vec<TxCallback>,
    ) -> Result<(), ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.next_step() {
            Step::Fail(message) => Err(ProviderError::new(message)),
            Step::Respond(code) => {
                tokio::spawn(async move {
                    for callback in callbacks {
                        callback(Ok(RelayerTxResponse {
                            height: 100 + i64::from(call),
                            tx_hash: format!("TX{call}"),
                            codespace: if code == 0 { String::new() } else { "sdk".to_string() },
                            code,
                            ..Default::default()
                        }));
                    }
                });
                Ok(())
            }
            Step::CallbackError(message) => {
                tokio::spawn(async move {
                    for callback in callbacks {
                        callback(Err(ProviderError::new(message.clone())));
                    }
                });
                Ok(())
            }
            Step::DropCallback => {
                drop(callbacks);
                Ok(())
            }
            Step::Hold => {
                self.held.lock().unwrap().extend(callbacks);
                Ok(())
            }
        }
    }

    fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Config with the in-memory keyring and a short retry delay.
pub fn test_config() -> ClientConfig {
    let mut config = ClientConfig {
        keyring_backend: "memory".to_string(),
        ..ClientConfig::default()
    };
    config.retry.delay_ms = 5;
    config
}

pub fn header_msg() -> Arc<dyn Msg> {
    Arc::new(AnyMsg::new(msg_type::INSERT_HEADERS, vec![0x01, 0x02]))
}

pub fn claims_msg() -> Arc<dyn Msg> {
    Arc::new(AnyMsg::new(msg_type::CLAIMS, vec![0x03]))
}

/// Take the OS lock on `<key_directory>/keyring.lock` the way another process would.
pub fn hold_keyring_lock(key_directory: &Path) -> File {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(key_directory.join("keyring.lock"))
        .unwrap();
    file.try_lock().unwrap();
    file
}
