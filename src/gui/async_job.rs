//! Background work polled from the GUI thread.
//!
//! Each job runs on its own thread with a current-thread tokio runtime. The GUI
//! never blocks: it calls `poll` once per frame and picks up whatever arrived.

use anyhow::{anyhow, Result};
use futures::stream::{BoxStream, StreamExt};
use std::future::Future;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tokio::runtime::Builder;

/// One-shot background task.
pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T>>>,
}

impl<T> AsyncJob<T> {
    pub fn new(receiver: Receiver<Result<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Returns Some(result) once the job has completed, None while still running
    pub fn poll(&mut self) -> Option<Result<T>> {
        if let Some(rx) = &self.receiver {
            match rx.try_recv() {
                Ok(res) => {
                    self.receiver = None;
                    return Some(res);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.receiver = None;
                    return Some(Err(anyhow!("Worker task disconnected")));
                }
            }
        }
        None
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Run `builder()` to completion on a worker thread.
pub fn spawn_job<T, FutBuilder, Fut>(builder: FutBuilder) -> AsyncJob<T>
where
    T: Send + 'static,
    FutBuilder: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(builder()),
            Err(e) => Err(anyhow!("Failed to create async runtime: {}", e)),
        };
        let _ = tx.send(result);
    });
    AsyncJob::new(rx)
}

/// Items of a background stream, drained once per frame.
pub struct EventFeed<T> {
    receiver: Option<Receiver<T>>,
}

impl<T: Send + 'static> EventFeed<T> {
    /// Drive `events` on a worker thread and forward every item.
    pub fn spawn(events: BoxStream<'static, T>) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!("Failed to create async runtime for event feed: {}", e);
                    return;
                }
            };
            runtime.block_on(async move {
                let mut events = events;
                while let Some(event) = events.next().await {
                    if tx.send(event).is_err() {
                        // Receiver dropped; nobody is listening any more
                        break;
                    }
                }
            });
        });
        Self { receiver: Some(rx) }
    }

    /// Everything received since the last call.
    pub fn drain(&mut self) -> Vec<T> {
        let mut items = Vec::new();
        if let Some(rx) = &self.receiver {
            loop {
                match rx.try_recv() {
                    Ok(item) => items.push(item),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.receiver = None;
                        break;
                    }
                }
            }
        }
        items
    }

    /// False once the stream ended and everything was drained.
    pub fn is_open(&self) -> bool {
        self.receiver.is_some()
    }
}
