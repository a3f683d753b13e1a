//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! A bounded, non-blocking hand-off from the caller's thread to a single
//! background task that drives the byte-at-a-time processing closure.
//!
//! Mirrors the event-loop/control-channel shape of a connection worker:
//! one `tokio::spawn`ed task owns the receiver end and runs until the
//! sender side is dropped or [`BytePipeline::shutdown`] is called.

use crate::error::{EngineError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::trace;

/// Submits bytes into a bounded channel consumed by a background task.
///
/// `submit_byte`/`submit_bytes` never block: a full channel surfaces
/// [`EngineError::ChannelFull`] immediately rather than waiting for room.
pub struct BytePipeline {
    sender: Option<mpsc::Sender<u8>>,
    closed: Arc<AtomicBool>,
    pending: Arc<AtomicUsize>,
    task: Option<JoinHandle<()>>,
}

impl BytePipeline {
    /// Spawns the background consumer task. `on_byte` is called once per
    /// submitted byte, in submission order, on the tokio runtime the caller
    /// is running on.
    pub fn spawn<F>(capacity: usize, mut on_byte: F) -> Self
    where
        F: FnMut(u8) + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::channel(capacity.max(1));
        let pending = Arc::new(AtomicUsize::new(0));
        let pending_for_task = pending.clone();

        let task = tokio::spawn(async move {
            while let Some(byte) = receiver.recv().await {
                on_byte(byte);
                pending_for_task.fetch_sub(1, Ordering::AcqRel);
            }
            trace!("byte pipeline consumer task exiting");
        });

        Self { sender: Some(sender), closed: Arc::new(AtomicBool::new(false)), pending, task: Some(task) }
    }

    /// Enqueues one byte without blocking.
    pub fn submit_byte(&self, byte: u8) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(EngineError::Closed)?;
        self.pending.fetch_add(1, Ordering::AcqRel);
        match sender.try_send(byte) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                Err(EngineError::ChannelFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                Err(EngineError::Closed)
            }
        }
    }

    /// Enqueues each byte in order, stopping at the first failure.
    pub fn submit_bytes(&self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.submit_byte(byte)?;
        }
        Ok(())
    }

    /// Whether [`Self::shutdown`] has already run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Test-only helper: yields until every byte submitted so far has been
    /// handed to `on_byte`. Not meant for use on a live connection, where
    /// more bytes may arrive concurrently.
    pub async fn wait_for_processing(&self) {
        while self.pending.load(Ordering::Acquire) > 0 {
            tokio::task::yield_now().await;
        }
    }

    /// Closes the submission side and waits for the consumer task to drain
    /// and exit. Idempotent — calling this more than once is a no-op after
    /// the first call.
    pub async fn shutdown(&mut self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.sender = None;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for BytePipeline {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
        self.sender = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn processes_bytes_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_for_task = seen.clone();
        let pipeline = BytePipeline::spawn(16, move |byte| seen_for_task.lock().unwrap().push(byte));

        pipeline.submit_bytes(&[1, 2, 3]).unwrap();
        pipeline.wait_for_processing().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn submission_after_shutdown_is_rejected() {
        let mut pipeline = BytePipeline::spawn(16, |_byte| {});
        pipeline.shutdown().await;
        assert!(matches!(pipeline.submit_byte(1), Err(EngineError::Closed)));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut pipeline = BytePipeline::spawn(16, |_byte| {});
        pipeline.shutdown().await;
        pipeline.shutdown().await;
        assert!(pipeline.is_closed());
    }

    // Uses the default current-thread test runtime: the spawned consumer
    // task is scheduled but cannot run until this test function awaits
    // something, so a cap-1 channel fills deterministically on the second
    // submission.
    #[tokio::test]
    async fn full_channel_reports_backpressure_without_blocking() {
        let pipeline = BytePipeline::spawn(1, |_byte| {});

        assert!(pipeline.submit_byte(1).is_ok());
        assert!(matches!(pipeline.submit_byte(2), Err(EngineError::ChannelFull)));
    }
}
