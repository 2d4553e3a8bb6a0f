// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Worker and poller threads of a running session.

use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{RigError, RigResult};
use crate::rig::controller::{FixedPolling, PollingPolicy};

use super::SessionShared;

/// One unit of queued work. It runs on the worker thread and records its
/// own outcome before replying.
pub(crate) type Job = Box<dyn FnOnce(&SessionShared) + Send>;

pub(crate) struct Scheduler {
    queue: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
    poll_stop: Option<std_mpsc::Sender<()>>,
}

impl Scheduler {
    pub(crate) fn spawn(shared: Arc<SessionShared>) -> RigResult<Self> {
        let capacity = shared.config.queue_capacity.max(1);
        let (queue_tx, queue_rx) = mpsc::channel::<Job>(capacity);

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("hamrig-worker".into())
            .spawn(move || run_worker(worker_shared, queue_rx))
            .map_err(|e| RigError::Spawn(format!("worker thread: {e}")))?;

        let mut scheduler = Self {
            queue: Some(queue_tx),
            worker: Some(worker),
            poller: None,
            poll_stop: None,
        };

        let policy = FixedPolling::new(shared.config.poll_interval);
        let (stop_tx, stop_rx) = std_mpsc::channel();
        let poller = thread::Builder::new()
            .name("hamrig-poller".into())
            .spawn(move || run_poller(shared, policy, stop_rx));
        match poller {
            Ok(handle) => {
                scheduler.poller = Some(handle);
                scheduler.poll_stop = Some(stop_tx);
                Ok(scheduler)
            }
            Err(e) => {
                scheduler.shutdown();
                Err(RigError::Spawn(format!("poller thread: {e}")))
            }
        }
    }

    /// Enqueue `job`, blocking while the queue is full.
    pub(crate) fn submit(&self, job: Job) -> RigResult<()> {
        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| RigError::invalid_state("session is stopping"))?;
        queue
            .blocking_send(job)
            .map_err(|_| RigError::invalid_state("session is stopping"))
    }

    /// Stop polling, close the queue and wait for the worker to drain it.
    /// Safe to call from the poller thread itself.
    pub(crate) fn shutdown(mut self) {
        self.poll_stop.take();
        if let Some(poller) = self.poller.take() {
            if poller.thread().id() == thread::current().id() {
                debug!("Poller stopping its own scheduler");
            } else if poller.join().is_err() {
                warn!("Poller thread panicked");
            }
        }

        self.queue.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Worker thread panicked");
            }
        }
    }
}

fn run_worker(shared: Arc<SessionShared>, mut queue: mpsc::Receiver<Job>) {
    debug!("Worker started");
    let mut executed: u64 = 0;
    while let Some(job) = queue.blocking_recv() {
        job(&shared);
        executed += 1;
    }
    debug!("Worker drained, {} commands executed", executed);
}

fn run_poller(
    shared: Arc<SessionShared>,
    policy: FixedPolling,
    stop: std_mpsc::Receiver<()>,
) {
    debug!("Poller started, interval {:?}", policy.interval(false));
    loop {
        let transmitting = shared.cached().ptt.is_transmitting();
        match stop.recv_timeout(policy.interval(transmitting)) {
            Err(std_mpsc::RecvTimeoutError::Timeout) => {}
            _ => break,
        }

        if shared.take_shutdown_request() {
            info!("Failure threshold reached, shutting session down");
            shared.shutdown_after_failures();
            break;
        }

        if !policy.should_poll(transmitting) {
            continue;
        }
        if let Err(e) = shared.poll_once() {
            debug!("Poll tick abandoned: {}", e);
            break;
        }
    }
    debug!("Poller stopped");
}
