// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Device session: one native rig handle, its cache and its scheduler.
//!
//! A session starts [`SessionState::Closed`]. Once open, calls run on the
//! caller's thread. After [`RigSession::start`] every native call goes
//! through a single worker thread fed by a bounded FIFO queue, and a poller
//! thread refreshes the cached frequency, mode and PTT. Repeated failures
//! on the worker close the session and notify listeners once.
//!
//! The queue is driven through tokio's blocking channel API, so session
//! methods must not be called from inside an async runtime worker; wrap
//! them in `spawn_blocking` there.

mod cache;
mod ops;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{NativeResult, NativeStatus, RigError, RigResult};
use crate::registry::RigProvider;
use crate::rig::caps::CapabilitySet;
use crate::rig::controller::{
    FailureThreshold, ListenerId, RigEventEmitter, RigListener, SessionEvent, SessionState,
    SessionStateMachine, DEFAULT_FAILURE_LIMIT, MIN_POLL_INTERVAL,
};
use crate::rig::native::NativeRig;
use crate::rig::types::{conf, ConfToken, SerialSettings, Vfo};

pub use cache::{CacheUpdate, CachedState};

use scheduler::{Job, Scheduler};

/// Tunables for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Poll period, clamped to at least 250 ms.
    pub poll_interval: Duration,
    /// Consecutive worker failures that close the session.
    pub failure_threshold: u32,
    /// Queue slots; submitters block while it is full.
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: MIN_POLL_INTERVAL,
            failure_threshold: DEFAULT_FAILURE_LIMIT,
            queue_capacity: 64,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn stopping() -> RigError {
    RigError::invalid_state("session is stopping")
}

/// How a session is connected on open.
enum OpenMode {
    /// Backend defaults, no device path.
    Default,
    /// Device path; serial models are auto-bauded.
    Path(String),
    Serial(String, SerialSettings),
}

/// Which states accept a direct call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admit {
    Open,
    /// Configuration calls, valid before open as well.
    Any,
}

enum Route<'a> {
    Queued(MutexGuard<'a, Option<Scheduler>>),
    Direct,
}

fn submit(slot: &Option<Scheduler>, job: Job) -> RigResult<()> {
    slot.as_ref().ok_or_else(stopping)?.submit(job)
}

/// State shared between the session handle and its threads.
pub(crate) struct SessionShared {
    rig: Mutex<Box<dyn NativeRig>>,
    caps: Arc<CapabilitySet>,
    pub(crate) config: SessionConfig,
    threshold: FailureThreshold,
    cache: Mutex<CachedState>,
    machine: Mutex<SessionStateMachine>,
    events: RwLock<RigEventEmitter>,
    scheduler: Mutex<Option<Scheduler>>,
    failures: AtomicU32,
    shutdown_requested: AtomicBool,
    comm_lost: AtomicBool,
    disposed: AtomicBool,
}

#[derive(Debug, Clone, Copy)]
enum Refresh {
    Frequency,
    Mode,
    Ptt,
}

/// Wrap a fire-and-forget command: record its outcome, drop its error.
fn fire<F>(op: F) -> Job
where
    F: FnOnce(&SessionShared) -> RigResult<()> + Send + 'static,
{
    Box::new(move |shared| {
        let result = op(shared);
        shared.record_outcome(result.as_ref().err());
        if let Err(e) = result {
            debug!("Queued command failed: {}", e);
        }
    })
}

impl SessionShared {
    fn events(&self) -> RwLockReadGuard<'_, RigEventEmitter> {
        self.events.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn state(&self) -> SessionState {
        lock(&self.machine).state()
    }

    pub(crate) fn cached(&self) -> CachedState {
        lock(&self.cache).clone()
    }

    fn not_open(&self) -> RigError {
        if self.comm_lost.load(Ordering::SeqCst) {
            RigError::CommunicationLost
        } else {
            RigError::invalid_state("session is not open")
        }
    }

    fn transition(&self, event: SessionEvent) -> RigResult<()> {
        let (old, new) = {
            let mut machine = lock(&self.machine);
            let old = machine.process_event(event).ok_or_else(|| {
                RigError::invalid_state(format!("{event:?} not allowed while {}", machine.state()))
            })?;
            (old, machine.state())
        };
        info!("Session {} -> {}", old, new);
        self.events().notify_state_change(old, new);
        Ok(())
    }

    /// Run one native call under the handle lock and translate its status.
    pub(crate) fn native<T>(
        &self,
        op: impl FnOnce(&mut dyn NativeRig) -> NativeResult<T>,
    ) -> RigResult<T> {
        let mut rig = lock(&self.rig);
        op(&mut **rig).map_err(|status| {
            let text = rig.error_text(status);
            RigError::native(status, text)
        })
    }

    pub(crate) fn apply(&self, update: CacheUpdate) {
        let change = lock(&self.cache).apply(update);
        if let Some(change) = change {
            change.emit(&self.events());
        }
    }

    /// Count a worker outcome toward the failure threshold.
    pub(crate) fn record_outcome(&self, error: Option<&RigError>) {
        match error {
            None => {
                self.failures.store(0, Ordering::SeqCst);
                lock(&self.cache).last_status = None;
            }
            Some(e) => {
                let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                lock(&self.cache).last_status = Some(e.to_string());
                if self.threshold.tripped(failures)
                    && !self.shutdown_requested.swap(true, Ordering::SeqCst)
                {
                    warn!("{} consecutive failures, last: {}", failures, e);
                }
            }
        }
    }

    pub(crate) fn take_shutdown_request(&self) -> bool {
        self.shutdown_requested.swap(false, Ordering::SeqCst)
    }

    fn refresh(&self, what: Refresh) -> RigResult<()> {
        let update = match what {
            Refresh::Frequency => CacheUpdate::Frequency(self.native(|rig| rig.get_freq(Vfo::CURRENT))?),
            Refresh::Mode => {
                let (mode, width) = self.native(|rig| rig.get_mode(Vfo::CURRENT))?;
                CacheUpdate::Mode(mode, width)
            }
            Refresh::Ptt => CacheUpdate::Ptt(self.native(|rig| rig.get_ptt(Vfo::CURRENT))?),
        };
        self.apply(update);
        Ok(())
    }

    /// Decide where a call runs. While running, the returned guard keeps
    /// the scheduler in place until the job is submitted.
    fn route(&self, admit: Admit) -> RigResult<Route<'_>> {
        let slot = lock(&self.scheduler);
        match self.state() {
            SessionState::Running => Ok(Route::Queued(slot)),
            SessionState::Stopping => Err(stopping()),
            SessionState::Closed if admit == Admit::Open => Err(self.not_open()),
            SessionState::Open | SessionState::Closed => Ok(Route::Direct),
        }
    }

    /// One poll tick: queue the three refreshers and wait for the last.
    pub(crate) fn poll_once(&self) -> RigResult<()> {
        let Route::Queued(slot) = self.route(Admit::Open)? else {
            return Err(stopping());
        };
        let (done_tx, done_rx) = oneshot::channel();
        submit(&slot, fire(|s| s.refresh(Refresh::Frequency)))?;
        submit(&slot, fire(|s| s.refresh(Refresh::Mode)))?;
        submit(
            &slot,
            Box::new(move |s| {
                let result = s.refresh(Refresh::Ptt);
                s.record_outcome(result.as_ref().err());
                let _ = done_tx.send(());
            }),
        )?;
        drop(slot);
        done_rx.blocking_recv().map_err(|_| stopping())
    }

    pub(crate) fn shutdown_after_failures(&self) {
        let last_status = self.cached().last_status;
        self.comm_lost.store(true, Ordering::SeqCst);
        if let Err(e) = self.close() {
            warn!("Closing after communication loss failed: {}", e);
        }
        warn!(
            "Communication with {} lost: {}",
            self.caps.model_name,
            last_status.as_deref().unwrap_or("no status")
        );
        self.events().notify_communication_lost(last_status.as_deref());
    }

    fn set_conf(&self, name: &str, value: &str) -> RigResult<()> {
        let token = self.lookup(name)?;
        self.native(|rig| rig.set_conf(token, value))
    }

    fn get_conf(&self, name: &str) -> RigResult<String> {
        let token = self.lookup(name)?;
        self.native(|rig| rig.get_conf(token))
    }

    fn lookup(&self, name: &str) -> RigResult<ConfToken> {
        let token = self.native(|rig| rig.token_lookup(name))?;
        if token.is_null() {
            return Err(RigError::native(
                NativeStatus::InvalidParameter,
                format!("unknown configuration token {name}"),
            ));
        }
        Ok(token)
    }

    fn native_open(&self) -> RigResult<()> {
        self.native(|rig| rig.open()).map_err(|e| match e {
            RigError::NativeCallFailed { description, .. } => RigError::OpenFailed(description),
            other => other,
        })
    }

    /// Try each standard rate in the model's range until the rig answers.
    fn auto_baud(&self) -> RigResult<()> {
        for rate in self.caps.candidate_baud_rates() {
            debug!("Trying {} at {} baud", self.caps.model_name, rate);
            if let Err(e) = self.set_conf(conf::SERIAL_SPEED, &rate.to_string()) {
                debug!("Setting {} baud failed: {}", rate, e);
                continue;
            }
            if let Err(e) = self.native(|rig| rig.open()) {
                debug!("Open at {} baud failed: {}", rate, e);
                continue;
            }
            match self.native(|rig| rig.get_ptt(Vfo::CURRENT)) {
                Ok(_) => {
                    info!("{} answered at {} baud", self.caps.model_name, rate);
                    return Ok(());
                }
                Err(e) => {
                    debug!("No answer at {} baud: {}", rate, e);
                    if let Err(e) = self.native(|rig| rig.close()) {
                        debug!("Close after probe failed: {}", e);
                    }
                }
            }
        }
        Err(RigError::OpenFailed("unable to communicate with rig".into()))
    }

    fn apply_serial(&self, settings: &SerialSettings) -> RigResult<()> {
        self.set_conf(conf::SERIAL_SPEED, &settings.baud.to_string())?;
        self.set_conf(conf::DATA_BITS, &settings.data_bits.to_string())?;
        self.set_conf(conf::STOP_BITS, &settings.stop_bits.to_string())?;
        self.set_conf(conf::SERIAL_HANDSHAKE, settings.handshake.conf_value())
    }

    fn open(&self, mode: OpenMode) -> RigResult<()> {
        if self.state() != SessionState::Closed {
            return Err(RigError::invalid_state("session is already open"));
        }
        match mode {
            OpenMode::Default => self.native_open()?,
            OpenMode::Path(path) => {
                self.set_conf(conf::RIG_PATHNAME, &path)?;
                if self.caps.is_serial() {
                    self.auto_baud()?;
                } else {
                    self.native_open()?;
                }
            }
            OpenMode::Serial(path, settings) => {
                if !self.caps.is_serial() {
                    return Err(RigError::invalid_state(format!(
                        "{} is not a serial rig",
                        self.caps.model_name
                    )));
                }
                self.set_conf(conf::RIG_PATHNAME, &path)?;
                self.apply_serial(&settings)?;
                self.native_open()?;
            }
        }

        *lock(&self.cache) = CachedState::default();
        self.failures.store(0, Ordering::SeqCst);
        self.comm_lost.store(false, Ordering::SeqCst);
        self.transition(SessionEvent::Opened)
    }

    fn start(self: &Arc<Self>) -> RigResult<()> {
        let mut slot = lock(&self.scheduler);
        match self.state() {
            SessionState::Open => {}
            SessionState::Running | SessionState::Stopping => {
                return Err(RigError::invalid_state("session is already running"))
            }
            SessionState::Closed => return Err(self.not_open()),
        }

        let seeded = self.native(|rig| rig.get_freq(Vfo::CURRENT));
        {
            let mut cache = lock(&self.cache);
            match seeded {
                Ok(hz) => {
                    cache.frequency = hz;
                    cache.last_status = None;
                }
                Err(e) => {
                    warn!("Initial frequency read failed: {}", e);
                    cache.frequency = 0.0;
                    cache.last_status = Some(e.to_string());
                }
            }
        }
        self.failures.store(0, Ordering::SeqCst);
        self.shutdown_requested.store(false, Ordering::SeqCst);

        *slot = Some(Scheduler::spawn(Arc::clone(self))?);
        self.transition(SessionEvent::Started)
    }

    fn stop(&self) -> RigResult<()> {
        if self.state() != SessionState::Running {
            return Err(RigError::invalid_state("session is not running"));
        }
        self.transition(SessionEvent::StopRequested)?;
        let scheduler = lock(&self.scheduler).take();
        if let Some(scheduler) = scheduler {
            scheduler.shutdown();
        }
        self.transition(SessionEvent::Stopped)
    }

    fn close(&self) -> RigResult<()> {
        match self.state() {
            SessionState::Closed => return Ok(()),
            SessionState::Stopping => return Err(stopping()),
            SessionState::Running => self.stop()?,
            SessionState::Open => {}
        }
        let closed = self.native(|rig| rig.close());
        lock(&self.cache).frequency = 0.0;
        self.transition(SessionEvent::Closed)?;
        closed
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.close() {
            warn!("Close on dispose failed: {}", e);
        }
        if let Err(e) = self.native(|rig| rig.cleanup()) {
            warn!("Native cleanup failed: {}", e);
        }
    }
}

/// One connection to a physical or simulated rig.
pub struct RigSession {
    shared: Arc<SessionShared>,
}

impl RigSession {
    pub fn new(rig: Box<dyn NativeRig>, caps: Arc<CapabilitySet>, config: SessionConfig) -> Self {
        let threshold = FailureThreshold::new(config.failure_threshold);
        Self {
            shared: Arc::new(SessionShared {
                rig: Mutex::new(rig),
                caps,
                config,
                threshold,
                cache: Mutex::new(CachedState::default()),
                machine: Mutex::new(SessionStateMachine::new()),
                events: RwLock::new(RigEventEmitter::new()),
                scheduler: Mutex::new(None),
                failures: AtomicU32::new(0),
                shutdown_requested: AtomicBool::new(false),
                comm_lost: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Session for the model registered under `name`.
    pub fn from_provider(
        provider: &dyn RigProvider,
        name: &str,
        config: SessionConfig,
    ) -> RigResult<Self> {
        let caps = provider.registry().lookup(name)?;
        let rig = provider.create(&caps)?;
        Ok(Self::new(rig, caps, config))
    }

    pub fn caps(&self) -> &CapabilitySet {
        &self.shared.caps
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_connected()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Snapshot of the cache.
    pub fn cached(&self) -> CachedState {
        self.shared.cached()
    }

    pub fn last_status(&self) -> Option<String> {
        self.shared.cached().last_status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.shared.failures.load(Ordering::SeqCst)
    }

    pub fn add_listener(&self, listener: Arc<dyn RigListener>) -> ListenerId {
        self.shared
            .events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.shared
            .events
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .unregister(id);
    }

    /// Open on `path`. Serial models probe each standard rate in their
    /// supported range, lowest first.
    pub fn open(&self, path: &str) -> RigResult<()> {
        self.shared.open(OpenMode::Path(path.to_string()))
    }

    /// Open a serial model with explicit line settings.
    pub fn open_serial(&self, path: &str, settings: SerialSettings) -> RigResult<()> {
        self.shared
            .open(OpenMode::Serial(path.to_string(), settings))
    }

    /// Open with whatever port the backend defaults to.
    pub fn open_default(&self) -> RigResult<()> {
        self.shared.open(OpenMode::Default)
    }

    /// Spawn the worker and poller. Requires an open, stopped session.
    pub fn start(&self) -> RigResult<()> {
        self.shared.start()
    }

    /// Stop polling and drain the queue. Commands already queued still run.
    pub fn stop(&self) -> RigResult<()> {
        self.shared.stop()
    }

    /// Close the native connection, stopping first if running. Closing a
    /// closed session does nothing.
    pub fn close(&self) -> RigResult<()> {
        self.shared.close()
    }

    /// Fire-and-forget while running, synchronous otherwise.
    fn post<F>(&self, op: F) -> RigResult<()>
    where
        F: FnOnce(&SessionShared) -> RigResult<()> + Send + 'static,
    {
        match self.shared.route(Admit::Open)? {
            Route::Queued(slot) => submit(&slot, fire(op)),
            Route::Direct => op(&self.shared),
        }
    }

    /// Queued and awaited while running, synchronous otherwise.
    fn call<T, F>(&self, admit: Admit, op: F) -> RigResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SessionShared) -> RigResult<T> + Send + 'static,
    {
        match self.shared.route(admit)? {
            Route::Queued(slot) => {
                let (reply_tx, reply_rx) = oneshot::channel();
                submit(
                    &slot,
                    Box::new(move |s| {
                        let result = op(s);
                        s.record_outcome(result.as_ref().err());
                        let _ = reply_tx.send(result);
                    }),
                )?;
                drop(slot);
                reply_rx.blocking_recv().map_err(|_| stopping())?
            }
            Route::Direct => op(&self.shared),
        }
    }
}

impl Drop for RigSession {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}
