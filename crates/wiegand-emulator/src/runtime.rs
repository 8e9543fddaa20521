//! Tokio driver for a [`WiegandReader`].
//!
//! The runtime plays the part of the sensor host: it polls the reader on a
//! fixed interval, turns scheduled removal timers into sleeping tasks, keeps
//! the per-task value, and forwards events to a [`ReaderHandle`]. It can also
//! write frames on a fixed poll schedule, which together with the loopback
//! mocks exercises the whole read path without hardware.
//!
//! ```text
//!   interval ──► poll ──► ReaderEvent ──► mpsc ──► ReaderHandle::recv
//!                 │
//!                 └──► schedule(delay) ──► sleep ──► timer_fired
//!
//!   every N polls ──► spawn_blocking(FrameWriter::write)
//! ```
//!
//! On a tick that is due for a transmission the frame is written before the
//! poll, so a looped-back frame is decoded on the same tick.
//!
//! A frame write blocks for several milliseconds, so it runs on the blocking
//! pool. The writer sits behind a mutex and the loop awaits each write, so
//! two transmissions never overlap.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use wiegand_core::constants::{
    DEFAULT_TRANSMIT_EVERY_POLLS, SAMPLE_PAYLOAD_BASE, SAMPLE_PAYLOAD_SPAN,
};
use wiegand_core::{Bit, Payload24, TaskIndex};
use wiegand_hardware::{EdgeInterrupts, FrameWriter, HardwareError, Result};

use crate::host::{EventSink, ReaderEvent, TimerScheduler, ValueStore};
use crate::reader::WiegandReader;

/// Capacity of the event channel between the runtime and its handle.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Supplier of payloads for scheduled transmissions.
pub trait PayloadSource: Send {
    fn next_payload(&mut self) -> Payload24;
}

/// Deterministic sample payloads `10_000_001 + n`, n cycling through 1-500.
#[derive(Debug, Clone, Default)]
pub struct SamplePayloads {
    step: u32,
}

impl SamplePayloads {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayloadSource for SamplePayloads {
    fn next_payload(&mut self) -> Payload24 {
        self.step = self.step % SAMPLE_PAYLOAD_SPAN + 1;
        Payload24::truncating(SAMPLE_PAYLOAD_BASE + self.step)
    }
}

/// Periodic transmission settings.
pub struct TransmitSchedule {
    every_polls: u32,
    source: Box<dyn PayloadSource>,
}

impl TransmitSchedule {
    /// Transmit one payload from `source` every `every_polls` polls.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `every_polls` is zero.
    pub fn new(every_polls: u32, source: impl PayloadSource + 'static) -> Result<Self> {
        if every_polls == 0 {
            return Err(HardwareError::configuration(
                "transmit schedule needs a period of at least one poll",
            ));
        }
        Ok(Self {
            every_polls,
            source: Box::new(source),
        })
    }

    #[must_use]
    pub fn every_polls(&self) -> u32 {
        self.every_polls
    }

    fn is_due(&self, polls: u64) -> bool {
        polls % u64::from(self.every_polls) == 0
    }
}

impl Default for TransmitSchedule {
    fn default() -> Self {
        Self {
            every_polls: DEFAULT_TRANSMIT_EVERY_POLLS,
            source: Box::new(SamplePayloads::new()),
        }
    }
}

impl fmt::Debug for TransmitSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransmitSchedule")
            .field("every_polls", &self.every_polls)
            .finish_non_exhaustive()
    }
}

/// Host services backed by tokio channels.
struct RuntimeHost {
    values: HashMap<TaskIndex, u64>,
    events: mpsc::Sender<ReaderEvent>,
    timers: mpsc::UnboundedSender<TaskIndex>,
}

impl ValueStore for RuntimeHost {
    fn value(&self, task: TaskIndex) -> u64 {
        self.values.get(&task).copied().unwrap_or(0)
    }

    fn set_value(&mut self, task: TaskIndex, value: u64) {
        self.values.insert(task, value);
    }
}

impl EventSink for RuntimeHost {
    fn publish(&mut self, event: ReaderEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(task = %event.task(), "Event channel full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Event receiver dropped");
            }
        }
    }
}

impl TimerScheduler for RuntimeHost {
    fn schedule(&mut self, task: TaskIndex, delay: Duration) {
        let timers = self.timers.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The loop may have stopped; a late timer has nothing to do.
            let _ = timers.send(task);
        });
    }
}

/// Reader plus an optional writer, ready to be spawned.
pub struct ReaderRuntime<I, W> {
    reader: WiegandReader<I>,
    writer: Option<(Arc<Mutex<W>>, TransmitSchedule)>,
}

impl<I, W> ReaderRuntime<I, W>
where
    I: EdgeInterrupts + Send + 'static,
    W: FrameWriter + Send + 'static,
{
    #[must_use]
    pub fn new(reader: WiegandReader<I>) -> Self {
        Self {
            reader,
            writer: None,
        }
    }

    /// Write frames with `writer` on `schedule`.
    #[must_use]
    pub fn with_transmitter(mut self, writer: W, schedule: TransmitSchedule) -> Self {
        self.writer = Some((Arc::new(Mutex::new(writer)), schedule));
        self
    }

    /// Initialize the reader, idle the writer and start the driver task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the reader's init error, or the writer's pin error when
    /// driving the output lines idle fails. The reader is torn down again in
    /// that case.
    pub fn spawn(mut self) -> Result<ReaderHandle> {
        self.reader.init()?;
        if let Some((writer, _)) = &self.writer {
            let config = self.reader.config();
            info!(
                task = %self.reader.task(),
                "Wiegand Init. D0 Pin {}, D1 Pin {}",
                config.output_line(Bit::Zero),
                config.output_line(Bit::One)
            );
            let idle = writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .set_idle();
            if let Err(e) = idle {
                let _ = self.reader.teardown();
                return Err(e);
            }
        }

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = self.reader.task();

        let join = tokio::spawn(self.run(event_tx, shutdown_rx));

        Ok(ReaderHandle {
            task,
            events: event_rx,
            shutdown: Some(shutdown_tx),
            join,
        })
    }

    async fn run(
        mut self,
        events: mpsc::Sender<ReaderEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<()> {
        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
        let mut host = RuntimeHost {
            values: HashMap::new(),
            events,
            timers: timer_tx,
        };

        let mut ticker = tokio::time::interval(self.reader.config().poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls: u64 = 0;

        info!(task = %self.reader.task(), "Reader runtime started");
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                Some(task) = timer_rx.recv() => {
                    debug!(task = %task, "Removal timer fired");
                    self.reader.timer_fired(&mut host);
                }
                _ = ticker.tick() => {
                    polls += 1;
                    self.transmit_if_due(polls, &mut host).await;
                    self.reader.poll(&mut host);
                }
            }
        }

        info!(task = %self.reader.task(), polls, "Reader runtime stopping");
        self.reader.teardown()
    }

    async fn transmit_if_due(&mut self, polls: u64, host: &mut RuntimeHost) {
        let Some((writer, schedule)) = &mut self.writer else {
            return;
        };
        if !schedule.is_due(polls) {
            return;
        }

        let task = self.reader.task();
        let payload = schedule.source.next_payload();
        let writer = Arc::clone(writer);
        let result = tokio::task::spawn_blocking(move || {
            writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write(payload)
        })
        .await;

        match result {
            Ok(Ok(())) => host.publish(ReaderEvent::transmitted(task, payload)),
            Ok(Err(e)) => {
                warn!(task = %task, %payload, error = %e, "Wiegand write failed");
                host.publish(ReaderEvent::transmit_failed(task, payload, e.to_string()));
            }
            Err(e) => {
                error!(task = %task, %payload, error = %e, "Wiegand write task failed");
                host.publish(ReaderEvent::transmit_failed(task, payload, e.to_string()));
            }
        }
    }
}

impl<I: fmt::Debug, W> fmt::Debug for ReaderRuntime<I, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderRuntime")
            .field("reader", &self.reader)
            .field("transmits", &self.writer.is_some())
            .finish()
    }
}

/// Handle to a running reader.
///
/// Dropping the handle stops the driver task at its next wakeup.
#[derive(Debug)]
pub struct ReaderHandle {
    task: TaskIndex,
    events: mpsc::Receiver<ReaderEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<Result<()>>,
}

impl ReaderHandle {
    #[must_use]
    pub fn task(&self) -> TaskIndex {
        self.task
    }

    /// Next event, or `None` once the driver has stopped.
    pub async fn recv(&mut self) -> Option<ReaderEvent> {
        self.events.recv().await
    }

    /// Stop the driver and tear the reader down.
    ///
    /// # Errors
    ///
    /// Returns the reader's teardown error, or [`HardwareError::Task`] if the
    /// driver task panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(HardwareError::task(e.to_string())),
        }
    }
}
