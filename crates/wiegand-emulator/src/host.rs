//! Host services consumed by a reader.
//!
//! The reader runs inside a larger sensor host that owns value storage,
//! event delivery and timers. Those services are reached through three narrow
//! traits so the same reader runs under the tokio runtime in this crate, under
//! a test harness, or under a foreign scheduler.
//!
//! [`MemoryHost`] implements all three in memory and records everything it is
//! asked to do.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wiegand_core::{Payload24, TaskIndex};
use wiegand_protocol::FrameKind;

/// Numeric value slot per task. Last write wins.
pub trait ValueStore {
    /// Current value of `task`; zero if never set.
    fn value(&self, task: TaskIndex) -> u64;

    fn set_value(&mut self, task: TaskIndex, value: u64);
}

/// Consumer-facing event delivery.
pub trait EventSink {
    fn publish(&mut self, event: ReaderEvent);
}

/// One-shot deferred callbacks.
///
/// The host calls [`WiegandReader::timer_fired`](crate::WiegandReader::timer_fired)
/// once `delay` has elapsed. Scheduled timers cannot be cancelled.
pub trait TimerScheduler {
    fn schedule(&mut self, task: TaskIndex, delay: Duration);
}

/// Everything a reader needs from its host.
pub trait ReaderHost: ValueStore + EventSink + TimerScheduler {}

impl<T: ValueStore + EventSink + TimerScheduler> ReaderHost for T {}

/// Event published by a reader or its runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReaderEvent {
    /// A frame decoded to a value different from the stored one.
    CardRead {
        task: TaskIndex,
        value: u64,
        kind: FrameKind,
        at: DateTime<Utc>,
    },
    /// The card-present timeout reset the stored value.
    CardRemoved {
        task: TaskIndex,
        value: u64,
        at: DateTime<Utc>,
    },
    /// A frame was written on the output lines.
    Transmitted {
        task: TaskIndex,
        payload: Payload24,
        at: DateTime<Utc>,
    },
    /// Writing a frame failed.
    TransmitFailed {
        task: TaskIndex,
        payload: Payload24,
        error: String,
        at: DateTime<Utc>,
    },
}

impl ReaderEvent {
    #[must_use]
    pub fn card_read(task: TaskIndex, value: u64, kind: FrameKind) -> Self {
        Self::CardRead {
            task,
            value,
            kind,
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn card_removed(task: TaskIndex, value: u64) -> Self {
        Self::CardRemoved {
            task,
            value,
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn transmitted(task: TaskIndex, payload: Payload24) -> Self {
        Self::Transmitted {
            task,
            payload,
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn transmit_failed(task: TaskIndex, payload: Payload24, error: impl Into<String>) -> Self {
        Self::TransmitFailed {
            task,
            payload,
            error: error.into(),
            at: Utc::now(),
        }
    }

    /// Task the event belongs to.
    #[must_use]
    pub fn task(&self) -> TaskIndex {
        match self {
            Self::CardRead { task, .. }
            | Self::CardRemoved { task, .. }
            | Self::Transmitted { task, .. }
            | Self::TransmitFailed { task, .. } => *task,
        }
    }

    /// When the event was created.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::CardRead { at, .. }
            | Self::CardRemoved { at, .. }
            | Self::Transmitted { at, .. }
            | Self::TransmitFailed { at, .. } => *at,
        }
    }
}

/// In-memory host recording values, events and timer requests.
#[derive(Debug, Default)]
pub struct MemoryHost {
    values: HashMap<TaskIndex, u64>,
    events: Vec<ReaderEvent>,
    timers: Vec<(TaskIndex, Duration)>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Published events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[ReaderEvent] {
        &self.events
    }

    /// Drain the published events.
    pub fn take_events(&mut self) -> Vec<ReaderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Timers requested so far, oldest first.
    #[must_use]
    pub fn timers(&self) -> &[(TaskIndex, Duration)] {
        &self.timers
    }

    /// Drain the requested timers.
    pub fn take_timers(&mut self) -> Vec<(TaskIndex, Duration)> {
        std::mem::take(&mut self.timers)
    }
}

impl ValueStore for MemoryHost {
    fn value(&self, task: TaskIndex) -> u64 {
        self.values.get(&task).copied().unwrap_or(0)
    }

    fn set_value(&mut self, task: TaskIndex, value: u64) {
        self.values.insert(task, value);
    }
}

impl EventSink for MemoryHost {
    fn publish(&mut self, event: ReaderEvent) {
        self.events.push(event);
    }
}

impl TimerScheduler for MemoryHost {
    fn schedule(&mut self, task: TaskIndex, delay: Duration) {
        self.timers.push((task, delay));
    }
}
