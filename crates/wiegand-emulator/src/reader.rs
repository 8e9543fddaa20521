//! Wiegand reader plugin.
//!
//! [`WiegandReader`] is the unit the host schedules. It exposes four entry
//! points:
//!
//! | Entry point | When the host calls it |
//! |-------------|------------------------|
//! | [`init`](WiegandReader::init) | once, before the first poll |
//! | [`poll`](WiegandReader::poll) | periodically (default once per second) |
//! | [`timer_fired`](WiegandReader::timer_fired) | when a scheduled removal timer elapses |
//! | [`teardown`](WiegandReader::teardown) | once, when the task is stopped |
//!
//! Bits arrive through the interrupt handlers installed by `init`; `poll`
//! decodes whatever accumulated since the last completed frame.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};
use wiegand_core::{LineId, TaskIndex, WiegandConfig};
use wiegand_hardware::{BitAccumulator, EdgeInterrupts, Result, bindings};
use wiegand_protocol::{DecodeStep, FrameDecoder, FrameKind};

use crate::host::{ReaderEvent, ReaderHost};
use crate::presence::{CardPresence, RemovalAction};

/// Outcome of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No bits accumulated.
    Idle,
    /// Bits present but no complete frame. `abandoned` is set when the
    /// partial frame was dropped (stale or failed parity).
    Incomplete { abandoned: bool },
    /// A frame completed. `is_new` is false when the value matched the stored
    /// one.
    Completed {
        value: u64,
        kind: FrameKind,
        is_new: bool,
    },
}

/// Reader for one pair of Wiegand input lines.
#[derive(Debug)]
pub struct WiegandReader<I> {
    task: TaskIndex,
    config: WiegandConfig,
    interrupts: I,
    accumulator: Arc<BitAccumulator>,
    decoder: FrameDecoder,
    presence: CardPresence,
    attached: Vec<LineId>,
}

impl<I: EdgeInterrupts> WiegandReader<I> {
    /// Create a reader for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Core`](wiegand_hardware::HardwareError::Core)
    /// if the configuration does not validate.
    pub fn new(task: TaskIndex, config: WiegandConfig, interrupts: I) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            task,
            decoder: FrameDecoder::from_config(&config),
            config,
            interrupts,
            accumulator: Arc::new(BitAccumulator::new()),
            presence: CardPresence::Idle,
            attached: Vec::with_capacity(2),
        })
    }

    #[must_use]
    pub fn task(&self) -> TaskIndex {
        self.task
    }

    #[must_use]
    pub fn config(&self) -> &WiegandConfig {
        &self.config
    }

    /// The accumulator fed by this reader's edge handlers.
    #[must_use]
    pub fn accumulator(&self) -> &Arc<BitAccumulator> {
        &self.accumulator
    }

    #[must_use]
    pub fn presence(&self) -> CardPresence {
        self.presence
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.attached.is_empty()
    }

    /// Reset the decode state and attach both edge handlers.
    ///
    /// Calling `init` on an attached reader is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the attach error of the failing line. A line attached before
    /// the failure is detached again.
    pub fn init(&mut self) -> Result<()> {
        if self.is_attached() {
            return Ok(());
        }

        self.accumulator.clear();
        self.accumulator.take_overflows();
        self.decoder.reset();
        self.presence.reset();

        for binding in bindings(&self.config, &self.accumulator) {
            let line = binding.line;
            if let Err(e) = self.interrupts.attach_falling(line, binding.handler) {
                warn!(task = %self.task, line = %line, error = %e, "Edge interrupt attach failed");
                // The attach error is the one worth reporting.
                let _ = self.detach_all();
                return Err(e);
            }
            debug!(task = %self.task, line = %line, "Edge interrupt attached");
            self.attached.push(line);
        }

        info!(
            task = %self.task,
            frame_width = self.config.frame_width,
            "Wiegand reader started on {} and {}",
            self.config.input_pin1,
            self.config.input_pin2
        );
        Ok(())
    }

    /// Decode the bits accumulated since the last poll.
    pub fn poll<H: ReaderHost>(&mut self, host: &mut H) -> PollOutcome {
        let overflows = self.accumulator.take_overflows();
        if overflows > 0 {
            warn!(task = %self.task, overflows, "RFID : bit buffer overflow, frame discarded");
        }

        let snapshot = self.accumulator.snapshot();
        let step = self.decoder.decode(snapshot);
        if step.clears_accumulator() {
            self.accumulator.consume(snapshot);
        }

        match step {
            DecodeStep::Idle => PollOutcome::Idle,
            DecodeStep::Pending { timeouts } => {
                trace!(task = %self.task, %snapshot, timeouts, "Partial frame");
                PollOutcome::Incomplete { abandoned: false }
            }
            DecodeStep::Stale { bit_count } => {
                info!(task = %self.task, bit_count, "RFID : reset bits");
                PollOutcome::Incomplete { abandoned: true }
            }
            DecodeStep::ParityError { raw, bit_count } => {
                warn!(task = %self.task, bit_count, "RFID : parity error in frame {:#x}", raw);
                PollOutcome::Incomplete { abandoned: true }
            }
            DecodeStep::Complete(frame) => {
                let is_new = host.value(self.task) != frame.value;
                if is_new {
                    host.set_value(self.task, frame.value);
                    info!(task = %self.task, "RFID : New {} {}", frame.kind, frame.value);
                    host.publish(ReaderEvent::card_read(self.task, frame.value, frame.kind));
                } else {
                    info!(task = %self.task, "RFID : Old {} {}", frame.kind, frame.value);
                }

                let delay = self.config.remove_delay();
                self.presence.arm(delay);
                host.schedule(self.task, delay);

                PollOutcome::Completed {
                    value: frame.value,
                    kind: frame.kind,
                    is_new,
                }
            }
        }
    }

    /// Handle an elapsed removal timer.
    pub fn timer_fired<H: ReaderHost>(&mut self, host: &mut H) -> RemovalAction {
        let action = self.presence.fire(&self.config);
        if let RemovalAction::Remove { value, publish } = action {
            host.set_value(self.task, value);
            info!(task = %self.task, "RFID : Removed Tag");
            if publish {
                host.publish(ReaderEvent::card_removed(self.task, value));
            }
        }
        action
    }

    /// Detach both edge handlers and drop any partial frame.
    ///
    /// # Errors
    ///
    /// Returns the first detach error. Every line is still attempted.
    pub fn teardown(&mut self) -> Result<()> {
        let result = self.detach_all();
        self.accumulator.clear();
        self.decoder.reset();
        self.presence.reset();
        info!(task = %self.task, "Wiegand reader stopped");
        result
    }

    fn detach_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for line in self.attached.drain(..) {
            if let Err(e) = self.interrupts.detach(line) {
                warn!(task = %self.task, line = %line, error = %e, "Edge interrupt detach failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
