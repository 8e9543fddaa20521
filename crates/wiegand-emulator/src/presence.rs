//! Card-present timeout state machine.
//!
//! Every completed frame arms a one-shot removal timer. When the timer fires
//! and auto-removal is active, the stored value is reset to the configured
//! removal value, as if the card had been taken away.
//!
//! ```text
//!          arm            arm
//!   Idle ───────► Armed ◄──────┐
//!    ▲              │  └───────┘
//!    └──────────────┘
//!     last pending timer fired
//! ```
//!
//! Timers cannot be cancelled. A timer armed by an earlier frame still
//! applies removal after a later frame re-armed the state, so a card held on
//! the reader is reported removed roughly one delay after each read.

use std::fmt;
use std::time::Duration;

use wiegand_core::WiegandConfig;

/// Removal timer bookkeeping for one reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardPresence {
    /// No removal timer outstanding.
    #[default]
    Idle,
    /// At least one removal timer outstanding.
    Armed {
        /// Timers scheduled and not yet fired.
        pending: u32,
        /// Delay of the most recent arm.
        delay: Duration,
    },
}

/// What the reader must do when a removal timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalAction {
    /// Store the removal value; publish an event when `publish` is set.
    Remove { value: u64, publish: bool },
    /// Auto-removal is disabled; leave the stored value alone.
    Keep,
}

impl CardPresence {
    /// Record one more scheduled removal timer.
    pub fn arm(&mut self, delay: Duration) {
        let pending = match *self {
            CardPresence::Idle => 1,
            CardPresence::Armed { pending, .. } => pending.saturating_add(1),
        };
        *self = CardPresence::Armed { pending, delay };
    }

    /// Account for one fired timer and decide what it does.
    ///
    /// A timer firing while idle still yields the configured action; the host
    /// owns the timers and may deliver one this state never saw armed.
    pub fn fire(&mut self, config: &WiegandConfig) -> RemovalAction {
        if let CardPresence::Armed { pending, delay } = *self {
            *self = match pending {
                0 | 1 => CardPresence::Idle,
                n => CardPresence::Armed {
                    pending: n - 1,
                    delay,
                },
            };
        }

        if config.auto_remove_active() {
            RemovalAction::Remove {
                value: config.remove_value,
                publish: config.remove_event,
            }
        } else {
            RemovalAction::Keep
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self, CardPresence::Armed { .. })
    }

    /// Outstanding timers.
    #[must_use]
    pub fn pending(&self) -> u32 {
        match self {
            CardPresence::Idle => 0,
            CardPresence::Armed { pending, .. } => *pending,
        }
    }

    pub fn reset(&mut self) {
        *self = CardPresence::Idle;
    }
}

impl fmt::Display for CardPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardPresence::Idle => write!(f, "Idle"),
            CardPresence::Armed { pending, delay } => {
                write!(f, "Armed({pending} pending, {}ms)", delay.as_millis())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(auto_remove_disabled: bool, remove_event: bool) -> WiegandConfig {
        WiegandConfig {
            auto_remove_disabled,
            remove_event,
            remove_value: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_arm_then_fire_returns_to_idle() {
        let mut presence = CardPresence::default();
        assert!(!presence.is_armed());

        presence.arm(Duration::from_millis(250));
        assert_eq!(
            presence,
            CardPresence::Armed {
                pending: 1,
                delay: Duration::from_millis(250)
            }
        );

        presence.fire(&config(false, false));
        assert_eq!(presence, CardPresence::Idle);
    }

    #[test]
    fn test_rearm_keeps_earlier_timer_live() {
        let mut presence = CardPresence::default();
        presence.arm(Duration::from_millis(1000));
        presence.arm(Duration::from_millis(1000));
        assert_eq!(presence.pending(), 2);

        let action = presence.fire(&config(false, true));
        assert_eq!(
            action,
            RemovalAction::Remove {
                value: 7,
                publish: true
            }
        );
        assert!(presence.is_armed());

        presence.fire(&config(false, true));
        assert!(!presence.is_armed());
    }

    #[rstest]
    #[case(false, false, RemovalAction::Remove { value: 7, publish: false })]
    #[case(false, true, RemovalAction::Remove { value: 7, publish: true })]
    #[case(true, false, RemovalAction::Keep)]
    #[case(true, true, RemovalAction::Keep)]
    fn test_fire_action(
        #[case] auto_remove_disabled: bool,
        #[case] remove_event: bool,
        #[case] expected: RemovalAction,
    ) {
        let mut presence = CardPresence::default();
        presence.arm(Duration::from_millis(250));
        assert_eq!(
            presence.fire(&config(auto_remove_disabled, remove_event)),
            expected
        );
    }

    #[test]
    fn test_fire_while_idle_still_acts() {
        let mut presence = CardPresence::Idle;
        let action = presence.fire(&config(false, false));
        assert!(matches!(action, RemovalAction::Remove { .. }));
        assert_eq!(presence, CardPresence::Idle);
    }

    #[test]
    fn test_display() {
        let mut presence = CardPresence::Idle;
        assert_eq!(presence.to_string(), "Idle");
        presence.arm(Duration::from_millis(250));
        assert_eq!(presence.to_string(), "Armed(1 pending, 250ms)");
    }
}
