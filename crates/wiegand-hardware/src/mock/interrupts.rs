//! In-memory interrupt controller.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use wiegand_core::LineId;

use crate::edge::EdgeHandler;
use crate::error::{HardwareError, Result};
use crate::traits::EdgeInterrupts;

#[derive(Debug, Default)]
struct Lines {
    handlers: HashMap<LineId, EdgeHandler>,
    refuse: HashSet<LineId>,
}

/// Interrupt controller whose edges are raised by calling [`fire`](Self::fire).
///
/// Clones share the same lines, so a test can keep one clone to fire edges
/// while the reader owns another.
#[derive(Debug, Clone, Default)]
pub struct MockInterrupts {
    lines: Arc<Mutex<Lines>>,
}

impl MockInterrupts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next attach on `line` fail.
    pub fn refuse(&self, line: LineId) {
        self.with_lines(|lines| {
            lines.refuse.insert(line);
        });
    }

    /// Deliver one falling edge on `line`.
    ///
    /// Returns false when nothing is attached to the line.
    pub fn fire(&self, line: LineId) -> bool {
        // Clone out so the handler runs without the controller lock held.
        let handler = self.with_lines(|lines| lines.handlers.get(&line).cloned());
        match handler {
            Some(handler) => {
                handler.on_falling_edge();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_attached(&self, line: LineId) -> bool {
        self.with_lines(|lines| lines.handlers.contains_key(&line))
    }

    /// Lines with a handler, in ascending order.
    #[must_use]
    pub fn attached_lines(&self) -> Vec<LineId> {
        let mut attached =
            self.with_lines(|lines| lines.handlers.keys().copied().collect::<Vec<_>>());
        attached.sort();
        attached
    }

    fn with_lines<T>(&self, f: impl FnOnce(&mut Lines) -> T) -> T {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut lines)
    }
}

impl EdgeInterrupts for MockInterrupts {
    fn attach_falling(&mut self, line: LineId, handler: EdgeHandler) -> Result<()> {
        self.with_lines(|lines| {
            if lines.refuse.remove(&line) {
                return Err(HardwareError::attach(line, "refused by mock"));
            }
            if lines.handlers.contains_key(&line) {
                return Err(HardwareError::attach(line, "line already attached"));
            }
            lines.handlers.insert(line, handler);
            Ok(())
        })
    }

    fn detach(&mut self, line: LineId) -> Result<()> {
        self.with_lines(|lines| {
            lines
                .handlers
                .remove(&line)
                .map(|_| ())
                .ok_or_else(|| HardwareError::detach(line, "line not attached"))
        })
    }
}
