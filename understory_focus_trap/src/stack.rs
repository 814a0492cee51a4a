// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A stack of traps: nested modals, where closing the top one hands focus
//! control back to the one below.

use alloc::vec::Vec;

use crate::config::TrapConfig;
use crate::error::{InvalidTransition, TrapError, TrapState, TransitionKind};
use crate::event::{KeyEvent, PointerEvent};
use crate::host::Host;
use crate::trap::{FocusTrap, TrapAction, TrapListener};

struct Entry<H: Host> {
    trap: FocusTrap<H>,
    /// Whether pushing this trap paused the one below it.
    suspended: bool,
}

/// Traps stacked on one host. Only the top trap is wired.
///
/// Building pushes, demolishing pops, and Escape on a top trap configured to
/// demolish pops it too. A trap uncovered by a pop resumes if it was active
/// when it was covered.
pub struct TrapStack<H: Host> {
    entries: Vec<Entry<H>>,
}

impl<H: Host> core::fmt::Debug for TrapStack<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.trap))
            .finish()
    }
}

impl<H: Host> Default for TrapStack<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> TrapStack<H> {
    /// An empty stack.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of stacked traps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no trap is stacked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The top trap.
    pub fn top(&self) -> Option<&FocusTrap<H>> {
        self.entries.last().map(|e| &e.trap)
    }

    /// State of the top trap; [`TrapState::Unbuilt`] when empty.
    pub fn state(&self) -> TrapState {
        self.top().map_or(TrapState::Unbuilt, FocusTrap::state)
    }

    /// Build a new trap on top, suspending the current top.
    ///
    /// If the new trap cannot be built at all, the previous top is restored.
    pub fn push(&mut self, host: &mut H, config: TrapConfig<H::Element>) -> Result<(), TrapError> {
        let suspended = match self.entries.last_mut() {
            Some(top) if top.trap.state() == TrapState::Active => {
                top.trap.pause(host)?;
                true
            }
            _ => false,
        };
        let mut trap = FocusTrap::new();
        let result = trap.build(host, config);
        if trap.state() == TrapState::Unbuilt {
            self.reinstate_top(host, suspended);
            return result;
        }
        self.entries.push(Entry { trap, suspended });
        tracing::debug!(depth = self.entries.len(), "focus trap pushed");
        result
    }

    /// Demolish the top trap and hand control back to the one below.
    pub fn pop(&mut self, host: &mut H) -> Result<(), TrapError> {
        let Some(mut entry) = self.entries.pop() else {
            return Err(unbuilt(TransitionKind::Demolish));
        };
        let result = entry.trap.demolish(host);
        self.reinstate_top(host, entry.suspended);
        tracing::debug!(depth = self.entries.len(), "focus trap popped");
        result
    }

    /// Pause the top trap.
    pub fn pause(&mut self, host: &mut H) -> Result<(), TrapError> {
        match self.entries.last_mut() {
            Some(top) => top.trap.pause(host),
            None => Err(unbuilt(TransitionKind::Pause)),
        }
    }

    /// Resume the top trap.
    pub fn resume(&mut self, host: &mut H) -> Result<(), TrapError> {
        match self.entries.last_mut() {
            Some(top) => top.trap.resume(host),
            None => Err(unbuilt(TransitionKind::Resume)),
        }
    }

    /// Run one action: build pushes, demolish pops.
    pub fn apply(
        &mut self,
        host: &mut H,
        action: TrapAction<H::Element>,
    ) -> Result<(), TrapError> {
        match action {
            TrapAction::Build(config) => self.push(host, config),
            TrapAction::Pause => self.pause(host),
            TrapAction::Resume => self.resume(host),
            TrapAction::Demolish => self.pop(host),
        }
    }

    fn reinstate_top(&mut self, host: &mut H, was_active: bool) {
        if !was_active {
            return;
        }
        if let Some(top) = self.entries.last_mut()
            && let Err(err) = top.trap.resume(host)
        {
            tracing::debug!(error = %err, "uncovered focus trap not resumed");
        }
    }

    /// Drop a top trap that demolished itself (Escape).
    fn collect_demolished_top(&mut self, host: &mut H) {
        if self.state() == TrapState::Unbuilt
            && let Some(entry) = self.entries.pop()
        {
            self.reinstate_top(host, entry.suspended);
            tracing::debug!(depth = self.entries.len(), "focus trap popped by escape");
        }
    }
}

fn unbuilt(action: TransitionKind) -> TrapError {
    InvalidTransition {
        action,
        state: TrapState::Unbuilt,
    }
    .into()
}

impl<H: Host> TrapListener<H> for TrapStack<H> {
    fn on_keydown(&mut self, host: &mut H, event: &mut KeyEvent<H::Element>) {
        if let Some(top) = self.entries.last_mut() {
            top.trap.on_keydown(host, event);
            self.collect_demolished_top(host);
        }
    }

    fn on_pointer(&mut self, host: &mut H, event: &mut PointerEvent<H::Element>) {
        if let Some(top) = self.entries.last_mut() {
            top.trap.on_pointer(host, event);
        }
    }

    fn on_mutations(&mut self, host: &mut H) {
        if let Some(top) = self.entries.last_mut() {
            top.trap.on_mutations(host);
        }
    }
}
