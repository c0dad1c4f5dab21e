#![forbid(unsafe_code)]

//! Scoped command registration and keystroke dispatch.
//!
//! # Design
//!
//! [`Dispatcher<A>`] is the process-wide key listener table. It is a cheap,
//! cloneable handle to shared single-threaded storage (`Rc<RefCell<..>>`), so
//! a host window and every screen it mounts can hold one.
//!
//! A screen calls [`Dispatcher::register`] with its ordered command list and
//! receives a [`Registration`] guard. Dropping the guard removes the commands,
//! so registration is reversed on every exit path of the owning screen:
//! normal teardown, early return, or unwinding. There is no way to touch a
//! registration after it has been removed, because the guard is gone.
//!
//! # Dispatch
//!
//! [`Dispatcher::dispatch`] consults live registrations from the most recent
//! to the oldest (the screen mounted last owns the keystroke) and returns at
//! most one action. Within a registration the [`CommandSet`] rules apply:
//! exact modifiers, first declared wins, disabled and focus-guarded commands
//! are skipped.
//!
//! # Failure Modes
//!
//! - **Re-entrant register during dispatch**: dispatch releases its borrow
//!   before returning the action, so applying the action may freely register
//!   or drop registrations.
//! - **Duplicate chords**: logged at `warn` on registration; the first
//!   declared command wins.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::KeyEvent;
use crate::keybinding::{Command, CommandSet, KeyContext, KeyDisposition};

/// One screen's commands inside the shared table.
struct Entry<A> {
    id: u64,
    label: String,
    commands: CommandSet<A>,
}

/// Shared interior for [`Dispatcher<A>`].
struct Table<A> {
    next_id: u64,
    /// Registration order; dispatch walks it back to front.
    entries: Vec<Entry<A>>,
}

impl<A> Table<A> {
    fn entry_mut(&mut self, id: u64) -> Option<&mut Entry<A>> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    fn entry(&self, id: u64) -> Option<&Entry<A>> {
        self.entries.iter().find(|e| e.id == id)
    }
}

/// Result of dispatching one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<A> {
    /// A command fired; apply this action once and suppress the default.
    Invoke(A),
    /// No command fired; let the event through.
    PassThrough,
}

impl<A> Dispatch<A> {
    /// What the host should do with the original event.
    #[must_use]
    pub fn disposition(&self) -> KeyDisposition {
        match self {
            Self::Invoke(_) => KeyDisposition::Consumed,
            Self::PassThrough => KeyDisposition::PassThrough,
        }
    }

    /// The action, if one fired.
    #[must_use]
    pub fn into_action(self) -> Option<A> {
        match self {
            Self::Invoke(action) => Some(action),
            Self::PassThrough => None,
        }
    }
}

/// Shared keyboard command table.
///
/// Cloning a `Dispatcher` creates a new handle to the **same** table.
pub struct Dispatcher<A> {
    inner: Rc<RefCell<Table<A>>>,
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Dispatcher")
            .field(
                "registrations",
                &inner.entries.iter().map(|e| e.label.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<A> Dispatcher<A> {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Table {
                next_id: 1,
                entries: Vec::new(),
            })),
        }
    }

    /// Register an ordered command list. It stays active until the returned
    /// guard is dropped.
    ///
    /// `label` identifies the owner in logs (e.g. `"chat-editor"`).
    #[must_use = "dropping the registration immediately unregisters the commands"]
    pub fn register(
        &self,
        label: impl Into<String>,
        commands: impl IntoIterator<Item = Command<A>>,
    ) -> Registration<A> {
        let label = label.into();
        let commands: CommandSet<A> = commands.into_iter().collect();

        for (winner, shadowed) in commands.conflicts() {
            if let (Some(w), Some(s)) = (commands.get(winner), commands.get(shadowed)) {
                tracing::warn!(
                    target: "mockup.keys",
                    owner = %label,
                    chord = %w.chord,
                    winner = %w.description,
                    shadowed = %s.description,
                    "duplicate key chord; first declared command wins"
                );
            }
        }

        let mut table = self.inner.borrow_mut();
        let id = table.next_id;
        table.next_id += 1;
        tracing::debug!(
            target: "mockup.keys",
            owner = %label,
            id,
            commands = commands.len(),
            "commands registered"
        );
        table.entries.push(Entry {
            id,
            label,
            commands,
        });

        Registration {
            id,
            table: Rc::downgrade(&self.inner),
        }
    }

    /// Number of live registrations.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Check whether a registration is still live in this dispatcher.
    #[must_use]
    pub fn is_registered(&self, registration: &Registration<A>) -> bool {
        let Some(table) = registration.table.upgrade() else {
            return false;
        };
        if !Rc::ptr_eq(&table, &self.inner) {
            return false;
        }
        let found = table.borrow().entry(registration.id).is_some();
        found
    }
}

impl<A: Clone> Dispatcher<A> {
    /// Resolve a key event against all live registrations.
    ///
    /// Returns at most one action; the newest registration is consulted first.
    pub fn dispatch(&self, event: &KeyEvent, ctx: KeyContext) -> Dispatch<A> {
        let table = self.inner.borrow();
        for entry in table.entries.iter().rev() {
            if let Some(command) = entry.commands.resolve(event, ctx) {
                tracing::trace!(
                    target: "mockup.keys",
                    owner = %entry.label,
                    chord = %command.chord,
                    command = %command.description,
                    "key dispatched"
                );
                return Dispatch::Invoke(command.action.clone());
            }
        }
        Dispatch::PassThrough
    }
}

/// Guard for one registered command list.
///
/// Dropping it unregisters the commands.
pub struct Registration<A> {
    id: u64,
    table: Weak<RefCell<Table<A>>>,
}

impl<A> fmt::Debug for Registration<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl<A> Registration<A> {
    /// True while the dispatcher that issued this registration is alive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let Some(table) = self.table.upgrade() else {
            return false;
        };
        let found = table.borrow().entry(self.id).is_some();
        found
    }

    /// Remove the commands now. Equivalent to dropping the guard.
    pub fn unregister(self) {
        drop(self);
    }

    /// Enable or disable every command whose action satisfies `pred`.
    ///
    /// Returns how many commands were touched (0 if the dispatcher is gone).
    pub fn set_enabled_where(&self, enabled: bool, pred: impl Fn(&A) -> bool) -> usize {
        let Some(table) = self.table.upgrade() else {
            return 0;
        };
        let mut table = table.borrow_mut();
        table
            .entry_mut(self.id)
            .map_or(0, |e| e.commands.set_enabled_where(enabled, pred))
    }

    /// Run `f` with this registration's command list (for help overlays).
    pub fn with_commands<R>(&self, f: impl FnOnce(&CommandSet<A>) -> R) -> Option<R> {
        let table = self.table.upgrade()?;
        let table = table.borrow();
        table.entry(self.id).map(|e| f(&e.commands))
    }
}

impl<A: Clone> Registration<A> {
    /// Resolve a key event against this registration only.
    #[must_use]
    pub fn resolve(&self, event: &KeyEvent, ctx: KeyContext) -> Option<A> {
        let table = self.table.upgrade()?;
        let table = table.borrow();
        let entry = table.entry(self.id)?;
        let command = entry.commands.resolve(event, ctx)?;
        tracing::trace!(
            target: "mockup.keys",
            owner = %entry.label,
            chord = %command.chord,
            command = %command.description,
            "key resolved"
        );
        Some(command.action.clone())
    }
}

impl<A: Clone> Registration<A> {
    /// Resolve a key event the way [`Dispatcher::dispatch`] would, but only
    /// return the action if this registration is the one that answers.
    ///
    /// Returns `None` when a newer registration claims the event first, so a
    /// screen handling its own keys never acts on a keystroke a modal owns.
    #[must_use]
    pub fn claim(&self, event: &KeyEvent, ctx: KeyContext) -> Option<A> {
        let table = self.table.upgrade()?;
        let table = table.borrow();
        let (entry, command) = table
            .entries
            .iter()
            .rev()
            .find_map(|e| e.commands.resolve(event, ctx).map(|c| (e, c)))?;
        if entry.id != self.id {
            tracing::trace!(
                target: "mockup.keys",
                owner = %entry.label,
                chord = %command.chord,
                "key claimed by newer registration"
            );
            return None;
        }
        Some(command.action.clone())
    }
}

impl<A> Drop for Registration<A> {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        // A panic while the table is borrowed must not turn into a double panic here.
        let Ok(mut table) = table.try_borrow_mut() else {
            return;
        };
        if let Some(pos) = table.entries.iter().position(|e| e.id == self.id) {
            let entry = table.entries.remove(pos);
            tracing::debug!(
                target: "mockup.keys",
                owner = %entry.label,
                id = entry.id,
                "commands unregistered"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
