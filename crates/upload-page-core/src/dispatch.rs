use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::STICKY_HEADER_DELAY;
use crate::events::{AppEvent, HostEvent};
use crate::storage::{KeyValueStore, PersistentStore, StorageError, StoredState};

/// What the host does in response to an App event.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    RedirectToLatestVersion,
    Logout,
    /// Publish once the current operation has completed, never re-entrantly.
    NotifyAfterCurrentTurn(HostEvent),
    ScheduleStickyHeaderLayout { delay: Duration },
}

/// Applies the storage side of `event` and returns the follow-up for the host.
pub fn route_app_event<S: KeyValueStore>(
    event: AppEvent,
    store: &PersistentStore<S>,
) -> Result<HostCommand, StorageError> {
    Ok(match event {
        AppEvent::DetectNewVersion => HostCommand::RedirectToLatestVersion,
        AppEvent::Logout => HostCommand::Logout,
        AppEvent::FixedMidashi => HostCommand::ScheduleStickyHeaderLayout {
            delay: STICKY_HEADER_DELAY,
        },
        AppEvent::Store(value) => {
            store.store(value.as_ref())?;
            HostCommand::NotifyAfterCurrentTurn(HostEvent::StorageChanged(
                value.unwrap_or_else(StoredState::empty),
            ))
        }
    })
}

/// Events waiting for the current turn to finish.
#[derive(Debug, Default)]
pub struct DeferredOutbox {
    queue: RefCell<VecDeque<HostEvent>>,
}

impl DeferredOutbox {
    /// Queues `event`. Returns `true` when the queue was empty, i.e. the caller must
    /// schedule a flush.
    pub fn push(&self, event: HostEvent) -> bool {
        let mut queue = self.queue.borrow_mut();
        let needs_flush = queue.is_empty();
        queue.push_back(event);
        needs_flush
    }

    pub fn drain(&self) -> Vec<HostEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}
