//! Queueing notification sink drained by the frontend.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::{Notification, NotificationSink};

#[derive(Default)]
struct Queue {
	pending: VecDeque<Notification>,
}

/// Pending notification queue.
///
/// Pushing a notification whose id is already queued replaces the queued
/// one in place, so a progress notice is superseded by its outcome.
#[derive(Default)]
pub struct NotificationCenter {
	queue: Mutex<Queue>,
}

impl NotificationCenter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.lock().pending.is_empty()
	}

	pub fn len(&self) -> usize {
		self.queue.lock().pending.len()
	}

	pub fn clear(&self) {
		self.queue.lock().pending.clear();
	}

	pub fn push(&self, notification: Notification) {
		let mut queue = self.queue.lock();
		if let Some(slot) = queue.pending.iter_mut().find(|queued| queued.id == notification.id) {
			*slot = notification;
		} else {
			queue.pending.push_back(notification);
		}
	}

	pub fn take_pending(&self) -> Vec<Notification> {
		self.queue.lock().pending.drain(..).collect()
	}

	/// Copy of the queue without draining it.
	pub fn snapshot(&self) -> Vec<Notification> {
		self.queue.lock().pending.iter().cloned().collect()
	}
}

impl NotificationSink for NotificationCenter {
	fn add_notification(&self, notification: Notification) {
		self.push(notification);
	}
}
