//! In-process notification service.
//!
//! Results of user actions are reported through [`Notifier::notify`]. The
//! dashboard drains a [`ToastQueue`]; the CLI prints through
//! [`ConsoleNotifier`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Severity level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// When the notification was raised
    pub timestamp: Instant,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Instant::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.timestamp.elapsed() >= ttl
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, kind: NotificationKind, message: &str) {
        (**self).notify(kind, message)
    }
}

/// Bounded FIFO of pending notifications for the dashboard.
#[derive(Debug)]
pub struct ToastQueue {
    pending: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl ToastQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, notification: Notification) {
        let mut pending = self.pending.lock();
        if pending.len() == self.capacity {
            pending.pop_front();
        }
        pending.push_back(notification);
    }

    /// Remove and return the oldest pending notification.
    pub fn pop(&self) -> Option<Notification> {
        self.pending.lock().pop_front()
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.pending.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.push(Notification::new(kind, message));
    }
}

/// Prints notifications to the terminal. Warnings go to stderr, success and
/// info lines to stdout. Errors are skipped: commands return them and the
/// binary prints them once on exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier {
    /// Suppress info/success lines (used with `--json`)
    pub quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Warning => eprintln!("{} {}", "warning:".yellow().bold(), message),
            NotificationKind::Success if !self.quiet => println!("{}", message.green()),
            NotificationKind::Info if !self.quiet => println!("{}", message.cyan()),
            NotificationKind::Error | NotificationKind::Success | NotificationKind::Info => {}
        }
    }
}
