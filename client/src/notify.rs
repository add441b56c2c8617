//! Messages for the user, delivered over an unbounded channel and mirrored to the log.

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, rx)
    }

    pub fn notify(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Info | Level::Success => info!("{}", message),
            Level::Warning => warn!("{}", message),
            Level::Error => error!("{}", message),
        }
        if self.tx.send(Notification { level, message }).is_err() {
            debug!("Notification dropped, nobody is listening");
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Level::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Level::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Level::Error, message);
    }
}
