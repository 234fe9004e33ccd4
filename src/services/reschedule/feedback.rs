//! User feedback surface.
//!
//! The controller reports what happened to a drop or a commit through a
//! `FeedbackSink`. Delivery is fire-and-forget: the controller never waits on
//! it and never learns whether anybody looked.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FeedbackLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            FeedbackLevel::Success => "✓",
            FeedbackLevel::Info => "ℹ",
            FeedbackLevel::Warning => "⚠",
            FeedbackLevel::Error => "✗",
        }
    }
}

/// One feedback message.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
}

impl Feedback {
    pub fn new(level: FeedbackLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FeedbackLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FeedbackLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FeedbackLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FeedbackLevel::Error, message)
    }
}

/// Where the controller sends feedback.
#[cfg_attr(test, mockall::automock)]
pub trait FeedbackSink {
    fn notify(&mut self, feedback: Feedback);
}

/// Sink that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn notify(&mut self, feedback: Feedback) {
        match feedback.level {
            FeedbackLevel::Error => log::error!("{}", feedback.message),
            FeedbackLevel::Warning => log::warn!("{}", feedback.message),
            FeedbackLevel::Success | FeedbackLevel::Info => log::info!("{}", feedback.message),
        }
    }
}

/// Sink that keeps messages for a host to drain and display.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    entries: Vec<(Instant, Feedback)>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages received so far, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Feedback> {
        self.entries.iter().map(|(_, feedback)| feedback)
    }

    pub fn count(&self, level: FeedbackLevel) -> usize {
        self.messages().filter(|f| f.level == level).count()
    }

    pub fn last(&self) -> Option<&Feedback> {
        self.entries.last().map(|(_, feedback)| feedback)
    }

    /// Hand over everything received so far.
    pub fn drain(&mut self) -> Vec<Feedback> {
        self.entries.drain(..).map(|(_, feedback)| feedback).collect()
    }

    /// Forget messages older than `max_age`.
    pub fn expire(&mut self, max_age: std::time::Duration) {
        self.entries.retain(|(at, _)| at.elapsed() < max_age);
    }
}

impl FeedbackSink for FeedbackLog {
    fn notify(&mut self, feedback: Feedback) {
        self.entries.push((Instant::now(), feedback));
    }
}

impl<S: FeedbackSink + ?Sized> FeedbackSink for &mut S {
    fn notify(&mut self, feedback: Feedback) {
        (**self).notify(feedback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_log_collects_in_order() {
        let mut log = FeedbackLog::new();
        log.notify(Feedback::info("moved"));
        log.notify(Feedback::warning("slot taken"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.count(FeedbackLevel::Warning), 1);
        assert_eq!(log.last().map(|f| f.message.as_str()), Some("slot taken"));
    }

    #[test]
    fn test_drain_empties_log() {
        let mut log = FeedbackLog::new();
        log.notify(Feedback::success("saved"));

        let drained = log.drain();
        assert_eq!(drained, vec![Feedback::success("saved")]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_expire_keeps_recent() {
        let mut log = FeedbackLog::new();
        log.notify(Feedback::error("failed"));

        log.expire(Duration::from_secs(60));
        assert_eq!(log.len(), 1);

        log.expire(Duration::ZERO);
        assert!(log.is_empty());
    }

    #[test]
    fn test_borrowed_sink_forwards() {
        fn send<S: FeedbackSink>(mut sink: S) {
            sink.notify(Feedback::info("hello"));
        }

        let mut log = FeedbackLog::new();
        send(&mut log);
        assert_eq!(log.len(), 1);
    }
}
