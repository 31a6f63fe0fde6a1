use std::fmt;

/// Notices kept for [`NoticeBoard::history`]; older ones are dropped.
pub const HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Info => write!(f, "info"),
            NoticeKind::Success => write!(f, "success"),
            NoticeKind::Error => write!(f, "error"),
        }
    }
}

/// A transient banner shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Virtual-clock time after which the banner is hidden.
    pub expires_at: u64,
}

/// The banner area. Every user-visible success or failure goes through here and
/// auto-hides after the configured duration; there is no persistent error log.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    duration_ms: u64,
    visible: Vec<Notice>,
    history: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            visible: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn show(&mut self, kind: NoticeKind, message: impl Into<String>, now: u64) {
        let notice = Notice {
            kind,
            message: message.into(),
            expires_at: now + self.duration_ms,
        };
        // One banner slot per kind, like the page's error/success elements.
        self.visible.retain(|n| n.kind != kind);
        self.visible.push(notice.clone());
        self.history.push(notice);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    /// Hides every banner whose display time has run out.
    pub fn expire(&mut self, now: u64) {
        self.visible.retain(|n| n.expires_at > now);
    }

    pub fn visible(&self) -> &[Notice] {
        &self.visible
    }

    pub fn current(&self, kind: NoticeKind) -> Option<&Notice> {
        self.visible.iter().find(|n| n.kind == kind)
    }

    /// The most recent notices, oldest first.
    pub fn history(&self) -> &[Notice] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|n| n.kind == NoticeKind::Error)
            .map(|n| n.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banners_hide_after_their_duration() {
        let mut board = NoticeBoard::new(3000);
        board.show(NoticeKind::Error, "boom", 100);
        board.expire(3099);
        assert!(board.current(NoticeKind::Error).is_some());
        board.expire(3100);
        assert!(board.visible().is_empty());
        assert_eq!(board.last_error(), Some("boom"));
    }

    #[test]
    fn history_keeps_only_the_latest_notices() {
        let mut board = NoticeBoard::new(3000);
        board.show(NoticeKind::Error, "first failure", 0);
        for i in 0..HISTORY_LIMIT {
            board.show(NoticeKind::Info, format!("step {}", i), i as u64);
        }
        assert_eq!(board.history().len(), HISTORY_LIMIT);
        assert_eq!(board.history()[0].message, "step 0");
        assert_eq!(board.last_error(), None);
    }

    #[test]
    fn newer_banner_replaces_same_kind() {
        let mut board = NoticeBoard::new(3000);
        board.show(NoticeKind::Success, "first", 0);
        board.show(NoticeKind::Success, "second", 10);
        board.show(NoticeKind::Error, "bad", 10);
        assert_eq!(board.visible().len(), 2);
        assert_eq!(board.current(NoticeKind::Success).unwrap().message, "second");
    }
}
