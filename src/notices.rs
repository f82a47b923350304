use chrono::Local;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

const NOTICE_BUFFER_MAX: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// A message for the reviewer.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub timestamp: String,
    pub level: NoticeLevel,
    pub message: String,
}

/// Bounded buffer of reviewer-facing messages, oldest dropped first.
/// The view polls it with [`NoticeBuffer::get`].
#[derive(Debug, Default)]
pub struct NoticeBuffer {
    entries: VecDeque<Notice>,
}

impl NoticeBuffer {
    pub fn new() -> Self {
        NoticeBuffer {
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: String) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.entries.push_back(Notice {
            timestamp,
            level,
            message,
        });
        while self.entries.len() > NOTICE_BUFFER_MAX {
            self.entries.pop_front();
        }
    }

    pub fn get(&self, since_index: usize) -> Vec<Notice> {
        self.entries.iter().skip(since_index).cloned().collect()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
