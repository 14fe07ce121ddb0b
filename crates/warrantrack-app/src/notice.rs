// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    ValidationError,
    NotFound,
    RequestError,
}

impl NoticeKind {
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub token: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoticeSlot {
    current: Option<Notice>,
    last_token: u64,
}

impl NoticeSlot {
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        self.last_token = self.last_token.saturating_add(1);
        self.current = Some(Notice {
            kind,
            message: message.into(),
            token: self.last_token,
        });
        self.last_token
    }

    pub fn expire(&mut self, token: u64) -> bool {
        match &self.current {
            Some(notice) if notice.token == token => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }
}
