// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ScreenKind, WarrantyId, WarrantyPayload, WarrantyRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create(WarrantyPayload),
    Get(String),
    ListAll,
    Update(WarrantyId, WarrantyPayload),
    Delete(WarrantyId),
}

impl ApiCall {
    pub const fn kind(&self) -> ApiCallKind {
        match self {
            Self::Create(_) => ApiCallKind::Create,
            Self::Get(_) => ApiCallKind::Get,
            Self::ListAll => ApiCallKind::ListAll,
            Self::Update(..) => ApiCallKind::Update,
            Self::Delete(_) => ApiCallKind::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCallKind {
    Create,
    Get,
    ListAll,
    Update,
    Delete,
}

impl ApiCallKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::ListAll => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub screen: ScreenKind,
    pub token: u64,
    pub call: ApiCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    Created,
    Fetched(Option<WarrantyRecord>),
    Listed(Vec<WarrantyRecord>),
    Updated,
    Deleted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCompletion {
    pub screen: ScreenKind,
    pub token: u64,
    pub kind: ApiCallKind,
    pub outcome: ApiOutcome,
}

impl ApiCompletion {
    pub fn for_request(request: &ApiRequest, outcome: ApiOutcome) -> Self {
        Self {
            screen: request.screen,
            token: request.token,
            kind: request.call.kind(),
            outcome,
        }
    }
}

// Issuing or invalidating makes every earlier token stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestSeq {
    latest: u64,
}

impl RequestSeq {
    pub fn issue(&mut self) -> u64 {
        self.latest = self.latest.saturating_add(1);
        self.latest
    }

    pub fn invalidate(&mut self) {
        self.latest = self.latest.saturating_add(1);
    }

    pub const fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::RequestSeq;

    #[test]
    fn only_latest_token_is_current() {
        let mut seq = RequestSeq::default();
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));

        seq.invalidate();
        assert!(!seq.is_current(second));
    }
}
