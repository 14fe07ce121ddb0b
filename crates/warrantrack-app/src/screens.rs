// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DraftField, NoticeSlot, RequestSeq, WarrantyDraft, WarrantyId, WarrantyRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateScreen {
    pub draft: WarrantyDraft,
    pub focus: DraftField,
    pub notice: NoticeSlot,
    pub requests: RequestSeq,
}

impl Default for CreateScreen {
    fn default() -> Self {
        Self {
            draft: WarrantyDraft::default(),
            focus: DraftField::ItemName,
            notice: NoticeSlot::default(),
            requests: RequestSeq::default(),
        }
    }
}

impl CreateScreen {
    pub fn reset_form(&mut self) {
        self.draft = WarrantyDraft::default();
        self.focus = DraftField::ItemName;
    }

    pub fn remount(&mut self) {
        let mut requests = self.requests;
        requests.invalidate();
        let mut notice = std::mem::take(&mut self.notice);
        notice.dismiss();
        *self = Self {
            notice,
            requests,
            ..Self::default()
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupScreen {
    pub id_input: String,
    pub record: Option<WarrantyRecord>,
    pub searching: bool,
    pub notice: NoticeSlot,
    pub requests: RequestSeq,
}

impl LookupScreen {
    pub const fn trigger_label(&self) -> &'static str {
        if self.searching {
            "Searching..."
        } else {
            "Search Warranty"
        }
    }

    pub fn clear_search(&mut self) {
        self.id_input.clear();
        self.record = None;
        self.searching = false;
        self.requests.invalidate();
        self.notice.dismiss();
    }

    pub fn remount(&mut self) {
        let mut requests = self.requests;
        requests.invalidate();
        let mut notice = std::mem::take(&mut self.notice);
        notice.dismiss();
        *self = Self {
            notice,
            requests,
            ..Self::default()
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: WarrantyId,
    pub expiry_date: Option<String>,
    pub draft: WarrantyDraft,
    pub focus: DraftField,
}

impl EditSession {
    pub fn for_record(record: &WarrantyRecord) -> Self {
        Self {
            id: record.id,
            expiry_date: record.expiry_date.clone(),
            draft: WarrantyDraft::from_record(record),
            focus: DraftField::ItemName,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryScreen {
    pub records: Vec<WarrantyRecord>,
    pub loading: bool,
    pub selected: usize,
    pub viewport_top: usize,
    pub edit: Option<EditSession>,
    pub pending_delete: Option<WarrantyId>,
    pub notice: NoticeSlot,
    pub list_requests: RequestSeq,
    pub mutation_requests: RequestSeq,
}

impl InventoryScreen {
    pub fn selected_record(&self) -> Option<&WarrantyRecord> {
        self.records.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.records.is_empty() {
            self.selected = 0;
            return;
        }
        let max = self.records.len().saturating_sub(1) as isize;
        self.selected = (self.selected as isize + delta).clamp(0, max) as usize;
    }

    pub fn replace_records(&mut self, records: Vec<WarrantyRecord>) {
        self.records = records;
        self.selected = self.selected.min(self.records.len().saturating_sub(1));
        self.viewport_top = self.viewport_top.min(self.selected);
    }

    pub fn remount(&mut self) {
        let mut list_requests = self.list_requests;
        list_requests.invalidate();
        let mut mutation_requests = self.mutation_requests;
        mutation_requests.invalidate();
        let mut notice = std::mem::take(&mut self.notice);
        notice.dismiss();
        *self = Self {
            notice,
            list_requests,
            mutation_requests,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateScreen, InventoryScreen, LookupScreen};
    use crate::{NoticeKind, WarrantyId, WarrantyRecord};

    fn record(id: i64) -> WarrantyRecord {
        WarrantyRecord {
            id: WarrantyId::new(id),
            item_name: format!("item {id}"),
            purchase_date: "2024-01-01".to_owned(),
            warranty_period_months: 12,
            vendor: "Acme".to_owned(),
            notes: String::new(),
            expiry_date: Some("2025-01-01".to_owned()),
        }
    }

    #[test]
    fn remount_invalidates_tokens_and_keeps_notice_counter_monotonic() {
        let mut screen = CreateScreen::default();
        screen.draft.item_name = "Laptop".to_owned();
        let request_token = screen.requests.issue();
        let notice_token = screen.notice.post(NoticeKind::Success, "saved");

        screen.remount();

        assert!(screen.draft.item_name.is_empty());
        assert!(screen.notice.current().is_none());
        assert!(!screen.requests.is_current(request_token));
        let next_notice = screen.notice.post(NoticeKind::Success, "again");
        assert!(next_notice > notice_token);
    }

    #[test]
    fn lookup_trigger_label_tracks_searching() {
        let mut screen = LookupScreen::default();
        assert_eq!(screen.trigger_label(), "Search Warranty");
        screen.searching = true;
        assert_eq!(screen.trigger_label(), "Searching...");
    }

    #[test]
    fn selection_clamps_after_records_shrink() {
        let mut screen = InventoryScreen::default();
        screen.replace_records(vec![record(1), record(2), record(3)]);
        screen.move_selection(5);
        assert_eq!(screen.selected, 2);

        screen.replace_records(vec![record(1)]);
        assert_eq!(screen.selected, 0);
        assert_eq!(
            screen.selected_record().map(|r| r.id),
            Some(WarrantyId::new(1))
        );

        screen.replace_records(Vec::new());
        assert!(screen.selected_record().is_none());
    }

    #[test]
    fn clear_search_drops_the_in_flight_lookup() {
        let mut screen = LookupScreen::default();
        screen.id_input = "4".to_owned();
        let token = screen.requests.issue();
        screen.searching = true;

        screen.clear_search();

        assert!(screen.id_input.is_empty());
        assert!(!screen.searching);
        assert!(!screen.requests.is_current(token));
    }

    #[test]
    fn inventory_remount_invalidates_list_and_mutation_tokens() {
        let mut screen = InventoryScreen::default();
        let list = screen.list_requests.issue();
        let mutation = screen.mutation_requests.issue();

        screen.remount();

        assert!(!screen.list_requests.is_current(list));
        assert!(!screen.mutation_requests.is_current(mutation));
    }
}
