// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ApiCall, ApiCallKind, ApiCompletion, ApiOutcome, ApiRequest, AppMode, CreateScreen,
    DraftField, EditSession, ExpiryPolicy, InventoryScreen, LookupScreen, NoticeKind, NoticeSlot,
    RequestSeq, ScreenKind, WarrantyId,
};

const CREATE_OK: &str = "Warranty added successfully.";
const CREATE_FAILED: &str = "Error adding warranty. Please try again.";
const LOOKUP_BLANK_ID: &str = "Please enter a warranty ID.";
const LOOKUP_NOT_FOUND: &str = "Warranty not found. Please check the ID and try again.";
const LIST_FAILED: &str = "Failed to fetch warranties.";
const UPDATE_OK: &str = "Warranty updated successfully.";
const UPDATE_FAILED: &str = "Error updating warranty.";
const DELETE_OK: &str = "Warranty deleted successfully.";
const DELETE_FAILED: &str = "Error deleting warranty.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this warranty?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_screen: ScreenKind,
    pub create: CreateScreen,
    pub lookup: LookupScreen,
    pub inventory: InventoryScreen,
    pub expiry_policy: ExpiryPolicy,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_screen: ScreenKind::Inventory,
            create: CreateScreen::default(),
            lookup: LookupScreen::default(),
            inventory: InventoryScreen::default(),
            expiry_policy: ExpiryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextScreen,
    PrevScreen,
    ActivateScreen(ScreenKind),
    EnterInput,
    ExitToNav,
    FocusNextField,
    FocusPrevField,
    InsertChar(char),
    DeleteChar,
    Submit,
    ResetForm,
    RefreshInventory,
    SelectNext,
    SelectPrev,
    BeginEdit,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    ExpireNotice { screen: ScreenKind, token: u64 },
    Complete(ApiCompletion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ScreenChanged(ScreenKind),
    ModeChanged(AppMode),
    FocusChanged(DraftField),
    NoticePosted { screen: ScreenKind, token: u64 },
    NoticeCleared(ScreenKind),
    RequestIssued(ApiRequest),
    ResponseDiscarded { screen: ScreenKind, token: u64 },
    FormReset(ScreenKind),
    RecordFetched(WarrantyId),
    RecordsReplaced(usize),
    SelectionMoved(usize),
    EditStarted(WarrantyId),
    EditEnded,
    ScrolledToTop,
    DeleteConfirmationRequested(WarrantyId),
    DeleteCancelled,
}

impl AppState {
    pub fn with_start_screen(screen: ScreenKind, expiry_policy: ExpiryPolicy) -> Self {
        Self {
            active_screen: screen,
            expiry_policy,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextScreen => self.rotate_screen(1),
            AppCommand::PrevScreen => self.rotate_screen(-1),
            AppCommand::ActivateScreen(screen) => self.activate(screen),
            AppCommand::EnterInput => self.enter_input(),
            AppCommand::ExitToNav => self.set_mode(AppMode::Nav),
            AppCommand::FocusNextField => self.move_focus(1),
            AppCommand::FocusPrevField => self.move_focus(-1),
            AppCommand::InsertChar(ch) => {
                if let Some(text) = self.active_input_mut() {
                    text.push(ch);
                }
                Vec::new()
            }
            AppCommand::DeleteChar => {
                if let Some(text) = self.active_input_mut() {
                    text.pop();
                }
                Vec::new()
            }
            AppCommand::Submit => match self.active_screen {
                ScreenKind::Create => self.submit_create(),
                ScreenKind::Lookup => self.submit_lookup(),
                ScreenKind::Inventory => self.submit_update(),
            },
            AppCommand::ResetForm => self.reset_form(),
            AppCommand::RefreshInventory => vec![self.issue_list()],
            AppCommand::SelectNext => self.move_selection(1),
            AppCommand::SelectPrev => self.move_selection(-1),
            AppCommand::BeginEdit => self.begin_edit(),
            AppCommand::RequestDelete => match self.inventory.selected_record() {
                Some(record) => {
                    let id = record.id;
                    self.inventory.pending_delete = Some(id);
                    vec![AppEvent::DeleteConfirmationRequested(id)]
                }
                None => Vec::new(),
            },
            AppCommand::ConfirmDelete => match self.inventory.pending_delete.take() {
                Some(id) => vec![self.issue(ScreenKind::Inventory, ApiCall::Delete(id))],
                None => Vec::new(),
            },
            AppCommand::CancelDelete => match self.inventory.pending_delete.take() {
                Some(_) => vec![AppEvent::DeleteCancelled],
                None => Vec::new(),
            },
            AppCommand::ExpireNotice { screen, token } => {
                if self.notice_slot_mut(screen).expire(token) {
                    vec![AppEvent::NoticeCleared(screen)]
                } else {
                    Vec::new()
                }
            }
            AppCommand::Complete(completion) => self.complete(completion),
        }
    }

    pub fn notice_slot(&self, screen: ScreenKind) -> &NoticeSlot {
        match screen {
            ScreenKind::Create => &self.create.notice,
            ScreenKind::Lookup => &self.lookup.notice,
            ScreenKind::Inventory => &self.inventory.notice,
        }
    }

    fn notice_slot_mut(&mut self, screen: ScreenKind) -> &mut NoticeSlot {
        match screen {
            ScreenKind::Create => &mut self.create.notice,
            ScreenKind::Lookup => &mut self.lookup.notice,
            ScreenKind::Inventory => &mut self.inventory.notice,
        }
    }

    // Inventory lists and mutations carry separate generations.
    fn requests_mut(&mut self, screen: ScreenKind, kind: ApiCallKind) -> &mut RequestSeq {
        match (screen, kind) {
            (ScreenKind::Create, _) => &mut self.create.requests,
            (ScreenKind::Lookup, _) => &mut self.lookup.requests,
            (ScreenKind::Inventory, ApiCallKind::ListAll) => &mut self.inventory.list_requests,
            (ScreenKind::Inventory, _) => &mut self.inventory.mutation_requests,
        }
    }

    pub fn focused_field(&self) -> Option<DraftField> {
        match self.active_screen {
            ScreenKind::Create => Some(self.create.focus),
            ScreenKind::Lookup => None,
            ScreenKind::Inventory => self.inventory.edit.as_ref().map(|edit| edit.focus),
        }
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<AppEvent> {
        let screens = ScreenKind::ALL;
        let current = screens
            .iter()
            .position(|screen| *screen == self.active_screen)
            .unwrap_or(0) as isize;
        let len = screens.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.activate(screens[next])
    }

    fn activate(&mut self, screen: ScreenKind) -> Vec<AppEvent> {
        self.active_screen = screen;
        let mut events = vec![AppEvent::ScreenChanged(screen)];
        if self.mode != AppMode::Nav {
            events.extend(self.set_mode(AppMode::Nav));
        }
        match screen {
            ScreenKind::Create => self.create.remount(),
            ScreenKind::Lookup => self.lookup.remount(),
            ScreenKind::Inventory => {
                self.inventory.remount();
                events.push(self.issue_list());
            }
        }
        events
    }

    fn set_mode(&mut self, mode: AppMode) -> Vec<AppEvent> {
        if self.mode == mode {
            return Vec::new();
        }
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn enter_input(&mut self) -> Vec<AppEvent> {
        if self.active_screen == ScreenKind::Inventory && self.inventory.edit.is_none() {
            return Vec::new();
        }
        self.set_mode(AppMode::Input)
    }

    fn active_input_mut(&mut self) -> Option<&mut String> {
        if self.mode != AppMode::Input {
            return None;
        }
        match self.active_screen {
            ScreenKind::Create => Some(self.create.draft.field_mut(self.create.focus)),
            ScreenKind::Lookup => Some(&mut self.lookup.id_input),
            ScreenKind::Inventory => self
                .inventory
                .edit
                .as_mut()
                .map(|edit| edit.draft.field_mut(edit.focus)),
        }
    }

    fn move_focus(&mut self, delta: isize) -> Vec<AppEvent> {
        let focus = match self.active_screen {
            ScreenKind::Create => &mut self.create.focus,
            ScreenKind::Lookup => return Vec::new(),
            ScreenKind::Inventory => match self.inventory.edit.as_mut() {
                Some(edit) => &mut edit.focus,
                None => return Vec::new(),
            },
        };
        *focus = focus.rotate(delta);
        vec![AppEvent::FocusChanged(*focus)]
    }

    fn move_selection(&mut self, delta: isize) -> Vec<AppEvent> {
        self.inventory.move_selection(delta);
        let selected = self.inventory.selected;
        if selected < self.inventory.viewport_top {
            self.inventory.viewport_top = selected;
        }
        vec![AppEvent::SelectionMoved(selected)]
    }

    fn post_notice(
        &mut self,
        screen: ScreenKind,
        kind: NoticeKind,
        message: impl Into<String>,
    ) -> AppEvent {
        let token = self.notice_slot_mut(screen).post(kind, message);
        AppEvent::NoticePosted { screen, token }
    }

    fn issue(&mut self, screen: ScreenKind, call: ApiCall) -> AppEvent {
        let token = self.requests_mut(screen, call.kind()).issue();
        AppEvent::RequestIssued(ApiRequest {
            screen,
            token,
            call,
        })
    }

    fn issue_list(&mut self) -> AppEvent {
        self.inventory.loading = true;
        self.issue(ScreenKind::Inventory, ApiCall::ListAll)
    }

    fn submit_create(&mut self) -> Vec<AppEvent> {
        match self.create.draft.validate() {
            Ok(payload) => vec![self.issue(ScreenKind::Create, ApiCall::Create(payload))],
            Err(issue) => {
                vec![self.post_notice(
                    ScreenKind::Create,
                    NoticeKind::ValidationError,
                    issue.message(),
                )]
            }
        }
    }

    fn submit_lookup(&mut self) -> Vec<AppEvent> {
        if self.lookup.searching {
            return Vec::new();
        }
        let id = self.lookup.id_input.trim().to_owned();
        if id.is_empty() {
            return vec![self.post_notice(
                ScreenKind::Lookup,
                NoticeKind::ValidationError,
                LOOKUP_BLANK_ID,
            )];
        }
        self.lookup.searching = true;
        vec![self.issue(ScreenKind::Lookup, ApiCall::Get(id))]
    }

    fn submit_update(&mut self) -> Vec<AppEvent> {
        let Some(edit) = &self.inventory.edit else {
            return Vec::new();
        };
        let id = edit.id;
        match edit.draft.validate() {
            Ok(payload) => vec![self.issue(ScreenKind::Inventory, ApiCall::Update(id, payload))],
            Err(issue) => vec![self.post_notice(
                ScreenKind::Inventory,
                NoticeKind::ValidationError,
                issue.message(),
            )],
        }
    }

    fn reset_form(&mut self) -> Vec<AppEvent> {
        match self.active_screen {
            ScreenKind::Create => {
                self.create.reset_form();
                vec![AppEvent::FormReset(ScreenKind::Create)]
            }
            ScreenKind::Lookup => {
                let had_notice = self.lookup.notice.current().is_some();
                self.lookup.clear_search();
                let mut events = vec![AppEvent::FormReset(ScreenKind::Lookup)];
                if had_notice {
                    events.push(AppEvent::NoticeCleared(ScreenKind::Lookup));
                }
                events
            }
            ScreenKind::Inventory => self.end_edit(),
        }
    }

    fn begin_edit(&mut self) -> Vec<AppEvent> {
        let Some(record) = self.inventory.selected_record() else {
            return Vec::new();
        };
        let session = EditSession::for_record(record);
        let id = session.id;
        self.inventory.edit = Some(session);
        self.inventory.viewport_top = 0;
        let mut events = vec![AppEvent::EditStarted(id), AppEvent::ScrolledToTop];
        events.extend(self.set_mode(AppMode::Input));
        events
    }

    fn end_edit(&mut self) -> Vec<AppEvent> {
        if self.inventory.edit.take().is_none() {
            return Vec::new();
        }
        let mut events = vec![AppEvent::EditEnded];
        if self.active_screen == ScreenKind::Inventory {
            events.extend(self.set_mode(AppMode::Nav));
        }
        events
    }

    fn complete(&mut self, completion: ApiCompletion) -> Vec<AppEvent> {
        let screen = completion.screen;
        if !self
            .requests_mut(screen, completion.kind)
            .is_current(completion.token)
        {
            return vec![AppEvent::ResponseDiscarded {
                screen,
                token: completion.token,
            }];
        }

        match screen {
            ScreenKind::Create => self.complete_create(completion.outcome),
            ScreenKind::Lookup => self.complete_lookup(completion.outcome),
            ScreenKind::Inventory => self.complete_inventory(completion.kind, completion.outcome),
        }
    }

    fn complete_create(&mut self, outcome: ApiOutcome) -> Vec<AppEvent> {
        match outcome {
            ApiOutcome::Created => {
                let notice = self.post_notice(ScreenKind::Create, NoticeKind::Success, CREATE_OK);
                self.create.reset_form();
                vec![notice, AppEvent::FormReset(ScreenKind::Create)]
            }
            _ => vec![self.post_notice(
                ScreenKind::Create,
                NoticeKind::RequestError,
                CREATE_FAILED,
            )],
        }
    }

    fn complete_lookup(&mut self, outcome: ApiOutcome) -> Vec<AppEvent> {
        self.lookup.searching = false;
        match outcome {
            ApiOutcome::Fetched(Some(record)) => {
                let id = record.id;
                self.lookup.record = Some(record);
                let mut events = vec![AppEvent::RecordFetched(id)];
                if self.lookup.notice.dismiss() {
                    events.push(AppEvent::NoticeCleared(ScreenKind::Lookup));
                }
                events
            }
            _ => {
                self.lookup.record = None;
                vec![self.post_notice(ScreenKind::Lookup, NoticeKind::NotFound, LOOKUP_NOT_FOUND)]
            }
        }
    }

    fn complete_inventory(&mut self, kind: ApiCallKind, outcome: ApiOutcome) -> Vec<AppEvent> {
        match (kind, outcome) {
            (ApiCallKind::ListAll, ApiOutcome::Listed(records)) => {
                self.inventory.loading = false;
                let count = records.len();
                self.inventory.replace_records(records);
                vec![AppEvent::RecordsReplaced(count)]
            }
            (ApiCallKind::ListAll, _) => {
                self.inventory.loading = false;
                vec![self.post_notice(
                    ScreenKind::Inventory,
                    NoticeKind::RequestError,
                    LIST_FAILED,
                )]
            }
            (ApiCallKind::Update, ApiOutcome::Updated) => {
                let mut events = vec![self.post_notice(
                    ScreenKind::Inventory,
                    NoticeKind::Success,
                    UPDATE_OK,
                )];
                events.push(self.issue_list());
                events.extend(self.end_edit());
                events
            }
            (ApiCallKind::Update, _) => vec![self.post_notice(
                ScreenKind::Inventory,
                NoticeKind::RequestError,
                UPDATE_FAILED,
            )],
            (ApiCallKind::Delete, ApiOutcome::Deleted) => {
                let notice =
                    self.post_notice(ScreenKind::Inventory, NoticeKind::Success, DELETE_OK);
                vec![notice, self.issue_list()]
            }
            (ApiCallKind::Delete, _) => vec![self.post_notice(
                ScreenKind::Inventory,
                NoticeKind::RequestError,
                DELETE_FAILED,
            )],
            (ApiCallKind::Create | ApiCallKind::Get, _) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::{
        ApiCall, ApiCompletion, ApiOutcome, ApiRequest, AppMode, DraftField, NoticeKind,
        ScreenKind, WarrantyId, WarrantyRecord,
    };

    fn record(id: i64, name: &str) -> WarrantyRecord {
        WarrantyRecord {
            id: WarrantyId::new(id),
            item_name: name.to_owned(),
            purchase_date: "2024-01-01".to_owned(),
            warranty_period_months: 24,
            vendor: "Acme".to_owned(),
            notes: String::new(),
            expiry_date: Some("2026-01-01".to_owned()),
        }
    }

    fn issued(events: &[AppEvent]) -> Vec<ApiRequest> {
        events
            .iter()
            .filter_map(|event| match event {
                AppEvent::RequestIssued(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn respond(state: &mut AppState, request: &ApiRequest, outcome: ApiOutcome) -> Vec<AppEvent> {
        state.dispatch(AppCommand::Complete(ApiCompletion::for_request(
            request, outcome,
        )))
    }

    fn notice_text(state: &AppState, screen: ScreenKind) -> Option<(NoticeKind, String)> {
        state
            .notice_slot(screen)
            .current()
            .map(|notice| (notice.kind, notice.message.clone()))
    }

    fn type_text(state: &mut AppState, text: &str) {
        for ch in text.chars() {
            state.dispatch(AppCommand::InsertChar(ch));
        }
    }

    fn fill_create_form(state: &mut AppState, values: [&str; 5]) {
        state.dispatch(AppCommand::EnterInput);
        for value in values {
            type_text(state, value);
            state.dispatch(AppCommand::FocusNextField);
        }
    }

    fn loaded_inventory(records: Vec<WarrantyRecord>) -> AppState {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::ActivateScreen(ScreenKind::Inventory));
        let list = issued(&events).pop().expect("activation lists warranties");
        respond(&mut state, &list, ApiOutcome::Listed(records));
        state
    }

    #[test]
    fn activating_inventory_lists_once_with_loading_flag() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::ActivateScreen(ScreenKind::Inventory));
        let requests = issued(&events);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].call, ApiCall::ListAll);
        assert!(state.inventory.loading);

        respond(
            &mut state,
            &requests[0],
            ApiOutcome::Listed(vec![record(1, "Laptop")]),
        );
        assert!(!state.inventory.loading);
        assert_eq!(state.inventory.records.len(), 1);
    }

    #[test]
    fn failed_list_drops_loading_and_posts_request_error() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::ActivateScreen(ScreenKind::Inventory));
        let list = issued(&events).pop().expect("list issued");
        let events = respond(&mut state, &list, ApiOutcome::Failed("boom".to_owned()));

        assert!(!state.inventory.loading);
        assert!(matches!(events[0], AppEvent::NoticePosted { .. }));
        assert_eq!(
            notice_text(&state, ScreenKind::Inventory),
            Some((
                NoticeKind::RequestError,
                "Failed to fetch warranties.".to_owned()
            ))
        );
    }

    #[test]
    fn create_validation_failure_posts_notice_without_request() {
        let mut state = AppState {
            active_screen: ScreenKind::Create,
            ..AppState::default()
        };
        let events = state.dispatch(AppCommand::Submit);
        assert!(issued(&events).is_empty());
        assert_eq!(
            notice_text(&state, ScreenKind::Create),
            Some((
                NoticeKind::ValidationError,
                "Please fill out the Item Name field.".to_owned()
            ))
        );
    }

    #[test]
    fn create_success_resets_form() {
        let mut state = AppState {
            active_screen: ScreenKind::Create,
            ..AppState::default()
        };
        fill_create_form(&mut state, ["Laptop", "2024-01-01", "24", "Acme", ""]);

        let events = state.dispatch(AppCommand::Submit);
        let request = issued(&events).pop().expect("create issued");
        let ApiCall::Create(payload) = &request.call else {
            panic!("expected create call, got {:?}", request.call);
        };
        assert_eq!(payload.warranty_period_months, 24);
        assert_eq!(payload.notes, "");

        let events = respond(&mut state, &request, ApiOutcome::Created);
        assert!(events.contains(&AppEvent::FormReset(ScreenKind::Create)));
        assert!(state.create.draft.is_blank());
        assert_eq!(
            notice_text(&state, ScreenKind::Create),
            Some((
                NoticeKind::Success,
                "Warranty added successfully.".to_owned()
            ))
        );
    }

    #[test]
    fn failed_create_keeps_entered_values() {
        let mut state = AppState {
            active_screen: ScreenKind::Create,
            ..AppState::default()
        };
        fill_create_form(&mut state, ["Laptop", "2024-01-01", "24", "Acme", "desk"]);
        let before = state.create.draft.clone();

        let events = state.dispatch(AppCommand::Submit);
        let request = issued(&events).pop().expect("create issued");
        respond(&mut state, &request, ApiOutcome::Failed("500".to_owned()));

        assert_eq!(state.create.draft, before);
        assert_eq!(
            notice_text(&state, ScreenKind::Create),
            Some((
                NoticeKind::RequestError,
                "Error adding warranty. Please try again.".to_owned()
            ))
        );

        let retry = state.dispatch(AppCommand::Submit);
        assert_eq!(issued(&retry).len(), 1);
    }

    #[test]
    fn blank_lookup_id_never_issues_request() {
        let mut state = AppState {
            active_screen: ScreenKind::Lookup,
            mode: AppMode::Input,
            ..AppState::default()
        };
        type_text(&mut state, "   ");
        let events = state.dispatch(AppCommand::Submit);
        assert!(issued(&events).is_empty());
        assert!(!state.lookup.searching);
        assert_eq!(
            notice_text(&state, ScreenKind::Lookup),
            Some((
                NoticeKind::ValidationError,
                "Please enter a warranty ID.".to_owned()
            ))
        );
    }

    #[test]
    fn lookup_holds_searching_until_response() {
        let mut state = AppState {
            active_screen: ScreenKind::Lookup,
            mode: AppMode::Input,
            ..AppState::default()
        };
        type_text(&mut state, " 7 ");
        let events = state.dispatch(AppCommand::Submit);
        let request = issued(&events).pop().expect("get issued");
        assert_eq!(request.call, ApiCall::Get("7".to_owned()));
        assert!(state.lookup.searching);

        let repeat = state.dispatch(AppCommand::Submit);
        assert!(repeat.is_empty(), "trigger disabled while searching");

        respond(
            &mut state,
            &request,
            ApiOutcome::Fetched(Some(record(7, "Phone"))),
        );
        assert!(!state.lookup.searching);
        assert_eq!(
            state.lookup.record.as_ref().map(|r| r.id),
            Some(WarrantyId::new(7))
        );
        assert!(state.lookup.notice.current().is_none());
    }

    #[test]
    fn lookup_miss_clears_previous_record() {
        let mut state = AppState {
            active_screen: ScreenKind::Lookup,
            mode: AppMode::Input,
            ..AppState::default()
        };
        state.lookup.record = Some(record(1, "Old"));
        type_text(&mut state, "404");
        let events = state.dispatch(AppCommand::Submit);
        let request = issued(&events).pop().expect("get issued");
        respond(&mut state, &request, ApiOutcome::Fetched(None));

        assert!(state.lookup.record.is_none());
        assert_eq!(
            notice_text(&state, ScreenKind::Lookup),
            Some((
                NoticeKind::NotFound,
                "Warranty not found. Please check the ID and try again.".to_owned()
            ))
        );
    }

    #[test]
    fn clear_search_mid_request_drops_the_late_record() {
        let mut state = AppState {
            active_screen: ScreenKind::Lookup,
            mode: AppMode::Input,
            ..AppState::default()
        };
        state.lookup.record = Some(record(1, "Old"));
        state
            .lookup
            .notice
            .post(NoticeKind::NotFound, "Warranty not found.");
        type_text(&mut state, "12");
        let request = issued(&state.dispatch(AppCommand::Submit))
            .pop()
            .expect("get issued");
        assert!(state.lookup.searching);

        let events = state.dispatch(AppCommand::ResetForm);
        assert!(events.contains(&AppEvent::NoticeCleared(ScreenKind::Lookup)));
        assert!(state.lookup.id_input.is_empty());
        assert!(state.lookup.record.is_none());
        assert!(!state.lookup.searching);

        let events = respond(
            &mut state,
            &request,
            ApiOutcome::Fetched(Some(record(12, "Late"))),
        );
        assert_eq!(
            events,
            vec![AppEvent::ResponseDiscarded {
                screen: ScreenKind::Lookup,
                token: request.token,
            }]
        );
        assert!(state.lookup.record.is_none());
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut state = AppState {
            active_screen: ScreenKind::Create,
            ..AppState::default()
        };
        fill_create_form(&mut state, ["Laptop", "2024-01-01", "24", "Acme", ""]);
        let first = issued(&state.dispatch(AppCommand::Submit))
            .pop()
            .expect("first create");
        let second = issued(&state.dispatch(AppCommand::Submit))
            .pop()
            .expect("second create");

        let events = respond(&mut state, &first, ApiOutcome::Failed("late".to_owned()));
        assert_eq!(
            events,
            vec![AppEvent::ResponseDiscarded {
                screen: ScreenKind::Create,
                token: first.token,
            }]
        );
        assert!(state.create.notice.current().is_none());

        respond(&mut state, &second, ApiOutcome::Created);
        assert!(state.create.draft.is_blank());
    }

    #[test]
    fn navigating_away_drops_late_lookup_response() {
        let mut state = AppState {
            active_screen: ScreenKind::Lookup,
            mode: AppMode::Input,
            ..AppState::default()
        };
        type_text(&mut state, "3");
        let request = issued(&state.dispatch(AppCommand::Submit))
            .pop()
            .expect("get issued");

        state.dispatch(AppCommand::ActivateScreen(ScreenKind::Create));
        state.dispatch(AppCommand::ActivateScreen(ScreenKind::Lookup));
        let events = respond(
            &mut state,
            &request,
            ApiOutcome::Fetched(Some(record(3, "Late"))),
        );
        assert!(matches!(events[0], AppEvent::ResponseDiscarded { .. }));
        assert!(state.lookup.record.is_none());
        assert!(!state.lookup.searching);
    }

    #[test]
    fn stale_notice_expiry_is_ignored() {
        let mut state = AppState {
            active_screen: ScreenKind::Create,
            ..AppState::default()
        };
        state.dispatch(AppCommand::Submit);
        let first = state.create.notice.current().expect("first notice").token;
        fill_create_form(&mut state, ["Laptop", "", "", "", ""]);
        state.dispatch(AppCommand::Submit);
        let second = state.create.notice.current().expect("second notice").token;

        let events = state.dispatch(AppCommand::ExpireNotice {
            screen: ScreenKind::Create,
            token: first,
        });
        assert!(events.is_empty());
        assert!(state.create.notice.current().is_some());

        let events = state.dispatch(AppCommand::ExpireNotice {
            screen: ScreenKind::Create,
            token: second,
        });
        assert_eq!(events, vec![AppEvent::NoticeCleared(ScreenKind::Create)]);
        assert!(state.create.notice.current().is_none());
    }

    #[test]
    fn begin_edit_copies_record_and_scrolls_to_top() {
        let mut state = loaded_inventory(vec![record(1, "Laptop"), record(2, "Phone")]);
        state.inventory.viewport_top = 1;
        state.dispatch(AppCommand::SelectNext);

        let events = state.dispatch(AppCommand::BeginEdit);
        assert!(events.contains(&AppEvent::EditStarted(WarrantyId::new(2))));
        assert!(events.contains(&AppEvent::ScrolledToTop));
        assert_eq!(state.mode, AppMode::Input);
        assert_eq!(state.inventory.viewport_top, 0);

        let edit = state.inventory.edit.as_ref().expect("edit session");
        assert_eq!(edit.draft.item_name, "Phone");
        assert_eq!(edit.draft.warranty_period_months, "24");
        assert_eq!(state.focused_field(), Some(DraftField::ItemName));
    }

    #[test]
    fn update_sends_editable_fields_then_refreshes() {
        let mut state = loaded_inventory(vec![record(1, "Laptop")]);
        state.dispatch(AppCommand::BeginEdit);
        state.dispatch(AppCommand::InsertChar('!'));

        let events = state.dispatch(AppCommand::Submit);
        let update = issued(&events).pop().expect("update issued");
        let ApiCall::Update(id, payload) = &update.call else {
            panic!("expected update call, got {:?}", update.call);
        };
        assert_eq!(*id, WarrantyId::new(1));
        assert_eq!(payload.item_name, "Laptop!");

        let events = respond(&mut state, &update, ApiOutcome::Updated);
        let follow_up = issued(&events);
        assert_eq!(follow_up.len(), 1);
        assert_eq!(follow_up[0].call, ApiCall::ListAll);
        assert!(events.contains(&AppEvent::EditEnded));
        assert!(state.inventory.edit.is_none());
        assert_eq!(state.mode, AppMode::Nav);
        assert!(state.inventory.loading);
        assert_eq!(
            notice_text(&state, ScreenKind::Inventory),
            Some((
                NoticeKind::Success,
                "Warranty updated successfully.".to_owned()
            ))
        );
    }

    #[test]
    fn failed_update_preserves_edit_session() {
        let mut state = loaded_inventory(vec![record(1, "Laptop")]);
        state.dispatch(AppCommand::BeginEdit);
        let update = issued(&state.dispatch(AppCommand::Submit))
            .pop()
            .expect("update issued");
        let events = respond(&mut state, &update, ApiOutcome::Failed("409".to_owned()));

        assert!(issued(&events).is_empty());
        assert!(state.inventory.edit.is_some());
        assert_eq!(state.mode, AppMode::Input);
        assert_eq!(
            notice_text(&state, ScreenKind::Inventory),
            Some((
                NoticeKind::RequestError,
                "Error updating warranty.".to_owned()
            ))
        );
    }

    #[test]
    fn invalid_edit_is_rejected_before_request() {
        let mut state = loaded_inventory(vec![record(1, "Laptop")]);
        state.dispatch(AppCommand::BeginEdit);
        state.dispatch(AppCommand::FocusNextField);
        state.dispatch(AppCommand::FocusNextField);
        for _ in 0..2 {
            state.dispatch(AppCommand::DeleteChar);
        }
        state.dispatch(AppCommand::InsertChar('x'));

        let events = state.dispatch(AppCommand::Submit);
        assert!(issued(&events).is_empty());
        assert_eq!(
            notice_text(&state, ScreenKind::Inventory),
            Some((
                NoticeKind::ValidationError,
                "Warranty Period must be a valid number.".to_owned()
            ))
        );
    }

    #[test]
    fn cancel_edit_exits_edit_mode() {
        let mut state = loaded_inventory(vec![record(1, "Laptop")]);
        state.dispatch(AppCommand::BeginEdit);
        let events = state.dispatch(AppCommand::ResetForm);
        assert!(events.contains(&AppEvent::EditEnded));
        assert!(state.inventory.edit.is_none());
        assert_eq!(state.mode, AppMode::Nav);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = loaded_inventory(vec![record(5, "Camera")]);
        let events = state.dispatch(AppCommand::RequestDelete);
        assert_eq!(
            events,
            vec![AppEvent::DeleteConfirmationRequested(WarrantyId::new(5))]
        );
        assert!(issued(&events).is_empty());

        let events = state.dispatch(AppCommand::CancelDelete);
        assert_eq!(events, vec![AppEvent::DeleteCancelled]);
        assert!(issued(&state.dispatch(AppCommand::ConfirmDelete)).is_empty());

        state.dispatch(AppCommand::RequestDelete);
        let delete = issued(&state.dispatch(AppCommand::ConfirmDelete))
            .pop()
            .expect("delete issued");
        assert_eq!(delete.call, ApiCall::Delete(WarrantyId::new(5)));
        assert_eq!(state.inventory.records.len(), 1, "no optimistic removal");

        let events = respond(&mut state, &delete, ApiOutcome::Deleted);
        let refresh = issued(&events).pop().expect("refresh after delete");
        assert_eq!(refresh.call, ApiCall::ListAll);
        respond(&mut state, &refresh, ApiOutcome::Listed(Vec::new()));
        assert!(state.inventory.records.is_empty());
        assert_eq!(
            notice_text(&state, ScreenKind::Inventory),
            Some((
                NoticeKind::Success,
                "Warranty deleted successfully.".to_owned()
            ))
        );
    }

    #[test]
    fn failed_delete_keeps_rows() {
        let mut state = loaded_inventory(vec![record(5, "Camera")]);
        state.dispatch(AppCommand::RequestDelete);
        let delete = issued(&state.dispatch(AppCommand::ConfirmDelete))
            .pop()
            .expect("delete issued");
        let events = respond(&mut state, &delete, ApiOutcome::Failed("500".to_owned()));
        assert!(issued(&events).is_empty());
        assert_eq!(state.inventory.records.len(), 1);
        assert_eq!(
            notice_text(&state, ScreenKind::Inventory),
            Some((
                NoticeKind::RequestError,
                "Error deleting warranty.".to_owned()
            ))
        );
    }

    #[test]
    fn refresh_during_delete_keeps_the_delete_result() {
        let mut state = loaded_inventory(vec![record(1, "Laptop"), record(2, "Phone")]);
        state.dispatch(AppCommand::RequestDelete);
        let delete = issued(&state.dispatch(AppCommand::ConfirmDelete))
            .pop()
            .expect("delete issued");
        let refresh = issued(&state.dispatch(AppCommand::RefreshInventory))
            .pop()
            .expect("refresh issued");

        let events = respond(&mut state, &delete, ApiOutcome::Deleted);
        let follow_up = issued(&events).pop().expect("list after delete");
        assert_eq!(follow_up.call, ApiCall::ListAll);
        assert_eq!(
            notice_text(&state, ScreenKind::Inventory),
            Some((
                NoticeKind::Success,
                "Warranty deleted successfully.".to_owned()
            ))
        );

        let events = respond(
            &mut state,
            &refresh,
            ApiOutcome::Listed(vec![record(1, "Laptop"), record(2, "Phone")]),
        );
        assert!(matches!(events[..], [AppEvent::ResponseDiscarded { .. }]));
        assert!(state.inventory.loading);

        respond(
            &mut state,
            &follow_up,
            ApiOutcome::Listed(vec![record(2, "Phone")]),
        );
        let ids: Vec<WarrantyId> = state.inventory.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![WarrantyId::new(2)]);
        assert!(!state.inventory.loading);
    }

    #[test]
    fn refresh_during_update_keeps_the_update_result() {
        let mut state = loaded_inventory(vec![record(1, "Laptop")]);
        state.dispatch(AppCommand::BeginEdit);
        let update = issued(&state.dispatch(AppCommand::Submit))
            .pop()
            .expect("update issued");
        state.dispatch(AppCommand::RefreshInventory);

        let events = respond(&mut state, &update, ApiOutcome::Updated);
        assert!(events.contains(&AppEvent::EditEnded));
        assert_eq!(issued(&events).len(), 1);
    }

    #[test]
    fn screen_rotation_wraps_and_returns_to_nav() {
        let mut state = AppState {
            active_screen: ScreenKind::Inventory,
            mode: AppMode::Input,
            ..AppState::default()
        };
        let events = state.dispatch(AppCommand::NextScreen);
        assert_eq!(state.active_screen, ScreenKind::Create);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(
            events,
            vec![
                AppEvent::ScreenChanged(ScreenKind::Create),
                AppEvent::ModeChanged(AppMode::Nav),
            ]
        );

        state.dispatch(AppCommand::PrevScreen);
        assert_eq!(state.active_screen, ScreenKind::Inventory);
    }

    #[test]
    fn typing_requires_input_mode() {
        let mut state = AppState {
            active_screen: ScreenKind::Create,
            ..AppState::default()
        };
        state.dispatch(AppCommand::InsertChar('x'));
        assert!(state.create.draft.is_blank());

        state.dispatch(AppCommand::EnterInput);
        state.dispatch(AppCommand::InsertChar('x'));
        assert_eq!(state.create.draft.item_name, "x");
    }

    #[test]
    fn inventory_input_mode_needs_edit_session() {
        let mut state = loaded_inventory(vec![record(1, "Laptop")]);
        assert!(state.dispatch(AppCommand::EnterInput).is_empty());
        assert_eq!(state.mode, AppMode::Nav);
    }
}
