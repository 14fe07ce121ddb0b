// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};
use warrantrack_app::{
    ApiCall, ApiCompletion, ApiOutcome, ApiRequest, AppCommand, AppEvent, AppMode, AppState,
    DELETE_PROMPT, DraftField, ExpiryClass, ExpiryFormat, ExpiryStatus, NoticeKind, ScreenKind,
    WarrantyDraft, WarrantyRecord,
};

const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);
const FOCUS_MARK: &str = "▸";
const EMPTY_CELL: &str = "-";
const INVENTORY_COLUMNS: [&str; 8] = [
    "ID",
    "Item Name",
    "Purchase Date",
    "Warranty Period",
    "Expiry Date",
    "Vendor",
    "Notes",
    "Status",
];

// spawn_request reports exactly one ApiCompleted per request.
pub trait AppRuntime {
    fn execute(&mut self, call: &ApiCall) -> Result<ApiOutcome>;

    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = match self.execute(&request.call) {
            Ok(outcome) => outcome,
            Err(error) => ApiOutcome::Failed(format!("{error:#}")),
        };
        tx.send(InternalEvent::ApiCompleted(ApiCompletion::for_request(
            &request, outcome,
        )))
        .map_err(|_| anyhow!("api event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ExpireNotice { screen: ScreenKind, token: u64 },
    ApiCompleted(ApiCompletion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiSettings {
    pub notice_ttl: Duration,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    help_visible: bool,
    notice_ttl: Duration,
}

impl ViewData {
    fn new(settings: UiSettings) -> Self {
        Self {
            help_visible: false,
            notice_ttl: settings.notice_ttl,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    settings: UiSettings,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(settings);
    let (internal_tx, internal_rx) = mpsc::channel();

    let start = state.active_screen;
    dispatch_and_apply(
        state,
        runtime,
        &view_data,
        &internal_tx,
        AppCommand::ActivateScreen(start),
    );

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &view_data, &internal_tx, &internal_rx);

        let now = OffsetDateTime::now_utc();
        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data, now)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        let command = match event {
            InternalEvent::ExpireNotice { screen, token } => {
                AppCommand::ExpireNotice { screen, token }
            }
            InternalEvent::ApiCompleted(completion) => AppCommand::Complete(completion),
        };
        dispatch_and_apply(state, runtime, view_data, tx, command);
    }
}

fn dispatch_and_apply<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    for event in state.dispatch(command) {
        match event {
            AppEvent::RequestIssued(request) => {
                debug!(
                    screen = request.screen.label(),
                    token = request.token,
                    call = request.call.kind().as_str(),
                    "request issued"
                );
                if let Err(error) = runtime.spawn_request(request.clone(), tx.clone()) {
                    warn!(error = %format!("{error:#}"), "request dispatch failed");
                    let failed = ApiCompletion::for_request(
                        &request,
                        ApiOutcome::Failed(error.to_string()),
                    );
                    let _ = tx.send(InternalEvent::ApiCompleted(failed));
                }
            }
            AppEvent::NoticePosted { screen, token } => {
                schedule_notice_expiry(tx, screen, token, view_data.notice_ttl);
            }
            AppEvent::ResponseDiscarded { screen, token } => {
                debug!(screen = screen.label(), token, "stale response discarded");
            }
            _ => {}
        }
    }
}

fn schedule_notice_expiry(
    internal_tx: &Sender<InternalEvent>,
    screen: ScreenKind,
    token: u64,
    ttl: Duration,
) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(ttl);
        let _ = sender.send(InternalEvent::ExpireNotice { screen, token });
    });
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    let command = if delete_pending(state) {
        delete_confirmation_command(key)
    } else {
        match state.mode {
            AppMode::Nav => {
                if key.code == KeyCode::Char('?') {
                    view_data.help_visible = true;
                    return false;
                }
                nav_command_for_key(state.active_screen, key)
            }
            AppMode::Input => input_command_for_key(state, key),
        }
    };

    if let Some(command) = command {
        dispatch_and_apply(state, runtime, view_data, internal_tx, command);
    }
    false
}

fn delete_pending(state: &AppState) -> bool {
    state.active_screen == ScreenKind::Inventory && state.inventory.pending_delete.is_some()
}

fn delete_confirmation_command(key: KeyEvent) -> Option<AppCommand> {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(AppCommand::ConfirmDelete),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(AppCommand::CancelDelete),
        _ => None,
    }
}

fn nav_command_for_key(screen: ScreenKind, key: KeyEvent) -> Option<AppCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('f'), KeyModifiers::NONE) | (KeyCode::Tab, _) => {
            Some(AppCommand::NextScreen)
        }
        (KeyCode::Char('b'), KeyModifiers::NONE) | (KeyCode::BackTab, _) => {
            Some(AppCommand::PrevScreen)
        }
        (KeyCode::Char(digit @ '1'..='3'), KeyModifiers::NONE) => {
            let index = digit as usize - '1' as usize;
            Some(AppCommand::ActivateScreen(ScreenKind::ALL[index]))
        }
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Some(AppCommand::ResetForm),
        _ => match screen {
            ScreenKind::Create | ScreenKind::Lookup => match key.code {
                KeyCode::Char('i') | KeyCode::Enter => Some(AppCommand::EnterInput),
                _ => None,
            },
            ScreenKind::Inventory => match key.code {
                KeyCode::Char('j') | KeyCode::Down => Some(AppCommand::SelectNext),
                KeyCode::Char('k') | KeyCode::Up => Some(AppCommand::SelectPrev),
                KeyCode::Char('e') | KeyCode::Enter => Some(AppCommand::BeginEdit),
                KeyCode::Char('d') => Some(AppCommand::RequestDelete),
                KeyCode::Char('r') => Some(AppCommand::RefreshInventory),
                KeyCode::Char('i') => Some(AppCommand::EnterInput),
                _ => None,
            },
        },
    }
}

fn input_command_for_key(state: &AppState, key: KeyEvent) -> Option<AppCommand> {
    let editing_inventory = state.active_screen == ScreenKind::Inventory;
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) if editing_inventory => Some(AppCommand::ResetForm),
        (KeyCode::Esc, _) => Some(AppCommand::ExitToNav),
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Some(AppCommand::ResetForm),
        (KeyCode::Char('s'), KeyModifiers::CONTROL) | (KeyCode::Enter, _) => {
            Some(AppCommand::Submit)
        }
        (KeyCode::Tab | KeyCode::Down, _) => Some(AppCommand::FocusNextField),
        (KeyCode::BackTab | KeyCode::Up, _) => Some(AppCommand::FocusPrevField),
        (KeyCode::Backspace, _) => Some(AppCommand::DeleteChar),
        (KeyCode::Char(ch), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(AppCommand::InsertChar(ch))
        }
        _ => None,
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    view_data: &ViewData,
    now: OffsetDateTime,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ScreenKind::ALL
        .iter()
        .position(|screen| *screen == state.active_screen)
        .unwrap_or(0);
    let titles = ScreenKind::ALL
        .iter()
        .enumerate()
        .map(|(index, screen)| format!("{} {}", index + 1, screen.label()))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("warrantrack").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_screen {
        ScreenKind::Create => {
            let body = Paragraph::new(render_create_text(state))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(ScreenKind::Create.title()),
                );
            frame.render_widget(body, layout[1]);
        }
        ScreenKind::Lookup => {
            let body = Paragraph::new(render_lookup_text(state, now))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(ScreenKind::Lookup.title()),
                );
            frame.render_widget(body, layout[1]);
        }
        ScreenKind::Inventory => render_inventory(frame, layout[1], state, now),
    }

    let status = Paragraph::new(status_text(state))
        .style(status_style(state))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if delete_pending(state) {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(format!("{DELETE_PROMPT}\n\ny delete | n cancel"))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("delete")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_inventory(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    now: OffsetDateTime,
) {
    let inventory = &state.inventory;
    let table_area = match &inventory.edit {
        Some(edit) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(DraftField::ALL.len() as u16 + 4),
                    Constraint::Min(3),
                ])
                .split(area);
            let form_text = format!(
                "Update the warranty details below.\n\n{}",
                render_draft_fields(&edit.draft, Some(edit.focus))
            );
            let form = Paragraph::new(form_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Edit Warranty #{}", edit.id)),
            );
            frame.render_widget(form, split[0]);
            split[1]
        }
        None => area,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(ScreenKind::Inventory.title());

    if inventory.loading && inventory.records.is_empty() {
        frame.render_widget(Paragraph::new("Loading warranties...").block(block), table_area);
        return;
    }
    if inventory.records.is_empty() {
        let empty = Paragraph::new(
            "No warranties found in the inventory.\nAdd your first warranty to get started!",
        )
        .block(block);
        frame.render_widget(empty, table_area);
        return;
    }

    let format = state.expiry_policy.inventory;
    let header = Row::new(INVENTORY_COLUMNS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let rows = inventory.records.iter().map(|record| {
        let (cells, class) = inventory_row(record, format, now);
        Row::new(cells.into_iter().map(Cell::from).collect::<Vec<_>>())
            .style(class.map_or_else(Style::default, expiry_style))
    });
    let widths = [
        Constraint::Length(5),
        Constraint::Min(12),
        Constraint::Length(13),
        Constraint::Length(15),
        Constraint::Length(12),
        Constraint::Min(10),
        Constraint::Min(8),
        Constraint::Min(18),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(block);

    // While editing the list stays scrolled to the top with no cursor.
    let mut table_state = TableState::default().with_offset(inventory.viewport_top);
    if inventory.edit.is_none() {
        table_state = table_state.with_selected(Some(inventory.selected));
    }
    frame.render_stateful_widget(table, table_area, &mut table_state);
}

fn render_create_text(state: &AppState) -> String {
    let create = &state.create;
    let focus = (state.mode == AppMode::Input).then_some(create.focus);
    format!(
        "{}\n\nenter add warranty | ctrl+l clear form",
        render_draft_fields(&create.draft, focus)
    )
}

fn render_draft_fields(draft: &WarrantyDraft, focus: Option<DraftField>) -> String {
    DraftField::ALL
        .iter()
        .map(|field| {
            let marker = if focus == Some(*field) {
                FOCUS_MARK
            } else {
                " "
            };
            let value = draft.field(*field);
            let shown = if value.is_empty() {
                field.placeholder()
            } else {
                value
            };
            format!("{marker} {}: {shown}", field.label())
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn render_lookup_text(state: &AppState, now: OffsetDateTime) -> String {
    let lookup = &state.lookup;
    let input = if lookup.id_input.is_empty() && state.mode != AppMode::Input {
        "Enter Warranty ID (e.g., 1)"
    } else {
        lookup.id_input.as_str()
    };
    let mut lines = vec![
        "Enter the warranty ID to find a specific warranty in the inventory.".to_owned(),
        String::new(),
        format!("Warranty ID: {input}"),
        format!("[{}]  ctrl+l clear", lookup.trigger_label()),
        String::new(),
    ];
    match &lookup.record {
        Some(record) => {
            lines.push("Warranty Details".to_owned());
            lines.push(render_record_details(
                record,
                state.expiry_policy.lookup,
                now,
            ));
        }
        None if lookup.notice.current().is_none() => {
            lines.push("Enter a warranty ID above to search for a warranty".to_owned());
        }
        None => {}
    }
    lines.join("\n")
}

fn render_record_details(
    record: &WarrantyRecord,
    format: ExpiryFormat,
    now: OffsetDateTime,
) -> String {
    let (status, _) = expiry_cell(record, format, now);
    [
        format!("ID: {}", record.id),
        format!("Item Name: {}", record.item_name),
        format!("Purchase Date: {}", record.purchase_date),
        format!("Warranty Period: {} months", record.warranty_period_months),
        format!(
            "Expiry Date: {}",
            record.expiry_date.as_deref().unwrap_or(EMPTY_CELL)
        ),
        format!("Vendor: {}", record.vendor),
        format!("Notes: {}", notes_cell(record)),
        format!("Status: {status}"),
    ]
    .join("\n")
}

fn inventory_row(
    record: &WarrantyRecord,
    format: ExpiryFormat,
    now: OffsetDateTime,
) -> ([String; 8], Option<ExpiryClass>) {
    let (status, class) = expiry_cell(record, format, now);
    (
        [
            record.id.to_string(),
            record.item_name.clone(),
            record.purchase_date.clone(),
            format!("{} months", record.warranty_period_months),
            record
                .expiry_date
                .clone()
                .unwrap_or_else(|| EMPTY_CELL.to_owned()),
            record.vendor.clone(),
            notes_cell(record).to_owned(),
            status,
        ],
        class,
    )
}

fn expiry_cell(
    record: &WarrantyRecord,
    format: ExpiryFormat,
    now: OffsetDateTime,
) -> (String, Option<ExpiryClass>) {
    match ExpiryStatus::from_raw(record.expiry_date.as_deref(), now) {
        Some(status) => (format.render(status), Some(status.class)),
        None => (EMPTY_CELL.to_owned(), None),
    }
}

fn notes_cell(record: &WarrantyRecord) -> &str {
    if record.notes.is_empty() {
        EMPTY_CELL
    } else {
        &record.notes
    }
}

fn expiry_style(class: ExpiryClass) -> Style {
    match class {
        ExpiryClass::Expired => Style::default().fg(Color::Red),
        ExpiryClass::ExpiringSoon => Style::default().fg(Color::Yellow),
        ExpiryClass::Valid => Style::default().fg(Color::Green),
    }
}

fn status_text(state: &AppState) -> String {
    if let Some(notice) = state.notice_slot(state.active_screen).current() {
        return notice.message.clone();
    }
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Input => "INPUT",
    };
    let hints = match (state.active_screen, state.mode) {
        (ScreenKind::Inventory, AppMode::Nav) => {
            "j/k move | e edit | d delete | r refresh | b/f screens | ? help | ctrl+q quit"
        }
        (ScreenKind::Inventory, AppMode::Input) => {
            "tab/shift+tab field | enter update | esc cancel"
        }
        (_, AppMode::Nav) => "i type | b/f screens | ctrl+l clear | ? help | ctrl+q quit",
        (ScreenKind::Lookup, AppMode::Input) => "enter search | ctrl+l clear | esc nav",
        (_, AppMode::Input) => "tab/shift+tab field | enter submit | ctrl+l clear | esc nav",
    };
    format!("{mode} | {hints}")
}

fn status_style(state: &AppState) -> Style {
    match state
        .notice_slot(state.active_screen)
        .current()
        .map(|notice| notice.kind)
    {
        Some(NoticeKind::Success) => Style::default().fg(Color::Green),
        Some(kind) if kind.is_failure() => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Yellow),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help (nav)\n\
screens: b/f or shift+tab/tab cycle | 1 add | 2 search | 3 inventory\n\
add: i/enter type | tab/shift+tab field | enter submit | ctrl+l clear form | esc nav\n\
search: i/enter type | enter search | ctrl+l clear search | esc nav\n\
inventory: j/k move | e/enter edit | d delete | r refresh\n\
edit: tab/shift+tab field | enter or ctrl+s update | esc cancel\n\
delete: y confirm | n/esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
