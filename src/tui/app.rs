//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and routes every change
//! through the `Session` so it is persisted immediately.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::clock::{
    export_file_name, format_clock, format_due_relative, format_long_date, format_stamp, greeting,
    Clock,
};
use crate::fields::{Priority, Section, Selector};
use crate::session::Session;
use crate::stats::DueState;
use crate::task::{Task, TaskId};
use crate::tui::{
    colors::{Palette, DARK_RED},
    enums::{AppState, ConfirmAction},
    input::InputField,
    task_form::{TaskForm, FIELD_COUNT, FIELD_LABELS},
    utils::centered_rect,
};
use crate::view::ViewQuery;

/// How often the clock (and everything derived from it) is refreshed.
const TICK: Duration = Duration::from_secs(1);

/// Main application state for the terminal user interface.
pub struct App<'a> {
    session: &'a mut Session,
    clock: &'a dyn Clock,
    now: DateTime<Local>,
    last_tick: Instant,
    state: AppState,
    section: Section,
    query: ViewQuery,
    visible: Vec<TaskId>,
    table_state: TableState,
    form: TaskForm,
    import_path: InputField,
    search_active: bool,
    confirm_action: Option<ConfirmAction>,
    notice: String,
    status_message: String,
}

impl<'a> App<'a> {
    pub fn new(session: &'a mut Session, clock: &'a dyn Clock) -> Self {
        let mut app = App {
            session,
            clock,
            now: clock.now(),
            last_tick: Instant::now(),
            state: AppState::TaskList,
            section: Section::Active,
            query: ViewQuery::default(),
            visible: Vec::new(),
            table_state: TableState::default(),
            form: TaskForm::new(),
            import_path: InputField::new(),
            search_active: false,
            confirm_action: None,
            notice: String::new(),
            status_message: String::new(),
        };
        app.refresh_view();
        app
    }

    /// Re-read the clock.
    fn tick(&mut self) {
        self.now = self.clock.now();
        self.last_tick = Instant::now();
    }

    /// Recompute the visible rows for the current section and query,
    /// keeping the selection on the same task when it is still shown.
    fn refresh_view(&mut self) {
        let old_selected = self.selected_id().cloned();

        self.visible = self
            .query
            .apply_section(self.session.tasks(), self.section)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();

        let restored = old_selected.and_then(|id| self.visible.iter().position(|v| *v == id));
        match restored {
            Some(idx) => self.table_state.select(Some(idx)),
            None if self.visible.is_empty() => self.table_state.select(None),
            None => {
                let idx = self
                    .table_state
                    .selected()
                    .unwrap_or(0)
                    .min(self.visible.len() - 1);
                self.table_state.select(Some(idx));
            }
        }
    }

    fn selected_id(&self) -> Option<&TaskId> {
        self.table_state.selected().and_then(|i| self.visible.get(i))
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected_id().and_then(|id| self.session.repo().get(id))
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn show_notice(&mut self, msg: impl Into<String>) {
        self.notice = msg.into();
        self.state = AppState::Notice;
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id().cloned() else {
            return;
        };
        match self.session.toggle_complete(&id, self.clock.now_utc()) {
            Some(true) => self.set_status_message("Task completed"),
            Some(false) => self.set_status_message("Task reopened"),
            None => {}
        }
        self.refresh_view();
    }

    fn confirm_delete_selected(&mut self) {
        if let Some(task) = self.selected_task() {
            let action = ConfirmAction::DeleteTask {
                id: task.id.clone(),
                title: task.title.clone(),
            };
            self.confirm_action = Some(action);
            self.state = AppState::Confirm;
        }
    }

    fn complete_all(&mut self) {
        let n = self.session.complete_all(self.clock.now_utc());
        self.set_status_message(format!("Completed {n} task(s)"));
        self.refresh_view();
    }

    fn confirm_clear_done(&mut self) {
        let done = self.session.tasks().iter().filter(|t| t.completed).count();
        if done == 0 {
            self.set_status_message("No completed tasks to clear");
            return;
        }
        self.confirm_action = Some(ConfirmAction::ClearDone(done));
        self.state = AppState::Confirm;
    }

    fn export(&mut self) {
        if self.session.tasks().is_empty() {
            self.set_status_message("Nothing to export");
            return;
        }
        let path = PathBuf::from(export_file_name(self.now.date_naive()));
        match self.session.export_to(&path) {
            Ok(n) => self.set_status_message(format!("Exported {n} task(s) to {}", path.display())),
            Err(e) => self.show_notice(format!("Export failed: {e}")),
        }
    }

    fn import(&mut self) {
        let raw = self.import_path.value.trim().to_string();
        self.state = AppState::TaskList;
        if raw.is_empty() {
            return;
        }
        match self.session.import_file(&PathBuf::from(&raw), true, self.clock.now()) {
            Ok(report) => {
                let mut msg = format!("Imported {} task(s)", report.added);
                if report.reassigned > 0 {
                    msg.push_str(&format!(", {} with new ids", report.reassigned));
                }
                self.set_status_message(msg);
                self.import_path.clear();
                self.refresh_view();
            }
            Err(e) => {
                debug!(error = %e, path = %raw, "import rejected");
                self.show_notice(format!(
                    "Invalid file format. Please select a valid JSON file.\n\n{e}"
                ));
            }
        }
    }

    fn create_task(&mut self) {
        match self.form.to_new_task(self.now.date_naive()) {
            Ok(new) => {
                if let Some(id) = self.session.add(new, self.clock.now_utc()) {
                    self.set_status_message(format!("Added task {}", id.short()));
                }
                self.form = TaskForm::new();
                self.state = AppState::TaskList;
                self.section = Section::Active;
                self.refresh_view();
            }
            Err(msg) => self.set_status_message(msg),
        }
    }

    fn cycle_category(&mut self) {
        let mut options = vec![Selector::All];
        options.extend(self.session.repo().categories().into_iter().map(Selector::Only));
        let idx = options.iter().position(|o| *o == self.query.category).unwrap_or(0);
        self.query.category = options[(idx + 1) % options.len()].clone();
        self.refresh_view();
    }

    fn cycle_priority(&mut self) {
        self.query.priority = match self.query.priority {
            Selector::All => Selector::Only(Priority::High),
            Selector::Only(Priority::High) => Selector::Only(Priority::Medium),
            Selector::Only(Priority::Medium) => Selector::Only(Priority::Low),
            Selector::Only(Priority::Low) => Selector::All,
        };
        self.refresh_view();
    }

    fn move_selection(&mut self, down: bool) {
        if self.visible.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(self.visible.len() - 1)
        } else {
            current.saturating_sub(1)
        };
        self.table_state.select(Some(next));
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search_active = false;
                self.query.search.clear();
                self.refresh_view();
            }
            KeyCode::Enter => {
                self.search_active = false;
                if !self.query.search.is_empty() {
                    self.set_status_message(format!(
                        "Search applied: '{}' ({} tasks)",
                        self.query.search,
                        self.visible.len()
                    ));
                }
            }
            KeyCode::Backspace => {
                self.query.search.pop();
                self.refresh_view();
            }
            KeyCode::Char(c) => {
                self.query.search.push(c);
                self.refresh_view();
            }
            _ => {}
        }
    }

    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.search_active {
            self.handle_search_input(key);
            return false;
        }

        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.query.is_filtered() {
                    self.query = ViewQuery { sort: self.query.sort, ..ViewQuery::default() };
                    self.refresh_view();
                    self.set_status_message("Filters cleared");
                } else {
                    return true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Tab => {
                self.section = self.section.toggle();
                self.table_state.select(None);
                self.refresh_view();
            }
            KeyCode::Enter => {
                if self.selected_id().is_some() {
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.confirm_delete_selected(),
            KeyCode::Char('a') => {
                self.form = TaskForm::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('/') => {
                self.search_active = true;
            }
            KeyCode::Char('c') => self.cycle_category(),
            KeyCode::Char('p') => self.cycle_priority(),
            KeyCode::Char('s') => {
                self.query.sort = self.query.sort.next();
                self.refresh_view();
                self.set_status_message(format!("Sorted by {}", self.query.sort.label()));
            }
            KeyCode::Char('A') => self.complete_all(),
            KeyCode::Char('X') => self.confirm_clear_done(),
            KeyCode::Char('t') => {
                let dark = self.session.toggle_dark_mode();
                self.set_status_message(if dark { "Dark mode on" } else { "Dark mode off" });
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('i') => self.state = AppState::ImportPath,
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_detail_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => self.state = AppState::TaskList,
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                self.toggle_selected();
                self.state = AppState::TaskList;
            }
            KeyCode::Char('d') => self.confirm_delete_selected(),
            _ => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.set_status_message("Cancelled");
            }
            KeyCode::Enter => self.create_task(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => {
                if !self.form.cycle(false) {
                    if let Some(input) = self.form.active_input() {
                        input.move_cursor_left();
                    }
                }
            }
            KeyCode::Right => {
                if !self.form.cycle(true) {
                    if let Some(input) = self.form.active_input() {
                        input.move_cursor_right();
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.form.active_input() {
                    input.handle_backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = self.form.active_input() {
                    input.handle_delete();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.form.active_input() {
                    input.handle_char(c);
                }
            }
            _ => {}
        }
    }

    fn handle_import_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Enter => self.import(),
            KeyCode::Backspace => self.import_path.handle_backspace(),
            KeyCode::Delete => self.import_path.handle_delete(),
            KeyCode::Left => self.import_path.move_cursor_left(),
            KeyCode::Right => self.import_path.move_cursor_right(),
            KeyCode::Char(c) => self.import_path.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.confirm_action.take() {
                    Some(ConfirmAction::DeleteTask { id, .. }) => {
                        if self.session.delete(&id) {
                            self.set_status_message("Task deleted");
                        }
                    }
                    Some(ConfirmAction::ClearDone(_)) => {
                        let n = self.session.delete_completed();
                        self.set_status_message(format!("Deleted {n} completed task(s)"));
                    }
                    None => {}
                }
                self.state = AppState::TaskList;
                self.refresh_view();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
    }

    /// Dispatch one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        self.status_message.clear();
        match self.state {
            AppState::TaskList => return self.handle_task_list_input(key.code, key.modifiers),
            AppState::TaskDetail => self.handle_detail_input(key.code),
            AppState::AddTask => self.handle_form_input(key.code),
            AppState::ImportPath => self.handle_import_input(key.code),
            AppState::Confirm => self.handle_confirm_input(key.code),
            AppState::Help | AppState::Notice => self.state = AppState::TaskList,
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let line = Line::from(vec![
            Span::styled(
                "MILISTA",
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{}! Let's be productive today", greeting(&self.now)),
                Style::default().fg(palette.fg),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{}  {}", format_long_date(&self.now), format_clock(&self.now)),
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            ),
        ]);
        let header = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_stats(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let stats = self.session.stats(self.now.date_naive());
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(area);

        let cards = [
            ("Total Tasks", stats.total.to_string(), palette.accent),
            (
                "Completed",
                format!("{}  {:.0}% complete", stats.completed, stats.completion_rate()),
                palette.done,
            ),
            ("Due Today", stats.due_today.to_string(), palette.due_today),
            ("Overdue", stats.overdue.to_string(), palette.overdue),
        ];
        for (i, (label, value, color)) in cards.into_iter().enumerate() {
            let card = Paragraph::new(Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .block(Block::default().borders(Borders::ALL).title(label))
            .alignment(Alignment::Center);
            f.render_widget(card, cells[i]);
        }
    }

    fn render_filters(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let search = if self.search_active {
            format!("{}█", self.query.search)
        } else if self.query.search.is_empty() {
            "-".to_string()
        } else {
            self.query.search.clone()
        };
        let label = Style::default().fg(palette.muted);
        let value = Style::default().fg(palette.fg).add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled("Search: ", label),
            Span::styled(search, value),
            Span::styled("   Category: ", label),
            Span::styled(self.query.category.to_string(), value),
            Span::styled("   Priority: ", label),
            Span::styled(self.query.priority.to_string(), value),
            Span::styled("   Sort: ", label),
            Span::styled(self.query.sort.label(), value),
        ]);
        let filters = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(filters, area);
    }

    /// Render the current section as a table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect, palette: Palette) {
        let today = self.now.date_naive();
        let section_total = self
            .session
            .tasks()
            .iter()
            .filter(|t| self.section.contains(t.completed))
            .count();
        let block = Block::default().borders(Borders::ALL).title(format!(
            "{} ({}/{}) - Press 'h' for help",
            self.section.title(),
            self.visible.len(),
            section_total
        ));

        if self.visible.is_empty() {
            let mut text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    self.section.empty_message(),
                    Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
                )),
            ];
            if !self.query.search.is_empty() {
                text.push(Line::from(Span::styled(
                    format!("No tasks match your search for \"{}\"", self.query.search),
                    Style::default().fg(palette.muted),
                )));
            }
            let empty = Paragraph::new(text).block(block).alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        }

        let header = Row::new(["", "Priority", "Category", "Due", "Title"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().fg(palette.accent))
        .height(1);

        let repo = self.session.repo();
        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|id| repo.get(id))
            .map(|task| {
                let due_state = DueState::of(task, today);
                let mut due = format_due_relative(task.due_date, today);
                match due_state {
                    DueState::Overdue => due.push_str(" Overdue"),
                    DueState::Today => due = "Today".to_string(),
                    DueState::Upcoming | DueState::None => {}
                }
                let tags: String = task.tags.iter().map(|t| format!(" #{t}")).collect();

                let style = if task.completed {
                    Style::default().fg(palette.muted).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    match due_state {
                        DueState::Overdue => Style::default().fg(palette.overdue),
                        DueState::Today => Style::default().fg(palette.due_today),
                        DueState::Upcoming | DueState::None => Style::default().fg(palette.fg),
                    }
                };

                Row::new(vec![
                    Cell::from(if task.completed { "[x]" } else { "[ ]" }),
                    Cell::from(task.priority.as_str().to_uppercase())
                        .style(Style::default().fg(palette.priority(task.priority))),
                    Cell::from(task.category.clone()),
                    Cell::from(due),
                    Cell::from(format!("{}{}", task.title, tags)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Min(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default().bg(palette.highlight_bg).fg(palette.highlight_fg),
            )
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_task_detail(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let today = self.now.date_naive();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let due = match task.due_date {
            Some(d) => {
                let note = match DueState::of(task, today) {
                    DueState::Overdue => "  Overdue",
                    DueState::Today => "  Today",
                    DueState::Upcoming | DueState::None => "",
                };
                format!("{} ({}){note}", d.format("%b %-d, %Y"), format_due_relative(Some(d), today))
            }
            None => "-".to_string(),
        };

        let mut text = vec![
            Line::from(Span::styled(task.title.clone(), bold.fg(palette.accent))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Status:    ", bold),
                Span::raw(if task.completed { "Completed" } else { "Active" }),
            ]),
            Line::from(vec![
                Span::styled("Priority:  ", bold),
                Span::styled(
                    task.priority.as_str().to_uppercase(),
                    Style::default().fg(palette.priority(task.priority)),
                ),
            ]),
            Line::from(vec![Span::styled("Category:  ", bold), Span::raw(task.category.clone())]),
            Line::from(vec![Span::styled("Due:       ", bold), Span::raw(due)]),
            Line::from(vec![
                Span::styled("Tags:      ", bold),
                Span::raw(if task.tags.is_empty() {
                    "-".to_string()
                } else {
                    task.tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" ")
                }),
            ]),
            Line::from(vec![
                Span::styled("Created:   ", bold),
                Span::raw(format_stamp(&task.created_at)),
            ]),
        ];
        if let Some(done) = &task.completed_at {
            text.push(Line::from(vec![
                Span::styled("Completed: ", bold),
                Span::raw(format_stamp(done)),
            ]));
        }
        text.push(Line::from(""));
        text.push(Line::from(Span::styled("Description", bold)));
        text.push(Line::from(task.description.clone().unwrap_or_else(|| "-".to_string())));
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "Space toggle  d delete  Esc back",
            Style::default().fg(palette.muted),
        )));

        let area = centered_rect(70, 70, area);
        f.render_widget(Clear, area);
        let detail = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Task Details"))
            .style(Style::default().bg(palette.bg).fg(palette.fg))
            .wrap(Wrap { trim: false });
        f.render_widget(detail, area);
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let mut text = Vec::with_capacity(FIELD_COUNT + 2);
        for (i, label) in FIELD_LABELS.iter().enumerate() {
            let focused = i == self.form.current_field;
            let marker = if focused { "> " } else { "  " };
            let label_style = if focused {
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.muted)
            };
            text.push(Line::from(vec![
                Span::styled(format!("{marker}{label:<12}"), label_style),
                Span::styled(self.form.field_value(i), Style::default().fg(palette.fg)),
            ]));
        }
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "Tab/↑↓ move  ←/→ change priority or category  Enter save  Esc cancel",
            Style::default().fg(palette.muted),
        )));

        let area = centered_rect(70, 50, area);
        f.render_widget(Clear, area);
        let form = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Add New Task"))
            .style(Style::default().bg(palette.bg).fg(palette.fg));
        f.render_widget(form, area);
    }

    fn render_import_prompt(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let text = vec![
            Line::from("Path to a JSON export:"),
            Line::from(Span::styled(
                self.import_path.display_with_cursor(),
                Style::default().fg(palette.accent),
            )),
            Line::from(""),
            Line::from(Span::styled("Enter import  Esc cancel", Style::default().fg(palette.muted))),
        ];
        let area = centered_rect(60, 25, area);
        f.render_widget(Clear, area);
        let prompt = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Import Tasks"))
            .style(Style::default().bg(palette.bg).fg(palette.fg));
        f.render_widget(prompt, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let heading = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Task List", heading)),
            Line::from("  ↑/↓, k/j      Move selection"),
            Line::from("  Tab           Switch Active / Completed"),
            Line::from("  Enter         Task details"),
            Line::from("  Space/x       Toggle complete"),
            Line::from("  a             Add task"),
            Line::from("  d             Delete task"),
            Line::from("  /             Search title, description, tags"),
            Line::from("  c / p / s     Cycle category, priority, sort"),
            Line::from("  Esc           Clear filters (quit when none)"),
            Line::from(""),
            Line::from(Span::styled("Quick Actions", heading)),
            Line::from("  A             Complete all"),
            Line::from("  X             Clear done"),
            Line::from("  e             Export to todo-tasks-<date>.json"),
            Line::from("  i             Import from a JSON file"),
            Line::from("  t             Toggle dark mode"),
            Line::from("  q             Quit"),
            Line::from(""),
            Line::from(Span::styled("Due Date Formats", heading)),
            Line::from("  YYYY-MM-DD, today, tomorrow, fri, next mon, in 3d, in 2w"),
        ];
        let area = centered_rect(60, 80, area);
        f.render_widget(Clear, area);
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .style(Style::default().bg(palette.bg).fg(palette.fg))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(self.confirm_action.as_ref().map(ConfirmAction::describe).unwrap_or_default()),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_notice(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 30, area);
        f.render_widget(Clear, area);
        let mut text: Vec<Line> = self.notice.lines().map(|l| Line::from(l.to_string())).collect();
        text.push(Line::from(""));
        text.push(Line::from("Press any key to continue"));
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .style(Style::default().bg(DARK_RED))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect, palette: Palette) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.search_active {
            format!("Search: {} (Esc to clear, Enter to confirm)", self.query.search)
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "{}: {} | a add  Space toggle  / search  h help  q quit",
                    self.section.title(),
                    self.visible.len()
                ),
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::ImportPath => "Import Tasks".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::Notice => "Error".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(palette.accent).fg(palette.highlight_fg))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function: dashboard underneath, any popup on top.
    fn render(&mut self, f: &mut Frame) {
        let palette = Palette::for_mode(self.session.dark_mode());
        let full = f.area();
        f.render_widget(
            Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
            full,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        self.render_header(f, chunks[0], palette);
        self.render_stats(f, chunks[1], palette);
        self.render_filters(f, chunks[2], palette);
        self.render_task_list(f, chunks[3], palette);
        self.render_status_bar(f, chunks[4], palette);

        match self.state {
            AppState::TaskList => {}
            AppState::TaskDetail => self.render_task_detail(f, full, palette),
            AppState::AddTask => self.render_task_form(f, full, palette),
            AppState::ImportPath => self.render_import_prompt(f, full, palette),
            AppState::Help => self.render_help(f, full, palette),
            AppState::Confirm => self.render_confirm(f, full),
            AppState::Notice => self.render_notice(f, full),
        }
    }

    /// Main event loop: refresh the clock once per tick, draw, handle input.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            if self.last_tick.elapsed() >= TICK {
                self.tick();
            }
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::task::NewTask;
    use chrono::TimeZone;
    use ratatui::backend::TestBackend;

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn clock() -> FixedClock {
        FixedClock(Local.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap())
    }

    fn session(dir: &std::path::Path, titles: &[&str]) -> Session {
        let mut session = Session::open(Config { data_dir: dir.to_path_buf() });
        let clock = clock();
        for title in titles {
            session.add(NewTask::titled(*title), clock.now_utc());
        }
        session
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_toggle_moves_task_to_completed_section() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &["one", "two"]);
        let clock = clock();
        let mut app = App::new(&mut session, &clock);
        assert_eq!(app.visible.len(), 2);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.visible.len(), 1);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.section, Section::Completed);
        assert_eq!(app.visible.len(), 1);
        drop(app);
        assert_eq!(session.tasks().iter().filter(|t| t.completed).count(), 1);
    }

    #[test]
    fn test_add_form_creates_task() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[]);
        let clock = clock();
        let mut app = App::new(&mut session, &clock);

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::AddTask);
        type_text(&mut app, "Buy groceries");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "tomorrow");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::TaskList);
        drop(app);
        let task = &session.tasks()[0];
        assert_eq!(task.title, "Buy groceries");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, chrono::NaiveDate::from_ymd_opt(2024, 6, 16));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &["keep", "drop"]);
        let clock = clock();
        let mut app = App::new(&mut session, &clock);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.visible.len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.visible.len(), 1);
    }

    #[test]
    fn test_search_narrows_and_escape_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &["Water plants", "Call mom"]);
        let clock = clock();
        let mut app = App::new(&mut session, &clock);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "PLANT");
        assert_eq!(app.visible.len(), 1);
        press(&mut app, KeyCode::Enter);
        assert!(!app.search_active);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.visible.len(), 2);
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_bad_import_shows_notice_and_keeps_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "not json").unwrap();
        let mut session = session(dir.path(), &["only"]);
        let clock = clock();
        let mut app = App::new(&mut session, &clock);

        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, bad.to_str().unwrap());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Notice);
        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.visible.len(), 1);
    }

    #[test]
    fn test_render_shows_greeting_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &["Write report"]);
        let clock = clock();
        let mut app = App::new(&mut session, &clock);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Good Morning"));
        assert!(screen.contains("Total Tasks"));
        assert!(screen.contains("Write report"));
    }
}
