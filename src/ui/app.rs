use std::mem;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::db::ReportStore;
use crate::models::ReportSummary;
use crate::report::{export_csv, export_html};
use crate::sizing::compute_sizing;

use super::forms::{ProjectField, ProjectForm};
use super::helpers::{centered_rect, surface_error};
use super::screens::ReportScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// High-level navigation states. The saved reports list is home; a report
/// view is opened either by generating a new kit or by picking a list entry.
enum Screen {
    Reports,
    Report(ReportScreen),
}

/// Fine-grained modes layered on top of the current screen.
enum Mode {
    Normal,
    CreatingProject(ProjectForm),
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum ExportKind {
    Html,
    Csv,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: ReportStore,
    config: AppConfig,
    reports: Vec<ReportSummary>,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app around an initialized store and preload the saved list.
    pub fn new(store: ReportStore, config: AppConfig) -> Result<Self> {
        let reports = store.list().context("failed to load saved reports")?;
        Ok(Self {
            store,
            config,
            reports,
            selected: 0,
            screen: Screen::Reports,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    /// Storage and export failures end up in the footer rather than here.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::CreatingProject(form) => self.handle_project_form(code, form),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match self.screen {
            Screen::Reports => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    *exit = true;
                }
                KeyCode::Up => self.move_selection(-1),
                KeyCode::Down => self.move_selection(1),
                KeyCode::PageUp => self.move_selection(-PAGE_STEP),
                KeyCode::PageDown => self.move_selection(PAGE_STEP),
                KeyCode::Home => self.selected = 0,
                KeyCode::End => self.selected = self.reports.len().saturating_sub(1),
                KeyCode::Enter => {
                    if let Err(err) = self.open_selected_report() {
                        error!(error = %err, "failed to open saved report");
                        self.set_status(surface_error(&err), StatusKind::Error);
                    }
                }
                KeyCode::Char('+') | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.clear_status();
                    return Mode::CreatingProject(self.new_project_form());
                }
                KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_with_status(),
                _ => {}
            },
            Screen::Report(_) => match code {
                KeyCode::Char('q') => {
                    *exit = true;
                }
                KeyCode::Esc => {
                    self.screen = Screen::Reports;
                    self.clear_status();
                }
                KeyCode::Up => self.scroll_report(-1),
                KeyCode::Down => self.scroll_report(1),
                KeyCode::PageUp => self.scroll_report(-(PAGE_STEP as i32)),
                KeyCode::PageDown => self.scroll_report(PAGE_STEP as i32),
                KeyCode::Char('h') | KeyCode::Char('H') => self.export_current(ExportKind::Html),
                KeyCode::Char('x') | KeyCode::Char('X') => self.export_current(ExportKind::Csv),
                KeyCode::Char('+') | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.clear_status();
                    return Mode::CreatingProject(self.new_project_form());
                }
                _ => {}
            },
        }
        Mode::Normal
    }

    fn handle_project_form(&mut self, code: KeyCode, mut form: ProjectForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("New project cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle_panel(-1);
            }
            KeyCode::Right => {
                form.cycle_panel(1);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.generate_report(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    warn!(error = %err, "report generation failed");
                    form.error = Some(surface_error(&err));
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::CreatingProject(form)
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Reports => self.draw_report_list(frame, content_area),
            Screen::Report(report) => self.draw_report(frame, content_area, report),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::CreatingProject(form) = &self.mode {
            self.draw_project_form(frame, area, form);
        }
    }

    /// Re-read the saved list from disk, e.g. after another instance saved.
    pub(crate) fn handle_ctrl_l(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal) {
            self.refresh_with_status();
        }
        Ok(())
    }

    fn draw_report_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Saved Reports ({})", self.reports.len()));

        if self.reports.is_empty() {
            let message = Paragraph::new("No saved reports yet. Press '+' to size a new kit.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .reports
            .iter()
            .map(|report| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("#{:<4} ", report.id),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(report.display_title()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_report(&self, frame: &mut Frame, area: Rect, report: &ReportScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Report #{}", report.id));
        let paragraph = Paragraph::new(report.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((report.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::CreatingProject(_)) => Line::from(vec![
                Span::styled("[Tab/↑↓]", key_style),
                Span::raw(" Field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Panel   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Generate   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (Screen::Report(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll   "),
                Span::styled("[h]", key_style),
                Span::raw(" Export HTML   "),
                Span::styled("[x]", key_style),
                Span::raw(" Export CSV   "),
                Span::styled("[+]", key_style),
                Span::raw(" New   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Reports, _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Open   "),
                Span::styled("[+]", key_style),
                Span::raw(" New Project   "),
                Span::styled("[r]", key_style),
                Span::raw(" Reload   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_project_form(&self, frame: &mut Frame, area: Rect, form: &ProjectForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("New Project").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ProjectField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to generate • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        if form.active != ProjectField::Panel {
            let prefix = form.active.label().chars().count() + 2;
            let cursor_x = inner.x + (prefix + form.value_len(form.active)) as u16;
            let cursor_y = inner.y + form.active.row() as u16;
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn new_project_form(&self) -> ProjectForm {
        ProjectForm::with_defaults(
            self.config.defaults.daily_irradiation,
            self.config.default_panel(),
        )
    }

    /// Parse the form, size the kit, persist it and switch to the report view.
    fn generate_report(&mut self, form: &ProjectForm) -> Result<()> {
        let input = form.parse_inputs()?;
        let result = compute_sizing(&input, Local::now().date_naive())?;
        let id = self
            .store
            .save(&input.name, &input.location, &result)
            .context("failed to save report")?;

        if let Err(err) = self.reload_reports(Some(id)) {
            warn!(error = %err, "saved report but could not refresh the list");
        }
        self.screen = Screen::Report(ReportScreen::new(id, result));
        self.set_status(format!("Report #{id} saved."), StatusKind::Info);
        Ok(())
    }

    fn open_selected_report(&mut self) -> Result<()> {
        let Some(summary) = self.reports.get(self.selected).cloned() else {
            self.set_status("No saved report selected.", StatusKind::Error);
            return Ok(());
        };

        match self
            .store
            .load_by_id(summary.id)
            .context("failed to load report")?
        {
            Some(result) => {
                self.screen = Screen::Report(ReportScreen::new(summary.id, result));
                self.clear_status();
            }
            None => {
                self.reload_reports(None)?;
                self.set_status(
                    format!("Report #{} no longer exists.", summary.id),
                    StatusKind::Error,
                );
            }
        }
        Ok(())
    }

    fn export_current(&mut self, kind: ExportKind) {
        let Screen::Report(report) = &self.screen else {
            return;
        };
        let dir = self.config.output_dir();
        let outcome = match kind {
            ExportKind::Html => export_html(&report.result, report.id, &dir),
            ExportKind::Csv => export_csv(&report.result, report.id, &dir),
        };

        match outcome {
            Ok(path) => {
                if kind == ExportKind::Html && self.config.report.open_after_export {
                    if let Err(err) = open_link(&path) {
                        warn!(error = %err, path = %path.display(), "failed to open report");
                        self.set_status(
                            format!("Saved {} but could not open it: {err}", path.display()),
                            StatusKind::Error,
                        );
                        return;
                    }
                }
                self.set_status(format!("Exported {}.", path.display()), StatusKind::Info);
            }
            Err(err) => {
                error!(error = %err, "export failed");
                self.set_status(
                    format!("Export failed: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    fn refresh_with_status(&mut self) {
        match self.reload_reports(None) {
            Ok(()) => self.set_status(
                format!("Loaded {} saved reports.", self.reports.len()),
                StatusKind::Info,
            ),
            Err(err) => {
                error!(error = %err, "failed to reload reports");
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }
    }

    fn reload_reports(&mut self, focus_id: Option<i64>) -> Result<()> {
        self.reports = self.store.list().context("failed to load saved reports")?;
        if self.reports.is_empty() {
            self.selected = 0;
            return Ok(());
        }

        if let Some(id) = focus_id {
            if let Some(idx) = self.reports.iter().position(|r| r.id == id) {
                self.selected = idx;
                return Ok(());
            }
        }

        if self.selected >= self.reports.len() {
            self.selected = self.reports.len() - 1;
        }

        Ok(())
    }

    fn move_selection(&mut self, offset: isize) {
        if self.reports.is_empty() {
            return;
        }
        let max = self.reports.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, max) as usize;
    }

    fn scroll_report(&mut self, delta: i32) {
        if let Screen::Report(report) = &mut self.screen {
            report.scroll_by(delta);
        }
    }
}
