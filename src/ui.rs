use crate::animation::{Animator, BeginOutcome, Phase};
use crate::config::Settings;
use crate::geometry::{Geometry, LayoutRegistry};
use crate::model::{color_label, ColorTag, Note, NoteDraft, NoteError};
use crate::notebook::Notebook;
use crate::notify::{Toast, ToastKind};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

const CARD_HEIGHT: u16 = 6;
const DIALOG_MIN_WIDTH: u16 = 30;
const DIALOG_MAX_WIDTH: u16 = 72;
const DIALOG_MIN_HEIGHT: u16 = 12;
const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;
const IDLE_POLL: Duration = Duration::from_millis(200);
const ANIMATION_FRAME: Duration = Duration::from_millis(16);
const CARD_BG: Color = Color::Rgb(22, 24, 30);

pub fn run(book: Notebook, settings: &Settings) -> Result<()> {
    match book.sync().client().fetch_all() {
        Ok(remote) => tracing::info!(count = remote.len(), "fetched remote notes"),
        Err(err) => tracing::warn!(%err, "initial remote fetch failed"),
    }
    let mut terminal = setup_terminal()?;
    let mut app = App::new(
        book,
        settings.animation,
        settings.store_dir.display().to_string(),
    );
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    book: Notebook,
    notes: Vec<Note>,
    selected: usize,
    row_offset: usize,
    columns: usize,
    status: String,
    store_label: String,
    mode: Mode,
    animator: Animator,
    layout: LayoutRegistry,
}

enum Mode {
    Normal,
    Creating(NoteForm),
    Editing { note_id: String, form: NoteForm },
    ConfirmDelete { note_id: String },
}

enum FormAction {
    Create,
    Edit(String),
}

enum FormOutcome {
    Stay,
    Close,
}

struct NoteForm {
    title: FieldValue,
    content: FieldValue,
    color: Option<ColorTag>,
    field: FormField,
    error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Content,
    Color,
}

/// Editable text with a byte cursor that always sits on a char boundary.
#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if let Some((idx, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let (line, col) = self.line_col();
        let target = line as isize + delta;
        let lines: Vec<&str> = self.value.split('\n').collect();
        if target < 0 || target as usize >= lines.len() {
            return;
        }
        let target = target as usize;
        let start: usize = lines[..target].iter().map(|l| l.len() + 1).sum();
        let offset = lines[target]
            .char_indices()
            .nth(col)
            .map(|(idx, _)| idx)
            .unwrap_or(lines[target].len());
        self.cursor = start + offset;
    }

    fn line_col(&self) -> (usize, usize) {
        let before = &self.value[..self.cursor];
        let line = before.matches('\n').count();
        let col = before.rsplit('\n').next().unwrap_or("").chars().count();
        (line, col)
    }

    fn backspace(&mut self) {
        let end = self.cursor;
        self.move_left();
        self.value.drain(self.cursor..end);
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl NoteForm {
    fn new() -> Self {
        NoteForm {
            title: FieldValue::new(""),
            content: FieldValue::new(""),
            color: None,
            field: FormField::Title,
            error: None,
        }
    }

    fn from_note(note: &Note) -> Self {
        NoteForm {
            title: FieldValue::new(&note.title),
            content: FieldValue::new(&note.content),
            color: note.color_tag_value,
            field: FormField::Title,
            error: None,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Content,
            FormField::Content => FormField::Color,
            FormField::Color => FormField::Title,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Color,
            FormField::Content => FormField::Title,
            FormField::Color => FormField::Content,
        };
    }

    /// `None` while the color picker has focus.
    fn active_text_mut(&mut self) -> Option<&mut FieldValue> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Content => Some(&mut self.content),
            FormField::Color => None,
        }
    }

    fn draft(&self) -> Result<NoteDraft, NoteError> {
        NoteDraft::new(&self.title.value, self.content.value.clone(), self.color)
    }
}

impl App {
    fn new(book: Notebook, animation: Duration, store_label: String) -> Self {
        let notes = book.notes();
        let status = format!("Loaded {} notes from {}", notes.len(), store_label);
        App {
            book,
            notes,
            selected: 0,
            row_offset: 0,
            columns: 1,
            status,
            store_label,
            mode: Mode::Normal,
            animator: Animator::new(animation),
            layout: LayoutRegistry::default(),
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            self.tick(Instant::now());
            terminal.draw(|f| self.draw(f))?;
            self.animator.on_frame(&self.layout, Instant::now());
            let timeout = if self.animator.animating() {
                ANIMATION_FRAME
            } else {
                IDLE_POLL
            };
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Work that happens between frames: animation progress, remote sync, toast expiry
    /// and changes written by other sessions.
    fn tick(&mut self, now: Instant) {
        self.animator.tick(now);
        self.book.pump_sync();
        self.book.toasts.expire(now);
        if self.book.reload_external() {
            self.refresh();
            self.status = "Reloaded notes changed in another session".into();
        }
    }

    fn refresh(&mut self) {
        self.notes = self.book.notes();
        self.selected = self.selected.min(self.notes.len().saturating_sub(1));
    }

    fn select_id(&mut self, id: &str) {
        if let Some(idx) = self.notes.iter().position(|n| n.id == id) {
            self.selected = idx;
        }
    }

    fn current_note(&self) -> Option<&Note> {
        self.notes.get(self.selected)
    }

    /// Creating shows the dialog at once; editing shows it only while the animation
    /// has it open, or when there is no animation at all.
    fn dialog_visible(&self) -> bool {
        match self.mode {
            Mode::Creating(_) => true,
            Mode::Editing { .. } => {
                !self.animator.dialog_mounted() || self.animator.dialog_visible()
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Creating(_) | Mode::Editing { .. } => self.handle_form_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selected + 1 < self.notes.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected >= self.columns {
                    self.selected -= self.columns;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + self.columns < self.notes.len() {
                    self.selected += self.columns;
                }
            }
            KeyCode::Char('n') => {
                self.animator.open_direct();
                self.mode = Mode::Creating(NoteForm::new());
                self.status =
                    "New note (Tab/Shift-Tab move, Ctrl+S save, Enter in Content adds a line, Esc cancel)"
                        .into();
            }
            KeyCode::Char('e') | KeyCode::Enter => self.open_editor(),
            KeyCode::Char('d') => {
                if let Some(note) = self.current_note() {
                    let note_id = note.id.clone();
                    self.status = format!("Delete \"{}\"? (y to confirm, n/Esc to cancel)", note.title);
                    self.mode = Mode::ConfirmDelete { note_id };
                } else {
                    self.status = "No note selected to delete".into();
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn open_editor(&mut self) {
        let Some(note) = self.current_note().cloned() else {
            self.status = "No note selected to edit".into();
            return;
        };
        let form = NoteForm::from_note(&note);
        let note_id = note.id.clone();
        match self.layout.card_rect(&note.id) {
            Some(card) => match self.animator.begin(note, card) {
                BeginOutcome::Started | BeginOutcome::Restarted => {}
                BeginOutcome::Rejected => {
                    self.status = "Still animating, try again".into();
                    return;
                }
            },
            None => self.animator.open_direct(),
        }
        self.status = format!("Editing {}", note_id);
        self.mode = Mode::Editing { note_id, form };
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let overlay_grabs_input = self
            .animator
            .overlay()
            .is_some_and(|overlay| overlay.frame.interactive);
        if !self.dialog_visible() || overlay_grabs_input {
            return Ok(false);
        }
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let outcome = match &mut mode {
            Mode::Creating(form) => self.process_form_key(FormAction::Create, form, key),
            Mode::Editing { note_id, form } => {
                let id = note_id.clone();
                self.process_form_key(FormAction::Edit(id), form, key)
            }
            Mode::ConfirmDelete { .. } | Mode::Normal => FormOutcome::Stay,
        };
        match outcome {
            FormOutcome::Stay => self.mode = mode,
            FormOutcome::Close => {
                if let Mode::Editing { note_id, .. } = mode {
                    self.close_editor(&note_id);
                }
            }
        }
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let note_id = match &self.mode {
            Mode::ConfirmDelete { note_id } => note_id.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match self.book.delete(&note_id) {
                    Ok(note) => self.status = format!("Deleted \"{}\"", note.title),
                    Err(err) => self.status = format!("Delete failed: {}", err),
                }
                self.refresh();
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn process_form_key(
        &mut self,
        action: FormAction,
        form: &mut NoteForm,
        key: KeyEvent,
    ) -> FormOutcome {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                return FormOutcome::Close;
            }
            KeyCode::Char('s') if control => return self.try_submit(action, form),
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Left => match form.active_text_mut() {
                Some(field) => field.move_left(),
                None => form.color = ColorTag::cycle(form.color, -1),
            },
            KeyCode::Right => match form.active_text_mut() {
                Some(field) => field.move_right(),
                None => form.color = ColorTag::cycle(form.color, 1),
            },
            KeyCode::Up => {
                if let Some(field) = form.active_text_mut() {
                    field.move_vertical(-1);
                }
            }
            KeyCode::Down => {
                if let Some(field) = form.active_text_mut() {
                    field.move_vertical(1);
                }
            }
            KeyCode::Enter => {
                if form.field == FormField::Content && !control {
                    form.content.insert_char('\n');
                } else {
                    return self.try_submit(action, form);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.active_text_mut() {
                    field.backspace();
                }
            }
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    match form.active_text_mut() {
                        Some(field) => field.insert_char(c),
                        None if c == ' ' => form.color = ColorTag::cycle(form.color, 1),
                        None => {}
                    }
                }
            }
            _ => {}
        }
        FormOutcome::Stay
    }

    fn try_submit(&mut self, action: FormAction, form: &mut NoteForm) -> FormOutcome {
        let draft = match form.draft() {
            Ok(draft) => draft,
            Err(err) => {
                form.error = Some(err.to_string());
                return FormOutcome::Stay;
            }
        };
        let saved = match &action {
            FormAction::Create => self.book.create(draft),
            FormAction::Edit(note_id) => self.book.update(note_id, draft),
        };
        match saved {
            Ok(note) => {
                self.refresh();
                self.select_id(&note.id);
                self.status = match action {
                    FormAction::Create => format!("Created \"{}\"", note.title),
                    FormAction::Edit(_) => format!("Updated \"{}\"", note.title),
                };
                FormOutcome::Close
            }
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "saving note failed");
                form.error = Some(format!("{:#}", err));
                FormOutcome::Stay
            }
        }
    }

    /// Hides the dialog and shrinks it back onto the card, showing the saved version.
    fn close_editor(&mut self, note_id: &str) {
        let latest = self.book.get(note_id).cloned();
        if !self.animator.begin_collapse(latest, Instant::now()) {
            self.animator.open_direct();
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        self.layout.begin_frame();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(CARD_HEIGHT),
                Constraint::Length(2),
            ])
            .split(f.size());
        self.draw_header(f, layout[0]);
        self.draw_grid(f, layout[1]);
        self.draw_footer(f, layout[2]);

        let screen = f.size();
        let visible = self.dialog_visible();
        let mounted = match &self.mode {
            Mode::Creating(form) => {
                let area = dialog_area(screen, form);
                draw_dialog(f, area.unwrap_or(screen), "New Note", form);
                area
            }
            Mode::Editing { form, .. } => {
                let area = dialog_area(screen, form);
                if visible {
                    draw_dialog(f, area.unwrap_or(screen), "Edit Note", form);
                }
                area
            }
            Mode::ConfirmDelete { note_id } => {
                self.draw_confirm(f, note_id);
                None
            }
            Mode::Normal => None,
        };
        if let Some(area) = mounted {
            self.layout.register_dialog(area.into());
        }

        self.draw_overlay(f);
        draw_toasts(f, self.book.toasts.visible());
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "notecards ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} notes", self.notes.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(self.store_label.clone(), Style::default().fg(Color::DarkGray)),
        ];
        let pending = self.book.sync().pending();
        if pending > 0 {
            spans.push(Span::raw("  •  "));
            spans.push(Span::styled(
                format!("{} syncing", pending),
                Style::default().fg(Color::Yellow),
            ));
        }
        if let Some(note) = self.animator.editing_note() {
            spans.push(Span::raw("  •  "));
            spans.push(Span::styled(
                format!("{} {}", phase_label(self.animator.phase()), note.title),
                Style::default().fg(Color::Magenta),
            ));
        }
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_grid(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        self.columns = grid_columns(area.width);
        if self.notes.is_empty() {
            draw_empty(f, area);
            return;
        }
        let card_width = area.width / self.columns as u16;
        let visible_rows = (area.height / CARD_HEIGHT) as usize;
        let total_rows = self.notes.len().div_ceil(self.columns);
        self.row_offset = adjust_offset(
            self.selected / self.columns,
            self.row_offset,
            visible_rows,
            total_rows,
        );

        for (idx, note) in self.notes.iter().enumerate() {
            let row = idx / self.columns;
            if row < self.row_offset || row >= self.row_offset + visible_rows {
                continue;
            }
            let col = idx % self.columns;
            let rect = Rect::new(
                area.x + col as u16 * card_width,
                area.y + (row - self.row_offset) as u16 * CARD_HEIGHT,
                card_width,
                CARD_HEIGHT,
            );
            self.layout.register_card(&note.id, rect.into());
            if self.animator.hides_card(&note.id) {
                continue;
            }
            f.render_widget(card_widget(note, idx == self.selected, false), rect);
        }
    }

    fn draw_overlay(&self, f: &mut ratatui::Frame<'_>) {
        let Some(overlay) = self.animator.overlay() else {
            return;
        };
        if overlay.frame.opacity <= 0.0 {
            return;
        }
        let area = overlay.frame.rect.to_cells(f.size());
        if area.width < 2 || area.height < 2 {
            return;
        }
        let mut widget = card_widget(overlay.note, false, true);
        if overlay.frame.opacity < 0.5 {
            widget = widget.style(Style::default().bg(CARD_BG).add_modifier(Modifier::DIM));
        }
        f.render_widget(Clear, area);
        f.render_widget(widget, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let help = Line::from(vec![
            Span::styled("←↑↓→ / h j k l", Style::default().fg(Color::LightCyan)),
            Span::raw(" move  "),
            Span::styled("n", Style::default().fg(Color::LightMagenta)),
            Span::raw(" new  "),
            Span::styled("e/Enter", Style::default().fg(Color::LightYellow)),
            Span::raw(" edit  "),
            Span::styled("d", Style::default().fg(Color::LightRed)),
            Span::raw(" delete  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        let status = Line::from(Span::styled(
            self.status.clone(),
            Style::default().fg(Color::Gray),
        ));
        let footer = Paragraph::new(vec![help, status]).alignment(Alignment::Center);
        f.render_widget(footer, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, note_id: &str) {
        let area = centered_rect(50, 30, f.size());
        let title = self
            .book
            .get(note_id)
            .map(|n| n.title.clone())
            .unwrap_or_else(|| note_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", title),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("This cannot be undone."),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        "Confirm Delete",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightRed)),
            );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::PreparingToExpand => "opening",
        Phase::Expanding => "expanding",
        Phase::DialogOpen => "editing",
        Phase::Collapsing => "collapsing",
    }
}

/// Column count for the card grid at a given width.
fn grid_columns(width: u16) -> usize {
    match width {
        0..=59 => 1,
        60..=99 => 2,
        100..=139 => 3,
        _ => 4,
    }
}

/// Scrolls so `selected` stays inside a window of `viewport` rows.
fn adjust_offset(selected: usize, current_offset: usize, viewport: usize, len: usize) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let offset = current_offset.min(len.saturating_sub(viewport));
    if selected < offset {
        selected
    } else if selected >= offset + viewport {
        selected + 1 - viewport
    } else {
        offset
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Where the dialog lands for the current frame. Its height follows the content, so it
/// has to be measured per frame. `None` when the terminal is too small to hold it.
fn dialog_area(frame: Rect, form: &NoteForm) -> Option<Rect> {
    let width = frame.width.saturating_sub(8).min(DIALOG_MAX_WIDTH);
    if width < DIALOG_MIN_WIDTH {
        return None;
    }
    let content_lines = form.content.value.split('\n').count().max(3) as u16;
    let error_lines = u16::from(form.error.is_some());
    // borders, title, spacer, content, spacer, color, spacer, help
    let wanted = 2 + 1 + 1 + content_lines + 1 + 1 + 1 + 1 + error_lines;
    let height = wanted
        .max(DIALOG_MIN_HEIGHT)
        .min(frame.height.saturating_sub(2));
    if height < DIALOG_MIN_HEIGHT {
        return None;
    }
    Some(Rect::new(
        frame.x + (frame.width - width) / 2,
        frame.y + (frame.height - height) / 2,
        width,
        height,
    ))
}

fn draw_dialog(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, form: &NoteForm) {
    let mut lines = Vec::new();
    lines.extend(field_lines(
        "Title",
        &form.title,
        form.field == FormField::Title,
    ));
    lines.push(Line::from(""));
    lines.extend(field_lines(
        "Content",
        &form.content,
        form.field == FormField::Content,
    ));
    lines.push(Line::from(""));
    lines.push(color_line(form.color, form.field == FormField::Color));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Ctrl+S or Enter (outside Content) to save • Esc to cancel • Tab/Shift-Tab to move",
        Style::default().fg(Color::Gray),
    )));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )));
    }
    let accent = form.color.map(|c| c.color()).unwrap_or(Color::Cyan);
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn draw_empty(f: &mut ratatui::Frame<'_>, area: Rect) {
    let body = vec![
        Line::from(Span::styled(
            "No notes yet",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Looks a little empty here. Press n to create your first note."),
    ];
    let panel = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(panel, centered_rect(60, 50, area));
}

fn draw_toasts(f: &mut ratatui::Frame<'_>, toasts: &[Toast]) {
    let frame = f.size();
    let width = TOAST_WIDTH.min(frame.width);
    for (slot, toast) in toasts.iter().rev().enumerate() {
        let y = frame.y + 1 + slot as u16 * TOAST_HEIGHT;
        if y + TOAST_HEIGHT > frame.bottom() {
            break;
        }
        let area = Rect::new(frame.right() - width, y, width, TOAST_HEIGHT);
        let accent = match toast.kind {
            ToastKind::Info => Color::LightGreen,
            ToastKind::Destructive => Color::LightRed,
        };
        let widget = Paragraph::new(toast.description.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        toast.title.clone(),
                        Style::default().fg(accent).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent)),
            );
        f.render_widget(Clear, area);
        f.render_widget(widget, area);
    }
}

fn card_widget(note: &Note, selected: bool, expanded: bool) -> Paragraph<'static> {
    let accent = note.color_tag_value.map(|c| c.color()).unwrap_or(Color::Gray);
    let mut border_style = Style::default().fg(accent);
    if selected {
        border_style = border_style.add_modifier(Modifier::BOLD);
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(border_style)
        .title(Span::styled(
            note.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let mut lines = vec![Line::from(Span::styled(
        format!("Updated {}", note.updated_label()),
        Style::default().fg(Color::DarkGray),
    ))];
    let limit = if expanded {
        usize::MAX
    } else {
        CARD_HEIGHT.saturating_sub(3) as usize
    };
    lines.extend(
        note.content
            .lines()
            .take(limit)
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Gray)))),
    );
    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(CARD_BG))
}

fn color_line(color: Option<ColorTag>, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let swatch = color.map(|c| c.color()).unwrap_or(Color::DarkGray);
    let name_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    Line::from(vec![
        Span::styled("Color: ", label_style),
        Span::styled(if active { "◀ " } else { "  " }, name_style),
        Span::styled("● ", Style::default().fg(swatch)),
        Span::styled(color_label(color), name_style),
        Span::styled(if active { " ▶" } else { "" }, name_style),
    ])
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let prefix = format!("{}: ", label);
    let spacer = " ".repeat(prefix.chars().count());
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            let lead = if idx == 0 { prefix.clone() } else { spacer.clone() };
            Line::from(vec![
                Span::styled(lead, label_style),
                Span::styled(line.to_string(), value_style),
            ])
        })
        .collect()
}
