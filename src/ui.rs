use crate::commands::generate_id;
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use radar::layout::blip_at;
use radar::projector::{polar, Point, EXTENT, ORIGIN};
use radar::records::format_timestamp;
use radar::storage::{save_store, StoreLocation};
use radar::{
    Blip, Category, ClockTicker, InteractionController, Item, ItemStore, KeyOutcome, NewItem,
    Panel, RadarConfig, RadarIntents, RadarKey, RadarSession, Sector, SettingChange, UrgencyBand,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::{info, warn};

const ANIMATION_FRAME: Duration = Duration::from_millis(80);
const IDLE_FRAME: Duration = Duration::from_millis(500);
const HIT_TOLERANCE: f64 = 3.0;
const SWEEP_STEP_SECONDS: f64 = 1.0;
const LABEL_RADIUS: f64 = 46.0;
const LABEL_OFFSET: f64 = 6.0;
const LABEL_HIT_WIDTH: f64 = 14.0;
const LABEL_HIT_HEIGHT: f64 = 3.0;
const GRID_RADIUS: f64 = 42.0;

pub fn run(store: ItemStore, location: StoreLocation, config: &RadarConfig) -> Result<()> {
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(store, location, config);
    let result = app.event_loop(&mut guard.terminal);
    app.session.close();
    if let Err(err) = &result {
        warn!("radar view exited with error: {err:#}");
    }
    result
}

/// Restores the terminal on every exit path, including `?` and panics.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        if let Err(err) = execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        ) {
            restore_terminal(&mut stdout());
            return Err(err.into());
        }
        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(TerminalGuard { terminal }),
            Err(err) => {
                restore_terminal(&mut stdout());
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(self.terminal.backend_mut());
        let _ = self.terminal.show_cursor();
    }
}

fn restore_terminal<W: std::io::Write>(out: &mut W) {
    let _ = disable_raw_mode();
    let _ = execute!(
        out,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    );
}

struct App {
    store: ItemStore,
    location: StoreLocation,
    session: RadarSession,
    cursor: usize,
    mode: Mode,
    status: String,
    started: Instant,
    radar_area: Rect,
}

enum Mode {
    Radar,
    Capture(FieldValue),
    Details(String),
}

enum HostIntent {
    MarkDone(String),
    Details(String),
    QuickCapture,
}

/// Collects intents while the controller is borrowed; the app acts on them
/// afterwards.
#[derive(Default)]
struct IntentQueue(Vec<HostIntent>);

impl RadarIntents for IntentQueue {
    fn mark_item_done(&mut self, id: &str) {
        self.0.push(HostIntent::MarkDone(id.to_string()));
    }

    fn request_item_details(&mut self, id: &str) {
        self.0.push(HostIntent::Details(id.to_string()));
    }

    fn request_quick_capture(&mut self) {
        self.0.push(HostIntent::QuickCapture);
    }
}

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
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_grapheme(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_grapheme(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_grapheme(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
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

impl App {
    fn new(store: ItemStore, location: StoreLocation, config: &RadarConfig) -> Self {
        let status = format!("Loaded items from {}", location.path.display());
        let controller =
            InteractionController::default().with_focus_delay(config.focus_clear_delay());
        let session = RadarSession::open(
            config.engine(),
            controller,
            ClockTicker::new(config.tick_interval()),
            store.items(),
            Utc::now(),
            Instant::now(),
        );
        App {
            store,
            location,
            session,
            cursor: 0,
            mode: Mode::Radar,
            status,
            started: Instant::now(),
            radar_area: Rect::default(),
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(self.poll_timeout())? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind == KeyEventKind::Press && self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::FocusLost => {
                        self.session.suspend();
                        self.status = "Paused while the terminal is unfocused".into();
                    }
                    Event::FocusGained => {
                        self.session.resume(Instant::now(), Utc::now());
                        self.clamp_cursor();
                        self.status = "Resumed".into();
                    }
                    _ => {}
                }
            }
            if self.session.poll(Instant::now(), Utc::now).ticked {
                self.clamp_cursor();
            }
        }
        Ok(())
    }

    fn poll_timeout(&self) -> Duration {
        let settings = self.session.settings();
        let mut timeout = if settings.sweep_enabled() || settings.pulse_enabled() {
            ANIMATION_FRAME
        } else {
            IDLE_FRAME
        };
        let now = Instant::now();
        if let Some(until) = self.session.ticker().time_until_due(now) {
            timeout = timeout.min(until);
        }
        if let Some(deadline) = self.session.controller().focus_deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(now));
        }
        timeout
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if matches!(self.mode, Mode::Details(_)) {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('v')
            ) {
                self.mode = Mode::Radar;
            }
            return Ok(false);
        }
        if let Some(radar_key) = to_radar_key(&key) {
            let mut intents = IntentQueue::default();
            match self.route_radar_key(radar_key, &mut intents) {
                KeyOutcome::CloseView => return Ok(true),
                KeyOutcome::Handled => {
                    self.status = match radar_key {
                        RadarKey::Escape => "Panel closed".into(),
                        RadarKey::Char(_) => self.focus_status(),
                    };
                    self.process_intents(intents)?;
                    return Ok(false);
                }
                KeyOutcome::Ignored => {}
            }
        }
        if matches!(self.mode, Mode::Capture(_)) {
            self.handle_capture_key(key)?;
            return Ok(false);
        }
        self.handle_radar_key(key)
    }

    /// Every Escape and plain letter passes through the controller first. While
    /// the capture field is open the controller declines them.
    fn route_radar_key(&mut self, key: RadarKey, intents: &mut IntentQueue) -> KeyOutcome {
        let text_input_focused = matches!(self.mode, Mode::Capture(_));
        self.session
            .controller_mut()
            .handle_key(key, text_input_focused, Instant::now(), intents)
    }

    fn focus_status(&self) -> String {
        match self.session.controller().state().focused_sector() {
            Some(sector) => format!("Focused {}", sector.label()),
            None => self.status.clone(),
        }
    }

    fn handle_radar_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut intents = IntentQueue::default();
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab | KeyCode::Right | KeyCode::Down => self.move_cursor(1),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.cursor_blip().map(|b| b.id.clone()) {
                    self.click(&id);
                } else {
                    self.status = "Nothing on the radar".into();
                }
            }
            KeyCode::Char('d') => {
                if !self
                    .session
                    .controller_mut()
                    .mark_selected_done(&mut intents)
                {
                    self.status = "Open a blip first (Enter)".into();
                }
            }
            KeyCode::Char('v') => {
                if !self
                    .session
                    .controller_mut()
                    .view_selected_details(&mut intents)
                {
                    self.status = "Open a blip first (Enter)".into();
                }
            }
            KeyCode::Char(ch) => {
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    return Ok(false);
                }
                if let Some(change) = setting_for_key(ch) {
                    self.session.apply_setting(change);
                    self.status = self.describe_setting(change);
                }
            }
            _ => {}
        }
        self.process_intents(intents)?;
        Ok(false)
    }

    fn handle_capture_key(&mut self, key: KeyEvent) -> Result<()> {
        let Mode::Capture(field) = &mut self.mode else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Radar;
                self.status = "Capture canceled".into();
            }
            KeyCode::Enter => {
                let title = field.value.trim().to_string();
                if title.is_empty() {
                    self.status = "Title cannot be empty".into();
                } else {
                    self.mode = Mode::Radar;
                    self.capture(title)?;
                }
            }
            KeyCode::Backspace => field.backspace(),
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    field.insert_char(c);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(self.mode, Mode::Radar) {
            return;
        }
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some(point) = self.cell_to_point(mouse.column, mouse.row) else {
            return;
        };
        let hit = blip_at(self.session.blips(), point, HIT_TOLERANCE).map(|b| b.id.clone());
        if let Some(id) = hit {
            if let Some(idx) = self.session.blips().iter().position(|b| b.id == id) {
                self.cursor = idx;
            }
            self.click(&id);
        } else if let Some(sector) = sector_label_at(point) {
            self.session
                .controller_mut()
                .focus_sector(sector, Instant::now());
            self.status = format!("Focused {}", sector.label());
        }
    }

    fn click(&mut self, id: &str) {
        let panel = self.session.controller_mut().click_blip(id).clone();
        self.status = match panel {
            Panel::Open(open_id) => {
                let title = self
                    .blip(&open_id)
                    .map(|b| b.title.clone())
                    .unwrap_or(open_id);
                format!("Opened \"{}\"", title)
            }
            Panel::Closed => "Panel closed".into(),
        };
    }

    fn process_intents(&mut self, intents: IntentQueue) -> Result<()> {
        for intent in intents.0 {
            match intent {
                HostIntent::MarkDone(id) => self.complete_item(&id)?,
                HostIntent::Details(id) => self.mode = Mode::Details(id),
                HostIntent::QuickCapture => {
                    self.mode = Mode::Capture(FieldValue::new(""));
                    self.status = "Quick capture (Enter save, Esc cancel)".into();
                }
            }
        }
        Ok(())
    }

    fn complete_item(&mut self, id: &str) -> Result<()> {
        match self.store.mark_done(id) {
            Ok(()) => {
                info!(id, "item completed from radar");
                self.persist(format!("Completed {}", id))
            }
            Err(err) => {
                self.status = format!("Could not complete: {}", err);
                Ok(())
            }
        }
    }

    fn capture(&mut self, title: String) -> Result<()> {
        let id = generate_id(&self.store);
        let added = self.store.add(NewItem {
            id: id.clone(),
            title,
            category: Category::Inbox,
            timestamp: Some(Utc::now()),
            priority: None,
        });
        match added {
            Ok(()) => self.persist(format!("Captured {} to inbox", id)),
            Err(err) => {
                self.status = format!("Could not capture: {}", err);
                Ok(())
            }
        }
    }

    fn persist(&mut self, message: impl Into<String>) -> Result<()> {
        save_store(&self.location, &self.store)?;
        self.session.set_items(self.store.items());
        self.clamp_cursor();
        self.status = message.into();
        Ok(())
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.session.blips().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(len as isize) as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.session.blips().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn cursor_blip(&self) -> Option<&Blip> {
        self.session.blips().get(self.cursor)
    }

    fn blip(&self, id: &str) -> Option<&Blip> {
        self.session.blips().iter().find(|b| b.id == id)
    }

    fn cell_to_point(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.radar_area;
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        Some(Point {
            x: (f64::from(column - area.x) + 0.5) / f64::from(area.width) * EXTENT,
            y: (f64::from(row - area.y) + 0.5) / f64::from(area.height) * EXTENT,
        })
    }

    fn describe_setting(&self, change: SettingChange) -> String {
        let s = self.session.settings();
        let on = |b: bool| if b { "on" } else { "off" };
        match change {
            SettingChange::ToggleSweep => format!("Sweep {}", on(s.sweep_enabled())),
            SettingChange::SetSweepSpeed(_) | SettingChange::AdjustSweepSpeed(_) => {
                format!("Sweep period {:.0}s", s.sweep_speed_seconds())
            }
            SettingChange::TogglePulse => format!("Pulse {}", on(s.pulse_enabled())),
            SettingChange::ToggleGrid => format!("Grid {}", on(s.grid_enabled())),
            SettingChange::SetBlipScale(_) | SettingChange::CycleBlipScale => {
                format!("Blip size {}", s.blip_scale().label())
            }
            SettingChange::ToggleLabels => {
                format!("Labels always visible {}", on(s.labels_always_visible()))
            }
            SettingChange::ToggleGlow => format!("Glow {}", on(s.glow_enabled())),
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(4),
            ])
            .split(f.size());
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(40)])
            .split(layout[1]);

        self.draw_header(f, layout[0]);
        self.draw_radar(f, body[0]);
        self.draw_side(f, body[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Capture(field) => self.draw_capture(f, field),
            Mode::Details(id) => self.draw_details(f, id),
            Mode::Radar => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let ticker = match self.session.ticker().time_until_due(Instant::now()) {
            Some(left) => format!("next tick {}s", left.as_secs()),
            None => "paused".to_string(),
        };
        let title = Line::from(vec![
            Span::styled(
                "radar ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                &self.store.name,
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(self.location.scope.label(), Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("now {}", self.session.now().format("%H:%M UTC")),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(ticker, Style::default().fg(Color::Magenta)),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_radar(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                format!("Radar ({})", self.session.blips().len()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        let square = square_rect(block.inner(area));
        self.radar_area = square;
        f.render_widget(block, area);

        let this = &*self;
        let settings = this.session.settings();
        let rings = *this.session.engine().rings();
        let blips = this.session.blips();
        let elapsed = this.started.elapsed().as_secs_f64();
        let pulse_low = settings.pulse_enabled() && (elapsed * 2.0) as u64 % 2 == 1;
        let focused = this.session.controller().state().focused_sector();
        let selected = this.session.controller().state().selected_blip_id();
        let cursor_id = this.cursor_blip().map(|b| b.id.as_str());

        let canvas = Canvas::default()
            .x_bounds([0.0, EXTENT])
            .y_bounds([0.0, EXTENT])
            .marker(Marker::Braille)
            .paint(move |ctx| {
                if settings.grid_enabled() {
                    for band in [UrgencyBand::Now, UrgencyBand::Today, UrgencyBand::Later] {
                        ctx.draw(&Circle {
                            x: ORIGIN,
                            y: ORIGIN,
                            radius: rings.radius(band),
                            color: Color::DarkGray,
                        });
                    }
                    for sector in Sector::ALL {
                        let (x2, y2) = to_canvas(polar(GRID_RADIUS, sector.arc().start));
                        ctx.draw(&CanvasLine {
                            x1: ORIGIN,
                            y1: ORIGIN,
                            x2,
                            y2,
                            color: Color::DarkGray,
                        });
                    }
                }
                if settings.sweep_enabled() {
                    let turn = elapsed / settings.sweep_speed_seconds();
                    let angle = 360.0 - (turn.fract() * 360.0);
                    let (x2, y2) = to_canvas(polar(rings.radius(UrgencyBand::Later), angle));
                    ctx.draw(&CanvasLine {
                        x1: ORIGIN,
                        y1: ORIGIN,
                        x2,
                        y2,
                        color: Color::Green,
                    });
                }
                for sector in Sector::ALL {
                    let (x, y) = to_canvas(polar(LABEL_RADIUS, sector.arc().midpoint()));
                    let style = if focused == Some(sector) {
                        Style::default()
                            .fg(Color::LightYellow)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    let label = format!("{} [{}]", sector.label(), sector.shortcut());
                    ctx.print(x - LABEL_OFFSET, y, Line::from(Span::styled(label, style)));
                }
                ctx.layer();
                for blip in blips {
                    let (x, y) = to_canvas(blip.position);
                    let dimmed = focused.is_some_and(|s| s != blip.sector());
                    let color = if dimmed {
                        Color::DarkGray
                    } else if blip.urgent {
                        Color::LightRed
                    } else {
                        color_for_category(blip.category)
                    };
                    let mut radius = blip.size / 2.0;
                    if blip.urgent && pulse_low {
                        radius *= 0.6;
                    }
                    if blip.urgent && settings.glow_enabled() && !dimmed {
                        ctx.draw(&Circle {
                            x,
                            y,
                            radius: radius + 1.2,
                            color: Color::Red,
                        });
                    }
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius,
                        color,
                    });
                    ctx.draw(&Points {
                        coords: &[(x, y)],
                        color,
                    });
                    let is_selected = selected == Some(blip.id.as_str());
                    let is_cursor = cursor_id == Some(blip.id.as_str());
                    if is_selected {
                        ctx.draw(&Circle {
                            x,
                            y,
                            radius: radius + 2.0,
                            color: Color::Yellow,
                        });
                    }
                    if is_cursor {
                        ctx.draw(&Circle {
                            x,
                            y,
                            radius: radius + 2.8,
                            color: Color::White,
                        });
                    }
                    if settings.labels_always_visible() || is_selected || is_cursor {
                        ctx.print(
                            x + radius + 1.0,
                            y,
                            Line::from(Span::styled(
                                truncate_text(&blip.title, 18),
                                Style::default().fg(color),
                            )),
                        );
                    }
                }
            });
        f.render_widget(canvas, square);
    }

    fn draw_side(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let state = self.session.controller().state();
        let (lines, title) = match state.selected_blip_id().and_then(|id| self.blip(id)) {
            Some(blip) => (blip_detail_lines(blip), "Selected"),
            None => (self.legend_lines(), "Legend"),
        };
        let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
        );
        f.render_widget(panel, area);
    }

    fn legend_lines(&self) -> Vec<Line<'static>> {
        let blips = self.session.blips();
        let mut lines = Vec::new();
        for sector in Sector::ALL {
            let count = blips.iter().filter(|b| b.sector() == sector).count();
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<8}", sector.label()),
                    Style::default().fg(color_for_sector(sector)),
                ),
                Span::raw(format!("{:>3}", count)),
            ]));
        }
        lines.push(Line::from(""));
        for band in [UrgencyBand::Now, UrgencyBand::Today, UrgencyBand::Later] {
            let count = blips.iter().filter(|b| b.band == band).count();
            lines.push(Line::from(format!("{:<8}{:>3}", band.label(), count)));
        }
        let s = self.session.settings();
        let on = |b: bool| if b { "on" } else { "off" };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "sweep {} ({:.0}s)  pulse {}  grid {}",
                on(s.sweep_enabled()),
                s.sweep_speed_seconds(),
                on(s.pulse_enabled()),
                on(s.grid_enabled())
            ),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "size {}  labels {}  glow {}",
                s.blip_scale().label(),
                on(s.labels_always_visible()),
                on(s.glow_enabled())
            ),
            Style::default().fg(Color::Gray),
        )));
        lines
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn draw_capture(&self, f: &mut ratatui::Frame<'_>, field: &FieldValue) {
        let area = centered_rect(60, 20, f.size());
        let body = vec![
            Line::from(vec![
                Span::styled(
                    "Title: ",
                    Style::default()
                        .fg(Color::Gray)
                        .add_modifier(Modifier::BOLD | Modifier::DIM),
                ),
                Span::styled(field.with_caret(), Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save to inbox • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let dialog = Paragraph::new(body)
            .block(
                Block::default()
                    .title(Span::styled(
                        "Quick Capture",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_details(&self, f: &mut ratatui::Frame<'_>, id: &str) {
        let area = centered_rect(60, 40, f.size());
        let body = match self.session.items().iter().find(|i| i.id == id) {
            Some(item) => item_detail_lines(item, self.blip(id)),
            None => vec![Line::from(format!("{} is no longer on the radar", id))],
        };
        let dialog = Paragraph::new(body)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        "Details (Esc to close)",
                        Style::default()
                            .fg(Color::LightYellow)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightYellow)),
            );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn to_radar_key(key: &KeyEvent) -> Option<RadarKey> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(RadarKey::Escape),
        KeyCode::Char(ch) => Some(RadarKey::Char(ch)),
        _ => None,
    }
}

/// Sector whose label box contains `point`. Labels are printed starting
/// `LABEL_OFFSET` left of their anchor on the label ring.
fn sector_label_at(point: Point) -> Option<Sector> {
    Sector::ALL.into_iter().find(|sector| {
        let anchor = polar(LABEL_RADIUS, sector.arc().midpoint());
        let left = anchor.x - LABEL_OFFSET;
        (left..=left + LABEL_HIT_WIDTH).contains(&point.x)
            && (point.y - anchor.y).abs() <= LABEL_HIT_HEIGHT
    })
}

fn setting_for_key(ch: char) -> Option<SettingChange> {
    let change = match ch {
        's' => SettingChange::ToggleSweep,
        '+' | '=' => SettingChange::AdjustSweepSpeed(-SWEEP_STEP_SECONDS),
        '-' | '_' => SettingChange::AdjustSweepSpeed(SWEEP_STEP_SECONDS),
        'p' => SettingChange::TogglePulse,
        'g' => SettingChange::ToggleGrid,
        'b' => SettingChange::CycleBlipScale,
        'l' => SettingChange::ToggleLabels,
        'o' => SettingChange::ToggleGlow,
        _ => return None,
    };
    Some(change)
}

fn footer_help_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("t e n i", Style::default().fg(Color::LightCyan)),
        Span::raw(" focus  "),
        Span::styled("Tab/←→", Style::default().fg(Color::LightCyan)),
        Span::raw(" cursor  "),
        Span::styled("Enter", Style::default().fg(Color::LightYellow)),
        Span::raw(" open  "),
        Span::styled("d", Style::default().fg(Color::LightGreen)),
        Span::raw(" done  "),
        Span::styled("v", Style::default().fg(Color::LightYellow)),
        Span::raw(" details  "),
        Span::styled("c", Style::default().fg(Color::LightMagenta)),
        Span::raw(" capture  "),
        Span::styled("s +- p g b l o", Style::default().fg(Color::Gray)),
        Span::raw(" display  "),
        Span::styled("Esc/q", Style::default().fg(Color::LightRed)),
        Span::raw(" close"),
    ])
}

fn blip_detail_lines(blip: &Blip) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        blip.title.clone(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(vec![
        Span::styled(
            blip.category.to_string(),
            Style::default().fg(color_for_category(blip.category)),
        ),
        Span::raw("  "),
        Span::styled(
            blip.band.label(),
            Style::default().fg(if blip.urgent {
                Color::LightRed
            } else {
                Color::Gray
            }),
        ),
    ]));
    if let Some(ts) = blip.source.timestamp.as_ref() {
        lines.push(Line::from(format_timestamp(ts)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "d done • v details • Esc close",
        Style::default().fg(Color::Gray),
    )));
    lines
}

fn item_detail_lines(item: &Item, blip: Option<&Blip>) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray).add_modifier(Modifier::DIM);
    let row = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<10}", name), label),
            Span::raw(value),
        ])
    };
    let mut lines = vec![Line::from(Span::styled(
        item.title.clone(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.push(row("id", item.id.clone()));
    lines.push(row("kind", item.category.to_string()));
    lines.push(row(
        "when",
        item.timestamp
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".into()),
    ));
    lines.push(row(
        "priority",
        item.priority.map(|p| p.label().to_string()).unwrap_or_else(|| "-".into()),
    ));
    if let Some(blip) = blip {
        lines.push(row("band", blip.band.label().to_string()));
        lines.push(row("urgent", if blip.urgent { "yes" } else { "no" }.to_string()));
    }
    lines
}

/// Canvas y grows upward; layout y grows downward.
fn to_canvas(p: Point) -> (f64, f64) {
    (p.x, EXTENT - p.y)
}

/// Largest centred area that renders as a circle, given cells about twice
/// as tall as they are wide.
fn square_rect(area: Rect) -> Rect {
    let width = area.width.min(area.height.saturating_mul(2));
    let height = (width / 2).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
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

fn color_for_category(category: Category) -> Color {
    color_for_sector(category.sector())
}

fn color_for_sector(sector: Sector) -> Color {
    match sector {
        Sector::Tasks => Color::Cyan,
        Sector::Events => Color::LightGreen,
        Sector::Notes => Color::LightMagenta,
        Sector::Inbox => Color::LightBlue,
    }
}

fn prev_grapheme(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_grapheme(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
