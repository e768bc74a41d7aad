use std::collections::BTreeMap;
use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use folio_core::{AmbientScheduler, Page, PageLayout, StaticLayout};
use folio_protocol::{EnergyLine, HostCommand, LineId, Orientation, ScrollBehavior};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracing::{debug, info};

use crate::document::{Document, ROW_PX, RowKind};

const FRAME: Duration = Duration::from_millis(33);
const IDLE: Duration = Duration::from_millis(500);
const SCROLL_DURATION: Duration = Duration::from_millis(450);

fn row_style(kind: RowKind) -> Style {
    match kind {
        RowKind::Blank | RowKind::Body => Style::default().fg(Color::White),
        RowKind::Title => Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD),
        RowKind::Heading => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        RowKind::Accent => Style::default().fg(Color::LightBlue),
        RowKind::Muted => Style::default().fg(Color::DarkGray),
    }
}

/// In-flight smooth scroll, eased out over [`SCROLL_DURATION`].
#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f64,
    to: f64,
    started: Instant,
}

impl ScrollAnimation {
    /// Position at `now` and whether the animation has finished.
    fn sample(&self, now: Instant) -> (f64, bool) {
        let t = now.saturating_duration_since(self.started).as_secs_f64()
            / SCROLL_DURATION.as_secs_f64();
        if t >= 1.0 {
            return (self.to, true);
        }
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.from + (self.to - self.from) * eased, false)
    }
}

/// An attached energy line and when it was attached.
struct LiveLine {
    line: EnergyLine,
    attached_at: Duration,
}

impl LiveLine {
    /// Sweep progress in `0.0..=1.0`, or `None` while delayed or finished.
    fn progress(&self, now: Duration) -> Option<f64> {
        let elapsed = now.checked_sub(self.attached_at + self.line.delay)?;
        let t = elapsed.as_secs_f64() / self.line.duration.as_secs_f64().max(f64::EPSILON);
        (t <= 1.0).then_some(t)
    }
}

struct App {
    page: Page,
    document: Document,
    viewport_rows: usize,
    scroll_y: f64,
    animation: Option<ScrollAnimation>,
    scheduler: AmbientScheduler,
    rng: fastrand::Rng,
    lines: BTreeMap<LineId, LiveLine>,
    epoch: Instant,
}

impl App {
    fn new(page: Page, width: u16, height: u16) -> Self {
        let viewport_rows = content_rows(height);
        let document = Document::build(page.content(), width, viewport_rows);
        let scheduler = page.ambient_scheduler();
        Self {
            page,
            document,
            viewport_rows,
            scroll_y: 0.0,
            animation: None,
            scheduler,
            rng: fastrand::Rng::new(),
            lines: BTreeMap::new(),
            epoch: Instant::now(),
        }
    }

    fn layout(&self) -> StaticLayout {
        self.document.layout(self.viewport_rows, self.scroll_y)
    }

    fn clock(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn mount(&mut self) {
        let layout = self.layout();
        self.page.mount(&layout);
        let now = self.clock();
        let commands = self.scheduler.activate(now, true, &mut self.rng);
        self.apply(commands, now);
    }

    fn unmount(&mut self) {
        self.scheduler.deactivate();
        self.page.unmount();
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.viewport_rows = content_rows(height);
        self.document = Document::build(self.page.content(), width, self.viewport_rows);
        self.scroll_y = self.clamp_scroll(self.scroll_y);
        let layout = self.layout();
        self.page.on_resize(&layout);
    }

    fn clamp_scroll(&self, y: f64) -> f64 {
        let max = self.layout().metrics().max_scroll();
        y.clamp(0.0, max)
    }

    /// Move the viewport and let the tracker re-evaluate.
    fn scroll_to(&mut self, y: f64) {
        let y = self.clamp_scroll(y);
        if (y - self.scroll_y).abs() < f64::EPSILON {
            return;
        }
        self.scroll_y = y;
        let layout = self.layout();
        self.page.on_scroll(&layout);
    }

    /// Manual scrolling cancels any smooth scroll in progress.
    fn scroll_by(&mut self, delta: f64) {
        self.animation = None;
        self.scroll_to(self.scroll_y + delta);
    }

    fn navigate(&mut self, id: &str) {
        let layout = self.layout();
        let Some(HostCommand::ScrollTo { top, behavior }) = self.page.request_navigate(id, &layout)
        else {
            return;
        };
        let top = self.clamp_scroll(top);
        match behavior {
            ScrollBehavior::Smooth => {
                self.animation = Some(ScrollAnimation {
                    from: self.scroll_y,
                    to: top,
                    started: Instant::now(),
                });
            }
            ScrollBehavior::Instant => {
                self.animation = None;
                self.scroll_to(top);
            }
        }
    }

    fn navigate_relative(&mut self, step: isize) {
        let sections = self.page.sections();
        let current = sections
            .position(self.page.navigation().active())
            .unwrap_or(0);
        let target = current
            .saturating_add_signed(step)
            .min(sections.len().saturating_sub(1));
        if let Some(section) = sections.get(target) {
            let id = section.id.clone();
            self.navigate(&id);
        }
    }

    fn navigate_index(&mut self, index: usize) {
        if let Some(section) = self.page.sections().get(index) {
            let id = section.id.clone();
            self.navigate(&id);
        }
    }

    fn open_visible_demo(&mut self) {
        let first_row = (self.scroll_y / ROW_PX) as usize;
        let media = self
            .document
            .visible_project(first_row, self.viewport_rows)
            .and_then(|i| self.page.content().projects.get(i))
            .and_then(|p| p.video.clone());
        match media {
            Some(media) => self.page.open_demo(media),
            None => debug!("no project demo in view"),
        }
    }

    /// Advance the scroll animation and the ambient schedule to now.
    fn tick(&mut self) {
        if let Some(animation) = self.animation {
            let (y, done) = animation.sample(Instant::now());
            self.scroll_to(y);
            if done {
                self.animation = None;
            }
        }
        let now = self.clock();
        let commands = self.scheduler.advance(now, &mut self.rng);
        self.apply(commands, now);
    }

    fn apply(&mut self, commands: impl IntoIterator<Item = HostCommand>, now: Duration) {
        for command in commands {
            match command {
                HostCommand::AttachLine { line } => {
                    self.lines.insert(
                        line.id,
                        LiveLine {
                            line,
                            attached_at: now,
                        },
                    );
                }
                HostCommand::DetachLine { id } => {
                    self.lines.remove(&id);
                }
                HostCommand::ScrollTo { .. } => {}
            }
        }
    }

    fn poll_timeout(&self) -> Duration {
        if self.animation.is_some() || !self.lines.is_empty() {
            return FRAME;
        }
        self.scheduler
            .next_deadline()
            .map_or(IDLE, |deadline| deadline.saturating_sub(self.clock()))
            .min(IDLE)
    }

    /// Returns `false` when the user asked to quit.
    fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let page_step = self.viewport_rows as f64 * ROW_PX * 0.9;
                match key.code {
                    KeyCode::Char('q') => return false,
                    KeyCode::Esc if self.page.demo().is_open() => self.page.close_demo(),
                    KeyCode::Esc if self.page.navigation().menu_open() => self.page.close_menu(),
                    KeyCode::Esc => return false,
                    KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-ROW_PX),
                    KeyCode::Down | KeyCode::Char('j') => self.scroll_by(ROW_PX),
                    KeyCode::PageUp => self.scroll_by(-page_step),
                    KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(page_step),
                    KeyCode::Home => self.scroll_by(f64::NEG_INFINITY),
                    KeyCode::End => self.scroll_by(f64::INFINITY),
                    KeyCode::Tab => self.navigate_relative(1),
                    KeyCode::BackTab => self.navigate_relative(-1),
                    KeyCode::Char(c @ '1'..='9') => {
                        self.navigate_index(usize::from(c as u8 - b'1'));
                    }
                    KeyCode::Char('m') => {
                        self.page.toggle_menu();
                    }
                    KeyCode::Char('d') => self.open_visible_demo(),
                    _ => {}
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_by(ROW_PX * 3.0),
                MouseEventKind::ScrollUp => self.scroll_by(-ROW_PX * 3.0),
                _ => {}
            },
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
        true
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let nav_area = Rect::new(area.x, area.y, area.width, 1);
        let body_area = Rect::new(
            area.x,
            area.y + 1,
            area.width,
            area.height.saturating_sub(2),
        );
        let status_area = Rect::new(
            area.x,
            area.y + area.height.saturating_sub(1),
            area.width,
            1,
        );

        frame.render_widget(Paragraph::new(self.nav_line()), nav_area);
        self.draw_body(frame, body_area);
        self.draw_lines(frame, body_area);
        frame.render_widget(
            Paragraph::new(self.status_line())
                .style(Style::default().fg(Color::Gray).bg(Color::Black)),
            status_area,
        );

        if self.page.navigation().menu_open() {
            self.draw_menu(frame, body_area);
        }
        if self.page.demo().is_open() {
            self.draw_demo(frame, body_area);
        }
    }

    fn nav_line(&self) -> Line<'static> {
        let nav = self.page.navigation();
        let mut spans = vec![Span::styled(
            format!(" {} ", self.page.content().owner.name),
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        )];
        for (i, section) in self.page.sections().iter().enumerate() {
            let style = if nav.is_active(&section.id) {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!(" {} {} ", i + 1, section.label), style));
        }
        Line::from(spans).style(Style::default().bg(Color::Rgb(15, 23, 42)))
    }

    fn status_line(&self) -> String {
        let max = self.layout().metrics().max_scroll();
        let percent = if max > 0.0 {
            (self.scroll_y / max * 100.0).round()
        } else {
            100.0
        };
        format!(
            " {} | {percent:>3}% | lines {} | ↑↓ scroll  Tab/1-9 jump  m menu  d demo  q quit",
            self.page.navigation().active(),
            self.scheduler.live_count(),
        )
    }

    fn draw_body(&self, frame: &mut Frame, area: Rect) {
        let first = (self.scroll_y / ROW_PX) as usize;
        let lines: Vec<Line> = self
            .document
            .rows()
            .iter()
            .skip(first)
            .take(usize::from(area.height))
            .map(|row| Line::styled(format!("  {}", row.text), row_style(row.kind)))
            .collect();
        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(Color::Black)),
            area,
        );
    }

    /// Draw each sweeping line segment onto blank cells only, so text
    /// stays readable underneath the effect.
    fn draw_lines(&self, frame: &mut Frame, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let now = self.clock();
        let buf = frame.buffer_mut();
        for live in self.lines.values() {
            let Some(t) = live.progress(now) else {
                continue;
            };
            let line = &live.line;
            let (extent, across) = match line.orientation {
                Orientation::Horizontal => (area.width, area.height),
                Orientation::Vertical => (area.height, area.width),
            };
            let fixed = ((line.position_pct / 100.0) * f64::from(across.saturating_sub(1))) as u16;
            let segment = (extent / 4).max(2);
            let head = (t * f64::from(extent + segment)) as u16;
            let tail = head.saturating_sub(segment);
            for offset in tail..head.min(extent) {
                let (x, y, glyph) = match line.orientation {
                    Orientation::Horizontal => (area.x + offset, area.y + fixed, "─"),
                    Orientation::Vertical => (area.x + fixed, area.y + offset, "│"),
                };
                let cell = &mut buf[(x, y)];
                if cell.symbol() == " " {
                    let fg = if offset + 1 == head {
                        Color::LightCyan
                    } else {
                        Color::Rgb(30, 80, 110)
                    };
                    cell.set_symbol(glyph).set_fg(fg);
                }
            }
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let sections = self.page.sections();
        let width = 24.min(area.width);
        let height = (sections.len() as u16 + 2).min(area.height);
        let popup = Rect::new(area.x + area.width - width, area.y, width, height);
        let nav = self.page.navigation();
        let lines: Vec<Line> = sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let style = if nav.is_active(&section.id) {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::styled(format!(" {} {}", i + 1, section.label), style)
            })
            .collect();
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Menu ")),
            popup,
        );
    }

    fn draw_demo(&self, frame: &mut Frame, area: Rect) {
        let media = self.page.demo().media().unwrap_or_default();
        let width = (area.width * 2 / 3).max(20).min(area.width);
        let height = 5.min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(vec![
                Line::raw(format!(" ▶ {media}")),
                Line::raw(""),
                Line::styled(" Esc to close", Style::default().fg(Color::DarkGray)),
            ])
            .block(Block::default().borders(Borders::ALL).title(" Demo ")),
            popup,
        );
    }
}

/// Terminal rows left for the page between the nav bar and status line.
fn content_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(2)).max(1)
}

pub fn run_tui(page: Page) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, page);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    page: Page,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(page, size.width, size.height);
    app.mount();
    info!(active = %app.page.navigation().active(), "terminal page mounted");

    loop {
        app.tick();
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(app.poll_timeout())? && !app.handle(event::read()?) {
            break;
        }
    }

    app.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use folio_core::PageConfig;
    use folio_core::model::Content;

    use super::*;

    fn app(height: u16) -> App {
        let page = Page::new(Content::builtin().unwrap(), PageConfig::default()).unwrap();
        let mut app = App::new(page, 80, height);
        app.mount();
        app
    }

    #[test]
    fn animation_eases_out_to_target() {
        let started = Instant::now();
        let animation = ScrollAnimation {
            from: 0.0,
            to: 1000.0,
            started,
        };
        let (start, done) = animation.sample(started);
        assert!(start.abs() < f64::EPSILON);
        assert!(!done);

        let (half, _) = animation.sample(started + SCROLL_DURATION / 2);
        assert!(half > 500.0, "ease-out is past halfway at half time: {half}");

        let (end, done) = animation.sample(started + SCROLL_DURATION);
        assert!((end - 1000.0).abs() < f64::EPSILON);
        assert!(done);
    }

    #[test]
    fn line_progress_waits_for_delay() {
        let live = LiveLine {
            line: EnergyLine {
                id: LineId(1),
                orientation: Orientation::Horizontal,
                position_pct: 50.0,
                duration: Duration::from_millis(4000),
                delay: Duration::from_millis(1000),
            },
            attached_at: Duration::from_secs(10),
        };
        assert_eq!(live.progress(Duration::from_millis(10_500)), None);
        let mid = live.progress(Duration::from_millis(13_000)).unwrap();
        assert!((mid - 0.5).abs() < 1e-9);
        assert_eq!(live.progress(Duration::from_millis(15_001)), None);
    }

    #[test]
    fn mount_starts_at_first_section_with_a_line() {
        let app = app(30);
        assert_eq!(app.page.navigation().active(), "home");
        assert_eq!(app.lines.len(), 1);
        assert_eq!(app.scheduler.live_count(), 1);
    }

    #[test]
    fn navigation_scrolls_below_header() {
        let mut app = app(30);
        let about_top = app.document.spans()[1].start as f64 * ROW_PX;
        app.navigate("about");
        let animation = app.animation.unwrap();
        assert!((animation.to - (about_top - 80.0)).abs() < f64::EPSILON);

        app.scroll_to(animation.to);
        assert_eq!(app.page.navigation().active(), "about");
    }

    #[test]
    fn end_key_activates_last_section() {
        let mut app = app(30);
        app.scroll_by(f64::INFINITY);
        assert_eq!(app.page.navigation().active(), "contact");
        assert!((app.scroll_y - app.layout().metrics().max_scroll()).abs() < f64::EPSILON);
    }

    #[test]
    fn manual_scroll_cancels_animation() {
        let mut app = app(30);
        app.navigate("projects");
        assert!(app.animation.is_some());
        app.scroll_by(ROW_PX);
        assert!(app.animation.is_none());
    }

    #[test]
    fn resize_keeps_scroll_in_bounds() {
        let mut app = app(20);
        app.scroll_by(f64::INFINITY);
        app.resize(200, 60);
        let max = app.layout().metrics().max_scroll();
        assert!(app.scroll_y <= max);
    }

    #[test]
    fn demo_opens_for_project_in_view() {
        let mut app = app(30);
        app.open_visible_demo();
        assert!(!app.page.demo().is_open());

        let projects = app.document.spans()[2].start as f64 * ROW_PX;
        app.scroll_to(projects);
        app.open_visible_demo();
        assert_eq!(app.page.demo().media(), Some("assets/night-shift.mp4"));
    }
}
