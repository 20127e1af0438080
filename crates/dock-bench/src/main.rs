use std::io::{self, Stdout};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
};

use term_dock::{DockMode, DockPanel, WidgetId};

const LABELS: [&str; 12] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu",
];

const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

const MODES: [DockMode; 6] = [
    DockMode::SplitTop,
    DockMode::SplitLeft,
    DockMode::SplitRight,
    DockMode::SplitBottom,
    DockMode::TabBefore,
    DockMode::TabAfter,
];

#[derive(Parser, Debug)]
#[command(
    name = "dock-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drag-heavy benchmark for dock panel relayout throughput"
)]
struct BenchCli {
    /// How long to run the benchmark.
    #[arg(
        short = 'd',
        long = "duration",
        value_name = "SECONDS",
        default_value_t = 10.0
    )]
    duration_seconds: f64,

    /// Target frames per second. Used to pace rendering so comparisons are repeatable.
    #[arg(short = 'f', long = "fps", value_name = "FPS", default_value_t = 60.0)]
    target_fps: f64,

    /// Number of panes to seed the panel with.
    #[arg(long = "panes", value_name = "COUNT", default_value_t = 6)]
    panes: usize,

    /// Seed for the drag script; 0 derives one from the clock.
    #[arg(long = "seed", value_name = "SEED", default_value_t = 0)]
    seed: u64,
}

impl BenchCli {
    fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds)
    }

    fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps)
    }
}

struct BenchConfig {
    duration: Duration,
    target_fps: f64,
    frame_budget: Duration,
    panes: usize,
    seed: u64,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(0.5..=600.0).contains(&cli.duration_seconds) {
            return Err("duration must be between 0.5 and 600 seconds".to_string());
        }
        if !(1.0..=240.0).contains(&cli.target_fps) {
            return Err("fps must be between 1 and 240".to_string());
        }
        if !(2..=LABELS.len()).contains(&cli.panes) {
            return Err(format!("panes must be between 2 and {}", LABELS.len()));
        }
        Ok(Self {
            duration: cli.duration(),
            target_fps: cli.target_fps,
            frame_budget: cli.frame_budget(),
            panes: cli.panes,
            seed: cli.seed,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        cursor::Hide
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let bench_result = run_benchmark(&mut terminal, &config);

    terminal.show_cursor()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    )?;
    terminal::disable_raw_mode()?;

    let stats = bench_result?;
    println!("{}", stats.final_report(&config));

    Ok(())
}

type BenchTerminal = Terminal<CrosstermBackend<Stdout>>;

fn run_benchmark(terminal: &mut BenchTerminal, config: &BenchConfig) -> io::Result<BenchStats> {
    let mut rng = BenchRng::new(config.seed);
    let (mut panel, panes) = seed_panel(config, &mut rng).map_err(io::Error::other)?;
    let mut driver = DragDriver::new();
    let mut stats = BenchStats::new();
    let mut exit_reason = ExitReason::Completed;

    loop {
        panel.flush_posted();
        let frame_start = Instant::now();
        let mut cells_drawn: u64 = 0;
        terminal.draw(|frame| {
            cells_drawn = draw_frame(frame, &mut panel, &panes, &stats, config);
        })?;
        let draw_time = frame_start.elapsed();
        stats.record_frame(cells_drawn, draw_time);

        if driver.step(&mut panel, &mut rng) {
            stats.record_drag();
        }

        if stats.elapsed() >= config.duration {
            break;
        }

        if poll_for_exit(config.frame_budget.saturating_sub(draw_time))? {
            exit_reason = ExitReason::UserAbort;
            break;
        }
    }

    stats.groups_at_exit = panel.arrangement().map(|arr| arr.groups.len()).unwrap_or(0);
    stats.exit_reason = exit_reason;
    stats.mark_completed();
    Ok(stats)
}

fn seed_panel(
    config: &BenchConfig,
    rng: &mut BenchRng,
) -> Result<(DockPanel, Vec<BenchPane>), term_dock::DockError> {
    let mut panel = DockPanel::new();
    let mut panes: Vec<BenchPane> = Vec::with_capacity(config.panes);
    for index in 0..config.panes {
        let label = LABELS[index];
        let widget = panel.create_content(label, false);
        if index == 0 {
            panel.add_widget(widget, None, None)?;
        } else {
            let mode = MODES[rng.pick(MODES.len())];
            let reference = panes[rng.pick(index)].widget;
            panel.add_widget(widget, Some(mode), Some(reference))?;
        }
        panes.push(BenchPane {
            widget,
            label,
            color: PALETTE[index % PALETTE.len()],
        });
    }
    Ok((panel, panes))
}

struct BenchPane {
    widget: WidgetId,
    label: &'static str,
    color: Color,
}

fn draw_frame(
    frame: &mut Frame,
    panel: &mut DockPanel,
    panes: &[BenchPane],
    stats: &BenchStats,
    config: &BenchConfig,
) -> u64 {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return 0;
    }

    panel.render(frame, area, |id, rect, frame| {
        let Some(pane) = panes.iter().find(|pane| pane.widget == id) else {
            return;
        };
        let style = Style::default().bg(pane.color).fg(Color::Black);
        frame.render_widget(Paragraph::new(pane.label).style(style).centered(), rect);
    });

    let overlay_lines = build_overlay_lines(stats, config);
    let overlay_info = OverlayState::new(area, &overlay_lines);
    if let Some(overlay_area) = overlay_info.area {
        fill_rect(frame.buffer_mut(), overlay_area, Style::default().bg(Color::Black));
        frame.render_widget(
            Paragraph::new(overlay_lines.join("\n"))
                .style(Style::default().fg(Color::White).bg(Color::Black)),
            overlay_area,
        );
    }

    area.width as u64 * area.height as u64
}

fn fill_rect(buffer: &mut Buffer, area: Rect, style: Style) {
    for y in 0..area.height {
        for x in 0..area.width {
            let px = area.x.saturating_add(x);
            let py = area.y.saturating_add(y);
            buffer[(px, py)].set_symbol(" ").set_style(style);
        }
    }
}

fn build_overlay_lines(stats: &BenchStats, config: &BenchConfig) -> Vec<String> {
    let elapsed = stats.elapsed().as_secs_f64();
    let duration_target = config.duration.as_secs_f64();
    let progress = if duration_target > 0.0 {
        (elapsed / duration_target).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let fps_avg = if elapsed > 0.0 {
        stats.frame_count as f64 / elapsed
    } else {
        0.0
    };
    let drags_per_sec = if elapsed > 0.0 {
        stats.drag_count as f64 / elapsed
    } else {
        0.0
    };

    vec![
        "== Dock Bench ==".to_string(),
        format!(
            "elapsed {:>5.1}/{:>5.1}s ({:>3.0}%)",
            elapsed,
            duration_target,
            progress * 100.0
        ),
        format!(
            "frames {:>8} | avg fps {:>5.1} / target {:>5.1}",
            stats.frame_count, fps_avg, config.target_fps
        ),
        format!("drags {:>9} | {:>6.1}/s", stats.drag_count, drags_per_sec),
        format!(
            "frame ms avg {:>6.2} | best {:>5.2} | worst {:>5.2}",
            stats.average_frame_ms(),
            stats.fastest_frame_ms(),
            stats.slowest_frame_ms()
        ),
        "press q / esc / ctrl+c to stop".to_string(),
    ]
}

struct OverlayState {
    area: Option<Rect>,
}

impl OverlayState {
    fn new(window_area: Rect, lines: &[String]) -> Self {
        let available_width = window_area.width.saturating_sub(2);
        let available_height = window_area.height.saturating_sub(2);
        if available_width < 8 || available_height < 4 {
            return Self { area: None };
        }
        let text_width = lines
            .iter()
            .map(|line| line.len() as u16)
            .max()
            .unwrap_or(0);
        let text_height = lines.len() as u16;
        let width = text_width.saturating_add(2).clamp(8, available_width);
        let height = text_height.saturating_add(2).clamp(4, available_height);
        let rect = Rect {
            x: window_area.x + 1,
            y: window_area.y + 1,
            width,
            height,
        };
        Self { area: Some(rect) }
    }
}

/// Drives one scripted tab drag across frames so the overlay and the
/// docking chrome actually render: press, two moves, release.
struct DragDriver {
    phase: DragPhase,
}

enum DragPhase {
    Idle,
    Pressed { target: (u16, u16) },
    Moved { target: (u16, u16) },
}

impl DragDriver {
    fn new() -> Self {
        Self { phase: DragPhase::Idle }
    }

    /// Advance one phase. Returns true when a drag was committed.
    fn step(&mut self, panel: &mut DockPanel, rng: &mut BenchRng) -> bool {
        match self.phase {
            DragPhase::Idle => {
                let Some(arr) = panel.arrangement() else {
                    return false;
                };
                let area = arr.area;
                if arr.tab_slots.is_empty() || area.width == 0 || area.height == 0 {
                    return false;
                }
                let slot = &arr.tab_slots[rng.pick(arr.tab_slots.len())];
                let press = (
                    slot.rect.x + slot.rect.width / 2,
                    slot.rect.y,
                );
                let target = (
                    area.x + rng.pick(area.width as usize) as u16,
                    area.y + rng.pick(area.height as usize) as u16,
                );
                panel.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), press));
                self.phase = DragPhase::Pressed { target };
                false
            }
            DragPhase::Pressed { target } => {
                panel.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), target));
                self.phase = DragPhase::Moved { target };
                false
            }
            DragPhase::Moved { target } => {
                panel.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), target));
                panel.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), target));
                self.phase = DragPhase::Idle;
                true
            }
        }
    }
}

fn mouse(kind: MouseEventKind, at: (u16, u16)) -> MouseEvent {
    MouseEvent {
        kind,
        column: at.0,
        row: at.1,
        modifiers: KeyModifiers::empty(),
    }
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    frame_count: u64,
    drag_count: u64,
    cell_updates: u64,
    total_draw_time: Duration,
    fastest_frame: Duration,
    slowest_frame: Duration,
    groups_at_exit: usize,
    exit_reason: ExitReason,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            frame_count: 0,
            drag_count: 0,
            cell_updates: 0,
            total_draw_time: Duration::ZERO,
            fastest_frame: Duration::MAX,
            slowest_frame: Duration::ZERO,
            groups_at_exit: 0,
            exit_reason: ExitReason::Completed,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_frame(&mut self, cells: u64, draw_time: Duration) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.cell_updates = self.cell_updates.saturating_add(cells);
        self.total_draw_time += draw_time;
        if draw_time < self.fastest_frame {
            self.fastest_frame = draw_time;
        }
        if draw_time > self.slowest_frame {
            self.slowest_frame = draw_time;
        }
    }

    fn record_drag(&mut self) {
        self.drag_count = self.drag_count.saturating_add(1);
    }

    fn average_frame_ms(&self) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        (self.total_draw_time.as_secs_f64() / self.frame_count as f64) * 1_000.0
    }

    fn fastest_frame_ms(&self) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        self.fastest_frame.as_secs_f64() * 1_000.0
    }

    fn slowest_frame_ms(&self) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        self.slowest_frame.as_secs_f64() * 1_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let fps_avg = if elapsed > 0.0 {
            self.frame_count as f64 / elapsed
        } else {
            0.0
        };
        let drags_per_sec = if elapsed > 0.0 {
            self.drag_count as f64 / elapsed
        } else {
            0.0
        };

        indoc::formatdoc!(
            r#"
            Dock bench {status}.
            Duration: {elapsed:.2}s (target {target:.2}s)
            Frames: {frames} | Avg FPS: {fps:.1} (target {target_fps:.1})
            Avg frame: {avg:.2} ms | Best: {best:.2} ms | Worst: {worst:.2} ms
            Drags: {drags} (~{drags_per_sec:.1}/s) | Groups at exit: {groups}
            "#,
            status = self.exit_reason.describe(),
            elapsed = elapsed,
            target = config.duration.as_secs_f64(),
            frames = self.frame_count,
            fps = fps_avg,
            target_fps = config.target_fps,
            avg = self.average_frame_ms(),
            best = self.fastest_frame_ms(),
            worst = self.slowest_frame_ms(),
            drags = self.drag_count,
            drags_per_sec = drags_per_sec,
            groups = self.groups_at_exit,
        )
    }
}

#[derive(Copy, Clone)]
enum ExitReason {
    Completed,
    UserAbort,
}

impl ExitReason {
    fn describe(self) -> &'static str {
        match self {
            ExitReason::Completed => "completed full duration",
            ExitReason::UserAbort => "stopped by user",
        }
    }
}

struct BenchRng {
    state: u64,
}

impl BenchRng {
    fn new(seed: u64) -> Self {
        let state = if seed != 0 {
            seed
        } else {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
                ^ 0xD0C5_D0C5_9876_4321
        };
        Self { state }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn pick(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.next() as usize % bound
    }
}

fn poll_for_exit(wait: Duration) -> io::Result<bool> {
    if !event::poll(wait)? {
        return Ok(false);
    }
    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if matches!(
                    key.code,
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
                ) {
                    return Ok(true);
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(true);
                }
            }
            _ => {}
        }
        if !event::poll(Duration::ZERO)? {
            break;
        }
    }
    Ok(false)
}
