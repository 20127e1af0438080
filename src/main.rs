use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use indoc::indoc;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};

use term_dock::{DockMode, DockPanel, WidgetId};

#[derive(Parser, Debug)]
#[command(
    name = "term-dock",
    about = "Demo shell for the dockable panel widget",
    after_help = indoc! {"
        Drag a tab to rearrange the panes:
          - onto another tab bar to re-tab it there
          - onto a pane edge to split that pane
          - onto empty space to spawn a fresh pane group
        Drag the dotted handles to resize, press the x mark to close a
        pane, and press q, Esc or Ctrl-C to quit.
    "}
)]
struct Cli {
    /// Frame interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Write tracing output to this file instead of stderr.
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log {
        term_dock::tracing_sub::log_to_file(path)?;
    }
    term_dock::tracing_sub::init_default();

    let mut app = App::new()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)?;
    terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, Duration::from_millis(cli.tick_ms));

    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        event::DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick: Duration,
) -> io::Result<()> {
    loop {
        app.panel.flush_posted();
        terminal.draw(|frame| app.render(frame))?;
        if app.all_panes_closed() {
            return Ok(());
        }
        let deadline = Instant::now() + tick;
        while event::poll(deadline.saturating_duration_since(Instant::now()))? {
            match event::read()? {
                Event::Key(key) => {
                    if is_quit(&key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    app.panel.handle_mouse(mouse);
                }
                _ => {}
            }
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

struct Pane {
    widget: WidgetId,
    label: &'static str,
    color: Color,
}

struct App {
    panel: DockPanel,
    panes: Vec<Pane>,
}

impl App {
    fn new() -> io::Result<Self> {
        let mut panel = DockPanel::new();
        let red = panel.create_content("Red", true);
        let blue = panel.create_content("Blue", true);
        let green = panel.create_content("Green", true);
        let yellow = panel.create_content("Yellow", true);

        panel.add_widget(red, None, None).map_err(io::Error::other)?;
        panel
            .add_widget(blue, Some(DockMode::SplitRight), Some(red))
            .map_err(io::Error::other)?;
        panel
            .add_widget(green, Some(DockMode::SplitBottom), Some(blue))
            .map_err(io::Error::other)?;
        panel
            .add_widget(yellow, Some(DockMode::TabAfter), Some(green))
            .map_err(io::Error::other)?;

        let panes = vec![
            Pane { widget: red, label: "Red", color: Color::Red },
            Pane { widget: blue, label: "Blue", color: Color::Blue },
            Pane { widget: green, label: "Green", color: Color::Green },
            Pane { widget: yellow, label: "Yellow", color: Color::Yellow },
        ];
        Ok(Self { panel, panes })
    }

    fn all_panes_closed(&self) -> bool {
        self.panel
            .root()
            .map(|root| self.panel.widgets().children(root).is_empty())
            .unwrap_or(true)
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let panes = &self.panes;
        self.panel.render(frame, area, |id, rect, frame| {
            render_pane(frame, panes, id, rect);
        });
    }
}

fn render_pane(frame: &mut Frame<'_>, panes: &[Pane], id: WidgetId, area: Rect) {
    let Some(pane) = panes.iter().find(|pane| pane.widget == id) else {
        return;
    };
    let style = Style::default().bg(pane.color).fg(Color::Black);
    frame.render_widget(Paragraph::new(pane.label).style(style).centered(), area);
}
