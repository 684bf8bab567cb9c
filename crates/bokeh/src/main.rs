use std::io::stdout;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

use bokeh_config::Config;
use bokeh_core::Viewport;
use bokeh_engine::{Engine, EngineParams, Selection};
use bokeh_export::Format;
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
};
use log::{info, warn};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Stylize},
    text::Line,
};

mod logging;
mod snapshot;

/// Logical units per terminal column.
const CELL_WIDTH: f32 = 8.0;
/// Logical units per terminal row.
const CELL_HEIGHT: f32 = 16.0;
/// Logical units per raster pixel; a cell holds one pixel across and two down.
const PIXEL_SIZE: f32 = 8.0;
/// Terminal rows below the backdrop: status line and help line.
const CHROME_ROWS: u16 = 2;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load()?;
    if let Some(path) = logging::init()? {
        info!("logging to {}", path.display());
    }

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableFocusChange)?;
    let result = start(&mut terminal, config);
    let focus = execute!(stdout(), DisableFocusChange);
    ratatui::restore();
    result?;
    Ok(focus?)
}

fn start(terminal: &mut DefaultTerminal, config: Config) -> color_eyre::Result<()> {
    let size = terminal.size()?;
    let viewport = viewport(size.width, size.height);
    let engine = Engine::new(engine_params(&config, viewport))?;
    let app = App::new(&config, std::env::current_dir()?);
    app.run(terminal, engine)
}

/// Logical viewport of the backdrop in a terminal of `cols` x `rows` cells.
fn viewport(cols: u16, rows: u16) -> Viewport {
    let rows = rows.saturating_sub(CHROME_ROWS);
    Viewport::new(f32::from(cols) * CELL_WIDTH, f32::from(rows) * CELL_HEIGHT)
}

fn engine_params(config: &Config, viewport: Viewport) -> EngineParams {
    EngineParams {
        particle_count: config.particle_count,
        palette: config.palette.clone(),
        viewport,
        container: config.container.clone(),
        surface_height: config.surface_height,
        pixel_size: PIXEL_SIZE,
        formation: config.formation,
        background: config.background.clone(),
        tuning: config.motion.clone(),
        seed: config.seed,
    }
}

/// The terminal host around one particle engine.
#[derive(Debug)]
pub struct App {
    /// Frames per second of the render loop.
    frame_rate: u32,
    /// Directory exports are written to.
    export_dir: PathBuf,
    /// Accent color of the help line.
    accent: Color,
    /// Outcome of the latest export.
    status: Option<String>,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: &Config, export_dir: PathBuf) -> Self {
        let accent = config
            .palette
            .first()
            .map_or(Color::White, |&rgb| Color::from(rgb));
        Self {
            frame_rate: config.frame_rate,
            export_dir,
            accent,
            status: None,
        }
    }

    /// Run the render loop until the user quits.
    pub fn run(
        mut self,
        terminal: &mut DefaultTerminal,
        mut engine: Engine,
    ) -> color_eyre::Result<()> {
        let mut render_loop = engine.render_loop(self.frame_rate);
        let frames = render_loop.run(&mut engine, |engine| -> color_eyre::Result<_> {
            terminal.draw(|frame| self.render(engine, frame))?;
            self.handle_crossterm_events(engine)
        })?;
        engine.dispose();
        info!("rendered {frames} frames");
        Ok(())
    }

    /// Renders the backdrop, status and help lines.
    fn render(&self, engine: &Engine, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Backdrop
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help text
        ])
        .split(frame.area());

        engine.render(frame, chunks[0]);

        if let Some(status) = &self.status {
            frame.render_widget(Line::from(status.as_str().dark_gray()).centered(), chunks[1]);
        }

        let color = self.accent;
        let help = Line::from(vec![
            "f".bold().fg(color),
            " form  ".dark_gray(),
            "d".bold().fg(color),
            " disperse  ".dark_gray(),
            "x".bold().fg(color),
            " export csv  ".dark_gray(),
            "t".bold().fg(color),
            " export tsv  ".dark_gray(),
            "q".bold().fg(color),
            " quit".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, chunks[2]);
    }

    /// Drains pending crossterm events without blocking the frame.
    fn handle_crossterm_events(
        &mut self,
        engine: &mut Engine,
    ) -> color_eyre::Result<ControlFlow<()>> {
        while event::poll(Duration::ZERO)? {
            let flow = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    self.on_key_event(engine, key)
                }
                Event::FocusGained => {
                    engine.trigger_form(Selection::All);
                    ControlFlow::Continue(())
                }
                Event::FocusLost => {
                    engine.trigger_disperse(Selection::All);
                    ControlFlow::Continue(())
                }
                _ => ControlFlow::Continue(()),
            };
            if flow.is_break() {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Handles the key events.
    fn on_key_event(&mut self, engine: &mut Engine, key: KeyEvent) -> ControlFlow<()> {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => {
                return ControlFlow::Break(());
            }
            (_, KeyCode::Char('f')) => {
                engine.trigger_form(Selection::All);
            }
            (_, KeyCode::Char('d')) => {
                engine.trigger_disperse(Selection::All);
            }
            (_, KeyCode::Char('x')) => self.export(engine, Format::Csv),
            (_, KeyCode::Char('t')) => self.export(engine, Format::Tsv),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    /// Export a snapshot of the particles and report the outcome.
    fn export(&mut self, engine: &Engine, format: Format) {
        let status = match snapshot::export(engine, &self.export_dir, format) {
            Ok(path) => format!("exported {}", path.display()),
            Err(e) => {
                warn!("export failed: {e}");
                format!("export failed: {e}")
            }
        };
        self.status = Some(status);
    }
}
