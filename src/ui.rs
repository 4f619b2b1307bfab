// terminal front end: mouse position plays, keys toggle effects

use std::io::{self, stdout};

use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    prelude::Stylize,
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::watch;

use vtheremin::config::{PARAM_STEP, TICK_STEP};
use vtheremin::key::{Key, note_grid};
use vtheremin::{AudioHandle, EffectKind};

const HELP: &str =
    "0 : silent mode, 1 (q,a) : guitar overtones, 2 (w,s) : accordion imitation, 3 (e,d) : distortion, Esc : quit";

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    ToggleMute,
    Toggle(EffectKind),
    Nudge(EffectKind, f32),
    Tick(f64),
    Quit,
}

pub fn map_key(k: KeyEvent) -> Option<UiAction> {
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) && matches!(k.code, KeyCode::Char('c')) {
        return Some(UiAction::Quit);
    }
    let action = match k.code {
        KeyCode::Esc => UiAction::Quit,
        KeyCode::Char('0') => UiAction::ToggleMute,
        KeyCode::Char('1') => UiAction::Toggle(EffectKind::Overtone),
        KeyCode::Char('q') => UiAction::Nudge(EffectKind::Overtone, PARAM_STEP),
        KeyCode::Char('a') => UiAction::Nudge(EffectKind::Overtone, -PARAM_STEP),
        KeyCode::Char('2') => UiAction::Toggle(EffectKind::Beat),
        KeyCode::Char('w') => UiAction::Nudge(EffectKind::Beat, PARAM_STEP),
        KeyCode::Char('s') => UiAction::Nudge(EffectKind::Beat, -PARAM_STEP),
        KeyCode::Char('3') => UiAction::Toggle(EffectKind::Distortion),
        KeyCode::Char('e') => UiAction::Nudge(EffectKind::Distortion, PARAM_STEP),
        KeyCode::Char('d') => UiAction::Nudge(EffectKind::Distortion, -PARAM_STEP),
        KeyCode::Up => UiAction::Tick(TICK_STEP),
        KeyCode::Down => UiAction::Tick(-TICK_STEP),
        _ => return None,
    };
    Some(action)
}

/// pointer position → (pitch, amp): left→right is pitch, bottom→top is volume
pub fn pointer_to_control(column: u16, row: u16, width: u16, height: u16) -> (f32, f32) {
    let x = column as f32 / width.max(1) as f32;
    let y = 1.0 - row as f32 / height.max(1) as f32;
    (x, y)
}

/// one row of the note grid: `|` on each semitone, `*` where the pitch cursor sits
pub fn grid_row(width: usize, pitch: f32) -> String {
    let mut row = vec![' '; width];
    if width == 0 {
        return String::new();
    }
    for line in note_grid() {
        let col = (line.x * width as f64) as usize;
        if let Some(c) = row.get_mut(col) {
            *c = '|';
        }
    }
    let cursor = ((pitch.clamp(0.0, 1.0) * width as f32) as usize).min(width - 1);
    row[cursor] = '*';
    row.into_iter().collect()
}

fn apply(handle: &AudioHandle, action: UiAction) {
    match action {
        UiAction::ToggleMute => handle.toggle_mute(),
        UiAction::Toggle(kind) => handle.toggle_effect(kind),
        UiAction::Nudge(kind, delta) => handle.adjust_effect(kind, delta),
        UiAction::Tick(delta) => handle.adjust_tick_duration(delta),
        UiAction::Quit => {}
    }
}

pub async fn run_ui(
    handle: AudioHandle,
    shutdown_tx: watch::Sender<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = stdout();

    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut events = EventStream::new();
    let mut snapshots = handle.subscribe();
    let mut shutdown_rx = shutdown_tx.subscribe();

    loop {
        terminal.draw(|f| draw_ui(f, &handle))?;

        tokio::select! {
            ev = events.next() => {
                let Some(ev) = ev else { break; };
                match ev? {
                    Event::Key(k) => match map_key(k) {
                        Some(UiAction::Quit) => break,
                        Some(action) => apply(&handle, action),
                        None => {}
                    },
                    Event::Mouse(MouseEvent { kind, column, row, .. }) => match kind {
                        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                            let size = terminal.size()?;
                            let (pitch, amp) = pointer_to_control(column, row, size.width, size.height);
                            handle.set_control(pitch, amp);
                        }
                        MouseEventKind::ScrollUp => apply(&handle, UiAction::Tick(TICK_STEP)),
                        MouseEventKind::ScrollDown => apply(&handle, UiAction::Tick(-TICK_STEP)),
                        _ => {}
                    },
                    _ => {}
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() || !snapshots.borrow_and_update().alive {
                    tracing::warn!("audio stream ended, leaving the ui");
                    break;
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() { break; }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    terminal.show_cursor()?;
    Ok(())
}

fn draw_ui(f: &mut ratatui::Frame, handle: &AudioHandle) {
    let control = handle.control();
    let snap = *handle.subscribe().borrow();
    let key = Key::nearest(snap.frequency);

    let [help, mode, status, grid] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(f.area());

    f.render_widget(Paragraph::new(HELP).centered(), help);
    f.render_widget(Paragraph::new(handle.mode_string()).bold().centered(), mode);
    f.render_widget(
        Paragraph::new(format!("{}  ({key} {:+.0}c)", handle.status_string(), key.cents_from(snap.frequency)))
            .bold()
            .centered(),
        status,
    );

    let block = Block::default().borders(Borders::ALL).title("VTheremin");
    let inner = block.inner(grid);
    let row = grid_row(inner.width as usize, control.pitch);
    let lines: Vec<Line> = (0..inner.height).map(|_| Line::from(row.clone())).collect();
    f.render_widget(Paragraph::new(lines).block(block), grid);
}
