//! Terminal Puyo runner (default binary).
//!
//! Two play fields on one keyboard: WASD for the left player, arrow keys for
//! the right, `p` pauses either field, `q` or ctrl-c quits. Input goes
//! through crossterm and frames through the framebuffer renderer.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use tui_puyo::core::{Instance, PuyoPool, SimConfig};
use tui_puyo::input::{should_quit, KeyBindings, KeyboardController};
use tui_puyo::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_puyo::types::PUYO_POOL_CAPACITY;

const TICK_MS: u64 = 16;

fn main() -> Result<()> {
    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let mut pool = PuyoPool::new(PUYO_POOL_CAPACITY);
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0x5eed);

    let mut players = [
        (
            Instance::new(&mut pool, seed, SimConfig::default())?,
            KeyboardController::new(KeyBindings::wasd()),
        ),
        (
            Instance::new(&mut pool, seed.wrapping_mul(31).wrapping_add(17), SimConfig::default())?,
            KeyboardController::new(KeyBindings::arrows()),
        ),
    ];

    let view = GameView::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut cleared = [0u32; 2];
    let tick_duration = Duration::from_millis(TICK_MS);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((120, 30));
        let fields: [(&Instance, u32); 2] = [
            (&players[0].0, cleared[0]),
            (&players[1].0, cleared[1]),
        ];
        view.render_into(&pool, &fields, Viewport::new(w, h), &mut fb);
        term.draw(&fb)?;

        // Input with timeout until next tick. Every controller sees the full
        // stream and picks out its own layout's keys.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if should_quit(key) {
                            return Ok(());
                        }
                        for (_, controller) in players.iter_mut() {
                            controller.handle_key(key);
                        }
                    }
                    KeyEventKind::Release => {
                        for (_, controller) in players.iter_mut() {
                            controller.handle_release(key);
                        }
                    }
                }
            }
        }

        // Tick both fields with the same step so they stay in lockstep.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            let dt = TICK_MS as f32 / 1000.0;

            for (i, (instance, controller)) in players.iter_mut().enumerate() {
                let outcome = instance.update(&mut pool, controller, dt)?;
                cleared[i] += outcome.pieces_cleared;
                controller.end_frame();
            }
        }
    }
}
