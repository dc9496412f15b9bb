//! GameView: maps play field state into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{Instance, InstanceState, PuyoPool};
use crate::fb::{Cell, FrameBuffer, Rgb};
use crate::types::{PuyoColor, GRID_HEIGHT, GRID_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Width of one player's panel in terminal columns: the framed field plus a
/// queue strip. Cells are two columns wide to compensate for glyph aspect.
const CELL_W: u16 = 2;
const FRAME_W: u16 = GRID_WIDTH as u16 * CELL_W + 2;
const FRAME_H: u16 = GRID_HEIGHT as u16 + 2;
const QUEUE_STRIP_W: u16 = 4 * CELL_W;
const PANEL_W: u16 = FRAME_W + QUEUE_STRIP_W + 2;

/// A lightweight terminal view over one or more play fields.
pub struct GameView;

impl GameView {
    pub fn new() -> Self {
        Self
    }

    /// Render every play field side by side into an existing framebuffer.
    /// Each entry pairs an instance with its running cleared-piece tally.
    ///
    /// Allocation-free hot path; callers reuse the framebuffer across frames.
    pub fn render_into(
        &self,
        pool: &PuyoPool,
        fields: &[(&Instance, u32)],
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let total_w = PANEL_W * fields.len() as u16;
        let left = viewport.width.saturating_sub(total_w) / 2;
        let top = viewport.height.saturating_sub(FRAME_H + 1) / 2;

        for (i, &(instance, cleared)) in fields.iter().enumerate() {
            let origin_x = left + i as u16 * PANEL_W;
            self.render_field(pool, instance, origin_x, top, fb);
            self.render_status(instance, i, cleared, origin_x, top, fb);
        }
    }

    fn render_field(
        &self,
        pool: &PuyoPool,
        instance: &Instance,
        origin_x: u16,
        origin_y: u16,
        fb: &mut FrameBuffer,
    ) {
        draw_border(fb, origin_x, origin_y);

        // Settled pieces, straight from grid occupancy.
        let grid = instance.grid();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                if let Some(handle) = grid.piece_at(x, y) {
                    let color = pool.get(handle).color;
                    draw_piece(fb, origin_x, origin_y, x as f32, y as f32, color);
                }
            }
        }

        // Pieces mid-fall, at their continuous heights.
        for &handle in instance.falling_pieces() {
            let p = pool.get(handle);
            draw_piece(fb, origin_x, origin_y, p.x, p.y, p.color);
        }

        // The pair under player control.
        if let Some(unit) = instance.active_unit() {
            for i in 0..2 {
                let (x, y) = unit.position(i);
                let color = pool.get(unit.puyo(i)).color;
                draw_piece(fb, origin_x, origin_y, x, y, color);
            }
        }

        // Upcoming pairs, laid out by the queue to the right of the field.
        for unit in instance.queue().future_units() {
            for i in 0..2 {
                let (x, y) = unit.position(i);
                let color = pool.get(unit.puyo(i)).color;
                draw_piece(fb, origin_x, origin_y, x, y, color);
            }
        }

        match instance.state() {
            InstanceState::Paused => draw_overlay(fb, origin_x, origin_y, "PAUSED"),
            InstanceState::GameOver => draw_overlay(fb, origin_x, origin_y, "GAME OVER"),
            _ => {}
        }
    }

    fn render_status(
        &self,
        instance: &Instance,
        index: usize,
        cleared: u32,
        origin_x: u16,
        origin_y: u16,
        fb: &mut FrameBuffer,
    ) {
        let state = match instance.state() {
            InstanceState::PlayerControl | InstanceState::Resolving => "playing",
            InstanceState::Paused => "paused",
            InstanceState::GameOver => "game over",
        };
        let label = format!("P{}  {}  cleared {}", index + 1, state, cleared);
        fb.put_str(
            origin_x,
            origin_y + FRAME_H,
            &label,
            Rgb::new(180, 180, 180),
            Rgb::new(0, 0, 0),
        );
    }
}

impl Default for GameView {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen position of a field cell, if it lies inside the frame. The field's
/// y axis points up, the terminal's down.
fn cell_origin(origin_x: u16, origin_y: u16, x: f32, y: f32) -> Option<(u16, u16)> {
    let gx = x.floor() as i32;
    let gy = y.floor() as i32;
    if gx < 0 || gy < 0 || gy >= GRID_HEIGHT {
        return None;
    }
    let sx = origin_x + 1 + gx as u16 * CELL_W;
    let sy = origin_y + 1 + (GRID_HEIGHT - 1 - gy) as u16;
    Some((sx, sy))
}

fn draw_piece(fb: &mut FrameBuffer, origin_x: u16, origin_y: u16, x: f32, y: f32, color: PuyoColor) {
    if let Some((sx, sy)) = cell_origin(origin_x, origin_y, x, y) {
        let fg = color_rgb(color);
        let bg = Rgb::new(20, 20, 28);
        fb.set(sx, sy, Cell::new('(', fg, bg));
        fb.set(sx + 1, sy, Cell::new(')', fg, bg));
    }
}

fn draw_border(fb: &mut FrameBuffer, origin_x: u16, origin_y: u16) {
    let fg = Rgb::new(200, 200, 200);
    let bg = Rgb::new(0, 0, 0);
    let right = origin_x + FRAME_W - 1;
    let bottom = origin_y + FRAME_H - 1;

    for x in origin_x..=right {
        fb.set(x, origin_y, Cell::new('─', fg, bg));
        fb.set(x, bottom, Cell::new('─', fg, bg));
    }
    for y in origin_y..=bottom {
        fb.set(origin_x, y, Cell::new('│', fg, bg));
        fb.set(right, y, Cell::new('│', fg, bg));
    }
    fb.set(origin_x, origin_y, Cell::new('┌', fg, bg));
    fb.set(right, origin_y, Cell::new('┐', fg, bg));
    fb.set(origin_x, bottom, Cell::new('└', fg, bg));
    fb.set(right, bottom, Cell::new('┘', fg, bg));

    // Field interior background.
    let interior = Cell::new(' ', fg, Rgb::new(20, 20, 28));
    fb.fill_rect(
        origin_x + 1,
        origin_y + 1,
        FRAME_W - 2,
        FRAME_H - 2,
        interior,
    );
}

fn draw_overlay(fb: &mut FrameBuffer, origin_x: u16, origin_y: u16, text: &str) {
    let x = origin_x + (FRAME_W.saturating_sub(text.len() as u16)) / 2;
    let y = origin_y + FRAME_H / 2;
    fb.put_str(x, y, text, Rgb::new(255, 255, 255), Rgb::new(120, 20, 20));
}

fn color_rgb(color: PuyoColor) -> Rgb {
    match color {
        PuyoColor::Red => Rgb::new(225, 70, 70),
        PuyoColor::Green => Rgb::new(80, 200, 90),
        PuyoColor::Blue => Rgb::new(80, 130, 235),
        PuyoColor::Yellow => Rgb::new(230, 205, 70),
        PuyoColor::Purple => Rgb::new(175, 90, 220),
        PuyoColor::Clear => Rgb::new(210, 210, 210),
    }
}
