use std::time::Instant;

use chip::{
    definitions::{display, keyboard},
    devices::{keymap, DisplayCommands, Keypad},
    display::Framebuffer,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders,
    },
    Frame,
};

use crate::definitions::{self, field};

/// Keeps the last screen the machine handed over, until the terminal gets redrawn.
pub(crate) struct DisplayAdapter {
    screen: Framebuffer,
    dirty: bool,
}

impl DisplayAdapter {
    pub fn new() -> Self {
        Self {
            screen: Framebuffer::new(),
            dirty: true,
        }
    }

    /// Returns if the screen changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// The lit pixels in canvas coordinates, the canvas origin is bottom left.
    fn points(&self) -> Vec<(f64, f64)> {
        self.screen
            .rows()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, on)| **on)
                    .map(move |(x, _)| (x as f64, (display::HEIGHT - 1 - y) as f64))
            })
            .collect()
    }

    pub fn draw<B>(&self, frame: &mut Frame<B>, area: Rect)
    where
        B: Backend,
    {
        let points = self.points();
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(field::TITLE)
                    .borders(Borders::ALL)
                    .style(Style::default().bg(Color::Black)),
            )
            .x_bounds([0.0, (display::WIDTH - 1) as f64])
            .y_bounds([0.0, (display::HEIGHT - 1) as f64])
            .marker(Marker::Block)
            .paint(|ctx| {
                ctx.draw(&Points {
                    coords: &points,
                    color: Color::White,
                });
            });
        frame.render_widget(canvas, area);
    }
}

impl DisplayCommands for DisplayAdapter {
    fn clear_display(&mut self) {
        log::debug!("Clearing the display");
        self.screen.clear();
        self.dirty = true;
    }

    fn display(&mut self, pixels: &Framebuffer) {
        self.screen = pixels.clone();
        self.dirty = true;
    }
}

/// What the front-end has to do with a terminal event.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Input {
    Quit,
    Key(u8),
    Ignored,
}

/// Turns terminal key presses into presses and later releases of the hex keyboard.
pub(crate) struct KeyboardAdapter {
    keypad: Keypad,
    /// when each held key is let go again
    held: [Option<Instant>; keyboard::SIZE],
}

impl KeyboardAdapter {
    pub fn new(keypad: Keypad) -> Self {
        Self {
            keypad,
            held: [None; keyboard::SIZE],
        }
    }

    pub fn handle(&mut self, event: KeyEvent, now: Instant) -> Input {
        if event.kind == KeyEventKind::Release {
            return Input::Ignored;
        }

        match event.code {
            KeyCode::Esc => Input::Quit,
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Input::Quit,
            KeyCode::Char(c) => match keymap::map(c) {
                Some(key) => {
                    self.press(key, now);
                    Input::Key(key)
                }
                None => {
                    log::debug!("Unable to map '{}' to a key", c);
                    Input::Ignored
                }
            },
            _ => Input::Ignored,
        }
    }

    /// A repeated press keeps the key down longer.
    fn press(&mut self, key: u8, now: Instant) {
        if let Some(until) = self.held.get_mut(key as usize) {
            if until.is_none() {
                self.keypad.key_down(key);
            }
            *until = Some(now + definitions::KEY_HOLD);
        }
    }

    /// Lets go of every key whose hold time is over.
    pub fn release_due(&mut self, now: Instant) {
        for (key, until) in (0u8..).zip(self.held.iter_mut()) {
            if matches!(until, Some(time) if *time <= now) {
                *until = None;
                self.keypad.key_up(key);
            }
        }
    }
}
