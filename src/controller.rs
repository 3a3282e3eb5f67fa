use std::{
    io::{self, Stdout},
    time::Instant,
};

use anyhow::Context;
use chip::{chip8::ChipSet, Runner};
use crossterm::{
    cursor,
    event::{self, Event},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    widgets::Paragraph,
    Terminal,
};

use crate::{
    adapters::{DisplayAdapter, Input, KeyboardAdapter},
    definitions::{self, field},
};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Runs `undo` exactly once, either through [`Restore::run`] or on drop.
struct Restore<F>
where
    F: FnMut() -> io::Result<()>,
{
    undo: Option<F>,
}

impl<F> Restore<F>
where
    F: FnMut() -> io::Result<()>,
{
    fn new(undo: F) -> Self {
        Self { undo: Some(undo) }
    }

    fn run(&mut self) -> io::Result<()> {
        match self.undo.take() {
            Some(mut undo) => undo(),
            None => Ok(()),
        }
    }
}

impl<F> Drop for Restore<F>
where
    F: FnMut() -> io::Result<()>,
{
    fn drop(&mut self) {
        if let Err(err) = self.run() {
            log::error!("Unable to restore the terminal: {}", err);
        }
    }
}

fn restore_terminal() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
}

/// Owns the terminal for as long as it lives, the terminal is restored on drop.
struct Screen {
    terminal: Term,
    restore: Restore<fn() -> io::Result<()>>,
}

impl Screen {
    fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("Unable to switch the terminal into raw mode")?;
        // from here on every early return gives the terminal back
        let restore = Restore::new(restore_terminal as fn() -> io::Result<()>);

        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal, restore })
    }

    fn restore(&mut self) -> anyhow::Result<()> {
        self.restore.run()?;
        Ok(())
    }
}

pub(crate) struct Controller {
    screen: Screen,
    runner: Runner,
    display: DisplayAdapter,
    keyboard: KeyboardAdapter,
    beeping: bool,
}

impl Controller {
    pub fn new(runner: Runner) -> anyhow::Result<Self> {
        let mut display = DisplayAdapter::new();
        runner.attach(&mut display);
        let keyboard = KeyboardAdapter::new(runner.chip().keypad());

        Ok(Self {
            screen: Screen::new()?,
            runner,
            display,
            keyboard,
            beeping: false,
        })
    }

    /// Runs the machine until the user quits or the program fails.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let now = Instant::now();
            self.keyboard.release_due(now);

            if let Some(operation) = self.runner.poll(now)? {
                self.runner.render(operation, &mut self.display);
            }

            let beeping = self.runner.is_sound_active();
            if self.display.take_dirty() || beeping != self.beeping {
                self.beeping = beeping;
                self.draw()?;
            }

            let timeout = self
                .runner
                .until_next(Instant::now())
                .min(definitions::MAX_IDLE);
            if event::poll(timeout)? && self.handle_events()? == Input::Quit {
                log::info!("Quit by user");
                return Ok(());
            }
        }
    }

    /// Works through every pending terminal event.
    fn handle_events(&mut self) -> anyhow::Result<Input> {
        loop {
            if let Event::Key(key) = event::read()? {
                match self.keyboard.handle(key, Instant::now()) {
                    Input::Quit => return Ok(Input::Quit),
                    Input::Key(hex) => log::trace!("Pressed key {:#X}", hex),
                    Input::Ignored => {}
                }
            }
            if !event::poll(std::time::Duration::ZERO)? {
                return Ok(Input::Ignored);
            }
        }
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        let display = &self.display;
        let status = format!(
            " {} | {}",
            if self.beeping { field::BELL } else { field::QUIET },
            field::HELP
        );

        self.screen.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
                .split(f.size());
            display.draw(f, chunks[0]);
            f.render_widget(Paragraph::new(status), chunks[1]);
        })?;
        Ok(())
    }

    /// Gives the terminal back and returns the stopped machine.
    pub fn shutdown(mut self) -> anyhow::Result<ChipSet> {
        self.screen.restore()?;
        let Self { runner, .. } = self;
        Ok(runner.into_chip())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    fn counting(calls: &Rc<Cell<u32>>) -> impl FnMut() -> io::Result<()> {
        let calls = calls.clone();
        move || {
            calls.set(calls.get() + 1);
            Ok(())
        }
    }

    /// fails after the terminal was already changed
    fn failing_setup(calls: &Rc<Cell<u32>>) -> io::Result<()> {
        let _restore = Restore::new(counting(calls));
        let enter: io::Result<()> = Err(io::Error::new(io::ErrorKind::Other, "no terminal"));
        enter?;
        Ok(())
    }

    #[test]
    fn test_restore_on_early_return() {
        let calls = Rc::new(Cell::new(0));
        assert!(failing_setup(&calls).is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_restore_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let mut restore = Restore::new(counting(&calls));
        assert!(restore.run().is_ok());
        assert!(restore.run().is_ok());
        drop(restore);
        assert_eq!(calls.get(), 1);
    }
}
