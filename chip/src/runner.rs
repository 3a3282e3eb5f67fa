use std::time::{Duration, Instant};

use crate::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    devices::DisplayCommands,
    opcode::Operation,
    timer::{TimedWorker, Worker},
    ConfigError, ProcessError,
};

/// The speeds the machine runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// instructions per second
    pub rate: u32,
    /// timer decrements per second
    pub timer_rate: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate: cpu::HERTZ,
            timer_rate: timer::HERZ,
        }
    }
}

impl Config {
    /// Will create a config with the given instruction rate, the timers always run at
    /// 60 hertz.
    pub fn new(rate: u32) -> Result<Self, ConfigError> {
        if rate == 0 {
            return Err(ConfigError::InvalidRate);
        }
        Ok(Self {
            rate,
            ..Self::default()
        })
    }

    /// The time between two instructions.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.rate.max(1)
    }

    /// The time between two timer decrements.
    pub fn timer_interval(&self) -> Duration {
        Duration::from_secs(1) / (self.timer_rate.max(1) as u32)
    }
}

/// Paces calls by the wall clock. A call that comes too early is skipped, missed slots are
/// never caught up on.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true and records `now` if at least one interval has passed since the
    /// last accepted call.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// How long until the next call would be accepted.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.last
            .map(|last| self.interval.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or_default()
    }
}

/// Drives a [`ChipSet`]: instructions are stepped through [`Runner::poll`] by the caller's
/// loop, the timers are decremented on their own thread.
pub struct Runner<W = Worker>
where
    W: TimedWorker,
{
    chip: ChipSet,
    pacer: Pacer,
    timer_worker: W,
}

impl<W> Runner<W>
where
    W: TimedWorker,
{
    /// Will take over the chip and start counting its timers down.
    pub fn new(chip: ChipSet, config: Config) -> Self {
        let timers = chip.timers();
        let mut timer_worker = W::new();
        timer_worker.start(move || timers.tick(), config.timer_interval());

        log::info!(
            "Running at {} instructions per second, timers at {} hertz",
            config.rate,
            config.timer_rate
        );

        Self {
            chip,
            pacer: Pacer::new(config.interval()),
            timer_worker,
        }
    }

    /// Runs at most a single instruction, if its slot has come.
    ///
    /// Returns `Ok(None)` when it was too early. Invalid opcodes are logged and skipped,
    /// every other error is returned.
    pub fn poll(&mut self, now: Instant) -> Result<Option<Operation>, ProcessError> {
        if !self.pacer.ready(now) {
            return Ok(None);
        }

        match self.chip.step() {
            Ok(operation) => Ok(Some(operation)),
            Err(ProcessError::Opcode(err)) => {
                log::warn!(
                    "{} skipping to {:#05X}",
                    err,
                    self.chip.program_counter()
                );
                Ok(Some(Operation::None))
            }
            Err(err) => {
                log::error!("{}", err);
                Err(err)
            }
        }
    }

    /// Hands the screen to the renderer if the operation changed it.
    pub fn render<D>(&self, operation: Operation, display: &mut D)
    where
        D: DisplayCommands,
    {
        if matches!(operation, Operation::Draw) {
            let display_handle = self.chip.display();
            let screen = display_handle.read();
            display.display(&screen);
        }
    }

    /// Will reset the renderer and draw the current screen.
    pub fn attach<D>(&self, display: &mut D)
    where
        D: DisplayCommands,
    {
        display.clear_display();
        self.render(Operation::Draw, display);
    }

    /// How long the caller may sleep before the next instruction is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        self.pacer.remaining(now)
    }

    pub fn is_sound_active(&self) -> bool {
        self.chip.timers().is_sound_active()
    }

    pub fn timers_running(&self) -> bool {
        self.timer_worker.is_alive()
    }

    pub fn chip(&self) -> &ChipSet {
        &self.chip
    }

    /// Stops the timers and returns the chip.
    pub fn into_chip(mut self) -> ChipSet {
        self.timer_worker.stop();
        self.chip
    }
}
