use crate::commands::CommandRegistry;
use crate::dispatch::{dispatch, DispatchCtx, Effect};
use crate::history::{InputRecall, Scrollback};
use crate::snake::{Board, Direction, Snake, SnakeRunner};
use crate::ticker::TickScheduler;
use crate::view::{self, Frame};
use chrono::{DateTime, Local};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Where the site routes `resume`, `open <page>` and friends.
pub(crate) trait Navigator {
    fn navigate(&mut self, path: &'static str);
}

/// Keys the terminal understands, already decoded from the host's events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Key {
    Char(char),
    Backspace,
    Enter,
    Up,
    Down,
    Left,
    Right,
    Esc,
    /// Global open/close chord.
    Chord,
    Minimize,
    Fullscreen,
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Away,
    Prompt,
    Game,
}

/// Window flags. Minimizing keeps `open` set; the window stays mounted but hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct WindowState {
    pub(crate) open: bool,
    pub(crate) minimized: bool,
    pub(crate) fullscreen: bool,
}

impl WindowState {
    pub(crate) fn open(&mut self) {
        self.open = true;
        self.minimized = false;
    }

    pub(crate) fn close(&mut self) {
        *self = WindowState::default();
    }

    pub(crate) fn minimize(&mut self) -> bool {
        if !self.open || self.minimized {
            return false;
        }
        self.minimized = true;
        true
    }

    pub(crate) fn restore(&mut self) -> bool {
        if !self.open || !self.minimized {
            return false;
        }
        self.minimized = false;
        true
    }

    pub(crate) fn toggle_fullscreen(&mut self) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.fullscreen = !self.fullscreen;
        true
    }

    pub(crate) fn is_interactive(&self) -> bool {
        self.open && !self.minimized
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionOptions {
    pub(crate) board: Board,
    pub(crate) tick: Duration,
    pub(crate) seed: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            board: Board::DEFAULT,
            tick: Duration::from_millis(150),
            seed: 0xC0FFEE_u64,
        }
    }
}

/// The terminal overlay: window state, prompt, scrollback and the snake game.
///
/// Keystrokes go to the prompt or to the game depending on `focus()`. Closing
/// the window or dropping the terminal tears the game down with its timer.
pub(crate) struct Terminal<'r, N: Navigator> {
    registry: &'r CommandRegistry,
    navigator: N,
    window: WindowState,
    input: String,
    scrollback: Scrollback,
    recall: InputRecall,
    snake: Option<SnakeRunner>,
    scheduler: TickScheduler,
    rng: StdRng,
    clock: fn() -> DateTime<Local>,
    opts: SessionOptions,
}

impl<'r, N: Navigator> Terminal<'r, N> {
    pub(crate) fn new(registry: &'r CommandRegistry, navigator: N, opts: SessionOptions) -> Self {
        Self {
            registry,
            navigator,
            window: WindowState::default(),
            input: String::new(),
            scrollback: Scrollback::default(),
            recall: InputRecall::default(),
            snake: None,
            scheduler: TickScheduler::new(),
            rng: StdRng::seed_from_u64(opts.seed),
            clock: Local::now,
            opts,
        }
    }

    pub(crate) fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn window(&self) -> WindowState {
        self.window
    }

    #[cfg(test)]
    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub(crate) fn recall(&self) -> &InputRecall {
        &self.recall
    }

    pub(crate) fn snake(&self) -> Option<&Snake> {
        self.snake.as_ref().map(SnakeRunner::snake)
    }

    pub(crate) fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub(crate) fn navigator(&self) -> &N {
        &self.navigator
    }

    pub(crate) fn focus(&self) -> Focus {
        if !self.window.is_interactive() {
            Focus::Away
        } else if self.snake.is_some() {
            Focus::Game
        } else {
            Focus::Prompt
        }
    }

    pub(crate) fn open(&mut self) {
        self.window.open();
        tracing::debug!("terminal opened");
    }

    pub(crate) fn close(&mut self) {
        self.window.close();
        self.recall.reset();
        if self.snake.take().is_some() {
            tracing::info!("snake discarded on close");
        }
        tracing::debug!("terminal closed");
    }

    pub(crate) fn minimize(&mut self) {
        if self.window.minimize() {
            tracing::debug!("terminal minimized");
        }
    }

    pub(crate) fn restore(&mut self) {
        if self.window.restore() {
            tracing::debug!(fullscreen = self.window.fullscreen, "terminal restored");
        }
    }

    pub(crate) fn toggle_fullscreen(&mut self) {
        if self.window.toggle_fullscreen() {
            tracing::debug!(fullscreen = self.window.fullscreen, "fullscreen toggled");
        }
    }

    /// Global chord: opens when closed, restores when minimized, otherwise closes.
    pub(crate) fn toggle(&mut self) {
        if !self.window.open {
            self.open();
        } else if self.window.minimized {
            self.restore();
        } else {
            self.close();
        }
    }

    pub(crate) fn handle_key(&mut self, key: Key, now: Instant) {
        match key {
            Key::Chord => return self.toggle(),
            Key::Close if self.window.open => return self.close(),
            Key::Minimize => return self.minimize(),
            Key::Fullscreen => return self.toggle_fullscreen(),
            _ => {}
        }
        match self.focus() {
            Focus::Away => {}
            Focus::Game => self.game_key(key, now),
            Focus::Prompt => self.prompt_key(key, now),
        }
    }

    fn prompt_key(&mut self, key: Key, now: Instant) {
        match key {
            Key::Char(ch) if !ch.is_control() => self.input.push(ch),
            Key::Backspace => {
                self.input.pop();
            }
            Key::Enter => self.submit(now),
            Key::Up => {
                if let Some(cmd) = self.recall.up() {
                    self.input = cmd.to_string();
                }
            }
            Key::Down => match self.recall.down() {
                Some(cmd) => self.input = cmd.to_string(),
                None => self.input.clear(),
            },
            _ => {}
        }
    }

    fn game_key(&mut self, key: Key, now: Instant) {
        match key {
            Key::Esc | Key::Char('q') | Key::Char('Q') => self.quit_game(),
            Key::Enter => {
                if let Some(game) = self.snake.as_mut() {
                    game.restart(now);
                }
            }
            _ => {
                if let (Some(dir), Some(game)) = (steer_dir(key), self.snake.as_mut()) {
                    game.steer(dir);
                }
            }
        }
    }

    pub(crate) fn quit_game(&mut self) {
        if let Some(game) = self.snake.take() {
            tracing::info!(score = game.snake().score(), running = game.is_running(), "snake quit");
        }
    }

    /// Runs whatever is on the prompt. Blank input leaves every log untouched.
    pub(crate) fn submit(&mut self, now: Instant) {
        let raw = std::mem::take(&mut self.input);
        let mut ctx = DispatchCtx {
            rng: &mut self.rng,
            now: (self.clock)(),
        };
        let Some(outcome) = dispatch(self.registry, &raw, &mut ctx) else {
            self.recall.reset();
            return;
        };
        self.recall.push(raw.trim());

        if let Some(entry) = outcome.entry {
            self.scrollback.push(entry);
        }
        match outcome.effect {
            Effect::None => {}
            Effect::Clear => {
                if !self.scrollback.is_empty() {
                    tracing::debug!(dropped = self.scrollback.len(), "scrollback cleared");
                }
                self.scrollback.clear();
            }
            Effect::LaunchSnake => self.launch_snake(now),
            Effect::Navigate(path) => {
                tracing::info!(path, "navigate");
                self.navigator.navigate(path);
            }
        }
    }

    fn launch_snake(&mut self, now: Instant) {
        let seed: u64 = self.rng.gen();
        self.snake = Some(SnakeRunner::start(
            self.opts.board,
            self.opts.tick,
            seed,
            &self.scheduler,
            now,
        ));
    }

    /// Delivers a due game tick. Returns true when the game moved.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        if !self.window.is_interactive() {
            return false;
        }
        self.snake
            .as_mut()
            .and_then(|g| g.tick(now))
            .is_some()
    }

    pub(crate) fn frame(&self) -> Frame {
        view::compose(self.scrollback.entries(), self.snake(), &self.input)
    }
}

fn steer_dir(key: Key) -> Option<Direction> {
    match key {
        Key::Up | Key::Char('w') | Key::Char('W') => Some(Direction::Up),
        Key::Down | Key::Char('s') | Key::Char('S') => Some(Direction::Down),
        Key::Left | Key::Char('a') | Key::Char('A') => Some(Direction::Left),
        Key::Right | Key::Char('d') | Key::Char('D') => Some(Direction::Right),
        _ => None,
    }
}
