use crate::commands::CommandRegistry;
use crate::config::Settings;
use crate::input::{collect_input_nonblocking, HostAction};
use crate::render::{draw_page, Screen};
use crate::session::{Navigator, SessionOptions, Terminal};
use std::time::{Duration, Instant};

/// Stands in for the site's router: remembers the page the terminal sent us to.
#[derive(Debug)]
pub(crate) struct PageRouter {
    route: &'static str,
    visits: usize,
}

impl Default for PageRouter {
    fn default() -> Self {
        Self {
            route: "/",
            visits: 0,
        }
    }
}

impl PageRouter {
    pub(crate) fn route(&self) -> &'static str {
        self.route
    }
}

impl Navigator for PageRouter {
    fn navigate(&mut self, path: &'static str) {
        self.visits += 1;
        tracing::info!(from = self.route, to = path, visits = self.visits, "route change");
        self.route = path;
    }
}

struct App<'r> {
    term: Terminal<'r, PageRouter>,
    screen: Screen,
    frame_dt: Duration,
    should_quit: bool,
}

impl<'r> App<'r> {
    fn init(registry: &'r CommandRegistry, settings: &Settings, opts: SessionOptions) -> anyhow::Result<Self> {
        let mut term = Terminal::new(registry, PageRouter::default(), opts);
        if settings.start_open {
            term.open();
        }
        let fps = settings.fps_cap.clamp(10, 240);
        let screen = Screen::begin()?;
        Ok(Self {
            term,
            screen,
            frame_dt: Duration::from_secs_f32(1.0 / fps as f32),
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let mut dirty = true;

        while !self.should_quit {
            let frame_start = Instant::now();
            if self.screen.resize_if_needed()? {
                dirty = true;
            }

            for action in collect_input_nonblocking(self.frame_dt)? {
                match action {
                    HostAction::Quit => {
                        self.should_quit = true;
                        break;
                    }
                    HostAction::Key(key) => {
                        self.term.handle_key(key, Instant::now());
                        dirty = true;
                    }
                    HostAction::Redraw => dirty = true,
                }
            }
            if self.should_quit {
                break;
            }

            if self.term.tick(Instant::now()) {
                dirty = true;
            }

            if dirty {
                self.render_frame()?;
                dirty = false;
            }

            spin_sleep(self.frame_dt, frame_start);
        }
        tracing::info!(
            route = self.term.navigator().route(),
            commands_run = self.term.recall().len(),
            live_timers = self.term.scheduler().live(),
            "exiting"
        );
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let frame = self.term.frame();
        draw_page(
            &mut self.screen.cur,
            self.term.navigator().route(),
            self.term.window(),
            &frame,
        );
        self.screen.present()
    }
}

pub(crate) fn run(settings: &Settings, opts: SessionOptions) -> anyhow::Result<()> {
    let registry = CommandRegistry::portfolio();
    tracing::info!(
        commands = registry.entries().len(),
        aliases = registry.aliases().len(),
        board_w = opts.board.width,
        board_h = opts.board.height,
        tick_ms = opts.tick.as_millis() as u64,
        seed = opts.seed,
        "starting"
    );
    let mut app = App::init(&registry, settings, opts)?;
    app.run()
}

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_starts_home_and_follows_navigation() {
        let mut r = PageRouter::default();
        assert_eq!(r.route(), "/");
        r.navigate("/resume");
        r.navigate("/projects");
        assert_eq!(r.route(), "/projects");
        assert_eq!(r.visits, 2);
    }

    #[test]
    fn terminal_drives_the_router() {
        let reg = CommandRegistry::portfolio();
        let mut t = Terminal::new(&reg, PageRouter::default(), SessionOptions::default());
        t.open();
        let now = Instant::now();
        for ch in "open academy".chars() {
            t.handle_key(crate::session::Key::Char(ch), now);
        }
        t.handle_key(crate::session::Key::Enter, now);
        assert_eq!(t.navigator().route(), "/private-academy");
        assert!(t.window().open);
    }
}
