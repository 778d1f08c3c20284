use crate::commands::{self, Action, CommandRegistry, Dynamic};
use crate::history::HistoryEntry;
use chrono::{DateTime, Local};
use rand::rngs::StdRng;

/// Side effect the session applies after a command ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    None,
    Clear,
    LaunchSnake,
    Navigate(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) entry: Option<HistoryEntry>,
    pub(crate) effect: Effect,
}

impl Outcome {
    fn print(command: &str, lines: Vec<String>) -> Self {
        Self {
            entry: Some(HistoryEntry::new(command, lines)),
            effect: Effect::None,
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

pub(crate) struct DispatchCtx<'a> {
    pub(crate) rng: &'a mut StdRng,
    pub(crate) now: DateTime<Local>,
}

/// Runs one line of input. Blank input yields `None`.
///
/// `clear` is the only command that produces no history entry.
pub(crate) fn dispatch(registry: &CommandRegistry, raw: &str, ctx: &mut DispatchCtx<'_>) -> Option<Outcome> {
    let command = raw.trim();
    if command.is_empty() {
        return None;
    }
    let key = command.to_lowercase();

    if let Some(spec) = registry.get(&key) {
        tracing::debug!(command, name = spec.name, "dispatch");
        let out = match &spec.action {
            Action::Static(lines) => Outcome::print(command, owned(lines)),
            Action::Help => Outcome::print(command, registry.help_lines().to_vec()),
            Action::Navigate { path, lines } => Outcome::print(command, owned(lines)).with(Effect::Navigate(*path)),
            Action::Dynamic(d) => Outcome::print(command, run_dynamic(*d, ctx)),
            Action::Clear => Outcome {
                entry: None,
                effect: Effect::Clear,
            },
            Action::Snake => Outcome::print(command, owned(commands::SNAKE_STARTED)).with(Effect::LaunchSnake),
        };
        return Some(out);
    }

    if let Some(text) = echo_text(command) {
        tracing::debug!(command, "dispatch echo");
        return Some(Outcome::print(command, vec![text.to_string()]));
    }

    if let Some(out) = open_page(command, &key) {
        tracing::debug!(command, "dispatch open");
        return Some(out);
    }

    tracing::debug!(command, "command not found");
    Some(Outcome::print(
        command,
        vec![
            format!("Command not found: {command}"),
            "Type 'help' to see available commands.".to_string(),
        ],
    ))
}

fn run_dynamic(d: Dynamic, ctx: &mut DispatchCtx<'_>) -> Vec<String> {
    match d {
        Dynamic::Matrix => commands::matrix(&mut *ctx.rng),
        Dynamic::Joke => vec![commands::joke(&mut *ctx.rng)],
        Dynamic::Date => vec![commands::date(ctx.now)],
    }
}

/// `echo` alone prints an empty line; `echo <text>` prints text as typed.
fn echo_text(command: &str) -> Option<&str> {
    if command.eq_ignore_ascii_case("echo") {
        return Some("");
    }
    let head = command.get(..5)?;
    if head.eq_ignore_ascii_case("echo ") {
        command.get(5..)
    } else {
        None
    }
}

fn open_page(command: &str, key: &str) -> Option<Outcome> {
    let mut words = key.split_whitespace();
    if words.next() != Some("open") {
        return None;
    }
    let page = words.next()?;
    if words.next().is_some() {
        return None;
    }
    let path = commands::page_path(page)?;
    let lines = match page {
        "resume" => owned(commands::RESUME),
        "projects" => owned(commands::OPEN_PROJECTS),
        _ => vec![format!("Navigating to {path}...")],
    };
    Some(Outcome::print(command, lines).with(Effect::Navigate(path)))
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}
