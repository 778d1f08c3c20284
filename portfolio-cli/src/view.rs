use crate::commands::{BANNER, WELCOME};
use crate::history::HistoryEntry;
use crate::snake::{Pos, Snake};

pub(crate) const TITLE: &str = "karan@portfolio:~";
pub(crate) const PROMPT: &str = "dev@karan ~ $";

pub(crate) const HEAD: char = '@';
pub(crate) const BODY: char = 'o';
pub(crate) const FOOD: char = '*';
pub(crate) const EMPTY: char = '.';

/// Everything the presentation layer needs to paint one terminal window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) title: String,
    pub(crate) lines: Vec<String>,
    /// Column of the input caret on the last line, when the prompt is live.
    pub(crate) cursor: Option<usize>,
}

pub(crate) fn banner() -> Vec<String> {
    let mut out: Vec<String> = BANNER.iter().map(|l| l.to_string()).collect();
    out.push(String::new());
    out.extend(WELCOME.iter().map(|l| l.to_string()));
    out.push(String::new());
    out
}

pub(crate) fn scrollback_lines(entries: &[HistoryEntry]) -> Vec<String> {
    let mut out = Vec::new();
    for e in entries {
        out.push(format!("{PROMPT} {}", e.command));
        out.extend(e.output.iter().cloned());
        out.push(String::new());
    }
    out
}

pub(crate) fn prompt_line(input: &str) -> String {
    format!("{PROMPT} {input}")
}

pub(crate) fn snake_lines(s: &Snake) -> Vec<String> {
    let board = s.board();
    let w = board.width.max(0) as usize;
    let mut rows = vec![vec![EMPTY; w]; board.height.max(0) as usize];

    let mut put = |p: Pos, ch: char| {
        if board.contains(p) {
            rows[p.y as usize][p.x as usize] = ch;
        }
    };
    if let Some(f) = s.food() {
        put(f, FOOD);
    }
    for (i, p) in s.segments().enumerate() {
        put(p, if i == 0 { HEAD } else { BODY });
    }

    let border = format!("+{}+", "-".repeat(w));
    let mut out = Vec::with_capacity(rows.len() + 5);
    out.push(format!("SNAKE  Score: {}  Length: {}", s.score(), s.len()));
    out.push(border.clone());
    for row in rows {
        out.push(format!("|{}|", row.into_iter().collect::<String>()));
    }
    out.push(border);
    if s.is_over() {
        if s.food().is_none() {
            out.push(format!("BOARD CLEARED! Score: {}", s.score()));
        } else {
            out.push(format!("GAME OVER! Score: {}", s.score()));
        }
        out.push("Enter to restart, Q to quit".to_string());
    } else {
        out.push("Arrows/WASD steer, Q or Esc to quit".to_string());
    }
    out
}

/// Banner, scrollback, then either the live game or the input prompt.
pub(crate) fn compose(entries: &[HistoryEntry], game: Option<&Snake>, input: &str) -> Frame {
    let mut lines = banner();
    lines.extend(scrollback_lines(entries));
    let cursor = match game {
        Some(s) => {
            lines.extend(snake_lines(s));
            None
        }
        None => {
            let prompt = prompt_line(input);
            let col = prompt.chars().count();
            lines.push(prompt);
            Some(col)
        }
    };
    Frame {
        title: TITLE.to_string(),
        lines,
        cursor,
    }
}
