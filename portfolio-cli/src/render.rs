use crate::commands::BANNER;
use crate::session::WindowState;
use crate::view::{Frame, PROMPT};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

const PAGE_BG: Color = Color::Rgb { r: 8, g: 10, b: 14 };
const WIN_BG: Color = Color::Rgb { r: 15, g: 15, b: 15 };
const BAR_BG: Color = Color::Rgb { r: 31, g: 31, b: 31 };
const TEXT: Color = Color::Rgb { r: 178, g: 178, b: 178 };
const BRIGHT: Color = Color::Rgb { r: 242, g: 242, b: 242 };
const DIM: Color = Color::Rgb { r: 128, g: 128, b: 128 };
const CYAN: Color = Color::Rgb { r: 0, g: 255, b: 234 };
const GREEN: Color = Color::Rgb { r: 70, g: 220, b: 120 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn fill(&mut self, r: Rect, bg: Color) {
        for y in r.y..r.y.saturating_add(r.h) {
            for x in r.x..r.x.saturating_add(r.w) {
                self.set(x, y, Cell { ch: ' ', fg: TEXT, bg });
            }
        }
    }
}

/// Owns stdout in raw/alternate-screen mode; restored on drop.
pub(crate) struct Screen {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    force_full: bool,
}

impl Screen {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            force_full: true,
        })
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.force_full = true;
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if !self.force_full && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.force_full = false;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rect {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) w: u16,
    pub(crate) h: u16,
}

/// Window box below the route bar: 80% of the page, or all of it in fullscreen.
pub(crate) fn window_rect(cols: u16, rows: u16, fullscreen: bool) -> Rect {
    let top = 1u16.min(rows);
    let avail_h = rows.saturating_sub(top);
    if fullscreen {
        return Rect {
            x: 0,
            y: top,
            w: cols,
            h: avail_h,
        };
    }
    let w = ((cols as u32 * 4 / 5) as u16).max(cols.min(40));
    let h = ((avail_h as u32 * 4 / 5) as u16).max(avail_h.min(12));
    Rect {
        x: (cols - w) / 2,
        y: top + (avail_h - h) / 2,
        w,
        h,
    }
}

/// The last `height` lines; the window always shows the newest output.
pub(crate) fn visible_tail(lines: &[String], height: usize) -> &[String] {
    &lines[lines.len().saturating_sub(height)..]
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, max_w: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().take(max_w as usize).enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn draw_border(buf: &mut CellBuffer, r: Rect, fg: Color, bg: Color) {
    if r.w < 2 || r.h < 2 {
        return;
    }
    let (x1, y1) = (r.x + r.w - 1, r.y + r.h - 1);
    for x in r.x..=x1 {
        buf.set(x, r.y, Cell { ch: '─', fg, bg });
        buf.set(x, y1, Cell { ch: '─', fg, bg });
    }
    for y in r.y..=y1 {
        buf.set(r.x, y, Cell { ch: '│', fg, bg });
        buf.set(x1, y, Cell { ch: '│', fg, bg });
    }
    buf.set(r.x, r.y, Cell { ch: '┌', fg, bg });
    buf.set(x1, r.y, Cell { ch: '┐', fg, bg });
    buf.set(r.x, y1, Cell { ch: '└', fg, bg });
    buf.set(x1, y1, Cell { ch: '┘', fg, bg });
}

fn line_color(index: usize, line: &str) -> Color {
    if index < BANNER.len() {
        CYAN
    } else if line.starts_with(PROMPT) {
        BRIGHT
    } else {
        TEXT
    }
}

/// Paints the whole page: route bar, then the terminal in whatever state it is in.
pub(crate) fn draw_page(buf: &mut CellBuffer, route: &str, window: WindowState, frame: &Frame) {
    let (cols, rows) = (buf.w, buf.h);
    let full = Rect {
        x: 0,
        y: 0,
        w: cols,
        h: rows,
    };
    buf.fill(full, PAGE_BG);

    let bar = Rect { h: 1u16.min(rows), ..full };
    buf.fill(bar, BAR_BG);
    draw_text(buf, 1, 0, cols.saturating_sub(2), &format!("portfolio  {route}"), BRIGHT, BAR_BG);
    let hint = "Ctrl+K terminal  Ctrl+C quit";
    let hx = cols.saturating_sub(hint.chars().count() as u16 + 1);
    draw_text(buf, hx, 0, cols, hint, DIM, BAR_BG);

    if !window.open {
        let msg = format!("You are on {route}. Press Ctrl+K to open the terminal.");
        let x = cols.saturating_sub(msg.chars().count() as u16) / 2;
        draw_text(buf, x, rows / 2, cols, &msg, TEXT, PAGE_BG);
        return;
    }
    if window.minimized {
        let badge = "[>_ dev@karan]";
        let w = badge.chars().count() as u16;
        let x = cols.saturating_sub(w + 2);
        let y = rows.saturating_sub(2);
        draw_text(buf, x, y, w, badge, CYAN, BAR_BG);
        return;
    }

    let r = window_rect(cols, rows, window.fullscreen);
    buf.fill(r, WIN_BG);
    draw_border(buf, r, DIM, WIN_BG);

    let title = format!(" {} ", frame.title);
    let tx = r.x + r.w.saturating_sub(title.chars().count() as u16) / 2;
    draw_text(buf, tx, r.y, r.w, &title, DIM, WIN_BG);
    let controls = " F2 minimize  F11 fullscreen  Ctrl+W close ";
    draw_text(buf, r.x + 2, r.y + r.h.saturating_sub(1), r.w.saturating_sub(4), controls, DIM, WIN_BG);

    let inner_w = r.w.saturating_sub(4);
    let inner_h = r.h.saturating_sub(2) as usize;
    let skip = frame.lines.len().saturating_sub(inner_h);
    let shown = visible_tail(&frame.lines, inner_h);
    for (row, line) in shown.iter().enumerate() {
        let y = r.y + 1 + row as u16;
        let fg = line_color(skip + row, line);
        if let Some(rest) = line.strip_prefix(PROMPT) {
            draw_text(buf, r.x + 2, y, inner_w, PROMPT, GREEN, WIN_BG);
            let px = r.x + 2 + PROMPT.chars().count() as u16;
            draw_text(buf, px, y, inner_w.saturating_sub(PROMPT.chars().count() as u16), rest, fg, WIN_BG);
        } else {
            draw_text(buf, r.x + 2, y, inner_w, line, fg, WIN_BG);
        }
    }

    if let (Some(col), Some(_)) = (frame.cursor, shown.last()) {
        let y = r.y + shown.len() as u16;
        let x = r.x + 2 + col as u16;
        if col < inner_w as usize {
            buf.set(x, y, Cell { ch: ' ', fg: WIN_BG, bg: BRIGHT });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view;

    fn row_text(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).filter_map(|x| buf.get(x, y)).map(|c| c.ch).collect()
    }

    #[test]
    fn fullscreen_uses_everything_below_the_bar() {
        assert_eq!(window_rect(100, 40, true), Rect { x: 0, y: 1, w: 100, h: 39 });
        let r = window_rect(100, 40, false);
        assert!(r.w < 100 && r.h < 39);
        assert!(r.x + r.w <= 100 && r.y + r.h <= 40);
    }

    #[test]
    fn tail_keeps_newest_lines() {
        let lines: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(visible_tail(&lines, 3), &lines[7..]);
        assert_eq!(visible_tail(&lines, 50).len(), 10);
    }

    #[test]
    fn closed_page_shows_hint() {
        let mut buf = CellBuffer::new(80, 24);
        let frame = view::compose(&[], None, "");
        draw_page(&mut buf, "/", WindowState::default(), &frame);
        assert!(row_text(&buf, 0).contains("portfolio  /"));
        assert!(row_text(&buf, 12).contains("Ctrl+K"));
    }

    #[test]
    fn minimized_shows_badge_only() {
        let mut buf = CellBuffer::new(80, 24);
        let frame = view::compose(&[], None, "");
        let w = WindowState { open: true, minimized: true, fullscreen: false };
        draw_page(&mut buf, "/", w, &frame);
        assert!(row_text(&buf, 22).contains("[>_ dev@karan]"));
        assert!(!(0..24).any(|y| row_text(&buf, y).contains(PROMPT)));
    }

    #[test]
    fn open_window_shows_prompt_and_caret() {
        let mut buf = CellBuffer::new(80, 30);
        let frame = view::compose(&[], None, "ab");
        let w = WindowState { open: true, minimized: false, fullscreen: false };
        draw_page(&mut buf, "/resume", w, &frame);
        let prompt_row = (0..30).find(|y| row_text(&buf, *y).contains("dev@karan ~ $ ab")).unwrap();
        let r = window_rect(80, 30, false);
        let caret = buf.get(r.x + 2 + frame.cursor.unwrap() as u16, prompt_row).unwrap();
        assert_eq!(caret.bg, BRIGHT);
    }
}
