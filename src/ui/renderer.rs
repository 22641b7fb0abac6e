/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of `Cell`)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for cells that changed
///   4. Batch everything with `queue!`, flush once
///   5. Swap front/back
///
/// Layout (terminal rows):
///   0        HUD: title, score, best, top tile, state
///   2..19    4×4 board (tiles are TILE_W × TILE_H) | side panel
///   20       notice bar (win / game over)
///   last     key help

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::Theme;
use crate::domain::board::BOARD_SIZE;
use crate::domain::tile::{Pos, Variant};
use crate::sim::phase::GameState;
use crate::sim::snapshot::{Notice, Snapshot, TileView};

// ── Palette ──

struct Palette {
    base_bg: Color,
    board_bg: Color,
    empty_bg: Color,
    text: Color,
    dim: Color,
    accent: Color,
    notice_fg: Color,
    win_bg: Color,
    over_bg: Color,
}

const DARK: Palette = Palette {
    base_bg: Color::Rgb { r: 22, g: 22, b: 35 },
    board_bg: Color::Rgb { r: 44, g: 42, b: 60 },
    empty_bg: Color::Rgb { r: 62, g: 60, b: 82 },
    text: Color::White,
    dim: Color::DarkGrey,
    accent: Color::Rgb { r: 255, g: 200, b: 50 },
    notice_fg: Color::Black,
    win_bg: Color::Rgb { r: 237, g: 194, b: 46 },
    over_bg: Color::Rgb { r: 230, g: 80, b: 70 },
};

const LIGHT: Palette = Palette {
    base_bg: Color::Rgb { r: 250, g: 248, b: 239 },
    board_bg: Color::Rgb { r: 187, g: 173, b: 160 },
    empty_bg: Color::Rgb { r: 205, g: 193, b: 180 },
    text: Color::Rgb { r: 119, g: 110, b: 101 },
    dim: Color::Rgb { r: 160, g: 150, b: 140 },
    accent: Color::Rgb { r: 143, g: 122, b: 102 },
    notice_fg: Color::White,
    win_bg: Color::Rgb { r: 237, g: 194, b: 46 },
    over_bg: Color::Rgb { r: 200, g: 70, b: 60 },
};

fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Dark => &DARK,
        Theme::Light => &LIGHT,
    }
}

/// (fg, bg) for a tile. Variants override the value ramp.
fn tile_colors(tile: &TileView) -> (Color, Color) {
    let light_text = Color::Rgb { r: 249, g: 246, b: 242 };
    let dark_text = Color::Rgb { r: 119, g: 110, b: 101 };
    match tile.variant {
        Variant::Wild => return (light_text, Color::Rgb { r: 155, g: 89, b: 182 }),
        Variant::Doubler => return (light_text, Color::Rgb { r: 26, g: 160, b: 140 }),
        Variant::Normal => {}
    }
    let (r, g, b) = match tile.value {
        2 => (238, 228, 218),
        4 => (237, 224, 200),
        8 => (242, 177, 121),
        16 => (245, 149, 99),
        32 => (246, 124, 95),
        64 => (246, 94, 59),
        128 => (237, 207, 114),
        256 => (237, 204, 97),
        512 => (237, 200, 80),
        1024 => (237, 197, 63),
        2048 => (237, 194, 46),
        _ => (60, 58, 50),
    };
    let fg = if tile.value <= 4 { dark_text } else { light_text };
    (fg, Color::Rgb { r, g, b })
}

fn lighten(c: Color, amount: u8) -> Color {
    match c {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: r.saturating_add(amount),
            g: g.saturating_add(amount),
            b: b.saturating_add(amount),
        },
        other => other,
    }
}

/// Small caption under the value.
fn variant_caption(variant: Variant) -> &'static str {
    match variant {
        Variant::Normal => "",
        Variant::Wild => "wild",
        Variant::Doubler => "x2",
    }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };

    fn blank(bg: Color) -> Self {
        Cell { ch: ' ', fg: Color::White, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::INVALID; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::INVALID; w * h];
        }
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::INVALID
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::blank(bg));
            }
        }
    }
}

// ── Renderer ──

const TILE_W: usize = 7;
const TILE_H: usize = 3;
const GAP: usize = 1;

const HUD_ROW: usize = 0;
const BOARD_ROW: usize = 2;
const BOARD_COL: usize = 2;
const BOARD_W: usize = BOARD_SIZE * (TILE_W + GAP) + GAP;
const BOARD_H: usize = BOARD_SIZE * (TILE_H + GAP) + GAP;
const PANEL_COL: usize = BOARD_COL + BOARD_W + 3;
const NOTICE_ROW: usize = BOARD_ROW + BOARD_H + 1;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_theme: Option<Theme>,
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_theme: None,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.writer, terminal::EnterAlternateScreen, cursor::Hide)?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        Ok(())
    }

    /// Ask the terminal to report key releases. Returns whether it will.
    pub fn enable_key_release(&mut self) -> bool {
        if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            return false;
        }
        let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
        self.key_release = execute!(self.writer, PushKeyboardEnhancementFlags(flags)).is_ok();
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.key_release = false;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Draw one frame. `highlight` is true while the last action's
    /// merge/spawn markers should still show.
    pub fn render(&mut self, snap: &Snapshot, theme: Theme, highlight: bool) -> io::Result<()> {
        let pal = palette(theme);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }

        // Resize or theme change: repaint everything.
        if resized || self.last_theme != Some(theme) {
            self.back.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(pal.base_bg), Clear(ClearType::All))?;
            self.last_theme = Some(theme);
        }

        self.front.fill(Cell::blank(pal.base_bg));
        self.compose_hud(snap, pal);
        self.compose_board(snap, pal, highlight);
        self.compose_panel(snap, pal);
        self.compose_notice(snap, pal);
        self.compose_help(pal);

        self.flush_diff(pal)?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self, pal: &Palette) -> io::Result<()> {
        let mut last_fg = pal.text;
        let mut last_bg = pal.base_bg;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, snap: &Snapshot, pal: &Palette) {
        self.front.put_str(BOARD_COL, HUD_ROW, "WILD 2048", pal.accent, pal.base_bg);
        let stats = format!(
            "SCORE {:>6}   BEST {:>6}   TOP {:>5}",
            snap.score, snap.best, snap.top_tile
        );
        self.front.put_str(BOARD_COL + 12, HUD_ROW, &stats, pal.text, pal.base_bg);

        let state = match snap.state {
            GameState::Idle => "",
            GameState::Animating => "...",
            GameState::Won => "[won]",
            GameState::Over => "[over]",
        };
        self.front.put_str(BOARD_COL + 12 + stats.len() + 3, HUD_ROW, state, pal.dim, pal.base_bg);
    }

    fn compose_board(&mut self, snap: &Snapshot, pal: &Palette, highlight: bool) {
        self.front.fill_rect(BOARD_COL, BOARD_ROW, BOARD_W, BOARD_H, pal.board_bg);

        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let (x, y) = tile_origin(Pos::new(row, col));
                self.front.fill_rect(x, y, TILE_W, TILE_H, pal.empty_bg);
            }
        }

        for tile in &snap.tiles {
            let (x, y) = tile_origin(tile.pos());
            let (fg, mut bg) = tile_colors(tile);
            let fresh = snap.spawned == Some(tile.id);
            if highlight && (tile.merged || fresh) {
                bg = lighten(bg, 30);
            }
            self.front.fill_rect(x, y, TILE_W, TILE_H, bg);

            let label = tile.value.to_string();
            self.front.put_str(x + centered(TILE_W, label.len()), y + 1, &label, fg, bg);

            if tile.variant.is_special() {
                let caption = variant_caption(tile.variant);
                self.front.put_str(x + centered(TILE_W, caption.len()), y + 2, caption, fg, bg);
            }
            if highlight && fresh {
                self.front.put_str(x, y, "+", fg, bg);
            }
        }
    }

    fn compose_panel(&mut self, snap: &Snapshot, pal: &Palette) {
        let x = PANEL_COL;
        let mut y = BOARD_ROW;

        self.front.put_str(x, y, "POWERS", pal.accent, pal.base_bg);
        y += 1;
        for (i, (kind, left)) in snap.powers.iter().enumerate() {
            let line = format!("{} {:<8} x{}", i + 1, kind.token(), left);
            let fg = if *left > 0 { pal.text } else { pal.dim };
            self.front.put_str(x, y, &line, fg, pal.base_bg);
            y += 1;
        }

        y += 1;
        self.front.put_str(x, y, "LEADERBOARD", pal.accent, pal.base_bg);
        y += 1;
        if snap.leaderboard.is_empty() {
            self.front.put_str(x, y, "no runs yet", pal.dim, pal.base_bg);
        }
        for (i, entry) in snap.leaderboard.iter().enumerate() {
            let line = format!(
                "{}. {:>6}  {:>5}  {}",
                i + 1,
                entry.score,
                entry.top_tile,
                entry.label.as_str()
            );
            self.front.put_str(x, y + i, &line, pal.text, pal.base_bg);
        }
    }

    fn compose_notice(&mut self, snap: &Snapshot, pal: &Palette) {
        let Some(notice) = snap.notice else { return };
        let (text, bg) = match notice {
            Notice::Won { score, top_tile } => (
                format!(" You reached {top_tile}! Score {score}. Keep going, or R to restart. "),
                pal.win_bg,
            ),
            Notice::Over { score, top_tile } => (
                format!(" Game over. Score {score}, top tile {top_tile}. R to restart. "),
                pal.over_bg,
            ),
        };
        let width = BOARD_W.max(text.chars().count());
        self.front.fill_rect(BOARD_COL, NOTICE_ROW, width, 1, bg);
        self.front.put_str(BOARD_COL, NOTICE_ROW, &text, pal.notice_fg, bg);
    }

    fn compose_help(&mut self, pal: &Palette) {
        let row = self.front.height.saturating_sub(1).max(NOTICE_ROW + 2);
        let help = "Arrows/WASD/HJKL slide   1 wild  2 bomb  3 shuffle   R restart   T theme   Q quit";
        self.front.put_str(BOARD_COL, row, help, pal.dim, pal.base_bg);
    }
}

fn tile_origin(pos: Pos) -> (usize, usize) {
    (
        BOARD_COL + GAP + pos.col * (TILE_W + GAP),
        BOARD_ROW + GAP + pos.row * (TILE_H + GAP),
    )
}

fn centered(width: usize, len: usize) -> usize {
    width.saturating_sub(len) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(value: u32, variant: Variant) -> TileView {
        TileView { id: 1, value, variant, row: 0, col: 0, merged: false }
    }

    #[test]
    fn tiles_do_not_overlap_and_fit_the_board() {
        let (x0, y0) = tile_origin(Pos::new(0, 0));
        let (x1, _) = tile_origin(Pos::new(0, 1));
        let (_, y1) = tile_origin(Pos::new(1, 0));
        assert!(x1 >= x0 + TILE_W);
        assert!(y1 >= y0 + TILE_H);
        let (xl, yl) = tile_origin(Pos::new(BOARD_SIZE - 1, BOARD_SIZE - 1));
        assert!(xl + TILE_W <= BOARD_COL + BOARD_W);
        assert!(yl + TILE_H <= BOARD_ROW + BOARD_H);
    }

    #[test]
    fn variants_get_their_own_colours() {
        let normal = tile_colors(&view(8, Variant::Normal));
        assert_ne!(tile_colors(&view(8, Variant::Wild)), normal);
        assert_ne!(tile_colors(&view(8, Variant::Doubler)), normal);
        assert_eq!(variant_caption(Variant::Doubler), "x2");
    }

    #[test]
    fn labels_center_inside_the_tile() {
        assert_eq!(centered(TILE_W, 1), 3);
        assert_eq!(centered(TILE_W, 4), 1);
        assert_eq!(centered(TILE_W, 9), 0);
    }
}
