/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Emit terminal commands only for cells that changed, batched with `queue!`
///   4. Swap front/back
///
/// The 1000×1000 world is scaled down onto a grid of map cells. Each map
/// cell covers `unit`×`unit` world units and is drawn as `CELL_W` terminal
/// columns. Entities are painted back to front (tiles first, player last),
/// so the last body touching a cell decides its look.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geom::Rect;
use crate::domain::tile::{EnemyColor, HazardKind, Material, PlatformKind, SCREEN_HEIGHT, SCREEN_WIDTH, TILE_SIZE};
use crate::sim::session::{GameSession, Phase};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, so the gaps between rows
    /// match the cells on terminals that paint them separately.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 28 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from every real cell; filling `back` with it forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Self::BASE_BG } else { bg };
        Cell { ch, fg, bg }
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
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
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
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Write `s` horizontally centred within `0..width`.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Themes ──

/// Palette family, chosen by level number.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Theme {
    Forest,
    Arctic,
    Cake,
    Final,
}

impl Theme {
    pub fn for_level(level: u32) -> Theme {
        match level {
            0..=4 => Theme::Forest,
            5..=7 => Theme::Arctic,
            8..=9 => Theme::Cake,
            _ => Theme::Final,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Theme::Forest => "Forest",
            Theme::Arctic => "Arctic",
            Theme::Cake => "Cake Land",
            Theme::Final => "Final Climb",
        }
    }

    fn sky(self) -> Color {
        match self {
            Theme::Forest => Color::Rgb { r: 24, g: 40, b: 56 },
            Theme::Arctic => Color::Rgb { r: 36, g: 52, b: 72 },
            Theme::Cake => Color::Rgb { r: 60, g: 34, b: 52 },
            Theme::Final => Color::Rgb { r: 30, g: 18, b: 40 },
        }
    }
}

// ── Viewport: world units → map cells ──

/// Smallest world span one map cell may cover.
const MIN_UNIT: i32 = TILE_SIZE / 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Viewport {
    /// World units per map cell, both axes.
    unit: i32,
    cols: usize,
    rows: usize,
}

impl Viewport {
    /// Largest scale at which the whole world fits in `cols`×`rows` cells.
    fn fit(cols: usize, rows: usize) -> Viewport {
        let need = |span: i32, cells: usize| -> i32 {
            let cells = cells.max(1) as i32;
            (span + cells - 1) / cells
        };
        let unit = MIN_UNIT
            .max(need(SCREEN_WIDTH, cols))
            .max(need(SCREEN_HEIGHT, rows));
        Viewport {
            unit,
            cols: ((SCREEN_WIDTH + unit - 1) / unit) as usize,
            rows: ((SCREEN_HEIGHT + unit - 1) / unit) as usize,
        }
    }

    /// Map cells covered by `lo..lo + len`, clipped to `0..limit`.
    fn span(&self, lo: i32, len: i32, limit: usize) -> std::ops::Range<usize> {
        if len <= 0 || limit == 0 {
            return 0..0;
        }
        let first = lo.div_euclid(self.unit).max(0);
        let last = (lo + len - 1).div_euclid(self.unit);
        if last < 0 || first as usize >= limit {
            return 0..0;
        }
        first as usize..(last as usize + 1).min(limit)
    }

    fn cells_of(&self, rect: &Rect) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        (self.span(rect.x, rect.w, self.cols), self.span(rect.y, rect.h, self.rows))
    }
}

// ── Glyphs ──

/// Two terminal columns per map cell.
type Glyph = [char; 2];

fn material_style(m: Material) -> (Glyph, Color, Color) {
    let brown = Color::Rgb { r: 120, g: 78, b: 40 };
    match m {
        Material::Dirt => (['▓', '▓'], brown, Color::Rgb { r: 80, g: 50, b: 24 }),
        Material::Grass => (['▀', '▀'], Color::Rgb { r: 70, g: 190, b: 60 }, brown),
        Material::Tundra => (['▀', '▀'], Color::Rgb { r: 230, g: 240, b: 255 }, Color::Rgb { r: 90, g: 110, b: 130 }),
        Material::TundraBlank => (['▒', '▒'], Color::Rgb { r: 120, g: 140, b: 160 }, Color::Rgb { r: 90, g: 110, b: 130 }),
        Material::Cake => (['▀', '▀'], Color::Rgb { r: 255, g: 190, b: 210 }, Color::Rgb { r: 220, g: 170, b: 110 }),
        Material::CakeBlank => (['░', '░'], Color::Rgb { r: 240, g: 200, b: 140 }, Color::Rgb { r: 220, g: 170, b: 110 }),
        Material::ChocoCake => (['▀', '▀'], Color::Rgb { r: 250, g: 240, b: 230 }, Color::Rgb { r: 90, g: 50, b: 30 }),
        Material::ChocoCakeBlank => (['░', '░'], Color::Rgb { r: 120, g: 70, b: 40 }, Color::Rgb { r: 90, g: 50, b: 30 }),
    }
}

fn platform_color(kind: PlatformKind) -> Color {
    match kind {
        PlatformKind::Dirt => Color::Rgb { r: 170, g: 120, b: 60 },
        PlatformKind::Cake => Color::Rgb { r: 255, g: 150, b: 190 },
        PlatformKind::Ice => Color::Rgb { r: 160, g: 230, b: 255 },
    }
}

fn enemy_color(c: EnemyColor) -> Color {
    match c {
        EnemyColor::Green => Color::Rgb { r: 90, g: 220, b: 90 },
        EnemyColor::Blue => Color::Rgb { r: 90, g: 150, b: 255 },
        EnemyColor::Purple => Color::Rgb { r: 190, g: 100, b: 255 },
        EnemyColor::Red => Color::Rgb { r: 255, g: 80, b: 70 },
    }
}

fn hazard_color(kind: HazardKind) -> (Color, Color) {
    match kind {
        HazardKind::Lava => (Color::Rgb { r: 255, g: 200, b: 40 }, Color::Rgb { r: 200, g: 50, b: 20 }),
        HazardKind::Water => (Color::Rgb { r: 200, g: 230, b: 255 }, Color::Rgb { r: 30, g: 90, b: 200 }),
    }
}

// ── Renderer ──

const CELL_W: usize = 2;

/// Vertical layout
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the map, gap + help line below.
const RESERVED_ROWS: usize = MAP_ROW + 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const GOLD: Color = Color::Rgb { r: 255, g: 210, b: 60 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const RED: Color = Color::Rgb { r: 255, g: 70, b: 70 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Also asks the terminal for
    /// key release events where supported.
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        self.sync_size(true)?;
        Ok(())
    }

    /// Whether the terminal will send key Release events.
    pub fn reports_key_release(&self) -> bool {
        self.enhanced_keys
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn sync_size(&mut self, force: bool) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if force || tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.invalidate()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, session: &GameSession) -> io::Result<()> {
        self.sync_size(false)?;

        if self.last_phase != Some(session.phase) {
            self.invalidate()?;
            self.last_phase = Some(session.phase);
        }

        self.front.clear();

        match session.phase {
            Phase::MainMenu => self.compose_menu(session),
            Phase::Playing => self.compose_game(session),
            Phase::PlayerDead => {
                self.compose_game(session);
                self.compose_banner(&["GAME OVER", "", "ENTER / R: Restart    ESC: Quit"], RED);
            }
            Phase::Won => {
                self.compose_game(session);
                let score = format!("YOU WIN! SCORE: {}", session.score);
                self.compose_banner(&[score.as_str(), "", "ENTER / R: Play again    ESC: Quit"], GOLD);
            }
            Phase::LevelUnavailable => self.compose_error(session),
            Phase::Terminated => {}
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
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

    fn viewport(&self) -> Viewport {
        Viewport::fit(self.term_w / CELL_W, self.term_h.saturating_sub(RESERVED_ROWS))
    }

    fn compose_game(&mut self, s: &GameSession) {
        let theme = Theme::for_level(s.level);
        let view = self.viewport();

        // ── HUD row ──
        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = format!(
            " Level {}/{}   Coins {:<4}  {}",
            s.level, s.max_levels, s.score, theme.name(),
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Sky ──
        for row in 0..view.rows {
            for col in 0..view.cols * CELL_W {
                self.front.set(col, MAP_ROW + row, Cell::new(' ', Color::White, theme.sky()));
            }
        }

        // ── Bodies, back to front ──
        let w = &s.world;
        for tile in w.tiles.iter() {
            let (glyph, fg, bg) = material_style(tile.material);
            self.paint(&view, &tile.rect, glyph, fg, bg);
        }
        for p in w.all_platforms() {
            self.paint(&view, &p.rect, ['=', '='], platform_color(p.kind), Color::Reset);
        }
        for gate in &w.exits {
            self.paint(&view, &gate.rect, ['[', ']'], GOLD, Color::Rgb { r: 70, g: 50, b: 20 });
        }
        for h in &w.hazards {
            let (fg, bg) = hazard_color(h.kind);
            self.paint(&view, &h.rect, ['~', '~'], fg, bg);
        }
        for c in &w.coins {
            self.paint(&view, &c.rect, ['(', ')'], GOLD, Color::Reset);
        }
        for e in &w.enemies {
            let glyph = if e.facing_right { ['o', '>'] } else { ['<', 'o'] };
            self.paint(&view, &e.rect, glyph, enemy_color(e.color), Color::Reset);
        }

        let player = &s.player;
        if s.phase == Phase::PlayerDead {
            self.paint(&view, &player.rect, ['░', '░'], Color::Rgb { r: 200, g: 200, b: 220 }, Color::Reset);
        } else {
            let glyph = match player.facing {
                f if f < 0 => ['<', '█'],
                f if f > 0 => ['█', '>'],
                _ => ['█', '█'],
            };
            self.paint(&view, &player.rect, glyph, Color::White, Color::Reset);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + view.rows + 1;
        let help = " ←→/AD: Walk   Space/↑/W: Jump   ESC: Quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    /// Paint every map cell `rect` touches. `Color::Reset` as background
    /// keeps whatever is already painted underneath.
    fn paint(&mut self, view: &Viewport, rect: &Rect, glyph: Glyph, fg: Color, bg: Color) {
        let (cols, rows) = view.cells_of(rect);
        for row in rows {
            for col in cols.clone() {
                for (i, &ch) in glyph.iter().enumerate() {
                    let x = col * CELL_W + i;
                    let y = MAP_ROW + row;
                    let under = self.front.get(x, y).bg;
                    let bg = if bg == Color::Reset { under } else { bg };
                    self.front.set(x, y, Cell::new(ch, fg, bg));
                }
            }
        }
    }

    /// Boxed message centred over the map area.
    fn compose_banner(&mut self, lines: &[&str], accent: Color) {
        let view = self.viewport();
        let inner_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let map_w = view.cols * CELL_W;
        let x0 = map_w.saturating_sub(inner_w + 2) / 2;
        let y0 = MAP_ROW + view.rows.saturating_sub(lines.len() + 2) / 2;
        let bg = Color::Rgb { r: 10, g: 10, b: 16 };

        let edge: String = std::iter::repeat('─').take(inner_w).collect();
        self.front.put_str(x0, y0, &format!("┌{edge}┐"), accent, bg);
        for (i, line) in lines.iter().enumerate() {
            let pad = inner_w - line.chars().count();
            let left = pad / 2;
            let text = format!("│{}{}{}│", " ".repeat(left), line, " ".repeat(pad - left));
            let fg = if i == 0 { accent } else { Color::White };
            self.front.put_str(x0, y0 + 1 + i, &text, fg, bg);
        }
        self.front.put_str(x0, y0 + 1 + lines.len(), &format!("└{edge}┘"), accent, bg);
    }

    fn compose_menu(&mut self, s: &GameSession) {
        let title = [
            r" _____ _ _          _                      ",
            r"|_   _(_) | ___    | |_   _ _ __ ___  _ __ ",
            r"  | | | | |/ _ \_  | | | | | '_ ` _ \| '_ \",
            r"  | | | | |  __/ |_| | |_| | | | | | | |_) |",
            r"  |_| |_|_|\___|\___/ \__,_|_| |_| |_| .__/",
            r"                                     |_|   ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_centered(2 + i, line, GOLD, Color::Reset);
        }

        let base = 10;
        self.front.put_centered(base, "ENTER   Start", GREEN, Color::Reset);
        self.front.put_centered(base + 1, "Q/ESC   Exit ", Color::White, Color::Reset);

        let info = format!("{} levels", s.max_levels);
        self.front.put_centered(base + 3, &info, Color::DarkGrey, Color::Reset);

        let help = [
            "Controls",
            "←→ / A D       Walk",
            "Space / ↑ / W  Jump",
            "Gamepad: D-pad walk, A jump, Start start",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { GOLD } else { Color::White };
            self.front.put_centered(base + 5 + i, line, color, Color::Reset);
        }
    }

    fn compose_error(&mut self, s: &GameSession) {
        let heading = format!("LEVEL {} UNAVAILABLE", s.level);
        let detail = s.last_error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_default();
        self.front.put_centered(4, &heading, RED, Color::Reset);
        self.front.put_centered(6, &detail, Color::White, Color::Reset);
        self.front.put_centered(9, "ENTER / R: Back to level 1    ESC: Quit", GREEN, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_follows_level_bands() {
        assert_eq!(Theme::for_level(1), Theme::Forest);
        assert_eq!(Theme::for_level(4), Theme::Forest);
        assert_eq!(Theme::for_level(5), Theme::Arctic);
        assert_eq!(Theme::for_level(7), Theme::Arctic);
        assert_eq!(Theme::for_level(8), Theme::Cake);
        assert_eq!(Theme::for_level(9), Theme::Cake);
        assert_eq!(Theme::for_level(10), Theme::Final);
        assert_eq!(Theme::for_level(25), Theme::Final);
    }

    #[test]
    fn viewport_scales_to_terminal() {
        // roomy terminal: half-tile cells, 40×40
        let v = Viewport::fit(100, 60);
        assert_eq!((v.unit, v.cols, v.rows), (25, 40, 40));

        // 80×24 terminal: 40 map columns, 20 map rows
        let v = Viewport::fit(40, 20);
        assert_eq!((v.unit, v.cols, v.rows), (50, 20, 20));

        // rows are the tighter constraint
        let v = Viewport::fit(40, 15);
        assert_eq!(v.unit, 67);
        assert_eq!((v.cols, v.rows), (15, 15));
    }

    #[test]
    fn span_clips_to_map() {
        let v = Viewport::fit(40, 20); // unit 50
        assert_eq!(v.span(100, 45, v.cols), 2..3);
        assert_eq!(v.span(100, 51, v.cols), 2..4);
        assert_eq!(v.span(-30, 50, v.cols), 0..1);
        assert_eq!(v.span(-60, 50, v.cols), 0..0);
        assert_eq!(v.span(990, 50, v.cols), 19..20);
        assert_eq!(v.span(1000, 50, v.cols), 0..0);
        assert_eq!(v.span(100, 0, v.cols), 0..0);
    }

    #[test]
    fn banner_lines_fit_in_box() {
        let mut buf = FrameBuffer::new(20, 3);
        buf.put_centered(1, "GAME OVER", Color::White, Color::Reset);
        assert_eq!(buf.get(5, 1).ch, 'G');
        assert_eq!(buf.get(13, 1).ch, 'R');
        assert_eq!(buf.get(5, 1).bg, Cell::BASE_BG);
    }
}
