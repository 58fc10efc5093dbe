/// Level storage: where integer grids come from.
///
/// ## Sources
///   1. `DirStore`: `<levels_dir>/level<N>.txt`, read fresh on every load
///   2. `EmbeddedStore`: the shipped levels compiled into the binary
///
/// ## Text format (`level<N>.txt`):
///   ```
///   # Level 1 - Forest Edge
///   2 2 2 2
///   2 0 7 2
///   2,0,0,8
///   ```
///
/// One grid row per line. Cells are integers separated by whitespace
/// and/or commas. Blank lines and lines starting with `#` are skipped.
/// Rows may be ragged; `Grid::from_rows` pads them with empty cells.
///
/// A store never falls back to previously loaded data: a level that is
/// not there is `LevelError::MissingLevelData`.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("no data for level {level}")]
    MissingLevelData { level: u32 },

    #[error("level {level}: {source}")]
    Io {
        level: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("level {level}, line {line}: bad tile code {token:?}")]
    Parse { level: u32, line: usize, token: String },
}

// ══════════════════════════════════════════════════════════════
// Grid
// ══════════════════════════════════════════════════════════════

/// Rectangular matrix of tile codes, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Grid {
    rows: Vec<Vec<i32>>,
    width: usize,
    /// Cells added while squaring off ragged rows.
    padded: usize,
}

impl Grid {
    /// Build a grid, padding short rows with 0 up to the longest row.
    pub fn from_rows(mut rows: Vec<Vec<i32>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut padded = 0;
        for row in &mut rows {
            padded += width - row.len();
            row.resize(width, 0);
        }
        Grid { rows, width, padded }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.rows.is_empty()
    }

    /// Number of cells that had to be filled in. Non-zero means the source
    /// grid was not rectangular.
    pub fn padded_cells(&self) -> usize {
        self.padded
    }

    /// `(col, row, code)` for every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, &code)| (c, r, code))
        })
    }
}

/// Parse the text form of one level.
pub fn parse_grid(level: u32, text: &str) -> Result<Grid, LevelError> {
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut row = Vec::new();
        for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            let code = token.parse::<i32>().map_err(|_| LevelError::Parse {
                level,
                line: idx + 1,
                token: token.to_string(),
            })?;
            row.push(code);
        }
        rows.push(row);
    }
    Ok(Grid::from_rows(rows))
}

// ══════════════════════════════════════════════════════════════
// Stores
// ══════════════════════════════════════════════════════════════

/// Keyed source of level grids. Levels are numbered from 1.
pub trait LevelStore {
    fn load(&self, level: u32) -> Result<Grid, LevelError>;

    /// Where the levels come from, for the log.
    fn describe(&self) -> String;
}

/// Individual `level<N>.txt` files in one directory.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirStore { dir: dir.into() }
    }

    fn path_for(&self, level: u32) -> PathBuf {
        self.dir.join(format!("level{level}.txt"))
    }
}

impl LevelStore for DirStore {
    fn load(&self, level: u32) -> Result<Grid, LevelError> {
        let path = self.path_for(level);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LevelError::MissingLevelData { level });
            }
            Err(source) => return Err(LevelError::Io { level, source }),
        };
        parse_grid(level, &text)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// True if `dir` holds at least one level file this store can read.
pub fn dir_has_levels(dir: &Path) -> bool {
    DirStore::new(dir).path_for(1).is_file()
}

/// The shipped levels, compiled in.
pub struct EmbeddedStore;

const EMBEDDED_LEVELS: [&str; 10] = [
    include_str!("../../levels/level1.txt"),
    include_str!("../../levels/level2.txt"),
    include_str!("../../levels/level3.txt"),
    include_str!("../../levels/level4.txt"),
    include_str!("../../levels/level5.txt"),
    include_str!("../../levels/level6.txt"),
    include_str!("../../levels/level7.txt"),
    include_str!("../../levels/level8.txt"),
    include_str!("../../levels/level9.txt"),
    include_str!("../../levels/level10.txt"),
];

impl EmbeddedStore {
    pub const LEVEL_COUNT: u32 = EMBEDDED_LEVELS.len() as u32;
}

impl LevelStore for EmbeddedStore {
    fn load(&self, level: u32) -> Result<Grid, LevelError> {
        let text = level
            .checked_sub(1)
            .and_then(|i| EMBEDDED_LEVELS.get(i as usize))
            .ok_or(LevelError::MissingLevelData { level })?;
        parse_grid(level, text)
    }

    fn describe(&self) -> String {
        format!("{} built-in levels", Self::LEVEL_COUNT)
    }
}

/// In-memory store for session tests.
#[cfg(test)]
pub struct MemoryStore {
    pub levels: std::collections::HashMap<u32, Grid>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore { levels: std::collections::HashMap::new() }
    }

    pub fn with(mut self, level: u32, rows: Vec<Vec<i32>>) -> Self {
        self.levels.insert(level, Grid::from_rows(rows));
        self
    }
}

#[cfg(test)]
impl LevelStore for MemoryStore {
    fn load(&self, level: u32) -> Result<Grid, LevelError> {
        self.levels.get(&level).cloned().ok_or(LevelError::MissingLevelData { level })
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
