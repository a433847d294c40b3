//! Grid entity - The dungeon's tile layout
//!
//! A campaign persists its dungeon as an opaque JSON blob of the form
//! `{"width", "height", "enter", "exit", "world": [[code, ...], ...]}`. The blob is
//! decoded once when a campaign is loaded and encoded again only when it is saved.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Position;

/// Terrain/feature tag for a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellCode {
    Floor,
    Wall,
    Obstacle,
    Door,
    SideDoor,
    StartFlag,
    ExitFlag,
}

impl CellCode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellCode::Floor),
            1 => Some(CellCode::Wall),
            2 => Some(CellCode::Obstacle),
            3 => Some(CellCode::Door),
            4 => Some(CellCode::SideDoor),
            5 => Some(CellCode::StartFlag),
            6 => Some(CellCode::ExitFlag),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CellCode::Floor => 0,
            CellCode::Wall => 1,
            CellCode::Obstacle => 2,
            CellCode::Door => 3,
            CellCode::SideDoor => 4,
            CellCode::StartFlag => 5,
            CellCode::ExitFlag => 6,
        }
    }

    /// Walls and obstacles both stop movement.
    pub fn is_blocking(self) -> bool {
        matches!(self, CellCode::Wall | CellCode::Obstacle)
    }

    pub fn glyph(self) -> &'static str {
        match self {
            CellCode::Floor | CellCode::Obstacle => ":white_large_square:",
            CellCode::Wall => ":black_large_square:",
            CellCode::Door | CellCode::SideDoor => ":door:",
            CellCode::StartFlag => ":checkered_flag:",
            CellCode::ExitFlag => ":triangular_flag_on_post:",
        }
    }

    /// Tile features a character can notice and examine.
    pub fn feature(self) -> Option<TileFeature> {
        match self {
            CellCode::Door | CellCode::SideDoor => Some(TileFeature::Door),
            CellCode::StartFlag => Some(TileFeature::StartFlag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileFeature {
    Door,
    StartFlag,
}

impl TileFeature {
    pub fn label(self) -> &'static str {
        match self {
            TileFeature::Door => "door",
            TileFeature::StartFlag => "start flag",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "door" => Some(TileFeature::Door),
            "start flag" => Some(TileFeature::StartFlag),
            _ => None,
        }
    }
}

/// Entry or exit marker carried along with the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridMarker {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub room_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Malformed grid blob: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Grid declares {declared} rows but contains {found}")]
    HeightMismatch { declared: u32, found: usize },
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: u32,
        found: usize,
    },
    #[error("Unknown cell code {code} at ({x}, {y})")]
    UnknownCellCode { code: u8, x: usize, y: usize },
}

#[derive(Debug, Serialize, Deserialize)]
struct GridBlob {
    width: u32,
    height: u32,
    #[serde(default)]
    enter: GridMarker,
    #[serde(default)]
    exit: GridMarker,
    world: Vec<Vec<u8>>,
}

/// Decoded dungeon grid. Rows are indexed by `y`, columns by `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    enter: GridMarker,
    exit: GridMarker,
    cells: Vec<Vec<CellCode>>,
}

impl Grid {
    /// Build a grid from rows of cell codes; every row must be `width` long.
    pub fn from_rows(
        rows: Vec<Vec<CellCode>>,
        enter: GridMarker,
        exit: GridMarker,
    ) -> Result<Self, GridError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width as usize {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }
        Ok(Self {
            width,
            height: rows.len() as u32,
            enter,
            exit,
            cells: rows,
        })
    }

    /// Decode the persisted blob.
    pub fn decode(blob: &str) -> Result<Self, GridError> {
        let raw: GridBlob = serde_json::from_str(blob)?;
        if raw.world.len() != raw.height as usize {
            return Err(GridError::HeightMismatch {
                declared: raw.height,
                found: raw.world.len(),
            });
        }

        let mut cells = Vec::with_capacity(raw.world.len());
        for (y, row) in raw.world.iter().enumerate() {
            if row.len() != raw.width as usize {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: raw.width,
                    found: row.len(),
                });
            }
            let decoded = row
                .iter()
                .enumerate()
                .map(|(x, &code)| {
                    CellCode::from_code(code).ok_or(GridError::UnknownCellCode { code, x, y })
                })
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(decoded);
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            enter: raw.enter,
            exit: raw.exit,
            cells,
        })
    }

    /// Encode back into the persisted blob.
    pub fn encode(&self) -> Result<String, GridError> {
        let blob = GridBlob {
            width: self.width,
            height: self.height,
            enter: self.enter,
            exit: self.exit,
            world: self
                .cells
                .iter()
                .map(|row| row.iter().map(|c| c.code()).collect())
                .collect(),
        };
        Ok(serde_json::to_string(&blob)?)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Strict bounds check: `0 <= x < width` and `0 <= y < height`.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn cell(&self, pos: Position) -> Option<CellCode> {
        if !self.contains(pos) {
            return None;
        }
        self.cells
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
    }

    pub fn is_blocking(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(CellCode::is_blocking)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, CellCode)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &code)| (Position::new(x as i32, y as i32), code))
        })
    }
}
