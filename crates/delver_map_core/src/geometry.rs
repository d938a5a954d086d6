//! Grid geometry: positions, sizes, edges and size bounds

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A cell coordinate, 0-indexed from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This position moved by `(dx, dy)`
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// This position and its 8 surrounding cells
    pub fn with_neighbors(self) -> impl Iterator<Item = Position> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| self.offset(dx, dy)))
    }
}

impl From<[i32; 2]> for Position {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [i32; 2] {
    fn from(position: Position) -> Self {
        [position.x, position.y]
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height in cells (or pixels, for tile sizes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The dimension along `axis`
    pub const fn along(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// A copy with the dimension along `axis` replaced
    pub const fn with_along(self, axis: Axis, value: u32) -> Self {
        match axis {
            Axis::Horizontal => Self {
                width: value,
                height: self.height,
            },
            Axis::Vertical => Self {
                width: self.width,
                height: value,
            },
        }
    }

    /// Component-wise clamp
    pub fn clamp(self, min: GridSize, max: GridSize) -> Self {
        Self {
            width: self.width.clamp(min.width, max.width.max(min.width)),
            height: self.height.clamp(min.height, max.height.max(min.height)),
        }
    }

    /// Component-wise `self <= other`
    pub const fn fits_within(&self, other: &GridSize) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }
}

impl From<[u32; 2]> for GridSize {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<GridSize> for [u32; 2] {
    fn from(size: GridSize) -> Self {
        [size.width, size.height]
    }
}

impl From<(u32, u32)> for GridSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One of the two grid axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Both edges of the axis, leading edge first
    pub const fn edges(self) -> [Edge; 2] {
        match self {
            Axis::Horizontal => [Edge::Left, Edge::Right],
            Axis::Vertical => [Edge::Top, Edge::Bottom],
        }
    }
}

/// A grid boundary. Also used as a resize direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Resize operations name the edge they grow or shrink towards
pub type Direction = Edge;

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    pub const fn axis(self) -> Axis {
        match self {
            Edge::Left | Edge::Right => Axis::Horizontal,
            Edge::Top | Edge::Bottom => Axis::Vertical,
        }
    }

    pub const fn opposite(self) -> Edge {
        match self {
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
        }
    }

    /// Left and top sit at coordinate 0: resizing there shifts every cell
    pub const fn is_leading(self) -> bool {
        matches!(self, Edge::Left | Edge::Top)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Edge::Left),
            "right" => Ok(Edge::Right),
            "top" => Ok(Edge::Top),
            "bottom" => Ok(Edge::Bottom),
            other => Err(format!("unknown edge '{other}'")),
        }
    }
}

/// A grid size together with the limits it must stay within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub grid_size: GridSize,
    pub min_grid_size: GridSize,
    pub max_grid_size: GridSize,
}

impl GridBounds {
    /// Build bounds, clamping `grid_size` into `[min, max]`
    pub fn new(grid_size: GridSize, min_grid_size: GridSize, max_grid_size: GridSize) -> Self {
        Self {
            grid_size: grid_size.clamp(min_grid_size, max_grid_size),
            min_grid_size,
            max_grid_size,
        }
    }

    pub fn clamp_size(&self, size: GridSize) -> GridSize {
        size.clamp(self.min_grid_size, self.max_grid_size)
    }

    /// Cells the axis can still grow by
    pub fn expandable_by(&self, axis: Axis) -> u32 {
        self.max_grid_size
            .along(axis)
            .saturating_sub(self.grid_size.along(axis))
    }

    /// Cells the axis can still shrink by
    pub fn reducible_by(&self, axis: Axis) -> u32 {
        self.grid_size
            .along(axis)
            .saturating_sub(self.min_grid_size.along(axis))
    }

    pub fn is_at_max(&self, axis: Axis) -> bool {
        self.grid_size.along(axis) >= self.max_grid_size.along(axis)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.grid_size.contains(position)
    }

    /// Whether `position` lies on the boundary row/column of `edge`
    pub fn is_on_edge(&self, edge: Edge, position: Position) -> bool {
        self.is_at_retreat(edge, position, 0)
    }

    /// Whether `position` lies `retreat` cells inside `edge`
    pub fn is_at_retreat(&self, edge: Edge, position: Position, retreat: u32) -> bool {
        if !self.contains(position) {
            return false;
        }
        let retreat = retreat as i32;
        let width = self.grid_size.width as i32;
        let height = self.grid_size.height as i32;
        match edge {
            Edge::Left => position.x == retreat,
            Edge::Right => position.x == width - 1 - retreat,
            Edge::Top => position.y == retreat,
            Edge::Bottom => position.y == height - 1 - retreat,
        }
    }

    /// Every edge `position` lies on, in `Edge::ALL` order
    pub fn edges_of(&self, position: Position) -> Vec<Edge> {
        Edge::ALL
            .into_iter()
            .filter(|edge| self.is_on_edge(*edge, position))
            .collect()
    }

    /// Positions of the row/column `retreat` cells inside `edge`.
    ///
    /// With no edge, returns the whole ring at that retreat, without
    /// duplicated corners.
    pub fn edge_positions(&self, edge: Option<Edge>, retreat: u32) -> Vec<Position> {
        let Some(edge) = edge else {
            let ring: BTreeSet<Position> = Edge::ALL
                .into_iter()
                .flat_map(|edge| self.edge_positions(Some(edge), retreat))
                .collect();
            return ring.into_iter().collect();
        };

        let GridSize { width, height } = self.grid_size;
        let span = self.grid_size.along(edge.axis());
        if retreat >= span {
            return Vec::new();
        }
        let (width, height, retreat) = (width as i32, height as i32, retreat as i32);
        match edge {
            Edge::Left => (0..height).map(|y| Position::new(retreat, y)).collect(),
            Edge::Right => (0..height)
                .map(|y| Position::new(width - 1 - retreat, y))
                .collect(),
            Edge::Top => (0..width).map(|x| Position::new(x, retreat)).collect(),
            Edge::Bottom => (0..width)
                .map(|x| Position::new(x, height - 1 - retreat))
                .collect(),
        }
    }

    /// The cells within `depth` of `edge`
    pub fn strip_positions(&self, edge: Edge, depth: u32) -> Vec<Position> {
        let depth = depth.min(self.grid_size.along(edge.axis()));
        (0..depth)
            .flat_map(|retreat| self.edge_positions(Some(edge), retreat))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(w: u32, h: u32) -> GridBounds {
        GridBounds::new(
            GridSize::new(w, h),
            GridSize::new(3, 3),
            GridSize::new(10, 10),
        )
    }

    #[test]
    fn test_bounds_clamp_on_creation() {
        let b = GridBounds::new(
            GridSize::new(1, 20),
            GridSize::new(3, 3),
            GridSize::new(10, 10),
        );
        assert_eq!(b.grid_size, GridSize::new(3, 10));
    }

    #[test]
    fn test_expandable_and_reducible() {
        let b = bounds(5, 10);
        assert_eq!(b.expandable_by(Axis::Horizontal), 5);
        assert_eq!(b.expandable_by(Axis::Vertical), 0);
        assert_eq!(b.reducible_by(Axis::Horizontal), 2);
        assert!(b.is_at_max(Axis::Vertical));
        assert!(!b.is_at_max(Axis::Horizontal));
    }

    #[test]
    fn test_edge_positions() {
        let b = bounds(4, 3);
        assert_eq!(
            b.edge_positions(Some(Edge::Right), 1),
            vec![Position::new(2, 0), Position::new(2, 1), Position::new(2, 2)]
        );
        assert_eq!(b.edge_positions(Some(Edge::Top), 0).len(), 4);
        assert!(b.edge_positions(Some(Edge::Top), 3).is_empty());
        // 4x3 ring: 4 + 4 + 1 + 1
        assert_eq!(b.edge_positions(None, 0).len(), 10);
    }

    #[test]
    fn test_edges_of_corner() {
        let b = bounds(4, 4);
        assert_eq!(
            b.edges_of(Position::new(3, 0)),
            vec![Edge::Right, Edge::Top]
        );
        assert!(b.edges_of(Position::new(1, 1)).is_empty());
    }

    #[test]
    fn test_strip_positions() {
        let b = bounds(5, 4);
        let strip = b.strip_positions(Edge::Bottom, 2);
        assert_eq!(strip.len(), 10);
        assert!(strip.iter().all(|p| p.y >= 2));
    }

    #[test]
    fn test_edge_parse_and_display() {
        assert_eq!("Left".parse::<Edge>(), Ok(Edge::Left));
        assert!("up".parse::<Edge>().is_err());
        assert_eq!(Edge::Bottom.to_string(), "bottom");
        assert_eq!(Edge::Top.opposite(), Edge::Bottom);
    }

    #[test]
    fn test_position_serializes_as_pair() {
        let json = serde_json::to_string(&Position::new(2, -1)).unwrap();
        assert_eq!(json, "[2,-1]");
        let size: GridSize = serde_json::from_str("[7,5]").unwrap();
        assert_eq!(size, GridSize::new(7, 5));
    }
}
