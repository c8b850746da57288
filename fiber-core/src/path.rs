//! Path descriptors: the geometry and animation parameters of one fiber.

use serde::{Deserialize, Serialize};

use crate::Point;

/// A single point on a fiber path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within its path.
    pub id: String,
    /// Position in canvas pixel space.
    pub position: Point,
    /// Whether the node is inside the lit segment.
    pub is_active: bool,
    /// Current glow brightness (0.0 to 1.0).
    pub intensity: f64,
    /// Pulse phase in radians, kept in `[0, 2π)`.
    pub pulse_phase: f64,
    /// Visual weight multiplier (0.5 to 1.0).
    pub connection_strength: f64,
}

impl Node {
    /// Create an unlit node.
    #[must_use]
    pub fn new(id: String, position: Point, pulse_phase: f64, connection_strength: f64) -> Self {
        Self {
            id,
            position,
            is_active: false,
            intensity: 0.0,
            pulse_phase,
            connection_strength,
        }
    }
}

/// Directional class of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Wavy row across the viewport.
    Horizontal,
    /// Straight interpolation between two points.
    Diagonal,
    /// Points around a circle.
    Curved,
}

/// Whether a path is a main strand or a connecting branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// Long strand spanning the viewport.
    Main,
    /// Short connector between regions.
    Branch,
}

/// Layout parameters that produced a path's node positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PathLayout {
    /// Sinusoidal row.
    Horizontal {
        /// Row height before the wave is applied.
        baseline_y: f64,
        /// Wave phase offset in radians.
        wave_phase: f64,
        /// Wave amplitude in pixels.
        amplitude: f64,
    },
    /// Straight line from `start` to `end`.
    Diagonal {
        /// First endpoint.
        start: Point,
        /// Second endpoint.
        end: Point,
    },
    /// Circle around the viewport centre.
    Curved {
        /// Circle centre.
        center: Point,
        /// Circle radius.
        radius: f64,
        /// Angular offset in radians.
        angular_offset: f64,
    },
    /// Ray from a grid point.
    Branch {
        /// Ray start.
        origin: Point,
        /// Ray angle in radians.
        angle: f64,
        /// Ray length in pixels.
        length: f64,
    },
}

impl PathLayout {
    /// Directional class of this layout.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Horizontal { .. } => Direction::Horizontal,
            Self::Diagonal { .. } | Self::Branch { .. } => Direction::Diagonal,
            Self::Curved { .. } => Direction::Curved,
        }
    }
}

/// Geometry plus animation parameters for one fiber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDescriptor {
    /// Path identifier.
    pub id: String,
    /// Nodes in traversal order.
    pub nodes: Vec<Node>,
    /// Directional class.
    pub direction: Direction,
    /// Layout parameters.
    pub layout: PathLayout,
    /// Progress units per frame.
    pub speed: f64,
    /// Stroke color (CSS color string).
    pub color: String,
    /// Stroke width in pixels.
    pub width: f64,
    /// First node of the lit segment.
    pub active_segment_index: usize,
    /// Number of nodes in the lit segment.
    pub segment_length: usize,
    /// Main strand or branch.
    pub kind: PathKind,
    /// Depth hint carried for consumers. The host does not sort by it:
    /// fibers are drawn in construction order.
    pub layer: u8,
    /// Base opacity.
    pub opacity: f64,
    /// Glow strength multiplier.
    pub glow_intensity: f64,
}

impl PathDescriptor {
    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of valid active-segment start positions, never zero.
    #[must_use]
    pub fn segment_range(&self) -> usize {
        segment_range(self.nodes.len(), self.segment_length)
    }

    /// Check the segment invariants.
    #[must_use]
    pub fn segment_is_valid(&self) -> bool {
        self.segment_length <= self.nodes.len()
            && self.active_segment_index < self.segment_range()
    }

    /// Node positions in traversal order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.nodes.iter().map(|n| n.position)
    }
}

/// `max(node_count - segment_length, 1)` without underflow.
#[must_use]
pub fn segment_range(node_count: usize, segment_length: usize) -> usize {
    node_count.saturating_sub(segment_length).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_range_never_zero() {
        assert_eq!(segment_range(0, 0), 1);
        assert_eq!(segment_range(5, 18), 1);
        assert_eq!(segment_range(20, 18), 2);
    }

    #[test]
    fn test_layout_direction() {
        let branch = PathLayout::Branch {
            origin: Point::default(),
            angle: 0.0,
            length: 10.0,
        };
        assert_eq!(branch.direction(), Direction::Diagonal);
    }

    #[test]
    fn test_enum_serialization_is_lowercase() {
        let json = serde_json::to_string(&PathKind::Branch).expect("serialize");
        assert_eq!(json, "\"branch\"");
        let json = serde_json::to_string(&Direction::Curved).expect("serialize");
        assert_eq!(json, "\"curved\"");
    }
}
