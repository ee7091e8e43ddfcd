use std::fmt;
use std::str::FromStr;

/// Shape to draw above a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A cube standing on the marker.
    Cube,
    /// A pentagonal prism standing on the marker.
    Prism5,
    /// A pyramid with its apex above the marker center.
    Pyramid,
    /// An upside-down pyramid, apex on the marker center.
    PyramidInv,
    /// A pyramid lying on its side, ridge above one marker edge.
    PyramidSide,
}

impl Shape {
    /// All shapes, in catalogue order.
    pub const ALL: [Shape; 5] = [
        Shape::Cube,
        Shape::Pyramid,
        Shape::PyramidInv,
        Shape::PyramidSide,
        Shape::Prism5,
    ];

    /// The next shape in the catalogue, wrapping around.
    pub fn next(self) -> Shape {
        let index = Shape::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default();
        Shape::ALL[(index + 1) % Shape::ALL.len()]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Cube => "cube",
            Shape::Prism5 => "prism",
            Shape::Pyramid => "pyramid",
            Shape::PyramidInv => "pyramid-inv",
            Shape::PyramidSide => "pyramid-side",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cube" => Ok(Shape::Cube),
            "prism" => Ok(Shape::Prism5),
            "pyramid" => Ok(Shape::Pyramid),
            "pyramid-inv" => Ok(Shape::PyramidInv),
            "pyramid-side" => Ok(Shape::PyramidSide),
            _ => Err(format!("unknown shape \"{value}\"")),
        }
    }
}

/// The fixed marker-id to shape assignment.
pub fn shape_for_id(id: u16) -> Shape {
    Shape::ALL[id as usize % Shape::ALL.len()]
}
