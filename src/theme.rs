use crate::types::Attributes;
use serde::{Deserialize, Serialize};

/// Default presentation applied underneath each shape's own style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
}

impl Theme {
    /// Contributes nothing; shapes render with exactly the style they carry.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self {
            fill: Some("#F8FAFF".to_string()),
            stroke: Some("#7A8AA6".to_string()),
            stroke_width: Some(1.4),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "plain" | "default" | "none" => Some(Self::plain()),
            _ => None,
        }
    }

    /// Style entries for closed shapes (circles, rectangles).
    pub fn shape_style(&self) -> Attributes {
        let mut style = self.stroke_style();
        if let Some(fill) = &self.fill {
            style.insert("fill", fill.clone());
        }
        style
    }

    /// Style entries for open strokes (lines, paths); no fill.
    pub fn stroke_style(&self) -> Attributes {
        let mut style = Attributes::new();
        if let Some(stroke) = &self.stroke {
            style.insert("stroke", stroke.clone());
        }
        if let Some(width) = self.stroke_width {
            style.insert("stroke-width", ryu_js::Buffer::new().format(width).to_string());
        }
        style
    }
}
