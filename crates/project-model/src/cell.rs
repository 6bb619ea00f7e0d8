//! Per-cell visual properties and their partial updates.

use collage_layout::Rect;
use serde::{Deserialize, Serialize};

/// Smallest zoom or scale factor accepted.
pub const MIN_FACTOR: f64 = 0.01;

/// Allowed range for free-flow width and height percentages.
pub const SIZE_PERCENT_RANGE: (f64, f64) = (10.0, 200.0);

/// Allowed range for free-flow offset percentages.
pub const OFFSET_PERCENT_RANGE: (f64, f64) = (-100.0, 100.0);

/// Visual manipulation applied to a cell's media.
///
/// `zoom` magnifies the viewport onto the media and `scale` is the media's
/// intrinsic scale; both multiply into the final size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    pub zoom: f64,
    /// Horizontal pan in pixels.
    pub offset_x: f64,
    /// Vertical pan in pixels.
    pub offset_y: f64,
    /// Rotation in degrees, unbounded.
    pub rotation: f64,
    pub scale: f64,
    /// Corner radius in pixels.
    pub border_radius: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation: 0.0,
            scale: 1.0,
            border_radius: 0.0,
        }
    }
}

impl Transform {
    /// Combined magnification of zoom and scale.
    pub fn magnification(&self) -> f64 {
        self.zoom * self.scale
    }

    /// Rotation normalized into `[0, 360)`.
    pub fn display_rotation(&self) -> f64 {
        self.rotation.rem_euclid(360.0)
    }

    /// Merge a partial update, clamping values into their valid ranges.
    pub fn apply(&mut self, patch: &TransformPatch) {
        if let Some(zoom) = patch.zoom {
            self.zoom = zoom.max(MIN_FACTOR);
        }
        if let Some(x) = patch.offset_x {
            self.offset_x = x;
        }
        if let Some(y) = patch.offset_y {
            self.offset_y = y;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale.max(MIN_FACTOR);
        }
        if let Some(radius) = patch.border_radius {
            self.border_radius = radius.max(0.0);
        }
    }
}

/// A partial [`Transform`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
}

impl TransformPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Free-flow rectangle of a cell, in percent of its grid area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridPercentage {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for GridPercentage {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl GridPercentage {
    /// Merge a partial update, clamping values into their valid ranges.
    pub fn apply(&mut self, patch: &GridPercentagePatch) {
        let (size_min, size_max) = SIZE_PERCENT_RANGE;
        let (offset_min, offset_max) = OFFSET_PERCENT_RANGE;
        if let Some(width) = patch.width {
            self.width = width.clamp(size_min, size_max);
        }
        if let Some(height) = patch.height {
            self.height = height.clamp(size_min, size_max);
        }
        if let Some(x) = patch.offset_x {
            self.offset_x = x.clamp(offset_min, offset_max);
        }
        if let Some(y) = patch.offset_y {
            self.offset_y = y.clamp(offset_min, offset_max);
        }
    }

    /// Resolve against the cell's grid rectangle.
    pub fn resolve(&self, cell: &Rect) -> Rect {
        cell.percent_rect(self.width, self.height, self.offset_x, self.offset_y)
    }
}

/// A partial [`GridPercentage`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridPercentagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
}

impl GridPercentagePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
