//! Canvas view transform (scale and translate).

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mapping from content space to screen space:
/// `screen = content * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub translate: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    pub fn new(scale: f64, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    /// Affine that converts content coordinates to screen coordinates.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    /// Convert a content point to screen coordinates.
    pub fn to_screen(&self, content: Point) -> Point {
        (content.to_vec2() * self.scale + self.translate).to_point()
    }

    /// Convert a screen point to content coordinates.
    pub fn to_content(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.translate) / self.scale).to_point()
    }

    /// Convert a screen-space distance to content space.
    pub fn screen_dist_to_content(&self, distance: f64) -> f64 {
        distance / self.scale
    }
}

/// Rejected scale band bounds.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScaleBandError {
    #[error("scale bounds must be finite and positive (min = {min}, max = {max})")]
    NotPositive { min: f64, max: f64 },
    #[error("scale band min {min} is greater than max {max}")]
    Inverted { min: f64, max: f64 },
}

/// Allowed range for the canvas scale.
///
/// Always satisfies `0 < min <= max`; configs that break this are rejected
/// when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScaleBand")]
pub struct ScaleBand {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawScaleBand {
    min: f64,
    max: f64,
}

impl TryFrom<RawScaleBand> for ScaleBand {
    type Error = ScaleBandError;

    fn try_from(raw: RawScaleBand) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl Default for ScaleBand {
    fn default() -> Self {
        Self { min: 0.1, max: 10.0 }
    }
}

impl ScaleBand {
    pub fn new(min: f64, max: f64) -> Result<Self, ScaleBandError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(min) || !positive(max) {
            return Err(ScaleBandError::NotPositive { min, max });
        }
        if min > max {
            return Err(ScaleBandError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    /// A band that only allows one scale (zoom disabled).
    pub fn fixed(scale: f64) -> Result<Self, ScaleBandError> {
        Self::new(scale, scale)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        if !scale.is_finite() || scale <= 0.0 {
            return self.min;
        }
        scale.clamp(self.min, self.max)
    }

    /// Whether the band leaves any room to zoom.
    pub fn allows_zoom(&self) -> bool {
        self.max - self.min > f64::EPSILON
    }
}

/// Holds the transform of one mounted canvas.
///
/// Every write goes through [`TransformState::set`], which clamps the scale to
/// the band, so no writer can leave the canvas outside of it.
#[derive(Debug, Clone, Default)]
pub struct TransformState {
    current: Transform,
    band: ScaleBand,
}

impl TransformState {
    pub fn new(band: ScaleBand) -> Self {
        Self::with_transform(Transform::IDENTITY, band)
    }

    pub fn with_transform(transform: Transform, band: ScaleBand) -> Self {
        let mut state = Self {
            current: Transform::IDENTITY,
            band,
        };
        state.set(transform);
        state
    }

    pub fn get(&self) -> Transform {
        self.current
    }

    pub fn band(&self) -> ScaleBand {
        self.band
    }

    pub fn scale(&self) -> f64 {
        self.current.scale
    }

    /// Replace the transform, clamping the scale to the band.
    pub fn set(&mut self, transform: Transform) {
        self.current = Transform {
            scale: self.band.clamp(transform.scale),
            translate: transform.translate,
        };
    }

    /// Compute the next transform from the current one.
    pub fn update(&mut self, updater: impl FnOnce(Transform) -> Transform) {
        let next = updater(self.current);
        self.set(next);
    }

    /// Reset to identity (explicit user action only).
    pub fn reset(&mut self) {
        self.set(Transform::IDENTITY);
    }

    /// Zoom and center so `bounds` fits in `viewport` with `padding` on each side.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale = self
            .band
            .clamp((padded.width / bounds.width()).min(padded.height / bounds.height()));

        let center = bounds.center();
        self.set(Transform::new(
            scale,
            Vec2::new(
                viewport.width / 2.0 - center.x * scale,
                viewport.height / 2.0 - center.y * scale,
            ),
        ));
    }
}
