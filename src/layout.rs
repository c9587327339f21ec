//! Nail placement on the working circle.
//!
//! Nail 0 sits at the top of the circle in image coordinates (smallest y),
//! and subsequent nails advance clockwise on screen in equal angular
//! increments of `2π / num_nails`. The integer index is the public identity
//! used everywhere downstream; positions never change after generation.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// Parameters for placing nails on the working circle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Number of nails on the circle (>= 3).
    pub num_nails: usize,
    /// Circle radius in pixels (> 0).
    pub radius: f32,
    /// Circle center in pixel coordinates.
    pub center: Point2<f32>,
    /// Coordinate space (width, height) the layout is generated for; the
    /// luminance field handed to the router must match it exactly.
    pub space: (usize, usize),
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            num_nails: 180,
            radius: 400.0,
            center: Point2::new(400.0, 400.0),
            space: (800, 800),
        }
    }
}

/// Immutable nail positions plus the coordinate space they were placed in.
#[derive(Clone, Debug)]
pub struct CircleLayout {
    nails: Vec<Point2<f32>>,
    center: Point2<f32>,
    radius: f32,
    space: (usize, usize),
}

impl CircleLayout {
    /// Place `num_nails` nails on the circle. Pure: the same parameters
    /// always produce the same positions.
    pub fn generate(params: &LayoutParams) -> Result<Self, RouteError> {
        if params.num_nails < 3 {
            return Err(RouteError::config(format!(
                "num_nails must be >= 3, got {}",
                params.num_nails
            )));
        }
        if !(params.radius > 0.0) {
            return Err(RouteError::config(format!(
                "radius must be positive, got {}",
                params.radius
            )));
        }
        if params.space.0 == 0 || params.space.1 == 0 {
            return Err(RouteError::config(format!(
                "coordinate space must be non-empty, got {}x{}",
                params.space.0, params.space.1
            )));
        }

        let step = std::f32::consts::TAU / params.num_nails as f32;
        let nails = (0..params.num_nails)
            .map(|i| {
                // -pi/2 puts nail 0 at the top with y growing downward.
                let angle = -std::f32::consts::FRAC_PI_2 + step * i as f32;
                Point2::new(
                    params.center.x + params.radius * angle.cos(),
                    params.center.y + params.radius * angle.sin(),
                )
            })
            .collect();

        Ok(Self {
            nails,
            center: params.center,
            radius: params.radius,
            space: params.space,
        })
    }

    /// Number of nails.
    pub fn len(&self) -> usize {
        self.nails.len()
    }

    /// True when the layout holds no nails (never after `generate`).
    pub fn is_empty(&self) -> bool {
        self.nails.is_empty()
    }

    /// Position of nail `index`.
    #[inline]
    pub fn nail(&self, index: usize) -> Point2<f32> {
        self.nails[index]
    }

    /// All nail positions in index order.
    pub fn nails(&self) -> &[Point2<f32>] {
        &self.nails
    }

    /// Nail position truncated to integer pixel coordinates.
    #[inline]
    pub fn nail_px(&self, index: usize) -> (i32, i32) {
        let p = self.nails[index];
        (p.x as i32, p.y as i32)
    }

    /// Circle center.
    pub fn center(&self) -> Point2<f32> {
        self.center
    }

    /// Circle radius in pixels.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Coordinate space (width, height) the layout was generated for.
    pub fn space(&self) -> (usize, usize) {
        self.space
    }
}
