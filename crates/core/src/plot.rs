//! Geometry of the A-scan drawing: curve, time axis, gates and peaks.
//!
//! Coordinates are canvas pixels with the origin at the top-left corner.
//! Nothing is rasterised here; a renderer only has to stroke the segments.

use crate::gate::{threshold_offset, GateConfig};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Horizontal margin on both sides of the plot
pub const OFFSET_X: f64 = 5.0;
/// Vertical margin, room for the time axis at the bottom
pub const OFFSET_Y: f64 = 25.0;
const AXIS_GAP: f64 = 2.0;
const TICK_LENGTH: f64 = 5.0;
const TICK_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

/// Graduation of the time axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub mark: Segment,
    pub label_at: Point,
    pub label: String,
}

/// Threshold line of a gate and the dashed line through its peak
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateMarker {
    pub threshold: Segment,
    pub peak: Option<Segment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotGeometry {
    pub curve: Vec<Point>,
    pub axis: Option<Segment>,
    pub ticks: Vec<AxisTick>,
    pub gates: Vec<GateMarker>,
}

/// Canvas size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasLayout {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 528.0,
        }
    }
}

impl CanvasLayout {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !width.is_finite() || width <= 2.0 * OFFSET_X {
            return Err(CoreError::InvalidParameter {
                msg: format!("Canvas width too small: {}", width),
            });
        }
        if !height.is_finite() || height <= 2.0 * OFFSET_Y {
            return Err(CoreError::InvalidParameter {
                msg: format!("Canvas height too small: {}", height),
            });
        }

        Ok(Self { width, height })
    }

    /// Canvas filling a container: 28 px of padding, 2:3 aspect ratio
    pub fn from_container_width(container_width: f64) -> Result<Self> {
        let width = (container_width - 28.0).trunc();
        Self::new(width, (width * 0.66).trunc())
    }

    /// Lay out the curve and the gate markers.
    ///
    /// `gates` pairs each gate with the peak found in it; `total_us` is the
    /// capture duration covered by `points`.
    pub fn geometry(&self, points: &[u32], total_us: f64, gates: &[(GateConfig, Option<usize>)]) -> PlotGeometry {
        if points.is_empty() {
            return PlotGeometry::default();
        }

        let (w, h) = (self.width, self.height);
        let len = points.len() as f64;
        let d_hor = (w - OFFSET_X * 2.0) / len;
        let max = points.iter().copied().max().unwrap_or(0);
        let d_vert = if max > 0 {
            (h - OFFSET_Y * 2.0) / f64::from(max)
        } else {
            0.0
        };
        let baseline = h - OFFSET_Y;
        let x_at = |index: f64| OFFSET_X + index * d_hor;

        // one point per pixel column at most
        let step = ((len / w).floor() as usize).max(1);
        let mut curve = vec![Point::new(OFFSET_X, baseline)];
        curve.extend(
            points
                .iter()
                .enumerate()
                .skip(1)
                .step_by(step)
                .map(|(p, &v)| Point::new(x_at(p as f64), baseline - f64::from(v) * d_vert)),
        );

        let axis_y = baseline + AXIS_GAP;
        let axis = Segment::new(Point::new(OFFSET_X, axis_y), Point::new(w - OFFSET_X, axis_y));

        let mut ticks = Vec::with_capacity(TICK_COUNT + 1);
        let mut elapsed = 0.0;
        for p in 0..=TICK_COUNT {
            let x = OFFSET_X + p as f64 * ((w - OFFSET_X) / TICK_COUNT as f64);
            let label = if elapsed == 0.0 {
                "(µs)".to_string()
            } else {
                format!("{}", (elapsed + 0.5_f64).floor())
            };
            ticks.push(AxisTick {
                mark: Segment::new(Point::new(x, axis_y + TICK_LENGTH), Point::new(x, axis_y)),
                label_at: Point::new(OFFSET_X - 4.0 + p as f64 * (w / TICK_COUNT as f64), h - 10.0),
                label,
            });
            elapsed += total_us / TICK_COUNT as f64;
        }

        let gates = gates
            .iter()
            .map(|(gate, peak)| {
                let id_start = gate.start_us / total_us * len;
                let id_end = (gate.start_us + gate.width_us) / total_us * len;
                let y = threshold_offset(h, OFFSET_Y, gate.threshold_percent);
                GateMarker {
                    threshold: Segment::new(Point::new(x_at(id_start), y), Point::new(x_at(id_end), y)),
                    peak: peak.map(|p| {
                        let x = x_at(p as f64);
                        Segment::new(Point::new(x, baseline), Point::new(x, 0.0))
                    }),
                }
            })
            .collect();

        PlotGeometry {
            curve,
            axis: Some(axis),
            ticks,
            gates,
        }
    }
}
