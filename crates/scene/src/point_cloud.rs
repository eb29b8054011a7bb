use foundation::bounds::Aabb3;
use foundation::color::Rgb;
use foundation::math::{Vec2, Vec3};

use crate::spatial::{Bvh, Item as BvhItem};

/// Draw and pick parameters of one point cloud.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointStyle {
    /// World-space point size (attenuated with distance when drawn).
    pub size: f64,
    /// Maximum ray-to-point distance that still counts as a hit.
    pub pick_threshold: f64,
}

impl PointStyle {
    pub fn new(size: f64, pick_threshold: f64) -> Self {
        Self {
            size,
            pick_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointCloudError {
    LengthMismatch { points: usize, colors: usize },
    NonFinite { index: usize },
}

impl std::fmt::Display for PointCloudError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointCloudError::LengthMismatch { points, colors } => {
                write!(f, "point cloud has {points} points but {colors} colors")
            }
            PointCloudError::NonFinite { index } => {
                write!(f, "point {index} has a non-finite coordinate")
            }
        }
    }
}

impl std::error::Error for PointCloudError {}

/// A pickable point-cloud primitive.
///
/// Point `i` of the cloud is its local index `i`; the cloud knows nothing
/// about what the points stand for.
#[derive(Debug, Clone)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    colors: Vec<Rgb>,
    style: PointStyle,
    bvh: Bvh,
}

impl PointCloud {
    pub fn new(positions: Vec<Vec3>, colors: Vec<Rgb>, style: PointStyle) -> Result<Self, PointCloudError> {
        if positions.len() != colors.len() {
            return Err(PointCloudError::LengthMismatch {
                points: positions.len(),
                colors: colors.len(),
            });
        }
        if let Some(index) = positions
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(PointCloudError::NonFinite { index });
        }

        let items = positions
            .iter()
            .enumerate()
            .map(|(i, p)| BvhItem {
                index: i as u32,
                bounds: Aabb3::around(p.to_array(), style.pick_threshold),
            })
            .collect();

        Ok(Self {
            positions,
            colors,
            style,
            bvh: Bvh::build(items),
        })
    }

    pub fn empty(style: PointStyle) -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            style,
            bvh: Bvh::build(Vec::new()),
        }
    }

    pub fn from_points(points: &[[f64; 3]], colors: Vec<Rgb>, style: PointStyle) -> Result<Self, PointCloudError> {
        Self::new(points.iter().copied().map(Vec3::from_array).collect(), colors, style)
    }

    /// Planar input is placed on the `z = 0` plane.
    pub fn from_planar(points: &[[f64; 2]], colors: Vec<Rgb>, style: PointStyle) -> Result<Self, PointCloudError> {
        Self::new(
            points.iter().map(|p| Vec2::new(p[0], p[1]).extend(0.0)).collect(),
            colors,
            style,
        )
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn style(&self) -> PointStyle {
        self.style
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub(crate) fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Flat `xyz` buffer, 3 floats per point.
    pub fn position_buffer(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Flat `rgb` buffer, 3 floats per point.
    pub fn color_buffer(&self) -> Vec<f32> {
        self.colors.iter().flat_map(|c| c.to_array()).collect()
    }
}
