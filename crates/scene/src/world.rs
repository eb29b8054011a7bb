use crate::axes::Axes;
use crate::components::Transform;
use crate::point_cloud::PointCloud;

/// Everything one view draws in a frame, borrowed from the view that owns it.
#[derive(Debug, Default)]
pub struct World<'a> {
    point_clouds: Vec<&'a PointCloud>,
    axes: Vec<(Transform, &'a Axes)>,
}

impl<'a> World<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point_cloud(&mut self, cloud: &'a PointCloud) -> &mut Self {
        self.point_clouds.push(cloud);
        self
    }

    pub fn add_axes(&mut self, transform: Transform, axes: &'a Axes) -> &mut Self {
        self.axes.push((transform, axes));
        self
    }

    pub fn point_clouds(&self) -> &[&'a PointCloud] {
        &self.point_clouds
    }

    pub fn axes(&self) -> &[(Transform, &'a Axes)] {
        &self.axes
    }

    pub fn point_count(&self) -> usize {
        self.point_clouds.iter().map(|c| c.len()).sum()
    }
}
