use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::point_cloud::PointCloud;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointHit {
    /// Local index of the point within its cloud.
    pub index: usize,
    /// Distance from the ray origin to the closest approach.
    pub distance: f64,
    /// Perpendicular distance between the ray and the point.
    pub miss_distance: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub near: f64,
    pub far: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: 1.0e30,
        }
    }
}

/// Deterministic ray picking against a point cloud.
///
/// A point is hit when the ray passes within the cloud's pick threshold of
/// it, in front of the origin and inside `[near, far]`.
///
/// Ordering contract:
/// - The hit closest to the ray origin wins.
/// - Equal distances resolve to the lower local index.
pub fn pick_points(cloud: &PointCloud, ray: Ray, opts: PickOptions) -> Option<PointHit> {
    let dir = ray.dir.normalized()?;
    let threshold = cloud.style().pick_threshold;
    let origin = ray.origin.to_array();

    let mut best: Option<PointHit> = None;
    for idx in cloud.bvh().query_ray(origin, dir.to_array(), 0.0, opts.far + threshold) {
        let index = idx as usize;
        let Some(p) = cloud.position(index) else {
            continue;
        };

        let t = (p - ray.origin).dot(dir);
        if t < 0.0 {
            continue;
        }
        let miss_distance = (ray.origin + dir * t - p).length();
        if miss_distance > threshold || t < opts.near || t > opts.far {
            continue;
        }

        let hit = PointHit {
            index,
            distance: t,
            miss_distance,
        };
        best = match best {
            None => Some(hit),
            Some(b) => {
                let ord = stable_total_cmp_f64(hit.distance, b.distance).then_with(|| hit.index.cmp(&b.index));
                if ord.is_lt() { Some(hit) } else { Some(b) }
            }
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick_points};
    use crate::point_cloud::{PointCloud, PointStyle};
    use foundation::color::Rgb;
    use foundation::math::Vec3;

    fn cloud(points: &[[f64; 3]], threshold: f64) -> PointCloud {
        PointCloud::from_points(points, vec![Rgb::BLACK; points.len()], PointStyle::new(0.1, threshold))
            .expect("cloud")
    }

    #[test]
    fn ray_picks_nearest_hit() {
        let c = cloud(&[[10.0, 0.0, 0.0], [5.0, 0.0, 0.0]], 0.1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = pick_points(&c, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.index, 1);
        assert_eq!(hit.distance, 5.0);
    }

    #[test]
    fn tie_breaks_by_local_index() {
        let c = cloud(&[[5.0, 0.0, 0.0], [5.0, 0.0, 0.0]], 0.1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let hit = pick_points(&c, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn threshold_limits_hit_radius() {
        let c = cloud(&[[5.0, 0.08, 0.0]], 0.05);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pick_points(&c, ray, PickOptions::default()), None);

        let wide = cloud(&[[5.0, 0.08, 0.0]], 0.1);
        let hit = pick_points(&wide, ray, PickOptions::default()).expect("hit");
        assert!((hit.miss_distance - 0.08).abs() < 1e-12);
    }

    #[test]
    fn points_behind_origin_are_ignored() {
        let c = cloud(&[[-3.0, 0.0, 0.0]], 0.1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pick_points(&c, ray, PickOptions::default()), None);
    }

    #[test]
    fn far_plane_clips_hits() {
        let c = cloud(&[[50.0, 0.0, 0.0]], 0.1);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let opts = PickOptions { near: 0.0, far: 10.0 };
        assert_eq!(pick_points(&c, ray, opts), None);
    }

    #[test]
    fn zero_direction_never_hits() {
        let c = cloud(&[[0.0, 0.0, 0.0]], 0.1);
        assert_eq!(pick_points(&c, Ray::new(Vec3::ZERO, Vec3::ZERO), PickOptions::default()), None);
    }
}
