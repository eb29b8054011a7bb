//! Camera model.
//!
//! Conventions follow the usual right-handed GL camera: the camera looks down
//! its local `-Z` axis with `+Y` up, and orientation is stored as XYZ Euler
//! angles in radians.

use foundation::math::Vec3;
use runtime::window::{ScreenPos, Viewport};

use crate::picking::Ray;

/// Row-major 3x3 rotation.
pub type Mat3 = [[f64; 3]; 3];

/// Snapshot of a camera: position, XYZ Euler rotation (radians) and an
/// optional zoom factor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub zoom: Option<f64>,
}

impl CameraPose {
    pub fn new(position: [f64; 3], rotation: [f64; 3]) -> Self {
        Self {
            position,
            rotation,
            zoom: None,
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        let close = |a: [f64; 3], b: [f64; 3]| (0..3).all(|i| (a[i] - b[i]).abs() <= eps);
        close(self.position, other.position)
            && close(self.rotation, other.rotation)
            && match (self.zoom, other.zoom) {
                (None, None) => true,
                (Some(a), Some(b)) => (a - b).abs() <= eps,
                _ => false,
            }
    }
}

pub fn rotation_from_euler_xyz(e: [f64; 3]) -> Mat3 {
    let (b, a) = e[0].sin_cos();
    let (d, c) = e[1].sin_cos();
    let (f, ee) = e[2].sin_cos();

    let ae = a * ee;
    let af = a * f;
    let be = b * ee;
    let bf = b * f;

    [
        [c * ee, -c * f, d],
        [af + be * d, ae - bf * d, -b * c],
        [bf - ae * d, be + af * d, a * c],
    ]
}

pub fn euler_xyz_from_rotation(m: &Mat3) -> [f64; 3] {
    let m13 = m[0][2].clamp(-1.0, 1.0);
    let y = m13.asin();
    if m13.abs() < 0.999_999_9 {
        [(-m[1][2]).atan2(m[2][2]), y, (-m[0][1]).atan2(m[0][0])]
    } else {
        [m[2][1].atan2(m[1][1]), y, 0.0]
    }
}

/// Rotation that points the camera's `-Z` axis from `eye` towards `target`.
pub fn look_at_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Mat3 {
    let mut z = (eye - target).normalized().unwrap_or(Vec3::new(0.0, 0.0, 1.0));
    let x = match up.cross(z).normalized() {
        Some(x) => x,
        None => {
            // `up` and the view direction are parallel; nudge off the pole.
            if up.z.abs() == 1.0 {
                z.x += 1e-4;
            } else {
                z.z += 1e-4;
            }
            z = z.normalized().unwrap_or(Vec3::new(0.0, 0.0, 1.0));
            up.cross(z).normalized().unwrap_or(Vec3::new(1.0, 0.0, 0.0))
        }
    };
    let y = z.cross(x);

    [[x.x, y.x, z.x], [x.y, y.y, z.y], [x.z, y.z, z.z]]
}

pub fn mul_mat3(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

fn mul_mat3_transpose(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub pose: CameraPose,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    pub const DEFAULT_NEAR: f64 = 0.1;
    pub const DEFAULT_FAR: f64 = 1000.0;

    pub fn new(pose: CameraPose, fov_y_deg: f64) -> Self {
        Self {
            pose,
            fov_y_deg,
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.pose.eye()
    }

    pub fn rotation(&self) -> Mat3 {
        rotation_from_euler_xyz(self.pose.rotation)
    }

    pub fn forward(&self) -> Vec3 {
        mul_mat3(&self.rotation(), Vec3::new(0.0, 0.0, -1.0))
    }

    fn half_extent(&self) -> f64 {
        let zoom = self.pose.zoom.filter(|z| *z > 0.0).unwrap_or(1.0);
        (self.fov_y_deg.to_radians() * 0.5).tan() / zoom
    }

    /// Picking ray from the eye through pixel `pos`.
    pub fn ray_through(&self, pos: ScreenPos, viewport: Viewport) -> Option<Ray> {
        let (nx, ny) = viewport.to_ndc(pos);
        let h = self.half_extent();
        let local = Vec3::new(nx * h * viewport.aspect(), ny * h, -1.0);
        let dir = mul_mat3(&self.rotation(), local).normalized()?;
        Some(Ray::new(self.eye(), dir))
    }

    /// Pixel position of `world`, or `None` when it is behind the camera.
    pub fn project(&self, world: Vec3, viewport: Viewport) -> Option<ScreenPos> {
        let local = mul_mat3_transpose(&self.rotation(), world - self.eye());
        if local.z >= 0.0 {
            return None;
        }
        let h = self.half_extent();
        let depth = -local.z;
        let nx = local.x / (depth * h * viewport.aspect());
        let ny = local.y / (depth * h);
        Some(ScreenPos::new(
            (nx + 1.0) * 0.5 * viewport.width,
            (1.0 - ny) * 0.5 * viewport.height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::precision::approx_eq;

    fn vec_close(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x, 1e-9) && approx_eq(a.y, b.y, 1e-9) && approx_eq(a.z, b.z, 1e-9)
    }

    #[test]
    fn identity_camera_looks_down_negative_z() {
        let cam = PerspectiveCamera::new(CameraPose::new([0.0, 0.0, 2.0], [0.0; 3]), 50.0);
        assert!(vec_close(cam.forward(), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn euler_round_trips_through_matrix() {
        let e = [0.3, -0.7, 1.1];
        let back = euler_xyz_from_rotation(&rotation_from_euler_xyz(e));
        for i in 0..3 {
            assert!(approx_eq(e[i], back[i], 1e-9), "{e:?} vs {back:?}");
        }
    }

    #[test]
    fn look_at_straight_ahead_is_zero_rotation() {
        let m = look_at_rotation(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::UP);
        let e = euler_xyz_from_rotation(&m);
        for v in e {
            assert!(approx_eq(v, 0.0, 1e-12));
        }
    }

    #[test]
    fn look_at_handles_parallel_up() {
        let m = look_at_rotation(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::UP);
        let fwd = mul_mat3(&m, Vec3::new(0.0, 0.0, -1.0));
        assert!(fwd.y < -0.99);
    }

    #[test]
    fn center_ray_follows_forward() {
        let m = look_at_rotation(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO, Vec3::UP);
        let pose = CameraPose::new([3.0, 4.0, 5.0], euler_xyz_from_rotation(&m));
        let cam = PerspectiveCamera::new(pose, 75.0);
        let vp = Viewport::new(800.0, 600.0);
        let ray = cam.ray_through(ScreenPos::new(400.0, 300.0), vp).expect("ray");
        assert!(vec_close(ray.dir, cam.forward()));
    }

    #[test]
    fn projected_point_is_on_its_ray() {
        let cam = PerspectiveCamera::new(CameraPose::new([1.0, 2.0, 10.0], [0.1, 0.2, 0.0]), 60.0);
        let vp = Viewport::new(1024.0, 768.0);
        let p = Vec3::new(0.5, 1.5, 0.0);
        let px = cam.project(p, vp).expect("in front");
        let ray = cam.ray_through(px, vp).expect("ray");
        let t = (p - ray.origin).dot(ray.dir);
        assert!(vec_close(ray.at(t), p));
    }

    #[test]
    fn zoom_narrows_the_frustum() {
        let base = CameraPose::new([0.0, 0.0, 2.0], [0.0; 3]);
        let vp = Viewport::new(100.0, 100.0);
        let p = Vec3::new(0.2, 0.0, 0.0);
        let wide = PerspectiveCamera::new(base, 50.0).project(p, vp).expect("wide");
        let tight = PerspectiveCamera::new(base.with_zoom(2.0), 50.0).project(p, vp).expect("tight");
        assert!(tight.x - 50.0 > wide.x - 50.0);
    }

    #[test]
    fn behind_camera_does_not_project() {
        let cam = PerspectiveCamera::new(CameraPose::new([0.0, 0.0, 2.0], [0.0; 3]), 50.0);
        assert_eq!(cam.project(Vec3::new(0.0, 0.0, 5.0), Viewport::default()), None);
    }

    #[test]
    fn pose_approx_eq_respects_zoom() {
        let a = CameraPose::new([1.0, 2.0, 3.0], [0.0; 3]);
        assert!(a.approx_eq(&a, 0.0));
        assert!(!a.approx_eq(&a.with_zoom(1.0), 1e-9));
    }
}
