//! Target-centered orbit camera.
//!
//! The camera sits on a sphere around `target` described by yaw, pitch and
//! distance, and always looks at the target. Its reported pose carries the
//! XYZ Euler rotation of that look-at frame, so a pose captured from one
//! orbit camera can be fed back into [`OrbitCamera::from_pose`] to restore
//! the exact view, wherever panning has moved the target since.

use foundation::math::Vec3;

use crate::camera::{CameraPose, Mat3, PerspectiveCamera, euler_xyz_from_rotation, look_at_rotation};

const PITCH_LIMIT: f64 = std::f64::consts::FRAC_PI_2 - 1e-6;
const MIN_RESTORE_DEPTH: f64 = 1e-3;

/// Which user gestures the camera honors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrbitControls {
    pub rotate: bool,
    pub pan: bool,
    pub zoom: bool,
}

impl OrbitControls {
    pub fn all() -> Self {
        Self {
            rotate: true,
            pan: true,
            zoom: true,
        }
    }

    /// Pan and zoom only, for flat scenes.
    pub fn planar() -> Self {
        Self {
            rotate: false,
            pan: true,
            zoom: true,
        }
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    target: Vec3,
    yaw_rad: f64,
    pitch_rad: f64,
    distance: f64,
    zoom: Option<f64>,
    fov_y_deg: f64,
    controls: OrbitControls,
    min_distance: f64,
    max_distance: f64,
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3, fov_y_deg: f64) -> Self {
        let mut cam = Self {
            target,
            yaw_rad: 0.0,
            pitch_rad: 0.0,
            distance: 1.0,
            zoom: None,
            fov_y_deg,
            controls: OrbitControls::all(),
            min_distance: 1e-3,
            max_distance: f64::INFINITY,
        };
        cam.place(position);
        cam
    }

    /// Restores a camera from a pose reported earlier. Position, rotation and
    /// zoom are kept. The new target sits on the pose's line of sight at the
    /// depth of `pivot`. Roll cannot be expressed by an orbit camera and is
    /// dropped.
    pub fn from_pose(pose: &CameraPose, pivot: Vec3, fov_y_deg: f64) -> Self {
        let eye = pose.eye();
        let forward = PerspectiveCamera::new(*pose, fov_y_deg).forward();
        let to_pivot = pivot - eye;
        let depth = to_pivot.dot(forward);
        let depth = if depth.is_finite() && depth > MIN_RESTORE_DEPTH {
            depth
        } else {
            to_pivot.length().max(1.0)
        };

        let mut cam = Self::new(eye, eye + forward * depth, fov_y_deg);
        cam.zoom = pose.zoom;
        cam
    }

    pub fn with_controls(mut self, controls: OrbitControls) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_distance_limits(mut self, min: f64, max: f64) -> Self {
        self.min_distance = min.max(1e-6);
        self.max_distance = max.max(self.min_distance);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self
    }

    fn place(&mut self, position: Vec3) {
        let offset = position - self.target;
        let distance = offset.length();
        if distance <= 0.0 || !distance.is_finite() {
            self.yaw_rad = 0.0;
            self.pitch_rad = 0.0;
            self.distance = self.min_distance;
            return;
        }
        self.distance = distance;
        self.pitch_rad = (offset.y / distance).clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw_rad = offset.x.atan2(offset.z);
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn controls(&self) -> OrbitControls {
        self.controls
    }

    pub fn position(&self) -> Vec3 {
        let (sp, cp) = self.pitch_rad.sin_cos();
        let (sy, cy) = self.yaw_rad.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    fn basis(&self) -> Mat3 {
        look_at_rotation(self.position(), self.target, Vec3::UP)
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position().to_array(),
            rotation: euler_xyz_from_rotation(&self.basis()),
            zoom: self.zoom,
        }
    }

    pub fn camera(&self) -> PerspectiveCamera {
        PerspectiveCamera::new(self.pose(), self.fov_y_deg)
    }

    /// Orbits around the target. Returns `false` when rotation is disabled.
    pub fn rotate(&mut self, d_yaw_rad: f64, d_pitch_rad: f64) -> bool {
        if !self.controls.rotate {
            return false;
        }
        self.yaw_rad += d_yaw_rad;
        self.pitch_rad = (self.pitch_rad + d_pitch_rad).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        true
    }

    /// Slides camera and target in the view plane. `dx`/`dy` are fractions of
    /// the current distance.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !self.controls.pan {
            return false;
        }
        let m = self.basis();
        let right = Vec3::new(m[0][0], m[1][0], m[2][0]);
        let up = Vec3::new(m[0][1], m[1][1], m[2][1]);
        self.target = self.target + right * (dx * self.distance) + up * (dy * self.distance);
        true
    }

    /// Scales the distance to the target; `factor < 1` moves closer.
    pub fn dolly(&mut self, factor: f64) -> bool {
        if !self.controls.zoom || factor <= 0.0 || !factor.is_finite() {
            return false;
        }
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{OrbitCamera, OrbitControls};
    use crate::camera::CameraPose;
    use foundation::math::Vec3;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        (0..3).all(|i| (a[i] - b[i]).abs() < 1e-9)
    }

    #[test]
    fn keeps_initial_position() {
        let eye = Vec3::new(8.242334535846314, 9.403782570182194, 17.822741811686306);
        let cam = OrbitCamera::new(eye, Vec3::new(4.5, 5.0, 0.0), 75.0);
        assert!(close(cam.pose().position, eye.to_array()));
    }

    #[test]
    fn pose_round_trips_through_from_pose() {
        let target = Vec3::new(4.5, 5.0, 0.0);
        let mut cam = OrbitCamera::new(Vec3::new(8.0, 9.0, 17.0), target, 75.0);
        cam.rotate(0.4, -0.2);
        cam.dolly(0.5);
        let pose = cam.pose();

        let restored = OrbitCamera::from_pose(&pose, target, 75.0);
        assert!(pose.approx_eq(&restored.pose(), 1e-9));
    }

    #[test]
    fn panned_pose_restores_from_the_original_pivot() {
        let pivot = Vec3::new(4.5, 5.0, 0.0);
        let mut cam = OrbitCamera::new(Vec3::new(8.0, 9.0, 17.0), pivot, 75.0);
        cam.rotate(-0.3, 0.2);
        cam.pan(0.3, 0.1);
        cam.dolly(1.5);
        let pose = cam.pose();

        let restored = OrbitCamera::from_pose(&pose, pivot, 75.0);
        assert!(pose.approx_eq(&restored.pose(), 1e-9));
        // The restored target stays on the line of sight.
        let fwd = restored.camera().forward();
        let to_target = (restored.target() - restored.position()).normalized().expect("dir");
        assert!(close(fwd.to_array(), to_target.to_array()));
    }

    #[test]
    fn restore_behind_the_pivot_falls_back_to_its_distance() {
        // Looking down -Z from the origin with the pivot behind the eye.
        let pose = CameraPose::new([0.0, 0.0, 0.0], [0.0; 3]);
        let cam = OrbitCamera::from_pose(&pose, Vec3::new(0.0, 0.0, 4.0), 50.0);
        assert!(close(cam.target().to_array(), [0.0, 0.0, -4.0]));
        assert!(pose.approx_eq(&cam.pose(), 1e-9));
    }

    #[test]
    fn camera_looks_at_target() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        let cam = OrbitCamera::new(Vec3::new(4.0, 6.0, 9.0), target, 60.0);
        let fwd = cam.camera().forward();
        let expected = (target - cam.position()).normalized().expect("dir");
        assert!(close(fwd.to_array(), expected.to_array()));
    }

    #[test]
    fn planar_controls_refuse_rotation() {
        let mut cam = OrbitCamera::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, 50.0)
            .with_controls(OrbitControls::planar());
        let before = cam.pose();
        assert!(!cam.rotate(1.0, 1.0));
        assert_eq!(cam.pose(), before);

        assert!(cam.pan(0.5, 0.0));
        assert!(close(cam.target().to_array(), [1.0, 0.0, 0.0]));
        assert!(close(cam.pose().rotation, [0.0, 0.0, 0.0]));
    }

    #[test]
    fn dolly_respects_limits() {
        let mut cam = OrbitCamera::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, 50.0).with_distance_limits(1.0, 4.0);
        cam.dolly(0.1);
        assert_eq!(cam.distance(), 1.0);
        cam.dolly(100.0);
        assert_eq!(cam.distance(), 4.0);
        assert!(!cam.dolly(-1.0));
    }

    #[test]
    fn pitch_is_clamped_below_the_pole() {
        let mut cam = OrbitCamera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 50.0);
        cam.rotate(0.0, 10.0);
        assert!(cam.position().y < 5.0);
        assert!(cam.position().y > 4.99);
    }

    #[test]
    fn zoom_survives_restore() {
        let pose = CameraPose::new([0.0, 0.0, 3.0], [0.0; 3]).with_zoom(2.0);
        let cam = OrbitCamera::from_pose(&pose, Vec3::ZERO, 50.0);
        assert_eq!(cam.pose().zoom, Some(2.0));
    }
}
