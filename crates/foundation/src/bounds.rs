/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Cube of half-extent `radius` around `center`.
    pub fn around(center: [f64; 3], radius: f64) -> Self {
        let r = radius.abs();
        Aabb3::new(
            [center[0] - r, center[1] - r, center[2] - r],
            [center[0] + r, center[1] + r, center[2] + r],
        )
    }

    pub fn union(&self, other: &Self) -> Self {
        Aabb3::new(
            [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        )
    }

    pub fn centroid(&self, axis: usize) -> f64 {
        (self.min[axis] + self.max[axis]) * 0.5
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Slab test. Returns the entry distance along `dir` when the ray
    /// segment `[t_min, t_max]` overlaps the box.
    pub fn ray_entry(&self, origin: [f64; 3], dir: [f64; 3], mut t_min: f64, mut t_max: f64) -> Option<f64> {
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let min = self.min[axis];
            let max = self.max[axis];

            if d.abs() < 1e-12 {
                if o < min || o > max {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (min - o) * inv;
            let mut t2 = (max - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_max < t_min {
                return None;
            }
        }

        Some(t_min.max(0.0))
    }
}
