use foundation::math::Vec3;

/// Translation of a group of scene content (axes are offset from the origin).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self { position }
    }

    pub fn apply(&self, local: Vec3) -> Vec3 {
        local + self.position
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::Vec3;

    #[test]
    fn identity_is_origin() {
        let transform = Transform::identity();
        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.apply(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn translate_offsets_points() {
        let t = Transform::translate(Vec3::new(-8.0, 1.0, -3.0));
        assert_eq!(t.apply(Vec3::new(29.0, 0.0, 0.0)), Vec3::new(21.0, 1.0, -3.0));
    }
}
