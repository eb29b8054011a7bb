use foundation::color::Rgb;
use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AxisLine {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub position: Vec3,
    pub text: String,
    pub font_size: f64,
    pub color: Rgb,
}

/// Labeled reference lines from the local origin along +X, +Y and (unless
/// planar) +Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    lengths: [f64; 3],
    labels: [String; 3],
    planar: bool,
    label_offset: f64,
    font_size: f64,
    color: Rgb,
}

impl Axes {
    pub fn spatial(lengths: [f64; 3], labels: [&str; 3]) -> Self {
        Self {
            lengths,
            labels: labels.map(str::to_owned),
            planar: false,
            label_offset: 0.5,
            font_size: 0.5,
            color: Rgb::BLACK,
        }
    }

    pub fn planar(lengths: [f64; 2], labels: [&str; 2]) -> Self {
        Self {
            lengths: [lengths[0], lengths[1], 0.0],
            labels: [labels[0].to_owned(), labels[1].to_owned(), String::new()],
            planar: true,
            label_offset: 0.5,
            font_size: 0.5,
            color: Rgb::BLACK,
        }
    }

    pub fn with_label_style(mut self, label_offset: f64, font_size: f64) -> Self {
        self.label_offset = label_offset;
        self.font_size = font_size;
        self
    }

    pub fn is_planar(&self) -> bool {
        self.planar
    }

    fn axis_count(&self) -> usize {
        if self.planar { 2 } else { 3 }
    }

    fn unit(axis: usize) -> Vec3 {
        match axis {
            0 => Vec3::new(1.0, 0.0, 0.0),
            1 => Vec3::new(0.0, 1.0, 0.0),
            _ => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    pub fn lines(&self) -> Vec<AxisLine> {
        (0..self.axis_count())
            .map(|axis| AxisLine {
                from: Vec3::ZERO,
                to: Self::unit(axis) * self.lengths[axis],
                color: self.color,
            })
            .collect()
    }

    /// One label per axis, just past the end of its line.
    pub fn labels(&self) -> Vec<AxisLabel> {
        (0..self.axis_count())
            .map(|axis| AxisLabel {
                position: Self::unit(axis) * (self.lengths[axis] + self.label_offset),
                text: self.labels[axis].clone(),
                font_size: self.font_size,
                color: self.color,
            })
            .collect()
    }
}
