use foundation::math::Vec3;
use foundation::math::precision::camera_relative_f32;
use scene::camera::PerspectiveCamera;
use scene::world::World;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Colored, distance-attenuated points. Positions are camera-relative.
    Points {
        positions: Vec<f32>,
        colors: Vec<f32>,
        size: f32,
    },
    Line {
        from: [f32; 3],
        to: [f32; 3],
        color: [f32; 3],
    },
    Label {
        position: [f32; 3],
        text: String,
        font_size: f32,
        color: [f32; 3],
    },
}

/// Draw list for one frame. All positions are relative to `eye`.
#[derive(Debug, Default)]
pub struct RenderFrame {
    pub eye: [f64; 3],
    pub fov_y_deg: f64,
    pub commands: Vec<RenderCommand>,
}

impl RenderFrame {
    pub fn point_count(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                RenderCommand::Points { positions, .. } => positions.len() / 3,
                _ => 0,
            })
            .sum()
    }
}

pub struct Renderer;

impl Renderer {
    pub fn collect(world: &World<'_>, camera: &PerspectiveCamera) -> RenderFrame {
        let eye = camera.eye();
        let mut frame = RenderFrame {
            eye: eye.to_array(),
            fov_y_deg: camera.fov_y_deg,
            commands: Vec::new(),
        };

        for (transform, axes) in world.axes() {
            for line in axes.lines() {
                frame.commands.push(RenderCommand::Line {
                    from: camera_relative_f32(transform.apply(line.from), eye),
                    to: camera_relative_f32(transform.apply(line.to), eye),
                    color: line.color.to_array(),
                });
            }
            for label in axes.labels() {
                frame.commands.push(RenderCommand::Label {
                    position: camera_relative_f32(transform.apply(label.position), eye),
                    text: label.text,
                    font_size: label.font_size as f32,
                    color: label.color.to_array(),
                });
            }
        }

        for cloud in world.point_clouds() {
            if cloud.is_empty() {
                continue;
            }
            frame.commands.push(RenderCommand::Points {
                positions: relative_buffer(cloud.positions(), eye),
                colors: cloud.color_buffer(),
                size: cloud.style().size as f32,
            });
        }

        frame
    }
}

fn relative_buffer(points: &[Vec3], eye: Vec3) -> Vec<f32> {
    points
        .iter()
        .flat_map(|p| camera_relative_f32(*p, eye))
        .collect()
}
