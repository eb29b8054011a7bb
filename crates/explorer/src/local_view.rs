//! Local view: one neighborhood's 2D projection.
//!
//! Point 0 is the selected record, point `i > 0` is its neighbor of rank
//! `i`. Picks are resolved to record indices through the neighborhood, never
//! reported as local indices.

use std::cell::Cell;
use std::rc::Rc;

use foundation::color::Rgb;
use foundation::math::Vec3;
use gpu::{RenderFrame, Renderer};
use runtime::cursor::Cursor;
use runtime::window::{ListenerGuard, ScreenPos, Viewport, Window};
use scene::axes::Axes;
use scene::camera::CameraPose;
use scene::components::Transform;
use scene::interaction::{PointCloudHandler, PointCloudInteraction, PointerEvent};
use scene::orbit::{OrbitCamera, OrbitControls};
use scene::picking::{PickOptions, Ray};
use scene::point_cloud::{PointCloud, PointStyle};
use scene::world::World;
use tracing::{debug, error};

use crate::preview::PreviewWindow;
use crate::record::Neighborhood;

pub const SELECTED_COLOR: Rgb = Rgb::from_hex(0x22c55e);
pub const NEIGHBOR_COLOR: Rgb = Rgb::from_hex(0x0000ff);
pub const LOCAL_POINT_STYLE: PointStyle = PointStyle {
    size: 0.08,
    pick_threshold: 0.05,
};

pub const CAMERA_POSITION: [f64; 3] = [0.0, 0.0, 2.0];
pub const FOV_Y_DEG: f64 = 50.0;

const AXES_ORIGIN: [f64; 3] = [-1.0, -0.8, 0.0];

pub fn local_axes() -> Axes {
    Axes::planar([2.0, 1.5], ["PC-1", "PC-2"]).with_label_style(0.15, 0.08)
}

fn local_camera() -> OrbitCamera {
    OrbitCamera::new(Vec3::from_array(CAMERA_POSITION), Vec3::ZERO, FOV_Y_DEG)
        .with_controls(OrbitControls::planar())
}

fn neighborhood_cloud(neighborhood: &Neighborhood) -> PointCloud {
    let colors = (0..neighborhood.len())
        .map(|i| if i == 0 { SELECTED_COLOR } else { NEIGHBOR_COLOR })
        .collect();
    match PointCloud::from_planar(neighborhood.projected_points(), colors, LOCAL_POINT_STYLE) {
        Ok(cloud) => cloud,
        Err(err) => {
            error!(%err, "neighborhood point cloud rejected");
            PointCloud::empty(LOCAL_POINT_STYLE)
        }
    }
}

struct NeighborEvents<'a> {
    neighborhood: &'a Neighborhood,
    selected: Option<usize>,
    hovered: Option<Option<usize>>,
}

impl PointCloudHandler for NeighborEvents<'_> {
    fn on_select(&mut self, index: usize) {
        self.selected = self.neighborhood.record_for(index);
    }

    fn on_hover(&mut self, index: Option<usize>) {
        self.hovered = Some(index);
    }
}

/// Mounted local scene. The camera is reset on every mount.
#[derive(Debug)]
pub struct LocalView {
    neighborhood: Rc<Neighborhood>,
    cloud: PointCloud,
    axes: Axes,
    camera: OrbitCamera,
    viewport: Viewport,
    interaction: PointCloudInteraction,
    pointer: Rc<Cell<ScreenPos>>,
    _pointer_listener: ListenerGuard,
    /// Local index of the hovered point.
    hovered: Option<usize>,
}

impl LocalView {
    pub fn mount(neighborhood: Rc<Neighborhood>, window: &Window, cursor: &Cursor, viewport: Viewport) -> Self {
        debug!(
            selected = neighborhood.selected_index(),
            points = neighborhood.len(),
            "local view mounted"
        );
        let pointer = Rc::new(Cell::new(ScreenPos::default()));
        let tracked = Rc::clone(&pointer);
        let listener = window.add_pointer_listener(move |pos| tracked.set(pos));

        Self {
            cloud: neighborhood_cloud(&neighborhood),
            neighborhood,
            axes: local_axes(),
            camera: local_camera(),
            viewport,
            interaction: PointCloudInteraction::new(
                cursor.clone(),
                PickOptions::default(),
            ),
            pointer,
            _pointer_listener: listener,
            hovered: None,
        }
    }

    pub fn neighborhood(&self) -> &Neighborhood {
        &self.neighborhood
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn ray_at(&self, pos: ScreenPos) -> Option<Ray> {
        self.camera.camera().ray_through(pos, self.viewport)
    }

    pub fn pointer_move(&mut self, pos: ScreenPos) -> Option<PointerEvent> {
        let ray = self.ray_at(pos);
        let mut events = NeighborEvents {
            neighborhood: &self.neighborhood,
            selected: None,
            hovered: None,
        };
        let event = self.interaction.pointer_move(&self.cloud, ray, &mut events);
        if let Some(hovered) = events.hovered {
            self.hovered = hovered;
        }
        event
    }

    pub fn pointer_out(&mut self) -> Option<PointerEvent> {
        let mut events = NeighborEvents {
            neighborhood: &self.neighborhood,
            selected: None,
            hovered: None,
        };
        let event = self.interaction.pointer_out(&mut events);
        if let Some(hovered) = events.hovered {
            self.hovered = hovered;
        }
        event
    }

    /// Record index under `pos`, if any.
    pub fn click(&mut self, pos: ScreenPos) -> Option<usize> {
        let ray = self.ray_at(pos);
        let mut events = NeighborEvents {
            neighborhood: &self.neighborhood,
            selected: None,
            hovered: None,
        };
        let PointerEvent::Click(local) = self.interaction.click(&self.cloud, ray, &mut events)? else {
            return None;
        };
        debug!(local, record = ?events.selected, "local point selected");
        events.selected
    }

    /// Rotation is disabled here and always reports `false`.
    pub fn orbit(&mut self, d_yaw_rad: f64, d_pitch_rad: f64) -> bool {
        self.camera.rotate(d_yaw_rad, d_pitch_rad)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        self.camera.pan(dx, dy)
    }

    pub fn zoom(&mut self, factor: f64) -> bool {
        self.camera.dolly(factor)
    }

    /// Window pixel where point `local` is drawn, if it is in front of the camera.
    pub fn screen_position(&self, local: usize) -> Option<ScreenPos> {
        let p = self.cloud.position(local)?;
        self.camera.camera().project(p, self.viewport)
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn preview(&self) -> Option<PreviewWindow<'_>> {
        let info = self.neighborhood.info_for(self.hovered?)?;
        Some(PreviewWindow::for_info(info, self.pointer.get()))
    }

    pub fn world(&self) -> World<'_> {
        let mut world = World::new();
        world
            .add_axes(Transform::translate(Vec3::from_array(AXES_ORIGIN)), &self.axes)
            .add_point_cloud(&self.cloud);
        world
    }

    pub fn render(&self) -> RenderFrame {
        Renderer::collect(&self.world(), &self.camera.camera())
    }
}
