//! Global view: every record's text and image projections in one 3D scatter.
//!
//! Ordering contract: points are emitted record by record in corpus order,
//! text projection before image projection. `record_of[i]` is the record
//! behind point `i`, so a record contributes zero, one or two consecutive
//! entries.

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
use scene::orbit::OrbitCamera;
use scene::picking::PickOptions;
use scene::point_cloud::{PointCloud, PointStyle};
use scene::world::World;
use tracing::{debug, error, warn};

use crate::preview::PreviewWindow;
use crate::record::Record;

pub const CAPTION_COLOR: Rgb = Rgb::from_hex(0x0000ff);
pub const IMAGE_COLOR: Rgb = Rgb::from_hex(0xff0000);
pub const GLOBAL_POINT_STYLE: PointStyle = PointStyle {
    size: 0.1,
    pick_threshold: 0.1,
};

pub const DEFAULT_CAMERA_POSITION: [f64; 3] = [8.242334535846314, 9.403782570182194, 17.822741811686306];
pub const ORBIT_TARGET: [f64; 3] = [4.5, 5.0, 0.0];
pub const FOV_Y_DEG: f64 = 75.0;

const AXES_ORIGIN: [f64; 3] = [-8.0, 1.0, -3.0];

/// Pose the global camera starts from before the user moves it: at
/// `DEFAULT_CAMERA_POSITION`, looking at `ORBIT_TARGET`.
pub fn default_camera_pose() -> CameraPose {
    OrbitCamera::new(
        Vec3::from_array(DEFAULT_CAMERA_POSITION),
        Vec3::from_array(ORBIT_TARGET),
        FOV_Y_DEG,
    )
    .pose()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EmbeddingKind {
    Caption,
    Image,
}

impl EmbeddingKind {
    pub fn color(self) -> Rgb {
        match self {
            EmbeddingKind::Caption => CAPTION_COLOR,
            EmbeddingKind::Image => IMAGE_COLOR,
        }
    }
}

/// Point cloud derived from a record list plus its local-to-record table.
#[derive(Debug, Clone)]
pub struct GlobalPoints {
    pub cloud: PointCloud,
    pub record_of: Vec<usize>,
    pub kinds: Vec<EmbeddingKind>,
}

impl GlobalPoints {
    pub fn len(&self) -> usize {
        self.record_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_of.is_empty()
    }
}

/// Pure projection of `records` into the global point cloud.
///
/// Non-finite projections are treated as absent.
pub fn derive_global_points(records: &[Record]) -> GlobalPoints {
    let mut positions = Vec::with_capacity(records.len() * 2);
    let mut record_of = Vec::with_capacity(records.len() * 2);
    let mut kinds = Vec::with_capacity(records.len() * 2);

    for (index, record) in records.iter().enumerate() {
        let candidates = [
            (record.text_projection, EmbeddingKind::Caption),
            (record.image_projection, EmbeddingKind::Image),
        ];
        for (projection, kind) in candidates {
            let Some(p) = projection else { continue };
            if !p.iter().all(|c| c.is_finite()) {
                warn!(record = index, ?kind, "skipping non-finite projection");
                continue;
            }
            positions.push(Vec3::from_array(p));
            record_of.push(index);
            kinds.push(kind);
        }
    }

    let colors = kinds.iter().map(|k| k.color()).collect();
    let cloud = match PointCloud::new(positions, colors, GLOBAL_POINT_STYLE) {
        Ok(cloud) => cloud,
        Err(err) => {
            error!(%err, "global point cloud rejected");
            record_of.clear();
            kinds.clear();
            PointCloud::empty(GLOBAL_POINT_STYLE)
        }
    };

    GlobalPoints {
        cloud,
        record_of,
        kinds,
    }
}

pub fn global_axes() -> Axes {
    Axes::spatial([29.0, 15.0, 12.0], ["UMAP-1", "UMAP-2", "UMAP-3"]).with_label_style(0.5, 0.5)
}

/// Turns point-local events into record indices.
struct RecordEvents<'a> {
    record_of: &'a [usize],
    selected: Option<usize>,
    hovered: Option<Option<usize>>,
}

impl<'a> RecordEvents<'a> {
    fn new(record_of: &'a [usize]) -> Self {
        Self {
            record_of,
            selected: None,
            hovered: None,
        }
    }
}

impl PointCloudHandler for RecordEvents<'_> {
    fn on_select(&mut self, index: usize) {
        self.selected = self.record_of.get(index).copied();
    }

    fn on_hover(&mut self, index: Option<usize>) {
        self.hovered = Some(index.and_then(|i| self.record_of.get(i).copied()));
    }
}

/// Mounted global scene.
///
/// Holds a window pointer listener and, while a point is hovered, the cursor
/// lease; both are released when the view is dropped.
#[derive(Debug)]
pub struct GlobalView {
    records: Rc<[Record]>,
    points: GlobalPoints,
    axes: Axes,
    camera: OrbitCamera,
    viewport: Viewport,
    interaction: PointCloudInteraction,
    pointer: Rc<Cell<ScreenPos>>,
    _pointer_listener: ListenerGuard,
    hovered_record: Option<usize>,
    last_reported: Option<CameraPose>,
}

impl GlobalView {
    pub fn mount(
        records: Rc<[Record]>,
        pose: &CameraPose,
        window: &Window,
        cursor: &Cursor,
        viewport: Viewport,
    ) -> Self {
        let points = derive_global_points(&records);
        debug!(records = records.len(), points = points.len(), "global view mounted");

        let pointer = Rc::new(Cell::new(ScreenPos::default()));
        let tracked = Rc::clone(&pointer);
        let listener = window.add_pointer_listener(move |pos| tracked.set(pos));

        Self {
            records,
            points,
            axes: global_axes(),
            camera: OrbitCamera::from_pose(pose, Vec3::from_array(ORBIT_TARGET), FOV_Y_DEG),
            viewport,
            interaction: PointCloudInteraction::new(cursor.clone(), PickOptions::default()),
            pointer,
            _pointer_listener: listener,
            hovered_record: None,
            last_reported: None,
        }
    }

    /// Replaces the record list. The point cloud is only rebuilt when `records`
    /// is a different list, not merely an equal one.
    pub fn set_records(&mut self, records: Rc<[Record]>) {
        if Rc::ptr_eq(&self.records, &records) {
            return;
        }
        self.points = derive_global_points(&records);
        self.records = records;
        self.interaction.reset();
        self.hovered_record = None;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn points(&self) -> &GlobalPoints {
        &self.points
    }

    pub fn hovered_record(&self) -> Option<usize> {
        self.hovered_record
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn ray_at(&self, pos: ScreenPos) -> Option<scene::picking::Ray> {
        self.camera.camera().ray_through(pos, self.viewport)
    }

    /// Pointer moved over the canvas.
    pub fn pointer_move(&mut self, pos: ScreenPos) -> Option<PointerEvent> {
        let ray = self.ray_at(pos);
        let mut events = RecordEvents::new(&self.points.record_of);
        let event = self.interaction.pointer_move(&self.points.cloud, ray, &mut events);
        if let Some(hovered) = events.hovered {
            self.hovered_record = hovered;
        }
        event
    }

    pub fn pointer_out(&mut self) -> Option<PointerEvent> {
        let mut events = RecordEvents::new(&self.points.record_of);
        let event = self.interaction.pointer_out(&mut events);
        if let Some(hovered) = events.hovered {
            self.hovered_record = hovered;
        }
        event
    }

    /// Record index under `pos`, if any. Hover state is kept.
    pub fn click(&mut self, pos: ScreenPos) -> Option<usize> {
        let ray = self.ray_at(pos);
        let mut events = RecordEvents::new(&self.points.record_of);
        self.interaction.click(&self.points.cloud, ray, &mut events)?;
        if let Some(record) = events.selected {
            debug!(record, "global point selected");
        }
        events.selected
    }

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
        let p = self.points.cloud.position(local)?;
        self.camera.camera().project(p, self.viewport)
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    /// Per-frame camera observer. Returns the live pose when it differs from
    /// the one returned last time.
    pub fn frame(&mut self) -> Option<CameraPose> {
        let pose = self.camera.pose();
        if self.last_reported.is_some_and(|last| last.approx_eq(&pose, 1e-12)) {
            return None;
        }
        self.last_reported = Some(pose);
        Some(pose)
    }

    /// Preview of the hovered record at the last tracked pointer position.
    pub fn preview(&self) -> Option<PreviewWindow<'_>> {
        let record = self.records.get(self.hovered_record?)?;
        Some(PreviewWindow::for_record(record, self.pointer.get()))
    }

    pub fn world(&self) -> World<'_> {
        let mut world = World::new();
        world
            .add_axes(Transform::translate(Vec3::from_array(AXES_ORIGIN)), &self.axes)
            .add_point_cloud(&self.points.cloud);
        world
    }

    pub fn render(&self) -> RenderFrame {
        Renderer::collect(&self.world(), &self.camera.camera())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CAPTION_COLOR, EmbeddingKind, GlobalView, IMAGE_COLOR, default_camera_pose,
        derive_global_points,
    };
    use crate::record::Record;
    use crate::record::fixtures::record;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use runtime::cursor::{Cursor, CursorStyle};
    use runtime::window::{ScreenPos, Viewport, Window};
    use scene::interaction::PointerEvent;
    use std::rc::Rc;

    fn corpus() -> Rc<[Record]> {
        vec![
            record("both", Some([0.0, 5.0, 0.0]), Some([9.0, 5.0, 0.0])),
            record("none", None, None),
            record("image only", None, Some([4.5, 8.0, 0.0])),
            record("text only", Some([4.5, 2.0, 0.0]), None),
        ]
        .into()
    }

    fn mount(records: Rc<[Record]>, window: &Window, cursor: &Cursor) -> GlobalView {
        GlobalView::mount(records, &default_camera_pose(), window, cursor, Viewport::default())
    }

    fn pixel_of(view: &GlobalView, local: usize) -> ScreenPos {
        view.screen_position(local).expect("in front of camera")
    }

    #[test]
    fn derives_one_entry_per_present_projection() {
        let points = derive_global_points(&corpus());
        assert_eq!(points.record_of, vec![0, 0, 2, 3]);
        assert_eq!(
            points.kinds,
            vec![
                EmbeddingKind::Caption,
                EmbeddingKind::Image,
                EmbeddingKind::Image,
                EmbeddingKind::Caption
            ]
        );
        assert_eq!(points.cloud.colors()[0], CAPTION_COLOR);
        assert_eq!(points.cloud.colors()[1], IMAGE_COLOR);
        assert_eq!(points.cloud.len(), points.record_of.len());
    }

    #[test]
    fn table_entries_are_valid_record_indices() {
        let records = corpus();
        let points = derive_global_points(&records);
        assert!(points.record_of.iter().all(|&r| r < records.len()));
        assert!(points.record_of.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn skips_non_finite_projection() {
        let records = vec![record("nan", Some([f64::NAN, 0.0, 0.0]), Some([1.0, 1.0, 1.0]))];
        let points = derive_global_points(&records);
        assert_eq!(points.record_of, vec![0]);
        assert_eq!(points.kinds, vec![EmbeddingKind::Image]);
    }

    #[test]
    fn click_reports_record_index() {
        let window = Window::new();
        let cursor = Cursor::new();
        let mut view = mount(corpus(), &window, &cursor);

        let image_of_two = pixel_of(&view, 2);
        assert_eq!(view.click(image_of_two), Some(2));

        let text_of_three = pixel_of(&view, 3);
        assert_eq!(view.click(text_of_three), Some(3));

        assert_eq!(view.click(ScreenPos::new(1.0, 1.0)), None);
    }

    #[test]
    fn hover_drives_preview_and_cursor() {
        let window = Window::new();
        let cursor = Cursor::new();
        let mut view = mount(corpus(), &window, &cursor);

        let pos = pixel_of(&view, 1);
        window.dispatch_pointer_move(pos);
        assert_eq!(view.pointer_move(pos), Some(PointerEvent::Enter(1)));
        assert_eq!(view.hovered_record(), Some(0));
        assert_eq!(cursor.style(), CursorStyle::Pointer);

        let preview = view.preview().expect("preview");
        assert_eq!(preview.caption, "both");
        assert_eq!(preview.anchor, pos.offset(10.0, 10.0));

        assert_eq!(view.pointer_out(), Some(PointerEvent::Leave));
        assert_eq!(view.hovered_record(), None);
        assert!(view.preview().is_none());
        assert_eq!(cursor.style(), CursorStyle::Default);
    }

    #[test]
    fn unmount_releases_listener_and_cursor() {
        let window = Window::new();
        let cursor = Cursor::new();
        let mut view = mount(corpus(), &window, &cursor);
        assert_eq!(window.pointer_listener_count(), 1);

        let pos = pixel_of(&view, 0);
        view.pointer_move(pos);
        assert_eq!(cursor.style(), CursorStyle::Pointer);

        drop(view);
        assert_eq!(window.pointer_listener_count(), 0);
        assert_eq!(cursor.style(), CursorStyle::Default);
    }

    #[test]
    fn same_record_list_keeps_hover_state() {
        let window = Window::new();
        let cursor = Cursor::new();
        let records = corpus();
        let mut view = mount(Rc::clone(&records), &window, &cursor);

        let pos = pixel_of(&view, 2);
        view.pointer_move(pos);
        view.set_records(Rc::clone(&records));
        assert_eq!(view.hovered_record(), Some(2));

        // An equal but distinct list is a new identity and is rederived.
        let copy: Rc<[Record]> = records.iter().cloned().collect::<Vec<_>>().into();
        view.set_records(copy);
        assert_eq!(view.hovered_record(), None);
        assert_eq!(cursor.style(), CursorStyle::Default);
    }

    #[test]
    fn frame_reports_only_changes() {
        let window = Window::new();
        let cursor = Cursor::new();
        let mut view = mount(corpus(), &window, &cursor);

        let first = view.frame().expect("first frame reports");
        let eye = Vec3::from_array(first.position);
        let expected = Vec3::from_array(super::DEFAULT_CAMERA_POSITION);
        assert!((eye - expected).length() < 1e-9);
        assert_eq!(view.frame(), None);

        assert!(view.orbit(0.3, 0.0));
        assert!(view.frame().is_some());
        assert_eq!(view.frame(), None);
    }

    #[test]
    fn render_contains_axes_and_points() {
        let window = Window::new();
        let view = mount(corpus(), &window, &Cursor::new());
        let frame = view.render();
        assert_eq!(frame.point_count(), 4);
        assert_eq!(frame.fov_y_deg, 75.0);
    }
}
