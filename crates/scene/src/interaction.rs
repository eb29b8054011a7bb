//! Hover and click handling for one point cloud.
//!
//! Pointer input arrives as picking rays; the interaction turns them into
//! enter/leave/click events keyed by the point's local index and forwards
//! them to a [`PointCloudHandler`]. While a point is hovered the interaction
//! holds a [`CursorLease`] for the pointer cursor. The lease is dropped when
//! hover ends, when a click completes, and when the interaction itself is
//! dropped, so the cursor always returns to its default.

use runtime::cursor::{Cursor, CursorLease, CursorStyle};

use crate::picking::{PickOptions, Ray, pick_points};
use crate::point_cloud::PointCloud;

/// Receives point-level events, keyed by local index.
pub trait PointCloudHandler {
    fn on_select(&mut self, index: usize);
    fn on_hover(&mut self, index: Option<usize>);
}

/// Last event of one pointer update. A move from one point straight onto
/// another reports `Enter` for the new point; the handler has already seen
/// the hover end on the old one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(usize),
    Leave,
    Click(usize),
}

#[derive(Debug)]
pub struct PointCloudInteraction {
    cursor: Cursor,
    opts: PickOptions,
    hovered: Option<usize>,
    lease: Option<CursorLease>,
}

impl PointCloudInteraction {
    pub fn new(cursor: Cursor, opts: PickOptions) -> Self {
        Self {
            cursor,
            opts,
            hovered: None,
            lease: None,
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn set_pick_options(&mut self, opts: PickOptions) {
        self.opts = opts;
    }

    fn pick(&self, cloud: &PointCloud, ray: Option<Ray>) -> Option<usize> {
        ray.and_then(|ray| pick_points(cloud, ray, self.opts))
            .map(|hit| hit.index)
    }

    /// Pointer moved over the canvas. `ray` is `None` when no ray can be
    /// formed for the pointer position.
    pub fn pointer_move<H: PointCloudHandler>(
        &mut self,
        cloud: &PointCloud,
        ray: Option<Ray>,
        handler: &mut H,
    ) -> Option<PointerEvent> {
        match (self.hovered, self.pick(cloud, ray)) {
            (prev, Some(index)) if prev != Some(index) => {
                // Moving straight onto another point leaves the previous one first.
                if prev.is_some() {
                    self.pointer_out(handler);
                }
                self.hovered = Some(index);
                handler.on_hover(Some(index));
                self.lease = Some(self.cursor.acquire(CursorStyle::Pointer));
                Some(PointerEvent::Enter(index))
            }
            (Some(_), None) => self.pointer_out(handler),
            _ => None,
        }
    }

    /// Pointer left the canvas entirely.
    pub fn pointer_out<H: PointCloudHandler>(&mut self, handler: &mut H) -> Option<PointerEvent> {
        self.hovered.take()?;
        handler.on_hover(None);
        self.lease = None;
        Some(PointerEvent::Leave)
    }

    pub fn click<H: PointCloudHandler>(
        &mut self,
        cloud: &PointCloud,
        ray: Option<Ray>,
        handler: &mut H,
    ) -> Option<PointerEvent> {
        let index = self.pick(cloud, ray)?;
        handler.on_select(index);
        self.lease = None;
        Some(PointerEvent::Click(index))
    }

    /// Forget any hover state, e.g. after the underlying cloud was rebuilt.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.lease = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{PointCloudHandler, PointCloudInteraction, PointerEvent};
    use crate::picking::{PickOptions, Ray};
    use crate::point_cloud::{PointCloud, PointStyle};
    use foundation::color::Rgb;
    use foundation::math::Vec3;
    use runtime::cursor::{Cursor, CursorStyle};

    #[derive(Default)]
    struct Recorder {
        selected: Vec<usize>,
        hovered: Vec<Option<usize>>,
    }

    impl PointCloudHandler for Recorder {
        fn on_select(&mut self, index: usize) {
            self.selected.push(index);
        }

        fn on_hover(&mut self, index: Option<usize>) {
            self.hovered.push(index);
        }
    }

    fn two_points() -> PointCloud {
        PointCloud::from_points(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![Rgb::BLACK; 2],
            PointStyle::new(0.1, 0.05),
        )
        .expect("cloud")
    }

    fn down_at(x: f64) -> Option<Ray> {
        Some(Ray::new(Vec3::new(x, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)))
    }

    #[test]
    fn hover_enter_and_leave_drive_cursor() {
        let cloud = two_points();
        let cursor = Cursor::new();
        let mut interaction = PointCloudInteraction::new(cursor.clone(), PickOptions::default());
        let mut rec = Recorder::default();

        assert_eq!(
            interaction.pointer_move(&cloud, down_at(0.0), &mut rec),
            Some(PointerEvent::Enter(0))
        );
        assert_eq!(cursor.style(), CursorStyle::Pointer);

        // Same point again is not a new event.
        assert_eq!(interaction.pointer_move(&cloud, down_at(0.01), &mut rec), None);

        assert_eq!(
            interaction.pointer_move(&cloud, down_at(1.0), &mut rec),
            Some(PointerEvent::Enter(1))
        );
        assert_eq!(cursor.style(), CursorStyle::Pointer);

        assert_eq!(
            interaction.pointer_move(&cloud, down_at(0.5), &mut rec),
            Some(PointerEvent::Leave)
        );
        assert_eq!(cursor.style(), CursorStyle::Default);
        assert_eq!(rec.hovered, vec![Some(0), None, Some(1), None]);
    }

    #[test]
    fn moving_between_points_leaves_the_first_before_entering_the_second() {
        let cloud = two_points();
        let cursor = Cursor::new();
        let mut interaction = PointCloudInteraction::new(cursor.clone(), PickOptions::default());
        let mut rec = Recorder::default();

        interaction.pointer_move(&cloud, down_at(0.0), &mut rec);
        assert_eq!(
            interaction.pointer_move(&cloud, down_at(1.0), &mut rec),
            Some(PointerEvent::Enter(1))
        );
        assert_eq!(rec.hovered, vec![Some(0), None, Some(1)]);
        assert_eq!(interaction.hovered(), Some(1));
        assert_eq!(cursor.style(), CursorStyle::Pointer);
    }

    #[test]
    fn click_selects_and_restores_cursor() {
        let cloud = two_points();
        let cursor = Cursor::new();
        let mut interaction = PointCloudInteraction::new(cursor.clone(), PickOptions::default());
        let mut rec = Recorder::default();

        interaction.pointer_move(&cloud, down_at(1.0), &mut rec);
        assert_eq!(
            interaction.click(&cloud, down_at(1.0), &mut rec),
            Some(PointerEvent::Click(1))
        );
        assert_eq!(rec.selected, vec![1]);
        assert_eq!(cursor.style(), CursorStyle::Default);
    }

    #[test]
    fn click_on_empty_space_does_nothing() {
        let cloud = two_points();
        let mut interaction = PointCloudInteraction::new(Cursor::new(), PickOptions::default());
        let mut rec = Recorder::default();
        assert_eq!(interaction.click(&cloud, down_at(3.0), &mut rec), None);
        assert!(rec.selected.is_empty());
    }

    #[test]
    fn teardown_mid_hover_restores_cursor() {
        let cloud = two_points();
        let cursor = Cursor::new();
        let mut interaction = PointCloudInteraction::new(cursor.clone(), PickOptions::default());
        interaction.pointer_move(&cloud, down_at(0.0), &mut Recorder::default());
        assert_eq!(cursor.style(), CursorStyle::Pointer);

        drop(interaction);
        assert_eq!(cursor.style(), CursorStyle::Default);
    }

    #[test]
    fn pointer_out_without_hover_is_silent() {
        let mut interaction = PointCloudInteraction::new(Cursor::new(), PickOptions::default());
        let mut rec = Recorder::default();
        assert_eq!(interaction.pointer_out(&mut rec), None);
        assert!(rec.hovered.is_empty());
    }
}
