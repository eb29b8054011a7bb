//! Top-level wiring: one session, at most one mounted view, and the event
//! loop that feeds UI input and backend responses into them.

use futures_util::StreamExt;
use futures_util::future::LocalBoxFuture;
use futures_util::stream::FuturesUnordered;
use gpu::RenderFrame;
use runtime::cursor::Cursor;
use runtime::frame::Frame;
use runtime::window::{ScreenPos, Viewport, Window};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::api::Backend;
use crate::config::ExplorerConfig;
use crate::error::ApiError;
use crate::global_view::{GlobalView, default_camera_pose};
use crate::layout::Panel;
use crate::local_view::LocalView;
use crate::preview::PreviewWindow;
use crate::record::{Neighborhood, Record};
use crate::session::{NeighborhoodFetch, Phase, RequestTicket, Resolution, Session, ViewMode};

const FRAME_DT_S: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove(ScreenPos),
    /// Pointer left the canvas.
    PointerOut,
    Click(ScreenPos),
    /// Click on point `local` of the active view, wherever it is drawn.
    ClickPoint(usize),
    Back,
    Orbit { d_yaw_rad: f64, d_pitch_rad: f64 },
    Pan { dx: f64, dy: f64 },
    Zoom(f64),
    Resize(Viewport),
    /// One animation frame elapsed.
    Tick,
}

/// What the event loop just applied, passed to the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update {
    CorpusLoaded,
    Input(InputEvent),
    Resolved {
        ticket: RequestTicket,
        resolution: Resolution,
    },
}

#[derive(Debug)]
enum ActiveView {
    None,
    Global(GlobalView),
    Local(LocalView),
}

#[derive(Debug)]
pub struct App {
    session: Session,
    view: ActiveView,
    window: Window,
    cursor: Cursor,
    viewport: Viewport,
    frame: Frame,
}

impl App {
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            session: Session::new(config.k, default_camera_pose()),
            view: ActiveView::None,
            window: Window::new(),
            cursor: Cursor::new(),
            viewport: config.viewport,
            frame: Frame::first(FRAME_DT_S),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn global_view(&self) -> Option<&GlobalView> {
        match &self.view {
            ActiveView::Global(view) => Some(view),
            _ => None,
        }
    }

    pub fn local_view(&self) -> Option<&LocalView> {
        match &self.view {
            ActiveView::Local(view) => Some(view),
            _ => None,
        }
    }

    pub fn corpus_loaded(&mut self, result: Result<Vec<Record>, ApiError>) {
        self.session.corpus_loaded(result);
        self.sync_view();
    }

    /// Applies one UI event. Returns a neighborhood request when the event
    /// selected a record.
    pub fn handle(&mut self, event: InputEvent) -> Option<NeighborhoodFetch> {
        match event {
            InputEvent::PointerMove(pos) => {
                self.window.dispatch_pointer_move(pos);
                match &mut self.view {
                    ActiveView::Global(view) => view.pointer_move(pos),
                    ActiveView::Local(view) => view.pointer_move(pos),
                    ActiveView::None => None,
                };
                None
            }
            InputEvent::PointerOut => {
                match &mut self.view {
                    ActiveView::Global(view) => view.pointer_out(),
                    ActiveView::Local(view) => view.pointer_out(),
                    ActiveView::None => None,
                };
                None
            }
            InputEvent::Click(pos) => {
                let record = match &mut self.view {
                    ActiveView::Global(view) => view.click(pos),
                    ActiveView::Local(view) => view.click(pos),
                    ActiveView::None => None,
                }?;
                self.select_record(record)
            }
            InputEvent::ClickPoint(local) => {
                let pos = match &self.view {
                    ActiveView::Global(view) => view.screen_position(local),
                    ActiveView::Local(view) => view.screen_position(local),
                    ActiveView::None => None,
                }?;
                self.handle(InputEvent::Click(pos))
            }
            InputEvent::Back => {
                if self.session.back() {
                    self.sync_view();
                }
                None
            }
            InputEvent::Orbit { d_yaw_rad, d_pitch_rad } => {
                match &mut self.view {
                    ActiveView::Global(view) => view.orbit(d_yaw_rad, d_pitch_rad),
                    ActiveView::Local(view) => view.orbit(d_yaw_rad, d_pitch_rad),
                    ActiveView::None => false,
                };
                None
            }
            InputEvent::Pan { dx, dy } => {
                match &mut self.view {
                    ActiveView::Global(view) => view.pan(dx, dy),
                    ActiveView::Local(view) => view.pan(dx, dy),
                    ActiveView::None => false,
                };
                None
            }
            InputEvent::Zoom(factor) => {
                match &mut self.view {
                    ActiveView::Global(view) => view.zoom(factor),
                    ActiveView::Local(view) => view.zoom(factor),
                    ActiveView::None => false,
                };
                None
            }
            InputEvent::Resize(viewport) => {
                self.viewport = viewport;
                match &mut self.view {
                    ActiveView::Global(view) => view.set_viewport(viewport),
                    ActiveView::Local(view) => view.set_viewport(viewport),
                    ActiveView::None => {}
                }
                None
            }
            InputEvent::Tick => {
                self.tick();
                None
            }
        }
    }

    /// Selects a record directly, as a pick would.
    pub fn select_record(&mut self, record: usize) -> Option<NeighborhoodFetch> {
        let fetch = self.session.select(record)?;
        self.sync_view();
        Some(fetch)
    }

    pub fn neighborhood_resolved(
        &mut self,
        ticket: RequestTicket,
        result: Result<Neighborhood, ApiError>,
    ) -> Resolution {
        let resolution = self.session.neighborhood_resolved(ticket, result);
        if resolution != Resolution::Stale {
            self.sync_view();
        }
        resolution
    }

    fn tick(&mut self) {
        self.frame = self.frame.next();
        self.observe_camera();
    }

    fn observe_camera(&mut self) {
        if let ActiveView::Global(view) = &mut self.view {
            if let Some(pose) = view.frame() {
                self.session.camera_changed(pose);
            }
        }
    }

    /// Mounts whichever view the session calls for. The outgoing view is
    /// dropped before the next one mounts.
    fn sync_view(&mut self) {
        self.observe_camera();

        let ready = self.session.phase() == &Phase::Ready;
        match (&mut self.view, ready, self.session.mode()) {
            (ActiveView::Global(view), true, ViewMode::Global) => {
                view.set_records(self.session.records().clone());
                return;
            }
            (ActiveView::Local(view), true, ViewMode::Local)
                if self
                    .session
                    .neighborhood()
                    .is_some_and(|n| std::ptr::eq(view.neighborhood(), n.as_ref())) =>
            {
                return;
            }
            _ => {}
        }

        self.view = ActiveView::None;
        if !ready {
            return;
        }
        match self.session.mode() {
            ViewMode::Global => {
                debug!("mounting global view");
                self.view = ActiveView::Global(GlobalView::mount(
                    self.session.records().clone(),
                    self.session.camera(),
                    &self.window,
                    &self.cursor,
                    self.viewport,
                ));
            }
            ViewMode::Local => {
                if let Some(neighborhood) = self.session.neighborhood() {
                    debug!("mounting local view");
                    self.view = ActiveView::Local(LocalView::mount(
                        neighborhood.clone(),
                        &self.window,
                        &self.cursor,
                        self.viewport,
                    ));
                }
            }
        }
    }

    pub fn panel(&self) -> Panel {
        Panel::build(&self.session, self.frame)
    }

    pub fn preview(&self) -> Option<PreviewWindow<'_>> {
        match &self.view {
            ActiveView::Global(view) => view.preview(),
            ActiveView::Local(view) => view.preview(),
            ActiveView::None => None,
        }
    }

    pub fn render(&self) -> Option<RenderFrame> {
        match &self.view {
            ActiveView::Global(view) => Some(view.render()),
            ActiveView::Local(view) => Some(view.render()),
            ActiveView::None => None,
        }
    }
}

type PendingFetch<'a> = LocalBoxFuture<'a, (RequestTicket, Result<Neighborhood, ApiError>)>;

fn issue<B: Backend>(backend: &B, fetch: NeighborhoodFetch) -> PendingFetch<'_> {
    Box::pin(async move {
        let result = backend.fetch_neighborhood(fetch.selected_idx, fetch.k).await;
        (fetch.ticket, result)
    })
}

/// Loads the corpus, then applies input events and neighborhood responses as
/// they arrive until `input` closes and every request in flight has settled.
///
/// Requests are never cancelled; superseded ones run to completion and their
/// results are dropped by the session.
pub async fn run<B: Backend>(
    app: &mut App,
    backend: &B,
    mut input: UnboundedReceiver<InputEvent>,
    mut on_update: impl FnMut(&App, &Update),
) {
    let corpus = backend.fetch_records().await;
    app.corpus_loaded(corpus);
    on_update(app, &Update::CorpusLoaded);
    if matches!(app.session().phase(), Phase::Failed(_)) {
        return;
    }

    let mut in_flight: FuturesUnordered<PendingFetch<'_>> = FuturesUnordered::new();
    let mut input_open = true;

    loop {
        tokio::select! {
            event = input.recv(), if input_open => match event {
                Some(event) => {
                    if let Some(fetch) = app.handle(event) {
                        in_flight.push(issue(backend, fetch));
                    }
                    on_update(app, &Update::Input(event));
                }
                None => {
                    debug!(in_flight = in_flight.len(), "input closed");
                    input_open = false;
                }
            },
            Some((ticket, result)) = in_flight.next(), if !in_flight.is_empty() => {
                let resolution = app.neighborhood_resolved(ticket, result);
                on_update(app, &Update::Resolved { ticket, resolution });
            }
            else => break,
        }
    }
    info!("event loop finished");
}
