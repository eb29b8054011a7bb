//! View-mode and selection state machine.
//!
//! ```text
//! Loading --corpus ok--> Ready(Global) <--select/back--> Ready(Local)
//!    \--corpus err--> Failed
//! ```
//!
//! The session never performs I/O. [`Session::select`] hands back a
//! [`NeighborhoodFetch`] describing the request to issue, and the caller
//! reports the outcome through [`Session::neighborhood_resolved`] with the
//! same ticket. Tickets increase monotonically; only the most recently
//! issued one is accepted, so a slow response can never overwrite the result
//! of a later selection.

use std::rc::Rc;

use scene::camera::CameraPose;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::record::{Neighborhood, Record};

pub const CORPUS_ERROR_MESSAGE: &str = "Failed to load data";
pub const NEIGHBORHOOD_ERROR_NOTICE: &str = "Failed to load nearest neighbors";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Global,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    /// Corpus load failed. Terminal for the session.
    Failed(String),
}

/// Tag of one issued neighborhood request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A neighborhood request the caller should issue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NeighborhoodFetch {
    pub ticket: RequestTicket,
    pub selected_idx: usize,
    pub k: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// Superseded by a later request or by leaving local mode. Dropped.
    Stale,
    /// Fetch failed; the session went back to global mode.
    Failed,
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    records: Rc<[Record]>,
    mode: ViewMode,
    selected: Option<usize>,
    neighborhood: Option<Rc<Neighborhood>>,
    pending: Option<RequestTicket>,
    next_ticket: u64,
    first_click: bool,
    camera: CameraPose,
    k: usize,
    notice: Option<String>,
}

impl Session {
    pub fn new(k: usize, camera: CameraPose) -> Self {
        Self {
            phase: Phase::Loading,
            records: Rc::from(Vec::<Record>::new()),
            mode: ViewMode::Global,
            selected: None,
            neighborhood: None,
            pending: None,
            next_ticket: 0,
            first_click: false,
            camera,
            k,
            notice: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn records(&self) -> &Rc<[Record]> {
        &self.records
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.records.get(self.selected?)
    }

    pub fn neighborhood(&self) -> Option<&Rc<Neighborhood>> {
        self.neighborhood.as_ref()
    }

    pub fn is_loading_neighborhood(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_ticket(&self) -> Option<RequestTicket> {
        self.pending
    }

    /// One-way latch, set by the first honored selection from global mode.
    pub fn first_click_done(&self) -> bool {
        self.first_click
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Takes effect for the next request issued.
    pub fn set_k(&mut self, k: usize) {
        self.k = k;
    }

    /// Non-terminal message for the user, e.g. after a failed fetch.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Outcome of the initial corpus fetch. Ignored outside [`Phase::Loading`].
    pub fn corpus_loaded(&mut self, result: Result<Vec<Record>, ApiError>) {
        if self.phase != Phase::Loading {
            warn!("corpus result after the corpus was already settled; ignoring");
            return;
        }
        match result {
            Ok(records) => {
                info!(records = records.len(), "corpus ready");
                self.records = records.into();
                self.phase = Phase::Ready;
            }
            Err(err) => {
                error!(%err, "corpus load failed");
                self.phase = Phase::Failed(CORPUS_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// A point for record `record_idx` was picked in either view.
    ///
    /// Returns the request to issue, or `None` when the selection is ignored
    /// (corpus not ready, or an index outside the corpus). Any request still
    /// in flight is superseded.
    pub fn select(&mut self, record_idx: usize) -> Option<NeighborhoodFetch> {
        if self.phase != Phase::Ready {
            debug!(record_idx, phase = ?self.phase, "selection ignored");
            return None;
        }
        if record_idx >= self.records.len() {
            warn!(record_idx, records = self.records.len(), "selection outside the corpus");
            return None;
        }

        if self.mode == ViewMode::Global {
            self.first_click = true;
        }
        if let Some(prev) = self.pending {
            debug!(superseded = prev.get(), "neighborhood request superseded");
        }

        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;

        self.mode = ViewMode::Local;
        self.selected = Some(record_idx);
        self.neighborhood = None;
        self.pending = Some(ticket);

        info!(record_idx, k = self.k, ticket = ticket.get(), "requesting neighborhood");
        Some(NeighborhoodFetch {
            ticket,
            selected_idx: record_idx,
            k: self.k,
        })
    }

    /// Outcome of the request tagged `ticket`.
    pub fn neighborhood_resolved(
        &mut self,
        ticket: RequestTicket,
        result: Result<Neighborhood, ApiError>,
    ) -> Resolution {
        if self.pending != Some(ticket) {
            warn!(
                ticket = ticket.get(),
                pending = ?self.pending.map(RequestTicket::get),
                "dropping stale neighborhood response"
            );
            return Resolution::Stale;
        }
        self.pending = None;

        match result {
            Ok(neighborhood) => {
                if Some(neighborhood.selected_index()) != self.selected {
                    warn!(
                        expected = ?self.selected,
                        got = neighborhood.selected_index(),
                        "neighborhood centered on a different record"
                    );
                }
                self.neighborhood = Some(Rc::new(neighborhood));
                self.notice = None;
                Resolution::Applied
            }
            Err(err) => {
                warn!(%err, selected = ?self.selected, "neighborhood fetch failed");
                self.mode = ViewMode::Global;
                self.selected = None;
                self.neighborhood = None;
                self.notice = Some(NEIGHBORHOOD_ERROR_NOTICE.to_string());
                Resolution::Failed
            }
        }
    }

    /// Leaves local mode. Any request in flight becomes stale.
    pub fn back(&mut self) -> bool {
        if self.mode != ViewMode::Local {
            return false;
        }
        if let Some(ticket) = self.pending.take() {
            debug!(ticket = ticket.get(), "back pressed with a request in flight");
        }
        self.mode = ViewMode::Global;
        self.selected = None;
        self.neighborhood = None;
        self.notice = None;
        true
    }

    /// Stores the global camera pose. Returns `false` when `pose` equals the
    /// stored one.
    pub fn camera_changed(&mut self, pose: CameraPose) -> bool {
        if self.camera == pose {
            return false;
        }
        self.camera = pose;
        true
    }
}
