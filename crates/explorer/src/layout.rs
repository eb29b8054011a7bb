//! Side panel and header content for the current session state.
//!
//! Pure: a [`Panel`] is rebuilt from the [`Session`] every frame and carries
//! no state of its own. The `Display` impl is a plain-text rendering used by
//! the headless driver.

use std::fmt;

use foundation::color::Rgb;
use runtime::frame::Frame;

use crate::global_view::{CAPTION_COLOR, IMAGE_COLOR};
use crate::local_view::{NEIGHBOR_COLOR, SELECTED_COLOR};
use crate::session::{Phase, Session, ViewMode};

pub const GLOBAL_TITLE: &str = "CLIP Latent Space Explorer — Global UMAP View";
pub const LOCAL_TITLE: &str = "CLIP Latent Space Explorer — Local PCA View";
pub const BACK_LABEL: &str = "Back to Global View";
pub const FIRST_CLICK_HINT: &str = "Click on any point! Check the tooltip for help.";

pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const SPINNER_STEP_S: f64 = 0.1;

const GLOBAL_DESCRIPTION: &[&str] = &[
    "Explore how CLIP understands semantic concepts by analyzing text-image pairs, \
     visualized through projected embeddings and their proximity in the CLIP latent space.",
    "Each image-text sample was passed through CLIP's encoders, the image through the image \
     encoder and the text through the text encoder, resulting in 512D embeddings for each.",
    "The visualization uses UMAP to project the 512D embeddings to 3D. Image and text \
     embeddings form distinct clusters, reflecting their separate planes in the original space.",
];

const LOCAL_DESCRIPTION: &[&str] = &[
    "Given the selected point (a 512D CLIP embedding), kNN was performed and PCA is used to \
     project the neighbors to 2D for the visualization.",
];

const GLOBAL_CONTROLS: &[&str] = &[
    "Left Click + Drag: Rotate view",
    "Right Click + Drag: Pan camera",
    "Scroll Wheel: Zoom in/out",
    "Click any point to see its nearest neighbors",
];

const LOCAL_CONTROLS: &[&str] = &[
    "Right Click + Drag: Pan camera",
    "Scroll Wheel: Zoom in/out",
    "Click any point to update Selected Point view",
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LegendEntry {
    pub color: Rgb,
    pub label: &'static str,
}

/// Record shown in the side panel while in local mode.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCard {
    pub index: usize,
    pub caption: String,
    pub image_data_uri: String,
}

/// What occupies the scene area.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Corpus fetch in flight.
    Loading { spinner: char },
    /// Corpus fetch failed.
    Error(String),
    GlobalScene,
    NeighborhoodLoading { spinner: char },
    LocalScene,
    /// Local mode with nothing to draw.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: &'static str,
    pub back_control: Option<&'static str>,
    pub hint: Option<&'static str>,
    pub description: &'static [&'static str],
    pub legend: [LegendEntry; 2],
    pub controls: &'static [&'static str],
    pub selected: Option<SelectedCard>,
    pub content: Content,
    pub notice: Option<String>,
}

pub fn spinner_at(frame: Frame) -> char {
    SPINNER_FRAMES[frame.cycle(SPINNER_STEP_S, SPINNER_FRAMES.len())]
}

impl Panel {
    pub fn build(session: &Session, frame: Frame) -> Self {
        let local = session.mode() == ViewMode::Local;
        let spinner = spinner_at(frame);

        let content = match session.phase() {
            Phase::Loading => Content::Loading { spinner },
            Phase::Failed(msg) => Content::Error(msg.clone()),
            Phase::Ready if !local => Content::GlobalScene,
            Phase::Ready if session.is_loading_neighborhood() => Content::NeighborhoodLoading { spinner },
            Phase::Ready if session.neighborhood().is_some() => Content::LocalScene,
            Phase::Ready => Content::Empty,
        };

        let selected = if local {
            session.selected().zip(session.selected_record()).map(|(index, record)| SelectedCard {
                index,
                caption: record.caption.clone(),
                image_data_uri: format!("data:image/jpeg;base64,{}", record.image),
            })
        } else {
            None
        };

        Self {
            title: if local { LOCAL_TITLE } else { GLOBAL_TITLE },
            back_control: local.then_some(BACK_LABEL),
            hint: (!session.first_click_done()).then_some(FIRST_CLICK_HINT),
            description: if local { LOCAL_DESCRIPTION } else { GLOBAL_DESCRIPTION },
            legend: if local {
                [
                    LegendEntry {
                        color: SELECTED_COLOR,
                        label: "Initially Selected Point",
                    },
                    LegendEntry {
                        color: NEIGHBOR_COLOR,
                        label: "Neighboring Embeddings",
                    },
                ]
            } else {
                [
                    LegendEntry {
                        color: IMAGE_COLOR,
                        label: "Image Embeddings",
                    },
                    LegendEntry {
                        color: CAPTION_COLOR,
                        label: "Caption Embeddings",
                    },
                ]
            },
            controls: if local { LOCAL_CONTROLS } else { GLOBAL_CONTROLS },
            selected,
            content,
            notice: session.notice().map(str::to_owned),
        }
    }

    /// Whether only the full-screen status should be shown.
    pub fn is_blocking(&self) -> bool {
        matches!(self.content, Content::Loading { .. } | Content::Error(_))
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            Content::Loading { spinner } => return write!(f, "Loading {spinner}"),
            Content::Error(msg) => return write!(f, "{msg}"),
            _ => {}
        }

        write!(f, "{}", self.title)?;
        if let Some(back) = self.back_control {
            write!(f, "  [{back}]")?;
        }
        writeln!(f)?;
        if let Some(notice) = &self.notice {
            writeln!(f, "! {notice}")?;
        }
        if let Some(hint) = self.hint {
            writeln!(f, "{hint}")?;
        }
        for entry in &self.legend {
            writeln!(f, "  {} {}", entry.color.to_hex_string(), entry.label)?;
        }
        if let Some(card) = &self.selected {
            writeln!(f, "Selected Point #{}: {}", card.index, card.caption)?;
        }
        match &self.content {
            Content::NeighborhoodLoading { spinner } => write!(f, "Loading nearest neighbors {spinner}"),
            Content::GlobalScene => write!(f, "[global scene]"),
            Content::LocalScene => write!(f, "[local scene]"),
            _ => write!(f, "[no data]"),
        }
    }
}
