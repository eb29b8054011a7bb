use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// One corpus item: a caption/image pair with its embeddings.
///
/// A record's identity is its position in the corpus list; records are never
/// mutated after the corpus is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub caption: String,
    /// Base64-encoded image bytes.
    pub image: String,
    #[serde(rename = "clip_text_embedding", default)]
    pub text_embedding: Vec<f32>,
    #[serde(rename = "clip_image_embedding", default)]
    pub image_embedding: Vec<f32>,
    #[serde(rename = "umap_text_embedding", default)]
    pub text_projection: Option<[f64; 3]>,
    #[serde(rename = "umap_image_embedding", default)]
    pub image_projection: Option<[f64; 3]>,
    #[serde(rename = "umap_average_embedding", default)]
    pub average_projection: Option<[f64; 3]>,
    /// Similarity between this record's text and image embeddings.
    pub similarity_score: f64,
}

impl Record {
    pub fn info(&self, index: usize) -> PointInfo {
        PointInfo {
            index,
            caption: self.caption.clone(),
            image: self.image.clone(),
            similarity_score: self.similarity_score,
        }
    }
}

/// Display info for one record as the neighborhood endpoint reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointInfo {
    pub index: usize,
    pub caption: String,
    pub image: String,
    pub similarity_score: f64,
}

/// Neighborhood response body as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodWire {
    pub projected_points: Vec<[f64; 2]>,
    pub neighbor_indices: Vec<usize>,
    pub neighbors_info: Vec<PointInfo>,
    #[serde(default)]
    pub explained_variance: Vec<f64>,
    pub selected_point: PointInfo,
}

/// A selected record plus its nearest neighbors projected to 2D.
///
/// Local index 0 is always the selected record; local index `i > 0` is the
/// neighbor of rank `i`, i.e. `neighbor_indices()[i - 1]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "NeighborhoodWire")]
pub struct Neighborhood {
    selected: PointInfo,
    projected_points: Vec<[f64; 2]>,
    neighbor_indices: Vec<usize>,
    neighbors: Vec<PointInfo>,
    explained_variance: Vec<f64>,
}

impl TryFrom<NeighborhoodWire> for Neighborhood {
    type Error = ApiError;

    fn try_from(wire: NeighborhoodWire) -> Result<Self, Self::Error> {
        let NeighborhoodWire {
            mut projected_points,
            mut neighbor_indices,
            neighbors_info: mut neighbors,
            explained_variance,
            selected_point,
        } = wire;

        if projected_points.is_empty() {
            return Err(ApiError::InvalidNeighborhood(
                "no projected points; the selected point must come first".to_string(),
            ));
        }

        if neighbor_indices.len() == projected_points.len() {
            strip_self_match(
                selected_point.index,
                &mut projected_points,
                &mut neighbor_indices,
                &mut neighbors,
            );
        }

        if projected_points.len() != neighbor_indices.len() + 1 {
            return Err(ApiError::InvalidNeighborhood(format!(
                "{} projected points for {} neighbors",
                projected_points.len(),
                neighbor_indices.len()
            )));
        }
        if neighbors.len() != neighbor_indices.len() {
            return Err(ApiError::InvalidNeighborhood(format!(
                "{} neighbor infos for {} neighbors",
                neighbors.len(),
                neighbor_indices.len()
            )));
        }

        Ok(Self {
            selected: selected_point,
            projected_points,
            neighbor_indices,
            neighbors,
            explained_variance,
        })
    }
}

/// The search returns the query among its own neighbors, usually first but
/// not always: an exact duplicate ties at distance zero and may rank ahead of
/// it. The query's projected point moves to the front and its neighbor
/// entries are dropped. A query missing from the list gives up the leading
/// entry instead.
fn strip_self_match(
    selected: usize,
    points: &mut Vec<[f64; 2]>,
    indices: &mut Vec<usize>,
    infos: &mut Vec<PointInfo>,
) {
    let listed = indices.len();
    let pos = match indices.iter().position(|&i| i == selected) {
        Some(pos) => pos,
        None => {
            debug!(selected, "selected record absent from its neighbor list");
            0
        }
    };
    if pos >= listed {
        return;
    }
    if pos > 0 {
        debug!(selected, rank = pos, "selected record tied behind a duplicate");
    }

    indices.remove(pos);
    let point = points.remove(pos);
    points.insert(0, point);

    let info_at = infos
        .iter()
        .position(|n| n.index == selected)
        .or_else(|| (infos.len() == listed).then_some(pos));
    if let Some(at) = info_at {
        infos.remove(at);
    }
}

impl Neighborhood {
    pub fn selected(&self) -> &PointInfo {
        &self.selected
    }

    pub fn selected_index(&self) -> usize {
        self.selected.index
    }

    pub fn projected_points(&self) -> &[[f64; 2]] {
        &self.projected_points
    }

    pub fn neighbor_indices(&self) -> &[usize] {
        &self.neighbor_indices
    }

    pub fn neighbors(&self) -> &[PointInfo] {
        &self.neighbors
    }

    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Number of plotted points, including the selected one.
    pub fn len(&self) -> usize {
        self.projected_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projected_points.is_empty()
    }

    /// Record index behind local point `local`.
    pub fn record_for(&self, local: usize) -> Option<usize> {
        match local {
            0 => Some(self.selected.index),
            i => self.neighbor_indices.get(i - 1).copied(),
        }
    }

    /// Display info behind local point `local`.
    pub fn info_for(&self, local: usize) -> Option<&PointInfo> {
        match local {
            0 => Some(&self.selected),
            i => self.neighbors.get(i - 1),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{info, neighborhood};
    use super::{Neighborhood, NeighborhoodWire, Record};
    use crate::error::ApiError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_corpus_record_without_embeddings() {
        let raw = json!({
            "caption": "a dog on a beach",
            "image": "aGVsbG8=",
            "umap_text_embedding": [1.0, 2.0, 3.0],
            "umap_image_embedding": null,
            "similarity_score": 0.31
        });
        let record: Record = serde_json::from_value(raw).expect("record");
        assert_eq!(record.text_projection, Some([1.0, 2.0, 3.0]));
        assert_eq!(record.image_projection, None);
        assert_eq!(record.average_projection, None);
        assert!(record.text_embedding.is_empty());
    }

    #[test]
    fn rejects_projection_of_wrong_dimension() {
        let raw = json!({
            "caption": "c",
            "image": "",
            "umap_text_embedding": [1.0, 2.0],
            "similarity_score": 0.0
        });
        assert!(serde_json::from_value::<Record>(raw).is_err());
    }

    #[test]
    fn local_index_zero_is_the_selected_record() {
        let n = neighborhood(42, &[7, 9, 11]);
        assert_eq!(n.len(), n.neighbor_indices().len() + 1);
        assert_eq!(n.record_for(0), Some(42));
        assert_eq!(n.record_for(1), Some(7));
        assert_eq!(n.record_for(3), Some(11));
        assert_eq!(n.record_for(4), None);
        assert_eq!(n.info_for(2).map(|i| i.index), Some(9));
    }

    #[test]
    fn strips_self_match_from_backend_lists() {
        // The reference backend lists the selected record as its own first neighbor.
        let raw = json!({
            "projected_points": [[0.0, 0.0], [0.1, 0.2], [0.3, -0.1]],
            "neighbor_indices": [5, 8, 2],
            "neighbors_info": [
                {"index": 5, "caption": "self", "image": "", "similarity_score": 0.3},
                {"index": 8, "caption": "n1", "image": "", "similarity_score": 0.2},
                {"index": 2, "caption": "n2", "image": "", "similarity_score": 0.1}
            ],
            "explained_variance": [0.5, 0.25],
            "selected_point": {"index": 5, "caption": "self", "image": "", "similarity_score": 0.3}
        });
        let n: Neighborhood = serde_json::from_value(raw).expect("neighborhood");
        assert_eq!(n.neighbor_indices(), &[8, 2]);
        assert_eq!(n.neighbors().len(), 2);
        assert_eq!(n.record_for(0), Some(5));
        assert_eq!(n.record_for(1), Some(8));
        assert_eq!(n.explained_variance(), &[0.5, 0.25]);
    }

    #[test]
    fn duplicate_ranked_ahead_of_the_selected_record_is_kept() {
        // Record 8 duplicates record 5 and ties ahead of it.
        let wire = NeighborhoodWire {
            projected_points: vec![[0.1, 0.1], [0.0, 0.0], [0.3, -0.1]],
            neighbor_indices: vec![8, 5, 2],
            neighbors_info: vec![info(8), info(5), info(2)],
            explained_variance: vec![0.5, 0.25],
            selected_point: info(5),
        };
        let n = Neighborhood::try_from(wire).expect("neighborhood");
        assert_eq!(n.neighbor_indices(), &[8, 2]);
        assert_eq!(n.projected_points(), &[[0.0, 0.0], [0.1, 0.1], [0.3, -0.1]]);
        assert_eq!(n.record_for(0), Some(5));
        assert_eq!(n.record_for(1), Some(8));
        assert_eq!(n.info_for(1).map(|i| i.index), Some(8));
        assert_eq!(n.info_for(2).map(|i| i.index), Some(2));
    }

    #[test]
    fn selected_record_missing_from_full_list_drops_the_leading_entry() {
        let wire = NeighborhoodWire {
            projected_points: vec![[0.0, 0.0], [0.2, 0.2]],
            neighbor_indices: vec![9, 4],
            neighbors_info: vec![info(9), info(4)],
            explained_variance: Vec::new(),
            selected_point: info(1),
        };
        let n = Neighborhood::try_from(wire).expect("neighborhood");
        assert_eq!(n.neighbor_indices(), &[4]);
        assert_eq!(n.neighbors().len(), 1);
        assert_eq!(n.record_for(0), Some(1));
        assert_eq!(n.info_for(1).map(|i| i.index), Some(4));
    }

    #[test]
    fn rejects_inconsistent_lengths() {
        let wire = NeighborhoodWire {
            projected_points: vec![[0.0, 0.0], [1.0, 1.0]],
            neighbor_indices: vec![3, 4, 5],
            neighbors_info: vec![info(3), info(4), info(5)],
            explained_variance: Vec::new(),
            selected_point: info(1),
        };
        assert!(matches!(
            Neighborhood::try_from(wire),
            Err(ApiError::InvalidNeighborhood(_))
        ));
    }

    #[test]
    fn rejects_empty_projection() {
        let wire = NeighborhoodWire {
            projected_points: Vec::new(),
            neighbor_indices: Vec::new(),
            neighbors_info: Vec::new(),
            explained_variance: Vec::new(),
            selected_point: info(0),
        };
        assert!(Neighborhood::try_from(wire).is_err());
    }

    #[test]
    fn lone_selected_point_is_valid() {
        let n = neighborhood(3, &[]);
        assert_eq!(n.len(), 1);
        assert_eq!(n.record_for(0), Some(3));
    }
}
