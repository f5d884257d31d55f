use crate::{
    camera_distance_from_angle, CameraPosition, GeometryError, GeometryParams, LightRecord,
    ProjectionParams,
};
use lightmap_core::{
    distance, fit_line, load_candidate_file, median, LightCandidate, LightId, LineFit,
};
use log::{debug, warn};
use nalgebra::Point2;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Everything known about one photograph.
///
/// Derived state (selected candidates, reliability, center column, reference
/// line) is recomputed by [`PhotographGeometry::refresh`]; nothing is cached
/// lazily.
#[derive(Clone, Debug)]
pub struct PhotographGeometry {
    name: String,
    projection: ProjectionParams,
    params: GeometryParams,
    records: BTreeMap<LightId, LightRecord>,
    selected: BTreeMap<LightId, usize>,
    neighbor_distance: BTreeMap<LightId, f64>,
    median_step: Option<f64>,
    reliable: BTreeSet<LightId>,
    center_column: f64,
    reference_line: Option<LineFit>,
    camera: CameraPosition,
}

impl PhotographGeometry {
    /// Build the model from the candidates of one photograph.
    ///
    /// Fails when no detection is reliable or the widest reliable angle is
    /// degenerate.
    pub fn new(
        name: impl Into<String>,
        candidates: impl IntoIterator<Item = LightCandidate>,
        projection: &ProjectionParams,
        params: &GeometryParams,
    ) -> Result<Self, GeometryError> {
        let mut records: BTreeMap<LightId, LightRecord> = BTreeMap::new();
        for c in candidates {
            if c.light as usize >= params.num_lights {
                debug!("ignoring candidate for out-of-range light {}", c.light);
                continue;
            }
            match records.get_mut(&c.light) {
                Some(rec) => rec.push(c),
                None => {
                    records.insert(c.light, LightRecord::new(c));
                }
            }
        }

        let mut geometry = Self {
            name: name.into(),
            projection: projection.clone(),
            params: params.clone(),
            records,
            selected: BTreeMap::new(),
            neighbor_distance: BTreeMap::new(),
            median_step: None,
            reliable: BTreeSet::new(),
            center_column: 0.0,
            reference_line: None,
            camera: CameraPosition::new(1.0, Point2::origin())?,
        };
        geometry.refresh()?;
        Ok(geometry)
    }

    /// Load a candidate file; rows without a valid light id are skipped.
    pub fn from_candidate_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        projection: &ProjectionParams,
        params: &GeometryParams,
    ) -> Result<Self, GeometryError> {
        let rows = load_candidate_file(path)?;
        let total = rows.len();
        let candidates: Vec<LightCandidate> = rows
            .iter()
            .filter_map(|r| r.to_candidate(params.num_lights))
            .collect();
        if candidates.len() < total {
            debug!("skipped {} unmatched rows", total - candidates.len());
        }
        Self::new(name, candidates, projection, params)
    }

    /// Recompute derived state and re-initialize the camera from it.
    ///
    /// Call after marking candidates incorrect or assigning strings. Any
    /// camera refinement is discarded.
    pub fn refresh(&mut self) -> Result<(), GeometryError> {
        self.select_candidates();
        self.update_reliability();

        let columns: Vec<f64> = self
            .reliable
            .iter()
            .filter_map(|id| self.position(*id))
            .map(|p| p.x)
            .collect();
        self.center_column = center_column(&columns).ok_or_else(|| {
            GeometryError::NoReliableDetections {
                name: self.name.clone(),
            }
        })?;

        let active: Vec<Point2<f64>> = self.selected_positions().map(|(_, p)| p).collect();
        self.reference_line = fit_line(&active);

        let origin = Point2::new(self.center_column, self.projection.center_row());
        let widest = self
            .reliable
            .iter()
            .filter_map(|&id| self.position(id))
            .map(|p| self.horizontal_angle_at(&p, &origin).abs())
            .fold(0.0, f64::max);
        let camera_distance = camera_distance_from_angle(widest).inspect_err(|_| {
            warn!("photograph {}: widest reliable angle is {widest} rad", self.name);
        })?;
        self.camera = CameraPosition::new(camera_distance, origin)?;
        debug!(
            "photograph {}: {} lights, {} reliable, center column {}, distance {:.3}",
            self.name,
            self.selected.len(),
            self.reliable.len(),
            self.center_column,
            camera_distance
        );
        Ok(())
    }

    /// Pick one candidate per active light. A light's string assignment wins;
    /// otherwise the candidate closest on average to its neighbors' best
    /// matches, with ties going to the best match.
    fn select_candidates(&mut self) {
        let span = self.params.neighbor_span.max(1) as i64;
        let mut selected = BTreeMap::new();
        for (&id, rec) in &self.records {
            if !rec.is_active() {
                continue;
            }
            if let Some(idx) = rec.in_string() {
                selected.insert(id, idx);
                continue;
            }
            let neighbors: Vec<Point2<f64>> = (1..=span)
                .flat_map(|k| [id as i64 - k, id as i64 + k])
                .filter(|&n| n >= 0)
                .filter_map(|n| self.records.get(&(n as LightId)))
                .filter(|r| r.is_active())
                .map(|r| r.best_candidate().position())
                .collect();

            let mean_dist = |idx: usize| -> f64 {
                if neighbors.is_empty() {
                    return f64::INFINITY;
                }
                let p = rec.candidates()[idx].position();
                neighbors.iter().map(|n| distance(&p, n)).sum::<f64>() / neighbors.len() as f64
            };

            let mut best = rec.best_match();
            let mut best_dist = mean_dist(best);
            for idx in rec.active_indices() {
                let d = mean_dist(idx);
                if d < best_dist {
                    best = idx;
                    best_dist = d;
                }
            }
            selected.insert(id, best);
        }
        self.selected = selected;
    }

    fn update_reliability(&mut self) {
        let span = self.params.neighbor_span.max(1) as u32;
        let mut neighbor_distance = BTreeMap::new();
        let mut steps = Vec::new();
        for (&id, _) in &self.selected {
            let Some(p) = self.position(id) else { continue };
            let mut sum = 0.0;
            let mut count = 0usize;
            for k in 1..=span {
                let around = [id.checked_sub(k), id.checked_add(k)];
                for n in around.into_iter().flatten() {
                    if let Some(q) = self.position(n) {
                        sum += distance(&p, &q);
                        count += 1;
                    }
                }
            }
            if count > 0 {
                neighbor_distance.insert(id, sum / count as f64);
            }
            if let Some(q) = id.checked_add(1).and_then(|n| self.position(n)) {
                steps.push(distance(&p, &q));
            }
        }

        self.median_step = median(&steps);
        let limit = self
            .median_step
            .map(|m| self.params.reliability_factor * m);
        self.reliable = neighbor_distance
            .iter()
            .filter(|(_, &d)| limit.is_none_or(|l| d <= l))
            .map(|(&id, _)| id)
            .collect();
        self.neighbor_distance = neighbor_distance;
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn projection(&self) -> &ProjectionParams {
        &self.projection
    }

    #[inline]
    pub fn params(&self) -> &GeometryParams {
        &self.params
    }

    pub fn records(&self) -> impl Iterator<Item = &LightRecord> {
        self.records.values()
    }

    #[inline]
    pub fn record(&self, id: LightId) -> Option<&LightRecord> {
        self.records.get(&id)
    }

    #[inline]
    pub(crate) fn record_mut(&mut self, id: LightId) -> Option<&mut LightRecord> {
        self.records.get_mut(&id)
    }

    /// Selected candidate of a light, if it is present and active.
    pub fn selected_candidate(&self, id: LightId) -> Option<&LightCandidate> {
        let idx = *self.selected.get(&id)?;
        self.records.get(&id)?.candidate(idx)
    }

    #[inline]
    pub fn selected_index(&self, id: LightId) -> Option<usize> {
        self.selected.get(&id).copied()
    }

    /// Pixel `(column, row)` of a light's selected candidate.
    pub fn position(&self, id: LightId) -> Option<Point2<f64>> {
        self.selected_candidate(id).map(LightCandidate::position)
    }

    pub fn selected_positions(&self) -> impl Iterator<Item = (LightId, Point2<f64>)> + '_ {
        self.selected
            .keys()
            .filter_map(move |&id| self.position(id).map(|p| (id, p)))
    }

    #[inline]
    pub fn is_reliable(&self, id: LightId) -> bool {
        self.reliable.contains(&id)
    }

    pub fn reliable(&self) -> impl Iterator<Item = LightId> + '_ {
        self.reliable.iter().copied()
    }

    /// Lights reliable in both photographs, ascending.
    pub fn shared_reliable(&self, other: &PhotographGeometry) -> Vec<LightId> {
        self.reliable.intersection(&other.reliable).copied().collect()
    }

    /// Lights with a selected candidate in both photographs, ascending.
    pub fn shared_lights(&self, other: &PhotographGeometry) -> Vec<LightId> {
        self.selected
            .keys()
            .filter(|id| other.selected.contains_key(id))
            .copied()
            .collect()
    }

    #[inline]
    pub fn neighbor_distance(&self, id: LightId) -> Option<f64> {
        self.neighbor_distance.get(&id).copied()
    }

    #[inline]
    pub fn median_step(&self) -> Option<f64> {
        self.median_step
    }

    #[inline]
    pub fn center_column(&self) -> f64 {
        self.center_column
    }

    /// Line through all active selected detections; `None` below two.
    #[inline]
    pub fn reference_line(&self) -> Option<&LineFit> {
        self.reference_line.as_ref()
    }

    #[inline]
    pub fn camera(&self) -> &CameraPosition {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut CameraPosition {
        &mut self.camera
    }

    /// Horizontal angle of a pixel from the camera's optical origin,
    /// positive to the right.
    #[inline]
    pub fn horizontal_angle_of(&self, p: &Point2<f64>) -> f64 {
        self.horizontal_angle_at(p, &self.camera.origin)
    }

    /// Vertical angle of a pixel from the camera's optical origin, positive up.
    #[inline]
    pub fn vertical_angle_of(&self, p: &Point2<f64>) -> f64 {
        (self.camera.origin.y - p.y) * self.projection.rad_per_px_y()
    }

    pub fn horizontal_angle(&self, id: LightId) -> Option<f64> {
        self.position(id).map(|p| self.horizontal_angle_of(&p))
    }

    pub fn vertical_angle(&self, id: LightId) -> Option<f64> {
        self.position(id).map(|p| self.vertical_angle_of(&p))
    }

    #[inline]
    fn horizontal_angle_at(&self, p: &Point2<f64>, origin: &Point2<f64>) -> f64 {
        (p.x - origin.x) * self.projection.rad_per_px_x()
    }
}

/// Integer column minimizing the summed squared distance to `columns`,
/// scanned left to right over the occupied range.
fn center_column(columns: &[f64]) -> Option<f64> {
    let lo = columns.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = columns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let cost = |c: f64| columns.iter().map(|x| (x - c).powi(2)).sum::<f64>();
    let (mut best, mut best_cost) = (lo.floor(), f64::INFINITY);
    let mut c = lo.floor();
    while c <= hi.ceil() {
        let e = cost(c);
        if e < best_cost {
            best = c;
            best_cost = e;
        }
        c += 1.0;
    }
    Some(best)
}
