use super::{ClusterParams, ClusterReport, LightDetection};
use crate::{decode_signature, kmeans, DetectError, FrameStack, PixelArena, Signature};
use lightmap_core::{IdentityMap, LightCandidate, DEFAULT_NUM_LIGHTS};
use log::{debug, info, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A k-means cluster over the enabled pixels.
#[derive(Clone, Debug)]
struct PixelGroup {
    pixels: Vec<usize>,
    signature: Signature,
}

/// Clusters a [`FrameStack`] into light detections.
pub struct PixelClusterer {
    params: ClusterParams,
    identity: IdentityMap,
    num_lights: usize,
}

impl PixelClusterer {
    pub fn new(params: ClusterParams, identity: IdentityMap) -> Self {
        Self {
            params,
            identity,
            num_lights: DEFAULT_NUM_LIGHTS,
        }
    }

    /// Light ids at or above `num_lights` are treated as unresolved.
    pub fn with_num_lights(mut self, num_lights: usize) -> Self {
        self.num_lights = num_lights;
        self
    }

    #[inline]
    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(width = frames.width(), height = frames.height())))]
    pub fn run(&self, frames: &FrameStack) -> Result<ClusterReport, DetectError> {
        let mut arena = PixelArena::new(frames.num_pixels());
        for idx in 0..frames.num_pixels() {
            if frames.full_on_weight(idx) < self.params.noise_threshold {
                arena.disable(idx);
            }
        }
        debug!(
            "{} of {} pixels above noise threshold",
            arena.enabled_count(),
            arena.len()
        );

        let limit = self.params.round_limit();
        let mut rounds = 0;
        let mut groups = self.recluster(frames, &mut arena, &mut rounds)?;

        // oversized clusters are background
        while rounds < limit {
            let Some(biggest) = groups.iter().max_by_key(|g| g.pixels.len()) else {
                break;
            };
            if biggest.pixels.len() <= self.params.max_cluster_size {
                break;
            }
            debug!("removing background cluster of {} pixels", biggest.pixels.len());
            arena.disable_all(&biggest.pixels);
            groups = self.recluster(frames, &mut arena, &mut rounds)?;
        }

        let mut detections: Vec<LightDetection> = Vec::new();
        let mut fresh = true;
        while detections.len() < self.params.expected_lights {
            if !fresh {
                if rounds >= limit {
                    break;
                }
                groups = self.recluster(frames, &mut arena, &mut rounds)?;
            }
            fresh = false;
            if groups.is_empty() {
                break;
            }

            groups.sort_by(|a, b| a.signature.score.total_cmp(&b.signature.score));
            let best = &groups[..self.params.best_count().min(groups.len())];
            let (smallest, largest) = extremes_by_size(best);

            let mut taken = vec![smallest];
            if largest != smallest {
                taken.push(largest);
            }
            for &i in &taken {
                let group = &best[i];
                arena.disable_all(&group.pixels);
                self.register(&mut detections, group, frames);
            }
        }

        let shortfall = self
            .params
            .expected_lights
            .saturating_sub(detections.len());
        if shortfall > 0 {
            warn!(
                "clustering stopped after {rounds} rounds with {} of {} lights",
                detections.len(),
                self.params.expected_lights
            );
        }

        let candidates: Vec<LightCandidate> = detections
            .iter()
            .filter_map(|d| d.to_row().to_candidate(self.num_lights))
            .collect();
        let unresolved = detections.len() - candidates.len();
        info!(
            "{} detections, {} resolved, {} unresolved",
            detections.len(),
            candidates.len(),
            unresolved
        );

        Ok(ClusterReport {
            detections,
            candidates,
            shortfall,
            unresolved,
            rounds,
        })
    }

    fn recluster(
        &self,
        frames: &FrameStack,
        arena: &mut PixelArena,
        rounds: &mut usize,
    ) -> Result<Vec<PixelGroup>, DetectError> {
        *rounds += 1;
        let enabled = arena.enabled();
        let k = self.params.expected_lights.min(enabled.len());
        let points: Vec<&[f64]> = enabled.iter().map(|&i| frames.pixel(i)).collect();
        let result = kmeans(&points, k, &self.params.kmeans);

        let mut groups: Vec<PixelGroup> = Vec::with_capacity(result.centers.len());
        for center in &result.centers {
            groups.push(PixelGroup {
                pixels: Vec::new(),
                signature: decode_signature(center)?,
            });
        }
        for (&idx, &label) in enabled.iter().zip(&result.labels) {
            arena.set_group(idx, label);
            groups[label].pixels.push(idx);
        }
        Ok(groups)
    }

    /// Add a group as a detection, merging into an earlier one with the same
    /// signature whose center lies within the combined blob radius.
    fn register(
        &self,
        detections: &mut Vec<LightDetection>,
        group: &PixelGroup,
        frames: &FrameStack,
    ) {
        let (x, y) = centroid(&group.pixels, frames);
        for d in detections.iter_mut() {
            if d.signature.number != group.signature.number {
                continue;
            }
            let dx = (d.x - x) as i64;
            let dy = (d.y - y) as i64;
            if dx * dx + dy * dy < (d.size() + group.pixels.len()) as i64 {
                d.pixels.extend_from_slice(&group.pixels);
                (d.x, d.y) = centroid(&d.pixels, frames);
                debug!("merged cluster into detection {}", d.signature.bits);
                return;
            }
        }
        detections.push(LightDetection {
            x,
            y,
            light: self.identity.resolve(group.signature.number),
            signature: group.signature.clone(),
            pixels: group.pixels.clone(),
        });
    }
}

/// Indices of the smallest and largest groups; the first one wins ties.
fn extremes_by_size(groups: &[PixelGroup]) -> (usize, usize) {
    let mut smallest = 0;
    let mut largest = 0;
    for (i, g) in groups.iter().enumerate().skip(1) {
        if g.pixels.len() < groups[smallest].pixels.len() {
            smallest = i;
        }
        if g.pixels.len() > groups[largest].pixels.len() {
            largest = i;
        }
    }
    (smallest, largest)
}

/// Truncated mean `(column, row)` of the pixels.
fn centroid(pixels: &[usize], frames: &FrameStack) -> (i32, i32) {
    if pixels.is_empty() {
        return (0, 0);
    }
    let (sx, sy) = pixels.iter().fold((0usize, 0usize), |(sx, sy), &i| {
        let (x, y) = frames.coords(i);
        (sx + x, sy + y)
    });
    ((sx / pixels.len()) as i32, (sy / pixels.len()) as i32)
}
