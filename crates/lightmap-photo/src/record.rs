use lightmap_core::{LightCandidate, LightId};
use std::collections::BTreeSet;

/// All candidates of one light in one photograph.
///
/// The best match is kept up to date by every mutation: the in-string
/// candidate when there is one, otherwise the lowest-score candidate not
/// marked incorrect.
#[derive(Clone, Debug)]
pub struct LightRecord {
    id: LightId,
    candidates: Vec<LightCandidate>,
    incorrect: BTreeSet<usize>,
    in_string: Option<usize>,
    best_match: usize,
}

impl LightRecord {
    pub fn new(candidate: LightCandidate) -> Self {
        Self {
            id: candidate.light,
            candidates: vec![candidate],
            incorrect: BTreeSet::new(),
            in_string: None,
            best_match: 0,
        }
    }

    /// Add another candidate of the same light; other ids are ignored.
    pub fn push(&mut self, candidate: LightCandidate) {
        if candidate.light != self.id {
            log::debug!(
                "candidate for light {} offered to record {}",
                candidate.light,
                self.id
            );
            return;
        }
        self.candidates.push(candidate);
        self.update_best_match();
    }

    #[inline]
    pub fn id(&self) -> LightId {
        self.id
    }

    #[inline]
    pub fn candidates(&self) -> &[LightCandidate] {
        &self.candidates
    }

    #[inline]
    pub fn candidate(&self, idx: usize) -> Option<&LightCandidate> {
        self.candidates.get(idx)
    }

    #[inline]
    pub fn best_match(&self) -> usize {
        self.best_match
    }

    pub fn best_candidate(&self) -> &LightCandidate {
        &self.candidates[self.best_match]
    }

    #[inline]
    pub fn in_string(&self) -> Option<usize> {
        self.in_string
    }

    #[inline]
    pub fn is_incorrect(&self, idx: usize) -> bool {
        self.incorrect.contains(&idx)
    }

    /// At least one candidate is not marked incorrect.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.incorrect.len() < self.candidates.len()
    }

    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.candidates.len()).filter(|i| !self.incorrect.contains(i))
    }

    /// Mark a candidate as incorrect. Returns `false` when it already was or
    /// the index is out of range.
    pub fn mark_incorrect(&mut self, idx: usize) -> bool {
        if idx >= self.candidates.len() || !self.incorrect.insert(idx) {
            return false;
        }
        if self.in_string == Some(idx) {
            self.in_string = None;
        }
        self.update_best_match();
        true
    }

    /// Make `idx` the one in-string candidate. Incorrect candidates are refused.
    pub fn assign_to_string(&mut self, idx: usize) -> bool {
        if idx >= self.candidates.len() || self.incorrect.contains(&idx) {
            return false;
        }
        self.in_string = Some(idx);
        self.update_best_match();
        true
    }

    pub fn clear_string(&mut self) {
        self.in_string = None;
        self.update_best_match();
    }

    fn update_best_match(&mut self) {
        if let Some(idx) = self.in_string {
            self.best_match = idx;
            return;
        }
        self.best_match = self
            .active_indices()
            .min_by(|&a, &b| {
                self.candidates[a]
                    .score
                    .total_cmp(&self.candidates[b].score)
                    .then(a.cmp(&b))
            })
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(x: i32, score: f64) -> LightCandidate {
        LightCandidate {
            light: 7,
            x,
            y: 0,
            score,
            signature: "0111".into(),
        }
    }

    #[test]
    fn best_match_follows_score_then_string() {
        let mut rec = LightRecord::new(cand(0, 30.0));
        rec.push(cand(1, 10.0));
        rec.push(cand(2, 20.0));
        assert_eq!(rec.best_match(), 1);

        assert!(rec.mark_incorrect(1));
        assert_eq!(rec.best_match(), 2);
        assert!(!rec.mark_incorrect(1));

        assert!(rec.assign_to_string(0));
        assert_eq!(rec.best_match(), 0);
        assert!(!rec.assign_to_string(1));
        assert_eq!(rec.in_string(), Some(0));

        assert!(rec.mark_incorrect(0));
        assert_eq!(rec.in_string(), None);
        assert_eq!(rec.best_match(), 2);
        assert!(rec.is_active());
        assert!(rec.mark_incorrect(2));
        assert!(!rec.is_active());
        assert_eq!(rec.active_indices().count(), 0);
    }

    #[test]
    fn foreign_candidate_is_ignored() {
        let mut rec = LightRecord::new(cand(0, 1.0));
        let mut other = cand(5, 0.0);
        other.light = 8;
        rec.push(other);
        assert_eq!(rec.candidates().len(), 1);
    }
}
