use crate::AngleEstimate;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Pairwise rotations of three cameras, rescaled to close the loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosedAngles {
    /// Rotations first→second, second→third, third→first after rescaling.
    pub angles: [f64; 3],
    /// The chosen hypotheses before rescaling.
    pub raw: [f64; 3],
    /// Full turns the loop makes, one or two.
    pub turns: u32,
    /// Distance of the raw sum from `turns * 2π`.
    pub error: f64,
}

impl ClosedAngles {
    /// Rotation of each camera from the first one.
    pub fn azimuths(&self) -> [f64; 3] {
        [0.0, self.angles[0], self.angles[0] + self.angles[1]]
    }
}

/// Pick one hypothesis per pair so that the three rotations sum closest to a
/// whole number of turns, then scale them to close exactly.
///
/// Sweep angles lie in `[0, 2π)`, so a consistent loop turns once or twice
/// depending on the direction it is walked.
pub fn close_angle_loop(ab: &AngleEstimate, bc: &AngleEstimate, ca: &AngleEstimate) -> ClosedAngles {
    let mut best: Option<ClosedAngles> = None;
    for a in ab.hypotheses() {
        for b in bc.hypotheses() {
            for c in ca.hypotheses() {
                let sum = a + b + c;
                let turns = (sum / TAU).round().clamp(1.0, 2.0);
                let target = turns * TAU;
                let error = (sum - target).abs();
                if best.as_ref().is_some_and(|prev| prev.error <= error) {
                    continue;
                }
                let scale = if sum > f64::EPSILON { target / sum } else { 1.0 };
                best = Some(ClosedAngles {
                    angles: [a * scale, b * scale, c * scale],
                    raw: [a, b, c],
                    turns: turns as u32,
                    error,
                });
            }
        }
    }
    // ab always has two hypotheses, so the loop ran
    best.unwrap_or(ClosedAngles {
        angles: [ab.best, bc.best, ca.best],
        raw: [ab.best, bc.best, ca.best],
        turns: 1,
        error: f64::INFINITY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn est(best: f64, second: f64) -> AngleEstimate {
        AngleEstimate {
            best: best.to_radians(),
            second: second.to_radians(),
            best_score: 2.0,
            second_score: 1.0,
            peaks: 2,
        }
    }

    #[test]
    fn picks_consistent_combination_and_rescales() {
        // true loop 100 + 130 + 130; mirror hypotheses are far off
        let closed = close_angle_loop(&est(201.0, 101.0), &est(131.0, 20.0), &est(130.0, 300.0));
        assert_eq!(closed.turns, 1);
        assert_relative_eq!(closed.raw[0], 101f64.to_radians());
        let sum: f64 = closed.angles.iter().sum();
        assert_relative_eq!(sum, TAU, epsilon = 1e-12);
        assert_relative_eq!(closed.angles[0], 101.0 * 360.0 / 362.0 * TAU / 360.0, epsilon = 1e-12);
        assert_relative_eq!(closed.azimuths()[2], (101.0 + 131.0) * TAU / 362.0, epsilon = 1e-12);
    }

    #[test]
    fn reverse_walk_closes_in_two_turns() {
        let closed = close_angle_loop(&est(260.0, 10.0), &est(230.0, 5.0), &est(230.0, 7.0));
        assert_eq!(closed.turns, 2);
        assert_relative_eq!(closed.error, 0.0, epsilon = 1e-12);
        assert_relative_eq!(closed.angles[0], 260f64.to_radians(), epsilon = 1e-12);
    }
}
