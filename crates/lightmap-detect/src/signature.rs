use crate::DetectError;
use serde::{Deserialize, Serialize};

/// A signature number must fit in a `u32`.
pub const MAX_SIGNATURE_BITS: usize = 32;

/// Decoded on/off pattern of one brightness series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// `'1'` for frames at or above the series mean, first frame is the high bit.
    pub bits: String,
    pub number: u32,
    /// Spread of the on group around its own mean plus the same for the off
    /// group. Small values mean a clean two-level series.
    pub score: f64,
    pub mean: f64,
}

/// Threshold a brightness series against its own mean.
pub fn decode_signature(values: &[f64]) -> Result<Signature, DetectError> {
    if values.is_empty() {
        return Err(DetectError::EmptySequence);
    }
    if values.len() > MAX_SIGNATURE_BITS {
        return Err(DetectError::TooManyFrames {
            frames: values.len(),
            max: MAX_SIGNATURE_BITS,
        });
    }
    if let Some(frame) = values.iter().position(|v| !v.is_finite()) {
        return Err(DetectError::NonFiniteValue { frame });
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mut bits = String::with_capacity(values.len());
    let mut number = 0u32;
    for &v in values {
        let on = v >= mean;
        bits.push(if on { '1' } else { '0' });
        number = (number << 1) | on as u32;
    }

    // values equal to the mean belong to neither group
    let above: Vec<f64> = values.iter().copied().filter(|&v| v > mean).collect();
    let below: Vec<f64> = values.iter().copied().filter(|&v| v < mean).collect();
    let score = spread(&above) + spread(&below);

    Ok(Signature {
        bits,
        number,
        score,
        mean,
    })
}

fn spread(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - m).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn high_bit_comes_first() {
        let sig = decode_signature(&[200.0, 10.0, 10.0, 190.0]).unwrap();
        assert_eq!(sig.bits, "1001");
        assert_eq!(sig.number, 0b1001);
        assert_relative_eq!(sig.mean, 102.5);
        assert_relative_eq!(sig.score, 50.0);
    }

    #[test]
    fn clean_series_scores_zero() {
        let sig = decode_signature(&[0.0, 100.0, 0.0, 100.0, 100.0]).unwrap();
        assert_eq!(sig.bits, "01011");
        assert_relative_eq!(sig.score, 0.0);
    }

    #[test]
    fn straddling_pixel_scores_worse() {
        let clean = decode_signature(&[0.0, 120.0, 0.0, 120.0]).unwrap();
        let mixed = decode_signature(&[0.0, 120.0, 60.0, 90.0]).unwrap();
        assert!(mixed.score > clean.score);
    }

    #[test]
    fn decoding_is_deterministic() {
        let series = [12.0, 80.5, 79.0, 3.0, 44.0, 91.0, 7.5, 60.0];
        let a = decode_signature(&series).unwrap();
        let b = decode_signature(&series).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flat_series_is_all_ones() {
        let sig = decode_signature(&[5.0; 3]).unwrap();
        assert_eq!(sig.bits, "111");
        assert_relative_eq!(sig.score, 0.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(decode_signature(&[]), Err(DetectError::EmptySequence)));
        assert!(matches!(
            decode_signature(&[1.0; 33]),
            Err(DetectError::TooManyFrames { frames: 33, .. })
        ));
        assert!(matches!(
            decode_signature(&[1.0, f64::NAN]),
            Err(DetectError::NonFiniteValue { frame: 1 })
        ));
    }
}
