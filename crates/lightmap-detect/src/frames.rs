use crate::{DetectError, MAX_SIGNATURE_BITS};
use lightmap_core::{abs_diff, GrayImageView};

/// Background-subtracted brightness series for every pixel of a capture.
///
/// Pixels are indexed row-major (`index = row * width + column`); the series
/// of one pixel is contiguous, first frame first.
#[derive(Clone, Debug)]
pub struct FrameStack {
    width: usize,
    height: usize,
    num_frames: usize,
    data: Vec<f64>,
    full_on: Vec<f64>,
}

impl FrameStack {
    /// Build from pixel-major series and per-pixel all-on brightness gain.
    pub fn new(
        width: usize,
        height: usize,
        num_frames: usize,
        data: Vec<f64>,
        full_on: Vec<f64>,
    ) -> Result<Self, DetectError> {
        if num_frames == 0 {
            return Err(DetectError::EmptySequence);
        }
        if num_frames > MAX_SIGNATURE_BITS {
            return Err(DetectError::TooManyFrames {
                frames: num_frames,
                max: MAX_SIGNATURE_BITS,
            });
        }
        let pixels = width * height;
        if data.len() != pixels * num_frames {
            return Err(DetectError::ShapeMismatch {
                expected: pixels * num_frames,
                actual: data.len(),
            });
        }
        if full_on.len() != pixels {
            return Err(DetectError::ShapeMismatch {
                expected: pixels,
                actual: full_on.len(),
            });
        }
        Ok(Self {
            width,
            height,
            num_frames,
            data,
            full_on,
        })
    }

    /// Build from the capture frames.
    ///
    /// `ground` has every light off, `all_on` every light on, and `frames`
    /// holds one frame per signature bit, high bit first. Each frame is
    /// differenced against `ground`.
    pub fn from_views(
        ground: &GrayImageView<'_>,
        all_on: &GrayImageView<'_>,
        frames: &[GrayImageView<'_>],
    ) -> Result<Self, DetectError> {
        let full_on = abs_diff(all_on, ground)?;
        let diffs = frames
            .iter()
            .map(|f| abs_diff(f, ground))
            .collect::<Result<Vec<_>, _>>()?;

        let pixels = ground.width * ground.height;
        let num_frames = diffs.len();
        let mut data = Vec::with_capacity(pixels * num_frames);
        for idx in 0..pixels {
            data.extend(diffs.iter().map(|d| d.data[idx] as f64));
        }
        let full_on = full_on.data.iter().map(|&v| v as f64).collect();
        Self::new(ground.width, ground.height, num_frames, data, full_on)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Brightness series of pixel `idx`.
    #[inline]
    pub fn pixel(&self, idx: usize) -> &[f64] {
        let start = idx * self.num_frames;
        &self.data[start..start + self.num_frames]
    }

    /// All-on minus ground brightness of pixel `idx`.
    #[inline]
    pub fn full_on_weight(&self, idx: usize) -> f64 {
        self.full_on[idx]
    }

    /// `(column, row)` of pixel `idx`.
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightmap_core::GrayImage;

    fn img(data: Vec<u8>) -> GrayImage {
        GrayImage {
            width: 2,
            height: 2,
            data,
        }
    }

    #[test]
    fn views_are_differenced_against_ground() {
        let ground = img(vec![10, 10, 10, 10]);
        let all_on = img(vec![200, 10, 15, 90]);
        let f0 = img(vec![200, 10, 10, 10]);
        let f1 = img(vec![10, 10, 10, 90]);
        let stack =
            FrameStack::from_views(&ground.view(), &all_on.view(), &[f0.view(), f1.view()])
                .unwrap();
        assert_eq!(stack.num_frames(), 2);
        assert_eq!(stack.pixel(0), &[190.0, 0.0]);
        assert_eq!(stack.pixel(3), &[0.0, 80.0]);
        assert_eq!(stack.full_on_weight(2), 5.0);
        assert_eq!(stack.coords(3), (1, 1));
    }

    #[test]
    fn shape_is_checked() {
        assert!(matches!(
            FrameStack::new(2, 2, 3, vec![0.0; 11], vec![0.0; 4]),
            Err(DetectError::ShapeMismatch { expected: 12, actual: 11 })
        ));
        assert!(matches!(
            FrameStack::new(1, 1, 0, vec![], vec![0.0]),
            Err(DetectError::EmptySequence)
        ));
    }
}
