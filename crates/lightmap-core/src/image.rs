use crate::CoreError;

/// Borrowed 8-bit grayscale frame.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

impl GrayImageView<'_> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-pixel `|a - b|`, the background subtraction used on capture frames.
pub fn abs_diff(a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> Result<GrayImage, CoreError> {
    if a.width != b.width || a.height != b.height || a.data.len() != b.data.len() {
        return Err(CoreError::ImageSizeMismatch {
            left_width: a.width,
            left_height: a.height,
            right_width: b.width,
            right_height: b.height,
        });
    }
    let data = a
        .data
        .iter()
        .zip(b.data)
        .map(|(&p, &q)| p.abs_diff(q))
        .collect();
    Ok(GrayImage {
        width: a.width,
        height: a.height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_diff_is_symmetric() {
        let a = GrayImage {
            width: 2,
            height: 1,
            data: vec![10, 200],
        };
        let b = GrayImage {
            width: 2,
            height: 1,
            data: vec![30, 50],
        };
        let d = abs_diff(&a.view(), &b.view()).unwrap();
        assert_eq!(d.data, vec![20, 150]);
        assert_eq!(abs_diff(&b.view(), &a.view()).unwrap(), d);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let a = GrayImage {
            width: 2,
            height: 1,
            data: vec![0, 0],
        };
        let b = GrayImage {
            width: 1,
            height: 2,
            data: vec![0, 0],
        };
        assert!(matches!(
            abs_diff(&a.view(), &b.view()),
            Err(CoreError::ImageSizeMismatch { .. })
        ));
    }
}
