//! Build frame stacks from decoded `image` buffers.

use crate::PipelineError;
use lightmap_core::GrayImageView;
use lightmap_detect::FrameStack;
use std::path::Path;

/// Convert an `image::GrayImage` into the lightweight core view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Frame stack of one capture: all lights off, all lights on, then one frame
/// per signature bit, most significant first.
pub fn frame_stack_from_images(
    ground: &::image::GrayImage,
    all_on: &::image::GrayImage,
    frames: &[::image::GrayImage],
) -> Result<FrameStack, PipelineError> {
    let views: Vec<GrayImageView<'_>> = frames.iter().map(gray_view).collect();
    Ok(FrameStack::from_views(
        &gray_view(ground),
        &gray_view(all_on),
        &views,
    )?)
}

/// Load a capture from image files and convert each to 8-bit grayscale.
pub fn load_frame_stack(
    ground: impl AsRef<Path>,
    all_on: impl AsRef<Path>,
    frames: &[impl AsRef<Path>],
) -> Result<FrameStack, PipelineError> {
    let open = |p: &Path| -> Result<::image::GrayImage, PipelineError> {
        Ok(::image::open(p)?.to_luma8())
    };
    let ground = open(ground.as_ref())?;
    let all_on = open(all_on.as_ref())?;
    let frames = frames
        .iter()
        .map(|p| open(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    frame_stack_from_images(&ground, &all_on, &frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, Luma};

    #[test]
    fn differences_are_taken_against_ground() {
        let ground = GrayImage::from_pixel(4, 3, Luma([10]));
        let mut all_on = ground.clone();
        all_on.put_pixel(1, 2, Luma([250]));
        let mut bit = ground.clone();
        bit.put_pixel(1, 2, Luma([130]));

        let stack = frame_stack_from_images(&ground, &all_on, &[bit, ground.clone()])
            .expect("same sizes");
        assert_eq!(stack.width(), 4);
        assert_eq!(stack.height(), 3);
        assert_eq!(stack.num_frames(), 2);
        let idx = 2 * 4 + 1;
        assert_eq!(stack.pixel(idx), &[120.0, 0.0]);
        assert_eq!(stack.coords(idx), (1, 2));
    }

    #[test]
    fn size_mismatch_is_reported() {
        let ground = GrayImage::new(4, 3);
        let other = GrayImage::new(3, 3);
        let err = frame_stack_from_images(&ground, &other, &[]).unwrap_err();
        assert!(matches!(err, PipelineError::Detect(_)));
    }
}
