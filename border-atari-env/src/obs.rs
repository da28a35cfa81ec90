//! Observation of [`BorderAtariEnv`](crate::BorderAtariEnv).
use crate::{pipeline::Pixels, AtariEnvError};
use border_core::Obs;
use std::convert::TryFrom;

/// Stacked grayscale frames, channel first.
///
/// With the standard preprocessing, 4 frames of 84x84 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderAtariObs {
    // n_stack * height * width
    frames: Vec<u8>,
    n_stack: usize,
    height: usize,
    width: usize,
}

impl BorderAtariObs {
    /// Pixel intensities, frame by frame, oldest first.
    pub fn frames(&self) -> &[u8] {
        &self.frames
    }

    /// `[n_stack, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.n_stack, self.height, self.width]
    }
}

impl TryFrom<Pixels> for BorderAtariObs {
    type Error = AtariEnvError;

    fn try_from(pixels: Pixels) -> Result<Self, Self::Error> {
        let stack = match pixels {
            Pixels::Stack(stack) if !stack.is_empty() => stack,
            p => {
                return Err(AtariEnvError::Pipeline(format!(
                    "observation must be non-empty stacked frames, got {} frames",
                    p.kind()
                )))
            }
        };

        let (width, height) = stack[0].dimensions();
        let mut frames = Vec::with_capacity(stack.len() * (width * height) as usize);
        for frame in stack.iter() {
            frames.extend_from_slice(frame.as_raw());
        }

        Ok(Self {
            frames,
            n_stack: stack.len(),
            height: height as usize,
            width: width as usize,
        })
    }
}

impl Obs for BorderAtariObs {
    fn len(&self) -> usize {
        1
    }
}

#[cfg(feature = "tch")]
impl From<BorderAtariObs> for tch::Tensor {
    /// A `u8` tensor of shape `[1, n_stack, height, width]`.
    fn from(obs: BorderAtariObs) -> tch::Tensor {
        let [n, h, w] = obs.shape();
        tch::Tensor::from_slice(&obs.frames).reshape(&[1, n as i64, h as i64, w as i64])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn frames_are_concatenated_channel_first() {
        let stack = (0..4)
            .map(|i| GrayImage::from_pixel(3, 2, Luma([i])))
            .collect::<Vec<_>>();
        let obs = BorderAtariObs::try_from(Pixels::Stack(stack)).unwrap();

        assert_eq!(obs.shape(), [4, 2, 3]);
        assert_eq!(&obs.frames()[..6], &[0; 6]);
        assert_eq!(&obs.frames()[18..], &[3; 6]);
    }

    #[test]
    fn unstacked_frames_are_rejected() {
        let frame = GrayImage::new(84, 84);
        assert!(BorderAtariObs::try_from(Pixels::Gray(frame)).is_err());
        assert!(BorderAtariObs::try_from(Pixels::Stack(vec![])).is_err());
    }

    #[cfg(feature = "tch")]
    #[test]
    fn tensor_has_batch_dimension() {
        let stack = vec![GrayImage::new(84, 84); 4];
        let obs = BorderAtariObs::try_from(Pixels::Stack(stack)).unwrap();
        let t: tch::Tensor = obs.into();
        assert_eq!(t.size(), vec![1, 4, 84, 84]);
        assert_eq!(t.kind(), tch::Kind::Uint8);
    }
}
