use super::{delegate_to_inner, AtariInfo, AtariLayer, LayerStep, Pixels};
use crate::AtariEnvError;
use anyhow::Result;
use image::{GrayImage, ImageBuffer, Luma, Pixel, RgbImage};
use std::collections::VecDeque;

/// Transformation of frames, applied by [`ObservationLayer`].
pub trait ObservationTransform {
    /// Transforms a frame from the layer below.
    fn transform(&mut self, pixels: Pixels) -> Result<Pixels, AtariEnvError>;

    /// Transforms the first frame of an episode.
    fn reset(&mut self, pixels: Pixels) -> Result<Pixels, AtariEnvError> {
        self.transform(pixels)
    }
}

/// Applies an [`ObservationTransform`] to every frame, leaving rewards and
/// episode ends untouched.
pub struct ObservationLayer<T> {
    inner: Box<dyn AtariLayer>,
    transform: T,
}

impl<T: ObservationTransform> ObservationLayer<T> {
    pub fn new(inner: Box<dyn AtariLayer>, transform: T) -> Self {
        Self { inner, transform }
    }
}

impl<T: ObservationTransform> AtariLayer for ObservationLayer<T> {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        let (pixels, info) = self.inner.reset(seed)?;
        Ok((self.transform.reset(pixels)?, info))
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        let mut step = self.inner.step(action)?;
        step.pixels = self.transform.transform(step.pixels)?;
        Ok(step)
    }

    delegate_to_inner!();
}

fn unexpected(stage: &str, pixels: &Pixels) -> AtariEnvError {
    AtariEnvError::Pipeline(format!("{} received {} frames", stage, pixels.kind()))
}

/// Resizes frames by area averaging, like `cv2.INTER_AREA`.
///
/// Each output pixel is the mean of the source pixels it covers, weighted by
/// the covered fraction of each.
pub struct Resize {
    width: u32,
    height: u32,
}

impl Resize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

// Source indices and weights of every destination index along one axis.
fn area_weights(src: u32, dst: u32) -> Vec<Vec<(usize, f32)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = start + scale;
            let mut weights = vec![];
            let mut s = start.floor() as u32;
            while (s as f64) < end && s < src {
                let covered = end.min(s as f64 + 1.0) - start.max(s as f64);
                if covered > 0.0 {
                    weights.push((s as usize, (covered / scale) as f32));
                }
                s += 1;
            }
            weights
        })
        .collect()
}

fn resize_area<P>(
    img: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
) -> Result<ImageBuffer<P, Vec<u8>>, AtariEnvError>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let channels = P::CHANNEL_COUNT as usize;
    let stride = img.width() as usize * channels;
    let xs = area_weights(img.width(), width);
    let ys = area_weights(img.height(), height);
    let src = img.as_raw();

    let mut buf = Vec::with_capacity(width as usize * height as usize * channels);
    let mut acc = vec![0f32; channels];
    for wy in ys.iter() {
        for wx in xs.iter() {
            acc.iter_mut().for_each(|a| *a = 0.0);
            for &(y, ky) in wy.iter() {
                for &(x, kx) in wx.iter() {
                    let ix = y * stride + x * channels;
                    for (c, a) in acc.iter_mut().enumerate() {
                        *a += ky * kx * src[ix + c] as f32;
                    }
                }
            }
            buf.extend(acc.iter().map(|a| a.round().max(0.0).min(255.0) as u8));
        }
    }

    ImageBuffer::from_raw(width, height, buf)
        .ok_or_else(|| AtariEnvError::Pipeline("Resize produced a broken frame".into()))
}

impl ObservationTransform for Resize {
    fn transform(&mut self, pixels: Pixels) -> Result<Pixels, AtariEnvError> {
        match pixels {
            Pixels::Rgb(img) => Ok(Pixels::Rgb(resize_area(&img, self.width, self.height)?)),
            Pixels::Gray(img) => Ok(Pixels::Gray(resize_area(&img, self.width, self.height)?)),
            p => Err(unexpected("Resize", &p)),
        }
    }
}

/// Converts RGB frames to luminance with the Rec.601 weights
/// `0.299 R + 0.587 G + 0.114 B`, in the fixed point arithmetic of
/// `cv2.cvtColor(.., COLOR_RGB2GRAY)`.
pub struct Grayscale;

impl Grayscale {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const SHIFT: u32 = 14;

    pub fn luma(rgb: [u8; 3]) -> u8 {
        let [r, g, b] = rgb;
        let v = r as u32 * Self::R + g as u32 * Self::G + b as u32 * Self::B;
        ((v + (1 << (Self::SHIFT - 1))) >> Self::SHIFT) as u8
    }

    fn convert(img: &RgbImage) -> GrayImage {
        let (w, h) = img.dimensions();
        GrayImage::from_fn(w, h, |x, y| Luma([Self::luma(img.get_pixel(x, y).0)]))
    }
}

impl ObservationTransform for Grayscale {
    fn transform(&mut self, pixels: Pixels) -> Result<Pixels, AtariEnvError> {
        match pixels {
            Pixels::Rgb(img) => Ok(Pixels::Gray(Self::convert(&img))),
            p => Err(unexpected("Grayscale", &p)),
        }
    }
}

/// Keeps the most recent `n_stack` grayscale frames, oldest first.
///
/// The first frame of an episode fills the whole stack.
pub struct FrameStack {
    n_stack: usize,
    frames: VecDeque<GrayImage>,
}

impl FrameStack {
    pub fn new(n_stack: usize) -> Self {
        Self {
            n_stack,
            frames: VecDeque::with_capacity(n_stack),
        }
    }

    fn stacked(&self) -> Pixels {
        Pixels::Stack(self.frames.iter().cloned().collect())
    }
}

impl ObservationTransform for FrameStack {
    fn reset(&mut self, pixels: Pixels) -> Result<Pixels, AtariEnvError> {
        match pixels {
            Pixels::Gray(img) => {
                self.frames.clear();
                self.frames.extend(std::iter::repeat(img).take(self.n_stack));
                Ok(self.stacked())
            }
            p => Err(unexpected("FrameStack", &p)),
        }
    }

    fn transform(&mut self, pixels: Pixels) -> Result<Pixels, AtariEnvError> {
        match pixels {
            Pixels::Gray(img) => {
                if self.frames.len() == self.n_stack {
                    self.frames.pop_front();
                }
                self.frames.push_back(img);
                Ok(self.stacked())
            }
            p => Err(unexpected("FrameStack", &p)),
        }
    }
}
