// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use crate::plane_set::{ChannelDescriptor, PlaneSet};
use crate::pyramid::PyramidBuffer;
use crate::radius::sigma_to_box_radius;
use crate::unsafe_slice::SharedPlane;
use crate::{
    BlurError, BlurFrame, BlurFrameMut, FrameFormat, Sample, SampleKind, ThreadPool,
    ThreadingPolicy, TransferFunction,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Accumulated window product above which the buffers are scaled back.
const RENORMALIZE_ABOVE: f64 = 1_000_000.;

/// Parameters of the iterated box Gaussian approximation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FastBlurParams {
    /// Horizontal Gaussian standard deviation
    pub x_sigma: f64,
    /// Vertical standard deviation, same as horizontal when not set
    pub y_sigma: Option<f64>,
    /// Box passes per axis
    pub iterations: u32,
    /// Ordered dithering of integer output
    pub dither: bool,
    /// Blur in linear light, applies to luma and color channels only
    pub gamma: bool,
    pub transfer_function: TransferFunction,
    /// Sizing of the process wide pool, see [FastBlur::with_global_pool]
    pub threading: ThreadingPolicy,
}

impl FastBlurParams {
    pub fn new(sigma: f64) -> FastBlurParams {
        FastBlurParams {
            x_sigma: sigma,
            y_sigma: None,
            iterations: 3,
            dither: false,
            gamma: true,
            transfer_function: TransferFunction::default(),
            threading: ThreadingPolicy::default(),
        }
    }

    pub fn with_y_sigma(mut self, y_sigma: f64) -> Self {
        self.y_sigma = Some(y_sigma);
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }

    pub fn with_gamma(mut self, gamma: bool) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_transfer_function(mut self, transfer_function: TransferFunction) -> Self {
        self.transfer_function = transfer_function;
        self
    }

    pub fn with_threading(mut self, threading: ThreadingPolicy) -> Self {
        self.threading = threading;
        self
    }

    #[inline]
    pub fn vertical_sigma(&self) -> f64 {
        self.y_sigma.unwrap_or(self.x_sigma)
    }

    pub fn validate(&self) -> Result<(), BlurError> {
        for sigma in [self.x_sigma, self.vertical_sigma()] {
            if !sigma.is_finite() || sigma < 0. {
                return Err(BlurError::NegativeSigma(sigma));
            }
        }
        if self.iterations == 0 {
            return Err(BlurError::ZeroIterations);
        }
        Ok(())
    }
}

/// Working buffers of one channel, the transposed one has swapped dimensions.
#[derive(Debug)]
struct ChannelBuffers {
    primary: PyramidBuffer,
    transpose: PyramidBuffer,
}

#[derive(Debug, Copy, Clone)]
struct PassSettings {
    radius: (f32, f32),
    iterations: u32,
    transfer: Option<TransferFunction>,
    dither: bool,
    kind: SampleKind,
}

/// Everything one channel task needs for one frame.
struct ChannelJob<'a, 'p, T> {
    channel: &'a ChannelDescriptor,
    buffers: &'a mut ChannelBuffers,
    src: &'a [T],
    src_stride: isize,
    dst: &'a SharedPlane<'p, T>,
    settings: PassSettings,
}

impl<T: Sample> ChannelJob<'_, '_, T> {
    fn run(self) {
        let channel = self.channel;
        let settings = self.settings;
        let ChannelBuffers { primary, transpose } = self.buffers;
        primary.copy_in(
            self.src,
            self.src_stride,
            channel.step,
            channel.offset,
            settings.transfer,
            settings.kind,
        );
        run_passes(primary, transpose, settings.radius, settings.iterations);
        primary.copy_out(
            self.dst,
            channel.step,
            channel.offset,
            settings.transfer,
            settings.dither,
            true,
            0,
            channel.chroma,
            settings.kind,
        );
    }
}

/// Applies `iterations` horizontal then vertical box passes, result ends up in `primary`.
///
/// Passes are unnormalized, the accumulated window product is divided out whenever it
/// grows past [RENORMALIZE_ABOVE] and once more after the last iteration.
/// Returns how many times the threshold was crossed.
fn run_passes(
    primary: &mut PyramidBuffer,
    transpose: &mut PyramidBuffer,
    radius: (f32, f32),
    iterations: u32,
) -> usize {
    let window = (2. * radius.0 as f64 + 1.) * (2. * radius.1 as f64 + 1.);
    let mut div = 1f64;
    let mut crossings = 0;
    for _ in 0..iterations {
        let mut src = &mut *primary;
        let mut dst = &mut *transpose;
        for pass_radius in [radius.0, radius.1] {
            src.blur_horizontal(pass_radius, dst);
            std::mem::swap(&mut src, &mut dst);
        }
        div *= window;
        if div > RENORMALIZE_ABOVE {
            primary.multiply(0, (1. / div) as f32);
            div = 1.;
            crossings += 1;
        }
    }
    if div > 1. {
        primary.multiply(0, (1. / div) as f32);
    }
    crossings
}

/// Gaussian blur approximated by iterated fractional box filters.
///
/// An instance is bound to one [FrameFormat], buffers are allocated once and
/// reused for every processed frame. Channels are processed as independent
/// tasks on the pool.
pub struct FastBlur {
    format: FrameFormat,
    params: FastBlurParams,
    luma_radius: (f32, f32),
    chroma_radius: (f32, f32),
    planes: PlaneSet,
    buffers: Vec<ChannelBuffers>,
    pool: Arc<ThreadPool>,
}

impl FastBlur {
    pub fn new(
        format: FrameFormat,
        params: FastBlurParams,
        pool: Arc<ThreadPool>,
    ) -> Result<FastBlur, BlurError> {
        params.validate()?;
        format.validate()?;
        // Only level 0 is filtered.
        let planes = PlaneSet::build(&format, 1, false)?;
        let transposed = PlaneSet::build(&format, 1, true)?;

        let iterations = params.iterations;
        let (x_sigma, y_sigma) = (params.x_sigma, params.vertical_sigma());
        let subsampling = format.layout.subsampling();
        let luma_radius = (
            sigma_to_box_radius(x_sigma, iterations),
            sigma_to_box_radius(y_sigma, iterations),
        );
        let chroma_radius = (
            sigma_to_box_radius(x_sigma / 2f64.powi(subsampling.horizontal as i32), iterations),
            sigma_to_box_radius(y_sigma / 2f64.powi(subsampling.vertical as i32), iterations),
        );

        let buffers = planes
            .channels()
            .iter()
            .map(|channel| {
                let shape = planes.shape_of(channel.class);
                let transposed_shape = transposed.shape_of(channel.class);
                ChannelBuffers {
                    primary: PyramidBuffer::new(shape.width, shape.height, shape.levels),
                    transpose: PyramidBuffer::new(
                        transposed_shape.width,
                        transposed_shape.height,
                        transposed_shape.levels,
                    ),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            width = format.width,
            height = format.height,
            layout = format.layout.name(),
            bit_depth = format.sample.bit_depth(),
            channels = buffers.len(),
            luma_radius_x = luma_radius.0,
            luma_radius_y = luma_radius.1,
            chroma_radius_x = chroma_radius.0,
            chroma_radius_y = chroma_radius.1,
            iterations,
            threads = pool.thread_count(),
            "fast blur created"
        );

        Ok(FastBlur {
            format,
            params,
            luma_radius,
            chroma_radius,
            planes,
            buffers,
            pool,
        })
    }

    /// Creates an instance on the process wide pool sized by `params.threading`.
    pub fn with_global_pool(format: FrameFormat, params: FastBlurParams) -> Result<FastBlur, BlurError> {
        let pool = ThreadPool::global(params.threading)?;
        FastBlur::new(format, params, pool)
    }

    pub fn format(&self) -> &FrameFormat {
        &self.format
    }

    pub fn params(&self) -> &FastBlurParams {
        &self.params
    }

    /// Horizontal and vertical box radius of luma, color and alpha channels.
    pub fn luma_radius(&self) -> (f32, f32) {
        self.luma_radius
    }

    /// Horizontal and vertical box radius of chroma channels, scaled by subsampling.
    pub fn chroma_radius(&self) -> (f32, f32) {
        self.chroma_radius
    }

    /// Blurs `src` into `dst`, both must match the format of this instance.
    ///
    /// Returns once every channel has been written.
    pub fn process<T: Sample>(
        &mut self,
        src: &BlurFrame<T>,
        dst: &mut BlurFrameMut<T>,
    ) -> Result<(), BlurError> {
        T::check_kind(self.format.sample)?;
        src.check_layout(&self.format)?;
        dst.check_layout(&self.format)?;

        let format = self.format;
        trace!(
            width = format.width,
            height = format.height,
            channels = self.buffers.len(),
            "blurring frame"
        );

        let writers = dst
            .planes
            .iter_mut()
            .enumerate()
            .map(|(index, plane)| {
                let (_, height) = format.plane_dimensions(index);
                SharedPlane::new(plane.data.borrow_mut(), plane.stride, height)
            })
            .collect::<Vec<_>>();

        let params = self.params;
        let (luma_radius, chroma_radius) = (self.luma_radius, self.chroma_radius);
        let jobs = self
            .planes
            .channels()
            .iter()
            .zip(self.buffers.iter_mut())
            .map(|(channel, buffers)| {
                let plane = &src.planes[channel.plane_index];
                ChannelJob {
                    channel,
                    buffers,
                    src: plane.data.as_ref(),
                    src_stride: plane.stride,
                    dst: &writers[channel.plane_index],
                    settings: PassSettings {
                        radius: if channel.chroma {
                            chroma_radius
                        } else {
                            luma_radius
                        },
                        iterations: params.iterations,
                        transfer: if channel.gamma && params.gamma {
                            Some(params.transfer_function)
                        } else {
                            None
                        },
                        dither: params.dither,
                        kind: format.sample,
                    },
                }
            })
            .collect::<Vec<_>>();

        if jobs.len() <= 1 || self.pool.thread_count() <= 1 {
            for job in jobs {
                job.run();
            }
        } else {
            self.pool.scope(|scope| {
                for job in jobs {
                    scope.submit(move || job.run());
                }
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radius::{box_variance, MAX_BOX_RADIUS};
    use crate::{PixelLayout, Subsampling};

    fn pool(threads: usize) -> Arc<ThreadPool> {
        Arc::new(ThreadPool::new(threads).unwrap())
    }

    fn pattern(len: usize, modulo: usize) -> Vec<usize> {
        (0..len).map(|i| (i * 37 + (i / 7) * 91) % modulo).collect()
    }

    fn blur_gray_f32(
        width: u32,
        height: u32,
        src: &[f32],
        params: FastBlurParams,
    ) -> (Vec<f32>, FastBlur) {
        let format = FrameFormat::new(width, height, PixelLayout::Gray, SampleKind::F32);
        let mut blur = FastBlur::new(format, params, pool(2)).unwrap();
        let mut dst = vec![0f32; src.len()];
        {
            let source = BlurFrame::borrow(vec![(src, width as isize)]);
            let mut target = BlurFrameMut::borrow(vec![(dst.as_mut_slice(), width as isize)]);
            blur.process(&source, &mut target).unwrap();
        }
        (dst, blur)
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let format = FrameFormat::new(23, 11, PixelLayout::Gray, SampleKind::U8);
        let params = FastBlurParams::new(0.).with_iterations(1);
        let mut blur = FastBlur::new(format, params, pool(1)).unwrap();
        let src = pattern(23 * 11, 256)
            .into_iter()
            .map(|v| v as u8)
            .collect::<Vec<_>>();
        let mut dst = BlurFrameMut::alloc(&format);
        blur.process(&BlurFrame::borrow(vec![(src.as_slice(), 23)]), &mut dst)
            .unwrap();
        assert_eq!(dst.planes[0].data.borrow(), src.as_slice());
    }

    fn check_flat<T: Sample + PartialEq>(format: FrameFormat, values: &[T], params: FastBlurParams) {
        let mut blur = FastBlur::new(format, params, pool(3)).unwrap();
        let mut src = BlurFrameMut::<T>::alloc(&format);
        for (channel, value) in format.layout.channels().iter().zip(values.iter()) {
            let row_length = format.plane_row_length(channel.plane);
            let plane = src.planes[channel.plane].data.borrow_mut();
            for row in plane.chunks_exact_mut(row_length) {
                for x in (channel.offset..row_length).step_by(channel.step) {
                    row[x] = *value;
                }
            }
        }
        let mut dst = BlurFrameMut::<T>::alloc(&format);
        blur.process(&src.to_immutable_ref(), &mut dst).unwrap();
        for (src, dst) in src.planes.iter().zip(dst.planes.iter()) {
            assert_eq!(
                src.data.borrow(),
                dst.data.borrow(),
                "Flat frame changed with {params:?}, {format:?}"
            );
        }
    }

    #[test]
    fn test_flat_frames_are_unchanged() {
        let yuv420 = FrameFormat::new(
            17,
            12,
            PixelLayout::Yuv {
                subsampling: Subsampling::YUV420,
                alpha: true,
            },
            SampleKind::U8,
        );
        let packed = FrameFormat::new(
            9,
            14,
            PixelLayout::PackedRgb { alpha: true },
            SampleKind::U16 { bit_depth: 12 },
        );
        let planar = FrameFormat::new(
            13,
            7,
            PixelLayout::PlanarRgb { alpha: false },
            SampleKind::U16 { bit_depth: 10 },
        );
        let packed_gray = FrameFormat::new(
            8,
            8,
            PixelLayout::PackedGray { alpha: true },
            SampleKind::U8,
        );
        for sigma in [0.5, 3., 17.5] {
            for iterations in [1, 3, 5] {
                let params = FastBlurParams::new(sigma).with_iterations(iterations);
                check_flat::<u8>(yuv420, &[100, 60, 200, 255], params);
                check_flat::<u8>(yuv420, &[17, 128, 128, 3], params.with_dither(true));
                check_flat::<u16>(packed, &[4095, 0, 1234, 77], params);
                check_flat::<u16>(planar, &[512, 1, 1000], params.with_y_sigma(sigma * 2.));
                check_flat::<u8>(packed_gray, &[42, 200], params.with_gamma(false));
            }
        }
    }

    #[test]
    fn test_flat_float_frames() {
        let format = FrameFormat::new(
            10,
            6,
            PixelLayout::Yuv {
                subsampling: Subsampling::YUV422,
                alpha: false,
            },
            SampleKind::F32,
        );
        let mut blur = FastBlur::new(format, FastBlurParams::new(4.), pool(2)).unwrap();
        let values = [0.7f32, -0.25, 0.4];
        let mut src = BlurFrameMut::<f32>::alloc(&format);
        for (plane, value) in src.planes.iter_mut().zip(values.iter()) {
            plane.data.borrow_mut().fill(*value);
        }
        let mut dst = BlurFrameMut::alloc(&format);
        blur.process(&src.to_immutable_ref(), &mut dst).unwrap();
        for (plane, value) in dst.planes.iter().zip(values.iter()) {
            for v in plane.data.borrow() {
                assert!((v - value).abs() < 1e-5, "Got {v}, expected {value}");
            }
        }
    }

    fn reference_blur(src: &[f32], width: usize, height: usize, radius: (f32, f32), iterations: u32) -> Vec<f64> {
        let mut data = src.iter().map(|&v| v as f64).collect::<Vec<_>>();
        let tap = |r: f32, d: i64| -> f64 {
            let whole = r.floor() as i64;
            let alpha = (r - r.floor()) as f64;
            if d.abs() <= whole {
                1.
            } else if d.abs() == whole + 1 {
                alpha
            } else {
                0.
            }
        };
        for _ in 0..iterations {
            for (r, horizontal) in [(radius.0, true), (radius.1, false)] {
                let norm = 2. * r as f64 + 1.;
                let span = r.floor() as i64 + 1;
                let mut next = vec![0f64; data.len()];
                for y in 0..height as i64 {
                    for x in 0..width as i64 {
                        let mut sum = 0f64;
                        for d in -span..=span {
                            let (sx, sy) = if horizontal {
                                ((x + d).clamp(0, width as i64 - 1), y)
                            } else {
                                (x, (y + d).clamp(0, height as i64 - 1))
                            };
                            sum += tap(r, d) * data[sy as usize * width + sx as usize];
                        }
                        next[y as usize * width + x as usize] = sum / norm;
                    }
                }
                data = next;
            }
        }
        data
    }

    #[test]
    fn test_renormalization_matches_normalized_passes() {
        let (width, height) = (24usize, 16usize);
        let src = pattern(width * height, 97)
            .into_iter()
            .map(|v| v as f32 / 96.)
            .collect::<Vec<_>>();
        // Last case crosses the threshold three times.
        for (sigma, y_sigma, iterations) in [(10., 5., 5), (1.3, 0.65, 3), (25., 12.5, 2), (6., 6., 12)] {
            let params = FastBlurParams::new(sigma)
                .with_y_sigma(y_sigma)
                .with_iterations(iterations)
                .with_gamma(false);
            let (dst, blur) = blur_gray_f32(width as u32, height as u32, &src, params);
            let expected = reference_blur(&src, width, height, blur.luma_radius(), iterations);
            for (i, (v, e)) in dst.iter().zip(expected.iter()).enumerate() {
                assert!(
                    (*v as f64 - e).abs() < 1e-4,
                    "Sample {i} was {v}, expected {e} for sigma {sigma}, iterations {iterations}"
                );
            }
        }
    }

    #[test]
    fn test_repeated_renormalization_keeps_flat_rows() {
        let (width, height) = (16usize, 12usize);
        let radius = sigma_to_box_radius(6., 12);
        let mut primary = PyramidBuffer::new(width, height, 1);
        let mut transpose = PyramidBuffer::new(height, width, 1);
        let src = vec![0.75f32; width * height];
        primary.copy_in(&src, width as isize, 1, 0, None, SampleKind::F32);
        let crossings = run_passes(&mut primary, &mut transpose, (radius, radius), 12);
        assert_eq!(crossings, 3);
        for v in primary.level(0) {
            assert!((v - 0.75).abs() < 1e-5, "Got {v}");
        }
        assert_eq!(run_passes(&mut primary, &mut transpose, (0., 0.), 4), 0);
    }

    #[test]
    fn test_huge_sigma_averages_small_frame() {
        let src = [0.2f32, 0.4, 0.6, 0.8];
        let params = FastBlurParams::new(1e12).with_gamma(false);
        let (dst, blur) = blur_gray_f32(2, 2, &src, params);
        assert!(blur.luma_radius().0 > 9.9e11);
        for v in dst {
            assert!((v - 0.5).abs() < 1e-4, "Got {v}");
        }

        let params = FastBlurParams::new(1e300).with_iterations(2).with_gamma(false);
        let (dst, blur) = blur_gray_f32(2, 2, &src, params);
        assert_eq!(blur.luma_radius(), (MAX_BOX_RADIUS, MAX_BOX_RADIUS));
        for v in dst {
            assert!((v - 0.5).abs() < 1e-4, "Got {v}");
        }
    }

    #[test]
    fn test_buffers_are_reused_between_frames() {
        let format = FrameFormat::new(12, 8, PixelLayout::PackedRgb { alpha: false }, SampleKind::U8);
        let mut blur = FastBlur::new(format, FastBlurParams::new(2.), pool(3)).unwrap();
        let storage = |blur: &FastBlur| {
            blur.buffers
                .iter()
                .flat_map(|b| [b.primary.level(0).as_ptr(), b.transpose.level(0).as_ptr()])
                .collect::<Vec<_>>()
        };
        let before = storage(&blur);
        let src = pattern(12 * 8 * 3, 256)
            .into_iter()
            .map(|v| v as u8)
            .collect::<Vec<_>>();
        let mut dst = BlurFrameMut::alloc(&format);
        for _ in 0..3 {
            blur.process(&BlurFrame::borrow(vec![(src.as_slice(), 12 * 3)]), &mut dst)
                .unwrap();
        }
        assert_eq!(storage(&blur), before);
    }

    #[test]
    fn test_impulse_response_variance() {
        let size = 61usize;
        let center = size / 2;
        let mut src = vec![0f32; size * size];
        src[center * size + center] = 1.;
        let sigma = 3.;
        let params = FastBlurParams::new(sigma).with_gamma(false);
        let (dst, blur) = blur_gray_f32(size as u32, size as u32, &src, params);

        let total = dst.iter().map(|&v| v as f64).sum::<f64>();
        assert!((total - 1.).abs() < 1e-4, "Mass {total}");

        let mut variance = 0f64;
        for y in 0..size {
            for x in 0..size {
                let d = x as f64 - center as f64;
                variance += d * d * dst[y * size + x] as f64;
            }
        }
        assert!((variance - sigma * sigma).abs() < 1e-2, "Variance {variance}");
        let expected = 3. * box_variance(blur.luma_radius().0);
        assert!((variance - expected).abs() < 1e-2);

        let left = dst[center * size + center - 2];
        let right = dst[center * size + center + 2];
        assert!((left - right).abs() < 1e-7);
        assert!(dst[center * size + center] > left);
    }

    #[test]
    fn test_negative_stride_matches_top_down() {
        let (width, height) = (19usize, 9usize);
        let format = FrameFormat::new(width as u32, height as u32, PixelLayout::Gray, SampleKind::U16 { bit_depth: 16 });
        let top_down = pattern(width * height, 65536)
            .into_iter()
            .map(|v| v as u16)
            .collect::<Vec<_>>();
        let bottom_up = top_down
            .chunks_exact(width)
            .rev()
            .flatten()
            .copied()
            .collect::<Vec<_>>();
        let params = FastBlurParams::new(2.5);
        let mut blur = FastBlur::new(format, params, pool(1)).unwrap();

        let mut expected = vec![0u16; width * height];
        blur.process(
            &BlurFrame::borrow(vec![(top_down.as_slice(), width as isize)]),
            &mut BlurFrameMut::borrow(vec![(expected.as_mut_slice(), width as isize)]),
        )
        .unwrap();

        let mut flipped = vec![0u16; width * height];
        blur.process(
            &BlurFrame::borrow(vec![(bottom_up.as_slice(), -(width as isize))]),
            &mut BlurFrameMut::borrow(vec![(flipped.as_mut_slice(), -(width as isize))]),
        )
        .unwrap();

        let restored = flipped
            .chunks_exact(width)
            .rev()
            .flatten()
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_pooled_matches_inline() {
        let format = FrameFormat::new(21, 13, PixelLayout::PackedRgb { alpha: true }, SampleKind::U8);
        let src = pattern(21 * 13 * 4, 256)
            .into_iter()
            .map(|v| v as u8)
            .collect::<Vec<_>>();
        let params = FastBlurParams::new(1.7).with_dither(true);
        let mut outputs = Vec::new();
        for threads in [1, 4] {
            let mut blur = FastBlur::new(format, params, pool(threads)).unwrap();
            let mut dst = BlurFrameMut::alloc(&format);
            blur.process(&BlurFrame::borrow(vec![(src.as_slice(), 21 * 4)]), &mut dst)
                .unwrap();
            outputs.push(dst.planes[0].data.borrow().to_vec());
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_ne!(outputs[0], src);
    }

    #[test]
    fn test_chroma_radius_follows_subsampling() {
        let layout = |subsampling| PixelLayout::Yuv {
            subsampling,
            alpha: false,
        };
        let params = FastBlurParams::new(4.).with_y_sigma(6.);
        let yuv420 = FrameFormat::new(32, 32, layout(Subsampling::YUV420), SampleKind::U8);
        let blur = FastBlur::new(yuv420, params, pool(1)).unwrap();
        assert_eq!(blur.luma_radius(), (sigma_to_box_radius(4., 3), sigma_to_box_radius(6., 3)));
        assert_eq!(blur.chroma_radius(), (sigma_to_box_radius(2., 3), sigma_to_box_radius(3., 3)));

        let yuv422 = FrameFormat::new(32, 32, layout(Subsampling::YUV422), SampleKind::U8);
        let blur = FastBlur::new(yuv422, params, pool(1)).unwrap();
        assert_eq!(blur.chroma_radius(), (sigma_to_box_radius(2., 3), sigma_to_box_radius(6., 3)));

        let yuv444 = FrameFormat::new(32, 32, layout(Subsampling::YUV444), SampleKind::U8);
        let blur = FastBlur::new(yuv444, params, pool(1)).unwrap();
        assert_eq!(blur.chroma_radius(), blur.luma_radius());
    }

    #[test]
    fn test_construction_errors() {
        let format = FrameFormat::new(8, 8, PixelLayout::Gray, SampleKind::U8);
        let create = |format: FrameFormat, params: FastBlurParams| FastBlur::new(format, params, pool(1));
        assert!(matches!(
            create(format, FastBlurParams::new(-1.)),
            Err(BlurError::NegativeSigma(_))
        ));
        assert!(matches!(
            create(format, FastBlurParams::new(1.).with_y_sigma(f64::NAN)),
            Err(BlurError::NegativeSigma(_))
        ));
        assert!(matches!(
            create(format, FastBlurParams::new(1.).with_iterations(0)),
            Err(BlurError::ZeroIterations)
        ));
        assert!(matches!(
            create(FrameFormat::new(0, 8, PixelLayout::Gray, SampleKind::U8), FastBlurParams::new(1.)),
            Err(BlurError::ZeroBaseSize)
        ));
        let yuy2 = FrameFormat::new(8, 8, PixelLayout::Yuy2, SampleKind::U8);
        match create(yuy2, FastBlurParams::new(1.)) {
            Err(error) => assert!(error.is_configuration()),
            Ok(_) => panic!("YUY2 must be rejected"),
        }
        let wide_chroma = FrameFormat::new(
            64,
            64,
            PixelLayout::Yuv {
                subsampling: Subsampling::new(40, 0),
                alpha: false,
            },
            SampleKind::U8,
        );
        match create(wide_chroma, FastBlurParams::new(1.)) {
            Err(error) => {
                assert!(matches!(error, BlurError::UnsupportedSubsampling(_)));
                assert!(error.is_configuration());
            }
            Ok(_) => panic!("Subsampling shift of 40 must be rejected"),
        }
    }

    #[test]
    fn test_process_rejects_mismatched_frames() {
        let format = FrameFormat::new(8, 4, PixelLayout::Gray, SampleKind::F32);
        let mut blur = FastBlur::new(format, FastBlurParams::new(1.), pool(1)).unwrap();
        let bytes = vec![0u8; 32];
        let mut out = vec![0u8; 32];
        let result = blur.process(
            &BlurFrame::borrow(vec![(bytes.as_slice(), 8)]),
            &mut BlurFrameMut::borrow(vec![(out.as_mut_slice(), 8)]),
        );
        assert!(matches!(result, Err(BlurError::SampleTypeMismatch("f32"))));

        let short = vec![0f32; 20];
        let mut dst = BlurFrameMut::<f32>::alloc(&format);
        let result = blur.process(&BlurFrame::borrow(vec![(short.as_slice(), 8)]), &mut dst);
        assert!(matches!(result, Err(BlurError::MinimumSliceSizeMismatch(_))));
    }

    #[test]
    fn test_global_pool_instance() {
        let format = FrameFormat::new(4, 4, PixelLayout::PlanarRgb { alpha: false }, SampleKind::U8);
        let blur = FastBlur::with_global_pool(format, FastBlurParams::new(1.)).unwrap();
        assert_eq!(blur.format(), &format);
        assert_eq!(blur.params().iterations, 3);
    }
}
