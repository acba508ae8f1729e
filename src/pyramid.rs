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
use crate::dither::ordered_dither;
use crate::frame::row_start;
use crate::radius::MAX_BOX_RADIUS;
use crate::unsafe_slice::SharedPlane;
use crate::{Sample, SampleKind, TransferFunction};

#[derive(Debug, Clone)]
struct Level {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Level {
    fn new(width: usize, height: usize) -> Level {
        Level {
            width,
            height,
            data: vec![0f32; width * height],
        }
    }
}

/// Working storage of one channel as normalized floats, with a pyramid of
/// halved levels.
///
/// Level `k` is `ceil(width / 2^k) x ceil(height / 2^k)`. Filtering works on
/// level 0, coarser levels are derived with [PyramidBuffer::reduce].
#[derive(Debug, Clone)]
pub struct PyramidBuffer {
    levels: Vec<Level>,
    /// Row prefix sums of level 0, reused by every horizontal pass
    row_sums: Vec<f64>,
}

/// Sum of `row[clamp(i)]` for `i` in `first..=last_index`, with `prefix[i]` the sum of
/// the first `i` samples.
fn window_sum(prefix: &[f64], row: &[f32], first: i64, last_index: i64) -> f64 {
    let last = row.len() as i64 - 1;
    let before = (last_index.min(-1) - first + 1).max(0);
    let after = (last_index - first.max(last + 1) + 1).max(0);
    let (lo, hi) = (first.max(0), last_index.min(last));
    let inner = if lo <= hi {
        prefix[hi as usize + 1] - prefix[lo as usize]
    } else {
        0.
    };
    before as f64 * row[0] as f64 + inner + after as f64 * row[last as usize] as f64
}

/// Levels whose short side still keeps a few pixels.
pub fn default_level_count(width: usize, height: usize) -> usize {
    let short = width.min(height);
    if short == 0 {
        return 1;
    }
    (short.ilog2() as usize).saturating_sub(2).max(1)
}

impl PyramidBuffer {
    /// `levels == 0` picks [default_level_count].
    pub fn new(width: usize, height: usize, levels: usize) -> PyramidBuffer {
        let levels = if levels == 0 {
            default_level_count(width, height)
        } else {
            levels
        };
        let levels = (0..levels)
            .map(|k| Level::new(width.div_ceil(1 << k), height.div_ceil(1 << k)))
            .collect();
        PyramidBuffer {
            levels,
            row_sums: vec![0f64; width + 1],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.levels[0].width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.levels[0].height
    }

    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Dimensions of level `level`.
    pub fn level_dimensions(&self, level: usize) -> (usize, usize) {
        let level = &self.levels[level];
        (level.width, level.height)
    }

    /// Row major samples of level `level`.
    pub fn level(&self, level: usize) -> &[f32] {
        &self.levels[level].data
    }

    /// Loads one channel of a host plane into level 0.
    ///
    /// Sample `x` of row `y` is read at `row_start + offset + x * step`, integers are
    /// normalized into `[0, 1]` and linearized when `transfer` is set.
    pub fn copy_in<T: Sample>(
        &mut self,
        src: &[T],
        stride: isize,
        step: usize,
        offset: usize,
        transfer: Option<TransferFunction>,
        kind: SampleKind,
    ) {
        let level = &mut self.levels[0];
        let scale = 1. / kind.max_value();
        let (width, height) = (level.width, level.height);
        for (y, dst) in level.data.chunks_exact_mut(width).enumerate() {
            let row = &src[row_start(stride, y, height) + offset..];
            for (x, dst) in dst.iter_mut().enumerate() {
                let v = row[x * step].to_f32() * scale;
                *dst = match transfer {
                    Some(transfer) => transfer.linearize(v),
                    None => v,
                };
            }
        }
    }

    /// Unnormalized fractional box sum along rows of level 0, stored transposed into `dst`.
    ///
    /// Every output is the sum of the `2 * floor(radius) + 1` nearest samples plus the two
    /// next ones weighted by the fractional part, edges are replicated. `dst` must be
    /// `height x width`. Cost does not depend on the radius, which is capped at
    /// [MAX_BOX_RADIUS].
    pub fn blur_horizontal(&mut self, radius: f32, dst: &mut PyramidBuffer) {
        let src = &self.levels[0];
        let prefix = &mut self.row_sums;
        let dst = &mut dst.levels[0];
        assert_eq!(
            (dst.width, dst.height),
            (src.height, src.width),
            "Transposed buffer has mismatched dimensions"
        );
        let radius = radius.max(0.).min(MAX_BOX_RADIUS);
        let whole = radius.floor() as i64;
        let alpha = (radius - radius.floor()) as f64;
        let last = src.width as i64 - 1;
        let clamped = |i: i64| i.clamp(0, last) as usize;
        let dst_stride = dst.width;

        for (y, row) in src.data.chunks_exact(src.width).enumerate() {
            prefix[0] = 0.;
            for (i, &v) in row.iter().enumerate() {
                prefix[i + 1] = prefix[i] + v as f64;
            }
            for x in 0..src.width as i64 {
                let sum = window_sum(prefix, row, x - whole, x + whole);
                let outer = row[clamped(x - whole - 1)] as f64 + row[clamped(x + whole + 1)] as f64;
                dst.data[x as usize * dst_stride + y] = (sum + alpha * outer) as f32;
            }
        }
    }

    pub fn multiply(&mut self, level: usize, scalar: f32) {
        for v in self.levels[level].data.iter_mut() {
            *v *= scalar;
        }
    }

    /// Fills levels `1..` by averaging 2x2 blocks of the previous level.
    pub fn reduce(&mut self) {
        for k in 1..self.levels.len() {
            let (coarse, fine) = self.levels.split_at_mut(k);
            let src = &coarse[k - 1];
            let dst = &mut fine[0];
            for y in 0..dst.height {
                let y0 = (2 * y).min(src.height - 1);
                let y1 = (2 * y + 1).min(src.height - 1);
                for x in 0..dst.width {
                    let x0 = (2 * x).min(src.width - 1);
                    let x1 = (2 * x + 1).min(src.width - 1);
                    let sum = src.data[y0 * src.width + x0]
                        + src.data[y0 * src.width + x1]
                        + src.data[y1 * src.width + x0]
                        + src.data[y1 * src.width + x1];
                    dst.data[y * dst.width + x] = sum * 0.25;
                }
            }
        }
    }

    /// Stores one channel of `level` into a host plane.
    ///
    /// Integer output is scaled to code values, optionally dithered, and saturated.
    /// Float output is clamped to `[0, 1]` when `clamp` is set, `[-0.5, 0.5]` for chroma.
    pub(crate) fn copy_out<T: Sample>(
        &self,
        dst: &SharedPlane<'_, T>,
        step: usize,
        offset: usize,
        transfer: Option<TransferFunction>,
        dither: bool,
        clamp: bool,
        level: usize,
        chroma: bool,
        kind: SampleKind,
    ) {
        let level = &self.levels[level];
        let max = kind.max_value();
        let (low, high) = if chroma && kind.is_float() {
            (-0.5f32, 0.5f32)
        } else {
            (0f32, 1f32)
        };
        let rows = level.height.min(dst.height());
        for (y, src) in level.data.chunks_exact(level.width).take(rows).enumerate() {
            for (x, &v) in src.iter().enumerate() {
                let v = match transfer {
                    Some(transfer) => transfer.gamma(v),
                    None => v,
                };
                let out = if kind.is_float() {
                    if clamp {
                        v.max(low).min(high)
                    } else {
                        v
                    }
                } else {
                    let mut code = v * max;
                    if dither {
                        code += ordered_dither(x, y);
                    }
                    code.max(0.).min(max)
                };
                // SAFETY: channel tasks write disjoint `offset + x * step` samples.
                unsafe {
                    dst.write(y, offset + x * step, T::from_f32(out));
                }
            }
        }
    }
}
