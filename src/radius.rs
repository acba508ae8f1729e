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
/// Largest radius handed out, already wider than any frame the passes can address.
///
/// Keeps the squared window of one iteration far inside `f32` range.
pub const MAX_BOX_RADIUS: f32 = (1u64 << 40) as f32;

/// Converts Gaussian sigma into a fractional box radius.
///
/// `iterations` box passes of the returned radius have a combined variance of
/// `sigma * sigma`. The integer part `l` is the widest plain box whose variance
/// fits into `sigma² / iterations`, the fractional part is the weight of the
/// two pixels just outside of the `2l + 1` window that makes up the remainder.
///
/// # Arguments
///
/// * `sigma` - Gaussian standard deviation, expected to be non-negative.
/// * `iterations` - Number of box passes, at least 1.
///
/// Radii are capped at [MAX_BOX_RADIUS].
pub fn sigma_to_box_radius(sigma: f64, iterations: u32) -> f32 {
    if sigma <= 0. || iterations == 0 {
        return 0.;
    }
    let q = sigma * sigma / iterations as f64;
    let l = ((12. * q + 1.).sqrt() - 1.) * 0.5;
    let l = l.floor();
    let next = (l + 1.) * (l + 1.);
    let denominator = 6. * (q - next);
    let alpha = if denominator == 0. {
        0.
    } else {
        (2. * l + 1.) * (l * (l + 1.) - 3. * q) / denominator
    };
    let radius = l + alpha;
    if !radius.is_finite() || radius > MAX_BOX_RADIUS as f64 {
        return MAX_BOX_RADIUS;
    }
    radius as f32
}

/// Variance of one normalized box pass with a fractional radius.
pub fn box_variance(radius: f32) -> f64 {
    let radius = radius.max(0.) as f64;
    let l = radius.floor();
    let alpha = radius - l;
    let inner = l * (l + 1.) * (2. * l + 1.) / 3.;
    let edges = 2. * alpha * (l + 1.) * (l + 1.);
    (inner + edges) / (2. * l + 1. + 2. * alpha)
}
