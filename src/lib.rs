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
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Gaussian blur approximated by iterated fractional box filters.
//!
//! Each channel of a frame is copied into a float working buffer, optionally
//! linearized, filtered by `iterations` horizontal and vertical box passes and
//! written back. Channels are independent tasks on a fixed size [ThreadPool].

mod dither;
mod fast_blur;
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
mod fast_blur_image;
mod frame;
mod gamma_curves;
mod plane_set;
mod pyramid;
mod radius;
mod sample;
mod thread_pool;
mod threading_policy;
mod unsafe_slice;
mod util;

pub use fast_blur::{FastBlur, FastBlurParams};
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
pub use fast_blur_image::fast_blur_image;
pub use frame::{
    BlurFrame, BlurFrameMut, BufferStore, ChannelPlacement, FrameFormat, FramePlane,
    FramePlaneMut, PixelLayout, PlaneId, Subsampling,
};
pub use gamma_curves::TransferFunction;
pub use plane_set::{chroma_level_count, BufferShape, ChannelDescriptor, PlaneSet, ResolutionClass};
pub use pyramid::{default_level_count, PyramidBuffer};
pub use radius::{box_variance, sigma_to_box_radius, MAX_BOX_RADIUS};
pub use sample::{Sample, SampleKind};
pub use thread_pool::{Scope, ThreadPool};
pub use threading_policy::ThreadingPolicy;
pub use util::{BlurError, MismatchedSize};
