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
use crate::util::check_plane_size;
use crate::{BlurError, MismatchedSize, Sample, SampleKind};
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};

/// Chroma subsampling as log2 factors, 4:2:0 is `{ horizontal: 1, vertical: 1 }`.
///
/// Factors up to [Subsampling::MAX_SHIFT] are supported.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Subsampling {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Subsampling {
    pub const YUV444: Subsampling = Subsampling::new(0, 0);
    pub const YUV422: Subsampling = Subsampling::new(1, 0);
    pub const YUV420: Subsampling = Subsampling::new(1, 1);
    /// Largest log2 factor on either axis
    pub const MAX_SHIFT: u32 = 30;

    pub const fn new(horizontal: u32, vertical: u32) -> Subsampling {
        Subsampling {
            horizontal,
            vertical,
        }
    }

    #[inline]
    pub fn is_subsampled(&self) -> bool {
        self.horizontal != 0 || self.vertical != 0
    }

    #[inline]
    pub fn is_supported(&self) -> bool {
        self.horizontal <= Subsampling::MAX_SHIFT && self.vertical <= Subsampling::MAX_SHIFT
    }

    /// Chroma dimensions of a `width x height` frame, zero when a factor is out of range.
    pub fn chroma_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width.checked_shr(self.horizontal).unwrap_or(0),
            height.checked_shr(self.vertical).unwrap_or(0),
        )
    }
}

impl Display for Subsampling {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} (log2)", self.horizontal, self.vertical)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// Arrangement of channels in host memory
pub enum PixelLayout {
    /// Single luma plane
    Gray,
    /// Y, U, V planes and optional alpha plane, chroma may be subsampled
    Yuv {
        subsampling: Subsampling,
        alpha: bool,
    },
    /// R, G, B planes and optional alpha plane
    PlanarRgb { alpha: bool },
    /// One plane holding interleaved luma and optional alpha
    PackedGray { alpha: bool },
    /// One plane holding interleaved R, G, B and optional alpha
    PackedRgb { alpha: bool },
    /// Interleaved 4:2:2 `YUYV`, chroma shares words with luma and is not supported
    Yuy2,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PlaneId {
    Y,
    U,
    V,
    R,
    G,
    B,
    A,
}

impl PlaneId {
    #[inline]
    pub fn is_chroma(&self) -> bool {
        matches!(self, PlaneId::U | PlaneId::V)
    }

    #[inline]
    pub fn is_alpha(&self) -> bool {
        matches!(self, PlaneId::A)
    }
}

/// Where one channel lives inside the host frame
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelPlacement {
    pub id: PlaneId,
    /// Index of the host plane holding this channel
    pub plane: usize,
    /// Offset of the channel inside an interleaved pixel, in samples
    pub offset: usize,
    /// Distance between two horizontally adjacent samples of this channel
    pub step: usize,
}

impl ChannelPlacement {
    const fn planar(id: PlaneId, plane: usize) -> ChannelPlacement {
        ChannelPlacement {
            id,
            plane,
            offset: 0,
            step: 1,
        }
    }

    const fn packed(id: PlaneId, offset: usize, step: usize) -> ChannelPlacement {
        ChannelPlacement {
            id,
            plane: 0,
            offset,
            step,
        }
    }
}

impl PixelLayout {
    pub fn name(&self) -> &'static str {
        match self {
            PixelLayout::Gray => "Gray",
            PixelLayout::Yuv { .. } => "YUV",
            PixelLayout::PlanarRgb { .. } => "planar RGB",
            PixelLayout::PackedGray { .. } => "packed gray",
            PixelLayout::PackedRgb { .. } => "packed RGB",
            PixelLayout::Yuy2 => "YUY2",
        }
    }

    /// Chroma subsampling, zero for layouts without chroma
    pub fn subsampling(&self) -> Subsampling {
        match self {
            PixelLayout::Yuv { subsampling, .. } => *subsampling,
            _ => Subsampling::YUV444,
        }
    }

    /// Every channel in processing order.
    pub fn channels(&self) -> Vec<ChannelPlacement> {
        use ChannelPlacement as C;
        match *self {
            PixelLayout::Gray => vec![C::planar(PlaneId::Y, 0)],
            PixelLayout::Yuv { alpha, .. } => {
                let mut channels = vec![
                    C::planar(PlaneId::Y, 0),
                    C::planar(PlaneId::U, 1),
                    C::planar(PlaneId::V, 2),
                ];
                if alpha {
                    channels.push(C::planar(PlaneId::A, 3));
                }
                channels
            }
            PixelLayout::PlanarRgb { alpha } => {
                let mut channels = vec![
                    C::planar(PlaneId::R, 0),
                    C::planar(PlaneId::G, 1),
                    C::planar(PlaneId::B, 2),
                ];
                if alpha {
                    channels.push(C::planar(PlaneId::A, 3));
                }
                channels
            }
            PixelLayout::PackedGray { alpha } => {
                if alpha {
                    vec![C::packed(PlaneId::Y, 0, 2), C::packed(PlaneId::A, 1, 2)]
                } else {
                    vec![C::planar(PlaneId::Y, 0)]
                }
            }
            PixelLayout::PackedRgb { alpha } => {
                let step = if alpha { 4 } else { 3 };
                let mut channels = vec![
                    C::packed(PlaneId::R, 0, step),
                    C::packed(PlaneId::G, 1, step),
                    C::packed(PlaneId::B, 2, step),
                ];
                if alpha {
                    channels.push(C::packed(PlaneId::A, 3, step));
                }
                channels
            }
            PixelLayout::Yuy2 => Vec::new(),
        }
    }

    pub fn plane_count(&self) -> usize {
        match self {
            PixelLayout::Gray | PixelLayout::PackedGray { .. } | PixelLayout::PackedRgb { .. } => 1,
            PixelLayout::Yuv { alpha, .. } | PixelLayout::PlanarRgb { alpha } => {
                if *alpha {
                    4
                } else {
                    3
                }
            }
            PixelLayout::Yuy2 => 1,
        }
    }

    /// Samples per pixel inside each plane
    fn samples_per_pixel(&self) -> usize {
        match self {
            PixelLayout::PackedGray { alpha } => {
                if *alpha {
                    2
                } else {
                    1
                }
            }
            PixelLayout::PackedRgb { alpha } => {
                if *alpha {
                    4
                } else {
                    3
                }
            }
            PixelLayout::Yuy2 => 2,
            _ => 1,
        }
    }
}

/// Geometry and storage of every frame a filter instance processes
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub sample: SampleKind,
}

impl FrameFormat {
    pub fn new(width: u32, height: u32, layout: PixelLayout, sample: SampleKind) -> FrameFormat {
        FrameFormat {
            width,
            height,
            layout,
            sample,
        }
    }

    /// Rejects formats no filter instance can be built for.
    pub fn validate(&self) -> Result<(), BlurError> {
        if self.layout == PixelLayout::Yuy2 {
            return Err(BlurError::UnsupportedLayout(self.layout.name()));
        }
        if let SampleKind::U16 { bit_depth } = self.sample {
            if !matches!(bit_depth, 10 | 12 | 14 | 16) {
                return Err(BlurError::UnsupportedBitDepth(bit_depth));
            }
        }
        let subsampling = self.layout.subsampling();
        if !subsampling.is_supported() {
            return Err(BlurError::UnsupportedSubsampling(subsampling));
        }
        let (chroma_width, chroma_height) = subsampling.chroma_dimensions(self.width, self.height);
        if self.width == 0 || self.height == 0 || chroma_width == 0 || chroma_height == 0 {
            return Err(BlurError::ZeroBaseSize);
        }
        Ok(())
    }

    /// Pixel dimensions of a host plane.
    pub fn plane_dimensions(&self, plane: usize) -> (usize, usize) {
        let subsampling = self.layout.subsampling();
        let chroma = matches!(self.layout, PixelLayout::Yuv { .. }) && (plane == 1 || plane == 2);
        if chroma {
            let (width, height) = subsampling.chroma_dimensions(self.width, self.height);
            (width as usize, height as usize)
        } else {
            (self.width as usize, self.height as usize)
        }
    }

    /// Samples in one row of a host plane, without padding.
    pub fn plane_row_length(&self, plane: usize) -> usize {
        self.plane_dimensions(plane).0 * self.layout.samples_per_pixel()
    }
}

/// Start of row `y` inside a plane, negative strides store rows bottom-up.
#[inline]
pub(crate) fn row_start(stride: isize, y: usize, height: usize) -> usize {
    if stride >= 0 {
        y * stride as usize
    } else {
        (height - 1 - y) * stride.unsigned_abs()
    }
}

#[derive(Debug)]
pub enum BufferStore<'a, T: Copy + Debug> {
    Borrowed(&'a mut [T]),
    Owned(Vec<T>),
}

impl<T: Copy + Debug> BufferStore<'_, T> {
    #[allow(clippy::should_implement_trait)]
    pub fn borrow(&self) -> &[T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn borrow_mut(&mut self) -> &mut [T] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }
}

/// Read only host plane
#[derive(Debug, Clone)]
pub struct FramePlane<'a, T: Clone + Copy + Debug> {
    pub data: Cow<'a, [T]>,
    /// Samples between row starts, negative for bottom-up storage
    pub stride: isize,
}

/// Writable host plane
#[derive(Debug)]
pub struct FramePlaneMut<'a, T: Clone + Copy + Debug> {
    pub data: BufferStore<'a, T>,
    /// Samples between row starts, negative for bottom-up storage
    pub stride: isize,
}

/// Immutable frame, one entry per host plane
#[derive(Debug, Clone)]
pub struct BlurFrame<'a, T: Clone + Copy + Debug> {
    pub planes: Vec<FramePlane<'a, T>>,
}

/// Mutable frame, one entry per host plane
#[derive(Debug)]
pub struct BlurFrameMut<'a, T: Clone + Copy + Debug> {
    pub planes: Vec<FramePlaneMut<'a, T>>,
}

fn check_planes<T>(
    format: &FrameFormat,
    planes: &[(&[T], isize)],
) -> Result<(), BlurError> {
    let expected = format.layout.plane_count();
    if planes.len() != expected {
        return Err(BlurError::PlaneCountMismatch(MismatchedSize {
            expected,
            received: planes.len(),
        }));
    }
    for (index, (data, stride)) in planes.iter().enumerate() {
        let (_, height) = format.plane_dimensions(index);
        check_plane_size(data, *stride, format.plane_row_length(index), height)?;
    }
    Ok(())
}

impl<'a, T: Sample> BlurFrame<'a, T> {
    /// Borrows planes with explicit strides.
    pub fn borrow(planes: Vec<(&'a [T], isize)>) -> Self {
        BlurFrame {
            planes: planes
                .into_iter()
                .map(|(data, stride)| FramePlane {
                    data: Cow::Borrowed(data),
                    stride,
                })
                .collect(),
        }
    }

    /// Checks planes count, strides and slice sizes against the format.
    pub fn check_layout(&self, format: &FrameFormat) -> Result<(), BlurError> {
        let planes = self
            .planes
            .iter()
            .map(|p| (p.data.as_ref(), p.stride))
            .collect::<Vec<_>>();
        check_planes(format, &planes)
    }
}

impl<'a, T: Sample> BlurFrameMut<'a, T> {
    /// Allocates tightly packed top-down planes for the format.
    pub fn alloc(format: &FrameFormat) -> Self {
        let planes = (0..format.layout.plane_count())
            .map(|plane| {
                let row_length = format.plane_row_length(plane);
                let (_, height) = format.plane_dimensions(plane);
                FramePlaneMut {
                    data: BufferStore::Owned(vec![T::default(); row_length * height]),
                    stride: row_length as isize,
                }
            })
            .collect();
        BlurFrameMut { planes }
    }

    /// Mutable borrows planes with explicit strides.
    pub fn borrow(planes: Vec<(&'a mut [T], isize)>) -> Self {
        BlurFrameMut {
            planes: planes
                .into_iter()
                .map(|(data, stride)| FramePlaneMut {
                    data: BufferStore::Borrowed(data),
                    stride,
                })
                .collect(),
        }
    }

    pub fn check_layout(&self, format: &FrameFormat) -> Result<(), BlurError> {
        let planes = self
            .planes
            .iter()
            .map(|p| (p.data.borrow(), p.stride))
            .collect::<Vec<_>>();
        check_planes(format, &planes)
    }

    pub fn to_immutable_ref(&self) -> BlurFrame<'_, T> {
        BlurFrame {
            planes: self
                .planes
                .iter()
                .map(|p| FramePlane {
                    data: Cow::Borrowed(p.data.borrow()),
                    stride: p.stride,
                })
                .collect(),
        }
    }
}
