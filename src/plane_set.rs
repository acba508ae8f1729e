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
use crate::pyramid::default_level_count;
use crate::{BlurError, FrameFormat, PlaneId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// Resolution a channel is processed at
pub enum ResolutionClass {
    Full,
    /// Subsampled chroma, only present when the layout subsamples
    Chroma,
}

/// Dimensions and pyramid depth of the working buffers of one resolution class.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferShape {
    pub width: usize,
    pub height: usize,
    pub levels: usize,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelDescriptor {
    pub plane: PlaneId,
    /// Host plane index
    pub plane_index: usize,
    pub offset: usize,
    pub step: usize,
    /// Gamma may be applied, chroma and alpha are kept as is
    pub gamma: bool,
    pub chroma: bool,
    pub class: ResolutionClass,
}

/// Chroma pyramid depth for a luma pyramid of `luma_levels`.
///
/// Drops as many levels as the default heuristic loses between the two resolutions.
pub fn chroma_level_count(
    luma_levels: usize,
    luma: (usize, usize),
    chroma: (usize, usize),
) -> usize {
    let lost = default_level_count(luma.0, luma.1)
        .saturating_sub(default_level_count(chroma.0, chroma.1));
    luma_levels.saturating_sub(lost).max(1)
}

/// Channel configuration for one orientation of a frame format.
#[derive(Debug, Clone)]
pub struct PlaneSet {
    channels: Vec<ChannelDescriptor>,
    full: BufferShape,
    chroma: BufferShape,
    transposed: bool,
}

impl PlaneSet {
    /// Describes every channel of `format`.
    ///
    /// `levels == 0` picks the default pyramid depth for full resolution buffers.
    /// Transposed sets swap the dimensions of every buffer shape.
    pub fn build(format: &FrameFormat, levels: usize, transposed: bool) -> Result<PlaneSet, BlurError> {
        format.validate()?;
        let subsampling = format.layout.subsampling();
        let (width, height) = (format.width as usize, format.height as usize);
        let (chroma_width, chroma_height) = subsampling.chroma_dimensions(format.width, format.height);
        let (chroma_width, chroma_height) = (chroma_width as usize, chroma_height as usize);
        let luma_levels = if levels == 0 {
            default_level_count(width, height)
        } else {
            levels
        };
        let chroma_levels =
            chroma_level_count(luma_levels, (width, height), (chroma_width, chroma_height));

        let orient = |w: usize, h: usize, levels: usize| {
            if transposed {
                BufferShape {
                    width: h,
                    height: w,
                    levels,
                }
            } else {
                BufferShape {
                    width: w,
                    height: h,
                    levels,
                }
            }
        };
        let full = orient(width, height, luma_levels);
        let chroma = if subsampling.is_subsampled() {
            orient(chroma_width, chroma_height, chroma_levels)
        } else {
            full
        };

        let channels = format
            .layout
            .channels()
            .into_iter()
            .map(|placement| {
                let chroma = placement.id.is_chroma();
                ChannelDescriptor {
                    plane: placement.id,
                    plane_index: placement.plane,
                    offset: placement.offset,
                    step: placement.step,
                    gamma: !chroma && !placement.id.is_alpha(),
                    chroma,
                    class: if chroma && subsampling.is_subsampled() {
                        ResolutionClass::Chroma
                    } else {
                        ResolutionClass::Full
                    },
                }
            })
            .collect();

        Ok(PlaneSet {
            channels,
            full,
            chroma,
            transposed,
        })
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    pub fn shape_of(&self, class: ResolutionClass) -> BufferShape {
        match class {
            ResolutionClass::Full => self.full,
            ResolutionClass::Chroma => self.chroma,
        }
    }
}
