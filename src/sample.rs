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
use crate::BlurError;
use num_traits::AsPrimitive;
use std::fmt::Debug;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
/// Storage of one sample, integers above 8 bits are kept in 16 bit words.
pub enum SampleKind {
    U8,
    /// 10, 12, 14 or 16 bits stored in `u16`
    U16 {
        bit_depth: u32,
    },
    F32,
}

impl SampleKind {
    pub fn from_bit_depth(bit_depth: u32) -> Result<SampleKind, BlurError> {
        match bit_depth {
            8 => Ok(SampleKind::U8),
            10 | 12 | 14 | 16 => Ok(SampleKind::U16 { bit_depth }),
            32 => Ok(SampleKind::F32),
            _ => Err(BlurError::UnsupportedBitDepth(bit_depth)),
        }
    }

    pub fn bit_depth(&self) -> u32 {
        match self {
            SampleKind::U8 => 8,
            SampleKind::U16 { bit_depth } => *bit_depth,
            SampleKind::F32 => 32,
        }
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, SampleKind::F32)
    }

    /// Largest code value, floats are normalized to `1.0`.
    #[inline]
    pub fn max_value(&self) -> f32 {
        match self {
            SampleKind::U8 => 255.,
            SampleKind::U16 { bit_depth } => ((1u32 << *bit_depth) - 1) as f32,
            SampleKind::F32 => 1.,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            SampleKind::U8 => "u8",
            SampleKind::U16 { .. } => "u16",
            SampleKind::F32 => "f32",
        }
    }
}

/// Host sample type the blur converts from and back to.
pub trait Sample: Copy + Default + Debug + Send + Sync + 'static {
    /// Checks that frames of this type can carry samples of `kind`.
    fn accepts(kind: SampleKind) -> bool;

    fn to_f32(self) -> f32;

    /// Converts back, integers are rounded and saturated.
    fn from_f32(value: f32) -> Self;

    fn check_kind(kind: SampleKind) -> Result<(), BlurError> {
        if Self::accepts(kind) {
            Ok(())
        } else {
            Err(BlurError::SampleTypeMismatch(kind.name()))
        }
    }
}

macro_rules! impl_integral_sample {
    ($t:ty, $pattern:pat) => {
        impl Sample for $t {
            #[inline]
            fn accepts(kind: SampleKind) -> bool {
                matches!(kind, $pattern)
            }

            #[inline(always)]
            fn to_f32(self) -> f32 {
                self.as_()
            }

            #[inline(always)]
            fn from_f32(value: f32) -> Self {
                value.round().max(0.).min(<$t>::MAX as f32) as $t
            }
        }
    };
}

impl_integral_sample!(u8, SampleKind::U8);
impl_integral_sample!(u16, SampleKind::U16 { .. });

impl Sample for f32 {
    #[inline]
    fn accepts(kind: SampleKind) -> bool {
        kind == SampleKind::F32
    }

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value
    }
}
