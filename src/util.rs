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
use crate::Subsampling;
use thiserror::Error;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

impl std::fmt::Display for MismatchedSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "expected={}, received={}",
            self.expected, self.received
        ))
    }
}

#[derive(Error, Debug)]
pub enum BlurError {
    #[error("Image size must not be zero")]
    ZeroBaseSize,
    #[error("Blur strength must be finite and non-negative, but received {0}")]
    NegativeSigma(f64),
    #[error("Iterations count must be positive")]
    ZeroIterations,
    #[error("Layout {0} is not supported, convert it to a planar layout first")]
    UnsupportedLayout(&'static str),
    #[error("Bit depth {0} is not supported, expected one of 8, 10, 12, 14, 16, 32")]
    UnsupportedBitDepth(u32),
    #[error("Chroma subsampling {0} is not supported, log2 factors must not exceed 30")]
    UnsupportedSubsampling(Subsampling),
    #[error("Sample storage type does not match frame format {0}")]
    SampleTypeMismatch(&'static str),
    #[error("Frame planes count mismatch: {0}")]
    PlaneCountMismatch(MismatchedSize),
    #[error("Minimum image slice size mismatch: {0}")]
    MinimumSliceSizeMismatch(MismatchedSize),
    #[error("Minimum stride size mismatch: {0}")]
    MinimumStrideSizeMismatch(MismatchedSize),
    #[error("Failed to spawn worker thread")]
    ThreadSpawn(#[from] std::io::Error),
}

impl BlurError {
    /// Errors that can only be raised while a filter instance is being created.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BlurError::ZeroBaseSize
                | BlurError::NegativeSigma(_)
                | BlurError::ZeroIterations
                | BlurError::UnsupportedLayout(_)
                | BlurError::UnsupportedBitDepth(_)
                | BlurError::UnsupportedSubsampling(_)
        )
    }
}

/// Checks that a plane with signed `stride` can hold `height` rows of `row_length` samples.
pub(crate) fn check_plane_size<T>(
    arr: &[T],
    stride: isize,
    row_length: usize,
    height: usize,
) -> Result<(), BlurError> {
    if row_length == 0 || height == 0 {
        return Err(BlurError::ZeroBaseSize);
    }
    let stride = stride.unsigned_abs();
    if stride < row_length {
        return Err(BlurError::MinimumStrideSizeMismatch(MismatchedSize {
            expected: row_length,
            received: stride,
        }));
    }
    if arr.len() < stride * (height - 1) + row_length {
        return Err(BlurError::MinimumSliceSizeMismatch(MismatchedSize {
            expected: stride * height,
            received: arr.len(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_size_accepts_tight_last_row() {
        let data = vec![0u8; 10 * 3 + 4];
        assert!(check_plane_size(&data, 10, 4, 4).is_ok());
        assert!(check_plane_size(&data, -10, 4, 4).is_ok());
    }

    #[test]
    fn plane_size_rejects_short_stride_and_slice() {
        let data = vec![0u8; 16];
        match check_plane_size(&data, 3, 4, 2) {
            Err(BlurError::MinimumStrideSizeMismatch(size)) => {
                assert_eq!(size.expected, 4);
                assert_eq!(size.received, 3);
            }
            other => panic!("Unexpected result {other:?}"),
        }
        assert!(matches!(
            check_plane_size(&data, 8, 8, 3),
            Err(BlurError::MinimumSliceSizeMismatch(_))
        ));
        assert!(matches!(
            check_plane_size(&data, 8, 0, 3),
            Err(BlurError::ZeroBaseSize)
        ));
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(BlurError::ZeroIterations.is_configuration());
        assert!(BlurError::UnsupportedLayout("YUY2").is_configuration());
        assert!(BlurError::UnsupportedSubsampling(Subsampling::new(40, 0)).is_configuration());
        assert!(!BlurError::PlaneCountMismatch(MismatchedSize {
            expected: 3,
            received: 1
        })
        .is_configuration());
    }
}
