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
use crate::frame::row_start;
use std::cell::UnsafeCell;

/// Destination plane shared by channel tasks writing disjoint samples.
///
/// Interleaved layouts keep every channel in the same host plane, each channel
/// task owns the samples at its own `offset + x * step`.
pub(crate) struct SharedPlane<'a, T> {
    samples: &'a [UnsafeCell<T>],
    stride: isize,
    height: usize,
}

unsafe impl<T: Send + Sync> Send for SharedPlane<'_, T> {}

unsafe impl<T: Send + Sync> Sync for SharedPlane<'_, T> {}

impl<'a, T> SharedPlane<'a, T> {
    pub(crate) fn new(samples: &'a mut [T], stride: isize, height: usize) -> Self {
        let ptr = samples as *mut [T] as *const [UnsafeCell<T>];
        SharedPlane {
            samples: unsafe { &*ptr },
            stride,
            height,
        }
    }

    #[inline(always)]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    /// Index of sample `index` in row `y`, panics when outside of the plane.
    #[inline(always)]
    fn position(&self, y: usize, index: usize) -> usize {
        assert!(y < self.height, "Row {y} is outside of {} rows", self.height);
        let position = row_start(self.stride, y, self.height) + index;
        assert!(position < self.samples.len());
        position
    }

    /// SAFETY: two threads must never write the same `(y, index)` concurrently,
    /// and nothing may read the plane while writers are alive.
    #[inline(always)]
    pub(crate) unsafe fn write(&self, y: usize, index: usize, value: T) {
        let position = self.position(y, index);
        *self.samples[position].get() = value;
    }
}
