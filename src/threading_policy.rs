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
use std::{num::NonZeroUsize, thread::available_parallelism};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Default)]
/// Set threading policy, resolved once when a pool is created.
pub enum ThreadingPolicy {
    /// Roughly half of available CPUs, but never less than 2 threads
    /// unless the host has a single CPU.
    #[default]
    Adaptive,
    /// Use every available CPU.
    Full,
    /// Use this fraction of available CPUs, at least one thread.
    /// Expected to be in `(0, 1)`.
    Fraction(f32),
    /// Use specified number of threads, capped by available CPUs.
    Fixed(NonZeroUsize),
}

impl ThreadingPolicy {
    /// Interprets a signed, possibly fractional, thread count hint.
    ///
    /// Negative values select [ThreadingPolicy::Adaptive], zero selects
    /// [ThreadingPolicy::Full], values in `(0, 1)` select a fraction of the CPUs,
    /// everything else is a thread count.
    pub fn from_hint(hint: f32) -> ThreadingPolicy {
        if hint.is_nan() || hint < 0. {
            ThreadingPolicy::Adaptive
        } else if hint == 0. {
            ThreadingPolicy::Full
        } else if hint < 1. {
            ThreadingPolicy::Fraction(hint)
        } else {
            let count = hint.min(usize::MAX as f32).floor() as usize;
            ThreadingPolicy::Fixed(NonZeroUsize::new(count).unwrap_or(NonZeroUsize::MIN))
        }
    }

    /// Returns the number of worker threads for this host.
    ///
    /// Must return at least 1.
    pub fn thread_count(&self) -> usize {
        self.thread_count_for(Self::available_parallelism())
    }

    /// Returns the number of worker threads for a host with `hardware` CPUs.
    pub fn thread_count_for(&self, hardware: usize) -> usize {
        let hardware = hardware.max(1);
        match *self {
            ThreadingPolicy::Adaptive => {
                let half = (hardware as f64 * 0.5 - 1.).floor().max(0.) as usize;
                half.max(2).min(hardware)
            }
            ThreadingPolicy::Full => hardware,
            ThreadingPolicy::Fraction(fraction) => {
                let share = (hardware as f64 * fraction as f64).floor();
                (share.max(0.) as usize).clamp(1, hardware)
            }
            ThreadingPolicy::Fixed(fixed) => fixed.get().min(hardware),
        }
    }

    fn available_parallelism() -> usize {
        available_parallelism().map(|x| x.get()).unwrap_or(1)
    }
}
