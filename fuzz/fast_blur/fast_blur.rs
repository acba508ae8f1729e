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

#![no_main]

use arbitrary::Arbitrary;
use fastblur::{
    BlurFrame, BlurFrameMut, FastBlur, FastBlurParams, FrameFormat, PixelLayout, Sample,
    SampleKind, Subsampling, ThreadPool,
};
use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    height: u8,
    layout: u8,
    depth: u8,
    x_sigma: u8,
    y_sigma: u8,
    iterations: u8,
    dither: bool,
    gamma: bool,
    flip: bool,
    fill: u8,
}

fn pool() -> Arc<ThreadPool> {
    static POOL: OnceLock<Arc<ThreadPool>> = OnceLock::new();
    POOL.get_or_init(|| Arc::new(ThreadPool::new(3).unwrap()))
        .clone()
}

fn layout(selector: u8) -> PixelLayout {
    match selector % 6 {
        0 => PixelLayout::Gray,
        1 => PixelLayout::Yuv {
            subsampling: Subsampling::new((selector as u32 >> 3) & 1, (selector as u32 >> 4) & 1),
            alpha: selector & 0x80 != 0,
        },
        2 => PixelLayout::PlanarRgb {
            alpha: selector & 0x80 != 0,
        },
        3 => PixelLayout::PackedGray {
            alpha: selector & 0x80 != 0,
        },
        4 => PixelLayout::PackedRgb {
            alpha: selector & 0x80 != 0,
        },
        _ => PixelLayout::Yuy2,
    }
}

fn run<T: Sample>(format: FrameFormat, params: FastBlurParams, flip: bool, fill: impl Fn(usize) -> T) {
    let Ok(mut blur) = FastBlur::new(format, params, pool()) else {
        return;
    };
    let mut src = BlurFrameMut::<T>::alloc(&format);
    for plane in src.planes.iter_mut() {
        for (i, v) in plane.data.borrow_mut().iter_mut().enumerate() {
            *v = fill(i);
        }
        if flip {
            plane.stride = -plane.stride;
        }
    }
    let mut dst = BlurFrameMut::<T>::alloc(&format);
    if flip {
        for plane in dst.planes.iter_mut() {
            plane.stride = -plane.stride;
        }
    }
    blur.process(&src.to_immutable_ref(), &mut dst).unwrap();
}

fuzz_target!(|input: Input| {
    let sample = match input.depth % 4 {
        0 => SampleKind::U8,
        1 => SampleKind::U16 { bit_depth: 10 },
        2 => SampleKind::U16 { bit_depth: 16 },
        _ => SampleKind::F32,
    };
    let format = FrameFormat::new(
        input.width as u32 % 97,
        input.height as u32 % 97,
        layout(input.layout),
        sample,
    );
    let params = FastBlurParams::new(input.x_sigma as f64 * 0.25)
        .with_y_sigma(input.y_sigma as f64 * 0.25)
        .with_iterations(input.iterations as u32 % 7)
        .with_dither(input.dither)
        .with_gamma(input.gamma);
    let fill = input.fill as usize;
    match sample {
        SampleKind::U8 => run::<u8>(format, params, input.flip, |i| ((i * fill) & 255) as u8),
        SampleKind::U16 { bit_depth } => run::<u16>(format, params, input.flip, |i| {
            ((i * fill) & ((1 << bit_depth) - 1)) as u16
        }),
        SampleKind::F32 => run::<f32>(format, params, input.flip, |i| ((i * fill) % 256) as f32 / 255.),
    }
});
