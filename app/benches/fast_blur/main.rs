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
use criterion::{criterion_group, criterion_main, Criterion};
use fastblur::{
    BlurFrame, BlurFrameMut, FastBlur, FastBlurParams, FrameFormat, PixelLayout, SampleKind,
    Subsampling, ThreadPool, ThreadingPolicy,
};
use std::hint::black_box;
use std::sync::Arc;

fn synthetic_plane<T: Copy>(len: usize, map: impl Fn(usize) -> T) -> Vec<T> {
    (0..len).map(|i| map((i * 7919) % 1021)).collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let (width, height) = (1920u32, 1080u32);
    let pool = Arc::new(ThreadPool::with_policy(ThreadingPolicy::Adaptive).unwrap());

    c.bench_function("fastblur: YUV420 8 bit sigma 10", |b| {
        let format = FrameFormat::new(
            width,
            height,
            PixelLayout::Yuv {
                subsampling: Subsampling::YUV420,
                alpha: false,
            },
            SampleKind::U8,
        );
        let luma = synthetic_plane(1920 * 1080, |v| (v & 255) as u8);
        let chroma = synthetic_plane(960 * 540, |v| (v & 255) as u8);
        let src = BlurFrame::borrow(vec![
            (luma.as_slice(), 1920),
            (chroma.as_slice(), 960),
            (chroma.as_slice(), 960),
        ]);
        let mut dst = BlurFrameMut::alloc(&format);
        let mut blur = FastBlur::new(format, FastBlurParams::new(10.), pool.clone()).unwrap();
        b.iter(|| {
            blur.process(black_box(&src), &mut dst).unwrap();
        })
    });

    c.bench_function("fastblur: packed RGBA 16 bit sigma 25", |b| {
        let format = FrameFormat::new(
            width,
            height,
            PixelLayout::PackedRgb { alpha: true },
            SampleKind::U16 { bit_depth: 16 },
        );
        let data = synthetic_plane(1920 * 1080 * 4, |v| (v * 64) as u16);
        let src = BlurFrame::borrow(vec![(data.as_slice(), 1920 * 4)]);
        let mut dst = BlurFrameMut::alloc(&format);
        let mut blur = FastBlur::new(format, FastBlurParams::new(25.), pool.clone()).unwrap();
        b.iter(|| {
            blur.process(black_box(&src), &mut dst).unwrap();
        })
    });

    c.bench_function("fastblur: planar RGB f32 sigma 3, 5 iterations", |b| {
        let format = FrameFormat::new(
            width,
            height,
            PixelLayout::PlanarRgb { alpha: false },
            SampleKind::F32,
        );
        let plane = synthetic_plane(1920 * 1080, |v| v as f32 / 1020.);
        let src = BlurFrame::borrow(vec![
            (plane.as_slice(), 1920),
            (plane.as_slice(), 1920),
            (plane.as_slice(), 1920),
        ]);
        let mut dst = BlurFrameMut::alloc(&format);
        let params = FastBlurParams::new(3.).with_iterations(5);
        let mut blur = FastBlur::new(format, params, pool.clone()).unwrap();
        b.iter(|| {
            blur.process(black_box(&src), &mut dst).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
