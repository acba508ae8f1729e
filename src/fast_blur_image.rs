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
use crate::{
    BlurError, BlurFrame, BlurFrameMut, FastBlur, FastBlurParams, FrameFormat, MismatchedSize,
    PixelLayout, Sample, SampleKind, ThreadPool,
};
use image::{DynamicImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use std::sync::Arc;

fn blur_interleaved<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    layout: PixelLayout,
    sample: SampleKind,
    params: FastBlurParams,
    pool: &Arc<ThreadPool>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, BlurError>
where
    P: Pixel,
    P::Subpixel: Sample,
{
    let format = FrameFormat::new(image.width(), image.height(), layout, sample);
    let mut blur = FastBlur::new(format, params, pool.clone())?;
    let stride = format.plane_row_length(0) as isize;
    let src = BlurFrame::borrow(vec![(image.as_raw().as_slice(), stride)]);
    let mut dst = BlurFrameMut::alloc(&format);
    blur.process(&src, &mut dst)?;
    let data = dst.planes[0].data.borrow().to_vec();
    let received = data.len();
    ImageBuffer::from_raw(image.width(), image.height(), data).ok_or(
        BlurError::MinimumSliceSizeMismatch(MismatchedSize {
            expected: stride as usize * image.height() as usize,
            received,
        }),
    )
}

/// Blurs an image crate image with the iterated box Gaussian approximation.
///
/// Alpha is blurred as is, it must be associated for correct results around
/// transparent edges.
///
/// # Arguments
///
/// * `image` - Dynamic image, Luma, LumaA, Rgb and Rgba in 8 or 16 bits, Rgb and Rgba in 32 bit float.
/// * `params` - See [FastBlurParams] for more info.
/// * `pool` - Pool channel tasks are scheduled on.
pub fn fast_blur_image(
    image: DynamicImage,
    params: FastBlurParams,
    pool: &Arc<ThreadPool>,
) -> Result<DynamicImage, BlurError> {
    let u8_kind = SampleKind::U8;
    let u16_kind = SampleKind::U16 { bit_depth: 16 };
    let gray = PixelLayout::PackedGray { alpha: false };
    let gray_alpha = PixelLayout::PackedGray { alpha: true };
    let rgb = PixelLayout::PackedRgb { alpha: false };
    let rgba = PixelLayout::PackedRgb { alpha: true };
    match image {
        DynamicImage::ImageLuma8(img) => Ok(DynamicImage::ImageLuma8(
            blur_interleaved::<Luma<u8>>(&img, gray, u8_kind, params, pool)?,
        )),
        DynamicImage::ImageLumaA8(img) => Ok(DynamicImage::ImageLumaA8(
            blur_interleaved::<LumaA<u8>>(&img, gray_alpha, u8_kind, params, pool)?,
        )),
        DynamicImage::ImageRgb8(img) => Ok(DynamicImage::ImageRgb8(
            blur_interleaved::<Rgb<u8>>(&img, rgb, u8_kind, params, pool)?,
        )),
        DynamicImage::ImageRgba8(img) => Ok(DynamicImage::ImageRgba8(
            blur_interleaved::<Rgba<u8>>(&img, rgba, u8_kind, params, pool)?,
        )),
        DynamicImage::ImageLuma16(img) => Ok(DynamicImage::ImageLuma16(
            blur_interleaved::<Luma<u16>>(&img, gray, u16_kind, params, pool)?,
        )),
        DynamicImage::ImageLumaA16(img) => Ok(DynamicImage::ImageLumaA16(
            blur_interleaved::<LumaA<u16>>(&img, gray_alpha, u16_kind, params, pool)?,
        )),
        DynamicImage::ImageRgb16(img) => Ok(DynamicImage::ImageRgb16(
            blur_interleaved::<Rgb<u16>>(&img, rgb, u16_kind, params, pool)?,
        )),
        DynamicImage::ImageRgba16(img) => Ok(DynamicImage::ImageRgba16(
            blur_interleaved::<Rgba<u16>>(&img, rgba, u16_kind, params, pool)?,
        )),
        DynamicImage::ImageRgb32F(img) => Ok(DynamicImage::ImageRgb32F(
            blur_interleaved::<Rgb<f32>>(&img, rgb, SampleKind::F32, params, pool)?,
        )),
        DynamicImage::ImageRgba32F(img) => Ok(DynamicImage::ImageRgba32F(
            blur_interleaved::<Rgba<f32>>(&img, rgba, SampleKind::F32, params, pool)?,
        )),
        _ => Err(BlurError::UnsupportedLayout("image color type")),
    }
}
