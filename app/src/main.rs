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
use anyhow::{Context, Result};
use clap::Parser;
use fastblur::{fast_blur_image, FastBlurParams, ThreadPool, ThreadingPolicy, TransferFunction};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "fastblur")]
#[command(author, version, about = "Gaussian blur approximated by iterated box filters")]
struct Args {
    /// Input image
    input: PathBuf,

    /// Output image, format follows the extension
    output: PathBuf,

    /// Horizontal Gaussian sigma
    #[arg(short = 'x', long, default_value_t = 5.0)]
    x_sigma: f64,

    /// Vertical Gaussian sigma, same as horizontal when omitted
    #[arg(short = 'y', long)]
    y_sigma: Option<f64>,

    /// Box passes per axis
    #[arg(short, long, default_value_t = 3)]
    iterations: u32,

    /// Ordered dithering of integer output
    #[arg(long)]
    dither: bool,

    /// Blur encoded values instead of linear light
    #[arg(long)]
    no_gamma: bool,

    /// Transfer curve used for linearization
    #[arg(long, value_parser = parse_transfer, default_value = "srgb")]
    transfer: TransferFunction,

    /// Worker threads: negative is adaptive, 0 uses every core, (0, 1) is a fraction of cores
    #[arg(short = 'j', long, default_value_t = -1.0, allow_negative_numbers = true)]
    threads: f32,
}

fn parse_transfer(value: &str) -> Result<TransferFunction, String> {
    match value.to_ascii_lowercase().as_str() {
        "srgb" => Ok(TransferFunction::Srgb),
        "rec709" | "bt709" => Ok(TransferFunction::Rec709),
        "gamma2.2" => Ok(TransferFunction::Gamma2p2),
        "gamma2.8" => Ok(TransferFunction::Gamma2p8),
        "linear" => Ok(TransferFunction::Linear),
        other => Err(format!("unknown transfer function {other}")),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let img = image::ImageReader::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;

    let mut params = FastBlurParams::new(args.x_sigma)
        .with_iterations(args.iterations)
        .with_dither(args.dither)
        .with_gamma(!args.no_gamma)
        .with_transfer_function(args.transfer)
        .with_threading(ThreadingPolicy::from_hint(args.threads));
    if let Some(y_sigma) = args.y_sigma {
        params = params.with_y_sigma(y_sigma);
    }

    let pool = Arc::new(ThreadPool::with_policy(params.threading)?);
    let (width, height) = (img.width(), img.height());
    let start = Instant::now();
    let blurred = fast_blur_image(img, params, &pool)?;
    info!(
        width,
        height,
        threads = pool.thread_count(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.,
        "blurred"
    );

    blurred
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    Ok(())
}
