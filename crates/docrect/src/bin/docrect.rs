use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use log::{info, LevelFilter};
use nalgebra::Point2;
use serde::Serialize;

use docrect::convert;
use docrect::{Corner, DisplayBounds, OutputSpec, PointerKind};

/// Rectify a photographed document: warp a hand-marked quadrilateral onto
/// a fixed-size axis-aligned output raster.
#[derive(Parser, Debug)]
#[command(name = "docrect", version, about)]
struct Args {
    /// Input photo (any format the `image` crate decodes).
    input: PathBuf,

    /// Output file. `.jpg`/`.jpeg` is encoded with the quality hint,
    /// anything else is saved lossless with alpha.
    output: PathBuf,

    /// Corner coordinates in display space, clamped to the canvas:
    /// tl_x,tl_y,tr_x,tr_y,br_x,br_y,bl_x,bl_y. Defaults to a 10% inset.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    corners: Option<Vec<f32>>,

    /// Quarter turns clockwise applied to the source before cropping.
    /// Rotation resets the quad, so it runs before `--corners`.
    #[arg(long, default_value_t = 0)]
    rotate: u32,

    /// Output raster width in pixels.
    #[arg(long, default_value_t = 1011)]
    width: usize,

    /// Output raster height in pixels.
    #[arg(long, default_value_t = 638)]
    height: usize,

    /// JPEG quality hint (1-100).
    #[arg(long, default_value_t = 90)]
    quality: u8,

    /// Display area the editing canvas is fitted into.
    #[arg(long, default_value_t = 1280.0)]
    max_display_width: f32,

    /// See --max-display-width.
    #[arg(long, default_value_t = 720.0)]
    max_display_height: f32,

    /// Write a JSON commit report (scale factor, corners in both spaces,
    /// homography coefficients).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct CommitReport {
    scale_factor: f32,
    canvas: [f32; 2],
    display_corners: [[f32; 2]; 4],
    source_corners: [[f32; 2]; 4],
    /// Output-rectangle -> source map actually applied by the resampler.
    homography: [[f64; 3]; 3],
    output: [usize; 2],
    jpeg_quality: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    docrect::core::init_with_level(level)?;

    let img = ImageReader::open(&args.input)?.decode()?;
    let bounds = DisplayBounds {
        max_width: args.max_display_width,
        max_height: args.max_display_height,
    };
    let mut session = convert::begin_session(&img, bounds);

    for _ in 0..args.rotate % 4 {
        session.rotate_source();
    }

    if let Some(coords) = &args.corners {
        // drive the controller rather than poking the model, so the
        // canvas clamp applies exactly as it would interactively
        for (corner, xy) in Corner::ALL.into_iter().zip(coords.chunks_exact(2)) {
            session.pointer_down(corner);
            session.pointer_move(Point2::new(xy[0], xy[1]));
            session.pointer_up(PointerKind::Mouse);
        }
    }

    let spec = OutputSpec {
        width: args.width,
        height: args.height,
        jpeg_quality: args.quality,
    };
    let out = session.commit(&spec)?;

    if let Some(path) = &args.report {
        let display = session.quad().points().map(|p| [p.x, p.y]);
        let source = session.source_quad().map(|p| [p.x, p.y]);
        let report = CommitReport {
            scale_factor: session.scale_factor(),
            canvas: [session.canvas_width(), session.canvas_height()],
            display_corners: display,
            source_corners: source,
            homography: out.homography.to_array(),
            output: [out.raster.width, out.raster.height],
            jpeg_quality: out.jpeg_quality,
        };
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &report)?;
        info!("report written to {}", path.display());
    }

    let rgba = convert::image_from_raster(&out.raster).ok_or("output raster is inconsistent")?;
    let is_jpeg = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    if is_jpeg {
        // JPEG has no alpha channel; the rectified raster is opaque except
        // for boundary round-off, so dropping it is lossless in practice
        let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
        let mut writer = BufWriter::new(File::create(&args.output)?);
        let encoder = JpegEncoder::new_with_quality(&mut writer, out.jpeg_quality);
        rgb.write_with_encoder(encoder)?;
    } else {
        rgba.save(&args.output)?;
    }
    info!(
        "wrote {} ({}x{})",
        args.output.display(),
        out.raster.width,
        out.raster.height
    );

    Ok(())
}
