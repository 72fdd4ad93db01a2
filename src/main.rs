use std::error::Error;

use clap::Parser;

use webcam_accumulator::accumulator::{DEFAULT_NORM, Retention};
use webcam_accumulator::camera::Camera;
use webcam_accumulator::display::HighguiDisplay;
use webcam_accumulator::pipeline::{self, LoopConfig};
use webcam_accumulator::utils::interval_from_secs;

#[derive(Parser, Debug)]
#[command(
    name = "webcam accumulator",
    version,
    about = "Show a damped running average of a webcam's grayscale frames.",
    long_about = r#"Show a damped running average of a webcam's grayscale frames.

Every frame is flipped upside down, converted to grayscale and blended into a floating point accumulator with weight norm / frame_count. The accumulator is shown in a window after every frame. Press q in the window to quit."#
)]
struct Args {
    /// The device index of the camera. Laptop's builtin camera is usually at index 0.
    #[arg(short, long, default_value_t = 0)]
    cam_id: i32,

    /// Requested camera resolution's X component. The camera's default is used if omitted.
    #[arg(long, requires = "res_y")]
    res_x: Option<u32>,

    /// Requested camera resolution's Y component. The camera's default is used if omitted.
    #[arg(long, requires = "res_x")]
    res_y: Option<u32>,

    /// Normalisation applied to every blend weight.
    #[arg(long, default_value_t = DEFAULT_NORM)]
    norm: f64,

    /// How much of the accumulator is kept on each blend.
    #[arg(long, value_enum, default_value_t = Retention::Mean)]
    retention: Retention,

    /// How long to wait for a key press on every frame, in milliseconds.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i32).range(1..))]
    delay: i32,

    /// Title of the display window.
    #[arg(long, default_value_t = String::from("frame"))]
    window: String,

    /// Divide the accumulator by 255 before showing it.
    #[arg(long)]
    rescale: bool,

    /// Also show each frame warped by the fixed affine transform, in a second window.
    #[arg(long)]
    show_warp: bool,

    /// Seconds between frame rate reports. 0 turns them off.
    #[arg(long, default_value_t = 5.0)]
    fps_interval: f64,

    /// Print debug logs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .try_init()?;

    if !(args.norm.is_finite() && args.norm > 0.0) {
        return Err(format!("--norm must be a positive number, got {}", args.norm).into());
    }
    let fps_interval = interval_from_secs(args.fps_interval)?;

    let config = LoopConfig {
        norm: args.norm,
        retention: args.retention,
        key_delay_ms: args.delay,
        rescale: args.rescale,
        show_warp: args.show_warp,
        fps_interval,
    };
    log::debug!("{:?}", config);

    let resolution = args.res_x.zip(args.res_y);
    let cam = Camera::open(args.cam_id, resolution)?;
    let display = HighguiDisplay::new(args.window.as_str())?;
    let summary = pipeline::run(cam, display, &config)?;
    log::info!(
        "Finished after {} frames (quit key {:#x})",
        summary.frames,
        summary.quit_key
    );
    Ok(())
}
