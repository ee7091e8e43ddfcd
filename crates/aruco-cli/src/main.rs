use std::path::{Path, PathBuf};
use std::time::Instant;

use argh::FromArgs;

use aruco_ar::image::{Image, ImageSize};
use aruco_ar::imgproc::color::gray_from_rgb_u8;
use aruco_detect::{DetectorConfig, MarkerDetector};
use aruco_pose::{solve_square_pose, CameraCalibration, CameraIntrinsics};
use aruco_render::{draw_overlay, shape_for_id, OverlayStyle, Shape};

mod io;

/// Detects square fiducial markers in PNG frames and draws AR overlays
#[derive(Debug, FromArgs)]
struct Args {
    /// input PNG frame paths, processed in order
    #[argh(positional)]
    frames: Vec<String>,

    /// camera calibration JSON file
    #[argh(option, short = 'c')]
    calibration: Option<String>,

    /// output directory for overlaid frames
    #[argh(option, short = 'o', default = "String::from(\"out\")")]
    out_dir: String,

    /// draw this shape for every marker instead of the per-id lookup
    #[argh(option, short = 's', from_str_fn(parse_shape))]
    shape: Option<Shape>,

    /// marker side length in world units
    #[argh(option, default = "1.0")]
    side_length: f32,

    /// minimum candidate area in square pixels
    #[argh(option, default = "500.0")]
    min_area: f32,

    /// maximum tolerated bit errors when matching the dictionary
    #[argh(option, default = "0")]
    max_hamming: u8,
}

fn parse_shape(value: &str) -> Result<Shape, String> {
    value.parse()
}

fn load_calibration(path: &Path) -> Result<CameraCalibration, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    if args.frames.is_empty() {
        return Err("no input frames given".into());
    }

    let calibration = match &args.calibration {
        Some(path) => {
            let calibration = load_calibration(Path::new(path))?;
            log::info!("loaded camera calibration from {path}");
            Some(calibration)
        }
        None => None,
    };

    let out_dir = PathBuf::from(&args.out_dir);
    std::fs::create_dir_all(&out_dir)?;

    let config = DetectorConfig {
        min_area: args.min_area,
        max_hamming: args.max_hamming,
        ..Default::default()
    };
    let style = OverlayStyle::default();

    let mut detector: Option<(ImageSize, MarkerDetector)> = None;
    let mut gray: Option<Image<u8, 1>> = None;
    let mut total_elapsed = 0.0f64;
    let mut total_markers = 0usize;

    for frame_name in &args.frames {
        let frame_path = Path::new(frame_name);
        let start = Instant::now();

        let mut frame = io::read_image_png_rgb8(frame_path)?;
        let size = frame.size();

        let camera = calibration.unwrap_or_else(|| {
            CameraCalibration::pinhole(CameraIntrinsics::default_for(size.width, size.height))
        });

        // The detector and the gray buffer are reused while the frame size
        // stays the same.
        if detector.as_ref().map(|(s, _)| *s) != Some(size) {
            detector = Some((size, MarkerDetector::new(config.clone(), size)?));
            gray = Some(Image::from_size_val(size, 0)?);
        }
        let (_, detector) = detector.as_mut().expect("detector was just created");
        let gray = gray.as_mut().expect("gray buffer was just created");

        gray_from_rgb_u8(&frame, gray)?;
        let detections = detector.detect(gray)?;

        for detection in &detections {
            let shape = args.shape.unwrap_or_else(|| shape_for_id(detection.id));

            let pose = match solve_square_pose(
                &detection.oriented_corners(),
                args.side_length,
                &camera,
            ) {
                Ok(pose) => pose,
                Err(err) => {
                    log::warn!("skipping marker {} in {frame_name}: {err}", detection.id);
                    continue;
                }
            };

            log::info!(
                "{frame_name}: marker id={} rotation={} hamming={} center=({:.1}, {:.1}) \
                 depth={:.2} reproj={:.2}px shape={shape}",
                detection.id,
                detection.rotation,
                detection.hamming,
                detection.center.x,
                detection.center.y,
                pose.translation.z,
                pose.reprojection_rmse(&detection.oriented_corners(), args.side_length, &camera),
            );

            draw_overlay(
                &mut frame,
                detection,
                &pose,
                &camera,
                shape,
                args.side_length,
                &style,
            );
        }

        total_markers += detections.len();
        total_elapsed += start.elapsed().as_secs_f64();

        let file_name = frame_path
            .file_name()
            .ok_or_else(|| format!("invalid frame path {frame_name}"))?;
        io::write_image_png_rgb8(out_dir.join(file_name), &frame)?;
    }

    let frames = args.frames.len() as f64;
    log::info!(
        "processed {} frames, {} markers, {:.1} ms/frame ({:.1} fps)",
        args.frames.len(),
        total_markers,
        1000.0 * total_elapsed / frames,
        frames / total_elapsed.max(f64::EPSILON),
    );

    Ok(())
}
