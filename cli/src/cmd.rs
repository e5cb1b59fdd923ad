use clap::Parser;
use color_eyre::eyre::{ContextCompat, Result, WrapErr};
use fish_tracker_core::{
	detect::DetectorSettings, opencv::core::Rect, source::VideoSource, video::Fourcc,
};
use itertools::Itertools;
use std::{path::PathBuf, str::FromStr};

#[derive(Parser)]
#[command(author, version, about = "Track fish in pond video", long_about = None)]
pub struct CliArgs {
	/// Path to the pond video file, or a webcam index.
	#[arg(short, long)]
	pub video: VideoSource,
	/// The file to output to.
	#[arg(short, long, default_value = "fish_tracked.mp4")]
	pub out: PathBuf,
	/// Minimum contour area (in pixels) to count as a fish.
	#[arg(long, default_value = "800")]
	pub min_area: u32,
	/// Show the annotated frames and foreground mask while tracking.
	#[arg(long)]
	pub debug: bool,
	/// The bounds of the region of interest (x,y,width,height).
	#[arg(short, long, value_parser = parse_rect)]
	pub bounds: Option<Rect>,
	/// Pick the region of interest by hand on the first frame.
	#[arg(long, conflicts_with = "bounds")]
	pub select_bounds: bool,
	/// How many frames of history the background model keeps.
	#[arg(long, default_value = "500")]
	pub history: i32,
	/// How far a pixel may drift from the background model and still match it.
	#[arg(long, default_value = "50")]
	pub var_threshold: f64,
	/// Don't model shadows separately from moving objects.
	#[arg(long)]
	pub no_shadows: bool,
	/// The output codec. Defaults to MJPG for .avi and mp4v otherwise.
	#[arg(long)]
	pub fourcc: Option<Fourcc>,
	/// The ffmpeg capture options to force.
	#[arg(long)]
	pub ffmpeg_opts: Option<String>,
}

impl CliArgs {
	pub fn detector_settings(&self, bounds: Option<Rect>) -> DetectorSettings {
		DetectorSettings {
			history: self.history,
			var_threshold: self.var_threshold,
			detect_shadows: !self.no_shadows,
			min_area: f64::from(self.min_area),
			bounds,
			..DetectorSettings::default()
		}
	}
}

fn parse_rect(arg: &str) -> Result<Rect> {
	let (x, y, width, height) = arg
		.split(',')
		.map(str::trim)
		.map(|thingy| {
			i32::from_str(thingy).wrap_err_with(|| format!("invalid number '{}'", thingy))
		})
		.collect::<Result<Vec<i32>>>()
		.wrap_err("rectangle should be formatted at x,y,width,height")?
		.into_iter()
		.collect_tuple()
		.context("rectangle should be formatted at x,y,width,height")?;

	Ok(Rect::new(x, y, width, height))
}
