use crate::{cmd::CliArgs, select};
use color_eyre::eyre::{Result, WrapErr};
use fish_tracker_core::{
	detect::FishDetector,
	opencv::prelude::*,
	preview::Preview,
	source::StreamInfo,
	track::{self, FrameReport},
	video::{self, Fourcc},
};
use indicatif::{HumanCount, ProgressBar, ProgressState, ProgressStyle};
use std::fmt::Write;
use tracing::info;

fn progress_bar(frame_count: Option<u64>) -> Result<ProgressBar> {
	let (progress_bar, template) = match frame_count {
		Some(total) => (
			ProgressBar::new(total),
			"[{elapsed}] {wide_bar:.green/red} {pos}/{len} frames ({per_sec}, ETA: {eta}) {msg}",
		),
		None => (
			ProgressBar::new_spinner(),
			"[{elapsed}] {spinner:.green} {pos} frames ({per_sec}) {msg}",
		),
	};
	let style = ProgressStyle::with_template(template)
		.wrap_err("invalid progress bar template")?
		.with_key("pos", |state: &ProgressState, w: &mut dyn Write| {
			let _ = write!(w, "{}", HumanCount(state.pos()));
		})
		.with_key("len", |state: &ProgressState, w: &mut dyn Write| {
			let _ = write!(w, "{}", HumanCount(state.len().unwrap_or_default()));
		})
		.with_key("per_sec", |state: &ProgressState, w: &mut dyn Write| {
			let _ = write!(w, "{:.1} fps", state.per_sec());
		});
	Ok(progress_bar.with_style(style))
}

pub fn track(args: CliArgs) -> Result<()> {
	if let Some(opts) = &args.ffmpeg_opts {
		std::env::set_var("OPENCV_FFMPEG_CAPTURE_OPTIONS", opts);
	}

	let mut capture = args.video.open()?;
	let info = StreamInfo::probe(&capture).wrap_err("failed to read stream properties")?;
	info!(
		width = info.width,
		height = info.height,
		fps = info.fps,
		frames = ?info.frame_count,
		"probed video source"
	);

	let bounds = if args.select_bounds {
		Some(select::select_bounds(&mut capture).wrap_err("failed to select region of interest")?)
	} else {
		args.bounds
	};
	let mut detector = FishDetector::new(args.detector_settings(bounds))
		.wrap_err("failed to set up fish detector")?;

	let fourcc = args.fourcc.unwrap_or_else(|| Fourcc::for_path(&args.out));
	let mut writer = video::open_writer(&args.out, fourcc, f64::from(info.fps), info.size())
		.wrap_err("failed to set up output video")?;

	let mut preview = args.debug.then(Preview::new);

	println!("tracking fish... press [Q] to stop.");
	let progress_bar = progress_bar(info.frame_count)?;
	let summary = track::track(
		&mut capture,
		&mut writer,
		&mut detector,
		preview.as_mut(),
		|report: &FrameReport<'_>| {
			progress_bar.set_position(report.index as u64);
			progress_bar.set_message(format!("{} fish", report.detections.len()));
		},
	)
	.wrap_err_with(|| format!("failed to track fish in {}", args.video))?;
	progress_bar.finish();

	drop(preview);
	writer
		.release()
		.wrap_err("failed to finish writing output video")?;
	capture
		.release()
		.wrap_err("failed to release video source")?;

	println!(
		"processed {} frames, at most {} fish in one frame ({} in the last)",
		HumanCount(summary.frames as u64),
		summary.peak_count,
		summary.last_count
	);
	println!(
		"tracking finished, saved output video to: {}",
		args.out.display()
	);
	Ok(())
}
