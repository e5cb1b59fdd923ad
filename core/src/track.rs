use crate::{
	annotate,
	detect::{Detection, FishDetector},
	frame::Frames,
	preview::Preview,
};
use color_eyre::eyre::{Result, WrapErr};
use opencv::{
	prelude::*,
	videoio::{VideoCapture, VideoWriter},
};
use tracing::{debug, info};

/// What the tracker saw in one frame, handed to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct FrameReport<'a> {
	pub index: usize,
	pub detections: &'a [Detection],
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackSummary {
	pub frames: usize,
	/// Fish counted in the final frame.
	pub last_count: usize,
	/// Most fish counted in any single frame.
	pub peak_count: usize,
	/// Per-frame counts summed over the run. The same fish seen in two
	/// frames counts twice.
	pub total_detections: usize,
	/// Whether the user stopped the run from the preview window.
	pub stopped_early: bool,
}

impl TrackSummary {
	fn record(&mut self, index: usize, count: usize) {
		self.frames = index;
		self.last_count = count;
		self.peak_count = self.peak_count.max(count);
		self.total_detections += count;
	}
}

/// Runs every frame of `capture` through `detector`, writing annotated frames
/// to `writer` until the capture runs out or the preview asks to stop.
pub fn track<OnFrame>(
	capture: &mut VideoCapture,
	writer: &mut VideoWriter,
	detector: &mut FishDetector,
	mut preview: Option<&mut Preview>,
	mut on_frame: OnFrame,
) -> Result<TrackSummary>
where
	OnFrame: FnMut(&FrameReport<'_>),
{
	let mut summary = TrackSummary::default();
	for mut frame in Frames::new(capture) {
		let index = frame.index();
		let detections = detector
			.process(frame.image())
			.wrap_err_with(|| format!("failed to detect fish in frame {index}"))?;

		annotate::annotate(frame.image_mut(), index, &detections)
			.wrap_err_with(|| format!("failed to annotate frame {index}"))?;
		writer
			.write(frame.image())
			.wrap_err_with(|| format!("failed to write frame {index} to output"))?;

		summary.record(index, detections.len());
		debug!(frame = index, fish = detections.len(), "processed frame");
		on_frame(&FrameReport {
			index,
			detections: &detections,
		});

		if let Some(preview) = preview.as_deref_mut() {
			if preview
				.show(frame.image(), detector.mask())
				.wrap_err_with(|| format!("failed to preview frame {index}"))?
			{
				info!(frame = index, "stopped from preview window");
				summary.stopped_early = true;
				break;
			}
		}
	}

	info!(
		frames = summary.frames,
		peak = summary.peak_count,
		total = summary.total_detections,
		"tracking finished"
	);
	Ok(summary)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		detect::DetectorSettings,
		source::{StreamInfo, VideoSource},
		synthetic,
		video::{self, Fourcc},
	};
	use opencv::core::Size;
	use std::path::Path;

	fn write_clip(path: &Path, frames: &[opencv::core::Mat]) {
		let size = Size::new(synthetic::WIDTH, synthetic::HEIGHT);
		let mut writer = video::open_writer(path, Fourcc::MJPG, 25.0, size).unwrap();
		for frame in frames {
			writer.write(frame).unwrap();
		}
		writer.release().unwrap();
	}

	fn count_frames(path: &Path) -> usize {
		let mut capture = VideoSource::File(path.to_owned()).open().unwrap();
		Frames::new(&mut capture).count()
	}

	#[test]
	fn every_frame_is_reported_and_written() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("pond.avi");
		let output = dir.path().join("tracked.avi");

		let mut clip = (0..40).map(|_| synthetic::scene(None)).collect::<Vec<_>>();
		clip.extend((0..synthetic::MOVING_FRAMES).map(|step| {
			synthetic::scene(Some(synthetic::block_at(step)))
		}));
		write_clip(&input, &clip);

		let mut capture = VideoSource::File(input.clone()).open().unwrap();
		let info = StreamInfo::probe(&capture).unwrap();
		assert_eq!(info.size(), Size::new(synthetic::WIDTH, synthetic::HEIGHT));
		assert_eq!(info.fps, 25);

		let mut writer =
			video::open_writer(&output, Fourcc::MJPG, f64::from(info.fps), info.size()).unwrap();
		let mut detector = FishDetector::new(DetectorSettings::default()).unwrap();
		let mut reports = Vec::new();
		let summary = track(&mut capture, &mut writer, &mut detector, None, |report| {
			reports.push((report.index, report.detections.len()));
		})
		.unwrap();
		writer.release().unwrap();

		assert_eq!(summary.frames, clip.len());
		assert!(!summary.stopped_early);
		let indices = reports.iter().map(|(index, _)| *index).collect::<Vec<_>>();
		assert_eq!(indices, (1..=clip.len()).collect::<Vec<_>>());

		// compression noise is allowed to settle, the swimming block is not
		let moving = &reports[40..];
		assert!(moving.iter().all(|(_, count)| *count >= 1), "{moving:?}");
		assert!(summary.peak_count >= 1);

		assert_eq!(count_frames(&output), clip.len());
	}
}
