use crate::mask::MaskCleaner;
use color_eyre::eyre::{Result, WrapErr};
use opencv::{
	core::{Mat, Point, Ptr, Rect, Vector},
	imgproc::{self, CHAIN_APPROX_SIMPLE, RETR_EXTERNAL},
	video::{self, BackgroundSubtractorMOG2, BackgroundSubtractorTrait},
};

/// Let OpenCV pick the learning rate from the history length.
const AUTO_LEARNING_RATE: f64 = -1.0;

/// Tuning for background subtraction and blob filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
	/// Frames of history the MOG2 model keeps.
	pub history: i32,
	/// Squared Mahalanobis distance for a pixel to match the model.
	pub var_threshold: f64,
	pub detect_shadows: bool,
	/// Raw mask values above this count as foreground.
	pub mask_threshold: f64,
	/// Side of the elliptical structuring element.
	pub kernel_size: i32,
	pub open_iterations: i32,
	pub close_iterations: i32,
	/// Contours with a smaller polygon area are ignored.
	pub min_area: f64,
	/// Only look for fish inside this region.
	pub bounds: Option<Rect>,
}

impl Default for DetectorSettings {
	fn default() -> Self {
		Self {
			history: 500,
			var_threshold: 50.0,
			detect_shadows: true,
			mask_threshold: 200.0,
			kernel_size: 5,
			open_iterations: 2,
			close_iterations: 2,
			min_area: 800.0,
			bounds: None,
		}
	}
}

/// A moving blob large enough to count as a fish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
	/// Bounding box in full-frame coordinates.
	pub bounds: Rect,
	pub area: f64,
}

pub struct FishDetector {
	settings: DetectorSettings,
	subtractor: Ptr<BackgroundSubtractorMOG2>,
	cleaner: MaskCleaner,
	raw_mask: Mat,
	mask: Mat,
}

impl FishDetector {
	pub fn new(settings: DetectorSettings) -> Result<Self> {
		let subtractor = video::create_background_subtractor_mog2(
			settings.history,
			settings.var_threshold,
			settings.detect_shadows,
		)
		.wrap_err("failed to create MOG2 background subtractor")?;
		let cleaner = MaskCleaner::new(&settings)?;
		Ok(Self {
			settings,
			subtractor,
			cleaner,
			raw_mask: Mat::default(),
			mask: Mat::default(),
		})
	}

	/// The cleaned foreground mask of the last processed frame.
	#[inline]
	pub fn mask(&self) -> &Mat {
		&self.mask
	}

	/// Feeds a frame into the background model and returns this frame's fish.
	///
	/// Detections are recomputed from scratch each frame; nothing links a
	/// detection to one from an earlier frame.
	pub fn process(&mut self, frame: &Mat) -> Result<Vec<Detection>> {
		let offset = match self.settings.bounds {
			Some(bounds) => {
				let region = Mat::roi(frame, bounds)
					.wrap_err_with(|| format!("invalid roi: {bounds:?}"))?;
				BackgroundSubtractorTrait::apply(
					&mut self.subtractor,
					&*region,
					&mut self.raw_mask,
					AUTO_LEARNING_RATE,
				)
				.wrap_err("background subtraction failed")?;
				Point::new(bounds.x, bounds.y)
			}
			None => {
				BackgroundSubtractorTrait::apply(
					&mut self.subtractor,
					frame,
					&mut self.raw_mask,
					AUTO_LEARNING_RATE,
				)
				.wrap_err("background subtraction failed")?;
				Point::default()
			}
		};

		self.cleaner
			.clean(&self.raw_mask, &mut self.mask)
			.wrap_err("failed to clean foreground mask")?;
		find_detections(&self.mask, self.settings.min_area, offset)
	}
}

/// Extracts the outer contours of `mask` and keeps those whose area is at
/// least `min_area`. `offset` is added to every contour point.
pub fn find_detections(mask: &Mat, min_area: f64, offset: Point) -> Result<Vec<Detection>> {
	let mut contours = Vector::<Vector<Point>>::new();
	imgproc::find_contours(mask, &mut contours, RETR_EXTERNAL, CHAIN_APPROX_SIMPLE, offset)
		.wrap_err("failed to find contours in foreground mask")?;

	let mut detections = Vec::new();
	for contour in contours.iter() {
		let area =
			imgproc::contour_area(&contour, false).wrap_err("failed to measure contour area")?;
		if area < min_area {
			continue;
		}
		let bounds =
			imgproc::bounding_rect(&contour).wrap_err("failed to compute contour bounding box")?;
		detections.push(Detection { bounds, area });
	}
	Ok(detections)
}
