use crate::detect::DetectorSettings;
use color_eyre::eyre::{Result, WrapErr};
use opencv::{
	core::{Mat, Point, Size, BORDER_CONSTANT},
	imgproc::{self, MORPH_CLOSE, MORPH_ELLIPSE, MORPH_OPEN, THRESH_BINARY},
};

const ANCHOR: Point = Point::new(-1, -1);

/// Turns a raw subtractor mask into a clean binary one.
///
/// MOG2 marks shadows with 127, so the threshold leaves only confident
/// foreground. Opening removes speckle, closing fills holes inside blobs.
pub struct MaskCleaner {
	threshold: f64,
	kernel: Mat,
	open_iterations: i32,
	close_iterations: i32,
	binary: Mat,
	opened: Mat,
}

impl MaskCleaner {
	pub fn new(settings: &DetectorSettings) -> Result<Self> {
		let kernel = imgproc::get_structuring_element(
			MORPH_ELLIPSE,
			Size::new(settings.kernel_size, settings.kernel_size),
			ANCHOR,
		)
		.wrap_err("failed to build morphology kernel")?;
		Ok(Self {
			threshold: settings.mask_threshold,
			kernel,
			open_iterations: settings.open_iterations,
			close_iterations: settings.close_iterations,
			binary: Mat::default(),
			opened: Mat::default(),
		})
	}

	pub fn clean(&mut self, raw: &Mat, cleaned: &mut Mat) -> Result<()> {
		imgproc::threshold(raw, &mut self.binary, self.threshold, 255.0, THRESH_BINARY)
			.wrap_err("failed to threshold foreground mask")?;
		imgproc::morphology_ex(
			&self.binary,
			&mut self.opened,
			MORPH_OPEN,
			&self.kernel,
			ANCHOR,
			self.open_iterations,
			BORDER_CONSTANT,
			imgproc::morphology_default_border_value()?,
		)
		.wrap_err("failed to open foreground mask")?;
		imgproc::morphology_ex(
			&self.opened,
			cleaned,
			MORPH_CLOSE,
			&self.kernel,
			ANCHOR,
			self.close_iterations,
			BORDER_CONSTANT,
			imgproc::morphology_default_border_value()?,
		)
		.wrap_err("failed to close foreground mask")?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use opencv::{
		core::{self, Rect, Scalar, CV_8UC1},
		prelude::*,
	};

	fn blank(value: f64) -> Mat {
		Mat::new_rows_cols_with_default(120, 160, CV_8UC1, Scalar::all(value)).unwrap()
	}

	#[test]
	fn shadows_are_dropped() {
		let mut cleaner = MaskCleaner::new(&DetectorSettings::default()).unwrap();
		let mut raw = blank(0.0);
		imgproc::rectangle(
			&mut raw,
			Rect::new(20, 20, 60, 60),
			Scalar::all(127.0),
			imgproc::FILLED,
			imgproc::LINE_8,
			0,
		)
		.unwrap();
		let mut cleaned = Mat::default();
		cleaner.clean(&raw, &mut cleaned).unwrap();
		assert_eq!(core::count_non_zero(&cleaned).unwrap(), 0);
	}

	#[test]
	fn speckle_is_removed_but_blobs_survive() {
		let mut cleaner = MaskCleaner::new(&DetectorSettings::default()).unwrap();
		let mut raw = blank(0.0);
		// lone foreground pixels
		for (x, y) in [(5, 5), (100, 10), (150, 110)] {
			*raw.at_2d_mut::<u8>(y, x).unwrap() = 255;
		}
		imgproc::rectangle(
			&mut raw,
			Rect::new(40, 40, 40, 40),
			Scalar::all(255.0),
			imgproc::FILLED,
			imgproc::LINE_8,
			0,
		)
		.unwrap();
		let mut cleaned = Mat::default();
		cleaner.clean(&raw, &mut cleaned).unwrap();

		for (x, y) in [(5, 5), (100, 10), (150, 110)] {
			assert_eq!(*cleaned.at_2d::<u8>(y, x).unwrap(), 0);
		}
		assert_eq!(*cleaned.at_2d::<u8>(60, 60).unwrap(), 255);
		let remaining = core::count_non_zero(&cleaned).unwrap();
		assert!(remaining > 1400 && remaining <= 1600, "{remaining}");
	}
}
