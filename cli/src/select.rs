use color_eyre::eyre::{bail, Result, WrapErr};
use fish_tracker_core::opencv::{
	core::{Mat, Rect},
	highgui,
	prelude::*,
	videoio::{VideoCapture, CAP_PROP_POS_FRAMES},
};
use tracing::{debug, info};

const SELECT_WINDOW: &str = "Select pond region";

/// Lets the user drag out the region to watch on the first frame, then
/// rewinds the capture so tracking still sees that frame.
pub fn select_bounds(capture: &mut VideoCapture) -> Result<Rect> {
	let mut first = Mat::default();
	if !capture
		.read(&mut first)
		.wrap_err("failed to read frame for region selection")?
		|| first.empty()
	{
		bail!("video source produced no frame to select a region on");
	}
	let roi = highgui::select_roi(SELECT_WINDOW, &first, true, false, true)
		.wrap_err("failed to select roi")?;
	highgui::destroy_window(SELECT_WINDOW).wrap_err("failed to close selection window")?;
	if roi.width <= 0 || roi.height <= 0 {
		bail!("no region selected");
	}

	// cameras can't seek; they just keep streaming
	if !capture
		.set(CAP_PROP_POS_FRAMES, 0.0)
		.wrap_err("failed to rewind video capture")?
	{
		debug!("capture does not support rewinding, first frame is skipped");
	}
	info!(x = roi.x, y = roi.y, width = roi.width, height = roi.height, "selected region");
	println!("{},{},{},{}", roi.x, roi.y, roi.width, roi.height);
	Ok(roi)
}
