use crate::detect::Detection;
use color_eyre::eyre::{Result, WrapErr};
use opencv::{
	core::{Mat, Point, Scalar},
	imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};

const FONT_SCALE: f64 = 0.6;
const THICKNESS: i32 = 2;
/// Gap between a box's top edge and its label baseline.
const LABEL_LIFT: i32 = 10;

// BGR
fn box_color() -> Scalar {
	Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn label_color() -> Scalar {
	Scalar::all(255.0)
}

fn overlay_color() -> Scalar {
	Scalar::new(0.0, 255.0, 255.0, 0.0)
}

fn put_text(frame: &mut Mat, text: &str, origin: Point, color: Scalar) -> Result<()> {
	imgproc::put_text(
		frame,
		text,
		origin,
		FONT_HERSHEY_SIMPLEX,
		FONT_SCALE,
		color,
		THICKNESS,
		LINE_8,
		false,
	)
	.wrap_err_with(|| format!("failed to draw text '{text}'"))
}

/// Burns boxes, `Fish n` labels and the frame/count overlay into `frame`.
pub fn annotate(frame: &mut Mat, index: usize, detections: &[Detection]) -> Result<()> {
	for (n, detection) in detections.iter().enumerate() {
		let bounds = detection.bounds;
		imgproc::rectangle(frame, bounds, box_color(), THICKNESS, LINE_8, 0)
			.wrap_err("failed to draw bounding box")?;
		put_text(
			frame,
			&format!("Fish {}", n + 1),
			Point::new(bounds.x, bounds.y - LABEL_LIFT),
			label_color(),
		)?;
	}

	put_text(frame, &format!("Frame: {index}"), Point::new(10, 20), overlay_color())?;
	put_text(
		frame,
		&format!("Fish detected: {}", detections.len()),
		Point::new(10, 45),
		overlay_color(),
	)?;
	Ok(())
}
