//! Generated pond footage for tests.

use opencv::{
	core::{Mat, Rect, Scalar, CV_8UC3},
	imgproc,
};

pub const WIDTH: i32 = 320;
pub const HEIGHT: i32 = 240;
/// Frames after which a static scene no longer shows up as foreground.
pub const SETTLE_FRAMES: usize = 5;
/// Static frames fed before anything moves.
pub const WARMUP_FRAMES: usize = 100;
pub const MOVING_FRAMES: usize = 16;

/// Gray water with a couple of static rocks, optionally with a white fish.
pub fn scene(fish: Option<Rect>) -> Mat {
	let mut frame =
		Mat::new_rows_cols_with_default(HEIGHT, WIDTH, CV_8UC3, Scalar::new(60.0, 70.0, 50.0, 0.0))
			.unwrap();
	for (rock, shade) in [
		(Rect::new(20, 10, 60, 40), 20.0),
		(Rect::new(200, 190, 90, 35), 120.0),
	] {
		imgproc::rectangle(
			&mut frame,
			rock,
			Scalar::all(shade),
			imgproc::FILLED,
			imgproc::LINE_8,
			0,
		)
		.unwrap();
	}
	if let Some(fish) = fish {
		imgproc::rectangle(
			&mut frame,
			fish,
			Scalar::all(255.0),
			imgproc::FILLED,
			imgproc::LINE_8,
			0,
		)
		.unwrap();
	}
	frame
}

/// Where the fish is after `step` moving frames, swimming right 10px a frame.
pub fn block_at(step: usize) -> Rect {
	Rect::new(10 + step as i32 * 10, 100, 40, 40)
}
