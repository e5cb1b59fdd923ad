use opencv::{
	core::Mat,
	prelude::*,
	videoio::{VideoCapture, VideoCaptureTrait},
};
use tracing::warn;

pub struct Frame {
	index: usize,
	image: Mat,
}

impl Frame {
	/// 1-based position of the frame in the stream.
	#[inline]
	pub fn index(&self) -> usize {
		self.index
	}

	#[inline]
	pub fn image(&self) -> &Mat {
		&self.image
	}

	#[inline]
	pub fn image_mut(&mut self) -> &mut Mat {
		&mut self.image
	}
}

/// Reads frames off a capture until it runs dry.
///
/// A failed read is end-of-stream, same as a clean one.
pub struct Frames<'a> {
	capture: &'a mut VideoCapture,
	next_index: usize,
}

impl<'a> Frames<'a> {
	pub fn new(capture: &'a mut VideoCapture) -> Self {
		Self {
			capture,
			next_index: 1,
		}
	}
}

impl Iterator for Frames<'_> {
	type Item = Frame;

	fn next(&mut self) -> Option<Frame> {
		let index = self.next_index;
		let mut image = Mat::default();
		match self.capture.read(&mut image) {
			Ok(true) if !image.empty() => {
				self.next_index += 1;
				Some(Frame { index, image })
			}
			Ok(_) => None,
			Err(err) => {
				warn!(frame = index, "failed to read frame, treating as end of stream: {err}");
				None
			}
		}
	}
}
