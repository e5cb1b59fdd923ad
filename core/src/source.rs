use color_eyre::eyre::{bail, ContextCompat, Report, Result, WrapErr};
use opencv::{
	core::Size,
	prelude::*,
	videoio::{
		VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_FRAME_HEIGHT,
		CAP_PROP_FRAME_WIDTH,
	},
};
use std::{fmt, path::PathBuf, str::FromStr};
use tracing::{info, warn};

/// Frame rate used when the capture doesn't report a usable one.
pub const FALLBACK_FPS: u32 = 30;

/// Where frames come from: a webcam index or a video file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
	Camera(i32),
	File(PathBuf),
}

impl FromStr for VideoSource {
	type Err = Report;

	fn from_str(arg: &str) -> Result<Self> {
		if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
			let index = i32::from_str(arg)
				.wrap_err_with(|| format!("camera index '{arg}' is out of range"))?;
			return Ok(Self::Camera(index));
		}
		Ok(Self::File(PathBuf::from(arg)))
	}
}

impl fmt::Display for VideoSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Camera(index) => write!(f, "camera {index}"),
			Self::File(path) => write!(f, "{}", path.display()),
		}
	}
}

impl VideoSource {
	/// Opens the capture, failing if OpenCV can't actually read from it.
	pub fn open(&self) -> Result<VideoCapture> {
		let capture = match self {
			Self::Camera(index) => VideoCapture::new(*index, CAP_ANY),
			Self::File(path) => VideoCapture::from_file(
				path.to_str()
					.wrap_err("invalid input path cannot be represented as a str")?,
				CAP_ANY,
			),
		}
		.wrap_err_with(|| format!("failed to open video source: {self}"))?;
		if !capture
			.is_opened()
			.wrap_err("failed to query video capture state")?
		{
			bail!("failed to open video source: {self}");
		}
		info!(source = %self, "opened video source");
		Ok(capture)
	}
}

/// Geometry and timing of an opened capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
	pub width: i32,
	pub height: i32,
	pub fps: u32,
	/// `None` for live sources, which don't report a length.
	pub frame_count: Option<u64>,
}

impl StreamInfo {
	pub fn probe(capture: &VideoCapture) -> Result<Self> {
		let width = capture
			.get(CAP_PROP_FRAME_WIDTH)
			.wrap_err("failed to get frame width property from video")?;
		let height = capture
			.get(CAP_PROP_FRAME_HEIGHT)
			.wrap_err("failed to get frame height property from video")?;
		let fps = capture
			.get(CAP_PROP_FPS)
			.wrap_err("failed to read fps property from video")?;
		let frame_count = capture
			.get(CAP_PROP_FRAME_COUNT)
			.wrap_err("failed to get frame count property from video")?;

		let info = Self {
			width: width as i32,
			height: height as i32,
			fps: fps_or_fallback(fps),
			frame_count: (frame_count >= 1.0).then(|| frame_count.round() as u64),
		};
		if info.width <= 0 || info.height <= 0 {
			warn!(width = info.width, height = info.height, "capture reports no frame size");
		}
		Ok(info)
	}

	#[inline]
	pub fn size(&self) -> Size {
		Size::new(self.width, self.height)
	}
}

/// Truncates the reported rate to whole frames, using [`FALLBACK_FPS`] when
/// that comes out as zero (or the backend reported garbage).
fn fps_or_fallback(fps: f64) -> u32 {
	if !fps.is_finite() || fps < 1.0 {
		return FALLBACK_FPS;
	}
	fps as u32
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::Path;

	#[test]
	fn digits_select_a_camera() {
		assert_eq!("0".parse::<VideoSource>().unwrap(), VideoSource::Camera(0));
		assert_eq!("12".parse::<VideoSource>().unwrap(), VideoSource::Camera(12));
	}

	#[test]
	fn anything_else_is_a_file() {
		for arg in ["pond.mp4", "-1", "1.5", "./0", "videos/2"] {
			assert_eq!(
				arg.parse::<VideoSource>().unwrap(),
				VideoSource::File(PathBuf::from(arg)),
				"{arg}"
			);
		}
	}

	#[test]
	fn oversized_camera_index_is_rejected() {
		assert!("99999999999".parse::<VideoSource>().is_err());
	}

	#[test]
	fn fps_falls_back_when_missing() {
		assert_eq!(fps_or_fallback(0.0), FALLBACK_FPS);
		assert_eq!(fps_or_fallback(0.5), FALLBACK_FPS);
		assert_eq!(fps_or_fallback(f64::NAN), FALLBACK_FPS);
		assert_eq!(fps_or_fallback(29.97), 29);
		assert_eq!(fps_or_fallback(60.0), 60);
	}

	#[test]
	fn missing_file_fails_to_open() {
		let source = VideoSource::File(Path::new("definitely/not/a/pond.mp4").to_owned());
		let err = source.open().unwrap_err();
		assert!(
			format!("{err:#}").contains("failed to open video source"),
			"{err:#}"
		);
	}
}
