use color_eyre::eyre::{bail, ContextCompat, Report, Result, WrapErr};
use opencv::{
	core::Size,
	prelude::*,
	videoio::VideoWriter,
};
use std::{fmt, path::Path, str::FromStr};
use tracing::info;

/// Four-character codec code handed to the video writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fourcc([char; 4]);

impl Fourcc {
	pub const MJPG: Self = Self(['M', 'J', 'P', 'G']);
	pub const MP4V: Self = Self(['m', 'p', '4', 'v']);

	/// Picks a codec the container at `path` can hold.
	pub fn for_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("avi") => Self::MJPG,
			_ => Self::MP4V,
		}
	}

	pub fn code(self) -> Result<i32> {
		let [a, b, c, d] = self.0;
		VideoWriter::fourcc(a, b, c, d).wrap_err_with(|| format!("invalid fourcc '{self}'"))
	}
}

impl FromStr for Fourcc {
	type Err = Report;

	fn from_str(arg: &str) -> Result<Self> {
		let chars = arg.chars().collect::<Vec<_>>();
		let code: [char; 4] = chars
			.try_into()
			.ok()
			.context("fourcc should be exactly four characters")?;
		if !code.iter().all(|c| c.is_ascii_graphic() || *c == ' ') {
			bail!("fourcc '{arg}' should only contain printable ascii");
		}
		Ok(Self(code))
	}
}

impl fmt::Display for Fourcc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.iter().try_for_each(|c| write!(f, "{c}"))
	}
}

/// Opens a colour video writer, failing if OpenCV can't encode to `output`.
pub fn open_writer<Output>(output: Output, fourcc: Fourcc, fps: f64, size: Size) -> Result<VideoWriter>
where
	Output: AsRef<Path>,
{
	open_writer_impl(output.as_ref(), fourcc, fps, size)
}

fn open_writer_impl(output: &Path, fourcc: Fourcc, fps: f64, size: Size) -> Result<VideoWriter> {
	let path = output
		.to_str()
		.wrap_err("invalid output path cannot be represented as a str")?;
	let writer = VideoWriter::new(path, fourcc.code()?, fps, size, true)
		.wrap_err_with(|| format!("failed to open output file at {}", output.display()))?;
	if !writer
		.is_opened()
		.wrap_err("failed to query video writer state")?
	{
		bail!(
			"failed to open output file at {} with codec {fourcc}",
			output.display()
		);
	}
	info!(
		output = %output.display(),
		%fourcc,
		fps,
		width = size.width,
		height = size.height,
		"opened output video"
	);
	Ok(writer)
}
