use color_eyre::eyre::{Result, WrapErr};
use opencv::{core::Mat, highgui};

pub const FRAME_WINDOW: &str = "Fish Tracking";
pub const MASK_WINDOW: &str = "Foreground Mask";
/// How long each preview frame waits for a key press, in milliseconds.
const KEY_DELAY: i32 = 30;

/// Live preview windows for `--debug`. Closed again on drop.
pub struct Preview {
	_private: (),
}

impl Preview {
	pub fn new() -> Self {
		Self { _private: () }
	}

	/// Shows the annotated frame and its mask. Returns true when the user
	/// asked to stop.
	pub fn show(&mut self, frame: &Mat, mask: &Mat) -> Result<bool> {
		highgui::imshow(FRAME_WINDOW, frame).wrap_err("failed to show annotated frame")?;
		highgui::imshow(MASK_WINDOW, mask).wrap_err("failed to show foreground mask")?;
		let key = highgui::wait_key(KEY_DELAY).wrap_err("failed to poll for key press")?;
		Ok(is_stop_key(key))
	}
}

impl Default for Preview {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Preview {
	fn drop(&mut self) {
		let _ = highgui::destroy_all_windows();
	}
}

fn is_stop_key(key: i32) -> bool {
	matches!((key & 0xFF) as u8, b'q' | b'Q')
}
