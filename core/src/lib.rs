pub mod annotate;
pub mod detect;
pub mod frame;
pub mod mask;
pub mod preview;
pub mod source;
pub mod track;
pub mod video;

#[cfg(test)]
mod synthetic;

pub use opencv;
