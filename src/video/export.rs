use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, DynamicImage, Frame, RgbImage};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::core::{ExportError, FrameSequence};

/// Largest width or height a GIF logical screen can describe
pub const GIF_MAX_DIMENSION: u32 = u16::MAX as u32;

/// Quantizer speed handed to the GIF encoder (1 = best, 30 = fastest)
const GIF_QUANTIZER_SPEED: i32 = 10;

/// Validated frame rate and scale factor for one export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportParams {
    pub fps: u32,
    pub scale: f64,
}

impl ExportParams {
    /// Parses the raw text of the frame-rate and scale fields.
    pub fn parse(fps_text: &str, scale_text: &str) -> Result<Self, ExportError> {
        let fps = fps_text.trim()
            .parse::<i64>()
            .ok()
            .filter(|fps| *fps > 0)
            .and_then(|fps| u32::try_from(fps).ok())
            .ok_or(ExportError::InvalidInput)?;

        let scale = scale_text.trim()
            .parse::<f64>()
            .ok()
            .filter(|scale| scale.is_finite() && *scale > 0.0)
            .ok_or(ExportError::InvalidInput)?;

        Ok(Self { fps, scale })
    }

    /// Display time of each output frame, truncated to whole milliseconds.
    pub fn frame_delay_ms(&self) -> u32 {
        1000 / self.fps
    }
}

/// Checks the field text and that something is loaded, before any file I/O.
pub fn validate(fps_text: &str, scale_text: &str, frames: &FrameSequence) -> Result<ExportParams, ExportError> {
    let params = ExportParams::parse(fps_text, scale_text)?;
    if frames.is_empty() {
        return Err(ExportError::InvalidInput);
    }
    Ok(params)
}

/// `round(dimension * scale)` for both axes, never below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_axis = |value: u32| (value as f64 * scale).round().max(1.0) as u32;
    (scale_axis(width), scale_axis(height))
}

/// Scaled dimensions, rejected before any pixel buffer is allocated if a GIF can't hold them.
pub fn checked_dimensions(width: u32, height: u32, scale: f64) -> Result<(u32, u32), ExportError> {
    let (width, height) = scaled_dimensions(width, height, scale);
    if width > GIF_MAX_DIMENSION || height > GIF_MAX_DIMENSION {
        return Err(ExportError::TooLarge { width, height });
    }
    Ok((width, height))
}

pub fn resize_frame(frame: &RgbImage, scale: f64) -> Result<RgbImage, ExportError> {
    let (width, height) = checked_dimensions(frame.width(), frame.height(), scale)?;
    Ok(imageops::resize(frame, width, height, FilterType::Lanczos3))
}

/// What a finished export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
    pub delay_ms: u32,
}

pub type ExportOutcome = Result<ExportSummary, ExportError>;

/// Resizes every frame and writes them as one infinitely looping GIF at `path`,
/// replacing any existing file.
pub fn write_gif(path: &Path, frames: &FrameSequence, params: ExportParams) -> ExportOutcome {
    let (width, height) = frames.dimensions().ok_or(ExportError::InvalidInput)?;
    let (width, height) = checked_dimensions(width, height, params.scale)?;
    let delay_ms = params.frame_delay_ms();

    log::debug!(
        "Encoding {} frames at {}x{} with {} ms delay",
        frames.len(), width, height, delay_ms
    );

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_QUANTIZER_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        for frame in frames.iter() {
            let rgba = DynamicImage::ImageRgb8(resize_frame(frame, params.scale)?).into_rgba8();
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        }
    }

    std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ExportSummary {
        path: path.to_path_buf(),
        frame_count: frames.len(),
        width,
        height,
        delay_ms,
    })
}

/// One export running on its own worker thread.
///
/// The worker always reports exactly one [`ExportOutcome`], including when it panics.
pub struct ExportJob {
    receiver: mpsc::UnboundedReceiver<ExportOutcome>,
    output: PathBuf,
    started: Instant,
}

impl ExportJob {
    /// Starts the worker; `on_done` runs on the worker after the outcome is sent.
    pub fn spawn<F>(frames: Arc<FrameSequence>, params: ExportParams, output: PathBuf, on_done: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker_output = output.clone();

        log::info!(
            "Exporting {} frames to {} (fps {}, scale {})",
            frames.len(), output.display(), params.fps, params.scale
        );

        thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                write_gif(&worker_output, &frames, params)
            }))
            .unwrap_or_else(|payload| Err(ExportError::WorkerFailed(panic_message(payload.as_ref()))));

            if let Err(e) = sender.send(outcome) {
                log::error!("Failed to send export result: {}", e);
            }
            on_done();
        });

        Self {
            receiver,
            output,
            started: Instant::now(),
        }
    }

    /// The outcome, once the worker has finished. Never blocks.
    pub fn try_finish(&mut self) -> Option<ExportOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => {
                self.log_outcome(&outcome);
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Self::vanished())),
        }
    }

    /// Blocks until the worker reports.
    #[cfg(test)]
    pub fn wait(mut self) -> ExportOutcome {
        let outcome = self.receiver.blocking_recv().unwrap_or_else(|| Err(Self::vanished()));
        self.log_outcome(&outcome);
        outcome
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn log_outcome(&self, outcome: &ExportOutcome) {
        match outcome {
            Ok(summary) => log::info!(
                "Exported {} frames ({}x{}, {} ms each) to {} in {:.2?}",
                summary.frame_count, summary.width, summary.height, summary.delay_ms,
                summary.path.display(), self.started.elapsed()
            ),
            Err(e) => log::error!("Export to {} failed: {}", self.output.display(), e),
        }
    }

    fn vanished() -> ExportError {
        ExportError::WorkerFailed("worker exited without reporting a result".to_string())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
