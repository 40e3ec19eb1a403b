use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::ColorImage;
use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::core::FrameSequence;

/// Cyclic preview of a loaded [`FrameSequence`] at a fixed UI cadence.
///
/// The loop is tied to the sequence it was started with. The shell drops it
/// and starts a new one whenever another video is installed, which is the only
/// way it stops short of the process exiting.
pub struct PreviewLoop {
    frames: Arc<FrameSequence>,
    cursor: usize,
    period: Duration,
    next_tick: Instant,
}

impl PreviewLoop {
    /// Starts a loop over `frames`, or returns `None` when there is nothing to show.
    pub fn start(frames: Arc<FrameSequence>, period: Duration, now: Instant) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }

        log::debug!("Starting preview loop over {} frames every {:?}", frames.len(), period);
        Some(Self {
            frames,
            cursor: 0,
            period,
            next_tick: now,
        })
    }

    /// Index of the frame to display if a tick is due, advancing the cursor with wraparound.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        if now < self.next_tick {
            return None;
        }

        let shown = self.cursor;
        self.cursor = (self.cursor + 1) % self.frames.len();

        self.next_tick += self.period;
        if self.next_tick <= now {
            // Fell behind (window hidden, slow frame); don't replay missed ticks
            self.next_tick = now + self.period;
        }

        Some(shown)
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }

    /// Index of the frame the next tick will display.
    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn frames(&self) -> &Arc<FrameSequence> {
        &self.frames
    }
}

/// Scales a frame to the fixed preview surface size.
///
/// Runs on the UI thread every tick, so it samples nearest pixels rather than
/// filtering the whole source frame.
pub fn render_frame(frame: &RgbImage, display_size: [u32; 2]) -> ColorImage {
    let [width, height] = display_size;
    let resized = imageops::resize(frame, width, height, FilterType::Nearest);
    ColorImage::from_rgb([width as usize, height as usize], resized.as_raw())
}
