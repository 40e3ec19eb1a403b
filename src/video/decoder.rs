use std::io::{self, Read};
use std::path::Path;
use std::process::Child;

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use serde::Deserialize;

use crate::core::FrameSequence;
use crate::video::FfmpegTools;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Frames pulled from a raw rgb24 stream.
#[derive(Debug, Default)]
pub struct RawFrameRead {
    pub frames: Vec<RgbImage>,
    /// Stream ended inside a frame or with a read error
    pub truncated: bool,
}

/// Turns a video file into a [`FrameSequence`] through the ffmpeg executables.
pub struct VideoDecoder {
    tools: FfmpegTools,
}

impl VideoDecoder {
    pub fn new(tools: FfmpegTools) -> Self {
        Self { tools }
    }

    /// Decodes every frame of `path`.
    ///
    /// Never fails: an unreadable file, a file without a video stream or missing
    /// ffmpeg executables all give an empty sequence. Frames decoded before a
    /// mid-stream failure are kept.
    pub fn decode_frames(&self, path: &Path) -> FrameSequence {
        match self.try_decode(path) {
            Ok(frames) => frames,
            Err(e) => {
                log::warn!("Could not decode {}: {:#}", path.display(), e);
                FrameSequence::empty()
            }
        }
    }

    fn try_decode(&self, path: &Path) -> Result<FrameSequence> {
        let (width, height) = self.probe_dimensions(path)?;
        log::debug!("Decoding {} at {}x{}", path.display(), width, height);

        let child = self.tools.raw_stream_command(path)
            .spawn()
            .context("failed to start ffmpeg")?;
        let mut stream = StreamGuard::new(child);
        let stdout = stream.stdout()?;

        let read = read_rgb_frames(stdout, width, height);
        let clean_exit = stream.finish(!read.truncated);

        if read.truncated || !clean_exit {
            log::warn!(
                "Video stream of {} ended early, keeping {} decoded frames",
                path.display(),
                read.frames.len()
            );
        }

        Ok(FrameSequence::new(read.frames))
    }

    fn probe_dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        let output = self.tools.probe_command(path)
            .output()
            .context("failed to run ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!("ffprobe exited with {}", output.status));
        }

        parse_probe_dimensions(&output.stdout)
    }
}

/// Width and height of the first video stream in ffprobe's JSON output.
pub fn parse_probe_dimensions(json: &[u8]) -> Result<(u32, u32)> {
    let probe: ProbeOutput = serde_json::from_slice(json).context("malformed ffprobe output")?;

    let stream = probe.streams.iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| anyhow!("no video stream found"))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok((width, height)),
        _ => Err(anyhow!("video stream has no usable dimensions")),
    }
}

/// Splits packed rgb24 data into `width`x`height` frames until the reader is exhausted.
///
/// A trailing partial frame is dropped and flagged as truncation.
pub fn read_rgb_frames<R: Read>(mut reader: R, width: u32, height: u32) -> RawFrameRead {
    let frame_size = width as usize * height as usize * 3;
    let mut read = RawFrameRead::default();
    if frame_size == 0 {
        return read;
    }

    loop {
        let mut buffer = vec![0u8; frame_size];
        match fill_buffer(&mut reader, &mut buffer) {
            Ok(0) => break,
            Ok(filled) if filled == frame_size => {
                // Buffer length always matches the frame size, so this cannot fail
                if let Some(frame) = RgbImage::from_raw(width, height, buffer) {
                    read.frames.push(frame);
                }
            }
            Ok(filled) => {
                log::debug!("Discarding partial frame ({} of {} bytes)", filled, frame_size);
                read.truncated = true;
                break;
            }
            Err(e) => {
                log::debug!("Frame stream read failed: {}", e);
                read.truncated = true;
                break;
            }
        }
    }

    read
}

fn fill_buffer<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Owns the ffmpeg child for the duration of one decode and always reaps it.
struct StreamGuard {
    child: Option<Child>,
}

impl StreamGuard {
    fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    fn stdout(&mut self) -> Result<std::process::ChildStdout> {
        self.child.as_mut()
            .and_then(|child| child.stdout.take())
            .ok_or_else(|| anyhow!("ffmpeg stdout was not captured"))
    }

    /// Waits for the process; kills it first unless the stream was read to the end.
    /// Returns whether ffmpeg exited successfully.
    fn finish(&mut self, drained: bool) -> bool {
        let Some(mut child) = self.child.take() else {
            return false;
        };
        if !drained {
            let _ = child.kill();
        }
        match child.wait() {
            Ok(status) => status.success(),
            Err(e) => {
                log::error!("Failed to wait for ffmpeg: {}", e);
                false
            }
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.finish(false);
    }
}
