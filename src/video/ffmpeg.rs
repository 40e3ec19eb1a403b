use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::core::AppConfig;

/// Locations of the external ffmpeg executables and the commands built from them.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTools {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone())
    }

    /// JSON description of the first video stream.
    pub fn probe_command(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_streams")
            .arg("-select_streams").arg("v:0")
            .arg(input);
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Every frame of the first video stream as packed rgb24 on stdout.
    pub fn raw_stream_command(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg("-v").arg("error")
            // ffprobe reports coded dimensions, so keep frames unrotated to match them
            .arg("-noautorotate")
            .arg("-i").arg(input)
            .arg("-map").arg("0:v:0")
            .arg("-an")
            .arg("-vsync").arg("0")
            .arg("-f").arg("rawvideo")
            .arg("-pix_fmt").arg("rgb24")
            .arg("-");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }
}
