use std::path::PathBuf;
use std::time::Duration;

/// A file-dialog filter: label plus the extensions it matches.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: &str, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn all_files() -> Self {
        Self::new("all files", &["*"])
    }
}

/// Session settings. Lives in memory only; nothing is read from or written to disk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_size: [f32; 2],
    pub window_title: String,
    /// Fixed size of the preview surface, independent of the source resolution
    pub preview_display_size: [u32; 2],
    /// UI refresh cadence of the preview, unrelated to the export frame rate
    pub preview_period: Duration,
    pub default_fps_text: String,
    pub default_scale_text: String,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub video_filters: Vec<FileFilter>,
    pub output_filters: Vec<FileFilter>,
    pub output_extension: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_size: [800.0, 850.0],
            window_title: "gif maker tool".to_string(),
            preview_display_size: [640, 480],
            preview_period: Duration::from_millis(100),
            default_fps_text: "10".to_string(),
            default_scale_text: "0.5".to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            video_filters: vec![FileFilter::new("mp4 files", &["mp4"]), FileFilter::all_files()],
            output_filters: vec![FileFilter::new("gif files", &["gif"]), FileFilter::all_files()],
            output_extension: "gif".to_string(),
        }
    }
}

impl AppConfig {
    /// Appends the output extension when the chosen path has none.
    pub fn with_default_extension(&self, path: PathBuf) -> PathBuf {
        if path.extension().is_some() {
            path
        } else {
            let mut path = path;
            path.set_extension(&self.output_extension);
            path
        }
    }
}
