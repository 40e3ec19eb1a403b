#[cfg(test)]
mod tests {

    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::thread;
    use std::time::Duration;
    use image::RgbImage;
    use crate::core::{AppConfig, ExportError, FileFilter, FrameSequence};
    use crate::gui::app::{ExportRequest, GifMakerApp};
    use crate::gui::dialogs::Dialogs;
    use crate::video::ExportOutcome;

    /// Scripted answers for the pickers, and a log of every message box shown.
    #[derive(Default)]
    struct RecordingDialogs {
        video: Option<PathBuf>,
        output: Option<PathBuf>,
        output_prompts: RefCell<usize>,
        errors: RefCell<Vec<(String, String)>>,
        infos: RefCell<Vec<(String, String)>>,
    }

    impl RecordingDialogs {
        fn with_output(output: PathBuf) -> Self {
            Self {
                output: Some(output),
                ..Default::default()
            }
        }

        fn dialogs_shown(&self) -> usize {
            self.errors.borrow().len() + self.infos.borrow().len()
        }
    }

    impl Dialogs for RecordingDialogs {
        fn pick_video(&self, _filters: &[FileFilter]) -> Option<PathBuf> {
            self.video.clone()
        }

        fn pick_output(&self, _filters: &[FileFilter], _default_name: &str) -> Option<PathBuf> {
            *self.output_prompts.borrow_mut() += 1;
            self.output.clone()
        }

        fn show_error(&self, title: &str, message: &str) {
            self.errors.borrow_mut().push((title.to_string(), message.to_string()));
        }

        fn show_info(&self, title: &str, message: &str) {
            self.infos.borrow_mut().push((title.to_string(), message.to_string()));
        }
    }

    fn create_test_app() -> GifMakerApp {
        GifMakerApp::with_config(AppConfig::default())
    }

    fn frames(count: usize, width: u32, height: u32) -> FrameSequence {
        FrameSequence::new(
            (0..count)
                .map(|i| RgbImage::from_pixel(width, height, image::Rgb([(i * 20) as u8, 90, 30])))
                .collect(),
        )
    }

    fn wait_for_export(app: &mut GifMakerApp, dialogs: &RecordingDialogs) -> ExportOutcome {
        for _ in 0..1000 {
            if let Some(outcome) = app.poll_export(dialogs) {
                return outcome;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("export did not finish in time");
    }

    fn assert_invalid_input_rejected(request: ExportRequest, dialogs: &RecordingDialogs) {
        assert!(matches!(request, ExportRequest::Rejected(ExportError::InvalidInput)));
        assert_eq!(
            dialogs.errors.borrow().last().map(|(_, message)| message.as_str()),
            Some("invalid inputs or no video selected.")
        );
        assert_eq!(*dialogs.output_prompts.borrow(), 0);
    }

    #[test]
    fn test_app_initialization() {
        let app = create_test_app();

        assert_eq!(app.fps_text, "10");
        assert_eq!(app.scale_text, "0.5");
        assert!(app.frames.is_empty());
        assert!(app.preview.is_none());
        assert!(app.video_path.is_none());
        assert!(!app.is_busy());
    }

    #[test]
    fn test_installing_frames_starts_preview_at_first_frame() {
        let mut app = create_test_app();
        app.install_frames(frames(4, 16, 12));

        let preview = app.preview.as_ref().expect("preview should be running");
        assert_eq!(preview.cursor(), 0);
        assert_eq!(preview.frames().len(), 4);
    }

    #[test]
    fn test_new_video_replaces_running_preview() {
        let mut app = create_test_app();
        app.install_frames(frames(4, 16, 12));
        let now = std::time::Instant::now();
        if let Some(preview) = app.preview.as_mut() {
            preview.poll(now);
            preview.poll(now + Duration::from_millis(100));
        }
        assert_eq!(app.preview.as_ref().map(|p| p.cursor()), Some(2));

        app.install_frames(frames(2, 8, 8));
        let preview = app.preview.as_ref().unwrap();
        assert_eq!(preview.cursor(), 0);
        assert_eq!(preview.frames().len(), 2);
    }

    #[test]
    fn test_empty_video_stops_preview() {
        let mut app = create_test_app();
        app.install_frames(frames(3, 8, 8));
        assert!(app.preview.is_some());

        app.install_frames(FrameSequence::empty());
        assert!(app.preview.is_none());
        assert!(app.frames.is_empty());
    }

    #[test]
    fn test_cancelled_video_selection_keeps_state() {
        let mut app = create_test_app();
        app.install_frames(frames(3, 8, 8));

        app.select_video(&RecordingDialogs::default());
        assert_eq!(app.frames.len(), 3);
        assert!(app.video_path.is_none());
    }

    #[test]
    fn test_unreadable_video_leaves_empty_sequence_and_export_rejected() {
        let mut app = create_test_app();
        app.install_frames(frames(3, 8, 8));

        let dialogs = RecordingDialogs {
            video: Some(PathBuf::from("/nonexistent/clip.mp4")),
            ..Default::default()
        };
        app.select_video(&dialogs);

        assert_eq!(app.video_path.as_deref(), Some(Path::new("/nonexistent/clip.mp4")));
        assert!(app.frames.is_empty());
        assert!(app.preview.is_none());
        assert!(app.status_message.contains("No frames"));

        let request = app.request_export(&dialogs, || {});
        assert_invalid_input_rejected(request, &dialogs);
    }

    #[test]
    fn test_export_without_video_is_rejected() {
        let mut app = create_test_app();
        let dir = tempfile::tempdir().unwrap();
        let dialogs = RecordingDialogs::with_output(dir.path().join("out.gif"));

        let request = app.request_export(&dialogs, || {});
        assert_invalid_input_rejected(request, &dialogs);
        assert!(!dir.path().join("out.gif").exists());
    }

    #[test]
    fn test_invalid_fields_are_rejected_without_writing() {
        let cases = [
            ("0", "0.5"),
            ("-3", "0.5"),
            ("fast", "0.5"),
            ("10", "0"),
            ("10", "-1.5"),
        ];

        for (fps, scale) in cases {
            let mut app = create_test_app();
            app.install_frames(frames(2, 8, 8));
            app.fps_text = fps.to_string();
            app.scale_text = scale.to_string();

            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("out.gif");
            let dialogs = RecordingDialogs::with_output(output.clone());

            let request = app.request_export(&dialogs, || {});
            assert_invalid_input_rejected(request, &dialogs);
            assert!(!output.exists(), "fps {:?} scale {:?} wrote a file", fps, scale);
            assert!(!app.is_busy());
            // Fields keep whatever the user typed
            assert_eq!(app.fps_text, fps);
        }
    }

    #[test]
    fn test_cancelled_output_dialog_is_silent() {
        let mut app = create_test_app();
        app.install_frames(frames(2, 8, 8));
        let dialogs = RecordingDialogs::default();

        let request = app.request_export(&dialogs, || {});
        assert!(matches!(request, ExportRequest::Cancelled));
        assert_eq!(*dialogs.output_prompts.borrow(), 1);
        assert_eq!(dialogs.dialogs_shown(), 0);
        assert!(!app.is_busy());
    }

    #[test]
    fn test_successful_export_notifies_once_written() {
        let mut app = create_test_app();
        app.install_frames(frames(3, 40, 20));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clip.gif");
        let dialogs = RecordingDialogs::with_output(output.clone());

        let request = app.request_export(&dialogs, || {});
        assert!(matches!(request, ExportRequest::Started(ref path) if path == &output));
        assert!(app.is_busy());

        let summary = wait_for_export(&mut app, &dialogs).expect("export should succeed");
        assert!(!app.is_busy());
        assert!(output.exists());
        assert_eq!(summary.frame_count, 3);
        assert_eq!((summary.width, summary.height), (20, 10));
        assert_eq!(summary.delay_ms, 100);
        assert_eq!(
            dialogs.infos.borrow().as_slice(),
            &[("success".to_string(), "gif successfully exported!".to_string())]
        );
        assert!(dialogs.errors.borrow().is_empty());
    }

    #[test]
    fn test_output_without_extension_gets_gif() {
        let mut app = create_test_app();
        app.install_frames(frames(1, 8, 8));
        let dir = tempfile::tempdir().unwrap();
        let dialogs = RecordingDialogs::with_output(dir.path().join("clip"));

        let request = app.request_export(&dialogs, || {});
        assert!(matches!(request, ExportRequest::Started(ref path) if path == &dir.path().join("clip.gif")));

        wait_for_export(&mut app, &dialogs).unwrap();
        assert!(dir.path().join("clip.gif").exists());
    }

    #[test]
    fn test_second_export_rejected_while_busy() {
        let mut app = create_test_app();
        app.install_frames(frames(2, 8, 8));
        let dir = tempfile::tempdir().unwrap();
        let dialogs = RecordingDialogs::with_output(dir.path().join("first.gif"));

        assert!(matches!(app.request_export(&dialogs, || {}), ExportRequest::Started(_)));
        // Busy until the UI thread has consumed the result, however fast the worker is
        let second = app.request_export(&dialogs, || {});
        assert!(matches!(second, ExportRequest::Rejected(ExportError::AlreadyRunning)));
        assert_eq!(*dialogs.output_prompts.borrow(), 1);

        wait_for_export(&mut app, &dialogs).unwrap();
        assert!(matches!(app.request_export(&dialogs, || {}), ExportRequest::Started(_)));
        wait_for_export(&mut app, &dialogs).unwrap();
    }

    #[test]
    fn test_failed_export_is_reported_and_clears_busy() {
        let mut app = create_test_app();
        app.install_frames(frames(2, 8, 8));
        let dir = tempfile::tempdir().unwrap();
        let dialogs = RecordingDialogs::with_output(dir.path().join("missing").join("out.gif"));

        assert!(matches!(app.request_export(&dialogs, || {}), ExportRequest::Started(_)));
        let outcome = wait_for_export(&mut app, &dialogs);

        assert!(matches!(outcome, Err(ExportError::Io { .. })));
        assert!(!app.is_busy());
        assert_eq!(dialogs.errors.borrow().len(), 1);
        assert_eq!(dialogs.errors.borrow()[0].0, "export failed");
        assert!(dialogs.infos.borrow().is_empty());
        assert!(app.status_message.starts_with("Export failed"));
    }
}
