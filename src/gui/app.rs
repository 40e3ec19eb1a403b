use eframe::egui;
use crate::core::{AppConfig, ExportError, FrameSequence};
use crate::gui::dialogs::{Dialogs, NativeDialogs};
use crate::video::{render_frame, ExportJob, ExportOutcome, FfmpegTools, PreviewLoop, VideoDecoder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// How an export request ended on the UI thread.
#[derive(Debug)]
pub enum ExportRequest {
    /// Bad input, nothing loaded or already busy; an error dialog was shown
    Rejected(ExportError),
    /// User closed the output dialog without choosing a path
    Cancelled,
    /// Worker started writing to this path
    Started(PathBuf),
}

pub struct GifMakerApp {
    pub config: AppConfig,
    pub decoder: VideoDecoder,
    pub video_path: Option<PathBuf>,
    pub frames: Arc<FrameSequence>,
    pub preview: Option<PreviewLoop>,
    pub preview_texture: Option<egui::TextureHandle>,
    pub fps_text: String,
    pub scale_text: String,
    /// Present while an export is in flight; doubles as the busy flag
    pub export_job: Option<ExportJob>,
    pub status_message: String,
}

impl GifMakerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Ok(Self::with_config(AppConfig::default()))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let decoder = VideoDecoder::new(FfmpegTools::from_config(&config));
        Self {
            fps_text: config.default_fps_text.clone(),
            scale_text: config.default_scale_text.clone(),
            config,
            decoder,
            video_path: None,
            frames: Arc::new(FrameSequence::empty()),
            preview: None,
            preview_texture: None,
            export_job: None,
            status_message: String::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.export_job.is_some()
    }

    pub fn select_video(&mut self, dialogs: &dyn Dialogs) {
        if let Some(path) = dialogs.pick_video(&self.config.video_filters) {
            self.load_video(path);
        }
    }

    /// Decodes the whole video on the calling (UI) thread, then restarts the preview.
    ///
    /// The window is unresponsive until decoding finishes; long videos take a while.
    pub fn load_video(&mut self, path: PathBuf) {
        log::info!("Loading video {}", path.display());
        let started = Instant::now();
        let frames = self.decoder.decode_frames(&path);
        log::info!(
            "Decoded {} frames from {} in {:.2?}",
            frames.len(), path.display(), started.elapsed()
        );

        self.status_message = match frames.dimensions() {
            Some((width, height)) => format!(
                "Loaded {} frames ({}x{}) from {}",
                frames.len(), width, height, display_name(&path)
            ),
            None => format!("No frames could be read from {}", display_name(&path)),
        };
        self.video_path = Some(path);
        self.install_frames(frames);
    }

    /// Replaces the frame store wholesale and restarts the preview from frame 0.
    pub fn install_frames(&mut self, frames: FrameSequence) {
        self.frames = Arc::new(frames);
        self.preview_texture = None;
        self.preview = PreviewLoop::start(self.frames.clone(), self.config.preview_period, Instant::now());
    }

    /// Validates the fields, asks for an output path and starts the export worker.
    ///
    /// `on_done` runs on the worker after its result is queued, so the UI can wake up.
    pub fn request_export<F>(&mut self, dialogs: &dyn Dialogs, on_done: F) -> ExportRequest
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_busy() {
            return self.reject_export(dialogs, ExportError::AlreadyRunning);
        }

        let params = match crate::video::validate(&self.fps_text, &self.scale_text, &self.frames) {
            Ok(params) => params,
            Err(e) => return self.reject_export(dialogs, e),
        };

        let Some(output) = dialogs.pick_output(&self.config.output_filters, "output.gif") else {
            log::debug!("Export cancelled at output path selection");
            return ExportRequest::Cancelled;
        };
        let output = self.config.with_default_extension(output);

        self.status_message = format!("Exporting to {}...", display_name(&output));
        self.export_job = Some(ExportJob::spawn(self.frames.clone(), params, output.clone(), on_done));
        ExportRequest::Started(output)
    }

    /// Picks up a finished export, clears the busy state and tells the user how it went.
    pub fn poll_export(&mut self, dialogs: &dyn Dialogs) -> Option<ExportOutcome> {
        let outcome = self.export_job.as_mut()?.try_finish()?;
        self.export_job = None;

        match &outcome {
            Ok(summary) => {
                self.status_message = format!(
                    "Exported {} frames to {}",
                    summary.frame_count, display_name(&summary.path)
                );
                dialogs.show_info("success", "gif successfully exported!");
            }
            Err(e) => {
                self.status_message = format!("Export failed: {}", e);
                dialogs.show_error(e.title(), &e.to_string());
            }
        }

        Some(outcome)
    }

    fn reject_export(&self, dialogs: &dyn Dialogs, error: ExportError) -> ExportRequest {
        log::warn!("Export rejected: {}", error);
        dialogs.show_error(error.title(), &error.to_string());
        ExportRequest::Rejected(error)
    }

    fn advance_preview(&mut self, ctx: &egui::Context) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };

        let now = Instant::now();
        if let Some(index) = preview.poll(now) {
            if let Some(frame) = preview.frames().get(index) {
                let image = render_frame(frame, self.config.preview_display_size);
                match &mut self.preview_texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.preview_texture = Some(ctx.load_texture(
                            "video_preview",
                            image,
                            egui::TextureOptions::LINEAR,
                        ));
                    }
                }
            }
        }

        ctx.request_repaint_after(preview.time_until_next_tick(now));
    }

    fn show_preview_surface(&self, ui: &mut egui::Ui) {
        let [width, height] = self.config.preview_display_size;
        let size = egui::vec2(width as f32, height as f32);

        match &self.preview_texture {
            Some(texture) => {
                ui.image((texture.id(), size));
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.painter().rect_filled(rect, 0.0, egui::Color32::from_rgb(0xee, 0xee, 0xee));
            }
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        let dialogs = NativeDialogs;

        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            if ui.button("select video").clicked() {
                self.select_video(&dialogs);
            }

            ui.add_space(10.0);
            ui.label("video preview");
            ui.add_space(10.0);
            self.show_preview_surface(ui);
            ui.add_space(10.0);

            ui.label("speed (fps)");
            ui.add(egui::TextEdit::singleline(&mut self.fps_text).desired_width(150.0));
            ui.label("scale (e.g., 1.0 = 100%)");
            ui.add(egui::TextEdit::singleline(&mut self.scale_text).desired_width(150.0));

            ui.add_space(10.0);
            let busy = self.is_busy();
            if ui.add_enabled(!busy, egui::Button::new("export gif")).clicked() {
                let ctx = ui.ctx().clone();
                match self.request_export(&dialogs, move || ctx.request_repaint()) {
                    ExportRequest::Started(output) => log::debug!("Export worker writing {}", output.display()),
                    ExportRequest::Rejected(e) => log::debug!("Export request not started: {}", e),
                    ExportRequest::Cancelled => {}
                }
            }

            ui.add_space(20.0);
            if let Some(job) = &self.export_job {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label(format!("exporting {}...", display_name(job.output())));
                });
            }
        });
    }
}

impl eframe::App for GifMakerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_export(&NativeDialogs);
        self.advance_preview(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Status:");
                if self.status_message.is_empty() {
                    ui.label("Ready");
                } else {
                    ui.label(&self.status_message);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some((width, height)) = self.frames.dimensions() {
                        ui.label(format!("{} frames @ {}x{}", self.frames.len(), width, height));
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_controls(ui);
        });
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
