use std::path::PathBuf;

use crate::core::FileFilter;

/// Modal interactions the shell needs from the desktop.
pub trait Dialogs {
    fn pick_video(&self, filters: &[FileFilter]) -> Option<PathBuf>;
    fn pick_output(&self, filters: &[FileFilter], default_name: &str) -> Option<PathBuf>;
    fn show_error(&self, title: &str, message: &str);
    fn show_info(&self, title: &str, message: &str);
}

/// Native OS dialogs through `rfd`. All calls block the UI thread until dismissed.
pub struct NativeDialogs;

impl NativeDialogs {
    fn file_dialog(title: &str, filters: &[FileFilter]) -> rfd::FileDialog {
        filters.iter().fold(rfd::FileDialog::new().set_title(title), |dialog, filter| {
            let extensions: Vec<&str> = filter.extensions.iter().map(String::as_str).collect();
            dialog.add_filter(filter.name.as_str(), &extensions)
        })
    }

    fn message(level: rfd::MessageLevel, title: &str, message: &str) {
        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

impl Dialogs for NativeDialogs {
    fn pick_video(&self, filters: &[FileFilter]) -> Option<PathBuf> {
        Self::file_dialog("select video", filters).pick_file()
    }

    fn pick_output(&self, filters: &[FileFilter], default_name: &str) -> Option<PathBuf> {
        Self::file_dialog("export gif", filters)
            .set_file_name(default_name)
            .save_file()
    }

    fn show_error(&self, title: &str, message: &str) {
        Self::message(rfd::MessageLevel::Error, title, message);
    }

    fn show_info(&self, title: &str, message: &str) {
        Self::message(rfd::MessageLevel::Info, title, message);
    }
}
