pub mod app;
pub mod dialogs;

#[cfg(test)]
mod app_test;

pub use app::*;
