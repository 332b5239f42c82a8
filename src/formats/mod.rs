// File formats: key map sidecars and capture files
pub mod capture;
pub mod keymap;
pub mod metadata;

pub use capture::{load_capture, save_capture, CaptureError};
pub use keymap::{KeyMap, KeyMapError};
pub use metadata::CaptureMetadata;
