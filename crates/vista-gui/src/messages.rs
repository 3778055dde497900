use std::path::PathBuf;

use vista_core::config::ViewConfig;
use vista_core::raster::Raster;

/// Results sent back to the UI thread from file dialogs and decoding threads.
pub enum AppMessage {
    ImageLoaded { path: PathBuf, raster: Raster },
    ConfigImported { config: ViewConfig },
    Saved { path: PathBuf },
    Error { message: String },
}
