//! Process-wide model.
//!
//! The model is installed exactly once (at startup or on first use) and is
//! read-only afterwards, so every request shares the same `Arc` without
//! locking.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::inference::Model;
use crate::error::{Error, Result};

static MODEL: OnceCell<Arc<Model>> = OnceCell::new();

/// Install an already-built model. Fails if one is installed.
pub fn install(model: Model) -> Result<Arc<Model>> {
    let model = Arc::new(model);
    MODEL
        .set(Arc::clone(&model))
        .map_err(|_| Error::ModelAlreadyLoaded)?;
    log::info!("Global model installed: {}", model.name());
    Ok(model)
}

/// Load from disk and install. A load failure leaves nothing installed.
pub fn load_global(path: impl AsRef<Path>, expected_checksum: Option<&str>) -> Result<Arc<Model>> {
    if MODEL.get().is_some() {
        return Err(Error::ModelAlreadyLoaded);
    }
    let model = Model::load_verified(path, expected_checksum)?;
    install(model)
}

/// Load from disk on first call; later calls return the installed model.
pub fn get_or_load(path: impl AsRef<Path>, expected_checksum: Option<&str>) -> Result<Arc<Model>> {
    MODEL
        .get_or_try_init(|| Model::load_verified(path, expected_checksum).map(Arc::new))
        .map(Arc::clone)
        .map_err(Error::from)
}

/// The installed model.
pub fn global() -> Result<Arc<Model>> {
    MODEL.get().cloned().ok_or(Error::ModelNotLoaded)
}

pub fn is_loaded() -> bool {
    MODEL.get().is_some()
}
