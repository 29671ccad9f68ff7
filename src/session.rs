//! Session: one editor bound to one campaign.
//!
//! Wraps an [`EngineCore`] and adds the operations that leave the process:
//! decoding uploads off the async runtime, writing the exported PNG, and
//! talking to the campaign server. Each async operation has an explicit
//! in-flight sub-state (decoding, saving) from which [`Session::controls`]
//! derives which UI controls are enabled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::consts::EXPORT_FILE_NAME;
use canvas::engine::{Action, EngineCore};
use canvas::error::CanvasError;
use canvas::photo::Photo;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::services::campaign::{ApiError, CampaignApi};

/// Errors produced by session operations that do not recover locally.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("writing export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a save attempt, reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The server stored the image; the host should navigate here.
    Succeeded { redirect_url: String },
    /// Nothing changed; the user may retry.
    Failed { reason: String },
}

/// Which controls the host should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub zoom: bool,
    pub download: bool,
    pub save: bool,
}

/// An export written to disk.
#[derive(Debug)]
pub struct Download {
    pub path: PathBuf,
    /// Detached download-tracking request, when a campaign is known.
    pub tracking: Option<JoinHandle<()>>,
}

/// A save that has been started but not finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub slug: String,
    pub image_data_url: String,
}

pub struct Session {
    core: EngineCore,
    api: Arc<dyn CampaignApi>,
    slug: Option<String>,
    saving: bool,
}

impl Session {
    #[must_use]
    pub fn new(core: EngineCore, api: Arc<dyn CampaignApi>, slug: Option<String>) -> Self {
        Self { core, api, slug, saving: false }
    }

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut EngineCore {
        &mut self.core
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Enablement derived from state: everything needs a photo; nothing is
    /// available while an upload decodes; save is also off while saving.
    #[must_use]
    pub fn controls(&self) -> Controls {
        let ready = self.core.has_photo() && !self.core.is_loading();
        Controls { zoom: ready, download: ready, save: ready && !self.saving && self.slug.is_some() }
    }

    // --- Upload ---

    /// Decode `bytes` on the blocking pool and install the photo.
    ///
    /// A decode failure is reported as [`Action::DecodeFailed`] and leaves
    /// the previous photo in place.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UploadInProgress`] if another decode is pending.
    pub async fn upload(&mut self, bytes: Vec<u8>) -> Result<Vec<Action>, CanvasError> {
        self.core.begin_upload()?;
        info!(bytes = bytes.len(), "decoding upload");
        let result = match tokio::task::spawn_blocking(move || Photo::decode(&bytes)).await {
            Ok(decoded) => decoded,
            Err(e) => Err(CanvasError::Host(format!("decode task failed: {e}"))),
        };
        Ok(self.core.finish_upload(result))
    }

    // --- Download ---

    /// Write the composed PNG into `dir` and fire download tracking.
    ///
    /// Returns `None` without a photo. Tracking runs detached; its failure
    /// is logged and never affects the download.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if encoding or writing the file fails.
    pub async fn download(&self, dir: &Path) -> Result<Option<Download>, SessionError> {
        let Some(png) = self.core.export_png()? else {
            return Ok(None);
        };
        let path = dir.join(EXPORT_FILE_NAME);
        tokio::fs::write(&path, &png).await?;
        info!(path = %path.display(), bytes = png.len(), "export written");

        let tracking = self.slug.clone().map(|slug| {
            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                if let Err(e) = api.track_download(&slug).await {
                    error!(%slug, error = %e, "download tracking failed");
                }
            })
        });
        Ok(Some(Download { path, tracking }))
    }

    // --- Save ---

    /// Start a save: snapshot the surface as a data URL and enter the
    /// saving sub-state.
    ///
    /// Returns `None` when there is nothing to save, no campaign is known,
    /// a save is already in flight, or encoding fails.
    pub fn begin_save(&mut self) -> Option<PendingSave> {
        if self.saving {
            return None;
        }
        let slug = self.slug.clone()?;
        let image_data_url = match self.core.export_data_url() {
            Ok(url) => url?,
            Err(e) => {
                warn!(error = %e, "export for save failed");
                return None;
            }
        };
        self.saving = true;
        Some(PendingSave { slug, image_data_url })
    }

    /// Leave the saving sub-state and translate the server result.
    pub fn finish_save(&mut self, result: Result<String, ApiError>) -> SaveOutcome {
        self.saving = false;
        match result {
            Ok(redirect_url) => {
                info!(%redirect_url, "save succeeded");
                SaveOutcome::Succeeded { redirect_url }
            }
            Err(e) => {
                warn!(error = %e, retryable = e.retryable(), "save failed");
                SaveOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    /// Persist the composed image. `None` when nothing could be saved.
    ///
    /// A failure leaves the transform untouched and save enabled again.
    pub async fn save(&mut self) -> Option<SaveOutcome> {
        let pending = self.begin_save()?;
        let result = self.api.save_result(&pending.slug, &pending.image_data_url).await;
        Some(self.finish_save(result))
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
