//! Object-URL previews for the answer-image upload widget.
//!
//! Each selected file gets a [`PreviewUrl`] from a [`PreviewRegistry`]. The
//! URL is revoked exactly once: when the preview image reports its first load
//! or when the handle is dropped, whichever comes first.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    revoked: AtomicU64,
    live: Mutex<HashSet<String>>,
}

impl RegistryInner {
    fn revoke(&self, url: &str) {
        let removed = match self.live.lock() {
            Ok(mut live) => live.remove(url),
            Err(poisoned) => poisoned.into_inner().remove(url),
        };
        if removed {
            self.revoked.fetch_add(1, Ordering::Relaxed);
            debug!(url, "preview revoked");
        } else {
            warn!(url, "preview already revoked");
        }
    }
}

/// Issues preview URLs and keeps track of which are still live.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<RegistryInner>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preview URL for a selected file.
    pub fn create(&self, file_name: &str) -> PreviewUrl {
        let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("blob:examdesk/{n}");
        match self.inner.live.lock() {
            Ok(mut live) => live.insert(url.clone()),
            Err(poisoned) => poisoned.into_inner().insert(url.clone()),
        };
        debug!(url = %url, file_name, "preview created");
        PreviewUrl {
            url,
            registry: Arc::clone(&self.inner),
            revoked: false,
        }
    }

    /// URLs created but not yet revoked.
    pub fn live_count(&self) -> usize {
        match self.inner.live.lock() {
            Ok(live) => live.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn revoked_count(&self) -> u64 {
        self.inner.revoked.load(Ordering::Relaxed)
    }
}

/// Owning handle to one preview URL.
#[derive(Debug)]
pub struct PreviewUrl {
    url: String,
    registry: Arc<RegistryInner>,
    revoked: bool,
}

impl PreviewUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// The preview image finished its initial load; the URL is no longer needed.
    pub fn mark_loaded(&mut self) {
        self.revoke();
    }

    fn revoke(&mut self) {
        if !self.revoked {
            self.revoked = true;
            self.registry.revoke(&self.url);
        }
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        self.revoke();
    }
}

/// A state change the widget cannot make from where it is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while upload is {state}")]
pub struct InvalidTransition {
    pub action: &'static str,
    pub state: &'static str,
}

/// States of the upload widget.
#[derive(Debug, Default)]
pub enum UploadState {
    #[default]
    Empty,
    Selected {
        file_name: String,
        preview: PreviewUrl,
    },
    Uploading {
        file_name: String,
        preview: PreviewUrl,
    },
    Uploaded {
        file_name: String,
        url: String,
    },
    Failed {
        file_name: String,
        message: String,
    },
}

impl UploadState {
    pub fn name(&self) -> &'static str {
        match self {
            UploadState::Empty => "empty",
            UploadState::Selected { .. } => "selected",
            UploadState::Uploading { .. } => "uploading",
            UploadState::Uploaded { .. } => "uploaded",
            UploadState::Failed { .. } => "failed",
        }
    }

    pub fn preview(&self) -> Option<&PreviewUrl> {
        match self {
            UploadState::Selected { preview, .. } | UploadState::Uploading { preview, .. } => {
                Some(preview)
            }
            _ => None,
        }
    }
}

/// Single-file upload widget model.
#[derive(Debug)]
pub struct UploadWidget {
    registry: PreviewRegistry,
    state: UploadState,
}

impl UploadWidget {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            state: UploadState::Empty,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Select a file, replacing whatever was there before. Not allowed mid-upload.
    pub fn select(&mut self, file_name: &str) -> Result<(), InvalidTransition> {
        if let UploadState::Uploading { .. } = self.state {
            return Err(self.invalid("select a file"));
        }
        let preview = self.registry.create(file_name);
        self.state = UploadState::Selected {
            file_name: file_name.to_string(),
            preview,
        };
        Ok(())
    }

    /// The preview image finished loading.
    pub fn preview_loaded(&mut self) {
        if let UploadState::Selected { preview, .. } | UploadState::Uploading { preview, .. } =
            &mut self.state
        {
            preview.mark_loaded();
        }
    }

    pub fn begin_upload(&mut self) -> Result<(), InvalidTransition> {
        match std::mem::take(&mut self.state) {
            UploadState::Selected { file_name, preview } => {
                self.state = UploadState::Uploading { file_name, preview };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("start upload"))
            }
        }
    }

    /// Settle an in-flight upload with the stored file URL or an error message.
    pub fn finish(&mut self, outcome: Result<String, String>) -> Result<(), InvalidTransition> {
        match std::mem::take(&mut self.state) {
            UploadState::Uploading { file_name, preview } => {
                drop(preview);
                self.state = match outcome {
                    Ok(url) => UploadState::Uploaded { file_name, url },
                    Err(message) => UploadState::Failed { file_name, message },
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("finish upload"))
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = UploadState::Empty;
    }

    fn invalid(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_revokes_once() {
        let registry = PreviewRegistry::new();
        let preview = registry.create("answer.png");
        assert!(preview.as_str().starts_with("blob:examdesk/"));
        assert_eq!(registry.live_count(), 1);

        drop(preview);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
    }

    #[test]
    fn load_then_drop_revokes_once() {
        let registry = PreviewRegistry::new();
        let mut preview = registry.create("answer.png");
        preview.mark_loaded();
        preview.mark_loaded();
        assert!(preview.is_revoked());
        drop(preview);
        assert_eq!(registry.revoked_count(), 1);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn urls_are_unique() {
        let registry = PreviewRegistry::new();
        let a = registry.create("a.png");
        let b = registry.create("b.png");
        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn widget_happy_path() {
        let registry = PreviewRegistry::new();
        let mut widget = UploadWidget::new(registry.clone());

        widget.select("q3.jpg").unwrap();
        assert_eq!(widget.state().name(), "selected");
        widget.begin_upload().unwrap();
        assert!(widget.state().preview().is_some());
        widget
            .finish(Ok("https://cdn.example/q3.jpg".into()))
            .unwrap();

        match widget.state() {
            UploadState::Uploaded { url, .. } => assert_eq!(url, "https://cdn.example/q3.jpg"),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
    }

    #[test]
    fn reselect_revokes_previous_preview() {
        let registry = PreviewRegistry::new();
        let mut widget = UploadWidget::new(registry.clone());
        widget.select("first.png").unwrap();
        widget.select("second.png").unwrap();
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.revoked_count(), 1);

        widget.reset();
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 2);
    }

    #[test]
    fn loaded_preview_is_not_revoked_again() {
        let registry = PreviewRegistry::new();
        let mut widget = UploadWidget::new(registry.clone());
        widget.select("a.png").unwrap();
        widget.preview_loaded();
        assert_eq!(registry.revoked_count(), 1);

        widget.begin_upload().unwrap();
        widget.finish(Err("413 too large".into())).unwrap();
        assert_eq!(registry.revoked_count(), 1);
        assert_eq!(widget.state().name(), "failed");
    }

    #[test]
    fn rejects_invalid_transitions() {
        let mut widget = UploadWidget::new(PreviewRegistry::new());
        let err = widget.begin_upload().unwrap_err();
        assert_eq!(err.to_string(), "cannot start upload while upload is empty");

        widget.select("a.png").unwrap();
        widget.begin_upload().unwrap();
        assert!(widget.select("b.png").is_err());
        assert_eq!(widget.state().name(), "uploading");

        widget.finish(Ok("u".into())).unwrap();
        assert!(widget.finish(Ok("u".into())).is_err());
    }
}
