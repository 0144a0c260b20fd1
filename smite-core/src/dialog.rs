//! Dialog lifecycle tied to scene changes.
//!
//! A [`DialogSession`] is a scoped resource: opening one subscribes to the
//! scene feed, and dropping it deregisters on every exit path. An open
//! dialog holds token references into the scene it was built from, so any
//! scene change force-closes it rather than leaving stale rows on screen.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// A scene-change notification.
#[derive(Debug, Clone)]
pub struct SceneChange {
    /// Name of the scene that became active.
    pub scene: String,
}

/// Broadcast feed of scene changes. Cheap to clone; every open dialog holds
/// its own subscription.
#[derive(Debug, Clone)]
pub struct SceneFeed {
    tx: broadcast::Sender<SceneChange>,
}

impl SceneFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Announce that a different scene became active.
    pub fn scene_changed(&self, scene: impl Into<String>) {
        // Send only fails with no subscribers, which is fine: nobody to close.
        let _ = self.tx.send(SceneChange {
            scene: scene.into(),
        });
    }

    /// Open a dialog session subscribed to this feed.
    pub fn open_dialog(&self) -> DialogSession {
        DialogSession {
            rx: self.tx.subscribe(),
            open: true,
        }
    }
}

impl Default for SceneFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// The lifecycle handle for one open dialog.
pub struct DialogSession {
    rx: broadcast::Receiver<SceneChange>,
    open: bool,
}

impl DialogSession {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Drain pending notifications; returns whether the dialog is still open.
    ///
    /// Any scene change closes the dialog. A lagged or closed feed also
    /// closes it: either way the token rows can no longer be trusted.
    pub fn poll(&mut self) -> bool {
        if !self.open {
            return false;
        }
        match self.rx.try_recv() {
            Ok(change) => {
                tracing::info!(scene = %change.scene, "scene changed, closing damage dialog");
                self.open = false;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Lagged(_)) | Err(TryRecvError::Closed) => {
                self.open = false;
            }
        }
        self.open
    }

    /// Close explicitly (user dismissed the dialog).
    pub fn close(&mut self) {
        self.open = false;
    }
}
