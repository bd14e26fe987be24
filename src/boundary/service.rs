//! Debounced, generation-checked boundary reclassification.
//!
//! The service never needs to be told about edits: every mutation of the
//! editor's state moves its generation and stamps the edit time, and the
//! service re-arms its debouncer from that stamp whenever it sees a
//! generation it has not classified yet.
//!
//! ```text
//! edit @ t0 ──► generation g1, edited_at t0 ──► deadline t0 + window
//! edit @ t1 ──► generation g2, edited_at t1 ──► deadline t1 + window  (t0 dropped)
//!                  ...
//! settle(): sleep until deadline ─► snapshot {id,x,y} @ generation g
//!           ─► classifier.classify().await   (editor lock released)
//!           ─► apply only if editor generation is still g
//!           ─► generation moved meanwhile? wait out the newer edit, run again
//! ```

use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::Editor;
use crate::Result;
use super::{classify_with_fallback, BoundaryClassifier, Debouncer};

#[derive(Debug)]
struct Tracking {
    /// Generation the debouncer deadline was computed for.
    armed: Option<u64>,
    /// Generation of the last classification that was applied.
    classified: Option<u64>,
}

pub struct BoundaryService<C: BoundaryClassifier> {
    editor: Arc<Mutex<Editor>>,
    classifier: C,
    debouncer: Mutex<Debouncer>,
    tracking: Mutex<Tracking>,
}

impl<C: BoundaryClassifier> BoundaryService<C> {
    /// The debounce window comes from the editor's `EditorConfig::debounce_ms`.
    pub fn new(editor: Arc<Mutex<Editor>>, classifier: C) -> Self {
        let (window, classified) = {
            let guard = editor.lock();
            let state = guard.state();
            (guard.config().debounce(), state.points().is_empty().then(|| state.generation()))
        };
        Self {
            editor,
            classifier,
            debouncer: Mutex::new(Debouncer::new(window)),
            tracking: Mutex::new(Tracking { armed: None, classified }),
        }
    }

    pub fn editor(&self) -> &Arc<Mutex<Editor>> { &self.editor }
    pub fn classifier(&self) -> &C { &self.classifier }
    pub fn window(&self) -> Duration { self.debouncer.lock().window() }

    /// True while the editor holds edits that have not been classified.
    pub fn is_pending(&self) -> bool {
        self.observe().is_some()
    }

    /// Run `f` against the locked editor.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Editor) -> R) -> R {
        f(&mut self.editor.lock())
    }

    /// Wait out the debounce window and reclassify, repeating until the
    /// applied classification matches the editor's current generation.
    ///
    /// Returns `Ok(false)` when nothing was pending.
    pub async fn settle(&self) -> Result<bool> {
        let mut applied = false;
        while let Some(deadline) = self.observe() {
            tokio::time::sleep_until(Instant::from_std(deadline)).await;
            if self.observe().is_none() {
                break;
            }
            let fired = self.debouncer.lock().fire_if_due(Instant::now().into_std());
            if fired {
                applied |= self.reclassify_now().await?;
            }
        }
        Ok(applied)
    }

    /// Classify the current points immediately, bypassing the debounce.
    pub async fn reclassify_now(&self) -> Result<bool> {
        let request = self.editor.lock().state().boundary_request();
        tracing::debug!(generation = request.generation, points = request.points.len(), "reclassifying boundary");

        let flags = match classify_with_fallback(&self.classifier, &request.points).await {
            Ok(flags) => flags,
            Err(e) => {
                tracing::warn!(error = %e, "boundary classification failed");
                self.tracking.lock().armed = None;
                return Err(e);
            }
        };

        let applied = self.editor.lock().apply_boundary(request.generation, &flags);
        if applied {
            self.tracking.lock().classified = Some(request.generation);
        }
        Ok(applied)
    }

    /// Arm the debouncer for the editor's latest edit and return the
    /// deadline, or `None` when the current generation is already classified.
    fn observe(&self) -> Option<std::time::Instant> {
        let (generation, edited_at) = {
            let editor = self.editor.lock();
            (editor.state().generation(), editor.state().edited_at())
        };
        let mut tracking = self.tracking.lock();
        let mut debouncer = self.debouncer.lock();
        if tracking.classified == Some(generation) {
            debouncer.cancel();
            return None;
        }
        if tracking.armed != Some(generation) || !debouncer.is_pending() {
            debouncer.touch(edited_at.unwrap_or_else(|| Instant::now().into_std()));
            tracking.armed = Some(generation);
        }
        debouncer.deadline()
    }
}
