//! Per-editor zoom state persistence.
//!
//! Each editor view saves its zoom scale and scroll offset under the
//! state directory, keyed by an editor id, so reopening a project
//! restores the view the user left. Load failures warn and fall back to
//! defaults; a corrupt state file must never block the editor.

use std::path::PathBuf;

use tracing::{debug, warn};

use montage_common::MontageResult;
use montage_timeline_model::zoom::ZoomState;

fn zoom_state_path(editor_id: &str) -> PathBuf {
    montage_common::state_dir()
        .join("editor-state")
        .join(format!("{editor_id}.json"))
}

/// Load the persisted zoom state for an editor, or defaults.
pub fn load_zoom_state(editor_id: &str) -> ZoomState {
    let path = zoom_state_path(editor_id);
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(state) => {
                debug!(editor_id, ?path, "loaded zoom state");
                state
            }
            Err(e) => {
                warn!(editor_id, error = %e, "invalid zoom state file, using defaults");
                ZoomState::default()
            }
        },
        Err(_) => ZoomState::default(),
    }
}

/// Persist the zoom state for an editor.
pub fn save_zoom_state(editor_id: &str, state: ZoomState) -> MontageResult<()> {
    let path = zoom_state_path(editor_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&state)?;
    std::fs::write(&path, json)?;
    debug!(editor_id, ?path, "saved zoom state");
    Ok(())
}
