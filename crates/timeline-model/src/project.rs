//! Project metadata and on-disk layout.
//!
//! A project is the top-level container that ties together the editing
//! composition, media asset references, and render output settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::composition::Composition;

/// Top-level project file (`project.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Unique project identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Render output configuration.
    pub output: OutputSettings,
}

/// Render output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Output container/codec.
    pub format: OutputFormat,

    /// Output resolution in pixels.
    pub width: u32,
    pub height: u32,

    /// Output frame rate.
    pub fps: u32,

    /// Video bitrate in kbps (0 = auto).
    pub video_bitrate_kbps: u32,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,
}

/// Output video format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[serde(rename = "mp4-h264")]
    Mp4H264,
    #[serde(rename = "mp4-h265")]
    Mp4H265,
    Gif,
    Webm,
}

/// The complete in-memory representation of a loaded project.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem path to the project directory.
    pub root: PathBuf,

    /// Project metadata.
    pub project: Project,

    /// Editing composition.
    pub composition: Composition,
}

impl Project {
    /// Create a new project with defaults.
    pub fn new(name: impl Into<String>, width: u32, height: u32, fps: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            id: uuid_v4(),
            created_at: now.clone(),
            modified_at: now,
            output: OutputSettings {
                format: OutputFormat::Mp4H264,
                width,
                height,
                fps,
                video_bitrate_kbps: 8000,
                audio_bitrate_kbps: 192,
            },
        }
    }
}

impl LoadedProject {
    /// Load a project from a directory.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        let project_path = root.join("meta").join("project.json");
        let composition_path = root.join("meta").join("composition.json");

        let project_json =
            std::fs::read_to_string(&project_path).map_err(|e| ProjectError::IoError {
                path: project_path.clone(),
                source: e,
            })?;

        let project: Project =
            serde_json::from_str(&project_json).map_err(|e| ProjectError::ParseError {
                path: project_path,
                source: e,
            })?;

        let composition = if composition_path.exists() {
            let composition_json = std::fs::read_to_string(&composition_path).map_err(|e| {
                ProjectError::IoError {
                    path: composition_path.clone(),
                    source: e,
                }
            })?;
            serde_json::from_str(&composition_json).map_err(|e| ProjectError::ParseError {
                path: composition_path,
                source: e,
            })?
        } else {
            Composition::new(project.output.fps)
        };

        Ok(Self {
            root,
            project,
            composition,
        })
    }

    /// Save project and composition to disk.
    pub fn save(&self) -> Result<(), ProjectError> {
        let meta_dir = self.root.join("meta");
        std::fs::create_dir_all(&meta_dir).map_err(|e| ProjectError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        let project_path = meta_dir.join("project.json");
        let project_json =
            serde_json::to_string_pretty(&self.project).map_err(|e| ProjectError::ParseError {
                path: project_path.clone(),
                source: e,
            })?;
        std::fs::write(&project_path, project_json).map_err(|e| ProjectError::IoError {
            path: project_path,
            source: e,
        })?;

        let composition_path = meta_dir.join("composition.json");
        let composition_json = serde_json::to_string_pretty(&self.composition).map_err(|e| {
            ProjectError::ParseError {
                path: composition_path.clone(),
                source: e,
            }
        })?;
        std::fs::write(&composition_path, composition_json).map_err(|e| {
            ProjectError::IoError {
                path: composition_path,
                source: e,
            }
        })?;

        Ok(())
    }

    /// Create a new project on disk with the standard directory structure.
    pub fn create(
        root: impl AsRef<Path>,
        name: impl Into<String>,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self, ProjectError> {
        let root = root.as_ref().to_path_buf();

        for subdir in &["media", "meta", "cache", "renders"] {
            std::fs::create_dir_all(root.join(subdir)).map_err(|e| ProjectError::IoError {
                path: root.join(subdir),
                source: e,
            })?;
        }

        let loaded = Self {
            root,
            project: Project::new(name, width, height, fps),
            composition: Composition::new(fps),
        };
        loaded.save()?;
        Ok(loaded)
    }

    /// Validate that all media sources referenced by the composition exist.
    pub fn validate_sources(&self) -> Vec<String> {
        let mut errors = vec![];
        for overlay in self.composition.overlays() {
            let src = match &overlay.kind {
                crate::overlay::OverlayKind::Video { src, .. }
                | crate::overlay::OverlayKind::Audio { src, .. } => src,
                _ => continue,
            };
            if !self.root.join(src).exists() {
                errors.push(format!("overlay {} source missing: {src}", overlay.id));
            }
        }
        errors
    }
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

/// Generate a simple UUID v4 without external dependency.
fn uuid_v4() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (seed & 0xFFFFFFFF) as u32,
        ((seed >> 32) & 0xFFFF) as u16,
        ((seed >> 48) & 0x0FFF) as u16,
        (((seed >> 60) & 0x3F) | 0x80) as u16 | (((seed >> 66) & 0x3FF) as u16) << 6,
        (seed >> 76) & 0xFFFFFFFFFFFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::OverlayDraft;
    use crate::overlay::OverlayKind;
    use crate::track::TrackKind;

    #[test]
    fn test_project_creation() {
        let project = Project::new("Launch Teaser", 1920, 1080, 30);
        assert_eq!(project.name, "Launch Teaser");
        assert_eq!(project.output.width, 1920);
        assert_eq!(project.output.fps, 30);
    }

    #[test]
    fn test_project_serialization() {
        let project = Project::new("Test", 1920, 1080, 30);
        let json = serde_json::to_string_pretty(&project).unwrap();
        let parsed: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "Test");
        assert_eq!(parsed.version, "1.0");
    }

    #[test]
    fn test_loaded_project_create_and_load() {
        let dir = std::env::temp_dir().join("montage_test_project");
        let _ = std::fs::remove_dir_all(&dir);

        let mut created = LoadedProject::create(&dir, "Integration Test", 1920, 1080, 30).unwrap();
        let track = created.composition.add_track(TrackKind::Video, "V1");
        created
            .composition
            .add_overlay(
                track,
                OverlayDraft::new(
                    OverlayKind::Video {
                        src: "media/a.mp4".to_string(),
                        source_in_frame: 0,
                        source_out_frame: 90,
                        source_duration_frames: 300,
                    },
                    0,
                    90,
                ),
            )
            .unwrap();
        created.save().unwrap();

        let loaded = LoadedProject::load(&dir).unwrap();
        assert_eq!(loaded.project.name, "Integration Test");
        assert_eq!(loaded.composition.overlays().len(), 1);
        assert_eq!(loaded.composition.fps, 30);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_without_composition_file_gives_empty_composition() {
        let dir = std::env::temp_dir().join("montage_test_no_composition");
        let _ = std::fs::remove_dir_all(&dir);

        LoadedProject::create(&dir, "Bare", 1280, 720, 24).unwrap();
        std::fs::remove_file(dir.join("meta").join("composition.json")).unwrap();

        let loaded = LoadedProject::load(&dir).unwrap();
        assert!(loaded.composition.overlays().is_empty());
        assert_eq!(loaded.composition.fps, 24);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_sources_reports_missing() {
        let dir = std::env::temp_dir().join("montage_test_validate");
        let _ = std::fs::remove_dir_all(&dir);

        let mut loaded = LoadedProject::create(&dir, "Validate Test", 1920, 1080, 30).unwrap();
        let track = loaded.composition.add_track(TrackKind::Video, "V1");
        loaded
            .composition
            .add_overlay(
                track,
                OverlayDraft::new(
                    OverlayKind::Video {
                        src: "media/missing.mp4".to_string(),
                        source_in_frame: 0,
                        source_out_frame: 60,
                        source_duration_frames: 60,
                    },
                    0,
                    60,
                ),
            )
            .unwrap();

        let errors = loaded.validate_sources();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("media/missing.mp4"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
