use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// A camera record as published by the coordinator in the status document.
///
/// `settings` is an opaque blob owned by the camera; this side only checks
/// the shape it needs to render the edit form and otherwise passes the blob
/// through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRecord {
    pub endpoint: Option<String>,
    pub uuid: Option<String>,
    #[serde(default)]
    pub photo_count: u64,
    pub settings: Option<Value>,
}

/// Schedule half of a camera's settings blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub enabled: bool,
    pub interval: u32,
    /// Monday first, Sunday last.
    pub weekdays: [bool; 7],
    pub daily_start_time: String,
    pub daily_end_time: String,
}

/// Capture half of a camera's settings blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    pub jpeg_quality: u32,
    /// Preference order, most preferred first.
    pub picture_sizes: Vec<String>,
}

/// The editable view of a compatible camera record.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableSettings {
    pub schedule: ScheduleSettings,
    pub camera: CaptureSettings,
}

impl CameraRecord {
    /// The editable settings, or `None` when the record is missing
    /// `endpoint`, `settings`, `settings.schedule`, or `settings.camera`,
    /// or when the two blobs do not have the shape the form edits.
    pub fn editable(&self) -> Option<EditableSettings> {
        self.endpoint.as_ref()?;
        let settings = self.settings.as_ref()?;
        let schedule = settings.get("schedule")?;
        let camera = settings.get("camera")?;
        let schedule: ScheduleSettings = serde_json::from_value(schedule.clone()).ok()?;
        let camera: CaptureSettings = serde_json::from_value(camera.clone()).ok()?;
        Some(EditableSettings { schedule, camera })
    }
}

/// The status document the coordinator drops into the www directory as
/// cameras join and drop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusDoc {
    #[serde(default)]
    pub generated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub cameras: Vec<CameraRecord>,
}

/// Reads camera records from the status document on demand.
///
/// The document is re-read per page render so joins and drops show up
/// without a restart; a missing document just means no cameras yet.
#[derive(Debug, Clone)]
pub struct CameraRegistry {
    status_path: PathBuf,
}

impl CameraRegistry {
    pub fn new(status_path: PathBuf) -> Self {
        Self { status_path }
    }

    pub async fn load(&self) -> Result<Vec<CameraRecord>> {
        let raw = match tokio::fs::read_to_string(&self.status_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("status document {:?} not found, no cameras yet", self.status_path);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {:?}", self.status_path));
            }
        };
        let doc: StatusDoc = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {:?}", self.status_path))?;
        Ok(doc.cameras)
    }
}
