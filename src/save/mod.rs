//! Persistence: farm snapshots, snapshot stores, and autosave.
//!
//! The engine only knows [`SnapshotStore`]; the JSON file store is one
//! implementation and the in-memory store another. Autosave is a tick
//! observer registered on the session, so it runs after every day-advance.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::farming::grid::PlotGrid;
use crate::session::{DayReport, FarmRng, FarmSession, TickObserver};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

/// Everything needed to resume a farm. Weather is not stored; a fresh
/// forecast is rolled on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub version: u32,
    pub grid: PlotGrid,
    pub economy: EconomyState,
    pub day: u32,
    pub season: Season,
    #[serde(default)]
    pub stats: FarmStats,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed save data: {0}")]
    Format(#[from] serde_json::Error),
    #[error("save version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("corrupt save: {0}")]
    Corrupt(String),
}

/// Where snapshots go. Implementations decide medium and format.
pub trait SnapshotStore: Send + Sync {
    fn save(&mut self, snapshot: &FarmSnapshot) -> Result<(), SaveError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<FarmSnapshot>, SaveError>;
}

// ═══════════════════════════════════════════════════════════════════════
// JSON FILE STORE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SaveError {
    SaveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&mut self, snapshot: &FarmSnapshot) -> Result<(), SaveError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;

        // Write to a temp file first, then rename for atomicity
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| io_error(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }

    fn load(&self) -> Result<Option<FarmSnapshot>, SaveError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct MemorySlot {
    latest: Option<String>,
    writes: usize,
}

/// Keeps the latest snapshot as JSON in memory. Clones share one slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<MemorySlot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    pub fn writes(&self) -> usize {
        self.slot.lock().map(|s| s.writes).unwrap_or(0)
    }

    /// Overwrite the stored JSON directly.
    pub fn put_raw(&self, json: impl Into<String>) -> Result<(), SaveError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| SaveError::Corrupt("memory store lock poisoned".into()))?;
        slot.latest = Some(json.into());
        Ok(())
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, snapshot: &FarmSnapshot) -> Result<(), SaveError> {
        let json = serde_json::to_string(snapshot)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| SaveError::Corrupt("memory store lock poisoned".into()))?;
        slot.latest = Some(json);
        slot.writes += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<FarmSnapshot>, SaveError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| SaveError::Corrupt("memory store lock poisoned".into()))?;
        match slot.latest.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// AUTOSAVE
// ═══════════════════════════════════════════════════════════════════════

/// Saves a snapshot after every day-advance. Failures are logged, never
/// propagated into the tick.
pub struct AutosaveObserver<S: SnapshotStore> {
    store: S,
}

impl<S: SnapshotStore> AutosaveObserver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: SnapshotStore> TickObserver for AutosaveObserver<S> {
    fn name(&self) -> &str {
        "autosave"
    }

    fn after_day(&mut self, session: &FarmSession, report: &DayReport) {
        match self.store.save(&session.snapshot()) {
            Ok(()) => info!("[Save] Autosaved day {}", report.day),
            Err(e) => error!("[Save] Autosave failed on day {}: {}", report.day, e),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS & RESOURCES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone)]
pub struct SaveSettings {
    pub path: PathBuf,
    /// Register the autosave observer when the session is created.
    pub autosave: bool,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("saves/farm.json"),
            autosave: true,
        }
    }
}

/// Sent by UI to trigger a manual save.
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

/// Sent by UI to reload the farm from the save file.
#[derive(Event, Debug, Clone)]
pub struct LoadRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub success: bool,
    /// Plots reset because they broke an invariant.
    pub plots_reset: usize,
    pub error_message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SaveSettings>()
            .add_event::<SaveRequestEvent>()
            .add_event::<LoadRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            .add_systems(
                Update,
                (handle_save_request, handle_load_request)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn handle_save_request(
    mut requests: EventReader<SaveRequestEvent>,
    session: Res<FarmSession>,
    settings: Res<SaveSettings>,
    mut complete: EventWriter<SaveCompleteEvent>,
) {
    for _ in requests.read() {
        let mut store = JsonFileStore::new(settings.path.clone());
        match store.save(&session.snapshot()) {
            Ok(()) => {
                info!("[Save] Saved farm to {}", settings.path.display());
                complete.send(SaveCompleteEvent {
                    success: true,
                    error_message: None,
                });
            }
            Err(e) => {
                error!("[Save] {}", e);
                complete.send(SaveCompleteEvent {
                    success: false,
                    error_message: Some(e.to_string()),
                });
            }
        }
    }
}

fn handle_load_request(
    mut requests: EventReader<LoadRequestEvent>,
    mut session: ResMut<FarmSession>,
    mut rng: ResMut<FarmRng>,
    settings: Res<SaveSettings>,
    mut complete: EventWriter<LoadCompleteEvent>,
) {
    for _ in requests.read() {
        let store = JsonFileStore::new(settings.path.clone());
        let result = store.load().and_then(|loaded| match loaded {
            Some(snapshot) => session.restore(snapshot, &mut rng.0),
            None => Err(SaveError::Corrupt(format!(
                "no save found at {}",
                settings.path.display()
            ))),
        });

        match result {
            Ok(anomalies) => {
                info!(
                    "[Save] Loaded farm from {} ({} plots reset)",
                    settings.path.display(),
                    anomalies.len()
                );
                complete.send(LoadCompleteEvent {
                    success: true,
                    plots_reset: anomalies.len(),
                    error_message: None,
                });
            }
            Err(e) => {
                error!("[Save] {}", e);
                complete.send(LoadCompleteEvent {
                    success: false,
                    plots_reset: 0,
                    error_message: Some(e.to_string()),
                });
            }
        }
    }
}
