//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose store operations to Dart via FRB as flat DTOs.
//! - Hand the UI one opaque app handle instead of process-wide globals.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Fallible mutations return an [`ActionResponse`] envelope.

use memoryshare_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, initial_region,
    map_markers, ping as ping_inner, AppCore, Language, Location, Memory, MemoryDraft,
    MemoryQuery, Tag, ThemeMode,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const DB_FILE_NAME: &str = "memoryshare.sqlite3";
const DB_PATH_ENV: &str = "MEMORYSHARE_DB_PATH";

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens the app state stored at `db_path`.
///
/// An empty `db_path` resolves to `$MEMORYSHARE_DB_PATH`, then to
/// `<temp dir>/memoryshare.sqlite3`.
#[flutter_rust_bridge::frb(sync)]
pub fn open_app(db_path: String) -> Result<MemoryShareApp, String> {
    let path = resolve_db_path(db_path.as_str());
    let core = AppCore::open(&path)
        .map_err(|err| format!("open_app failed for `{}`: {err}", path.display()))?;
    Ok(MemoryShareApp {
        core: Mutex::new(core),
    })
}

/// Generic action response envelope for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created or affected record id.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDto {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_uri: String,
    pub tag_ids: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// RFC 3339, UTC.
    pub created_at: String,
}

/// Create-form payload; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemoryInput {
    pub title: String,
    pub description: Option<String>,
    pub image_uri: String,
    pub tag_ids: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDto {
    /// `en` or `no`.
    pub language: String,
    /// `light` or `dark`.
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarkerDto {
    pub memory_id: String,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapRegionDto {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Opaque handle owning both stores for one database.
#[flutter_rust_bridge::frb(opaque)]
pub struct MemoryShareApp {
    core: Mutex<AppCore>,
}

impl MemoryShareApp {
    #[flutter_rust_bridge::frb(sync)]
    pub fn settings(&self) -> Result<SettingsDto, String> {
        let core = self.lock()?;
        let settings = core.settings();
        Ok(SettingsDto {
            language: settings.language().code().to_string(),
            theme: settings.theme().code().to_string(),
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_language(&self, code: String) -> ActionResponse {
        let Some(language) = Language::parse(code.trim()) else {
            return ActionResponse::failure(format!("unsupported language `{code}`"));
        };
        match self.lock() {
            Ok(mut core) => {
                core.settings_mut().set_language(language);
                ActionResponse::success("Language updated.", None)
            }
            Err(err) => ActionResponse::failure(err),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_theme(&self, code: String) -> ActionResponse {
        let Some(theme) = ThemeMode::parse(code.trim()) else {
            return ActionResponse::failure(format!("unsupported theme `{code}`"));
        };
        match self.lock() {
            Ok(mut core) => {
                core.settings_mut().set_theme(theme);
                ActionResponse::success("Theme updated.", None)
            }
            Err(err) => ActionResponse::failure(err),
        }
    }

    /// Lists memories newest first, filtered by text and optional tag.
    #[flutter_rust_bridge::frb(sync)]
    pub fn list_memories(
        &self,
        query: String,
        tag_id: Option<String>,
    ) -> Result<Vec<MemoryDto>, String> {
        let core = self.lock()?;
        let query = MemoryQuery {
            text: query,
            tag_id: tag_id.filter(|id| !id.trim().is_empty()),
        };
        Ok(core
            .memories()
            .search(&query)
            .into_iter()
            .map(to_memory_dto)
            .collect())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn get_memory(&self, id: String) -> Result<Option<MemoryDto>, String> {
        let core = self.lock()?;
        Ok(core.memories().get_memory_by_id(id.as_str()).map(to_memory_dto))
    }

    /// Tags attached to one memory, for the details view.
    #[flutter_rust_bridge::frb(sync)]
    pub fn memory_tags(&self, id: String) -> Result<Vec<TagDto>, String> {
        let core = self.lock()?;
        Ok(core
            .memories()
            .tags_for_memory(id.as_str())
            .unwrap_or_default()
            .into_iter()
            .map(to_tag_dto)
            .collect())
    }

    /// Saves a memory after the create-form required-field check.
    #[flutter_rust_bridge::frb(sync)]
    pub fn add_memory(&self, input: NewMemoryInput) -> ActionResponse {
        let draft = MemoryDraft {
            title: input.title.trim().to_string(),
            description: input
                .description
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            image_uri: input.image_uri.trim().to_string(),
            tags: input.tag_ids,
            location: Location::new(input.latitude, input.longitude),
        };
        if let Err(err) = draft.validate() {
            return ActionResponse::failure(format!("add_memory rejected: {err}"));
        }
        match self.lock() {
            Ok(mut core) => {
                let memory = core.memories_mut().add_memory(draft);
                ActionResponse::success("Memory saved.", Some(memory.id))
            }
            Err(err) => ActionResponse::failure(err),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn list_tags(&self) -> Result<Vec<TagDto>, String> {
        let core = self.lock()?;
        Ok(core.memories().tags().iter().map(to_tag_dto).collect())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn add_tag(&self, name: String, color: String) -> ActionResponse {
        match self.lock() {
            Ok(mut core) => match core.memories_mut().add_tag(name.trim(), color.trim()) {
                Ok(tag) => ActionResponse::success("Tag created.", Some(tag.id)),
                Err(err) => ActionResponse::failure(format!("add_tag rejected: {err}")),
            },
            Err(err) => ActionResponse::failure(err),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn edit_tag(&self, id: String, name: String, color: String) -> ActionResponse {
        match self.lock() {
            Ok(mut core) => {
                match core
                    .memories_mut()
                    .edit_tag(id.as_str(), name.trim(), color.trim())
                {
                    Ok(tag) => ActionResponse::success("Tag updated.", Some(tag.id)),
                    Err(err) => ActionResponse::failure(format!("edit_tag rejected: {err}")),
                }
            }
            Err(err) => ActionResponse::failure(err),
        }
    }

    /// Deleting an unknown tag succeeds with an explanatory message.
    #[flutter_rust_bridge::frb(sync)]
    pub fn delete_tag(&self, id: String) -> ActionResponse {
        match self.lock() {
            Ok(mut core) => {
                let message = if core.memories_mut().delete_tag(id.as_str()) {
                    "Tag deleted."
                } else {
                    "Tag already absent."
                };
                ActionResponse::success(message, Some(id))
            }
            Err(err) => ActionResponse::failure(err),
        }
    }

    /// Memories created in the current UTC calendar month.
    #[flutter_rust_bridge::frb(sync)]
    pub fn count_this_month(&self) -> Result<u32, String> {
        let core = self.lock()?;
        let count = core.memories().count_current_month();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn map_markers(&self) -> Result<Vec<MapMarkerDto>, String> {
        let core = self.lock()?;
        Ok(map_markers(core.memories().memories())
            .into_iter()
            .map(|marker| MapMarkerDto {
                memory_id: marker.id,
                title: marker.title,
                latitude: marker.location.latitude,
                longitude: marker.location.longitude,
            })
            .collect())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn initial_region(&self) -> Result<MapRegionDto, String> {
        let core = self.lock()?;
        let region = initial_region(core.memories().memories());
        Ok(MapRegionDto {
            latitude: region.center.latitude,
            longitude: region.center.longitude,
            latitude_delta: region.latitude_delta,
            longitude_delta: region.longitude_delta,
        })
    }

    /// Blocks until queued writes are stored; call before app suspension.
    #[flutter_rust_bridge::frb(sync)]
    pub fn flush(&self) -> Result<(), String> {
        self.lock()?.flush();
        Ok(())
    }

    /// Non-zero means some changes never reached disk.
    #[flutter_rust_bridge::frb(sync)]
    pub fn write_failure_count(&self) -> Result<u64, String> {
        Ok(self.lock()?.write_failure_count())
    }

    fn lock(&self) -> Result<MutexGuard<'_, AppCore>, String> {
        self.core
            .lock()
            .map_err(|_| "app state lock poisoned".to_string())
    }
}

fn resolve_db_path(requested: &str) -> PathBuf {
    let trimmed = requested.trim();
    if !trimmed.is_empty() {
        return PathBuf::from(trimmed);
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn to_tag_dto(tag: &Tag) -> TagDto {
    TagDto {
        id: tag.id.clone(),
        name: tag.name.clone(),
        color: tag.color.clone(),
    }
}

fn to_memory_dto(memory: &Memory) -> MemoryDto {
    MemoryDto {
        id: memory.id.clone(),
        title: memory.title.clone(),
        description: memory.description.clone(),
        image_uri: memory.image_uri.clone(),
        tag_ids: memory.tags.clone(),
        latitude: memory.location.latitude,
        longitude: memory.location.longitude,
        created_at: memory.created_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, init_logging, open_app, ping, MemoryShareApp, NewMemoryInput};
    use tempfile::TempDir;

    fn open_temp_app() -> (TempDir, MemoryShareApp) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("app.sqlite3");
        let app = open_app(path.to_string_lossy().into_owned()).expect("open app");
        (dir, app)
    }

    fn kayak_input(title: &str) -> NewMemoryInput {
        NewMemoryInput {
            title: title.to_string(),
            description: Some("  ".to_string()),
            image_uri: "file:///kayak.jpg".to_string(),
            tag_ids: vec!["family".to_string()],
            latitude: 60.0,
            longitude: 6.0,
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_dir_and_unknown_level() {
        assert!(!init_logging("info".to_string(), "tmp/logs".to_string()).is_empty());
        assert!(!init_logging("verbose".to_string(), String::new()).is_empty());
    }

    #[test]
    fn fresh_app_exposes_seed_data_and_defaults() {
        let (_dir, app) = open_temp_app();

        let settings = app.settings().unwrap();
        assert_eq!(settings.language, "en");
        assert_eq!(settings.theme, "light");
        assert_eq!(app.list_tags().unwrap().len(), 3);

        let memories = app.list_memories(String::new(), None).unwrap();
        assert_eq!(memories.len(), 1);
        let names: Vec<String> = app
            .memory_tags(memories[0].id.clone())
            .unwrap()
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(names, vec!["Vacation".to_string(), "Friends".to_string()]);
    }

    #[test]
    fn add_memory_checks_required_fields_and_normalizes_description() {
        let (_dir, app) = open_temp_app();

        let rejected = app.add_memory(kayak_input("   "));
        assert!(!rejected.ok);
        assert!(rejected.message.contains("title"));

        let saved = app.add_memory(kayak_input("Kayak"));
        assert!(saved.ok, "{}", saved.message);
        let id = saved.id.expect("saved memory id");
        let memory = app.get_memory(id.clone()).unwrap().expect("memory exists");
        assert_eq!(memory.description, None);
        assert_eq!(app.list_memories(String::new(), None).unwrap()[0].id, id);
        assert_eq!(
            app.list_memories("kay".to_string(), Some("family".to_string()))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(app.count_this_month().unwrap(), 2);
    }

    #[test]
    fn tag_operations_report_conflicts_and_cascade() {
        let (_dir, app) = open_temp_app();

        let conflict = app.add_tag("VACATION".to_string(), "#000000".to_string());
        assert!(!conflict.ok);
        assert!(conflict.message.contains("name"));

        let edited = app.edit_tag(
            "friends".to_string(),
            "Friends".to_string(),
            "#32CD32".to_string(),
        );
        assert!(edited.ok, "{}", edited.message);

        assert!(app.delete_tag("friends".to_string()).ok);
        let memory = app.get_memory("1".to_string()).unwrap().unwrap();
        assert_eq!(memory.tag_ids, vec!["vacation".to_string()]);
        let again = app.delete_tag("friends".to_string());
        assert!(again.ok);
        assert_eq!(again.message, "Tag already absent.");
    }

    #[test]
    fn settings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.sqlite3").to_string_lossy().into_owned();
        {
            let app = open_app(path.clone()).unwrap();
            assert!(app.set_language("no".to_string()).ok);
            assert!(app.set_theme("dark".to_string()).ok);
            assert!(!app.set_theme("sepia".to_string()).ok);
            app.flush().unwrap();
            assert_eq!(app.write_failure_count().unwrap(), 0);
        }

        let reopened = open_app(path).unwrap();
        let settings = reopened.settings().unwrap();
        assert_eq!(settings.language, "no");
        assert_eq!(settings.theme, "dark");
    }

    #[test]
    fn map_projection_centres_on_newest_memory() {
        let (_dir, app) = open_temp_app();
        app.add_memory(kayak_input("Kayak"));

        let region = app.initial_region().unwrap();
        assert_eq!(region.latitude, 60.0);
        assert_eq!(region.latitude_delta, 0.1);
        assert_eq!(app.map_markers().unwrap().len(), 2);
    }
}
