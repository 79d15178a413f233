//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, screen-level functions to Dart via FRB.
//! - Own the process-wide runtime, store and services between
//!   `app_open` and `app_close`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call made while the app is closed reports [`NOT_OPEN_MESSAGE`].
//! - Form input is validated here; the core trusts what it receives.

use petkeeper_core::{
    core_version as core_version_inner, default_pet_types, emoji_for,
    init_logging as init_logging_inner, normalize_name, ping as ping_inner, validate_owner_name,
    validate_pet_input, AppConfig, NewPet, Notice, OwnerData, OwnerService, PetData,
    PetRepository, PetService, SqlitePetRepository, Store,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Runtime;
use uuid::Uuid;

const NOT_OPEN_MESSAGE: &str = "App is not open.";

static APP: Mutex<Option<App>> = Mutex::new(None);

struct App {
    runtime: Runtime,
    store: Arc<Store>,
    pets: Arc<PetService>,
    owners: Arc<OwnerService>,
}

impl App {
    fn start(config: &AppConfig) -> Result<Self, String> {
        let store = Arc::new(
            Store::open(&config.db_path).map_err(|err| format!("app_open failed: {err}"))?,
        );
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("petkeeper-rt")
            .enable_all()
            .build()
            .map_err(|err| format!("app_open failed: {err}"))?;
        let (pets, owners) = runtime.block_on(async {
            let pets = PetService::start(Arc::clone(&store), config).await;
            let owners = OwnerService::start(Arc::clone(&store), config).await;
            (pets, owners)
        });
        Ok(Self {
            runtime,
            store,
            pets,
            owners,
        })
    }

    /// Runs a pet operation, then brings the owner lists up to date.
    fn pet_action<F, Fut>(&self, op: F) -> ActionResponse
    where
        F: FnOnce(Arc<PetService>) -> Fut,
        Fut: std::future::Future<Output = Notice>,
    {
        let pets = Arc::clone(&self.pets);
        let owners = Arc::clone(&self.owners);
        self.runtime.block_on(async move {
            let notice = op(pets).await;
            if notice.ok {
                owners.refresh().await;
            }
            notice.into()
        })
    }

    /// Runs an owner operation, then brings the pet lists up to date.
    fn owner_action<F, Fut>(&self, op: F) -> ActionResponse
    where
        F: FnOnce(Arc<OwnerService>) -> Fut,
        Fut: std::future::Future<Output = Notice>,
    {
        let pets = Arc::clone(&self.pets);
        let owners = Arc::clone(&self.owners);
        self.runtime.block_on(async move {
            let notice = op(owners).await;
            if notice.ok {
                pets.refresh().await;
            }
            notice.into()
        })
    }
}

/// Result envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Human-readable status line for the UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl From<Notice> for ActionResponse {
    fn from(notice: Notice) -> Self {
        Self {
            ok: notice.ok,
            message: notice.message,
        }
    }
}

/// Pet row as shown in lists and edit dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetItem {
    pub id: String,
    pub name: String,
    pub pet_type: String,
    /// Emoji for `pet_type`; unknown types use the "Other" emoji.
    pub emoji: String,
    pub age: u32,
    pub has_owner: bool,
    pub owner_name: Option<String>,
}

/// Owner row with its pets in collection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerItem {
    pub id: String,
    pub name: String,
    pub pets: Vec<PetItem>,
}

/// Entry of the pet type picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetTypeItem {
    pub label: String,
    pub emoji: String,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
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
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens the database and starts the services.
///
/// `db_path` overrides the configured location when non-blank; otherwise
/// `PETKEEPER_DB_PATH` or the temp-dir default applies.
///
/// # FFI contract
/// - Sync call; performs file-system and migration work.
/// - Calling again while open is a no-op success.
#[flutter_rust_bridge::frb(sync)]
pub fn app_open(db_path: Option<String>) -> ActionResponse {
    let mut slot = lock_app();
    if slot.is_some() {
        return ActionResponse::success("App already open.");
    }

    let mut config = AppConfig::from_env();
    if let Some(path) = db_path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        config.db_path = PathBuf::from(path);
    }
    match App::start(&config) {
        Ok(app) => {
            *slot = Some(app);
            log::info!("event=app_open module=ffi status=ok");
            ActionResponse::success("App opened.")
        }
        Err(message) => {
            log::error!("event=app_open module=ffi status=error");
            ActionResponse::failure(message)
        }
    }
}

/// Stops the services and closes the database.
///
/// # FFI contract
/// - Closing an app that is not open reports [`NOT_OPEN_MESSAGE`].
#[flutter_rust_bridge::frb(sync)]
pub fn app_close() -> ActionResponse {
    let Some(app) = lock_app().take() else {
        return ActionResponse::failure(NOT_OPEN_MESSAGE);
    };
    let closed = app.store.close();
    app.runtime.shutdown_background();
    match closed {
        Ok(_) => ActionResponse::success("App closed."),
        Err(err) => ActionResponse::failure(format!("app_close failed: {err}")),
    }
}

/// Pet type catalog for pickers. Works without an open app.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_types() -> Vec<PetTypeItem> {
    default_pet_types()
        .into_iter()
        .map(|option| PetTypeItem {
            label: option.label,
            emoji: option.emoji,
        })
        .collect()
}

/// Adds a pet; a non-blank `owner_name` links it to that owner.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_add(
    name: String,
    pet_type: String,
    age: i64,
    owner_name: Option<String>,
) -> ActionResponse {
    let input = match validate_pet_input(&name, age) {
        Ok(input) => input,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    let new_pet = match non_blank(owner_name) {
        Some(owner) => NewPet::owned_by(input.name, pet_type, input.age, owner),
        None => NewPet::ownerless(input.name, pet_type, input.age),
    };
    with_app(|app| app.pet_action(|pets| async move { pets.add_pet(new_pet).await }))
}

/// Saves an edited pet. Changing `owner_name` moves it between owners.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_update(
    pet_id: String,
    name: String,
    pet_type: String,
    age: i64,
    owner_name: Option<String>,
) -> ActionResponse {
    let id = match parse_id(&pet_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let input = match validate_pet_input(&name, age) {
        Ok(input) => input,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    let owner_name = non_blank(owner_name);
    let pet = PetData {
        id,
        name: input.name,
        pet_type,
        age: input.age,
        has_owner: owner_name.is_some(),
        owner_name,
    };
    with_app(|app| app.pet_action(|pets| async move { pets.update_pet(pet).await }))
}

/// Deletes an ownerless pet.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_delete(pet_id: String) -> ActionResponse {
    let id = match parse_id(&pet_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    with_app(|app| app.pet_action(|pets| async move { pets.delete_pet(id).await }))
}

/// Adopts an ownerless pet into the owner called `owner_name`.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_adopt(pet_id: String, owner_name: String) -> ActionResponse {
    let id = match parse_id(&pet_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let owner_name = normalize_name(&owner_name);
    with_app(|app| app.pet_action(|pets| async move { pets.adopt_pet(id, owner_name).await }))
}

/// Updates the pet search text. The list follows after the debounce window.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_set_search(text: String) -> ActionResponse {
    with_app(|app| {
        app.pets.set_search_query(text);
        ActionResponse::success("")
    })
}

/// Latest pet list, filtered by the applied search text.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_current() -> Vec<PetItem> {
    read_app(|app| app.pets.pets().borrow().iter().map(to_pet_item).collect())
}

/// Names for the owner picker of the pet dialogs, unfiltered.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_owner_choices() -> Vec<String> {
    read_app(|app| {
        app.pets
            .owners()
            .borrow()
            .iter()
            .map(|owner| owner.name.clone())
            .collect()
    })
}

/// Adds an owner that takes the listed pets.
///
/// Unknown or malformed pet ids are skipped.
#[flutter_rust_bridge::frb(sync)]
pub fn owner_add(name: String, pet_ids: Vec<String>) -> ActionResponse {
    let name = match validate_owner_name(&name) {
        Ok(name) => name,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    with_app(|app| {
        let pets = match load_pets(&app.store, &pet_ids) {
            Ok(pets) => pets,
            Err(message) => return ActionResponse::failure(message),
        };
        let owner = OwnerData::new(name, pets);
        app.owner_action(|owners| async move { owners.add_owner(owner).await })
    })
}

/// Renames an owner; its pets follow the new name.
#[flutter_rust_bridge::frb(sync)]
pub fn owner_update(owner_id: String, name: String) -> ActionResponse {
    let id = match parse_id(&owner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let name = match validate_owner_name(&name) {
        Ok(name) => name,
        Err(err) => return ActionResponse::failure(err.to_string()),
    };
    let owner = OwnerData {
        id,
        name,
        pets: Vec::new(),
    };
    with_app(|app| app.owner_action(|owners| async move { owners.update_owner(owner).await }))
}

/// Deletes an owner; its pets become ownerless.
#[flutter_rust_bridge::frb(sync)]
pub fn owner_delete(owner_id: String) -> ActionResponse {
    let id = match parse_id(&owner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    with_app(|app| app.owner_action(|owners| async move { owners.delete_owner(id).await }))
}

/// Updates the owner search text. The list follows after the debounce window.
#[flutter_rust_bridge::frb(sync)]
pub fn owner_set_search(text: String) -> ActionResponse {
    with_app(|app| {
        app.owners.set_search_query(text);
        ActionResponse::success("")
    })
}

/// Latest owner list, filtered by the applied search text.
#[flutter_rust_bridge::frb(sync)]
pub fn owners_current() -> Vec<OwnerItem> {
    read_app(|app| {
        app.owners
            .owners()
            .borrow()
            .iter()
            .map(|owner| OwnerItem {
                id: owner.id.to_string(),
                name: owner.name.clone(),
                pets: owner.pets.iter().map(to_pet_item).collect(),
            })
            .collect()
    })
}

fn lock_app() -> MutexGuard<'static, Option<App>> {
    APP.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_app(f: impl FnOnce(&App) -> ActionResponse) -> ActionResponse {
    match lock_app().as_ref() {
        Some(app) => f(app),
        None => ActionResponse::failure(NOT_OPEN_MESSAGE),
    }
}

fn read_app<T: Default>(f: impl FnOnce(&App) -> T) -> T {
    lock_app().as_ref().map(f).unwrap_or_default()
}

fn parse_id(raw: &str) -> Result<Uuid, ActionResponse> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ActionResponse::failure(format!("Invalid id: {raw}")))
}

/// Owner name in the form `owner_add` stores it, or `None` when blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| normalize_name(&raw))
        .filter(|name| !name.is_empty())
}

fn load_pets(store: &Store, raw_ids: &[String]) -> Result<Vec<PetData>, String> {
    let ids: Vec<Uuid> = raw_ids
        .iter()
        .filter_map(|raw| Uuid::parse_str(raw.trim()).ok())
        .collect();
    store
        .with_connection(|conn| {
            let repo = SqlitePetRepository::try_new(conn)?;
            let mut pets = Vec::with_capacity(ids.len());
            for id in ids {
                pets.extend(repo.get_pet(id)?);
            }
            Ok::<_, petkeeper_core::RepoError>(pets)
        })
        .map_err(|err| format!("Error adding owner: {err}"))
}

fn to_pet_item(pet: &PetData) -> PetItem {
    PetItem {
        id: pet.id.to_string(),
        name: pet.name.clone(),
        pet_type: pet.pet_type.clone(),
        emoji: emoji_for(&pet.pet_type).to_string(),
        age: pet.age,
        has_owner: pet.has_owner,
        owner_name: pet.owner_name.clone(),
    }
}
