//! Application context and the signed-in session.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use almox_auth::{AuthUser, IdentityProvider, Permission, authorize};
use almox_core::ItemId;
use almox_infra::{DocumentStore, EntryRepository, ExitRepository, ItemRepository, Settings};
use almox_inventory::StoredItem;

use crate::clock::{Clock, SystemClock};
use crate::duplicate_check::DuplicateCodeCheck;
use crate::error::AppError;

/// Shared services every session is built from.
///
/// Cheap to clone; everything behind it is reference counted.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    settings: Arc<Settings>,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            identity,
            settings: Arc::new(settings),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current wall time in the configured local offset.
    pub fn local_now(&self) -> NaiveDateTime {
        self.now().with_timezone(&self.offset()).naive_local()
    }

    pub fn offset(&self) -> FixedOffset {
        self.settings.local_offset()
    }

    /// Authenticate and open a session with a warm item cache.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self.identity.login(email, password).await?;
        let session = Session::open(self.clone(), user);

        if session.user.can(Permission::ViewItems) {
            let items = session.items.list().await?;
            session.replace_cache(items);
        }

        tracing::info!(email = session.user.email(), "session opened");
        Ok(session)
    }
}

/// A signed-in user and the state scoped to their session.
///
/// Every use case is a method on the session and checks its permission
/// before touching the store.
pub struct Session {
    pub(crate) ctx: AppContext,
    pub(crate) user: AuthUser,
    pub(crate) items: ItemRepository,
    pub(crate) entries: EntryRepository,
    pub(crate) exits: ExitRepository,
    cache: RwLock<Vec<StoredItem>>,
}

impl Session {
    fn open(ctx: AppContext, user: AuthUser) -> Self {
        let store = Arc::clone(&ctx.store);
        Self {
            items: ItemRepository::new(Arc::clone(&store)),
            entries: EntryRepository::new(Arc::clone(&store)),
            exits: ExitRepository::new(store),
            ctx,
            user,
            cache: RwLock::new(Vec::new()),
        }
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Sign out and drop the session state.
    pub async fn logout(self) -> Result<(), AppError> {
        self.ctx.identity.logout().await?;
        tracing::info!(email = self.user.email(), "session closed");
        Ok(())
    }

    /// Debounced barcode check bound to this session's store.
    pub fn duplicate_code_check(&self) -> DuplicateCodeCheck {
        DuplicateCodeCheck::new(self.items.clone(), self.ctx.settings.duplicate_check_delay())
    }

    pub(crate) fn require(&self, permission: Permission) -> Result<(), AppError> {
        authorize(&self.user, permission)?;
        Ok(())
    }

    // A writer that panicked mid-update still leaves a whole `Vec` behind.
    fn cache_read(&self) -> RwLockReadGuard<'_, Vec<StoredItem>> {
        self.cache.read().unwrap_or_else(|poisoned| {
            tracing::error!("item cache lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn cache_write(&self) -> RwLockWriteGuard<'_, Vec<StoredItem>> {
        self.cache.write().unwrap_or_else(|poisoned| {
            tracing::error!("item cache lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Items as of the last read or write made through this session.
    pub fn cached_items(&self) -> Vec<StoredItem> {
        self.cache_read().clone()
    }

    pub(crate) fn replace_cache(&self, items: Vec<StoredItem>) {
        *self.cache_write() = items;
    }

    pub(crate) fn cache_put(&self, item: StoredItem) {
        let mut cache = self.cache_write();
        match cache.iter_mut().find(|c| c.id == item.id) {
            Some(slot) => *slot = item,
            None => cache.push(item),
        }
    }

    pub(crate) fn not_found(id: &ItemId) -> AppError {
        AppError::NotFound(format!("item {id}"))
    }
}
