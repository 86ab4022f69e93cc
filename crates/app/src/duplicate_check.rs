//! Debounced "is this barcode already registered?" check for the item form.
//!
//! Each keystroke issues a new check; the lookup only runs once the input has
//! been stable for the settle delay, and a newer check aborts the pending one.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};

use almox_core::ItemId;
use almox_infra::{ItemRepository, StoreError};
use almox_inventory::normalize_codigo;

use crate::error::AppError;

/// Outcome of a completed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeCheck {
    /// Nothing to check (blank input).
    Blank,
    Available,
    /// Registered to another item.
    Taken { item_id: ItemId, nome: String },
}

/// A check that has been scheduled but may still be superseded.
#[derive(Debug)]
pub struct PendingCheck {
    handle: JoinHandle<Result<CodeCheck, StoreError>>,
}

impl PendingCheck {
    /// Wait for the result; `None` when a newer check (or `cancel`) aborted
    /// this one.
    pub async fn outcome(self) -> Option<Result<CodeCheck, AppError>> {
        match self.handle.await {
            Ok(result) => Some(result.map_err(AppError::from)),
            Err(err) if err.is_cancelled() => None,
            Err(err) => {
                tracing::error!(error = %err, "duplicate code check panicked");
                None
            }
        }
    }
}

pub struct DuplicateCodeCheck {
    items: ItemRepository,
    delay: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl DuplicateCodeCheck {
    pub fn new(items: ItemRepository, delay: Duration) -> Self {
        Self {
            items,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule a check for `codigo`, aborting any check still pending.
    ///
    /// `editing` is the item being edited, whose own barcode does not count
    /// as a duplicate. Must be called inside a Tokio runtime.
    pub fn check(&self, codigo: &str, editing: Option<ItemId>) -> PendingCheck {
        let codigo = normalize_codigo(Some(codigo));
        let items = self.items.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            let Some(codigo) = codigo else {
                return Ok(CodeCheck::Blank);
            };
            tokio::time::sleep(delay).await;

            let found = items.find_by_codigo(&codigo).await?;
            Ok(match found {
                Some(item) if editing.as_ref() != Some(&item.id) => {
                    tracing::debug!(codigo = %codigo, item_id = %item.id, "barcode already registered");
                    CodeCheck::Taken {
                        item_id: item.id.clone(),
                        nome: item.nome.clone(),
                    }
                }
                _ => CodeCheck::Available,
            })
        });

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(handle.abort_handle()) {
                previous.abort();
            }
        }

        PendingCheck { handle }
    }

    /// Abort the pending check, if any.
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
        }
    }
}

impl Drop for DuplicateCodeCheck {
    fn drop(&mut self) {
        self.cancel();
    }
}
