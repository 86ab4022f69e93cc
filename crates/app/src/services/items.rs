//! Catalog use cases.

use almox_auth::Permission;
use almox_core::{ExpectedVersion, ItemId};
use almox_inventory::{Entry, Item, ItemPatch, NewEntry, NewItem, StoredItem, normalize_codigo};

use crate::context::Session;
use crate::error::AppError;

/// Observation recorded on the entry that seeds a new item's stock.
pub const ESTOQUE_INICIAL: &str = "Estoque inicial";

impl Session {
    /// Every catalog item, refreshing the session cache.
    pub async fn list_items(&self) -> Result<Vec<StoredItem>, AppError> {
        self.require(Permission::ViewItems)?;
        let items = self.items.list().await?;
        tracing::debug!(count = items.len(), "items loaded");
        self.replace_cache(items.clone());
        Ok(items)
    }

    /// Exact barcode lookup (scanner input).
    pub async fn find_by_codigo(&self, codigo: &str) -> Result<Option<StoredItem>, AppError> {
        self.require(Permission::ViewItems)?;
        let Some(codigo) = normalize_codigo(Some(codigo)) else {
            return Ok(None);
        };
        Ok(self.items.find_by_codigo(&codigo).await?)
    }

    async fn ensure_code_is_free(&self, codigo: &str, editing: Option<&ItemId>) -> Result<(), AppError> {
        if let Some(existing) = self.items.find_by_codigo(codigo).await? {
            if editing != Some(&existing.id) {
                tracing::warn!(codigo = %codigo, existing = %existing.id, "duplicate barcode rejected");
                return Err(AppError::DuplicateCode(codigo.to_string()));
            }
        }
        Ok(())
    }

    /// Register a new item.
    ///
    /// A positive initial quantity becomes the item's first batch and is
    /// also recorded as an entry, so the ledger accounts for it. If that
    /// entry cannot be recorded the item stays registered with no stock.
    pub async fn create_item(&self, draft: NewItem) -> Result<StoredItem, AppError> {
        self.require(Permission::CreateItems)?;
        let now = self.ctx.now();

        let seed = NewEntry {
            codigo: draft.codigo.clone(),
            nome: Some(draft.nome.clone()),
            quantidade: draft.quantidade,
            validade: draft.validade,
            fornecedor: Some(draft.fornecedor.clone()),
            observacao: Some(ESTOQUE_INICIAL.to_string()),
        };

        let item = Item::create(draft, now)?;
        if let Some(codigo) = item.codigo.as_deref() {
            self.ensure_code_is_free(codigo, None).await?;
        }

        let stored = self.items.insert(&item).await?;
        if stored.quantidade() > 0.0 {
            let entry = Entry::record(
                stored.id.clone(),
                &stored.record,
                &seed,
                stored.quantidade(),
                Some(self.user.email()),
                now,
            );
            if let Err(err) = self.entries.append(&entry).await {
                let seeded = stored.quantidade();
                self.revert_item(&stored.id, |item, now| {
                    item.revert_receipt(seeded, entry.validade, now)
                })
                .await;
                return Err(err.into());
            }
        }

        tracing::info!(item_id = %stored.id, nome = %stored.nome, quantidade = stored.quantidade(), "item created");
        self.cache_put(stored.clone());
        Ok(stored)
    }

    /// Edit descriptive fields. Stock and batches are only changed by
    /// entries and exits.
    pub async fn update_item(&self, id: &ItemId, patch: ItemPatch) -> Result<StoredItem, AppError> {
        self.require(Permission::CreateItems)?;

        let current = self.items.get(id).await?.ok_or_else(|| Self::not_found(id))?;
        if let Some(codigo) = patch.codigo.as_ref().and_then(|c| normalize_codigo(c.as_deref())) {
            if current.codigo.as_deref() != Some(codigo.as_str()) {
                self.ensure_code_is_free(&codigo, Some(id)).await?;
            }
        }

        let mut item = current.record.clone();
        item.apply_patch(patch, self.ctx.now())?;
        let saved = self
            .items
            .save(id, &item, ExpectedVersion::Exact(current.version))
            .await?;

        tracing::info!(item_id = %saved.id, version = saved.version, "item updated");
        self.cache_put(saved.clone());
        Ok(saved)
    }
}
