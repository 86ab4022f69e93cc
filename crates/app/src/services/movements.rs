//! Stock entries and exits.
//!
//! Both are a read-modify-write of one item document followed by an append to
//! the ledger. The item write is conditional on the version that was read; on
//! a version conflict the item is re-read and the change re-applied, up to
//! `app.max_conflict_retries` times. When the append fails the item change is
//! undone the same way, so stock never moves without a ledger record.

use chrono::{DateTime, Utc};

use almox_auth::Permission;
use almox_core::{DomainResult, ExpectedVersion, ItemId};
use almox_infra::StoreError;
use almox_inventory::validation::{validate_entry, validate_exit};
use almox_inventory::{
    BatchConsumed, Entry, Exit, Item, NewEntry, NewExit, StoredEntry, StoredExit, StoredItem,
    normalize_codigo,
};

use crate::context::Session;
use crate::error::AppError;

impl Session {
    async fn modify_item<R>(
        &self,
        id: &ItemId,
        mut change: impl FnMut(&mut Item, DateTime<Utc>) -> DomainResult<R>,
    ) -> Result<(StoredItem, R), AppError> {
        let max_retries = self.ctx.settings().app.max_conflict_retries;
        let mut attempt = 0;

        loop {
            let current = self.items.get(id).await?.ok_or_else(|| Self::not_found(id))?;
            let mut item = current.record.clone();
            let outcome = change(&mut item, self.ctx.now())?;

            match self
                .items
                .save(id, &item, ExpectedVersion::Exact(current.version))
                .await
            {
                Ok(saved) => {
                    self.cache_put(saved.clone());
                    return Ok((saved, outcome));
                }
                Err(StoreError::Conflict(reason)) if attempt < max_retries => {
                    attempt += 1;
                    tracing::warn!(item_id = %id, attempt, reason = %reason, "item changed concurrently; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Undo an item change whose ledger record could not be appended.
    pub(crate) async fn revert_item(
        &self,
        id: &ItemId,
        undo: impl FnMut(&mut Item, DateTime<Utc>) -> DomainResult<()>,
    ) {
        match self.modify_item(id, undo).await {
            Ok((item, ())) => {
                tracing::warn!(item_id = %id, estoque = item.quantidade(), "ledger append failed; item change reverted");
            }
            Err(err) => {
                tracing::error!(item_id = %id, error = %err, "ledger append failed and the item change could not be reverted");
            }
        }
    }

    /// Resolve the item an entry targets: barcode first, then exact name.
    async fn entry_target(&self, draft: &NewEntry) -> Result<StoredItem, AppError> {
        if let Some(codigo) = normalize_codigo(draft.codigo.as_deref()) {
            if let Some(item) = self.items.find_by_codigo(&codigo).await? {
                return Ok(item);
            }
        }
        if let Some(nome) = draft.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if let Some(item) = self.items.find_by_nome(nome).await? {
                return Ok(item);
            }
        }
        Err(AppError::NotFound("item".to_string()))
    }

    /// Resolve the item an exit targets: explicit id first, then barcode.
    async fn exit_target(&self, draft: &NewExit) -> Result<StoredItem, AppError> {
        if let Some(id) = draft.item_id.as_ref() {
            if let Some(item) = self.items.get(id).await? {
                return Ok(item);
            }
        }
        if let Some(codigo) = normalize_codigo(draft.codigo.as_deref()) {
            if let Some(item) = self.items.find_by_codigo(&codigo).await? {
                return Ok(item);
            }
        }
        Err(AppError::NotFound("item".to_string()))
    }

    /// Receive stock into an existing item.
    pub async fn record_entry(&self, draft: NewEntry) -> Result<StoredEntry, AppError> {
        self.require(Permission::CreateEntry)?;
        validate_entry(&draft).into_result()?;
        let quantidade = draft.quantidade.unwrap_or_default();

        let target = self.entry_target(&draft).await?;
        let (item, ()) = self
            .modify_item(&target.id, |item, now| item.receive(quantidade, draft.validade, now))
            .await?;

        let entry = Entry::record(
            item.id.clone(),
            &item.record,
            &draft,
            quantidade,
            Some(self.user.email()),
            self.ctx.now(),
        );
        let stored = match self.entries.append(&entry).await {
            Ok(stored) => stored,
            Err(err) => {
                self.revert_item(&item.id, |item, now| {
                    item.revert_receipt(quantidade, draft.validade, now)
                })
                .await;
                return Err(err.into());
            }
        };

        tracing::info!(
            entry_id = %stored.id,
            item_id = %item.id,
            quantidade,
            estoque = item.quantidade(),
            "entry recorded"
        );
        Ok(stored)
    }

    /// Dispatch stock, consuming the soonest-expiring batches first.
    ///
    /// Rejected atomically with `InsufficientStock` when the batches cannot
    /// cover the request; the item is left untouched.
    pub async fn record_exit(&self, draft: NewExit) -> Result<StoredExit, AppError> {
        self.require(Permission::CreateExit)?;
        validate_exit(&draft).into_result()?;
        let quantidade = draft.quantidade.unwrap_or_default();

        let target = self.exit_target(&draft).await?;
        let (item, consumed): (StoredItem, Vec<BatchConsumed>) = self
            .modify_item(&target.id, |item, now| item.consume(quantidade, now))
            .await
            .inspect_err(|err| {
                if let AppError::InsufficientStock { requested, available } = err {
                    tracing::warn!(item_id = %target.id, requested, available, "exit rejected: insufficient stock");
                }
            })?;

        let exit = Exit::record(
            item.id.clone(),
            &item.record,
            &draft,
            quantidade,
            consumed,
            Some(self.user.email()),
            self.ctx.now(),
        );
        let stored = match self.exits.append(&exit).await {
            Ok(stored) => stored,
            Err(err) => {
                self.revert_item(&item.id, |item, now| item.restore(&exit.batches_consumed, now))
                    .await;
                return Err(err.into());
            }
        };

        tracing::info!(
            exit_id = %stored.id,
            item_id = %item.id,
            quantidade,
            lotes = stored.batches_consumed.len(),
            estoque = item.quantidade(),
            "exit recorded"
        );
        Ok(stored)
    }
}
