//! Stock movements: the append-only ledger of entries and exits.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use almox_core::ItemId;

use crate::item::{Item, normalize_codigo};

/// One line of an exit's batch breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConsumed {
    pub validity: Option<NaiveDate>,
    pub consumed: f64,
}

impl BatchConsumed {
    pub fn new(validity: Option<NaiveDate>, consumed: f64) -> Self {
        Self { validity, consumed }
    }
}

/// Candidate entry submitted by the receiving form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEntry {
    pub codigo: Option<String>,
    pub nome: Option<String>,
    pub quantidade: Option<f64>,
    pub validade: Option<NaiveDate>,
    pub fornecedor: Option<String>,
    pub observacao: Option<String>,
}

/// Candidate exit submitted by the dispatch form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewExit {
    pub codigo: Option<String>,
    pub item_id: Option<ItemId>,
    pub quantidade: Option<f64>,
    pub setor_destino: Option<String>,
    pub retirado_por: Option<String>,
    pub observacao: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Recorded stock increase. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub item_id: ItemId,
    #[serde(default)]
    pub codigo: Option<String>,
    pub nome: String,
    pub quantidade: f64,
    #[serde(default)]
    pub validade: Option<NaiveDate>,
    #[serde(default)]
    pub fornecedor: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub registrado_por: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Build the ledger record for an already validated entry against `item`.
    pub fn record(
        item_id: ItemId,
        item: &Item,
        draft: &NewEntry,
        quantidade: f64,
        registrado_por: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            codigo: item
                .codigo
                .clone()
                .or_else(|| normalize_codigo(draft.codigo.as_deref())),
            nome: item.nome.clone(),
            quantidade,
            validade: draft.validade,
            fornecedor: non_blank(draft.fornecedor.as_deref()),
            observacao: non_blank(draft.observacao.as_deref()),
            registrado_por: registrado_por.map(str::to_string),
            created_at: now,
        }
    }
}

impl AsRef<Entry> for Entry {
    fn as_ref(&self) -> &Entry {
        self
    }
}

/// Recorded stock decrease with its batch breakdown. Never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exit {
    pub item_id: ItemId,
    #[serde(default)]
    pub codigo: Option<String>,
    pub nome: String,
    pub quantidade: f64,
    pub setor_destino: String,
    #[serde(default)]
    pub retirado_por: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub batches_consumed: Vec<BatchConsumed>,
    #[serde(default)]
    pub registrado_por: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exit {
    /// Build the ledger record for an already validated exit against `item`.
    pub fn record(
        item_id: ItemId,
        item: &Item,
        draft: &NewExit,
        quantidade: f64,
        batches_consumed: Vec<BatchConsumed>,
        registrado_por: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            codigo: item.codigo.clone(),
            nome: item.nome.clone(),
            quantidade,
            setor_destino: non_blank(draft.setor_destino.as_deref()).unwrap_or_default(),
            retirado_por: non_blank(draft.retirado_por.as_deref()),
            observacao: non_blank(draft.observacao.as_deref()),
            batches_consumed,
            registrado_por: registrado_por.map(str::to_string),
            created_at: now,
        }
    }
}

impl AsRef<Exit> for Exit {
    fn as_ref(&self) -> &Exit {
        self
    }
}
