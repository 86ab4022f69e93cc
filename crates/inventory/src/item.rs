use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use almox_core::{DomainError, DomainResult};

use crate::consumption::{self, QUANTITY_EPSILON, snap};
use crate::movement::BatchConsumed;
use crate::validation::{self, QUANTIDADE_POSITIVA};

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Categoria {
    #[serde(rename = "Material de Expediente")]
    Expediente,
    #[serde(rename = "Limpeza")]
    Limpeza,
    #[serde(rename = "Copa e Cozinha")]
    CopaCozinha,
    #[serde(rename = "Informática")]
    Informatica,
    #[serde(rename = "Manutenção")]
    Manutencao,
    #[serde(rename = "Medicamentos")]
    Medicamentos,
    #[default]
    #[serde(rename = "Outros")]
    Outros,
}

impl Categoria {
    pub fn label(&self) -> &'static str {
        match self {
            Categoria::Expediente => "Material de Expediente",
            Categoria::Limpeza => "Limpeza",
            Categoria::CopaCozinha => "Copa e Cozinha",
            Categoria::Informatica => "Informática",
            Categoria::Manutencao => "Manutenção",
            Categoria::Medicamentos => "Medicamentos",
            Categoria::Outros => "Outros",
        }
    }
}

impl core::fmt::Display for Categoria {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A lot of one item sharing a single expiry date (`None` = no expiry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub quantidade: f64,
    #[serde(default)]
    pub validade: Option<NaiveDate>,
}

impl Batch {
    pub fn new(quantidade: f64, validade: Option<NaiveDate>) -> Self {
        Self { quantidade, validade }
    }
}

/// Candidate item submitted by the catalog form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewItem {
    pub nome: String,
    pub codigo: Option<String>,
    pub categoria: Categoria,
    pub unidade: String,
    pub local: String,
    pub fornecedor: String,
    pub quantidade: Option<f64>,
    /// Expiry of the initial stock, if any.
    pub validade: Option<NaiveDate>,
    pub estoque_minimo: Option<f64>,
}

/// Edit of an item's descriptive fields. Stock only moves through entries
/// and exits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub nome: Option<String>,
    /// `Some(None)` clears the barcode.
    pub codigo: Option<Option<String>>,
    pub categoria: Option<Categoria>,
    pub unidade: Option<String>,
    pub local: Option<String>,
    pub fornecedor: Option<String>,
    pub estoque_minimo: Option<Option<f64>>,
}

/// Trim a barcode; blank means "no barcode".
pub fn normalize_codigo(codigo: Option<&str>) -> Option<String> {
    codigo
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Catalog item with its batch breakdown.
///
/// # Invariants
/// - `quantidade` equals the sum of batch quantities.
/// - `quantidade` is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub nome: String,
    #[serde(default)]
    pub codigo: Option<String>,
    #[serde(default)]
    pub categoria: Categoria,
    #[serde(default)]
    pub unidade: String,
    #[serde(default)]
    pub local: String,
    #[serde(default)]
    pub fornecedor: String,
    quantidade: f64,
    #[serde(default)]
    validades: Vec<Batch>,
    #[serde(default)]
    pub estoque_minimo: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a new catalog item from a validated form.
    ///
    /// A positive initial quantity becomes the item's first batch.
    pub fn create(draft: NewItem, now: DateTime<Utc>) -> DomainResult<Self> {
        validation::validate_item(&draft).into_result()?;

        let quantidade = draft.quantidade.unwrap_or(0.0);
        if !quantidade.is_finite() {
            return Err(DomainError::invariant("quantidade must be finite"));
        }

        let validades = if quantidade > 0.0 {
            vec![Batch::new(quantidade, draft.validade)]
        } else {
            Vec::new()
        };

        Ok(Self {
            nome: draft.nome.trim().to_string(),
            codigo: normalize_codigo(draft.codigo.as_deref()),
            categoria: draft.categoria,
            unidade: draft.unidade.trim().to_string(),
            local: draft.local.trim().to_string(),
            fornecedor: draft.fornecedor.trim().to_string(),
            quantidade,
            validades,
            estoque_minimo: draft.estoque_minimo,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn quantidade(&self) -> f64 {
        self.quantidade
    }

    pub fn validades(&self) -> &[Batch] {
        &self.validades
    }

    /// Sum of batch quantities (should equal `quantidade`).
    pub fn batch_total(&self) -> f64 {
        consumption::available(&self.validades)
    }

    /// Apply an edit to the descriptive fields.
    pub fn apply_patch(&mut self, patch: ItemPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(nome) = patch.nome {
            if nome.trim().is_empty() {
                return Err(DomainError::validation(vec![
                    validation::NOME_OBRIGATORIO.to_string(),
                ]));
            }
            self.nome = nome.trim().to_string();
        }
        if let Some(codigo) = patch.codigo {
            self.codigo = normalize_codigo(codigo.as_deref());
        }
        if let Some(categoria) = patch.categoria {
            self.categoria = categoria;
        }
        if let Some(unidade) = patch.unidade {
            self.unidade = unidade.trim().to_string();
        }
        if let Some(local) = patch.local {
            self.local = local.trim().to_string();
        }
        if let Some(fornecedor) = patch.fornecedor {
            self.fornecedor = fornecedor.trim().to_string();
        }
        if let Some(estoque_minimo) = patch.estoque_minimo {
            self.estoque_minimo = estoque_minimo;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Add received stock, merging into the batch with the same expiry.
    pub fn receive(
        &mut self,
        quantidade: f64,
        validade: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !validation::is_valid_quantidade(Some(quantidade)) {
            return Err(DomainError::validation(vec![QUANTIDADE_POSITIVA.to_string()]));
        }

        match self.validades.iter_mut().find(|b| b.validade == validade) {
            Some(batch) => batch.quantidade += quantidade,
            None => self.validades.push(Batch::new(quantidade, validade)),
        }
        self.quantidade += quantidade;
        self.updated_at = now;
        Ok(())
    }

    /// Take `requested` units out, soonest-expiring batches first.
    ///
    /// Fails with `InsufficientStock` and leaves the item untouched when the
    /// batches cannot cover the request.
    pub fn consume(&mut self, requested: f64, now: DateTime<Utc>) -> DomainResult<Vec<BatchConsumed>> {
        let outcome = consumption::consume_batches(&self.validades, requested)?;

        self.validades = outcome.batches;
        self.quantidade = snap(self.quantidade - requested);
        if self.quantidade < QUANTITY_EPSILON {
            self.quantidade = 0.0;
        }
        self.updated_at = now;
        Ok(outcome.consumed)
    }

    /// Take back a receipt whose entry could not be recorded.
    ///
    /// Fails and leaves the item untouched when the lot it went into no
    /// longer holds `quantidade`.
    pub fn revert_receipt(
        &mut self,
        quantidade: f64,
        validade: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let Some(batch) = self.validades.iter_mut().find(|b| b.validade == validade) else {
            return Err(DomainError::invariant("no lot matches the reverted receipt"));
        };
        if batch.quantidade + QUANTITY_EPSILON < quantidade {
            return Err(DomainError::InsufficientStock {
                requested: quantidade,
                available: batch.quantidade,
            });
        }

        batch.quantidade = snap(batch.quantidade - quantidade);
        self.quantidade = snap(self.quantidade - quantidade);
        self.updated_at = now;
        Ok(())
    }

    /// Put consumed stock back into the lots it was taken from.
    pub fn restore(&mut self, consumed: &[BatchConsumed], now: DateTime<Utc>) -> DomainResult<()> {
        if !consumed.iter().all(|line| validation::is_valid_quantidade(Some(line.consumed))) {
            return Err(DomainError::validation(vec![QUANTIDADE_POSITIVA.to_string()]));
        }
        for line in consumed {
            self.receive(line.consumed, line.validity, now)?;
        }
        Ok(())
    }
}

impl AsRef<Item> for Item {
    fn as_ref(&self) -> &Item {
        self
    }
}
