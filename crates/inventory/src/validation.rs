//! Field-level validation of candidate items, entries and exits.
//!
//! Every rule runs; failures accumulate in field order (identity, quantity,
//! destination) so the UI can show all of them at once.

use almox_core::{DomainError, DomainResult};

use crate::item::NewItem;
use crate::movement::{NewEntry, NewExit};

pub const NOME_OBRIGATORIO: &str = "Nome é obrigatório";
pub const QUANTIDADE_NEGATIVA: &str = "Quantidade não pode ser negativa";
pub const CODIGO_OU_NOME_OBRIGATORIO: &str = "Código de barras ou nome do item é obrigatório";
pub const QUANTIDADE_POSITIVA: &str = "Quantidade deve ser um número positivo";
pub const ITEM_OBRIGATORIO: &str = "Informe um código de barras ou selecione o item";
pub const SETOR_OBRIGATORIO: &str = "Setor destino é obrigatório";

/// Outcome of validating one candidate record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn require(&mut self, ok: bool, message: &str) {
        if !ok {
            self.errors.push(message.to_string());
        }
    }

    /// Convert into a domain result, carrying every message on failure.
    pub fn into_result(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(self.errors))
        }
    }
}

/// True iff the quantity is present, finite and strictly positive.
pub fn is_valid_quantidade(quantidade: Option<f64>) -> bool {
    matches!(quantidade, Some(q) if q.is_finite() && q > 0.0)
}

/// Parse a quantity typed into a form.
///
/// Accepts the pt-BR decimal comma. Text that is not a number yields `None`,
/// which [`is_valid_quantidade`] rejects like any other invalid quantity.
pub fn parse_quantidade(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse::<f64>().ok()
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

pub fn validate_item(item: &NewItem) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.require(!item.nome.trim().is_empty(), NOME_OBRIGATORIO);
    result.require(
        !matches!(item.quantidade, Some(q) if q < 0.0),
        QUANTIDADE_NEGATIVA,
    );
    result
}

pub fn validate_entry(entry: &NewEntry) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.require(
        has_text(entry.codigo.as_deref()) || has_text(entry.nome.as_deref()),
        CODIGO_OU_NOME_OBRIGATORIO,
    );
    result.require(is_valid_quantidade(entry.quantidade), QUANTIDADE_POSITIVA);
    result
}

pub fn validate_exit(exit: &NewExit) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.require(
        has_text(exit.codigo.as_deref()) || exit.item_id.is_some(),
        ITEM_OBRIGATORIO,
    );
    result.require(is_valid_quantidade(exit.quantidade), QUANTIDADE_POSITIVA);
    result.require(has_text(exit.setor_destino.as_deref()), SETOR_OBRIGATORIO);
    result
}
