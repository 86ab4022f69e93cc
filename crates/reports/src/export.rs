//! Spreadsheet (CSV) export of items, entries and exits.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::FixedOffset;
use serde::Serialize;
use thiserror::Error;

use almox_inventory::{Entry, Exit, Item};

use crate::format::{format_batches_consumed, format_date, format_day, format_quantidade};

/// Byte-order mark so spreadsheet apps pick up UTF-8 accents.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Inventory sheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    #[serde(rename = "Código")]
    pub codigo: String,
    #[serde(rename = "Nome")]
    pub nome: String,
    #[serde(rename = "Categoria")]
    pub categoria: String,
    #[serde(rename = "Unidade")]
    pub unidade: String,
    #[serde(rename = "Local")]
    pub local: String,
    #[serde(rename = "Fornecedor")]
    pub fornecedor: String,
    #[serde(rename = "Quantidade")]
    pub quantidade: String,
    #[serde(rename = "Estoque Mínimo")]
    pub estoque_minimo: String,
    #[serde(rename = "Validades")]
    pub validades: String,
}

impl ItemRow {
    pub fn from_item(item: &Item) -> Self {
        let validades = item
            .validades()
            .iter()
            .map(|b| match b.validade {
                Some(day) => format!("{}: {}", format_day(Some(day)), format_quantidade(b.quantidade)),
                None => format!("Sem validade: {}", format_quantidade(b.quantidade)),
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            codigo: item.codigo.clone().unwrap_or_default(),
            nome: item.nome.clone(),
            categoria: item.categoria.label().to_string(),
            unidade: item.unidade.clone(),
            local: item.local.clone(),
            fornecedor: item.fornecedor.clone(),
            quantidade: format_quantidade(item.quantidade()),
            estoque_minimo: item.estoque_minimo.map(format_quantidade).unwrap_or_default(),
            validades,
        }
    }
}

/// Entry history row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRow {
    #[serde(rename = "Data")]
    pub data: String,
    #[serde(rename = "Código")]
    pub codigo: String,
    #[serde(rename = "Item")]
    pub nome: String,
    #[serde(rename = "Quantidade")]
    pub quantidade: String,
    #[serde(rename = "Validade")]
    pub validade: String,
    #[serde(rename = "Fornecedor")]
    pub fornecedor: String,
    #[serde(rename = "Observação")]
    pub observacao: String,
    #[serde(rename = "Registrado por")]
    pub registrado_por: String,
}

impl EntryRow {
    pub fn from_entry(entry: &Entry, offset: &FixedOffset) -> Self {
        Self {
            data: format_date(Some(&entry.created_at), offset),
            codigo: entry.codigo.clone().unwrap_or_default(),
            nome: entry.nome.clone(),
            quantidade: format_quantidade(entry.quantidade),
            validade: format_day(entry.validade),
            fornecedor: entry.fornecedor.clone().unwrap_or_default(),
            observacao: entry.observacao.clone().unwrap_or_default(),
            registrado_por: entry.registrado_por.clone().unwrap_or_default(),
        }
    }
}

/// Exit history row; the lot breakdown is a multi-line cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitRow {
    #[serde(rename = "Data")]
    pub data: String,
    #[serde(rename = "Código")]
    pub codigo: String,
    #[serde(rename = "Item")]
    pub nome: String,
    #[serde(rename = "Quantidade")]
    pub quantidade: String,
    #[serde(rename = "Setor Destino")]
    pub setor_destino: String,
    #[serde(rename = "Retirado por")]
    pub retirado_por: String,
    #[serde(rename = "Lotes Consumidos")]
    pub lotes: String,
    #[serde(rename = "Observação")]
    pub observacao: String,
    #[serde(rename = "Registrado por")]
    pub registrado_por: String,
}

impl ExitRow {
    pub fn from_exit(exit: &Exit, offset: &FixedOffset) -> Self {
        Self {
            data: format_date(Some(&exit.created_at), offset),
            codigo: exit.codigo.clone().unwrap_or_default(),
            nome: exit.nome.clone(),
            quantidade: format_quantidade(exit.quantidade),
            setor_destino: exit.setor_destino.clone(),
            retirado_por: exit.retirado_por.clone().unwrap_or_default(),
            lotes: format_batches_consumed(&exit.batches_consumed),
            observacao: exit.observacao.clone().unwrap_or_default(),
            registrado_por: exit.registrado_por.clone().unwrap_or_default(),
        }
    }
}

fn write_rows<W: Write, R: Serialize>(writer: W, rows: &[R]) -> Result<W, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Render rows as CSV text with a header line.
///
/// An empty row set is an error; there is no header-only export.
pub fn to_csv_string<R: Serialize>(rows: &[R]) -> Result<String, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let bytes = write_rows(Vec::new(), rows)?;
    Ok(String::from_utf8(bytes)?)
}

/// Write rows to `path` as a UTF-8 (BOM-prefixed) CSV file.
///
/// Returns the number of data rows written. Nothing is created when `rows`
/// is empty.
pub fn export_csv<R: Serialize>(rows: &[R], path: impl AsRef<Path>) -> Result<usize, ExportError> {
    let path = path.as_ref();
    if rows.is_empty() {
        tracing::warn!(path = %path.display(), "export skipped: no rows");
        return Err(ExportError::Empty);
    }

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    let mut file = write_rows(file, rows)?;
    file.flush()?;

    tracing::info!(path = %path.display(), rows = rows.len(), "csv exported");
    Ok(rows.len())
}
