//! FIFO-by-expiry batch consumption.
//!
//! Batches are consumed soonest expiry first; batches without an expiry go
//! last. Equal expiries keep their stored relative order. The whole request
//! is rejected up front when the batches cannot cover it, so a failed call
//! never leaves a partially consumed list behind.

use chrono::NaiveDate;

use almox_core::{DomainError, DomainResult};

use crate::item::Batch;
use crate::movement::BatchConsumed;
use crate::validation::{QUANTIDADE_POSITIVA, is_valid_quantidade};

/// Residues below this are treated as zero.
pub const QUANTITY_EPSILON: f64 = 1e-9;

/// Round float residue (e.g. `0.3 - 0.1 - 0.2`) to zero.
pub(crate) fn snap(value: f64) -> f64 {
    if value.abs() < QUANTITY_EPSILON { 0.0 } else { value }
}

/// Result of consuming a request against a batch list.
#[derive(Debug, Clone, PartialEq)]
pub struct Consumption {
    /// Batches in their stored order, with quantities decremented.
    pub batches: Vec<Batch>,
    /// Per-batch amounts taken, in consumption order.
    pub consumed: Vec<BatchConsumed>,
}

impl Consumption {
    pub fn total_consumed(&self) -> f64 {
        self.consumed.iter().map(|c| c.consumed).sum()
    }
}

/// Total quantity held by the batches (negative quantities count as zero).
pub fn available(batches: &[Batch]) -> f64 {
    batches.iter().map(|b| b.quantidade.max(0.0)).sum()
}

fn expiry_key(batch: &Batch) -> (bool, Option<NaiveDate>) {
    (batch.validade.is_none(), batch.validade)
}

/// Consume `requested` units from `batches`.
pub fn consume_batches(batches: &[Batch], requested: f64) -> DomainResult<Consumption> {
    if !is_valid_quantidade(Some(requested)) {
        return Err(DomainError::validation(vec![QUANTIDADE_POSITIVA.to_string()]));
    }

    let available = available(batches);
    if requested > available + QUANTITY_EPSILON {
        return Err(DomainError::InsufficientStock {
            requested,
            available,
        });
    }

    // `sort_by_key` is stable: equal expiries keep stored order.
    let mut order: Vec<usize> = (0..batches.len()).collect();
    order.sort_by_key(|&i| expiry_key(&batches[i]));

    let mut updated = batches.to_vec();
    let mut consumed = Vec::new();
    let mut remaining = requested;

    for i in order {
        if remaining <= QUANTITY_EPSILON {
            break;
        }
        let batch = &mut updated[i];
        if batch.quantidade <= QUANTITY_EPSILON {
            continue;
        }

        let take = remaining.min(batch.quantidade);
        batch.quantidade = snap(batch.quantidade - take);
        remaining = snap(remaining - take);
        consumed.push(BatchConsumed::new(batch.validade, take));
    }

    Ok(Consumption {
        batches: updated,
        consumed,
    })
}
