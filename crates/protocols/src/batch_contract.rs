//! Entry payloads of the `batch` module.

use crate::adapters::u256_arg;
use crate::error::AdapterError;
use crate::payload::TransactionPayload;
use primitive_types::U256;
use serde_json::{Value, json};

/// One position of a `batch_hyperion` call. Ticks are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub token_a: String,
    pub token_b: String,
    pub fee_tier: u8,
    pub tick_lower: u32,
    pub tick_upper: u32,
    pub current_tick: u32,
    pub amount_a: U256,
    pub amount_b: U256,
}

/// Parallel argument arrays of `batch::batch_hyperion`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchHyperionArgs {
    pub token_a: Vec<String>,
    pub token_b: Vec<String>,
    pub fee_tier: Vec<u8>,
    pub tick_lower: Vec<u32>,
    pub tick_upper: Vec<u32>,
    pub current_price_input: Vec<u32>,
    pub amount_a: Vec<U256>,
    pub amount_b: Vec<U256>,
}

impl BatchHyperionArgs {
    pub fn push(&mut self, entry: BatchEntry) {
        self.token_a.push(entry.token_a);
        self.token_b.push(entry.token_b);
        self.fee_tier.push(entry.fee_tier);
        self.tick_lower.push(entry.tick_lower);
        self.tick_upper.push(entry.tick_upper);
        self.current_price_input.push(entry.current_tick);
        self.amount_a.push(entry.amount_a);
        self.amount_b.push(entry.amount_b);
    }

    pub fn len(&self) -> usize {
        self.token_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_a.is_empty()
    }

    fn lengths(&self) -> [usize; 8] {
        [
            self.token_a.len(),
            self.token_b.len(),
            self.fee_tier.len(),
            self.tick_lower.len(),
            self.tick_upper.len(),
            self.current_price_input.len(),
            self.amount_a.len(),
            self.amount_b.len(),
        ]
    }

    /// Fails when the arrays disagree in length.
    pub fn validate(&self) -> Result<(), AdapterError> {
        let lengths = self.lengths();
        if lengths.iter().any(|len| *len != lengths[0]) {
            return Err(AdapterError::InvalidPayload(format!(
                "batch arrays have mismatched lengths {lengths:?}"
            )));
        }
        Ok(())
    }
}

impl FromIterator<BatchEntry> for BatchHyperionArgs {
    fn from_iter<I: IntoIterator<Item = BatchEntry>>(iter: I) -> Self {
        let mut args = Self::default();
        for entry in iter {
            args.push(entry);
        }
        args
    }
}

/// Opens every position of `args` in one transaction.
pub fn batch_hyperion(contract: &str, args: &BatchHyperionArgs) -> Result<TransactionPayload, AdapterError> {
    args.validate()?;
    let arguments = vec![
        json!(args.token_a),
        json!(args.token_b),
        json!(args.fee_tier),
        json!(args.tick_lower),
        json!(args.tick_upper),
        json!(args.current_price_input),
        Value::Array(args.amount_a.iter().copied().map(u256_arg).collect()),
        Value::Array(args.amount_b.iter().copied().map(u256_arg).collect()),
    ];
    Ok(TransactionPayload::new(
        format!("{contract}::batch::batch_hyperion"),
        Vec::new(),
        arguments,
    ))
}

/// Closes a single position.
pub fn remove_hyperion(contract: &str, position_id: &str) -> TransactionPayload {
    TransactionPayload::new(
        format!("{contract}::batch::remove_hyperion"),
        Vec::new(),
        vec![json!(position_id)],
    )
}

pub fn remove_all_hyperion(contract: &str, position_ids: &[String]) -> TransactionPayload {
    TransactionPayload::new(
        format!("{contract}::batch::remove_all_hyperion"),
        Vec::new(),
        vec![json!(position_ids)],
    )
}

/// Claims fees and rewards of every listed position.
pub fn batch_claim_hyperion(contract: &str, position_ids: &[String]) -> TransactionPayload {
    TransactionPayload::new(
        format!("{contract}::batch::batch_claim_hyperion"),
        Vec::new(),
        vec![json!(position_ids)],
    )
}
