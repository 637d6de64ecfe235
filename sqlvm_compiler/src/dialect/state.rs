//! Per-compilation dialect state
//!
//! Owned by the caller of a compilation and threaded through every dialect
//! operation. Two compilations never share a `DialectState`.

use crate::config::compile_time::dialect::{
    DEFAULT_STEP_BITS, MAX_LABELS_PER_REGION, MAX_STEP_BITS,
};
use crate::dialect::error::{DialectError, DialectResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectState {
    program_counter: i64,
    labels: BTreeMap<String, i64>,
    step_bits: u32,
}

impl Default for DialectState {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectState {
    pub fn new() -> Self {
        Self {
            program_counter: -1,
            labels: BTreeMap::new(),
            step_bits: DEFAULT_STEP_BITS,
        }
    }

    /// Start a new program: counter back to -1, labels cleared.
    /// The step budget is left alone.
    pub fn begin_program(&mut self) {
        self.program_counter = -1;
        self.labels.clear();
    }

    /// Move to the next instruction and return its index
    pub fn advance(&mut self) -> i64 {
        self.program_counter += 1;
        self.program_counter
    }

    pub fn program_counter(&self) -> i64 {
        self.program_counter
    }

    /// Counter of the last dispatch branch, stored by `exit`. The step's own
    /// `@pc:=@pc+1` then leaves the counter one past every branch, so only
    /// the `ELSE` arm runs afterwards.
    pub fn final_counter(&self) -> i64 {
        self.program_counter
    }

    /// Bind `name` to the current instruction
    pub fn define_label(&mut self, name: &str) -> DialectResult<i64> {
        if let Some(&address) = self.labels.get(name) {
            return Err(DialectError::DuplicateLabel {
                name: name.to_string(),
                address,
            });
        }
        if self.labels.len() >= MAX_LABELS_PER_REGION {
            return Err(DialectError::TooManyLabels);
        }
        self.labels.insert(name.to_string(), self.program_counter);
        Ok(self.program_counter)
    }

    pub fn label_address(&self, name: &str) -> Option<i64> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> &BTreeMap<String, i64> {
        &self.labels
    }

    pub fn step_bits(&self) -> u32 {
        self.step_bits
    }

    pub fn set_step_bits(&mut self, bits: i64) -> DialectResult<()> {
        match u32::try_from(bits) {
            Ok(bits) if bits <= MAX_STEP_BITS => {
                self.step_bits = bits;
                Ok(())
            }
            _ => Err(DialectError::StepBudgetOutOfRange { requested: bits }),
        }
    }
}
