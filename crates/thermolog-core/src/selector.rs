//! Timestamp selector model.
//!
//! Mirrors the dashboard's `<select>`: one option per registered reading,
//! keyed by the raw timestamp, used to target delete-row commands.

use serde::{Deserialize, Serialize};

/// A single selector entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Raw timestamp sent back to the device.
    pub value: String,
    /// Human-readable date.
    pub text: String,
}

/// The selector's option list and selection.
///
/// With no explicit selection the first option is current, the way a
/// browser select box behaves. Options are never de-duplicated.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    options: Vec<SelectOption>,
    selected: Option<usize>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option.
    pub fn add(&mut self, option: SelectOption) {
        self.options.push(option);
    }

    /// Select the first option whose value is `value`.
    ///
    /// Returns `false` and keeps the current selection if there is none.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o.value == value) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Index of the current option.
    pub fn selected_index(&self) -> Option<usize> {
        if self.options.is_empty() {
            return None;
        }
        Some(self.selected.unwrap_or(0))
    }

    /// Value of the current option.
    pub fn value(&self) -> Option<&str> {
        self.selected_index()
            .map(|index| self.options[index].value.as_str())
    }

    /// Remove the current option. The selection falls back to the first
    /// remaining option.
    pub fn remove_selected(&mut self) -> Option<SelectOption> {
        let index = self.selected_index()?;
        self.selected = None;
        Some(self.options.remove(index))
    }

    /// Drop every option.
    pub fn clear(&mut self) {
        self.options.clear();
        self.selected = None;
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
