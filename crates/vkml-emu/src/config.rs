use tracing::warn;
use vkml_abi::Format;

use crate::format::{self, DEFAULT_ELEMENT_SIZE};

/// Forces every format to this many bytes per element (the legacy fixed-size behavior).
pub const FIXED_ELEMENT_SIZE_ENV: &str = "VKML_EMU_FIXED_ELEMENT_SIZE";
/// Overrides the element size used for formats missing from the format table.
pub const DEFAULT_ELEMENT_SIZE_ENV: &str = "VKML_EMU_DEFAULT_ELEMENT_SIZE";

/// How a tensor's declared format turns into bytes per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementSizePolicy {
    /// Look the format up in [`format::element_size`]; unknown formats use `fallback`.
    FormatTable { fallback: u32 },
    /// Ignore the format entirely.
    Fixed(u32),
}

impl Default for ElementSizePolicy {
    fn default() -> Self {
        Self::FormatTable {
            fallback: DEFAULT_ELEMENT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmulationConfig {
    pub element_size: ElementSizePolicy,
}

impl EmulationConfig {
    /// Legacy behavior: every element is [`DEFAULT_ELEMENT_SIZE`] bytes regardless of format.
    pub fn fixed_element_size() -> Self {
        Self {
            element_size: ElementSizePolicy::Fixed(DEFAULT_ELEMENT_SIZE),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an environment-like lookup.
    ///
    /// A fixed size wins over a table fallback when both are set. Unparseable or zero values are
    /// ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |name: &str| -> Option<u32> {
            let raw = lookup(name)?;
            match raw.trim().parse::<u32>() {
                Ok(v) if v > 0 => Some(v),
                _ => {
                    warn!(var = name, value = %raw, "ignoring invalid element size override");
                    None
                }
            }
        };

        let element_size = if let Some(fixed) = parse(FIXED_ELEMENT_SIZE_ENV) {
            ElementSizePolicy::Fixed(fixed)
        } else {
            ElementSizePolicy::FormatTable {
                fallback: parse(DEFAULT_ELEMENT_SIZE_ENV).unwrap_or(DEFAULT_ELEMENT_SIZE),
            }
        };
        Self { element_size }
    }

    pub fn element_size(&self, format: Format) -> u32 {
        match self.element_size {
            ElementSizePolicy::Fixed(size) => size,
            ElementSizePolicy::FormatTable { fallback } => {
                format::element_size(format).unwrap_or(fallback)
            }
        }
    }
}
