use crate::error::{ModelError, ModelResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static LOCATOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/?([^/]+)/([^/]+)/([^/]+)/([^/]+)$").expect("locator pattern is valid")
});

/// Canonical entity identity: `/<zone>/<dataProduct>/<dataModule>/<entityName>`.
///
/// Segments keep their original casing; comparisons go through
/// [`Locator::matches`], which ignores case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub zone: String,
    pub data_product: String,
    pub data_module: String,
    pub entity_name: String,
}

impl Locator {
    pub fn new(
        zone: impl Into<String>,
        data_product: impl Into<String>,
        data_module: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            data_product: data_product.into(),
            data_module: data_module.into(),
            entity_name: entity_name.into(),
        }
    }

    /// Parse a locator; the leading slash is optional.
    pub fn parse(input: &str) -> ModelResult<Self> {
        let captures = LOCATOR_PATTERN
            .captures(input)
            .ok_or_else(|| ModelError::InvalidLocator(input.to_string()))?;

        let segment = |i: usize| -> ModelResult<String> {
            let value = &captures[i];
            if value.trim().is_empty() {
                return Err(ModelError::InvalidLocator(input.to_string()));
            }
            Ok(value.to_string())
        };

        Ok(Self {
            zone: segment(1)?,
            data_product: segment(2)?,
            data_module: segment(3)?,
            entity_name: segment(4)?,
        })
    }

    /// Canonical string with a leading slash.
    pub fn normalize(input: &str) -> ModelResult<String> {
        Self::parse(input).map(|l| l.to_string())
    }

    /// Case-insensitive equality against another locator string.
    pub fn matches(&self, other: &str) -> bool {
        self.to_string().to_lowercase() == other.to_lowercase()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}/{}/{}/{}",
            self.zone, self.data_product, self.data_module, self.entity_name
        )
    }
}

impl FromStr for Locator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
