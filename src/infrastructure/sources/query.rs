// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Federal-district codes accepted by the government portal's
/// `customerPlace` parameter.
pub mod district {
    pub const CENTRAL: &str = "OKER30";
    pub const NORTH_WEST: &str = "OKER31";
    pub const PRIVOLZHSKY: &str = "OKER33";
    pub const SOUTH: &str = "OKER34";
    pub const SIBERIAN: &str = "OKER35";
    pub const FAR_EAST: &str = "OKER36";
    pub const URAL: &str = "OKER37";
    pub const NORTH_CAUCASUS: &str = "OKER38";
}

/// Ordered, duplicate-preserving URL query builder.
///
/// The portal treats repeated keys as array parameters, so insertion order
/// and duplicates must survive into the encoded string. `set` replaces the
/// first occurrence in place, which is how the page loop rewrites the
/// paging cursor on every iteration.
#[derive(Debug, Clone)]
pub struct UrlQuery {
    base: String,
    params: Vec<(String, String)>,
}

impl UrlQuery {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn array_param(mut self, key: &str, values: &[String]) -> Self {
        for value in values {
            self.params.push((key.to_string(), value.clone()));
        }
        self
    }

    /// Replace the first occurrence of `key`, appending when absent.
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
        self
    }

    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return self.base.clone();
        }
        let encoded = serde_urlencoded::to_string(&self.params).unwrap_or_default();
        format!("{}?{}", self.base, encoded)
    }
}
