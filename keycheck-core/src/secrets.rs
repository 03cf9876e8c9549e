//! Environment snapshot
//!
//! Checks never read the process environment directly. The binary captures
//! it once, after `.env` loading, into a [`Secrets`] value which is then
//! threaded into every check. Tests build their own snapshots from pairs.

use std::collections::HashMap;
use std::fmt;

use crate::error::{KeycheckError, KeycheckResult};
use crate::provider::Provider;

/// Read-only mapping from variable name to value
#[derive(Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Build a snapshot from explicit name/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw lookup; an empty string is returned as-is
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Lookup that treats an empty value the same as an unset one
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// The provider's API key, or `MissingCredential` naming its variable
    pub fn credential(&self, provider: Provider) -> KeycheckResult<&str> {
        let var = provider.credential_var();
        self.non_empty(var)
            .ok_or_else(|| KeycheckError::missing_credential(var))
    }
}

// Values are secrets; only the names are printed.
impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Secrets").field("names", &names).finish()
    }
}
