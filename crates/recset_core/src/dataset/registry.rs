//! Named dataset factories.

use super::{canonical_name, Dataset, DatasetContext};
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::fmt;

/// Creates a dataset adapter from a shared context.
pub type DatasetFactory = Box<dyn Fn(&DatasetContext) -> Box<dyn Dataset> + Send + Sync>;

/// Maps `category/name` keys to dataset factories.
///
/// Keys are case-insensitive. The registry is a plain value; the
/// application decides what goes in it, typically through
/// [`register_builtin`](super::register_builtin).
#[derive(Default)]
pub struct DatasetRegistry {
    factories: BTreeMap<String, DatasetFactory>,
}

impl DatasetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `category/name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] if the key is taken.
    pub fn register<F>(&mut self, category: &str, name: &str, factory: F) -> CoreResult<()>
    where
        F: Fn(&DatasetContext) -> Box<dyn Dataset> + Send + Sync + 'static,
    {
        let key = canonical_name(category, name);
        if self.factories.contains_key(&key) {
            return Err(CoreError::invalid_operation(format!(
                "dataset {key} already registered"
            )));
        }
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Creates the dataset registered under `category/name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DatasetNotFound`] for an unknown key.
    pub fn get(
        &self,
        category: &str,
        name: &str,
        ctx: &DatasetContext,
    ) -> CoreResult<Box<dyn Dataset>> {
        let key = canonical_name(category, name);
        match self.factories.get(&key) {
            Some(factory) => Ok(factory(ctx)),
            None => Err(CoreError::dataset_not_found(key)),
        }
    }

    /// Creates a dataset from a `category/name` key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DatasetNotFound`] for an unknown or malformed
    /// key.
    pub fn get_by_key(&self, key: &str, ctx: &DatasetContext) -> CoreResult<Box<dyn Dataset>> {
        match key.split_once('/') {
            Some((category, name)) => self.get(category, name, ctx),
            None => Err(CoreError::dataset_not_found(key)),
        }
    }

    /// Registered keys, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Returns whether `category/name` is registered.
    #[must_use]
    pub fn contains(&self, category: &str, name: &str) -> bool {
        self.factories.contains_key(&canonical_name(category, name))
    }

    /// Number of registered datasets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("names", &self.names())
            .finish()
    }
}
