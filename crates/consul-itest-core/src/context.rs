// crates/consul-itest-core/src/context.rs
// ============================================================================
// Module: Scenario Context
// Description: Typed per-scenario key/value store shared by steps.
// Purpose: Carry generated data and captured results between ordered steps.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! Steps communicate only through the [`ScenarioContext`]. Keys are typed
//! handles ([`ContextKey`]) so a reader receives the type the writer stored.
//! Reading a key no earlier step wrote is a suite authoring bug and fails
//! loudly with [`ContextError::MissingKey`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;

// ============================================================================
// SECTION: Keys
// ============================================================================

/// Typed handle naming one context entry.
pub struct ContextKey<T> {
    /// Entry name.
    name: &'static str,
    /// Value type carried by the entry.
    _value: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Creates a key handle.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Context access errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// No earlier step wrote the key.
    #[error("scenario context has no value for {key:?}; an earlier step must set it")]
    MissingKey {
        /// Entry name.
        key: &'static str,
    },
    /// The key holds a value of another type.
    #[error("scenario context value {key:?} is not a {expected}")]
    TypeMismatch {
        /// Entry name.
        key: &'static str,
        /// Requested type name.
        expected: &'static str,
    },
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Mutable per-scenario store.
#[derive(Default)]
pub struct ScenarioContext {
    /// Stored entries keyed by name.
    values: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl ScenarioContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing any earlier value under the same name.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: ContextKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingKey`] when unset and
    /// [`ContextError::TypeMismatch`] when another type is stored.
    pub fn get<T: Any + Send + Sync>(&self, key: ContextKey<T>) -> Result<&T, ContextError> {
        let value = self.values.get(key.name).ok_or(ContextError::MissingKey {
            key: key.name,
        })?;
        value.downcast_ref::<T>().ok_or(ContextError::TypeMismatch {
            key: key.name,
            expected: type_name::<T>(),
        })
    }

    /// Returns the stored value, or `None` when the key is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::TypeMismatch`] when another type is stored.
    pub fn get_opt<T: Any + Send + Sync>(&self, key: ContextKey<T>) -> Result<Option<&T>, ContextError> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(ContextError::MissingKey {
                ..
            }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().copied().collect();
        keys.sort_unstable();
        f.debug_struct("ScenarioContext").field("keys", &keys).finish()
    }
}
