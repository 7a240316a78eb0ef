//! Test registration.
//!
//! A [`TestRegistry`] collects the test cases of one run. Script evaluation never touches it directly: each file
//! gets a [`Registrar`] from [`TestRegistry::setup`], bound to that file's qualified-name prefix, and registers
//! through it. Registration order is execution order.

use std::fmt;

use futures::future::LocalBoxFuture;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wpt_core::{QualifiedName, Thrown};

use crate::store::is_reserved_name;

/// The future a test body produces. Bodies run on one thread and need not be `Send`.
pub type TestBody = LocalBoxFuture<'static, Result<(), Thrown>>;

type BodyFn = Box<dyn FnOnce() -> TestBody>;

/// Errors raised while registering tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate test name `{0}`")]
    Duplicate(QualifiedName),

    #[error("test registered under prefix `{prefix}` has no name")]
    EmptyName { prefix: String },

    #[error("`{0}` is reserved by the snapshot format and cannot name a test")]
    ReservedName(QualifiedName),
}

/// A test function as handed to [`Registrar::test`]: its own name, its source text and its body.
pub struct TestFunction {
    name: String,
    source: String,
    body: BodyFn,
}

impl TestFunction {
    /// ## Parameters
    /// - `name`: the function's own name; empty for an anonymous function.
    /// - `source`: text recorded in the catalog and shown in the report.
    /// - `body`: called once, when the runner reaches this test.
    pub fn new<F>(name: impl Into<String>, source: impl Into<String>, body: F) -> Self
    where
        F: FnOnce() -> TestBody + 'static,
    {
        Self {
            name: name.into(),
            source: source.into(),
            body: Box::new(body),
        }
    }

    /// A synchronous body.
    pub fn sync<F>(name: impl Into<String>, source: impl Into<String>, body: F) -> Self
    where
        F: FnOnce() -> Result<(), Thrown> + 'static,
    {
        Self::new(name, source, move || -> TestBody { Box::pin(async move { body() }) })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for TestFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestFunction")
            .field("name", &self.name)
            .field("source_len", &self.source.len())
            .finish_non_exhaustive()
    }
}

/// A registered test: qualified name plus a body that has not run yet.
pub struct TestCase {
    pub name: QualifiedName,
    body: BodyFn,
}

impl TestCase {
    pub fn new<F>(name: impl Into<QualifiedName>, body: F) -> Self
    where
        F: FnOnce() -> TestBody + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    /// Consume the case and start its body.
    pub fn start(self) -> (QualifiedName, TestBody) {
        (self.name, (self.body)())
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Qualified name → test source text, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TesterCatalog(IndexMap<QualifiedName, String>);

impl TesterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the source of `name`.
    pub fn insert(&mut self, name: QualifiedName, source: impl Into<String>) {
        self.0.insert(name, source.into());
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &str)> {
        self.0.iter().map(|(name, source)| (name, source.as_str()))
    }
}

impl FromIterator<(QualifiedName, String)> for TesterCatalog {
    fn from_iter<I: IntoIterator<Item = (QualifiedName, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered collection of the test cases of one run, with their catalog entries.
#[derive(Debug, Default)]
pub struct TestRegistry {
    cases: Vec<TestCase>,
    catalog: TesterCatalog,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a registrar to `prefix` for the evaluation of one file.
    pub fn setup(&mut self, prefix: impl Into<String>) -> Registrar<'_> {
        Registrar {
            registry: self,
            prefix: prefix.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Qualified names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.cases.iter().map(|case| &case.name)
    }

    pub fn catalog(&self) -> &TesterCatalog {
        &self.catalog
    }

    /// Split into the ordered cases to run and the catalog to persist.
    pub fn into_parts(self) -> (Vec<TestCase>, TesterCatalog) {
        (self.cases, self.catalog)
    }

    fn register(&mut self, name: QualifiedName, function: TestFunction) -> Result<QualifiedName, RegistryError> {
        // The catalog mirrors `cases`, so it doubles as the uniqueness index.
        match self.catalog.0.entry(name) {
            Entry::Occupied(entry) => {
                tracing::warn!(name = %entry.key(), "duplicate test registration rejected");
                Err(RegistryError::Duplicate(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                entry.insert(function.source);
                self.cases.push(TestCase {
                    name: name.clone(),
                    body: function.body,
                });
                Ok(name)
            }
        }
    }
}

/// Registration handle bound to one file's prefix.
#[derive(Debug)]
pub struct Registrar<'a> {
    registry: &'a mut TestRegistry,
    prefix: String,
}

impl Registrar<'_> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The qualified name a test would be registered under, without registering it.
    ///
    /// ## Returns
    /// - `prefix + (name or function_name)`.
    /// - [`RegistryError::EmptyName`] when neither name is given.
    /// - [`RegistryError::ReservedName`] for a name the snapshot format reserves.
    pub fn qualify(&self, function_name: &str, name: Option<&str>) -> Result<QualifiedName, RegistryError> {
        let bare = match name {
            Some(name) if !name.is_empty() => name,
            _ => function_name,
        };
        if bare.is_empty() {
            return Err(RegistryError::EmptyName {
                prefix: self.prefix.clone(),
            });
        }
        let qualified = QualifiedName::prefixed(&self.prefix, bare);
        if is_reserved_name(qualified.as_str()) {
            return Err(RegistryError::ReservedName(qualified));
        }
        Ok(qualified)
    }

    /// Whether `name` is already registered in the underlying registry.
    pub fn is_registered(&self, name: &QualifiedName) -> bool {
        self.registry.catalog.contains(name)
    }

    /// Register `function` under `prefix + (name or the function's own name)`.
    ///
    /// ## Returns
    /// - The final qualified name.
    /// - The errors of [`Registrar::qualify`].
    /// - [`RegistryError::Duplicate`] when the name is already registered; the first registration is kept.
    pub fn test(&mut self, function: TestFunction, name: Option<&str>) -> Result<QualifiedName, RegistryError> {
        let qualified = self.qualify(&function.name, name)?;
        self.registry.register(qualified, function)
    }

    /// Same as [`Registrar::test`].
    pub fn promise_test(&mut self, function: TestFunction, name: Option<&str>) -> Result<QualifiedName, RegistryError> {
        self.test(function, name)
    }

    /// Same as [`Registrar::test`].
    pub fn async_test(&mut self, function: TestFunction, name: Option<&str>) -> Result<QualifiedName, RegistryError> {
        self.test(function, name)
    }
}
