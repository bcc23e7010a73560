//! Generic ordered collection builder.
//!
//! Concrete collections ([`Tasks`](super::Tasks), [`Artifacts`](super::Artifacts),
//! [`Tabs`](super::Tabs), [`Properties`](super::Properties)) are instantiations
//! of [`Collection`] with their own `add`-style methods. A configuration block
//! receives `&mut Collection<T>` and can therefore only reach those methods.

use super::errors::DslError;
use crate::validation::{Validate, ValidationContext, rules};
use serde::Serialize;

/// Applies a scoped configuration block to `self`
pub trait Configure {
    /// Runs `block` with `self` as its only mutation target.
    ///
    /// There is no rollback: if the block fails, whatever it already changed
    /// stays in place.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the block.
    fn configure<F>(&mut self, block: F) -> Result<&mut Self, DslError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<(), DslError>,
    {
        block(self)?;
        Ok(self)
    }
}

/// Child entity of a [`Collection`]
pub trait Element: Validate {
    /// Wire key of the owning collection, used in violation paths.
    const FIELD: &'static str;

    /// Key that must be unique within the collection.
    ///
    /// `None` means entries may repeat.
    fn unique_key(&self) -> Option<&str> {
        None
    }
}

/// Ordered, homogeneous list of child entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    /// Creates an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in insertion order
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns an iterator over the items
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends `item` and hands it back for further configuration.
    pub(crate) fn push(&mut self, item: T) -> &mut T {
        let index = self.items.len();
        self.items.push(item);
        &mut self.items[index]
    }
}

impl<T> Configure for Collection<T> {}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Element> Validate for Collection<T> {
    fn validate(&self, ctx: &mut ValidationContext) {
        for (index, item) in self.items.iter().enumerate() {
            ctx.scoped(format!("{}[{index}]", T::FIELD), |ctx| item.validate(ctx));
        }
        rules::check_unique_keys(ctx, T::FIELD, self.items.iter().filter_map(|item| item.unique_key()));
    }
}

/// Runs a child block on a fresh value, checks its structure and returns it.
pub(crate) fn build_child<C, F>(block: F) -> Result<C, DslError>
where
    C: Default + Structural,
    F: FnOnce(&mut C) -> Result<(), DslError>,
{
    let mut child = C::default();
    block(&mut child)?;
    child.check_structure()?;
    Ok(child)
}

/// Local check that required sub-fields are present
pub(crate) trait Structural {
    /// Fails fast on the first missing required field.
    fn check_structure(&self) -> Result<(), DslError>;
}

/// Fails with [`DslError::InvalidConfig`] when `value` is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), DslError> {
    if value.trim().is_empty() {
        return Err(DslError::invalid(field, format!("{field} is required")));
    }
    Ok(())
}
