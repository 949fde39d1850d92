//! Parameter slots attached to options.

use serde::Serialize;

use crate::error::{BuildError, Result};
use crate::ident;

/// A single named, ordered, length-bounded argument slot of an option.
///
/// Parameters are immutable once built. Values bound during resolution live
/// in [`BoundParameter`](crate::BoundParameter), never on the declaration.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Parameter;
///
/// let path = Parameter::builder()
///     .id("path")
///     .range(1, 10)
///     .required(true)
///     .order(0)
///     .build()
///     .unwrap();
///
/// assert_eq!(path.id(), "path");
/// assert!(path.accepts("/tmp"));
/// assert!(!path.accepts("/a/very/long/path"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    id: String,
    order: usize,
    min_length: usize,
    max_length: usize,
    required: bool,
}

impl Parameter {
    /// Returns a new [`ParameterBuilder`].
    pub fn builder() -> ParameterBuilder {
        ParameterBuilder::new()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared binding position; strictly increasing within an option.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Returns `true` if `value` has an acceptable length (in chars).
    pub fn accepts(&self, value: &str) -> bool {
        let length = value.chars().count();
        (self.min_length..=self.max_length).contains(&length)
    }
}

/// Builder for [`Parameter`].
///
/// Every setter takes the builder by value, so its accumulated state moves
/// through the chain and is consumed by [`build`](Self::build). The first
/// invalid call is recorded and later calls are ignored; `build` reports it.
///
/// `required` defaults to `true` and the length range defaults to unbounded.
/// `order` has no default and must be supplied.
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    id: Option<String>,
    range: (usize, usize),
    required: bool,
    order: Option<usize>,
    error: Option<BuildError>,
}

impl Default for ParameterBuilder {
    fn default() -> Self {
        Self {
            id: None,
            range: (0, usize::MAX),
            required: true,
            order: None,
            error: None,
        }
    }
}

impl ParameterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parameter id.
    pub fn id(mut self, id: &str) -> Self {
        if self.error.is_none() {
            match ident::parameter_id(id) {
                Ok(id) => self.id = Some(id),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Sets the accepted value length range, inclusive on both ends.
    pub fn range(mut self, min: usize, max: usize) -> Self {
        if self.error.is_none() {
            if min > max {
                self.error = Some(BuildError::InvalidParameter(format!(
                    "minimum length {min} is greater than maximum length {max}"
                )));
            } else {
                self.range = (min, max);
            }
        }
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the binding position.
    pub fn order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Restores the pristine state, dropping any recorded error.
    ///
    /// ```
    /// use cmdtree_core::Parameter;
    ///
    /// let mut builder = Parameter::builder().id("Bad Id");
    /// builder.reset();
    /// let scope = builder.id("scope").order(0).build().unwrap();
    /// assert!(scope.required());
    /// ```
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Builds the parameter.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a setter, or
    /// [`BuildError::InvalidParameter`] if the id or order is missing.
    pub fn build(self) -> Result<Parameter> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let id = self.id.ok_or_else(|| {
            BuildError::InvalidParameter("parameter id is required".to_string())
        })?;
        let order = self.order.ok_or_else(|| {
            BuildError::InvalidParameter(format!("parameter '{id}' has no order"))
        })?;

        Ok(Parameter {
            id,
            order,
            min_length: self.range.0,
            max_length: self.range.1,
            required: self.required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_order() {
        let err = Parameter::builder().id("hours").range(1, 2).build().unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidParameter("parameter 'hours' has no order".to_string())
        );
    }

    #[test]
    fn test_build_requires_id() {
        let err = Parameter::builder().order(0).build().unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter(_)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = Parameter::builder()
            .id("scope")
            .range(10, 1)
            .order(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter(_)));
    }

    #[test]
    fn test_invalid_id_is_first_error() {
        let err = Parameter::builder()
            .id("Bad Id")
            .range(10, 1)
            .order(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut builder = Parameter::builder()
            .id("hours")
            .range(5, 1)
            .required(false)
            .order(2);
        builder.reset();

        let err = builder.clone().build().unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidParameter("parameter id is required".to_string())
        );

        let minutes = builder.id("minutes").order(0).build().unwrap();
        assert!(minutes.required());
        assert_eq!(minutes.order(), 0);
        assert_eq!(minutes.max_length(), usize::MAX);
    }

    #[test]
    fn test_defaults() {
        let tags = Parameter::builder().id("tags").order(3).build().unwrap();
        assert!(tags.required());
        assert_eq!(tags.order(), 3);
        assert_eq!(tags.min_length(), 0);
        assert_eq!(tags.max_length(), usize::MAX);
    }

    #[test]
    fn test_accepts_counts_chars() {
        let p = Parameter::builder()
            .id("word")
            .range(2, 3)
            .order(0)
            .build()
            .unwrap();
        assert!(!p.accepts("a"));
        assert!(p.accepts("ab"));
        assert!(p.accepts("ééé"));
        assert!(!p.accepts("abcd"));
    }
}
