//! Declarative field bindings.
//!
//! Each record type lists its fields once: the accepted header names, how the
//! raw string is parsed, and whether the field is hidden from data.

use std::fmt;

/// How a raw column value is written into a record.
pub enum FieldSetter<T> {
    /// Parsed as `i32`; unparseable values leave the field at its default.
    Integer(fn(&mut T, i32)),
    /// Copied verbatim.
    Text(fn(&mut T, String)),
}

impl<T> Clone for FieldSetter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldSetter<T> {}

/// Binding of one record field to its header names.
pub struct FieldBinding<T> {
    field: &'static str,
    names: Vec<&'static str>,
    hidden: bool,
    setter: FieldSetter<T>,
}

impl<T> FieldBinding<T> {
    /// An integer field looked up by its own name.
    pub fn integer(field: &'static str, setter: fn(&mut T, i32)) -> Self {
        Self::new(field, FieldSetter::Integer(setter))
    }

    /// A text field looked up by its own name.
    pub fn text(field: &'static str, setter: fn(&mut T, String)) -> Self {
        Self::new(field, FieldSetter::Text(setter))
    }

    fn new(field: &'static str, setter: FieldSetter<T>) -> Self {
        Self {
            field,
            names: Vec::new(),
            hidden: false,
            setter,
        }
    }

    /// Replaces the header names; the first one present in the header wins.
    pub fn names(mut self, names: &[&'static str]) -> Self {
        self.names = names.to_vec();
        self
    }

    /// Marks the field as never populated from data.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Header names in lookup order. Defaults to the field name.
    pub fn header_names(&self) -> Vec<&'static str> {
        if self.names.is_empty() {
            vec![self.field]
        } else {
            self.names.clone()
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn setter(&self) -> FieldSetter<T> {
        self.setter
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.setter {
            FieldSetter::Integer(_) => "integer",
            FieldSetter::Text(_) => "text",
        };
        f.debug_struct("FieldBinding")
            .field("field", &self.field)
            .field("names", &self.header_names())
            .field("hidden", &self.hidden)
            .field("kind", &kind)
            .finish()
    }
}

/// A record type that can be populated from a tabular row.
///
/// The binding table is built once per loader, not once per row.
pub trait TableRecord: Default {
    fn bindings() -> Vec<FieldBinding<Self>>;
}
