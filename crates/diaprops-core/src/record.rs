//! Records: one row of an array property

use crate::field::TypedField;

/// Ordered fields, one per schema column
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<TypedField>,
}

impl Record {
    pub(crate) fn from_fields(fields: Vec<TypedField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[TypedField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [TypedField] {
        &mut self.fields
    }

    pub fn get(&self, idx: usize) -> Option<&TypedField> {
        self.fields.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut TypedField> {
        self.fields.get_mut(idx)
    }

    /// Field for the column called `name`
    pub fn field(&self, name: &str) -> Option<&TypedField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut TypedField> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
