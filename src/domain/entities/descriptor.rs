//! # Entity Descriptors
//!
//! Schema metadata that parameterizes the generic codec, store client and
//! wire serializer for one entity type.
//!
//! A descriptor names the collection, the id field, the ordered write
//! schema (which never includes the id field), the wire allow-list and,
//! for child collections, the columns used by random selection.

use crate::domain::entities::record::Record;
use crate::domain::value_objects::{FieldType, RecordId};
use std::ops::RangeInclusive;

/// Lowest order value assigned at authoring time.
pub const DEFAULT_ORDER_MIN: i64 = 1;

/// Highest order value assigned at authoring time.
pub const DEFAULT_ORDER_MAX: i64 = 3;

/// One declared field of an entity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    field_type: FieldType,
    required: bool,
}

impl FieldSpec {
    /// Declares a required field.
    #[must_use]
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: true,
        }
    }

    /// Declares an optional field.
    #[must_use]
    pub const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
        }
    }

    /// Returns the field name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared type.
    #[inline]
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns true if the field must be present.
    #[inline]
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// Ordered set of declared fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    fields: &'static [FieldSpec],
}

impl FieldSchema {
    /// Creates a schema from a static field list.
    #[must_use]
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Returns the declared fields in order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if a field with this name is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Columns and value range used to pick a random child row.
///
/// Each child row carries a parent reference column and an `order` column
/// assigned from a small discrete range when the row was authored.
/// Selection draws one order value uniformly and asks the store for at
/// most one row matching both the parent and that order.
///
/// This is only uniform over rows when every order value has roughly the
/// same number of rows per parent, and it yields nothing when the drawn
/// value has no rows for the parent even if other values do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSelection {
    parent_field: &'static str,
    order_field: &'static str,
    order_min: i64,
    order_max: i64,
}

impl RandomSelection {
    /// Creates selection settings with the default order range.
    #[must_use]
    pub const fn new(parent_field: &'static str, order_field: &'static str) -> Self {
        Self {
            parent_field,
            order_field,
            order_min: DEFAULT_ORDER_MIN,
            order_max: DEFAULT_ORDER_MAX,
        }
    }

    /// Replaces the order range (inclusive on both ends).
    #[must_use]
    pub const fn with_order_range(mut self, min: i64, max: i64) -> Self {
        self.order_min = min;
        self.order_max = max;
        self
    }

    /// Returns the parent reference column.
    #[inline]
    #[must_use]
    pub const fn parent_field(&self) -> &'static str {
        self.parent_field
    }

    /// Returns the order column.
    #[inline]
    #[must_use]
    pub const fn order_field(&self) -> &'static str {
        self.order_field
    }

    /// Returns the inclusive order range.
    #[must_use]
    pub const fn order_range(&self) -> RangeInclusive<i64> {
        self.order_min..=self.order_max
    }
}

/// Schema metadata for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: &'static str,
    collection: &'static str,
    id_field: &'static str,
    schema: FieldSchema,
    wire_fields: &'static [&'static str],
    random_selection: Option<RandomSelection>,
}

impl EntityDescriptor {
    /// Creates a descriptor with no random selection.
    #[must_use]
    pub const fn new(
        name: &'static str,
        collection: &'static str,
        id_field: &'static str,
        schema: FieldSchema,
        wire_fields: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            collection,
            id_field,
            schema,
            wire_fields,
            random_selection: None,
        }
    }

    /// Enables random selection by parent.
    #[must_use]
    pub const fn with_random_selection(mut self, selection: RandomSelection) -> Self {
        self.random_selection = Some(selection);
        self
    }

    /// Returns the entity type name, e.g. `PhraseCard`.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the backing collection name.
    #[inline]
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        self.collection
    }

    /// Returns the id field name.
    #[inline]
    #[must_use]
    pub const fn id_field(&self) -> &'static str {
        self.id_field
    }

    /// Returns the write schema (excludes the id field).
    #[inline]
    #[must_use]
    pub const fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Returns the wire allow-list.
    #[inline]
    #[must_use]
    pub const fn wire_fields(&self) -> &'static [&'static str] {
        self.wire_fields
    }

    /// Returns the random-selection settings, if any.
    #[inline]
    #[must_use]
    pub const fn random_selection(&self) -> Option<&RandomSelection> {
        self.random_selection.as_ref()
    }

    /// Resolves the wire allow-list against the schema.
    ///
    /// The id field resolves to an optional UUID. Names that are neither
    /// the id field nor declared in the schema are skipped.
    pub fn wire_specs(&self) -> impl Iterator<Item = FieldSpec> + '_ {
        self.wire_fields.iter().filter_map(move |&name| {
            if name == self.id_field {
                Some(FieldSpec::optional(name, FieldType::Uuid))
            } else {
                self.schema.get(name).copied()
            }
        })
    }

    /// Returns the record's id, if its id field holds a UUID.
    #[must_use]
    pub fn id_of(&self, record: &Record) -> Option<RecordId> {
        record.get(self.id_field).and_then(|v| v.as_uuid())
    }
}
