//! # Wire Schemas
//!
//! JSON Schema (draft-07) documents describing each entity's outbound
//! wire form, generated from its descriptor.
//!
//! The schemas describe what [`WireSerializer::to_wire`] emits. Inbound
//! coercion is more lenient than the schema states.
//!
//! [`WireSerializer::to_wire`]: crate::application::serializer::WireSerializer::to_wire

use crate::domain::entities::{EntityDescriptor, FieldSpec};
use crate::domain::value_objects::FieldType;
use schemars::schema::{InstanceType, RootSchema, Schema, SchemaObject};

/// Meta-schema URI written into every document.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Builds the wire schema for one entity type.
///
/// The id field and every required schema field are listed as required,
/// since records leaving the store always carry them.
#[must_use]
pub fn wire_schema(descriptor: &EntityDescriptor) -> RootSchema {
    let mut root = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        ..Default::default()
    };

    let metadata = root.metadata();
    metadata.title = Some(descriptor.name().to_owned());
    metadata.description = Some(format!(
        "{} as exchanged over the REST API",
        descriptor.name()
    ));

    let object = root.object();
    object.additional_properties = Some(Box::new(Schema::Bool(false)));
    for spec in descriptor.wire_specs() {
        object
            .properties
            .insert(spec.name().to_owned(), property(&spec));
        if spec.is_required() || spec.name() == descriptor.id_field() {
            object.required.insert(spec.name().to_owned());
        }
    }

    RootSchema {
        meta_schema: Some(DRAFT_07.to_owned()),
        schema: root,
        ..Default::default()
    }
}

fn property(spec: &FieldSpec) -> Schema {
    let (instance_type, format) = match spec.field_type() {
        FieldType::Text => (InstanceType::String, None),
        FieldType::Integer => (InstanceType::Integer, Some("int64")),
        FieldType::Boolean => (InstanceType::Boolean, None),
        FieldType::Uuid => (InstanceType::String, Some("uuid")),
        FieldType::Timestamp => (InstanceType::String, Some("date-time")),
    };
    Schema::Object(SchemaObject {
        instance_type: Some(instance_type.into()),
        format: format.map(str::to_owned),
        ..Default::default()
    })
}
