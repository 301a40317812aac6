//! Derivation Tests
//!
//! End-to-end behaviour of pick/omit/rename/partial/config derivation
//! against fixture schemas.

use std::sync::Arc;

use familiar_dto::{
    derive, BuildRequest, ConstructionError, DerivationSpec, Deriver, ExtraPolicy, FieldDefault,
    FieldDescriptor, FieldType, RecordFactory, Schema, SchemaConfig, SchemaError, SchemaFactory,
};
use serde_json::{json, Value};

fn base_entity() -> Arc<Schema> {
    let doc: Value = serde_json::from_str(include_str!("fixtures/base_entity.schema.json")).unwrap();
    Schema::from_json_schema(&doc, None).unwrap()
}

/// `{id: string (required), name: string (required), description: string | null = null}`
fn example_entity() -> Arc<Schema> {
    Schema::builder("BaseEntityExample")
        .field(FieldDescriptor::required("id", FieldType::String))
        .field(FieldDescriptor::required("name", FieldType::String))
        .field(FieldDescriptor::with_default(
            "description",
            FieldType::optional(FieldType::String),
            Value::Null,
        ))
        .config(SchemaConfig { from_attributes: true, ..SchemaConfig::default() })
        .build()
        .unwrap()
}

fn names(schema: &Schema) -> Vec<&str> {
    schema.field_names()
}

// =============================================================================
// No-op Derivation
// =============================================================================

#[test]
fn test_noop_derivation_is_identical() {
    let base = base_entity();
    let derived = derive(&base, &DerivationSpec::new()).unwrap();

    assert_eq!(derived.name(), base.name());
    assert_eq!(derived.fields(), base.fields());
    assert_eq!(derived.config(), base.config());
    assert_eq!(derived.fingerprint(), base.fingerprint());
    assert!(!Arc::ptr_eq(&derived, &base));
    assert!(derived.extends(&base));
}

// =============================================================================
// Pick / Omit
// =============================================================================

#[test]
fn test_pick_is_exact_and_ordered() {
    let base = base_entity();
    let derived = derive(&base, &DerivationSpec::new().pick(["priority", "id", "tags"])).unwrap();
    assert_eq!(names(&derived), vec!["id", "tags", "priority"]);
}

#[test]
fn test_pick_every_subset() {
    let base = base_entity();
    let all: Vec<&str> = names(&base);
    for mask in 1u32..(1 << all.len()) {
        let pick: Vec<&str> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, n)| *n)
            .collect();
        let derived = derive(&base, &DerivationSpec::new().pick(pick.clone())).unwrap();
        assert_eq!(names(&derived), pick);
    }
}

#[test]
fn test_pick_unknown_field_fails() {
    let base = base_entity();
    let err = derive(&base, &DerivationSpec::new().pick(["nonexistent"])).unwrap_err();
    match err {
        SchemaError::FieldNotFound { field, schema } => {
            assert_eq!(field, "nonexistent");
            assert_eq!(schema, "BaseEntity");
        }
        other => panic!("Expected FieldNotFound, got {:?}", other),
    }
}

#[test]
fn test_omit_is_best_effort() {
    let base = base_entity();
    let derived = derive(&base, &DerivationSpec::new().omit(["nonexistent"])).unwrap();
    assert_eq!(derived.fields(), base.fields());

    let derived = derive(&base, &DerivationSpec::new().omit(["nonexistent", "tags"])).unwrap();
    assert_eq!(names(&derived), vec!["id", "name", "description", "priority"]);
}

// =============================================================================
// Partial
// =============================================================================

#[test]
fn test_partial_widens_and_nulls() {
    let base = base_entity();
    let derived = derive(&base, &DerivationSpec::new().partial(true)).unwrap();

    assert_eq!(names(&derived), names(&base));
    for field in derived.fields() {
        assert_eq!(field.default, FieldDefault::Absent, "{}", field.name);
        assert!(!field.is_required(), "{}", field.name);
        assert!(field.field_type.accepts_null(), "{}", field.name);
    }
    assert_eq!(
        derived.field("tags").unwrap().field_type,
        FieldType::optional(FieldType::array(FieldType::String))
    );

    // The base is untouched
    assert!(base.field("id").unwrap().is_required());
}

#[test]
fn test_partial_records_only_report_supplied_fields() {
    let patch = derive(&base_entity(), &DerivationSpec::new().partial(true)).unwrap();
    let record = patch.construct(json!({ "name": "renamed", "description": null })).unwrap();

    assert_eq!(record.fields_set(), vec!["name", "description"]);
    assert_eq!(record.get("id"), Some(&Value::Null));
    assert_eq!(record.to_json(true), json!({ "name": "renamed", "description": null }));
}

// =============================================================================
// Rename
// =============================================================================

#[test]
fn test_rename_preserves_value_and_changes_key() {
    let base = base_entity();
    let derived = derive(&base, &DerivationSpec::new().rename("id", "entity_id")).unwrap();

    assert!(derived.has_field("entity_id"));
    assert!(!derived.has_field("id"));
    assert_eq!(derived.field("entity_id").unwrap().field_type, FieldType::String);

    let record = derived
        .construct(json!({ "entity_id": "entity_123", "name": "Sample" }))
        .unwrap();
    assert_eq!(record.get("entity_id"), Some(&json!("entity_123")));
    assert_eq!(record.get("id"), None);

    let err = derived.construct(json!({ "id": "entity_123", "name": "Sample" })).unwrap_err();
    match err {
        SchemaError::Validation(v) => assert!(v.has_issue("entity_id")),
        other => panic!("Expected Validation, got {:?}", other),
    }
}

#[test]
fn test_rename_collision_fails() {
    let base = base_entity();
    let spec = DerivationSpec::new().rename("id", "key").rename("name", "key");
    let err = derive(&base, &spec).unwrap_err();
    match err {
        SchemaError::DuplicateFieldName { target, first, second } => {
            assert_eq!(target, "key");
            assert_eq!(first, "id");
            assert_eq!(second, "name");
        }
        other => panic!("Expected DuplicateFieldName, got {:?}", other),
    }
}

#[test]
fn test_rename_onto_omitted_field_is_allowed() {
    let base = base_entity();
    let spec = DerivationSpec::new().omit(["name"]).rename("description", "name");
    let derived = derive(&base, &spec).unwrap();
    assert_eq!(names(&derived), vec!["id", "name", "tags", "priority"]);
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_config_replaces_instead_of_merging() {
    let base = example_entity();
    assert!(base.config().from_attributes);

    let derived = derive(&base, &DerivationSpec::new().option("title", json!("X"))).unwrap();
    assert_eq!(derived.config_value("title"), Some(json!("X")));
    assert_eq!(derived.config_value("from_attributes"), Some(json!(false)));
    assert_eq!(
        derived.config(),
        &SchemaConfig { title: Some("X".to_string()), ..SchemaConfig::default() }
    );

    // Without a config, the base's configuration is inherited
    let inherited = derive(&base, &DerivationSpec::new().partial(true)).unwrap();
    assert!(inherited.config().from_attributes);
}

#[test]
fn test_invalid_config_is_a_construction_error() {
    let base = example_entity();
    let err = derive(&base, &DerivationSpec::new().option("orm_mode", json!(true))).unwrap_err();
    match err {
        SchemaError::SchemaConstruction { schema, source } => {
            assert_eq!(schema, "BaseEntityExample");
            assert!(matches!(source, ConstructionError::InvalidConfig(_)));
        }
        other => panic!("Expected SchemaConstruction, got {:?}", other),
    }
}

#[test]
fn test_invalid_rename_target_is_a_construction_error() {
    let base = example_entity();
    let spec = DerivationSpec::new().rename("id", "entity-id").output_name("Renamed");
    let err = derive(&base, &spec).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::SchemaConstruction { ref schema, source: ConstructionError::InvalidFieldName(_) }
            if schema == "Renamed"
    ));
}

// =============================================================================
// End-to-end
// =============================================================================

#[derive(serde::Serialize)]
struct EntityRow {
    id: String,
    name: String,
    description: Option<String>,
}

#[test]
fn test_partial_entity_end_to_end() {
    let base = example_entity();
    let spec = DerivationSpec::new()
        .partial(true)
        .pick(["id", "name", "description"])
        .omit(Vec::<String>::new())
        .option("from_attributes", json!(false))
        .option(
            "json_schema_extra",
            json!({
                "example": {
                    "id": "entity_123",
                    "name": "Sample Entity",
                    "description": "This is a sample entity for demonstration purposes."
                }
            }),
        )
        .output_name("PartialEntity");
    let partial = derive(&base, &spec).unwrap();

    let entity = partial
        .construct(json!({ "id": "entity_123", "name": "Sample Entity", "description": "Demo" }))
        .unwrap();
    assert_eq!(entity.get("id"), Some(&json!("entity_123")));
    assert_eq!(entity.get("name"), Some(&json!("Sample Entity")));
    assert_eq!(entity.get("description"), Some(&json!("Demo")));

    for name in ["id", "name", "description"] {
        assert_eq!(
            partial.field(name).unwrap().field_type,
            FieldType::optional(FieldType::String)
        );
    }
    assert_eq!(names(&partial), vec!["id", "name", "description"]);
    assert_eq!(entity.field_names(), vec!["id", "name", "description"]);

    let empty = partial.construct(json!({})).unwrap();
    assert_eq!(empty.get("id"), Some(&Value::Null));
    assert_eq!(empty.get("name"), Some(&Value::Null));
    assert_eq!(empty.get("description"), Some(&Value::Null));
    assert!(empty.fields_set().is_empty());

    assert_eq!(partial.config_value("from_attributes"), Some(json!(false)));
    let row = EntityRow { id: "e1".to_string(), name: "n".to_string(), description: None };
    assert!(partial.construct_from(&row).is_err());
    assert!(base.construct_from(&row).is_ok());

    let example = partial.config_value("json_schema_extra").unwrap()["example"].clone();
    assert_eq!(example["id"], json!("entity_123"));
    assert_eq!(example["name"], json!("Sample Entity"));
    assert_eq!(
        example["description"],
        json!("This is a sample entity for demonstration purposes.")
    );
    assert_eq!(partial.json_schema()["example"], example);
}

#[test]
fn test_spec_file_fixture() {
    let spec: DerivationSpec = toml::from_str(include_str!("fixtures/entity_patch.toml")).unwrap();
    let patch = derive(&base_entity(), &spec).unwrap();

    assert_eq!(patch.name(), "EntityPatch");
    assert_eq!(names(&patch), vec!["id", "name", "description", "rank"]);
    assert_eq!(patch.config().extra, ExtraPolicy::Forbid);
    assert_eq!(patch.title(), "Entity patch");

    let doc = patch.json_schema();
    assert_eq!(doc["additionalProperties"], json!(false));
    assert!(doc.get("required").is_none());
}

#[test]
fn test_derived_schemas_chain() {
    let base = base_entity();
    let public = derive(&base, &DerivationSpec::new().omit(["priority"]).output_name("PublicEntity")).unwrap();
    let patch = public.derive(&DerivationSpec::new().partial(true).output_name("PublicEntityPatch")).unwrap();

    assert!(patch.extends(&public));
    assert!(patch.extends(&base));
    assert_eq!(
        patch.ancestors().map(|a| a.name()).collect::<Vec<_>>(),
        vec!["PublicEntity", "BaseEntity"]
    );
}

// =============================================================================
// JSON Schema conformance
// =============================================================================

#[test]
fn test_exported_schema_accepts_constructed_records() {
    let base = base_entity();
    let patch = derive(&base, &DerivationSpec::new().partial(true).rename("id", "entity_id")).unwrap();

    for schema in [&base, &patch] {
        let compiled = jsonschema::JSONSchema::compile(&schema.json_schema()).expect("valid JSON Schema");
        let input = if schema.has_field("entity_id") {
            json!({ "entity_id": "e1", "name": "n" })
        } else {
            json!({ "id": "e1", "name": "n" })
        };
        let record = schema.construct(input).unwrap();
        assert!(compiled.is_valid(&record.to_json(false)), "{}", schema.name());
    }

    let compiled = jsonschema::JSONSchema::compile(&base.json_schema()).unwrap();
    assert!(!compiled.is_valid(&json!({ "name": "missing id" })));
}

#[test]
fn test_exported_derivation_reads_back_with_same_fingerprint() {
    let spec: DerivationSpec = toml::from_str(include_str!("fixtures/entity_patch.toml")).unwrap();
    let patch = derive(&base_entity(), &spec.option("json_schema_extra", json!({ "example": { "rank": 2 } })))
        .unwrap();

    let reloaded = Schema::from_json_schema(&patch.json_schema(), None).unwrap();
    assert_eq!(reloaded.name(), "Entity_patch");
    assert_eq!(reloaded.title(), "Entity patch");
    assert_eq!(reloaded.config_value("json_schema_extra"), Some(json!({ "example": { "rank": 2 } })));
    assert_eq!(reloaded.fingerprint(), patch.fingerprint());
}

// =============================================================================
// Custom factories
// =============================================================================

/// Rejects fields that look like secrets, then defers to the record factory
struct NoSecrets(RecordFactory);

impl SchemaFactory for NoSecrets {
    fn build(&self, request: BuildRequest) -> Result<Schema, ConstructionError> {
        if let Some(field) = request.fields.iter().find(|f| f.name.contains("password")) {
            return Err(ConstructionError::InvalidFieldName(field.name.clone()));
        }
        self.0.build(request)
    }
}

#[test]
fn test_custom_factory() {
    let base = Schema::builder("Account")
        .field(FieldDescriptor::required("login", FieldType::String))
        .field(FieldDescriptor::required("password", FieldType::String))
        .build()
        .unwrap();
    let deriver = Deriver::with_factory(NoSecrets(RecordFactory::new()));

    let err = deriver.derive(&base, &DerivationSpec::new()).unwrap_err();
    assert!(matches!(err, SchemaError::SchemaConstruction { .. }));

    let public = deriver.derive(&base, &DerivationSpec::new().omit(["password"])).unwrap();
    assert_eq!(public.field_names(), vec!["login"]);
}

#[test]
fn test_concurrent_derivations() {
    let base = base_entity();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let base = Arc::clone(&base);
            std::thread::spawn(move || {
                let spec = DerivationSpec::new()
                    .partial(i % 2 == 0)
                    .output_name(format!("Derived{}", i));
                derive(&base, &spec).map(|s| s.name().to_string())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap().unwrap(), format!("Derived{}", i));
    }
    assert!(base.field("id").unwrap().is_required());
}
