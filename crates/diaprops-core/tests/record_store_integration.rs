// Integration tests for record store resizing, loading and copying

use std::sync::Arc;

use diaprops_core::{
    ArrayDocument, ArrayProperty, ArraySchema, EnumData, FieldValue, LoadError, NumberRange,
    PropDescription, RecordStore, SchemaError,
};
use serde_json::json;

fn schema() -> Arc<ArraySchema> {
    let points = ArraySchema::builder()
        .add_real("x", "X", 0.0, NumberRange::new(-100.0, 100.0, 0.1))
        .add_real("y", "Y", 0.0, NumberRange::new(-100.0, 100.0, 0.1))
        .build()
        .unwrap();
    Arc::new(
        ArraySchema::builder()
            .add_int("id", "Id", -1, NumberRange::new(-1.0, 1000.0, 1.0))
            .add_enum(
                "style",
                "Style",
                1,
                EnumData::from_pairs([("Solid", 0), ("Dashed", 1)]),
            )
            .add_array("points", "Points", points)
            .build()
            .unwrap(),
    )
}

fn numbered(len: usize) -> RecordStore {
    let mut store = RecordStore::with_len(schema(), len).unwrap();
    for (idx, record) in store.rows_mut().iter_mut().enumerate() {
        record
            .get_mut(0)
            .unwrap()
            .set(FieldValue::Int(idx as i32))
            .unwrap();
    }
    store
}

fn ids(store: &RecordStore) -> Vec<i32> {
    store
        .rows()
        .iter()
        .map(|r| r.get(0).unwrap().as_int().unwrap())
        .collect()
}

#[test]
fn test_resize_to_every_length() {
    for old_len in 0..5 {
        for len in 0..8 {
            let mut store = numbered(old_len);
            let changed = store.resize(len).unwrap();

            assert_eq!(changed, len != old_len);
            assert_eq!(store.len(), len);
            let kept = len.min(old_len);
            assert_eq!(ids(&store)[..kept], ids(&numbered(old_len))[..kept]);
            let prototype = store.schema().new_record();
            for record in &store.rows()[kept..] {
                assert_eq!(record, &prototype);
            }
        }
    }
}

#[test]
fn test_shrinking_releases_nested_stores() {
    let mut store = numbered(3);
    let (nested, created) = store
        .row_mut(2)
        .unwrap()
        .get_mut(2)
        .unwrap()
        .nested_or_insert()
        .unwrap();
    assert!(created);
    nested.resize(4).unwrap();

    store.resize(2).unwrap();
    store.resize(3).unwrap();
    assert!(!store.row(2).unwrap().get(2).unwrap().is_materialized());
}

#[test]
fn test_new_rows_take_schema_defaults() {
    let mut store = RecordStore::new(schema());
    store.resize(1).unwrap();
    let record = store.row(0).unwrap();
    assert_eq!(record.field("id").unwrap().as_int(), Some(-1));
    assert_eq!(record.field("style").unwrap().value(), &FieldValue::Enum(1));
    assert!(!record.field("points").unwrap().is_materialized());
}

#[test]
fn test_copy_is_deep() {
    let mut property = ArrayProperty::dynamic(PropDescription::new("lines", "Lines"), schema());
    property.load(&json!([{ "id": 4, "points": [{ "x": 1.0 }] }])).unwrap();

    let mut copy = property.clone();
    let (points, _) = copy
        .records_mut()
        .row_mut(0)
        .unwrap()
        .get_mut(2)
        .unwrap()
        .nested_or_insert()
        .unwrap();
    points.resize(3).unwrap();

    let original = property.records().row(0).unwrap().get(2).unwrap();
    assert_eq!(original.nested().unwrap().len(), 1);
    assert_ne!(property.records().id(), copy.records().id());
}

#[test]
fn test_save_then_load_keeps_values() {
    let mut property = ArrayProperty::dynamic(PropDescription::new("lines", "Lines"), schema());
    property
        .load(&json!([
            { "id": 1, "style": "Solid", "points": [{ "x": 2.5, "y": -1.0 }] },
            { "id": 2 }
        ]))
        .unwrap();

    let saved = property.save();
    assert_eq!(
        saved,
        json!([
            { "id": 1, "style": 0, "points": [{ "x": 2.5, "y": -1.0 }] },
            { "id": 2, "style": 1 }
        ])
    );

    let mut reloaded = ArrayProperty::dynamic(PropDescription::new("lines", "Lines"), schema());
    reloaded.load(&saved).unwrap();
    assert_eq!(reloaded.records(), property.records());
}

#[test]
fn test_load_reports_path_of_bad_value() {
    let mut property = ArrayProperty::dynamic(PropDescription::new("lines", "Lines"), schema());
    let err = property
        .load(&json!([{ "id": 1 }, { "points": [{ "x": "far" }] }]))
        .unwrap_err();
    match err {
        LoadError::InvalidValue { column, path, .. } => {
            assert_eq!(column, "x");
            assert_eq!(path, "$[1].points[0].x");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_document_rejects_double_nesting() {
    let doc = ArrayDocument::from_json_str(
        r#"{
            "name": "deep",
            "columns": [
                { "name": "outer", "kind": "array", "columns": [
                    { "name": "inner", "kind": "array", "columns": [
                        { "name": "leaf", "kind": "int" }
                    ]}
                ]}
            ]
        }"#,
    )
    .unwrap();
    assert!(matches!(
        doc.to_property(),
        Err(LoadError::Schema(SchemaError::NestingTooDeep { .. }))
    ));
}

#[test]
fn test_static_document_keeps_declared_length() {
    let doc = ArrayDocument::from_json_str(
        r#"{
            "name": "corners",
            "fixed_len": 4,
            "columns": [{ "name": "radius", "kind": "real", "default": 0.5 }],
            "records": [{ "radius": 1.0 }]
        }"#,
    )
    .unwrap();
    let property = doc.to_property().unwrap();
    assert_eq!(property.records().len(), 4);
    assert_eq!(
        property.records().row(3).unwrap().get(0).unwrap().as_real(),
        Some(0.5)
    );
}
