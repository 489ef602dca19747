use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use msgdoc_codec::{parse, to_document, CodecError};
use msgdoc_document::{Document, DocumentMap};
use msgdoc_schema::{
    DynamicMessage, FieldType, MessageDescriptor, Scalar, SchemaError, Timestamp,
};

fn sub_test_descriptor() -> Arc<MessageDescriptor> {
    MessageDescriptor::builder("test.SubTest")
        .field("value", FieldType::Int32)
        .build()
        .unwrap()
}

fn test_descriptor() -> Arc<MessageDescriptor> {
    let sub = sub_test_descriptor();
    MessageDescriptor::builder("test.Test")
        .field("int_value", FieldType::Int32)
        .field("float_value", FieldType::Float)
        .field("string_value", FieldType::String)
        .repeated("int_list", FieldType::Int32)
        .message("sub_test", &sub)
        .repeated_message("sub_test_list", &sub)
        .message("datetime_value", &Timestamp::descriptor())
        .build()
        .unwrap()
}

fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 7, 13, 8, 30, 15)
        .unwrap()
        .checked_add_signed(chrono::Duration::nanoseconds(123_456_789))
        .unwrap()
}

fn populated_test() -> DynamicMessage {
    let mut msg = DynamicMessage::new(test_descriptor());
    msg.set("int_value", 123).unwrap();
    msg.set("float_value", 123.456_f32).unwrap();
    msg.set("string_value", "Hello World!").unwrap();
    for i in 1..=5 {
        msg.push("int_list", i).unwrap();
    }
    msg.child_mut("sub_test").unwrap().set("value", 100).unwrap();
    for i in 1..=3 {
        msg.add_child("sub_test_list")
            .unwrap()
            .set("value", i)
            .unwrap();
    }
    Timestamp::from_datetime(&instant())
        .write_to(msg.child_mut("datetime_value").unwrap())
        .unwrap();
    msg
}

fn map_of(doc: &Document) -> &DocumentMap {
    doc.as_map().expect("document is a map")
}

// ---------------------------------------------------------------------------
// Serializer

#[test]
fn message_to_document_matches_fixture() {
    let doc = to_document(&populated_test()).unwrap();
    let expected = Document::from_pairs([
        ("int_value", Document::Int32(123)),
        ("float_value", Document::Float(123.456)),
        ("string_value", Document::from("Hello World!")),
        (
            "int_list",
            Document::Array((1..=5).map(Document::Int32).collect()),
        ),
        (
            "sub_test",
            Document::from_pairs([("value", Document::Int32(100))]),
        ),
        (
            "sub_test_list",
            Document::Array(
                (1..=3)
                    .map(|i| Document::from_pairs([("value", Document::Int32(i))]))
                    .collect(),
            ),
        ),
        ("datetime_value", Document::DateTime(instant())),
    ]);
    assert_eq!(doc, expected);

    let keys: Vec<&str> = map_of(&doc).keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "int_value",
            "float_value",
            "string_value",
            "int_list",
            "sub_test",
            "sub_test_list",
            "datetime_value"
        ],
        "declaration order"
    );
}

#[test]
fn default_message_emits_only_primitives() {
    let doc = to_document(&DynamicMessage::new(test_descriptor())).unwrap();
    assert_eq!(
        doc,
        Document::from_pairs([
            ("int_value", Document::Int32(0)),
            ("float_value", Document::Float(0.0)),
            ("string_value", Document::from("")),
        ])
    );
}

#[test]
fn set_but_default_child_is_emitted() {
    let mut msg = DynamicMessage::new(test_descriptor());
    msg.child_mut("sub_test").unwrap();
    let doc = to_document(&msg).unwrap();
    assert_eq!(
        doc.get("sub_test"),
        Some(&Document::from_pairs([("value", Document::Int32(0))]))
    );
}

#[test]
fn top_level_timestamp_is_a_datetime() {
    let msg = Timestamp::from_datetime(&instant()).to_message();
    assert_eq!(to_document(&msg).unwrap(), Document::DateTime(instant()));
}

#[test]
fn unrepresentable_timestamp_is_an_error() {
    let mut msg = DynamicMessage::new(test_descriptor());
    Timestamp::new(i64::MAX, 0)
        .write_to(msg.child_mut("datetime_value").unwrap())
        .unwrap();
    assert_eq!(
        to_document(&msg).unwrap_err(),
        CodecError::TimestampOutOfRange {
            path: "/datetime_value".into(),
            seconds: i64::MAX,
            nanos: 0,
        }
    );
}

// ---------------------------------------------------------------------------
// Parser

#[test]
fn parse_fixture_document() {
    let doc = Document::from_pairs([
        ("int_value", Document::Int32(123)),
        ("float_value", Document::Float(123.456)),
        ("string_value", Document::from("Hello World!")),
        (
            "int_list",
            Document::Array((1..=5).map(Document::Int32).collect()),
        ),
        (
            "sub_test",
            Document::from_pairs([("value", Document::Int32(100))]),
        ),
        (
            "sub_test_list",
            Document::Array(
                (1..=3)
                    .map(|i| Document::from_pairs([("value", Document::Int32(i))]))
                    .collect(),
            ),
        ),
        ("datetime_value", Document::DateTime(instant())),
    ]);
    let mut msg = DynamicMessage::new(test_descriptor());
    let parsed = parse(&doc, &mut msg).unwrap();
    assert_eq!(*parsed, populated_test());
}

#[test]
fn roundtrip_of_fixture() {
    let original = populated_test();
    let doc = to_document(&original).unwrap();
    let mut back = DynamicMessage::new(test_descriptor());
    parse(&doc, &mut back).unwrap();
    assert_eq!(back, original);
}

#[test]
fn parse_returns_the_target() {
    let mut msg = DynamicMessage::new(sub_test_descriptor());
    let doc = Document::from_pairs([("value", Document::Int32(9))]);
    parse(&doc, &mut msg).unwrap().set("value", 10).unwrap();
    assert_eq!(msg.get("value").unwrap(), &Scalar::Int32(10));
}

#[test]
fn integer_width_matrix() {
    let descriptor = MessageDescriptor::builder("test.Widths")
        .field("i32", FieldType::Int32)
        .field("u32", FieldType::UInt32)
        .field("i64", FieldType::SInt64)
        .field("u64", FieldType::Fixed64)
        .field("f32", FieldType::Float)
        .field("f64", FieldType::Double)
        .build()
        .unwrap();
    let doc = Document::from_pairs([
        ("i32", Document::Int64(-5)),
        ("u32", Document::Int64(i64::from(u32::MAX))),
        ("i64", Document::Int32(7)),
        ("u64", Document::Int64(8)),
        ("f32", Document::Double(0.25)),
        ("f64", Document::Int32(3)),
    ]);
    let mut msg = DynamicMessage::new(descriptor);
    parse(&doc, &mut msg).unwrap();
    assert_eq!(msg.get("i32").unwrap(), &Scalar::Int32(-5));
    assert_eq!(msg.get("u32").unwrap(), &Scalar::UInt32(u32::MAX));
    assert_eq!(msg.get("i64").unwrap(), &Scalar::Int64(7));
    assert_eq!(msg.get("u64").unwrap(), &Scalar::UInt64(8));
    assert_eq!(msg.get("f32").unwrap(), &Scalar::Float(0.25));
    assert_eq!(msg.get("f64").unwrap(), &Scalar::Double(3.0));
}

#[test]
fn type_mismatch_matrix() {
    let cases = vec![
        (
            Document::from_pairs([("int_value", Document::from("x"))]),
            "/int_value",
            "int32",
            "string",
        ),
        (
            Document::from_pairs([("int_value", Document::Int64(i64::from(i32::MAX) + 1))]),
            "/int_value",
            "int32",
            "int64",
        ),
        (
            Document::from_pairs([("int_value", Document::Null)]),
            "/int_value",
            "int32",
            "null",
        ),
        (
            Document::from_pairs([("int_list", Document::Int32(1))]),
            "/int_list",
            "array",
            "int32",
        ),
        (
            Document::from_pairs([(
                "int_list",
                Document::Array(vec![Document::Int32(1), Document::Bool(true)]),
            )]),
            "/int_list/1",
            "int32",
            "bool",
        ),
        (
            Document::from_pairs([("sub_test", Document::Int32(1))]),
            "/sub_test",
            "map",
            "int32",
        ),
        (
            Document::from_pairs([(
                "sub_test_list",
                Document::Array(vec![
                    Document::from_pairs([("value", Document::Int32(1))]),
                    Document::from_pairs([("value", Document::Int32(2))]),
                    Document::from_pairs([("value", Document::from("three"))]),
                ]),
            )]),
            "/sub_test_list/2/value",
            "int32",
            "string",
        ),
        (
            Document::from_pairs([(
                "datetime_value",
                Document::from_pairs([("seconds", Document::Int64(1))]),
            )]),
            "/datetime_value",
            "datetime",
            "map",
        ),
        (Document::Array(vec![]), "", "map", "array"),
    ];
    for (doc, path, expected, found) in cases {
        let mut msg = DynamicMessage::new(test_descriptor());
        let err = parse(&doc, &mut msg).unwrap_err();
        assert_eq!(
            err,
            CodecError::TypeMismatch {
                path: path.into(),
                expected,
                found,
            },
            "mismatch for {doc:?}"
        );
    }
}

#[test]
fn parse_into_timestamp_requires_a_datetime() {
    let mut msg = Timestamp::default().to_message();
    let err = parse(&Document::Int64(0), &mut msg).unwrap_err();
    assert_eq!(
        err,
        CodecError::TypeMismatch {
            path: String::new(),
            expected: "datetime",
            found: "int64",
        }
    );

    parse(&Document::DateTime(instant()), &mut msg).unwrap();
    assert_eq!(
        Timestamp::from_message(&msg).unwrap(),
        Timestamp::from_datetime(&instant())
    );
}

#[test]
fn leap_second_parses_to_a_valid_timestamp() {
    let leap = DateTime::parse_from_rfc3339("2016-12-31T23:59:60.500Z")
        .unwrap()
        .with_timezone(&Utc);
    let mut msg = Timestamp::default().to_message();
    parse(&Document::DateTime(leap), &mut msg).unwrap();

    let ts = Timestamp::from_message(&msg).unwrap();
    assert!((0..1_000_000_000).contains(&ts.nanos), "nanos out of range: {ts:?}");
    let last_nano = Utc.with_ymd_and_hms(2016, 12, 31, 23, 59, 59).unwrap()
        + chrono::Duration::nanoseconds(999_999_999);
    assert_eq!(Timestamp::from_datetime(&last_nano), ts);

    let doc = to_document(&msg).unwrap();
    assert_eq!(doc, Document::DateTime(last_nano));
    let mut reparsed = Timestamp::default().to_message();
    parse(&doc, &mut reparsed).unwrap();
    assert_eq!(reparsed, msg);
    assert_eq!(to_document(&reparsed).unwrap(), doc);
}

#[test]
fn schema_errors_are_wrapped() {
    let err: CodecError = SchemaError::EmptyTypeName.into();
    assert!(matches!(err, CodecError::Schema(SchemaError::EmptyTypeName)));
}

// ---------------------------------------------------------------------------
// Scenarios

fn scenario_a_descriptor() -> Arc<MessageDescriptor> {
    MessageDescriptor::builder("test.ScenarioA")
        .field("id", FieldType::Int64)
        .field("name", FieldType::String)
        .repeated("tags", FieldType::String)
        .build()
        .unwrap()
}

#[test]
fn scenario_a_roundtrip_and_missing_repeated_key() {
    let mut msg = DynamicMessage::new(scenario_a_descriptor());
    msg.set("id", 123_i64).unwrap();
    msg.set("name", "Hello").unwrap();
    msg.push("tags", "a").unwrap();
    msg.push("tags", "b").unwrap();

    let doc = to_document(&msg).unwrap();
    let mut back = DynamicMessage::new(scenario_a_descriptor());
    parse(&doc, &mut back).unwrap();
    assert_eq!(back, msg);

    let partial = Document::from_pairs([
        ("id", Document::Int32(123)),
        ("name", Document::from("Hello")),
    ]);
    parse(&partial, &mut back).unwrap();
    assert_eq!(back.get("id").unwrap(), &Scalar::Int64(123));
    assert!(back.get_list("tags").unwrap().is_empty());
}

#[test]
fn scenario_b_unset_and_empty_fields_are_omitted() {
    let address = MessageDescriptor::builder("test.Address")
        .field("street", FieldType::String)
        .build()
        .unwrap();
    let contact = MessageDescriptor::builder("test.Contact")
        .field("email", FieldType::String)
        .build()
        .unwrap();
    let person = MessageDescriptor::builder("test.Person")
        .field("name", FieldType::String)
        .message("address", &address)
        .repeated_message("contacts", &contact)
        .build()
        .unwrap();

    let mut msg = DynamicMessage::new(person);
    msg.set("name", "Ada").unwrap();
    let doc = to_document(&msg).unwrap();
    assert!(!map_of(&doc).contains_key("address"));
    assert!(!map_of(&doc).contains_key("contacts"));

    msg.add_child("contacts")
        .unwrap()
        .set("email", "ada@example.com")
        .unwrap();
    let doc = to_document(&msg).unwrap();
    assert!(!map_of(&doc).contains_key("address"));
    assert_eq!(
        doc.get("contacts"),
        Some(&Document::Array(vec![Document::from_pairs([(
            "email",
            Document::from("ada@example.com")
        )])]))
    );
}

#[test]
fn scenario_c_timestamp_field_is_native() {
    let event = MessageDescriptor::builder("test.Event")
        .message("at", &Timestamp::descriptor())
        .build()
        .unwrap();
    let mut msg = DynamicMessage::new(Arc::clone(&event));
    Timestamp::from_datetime(&instant())
        .write_to(msg.child_mut("at").unwrap())
        .unwrap();

    let doc = to_document(&msg).unwrap();
    assert_eq!(doc.get("at"), Some(&Document::DateTime(instant())));

    let mut back = DynamicMessage::new(event);
    parse(&doc, &mut back).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn scenario_d_parse_clears_stale_fields() {
    let mut msg = populated_test();
    let doc = Document::from_pairs([("string_value", Document::from("only"))]);
    parse(&doc, &mut msg).unwrap();

    let mut expected = DynamicMessage::new(test_descriptor());
    expected.set("string_value", "only").unwrap();
    assert_eq!(msg, expected);
    assert!(msg.child("sub_test").unwrap().is_none());
    assert!(msg.children("sub_test_list").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Properties on fixed inputs

#[test]
fn parsing_twice_is_idempotent() {
    let doc = to_document(&populated_test()).unwrap();
    let mut once = DynamicMessage::new(test_descriptor());
    parse(&doc, &mut once).unwrap();
    let mut twice = once.clone();
    parse(&doc, &mut twice).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn unknown_keys_are_ignored_at_every_level() {
    let clean = to_document(&populated_test()).unwrap();
    let mut noisy = clean.clone();
    let map = noisy.as_map_mut().unwrap();
    map.insert("legacy_field".into(), Document::Bool(true));
    map.insert("_id".into(), Document::from("64b0f0c2a1b2c3d4e5f60718"));
    if let Some(Document::Map(sub)) = map.get_mut("sub_test") {
        sub.insert("extra".into(), Document::Array(vec![]));
    }

    let mut a = DynamicMessage::new(test_descriptor());
    let mut b = DynamicMessage::new(test_descriptor());
    parse(&clean, &mut a).unwrap();
    parse(&noisy, &mut b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_array_parses_as_empty_repeated() {
    let doc = Document::from_pairs([
        ("int_list", Document::Array(vec![])),
        ("sub_test_list", Document::Array(vec![])),
    ]);
    let mut msg = populated_test();
    parse(&doc, &mut msg).unwrap();
    assert_eq!(msg, DynamicMessage::new(test_descriptor()));
}

#[test]
fn bytes_and_unsigned_fields_roundtrip() {
    let descriptor = MessageDescriptor::builder("test.Blob")
        .field("data", FieldType::Bytes)
        .field("size", FieldType::UInt64)
        .repeated("flags", FieldType::Bool)
        .build()
        .unwrap();
    let mut msg = DynamicMessage::new(Arc::clone(&descriptor));
    msg.set("data", vec![0_u8, 159, 255]).unwrap();
    msg.set("size", u64::MAX).unwrap();
    msg.push("flags", true).unwrap();
    msg.push("flags", false).unwrap();

    let doc = to_document(&msg).unwrap();
    assert_eq!(doc.get("data"), Some(&Document::Bytes(vec![0, 159, 255])));
    assert_eq!(doc.get("size"), Some(&Document::UInt64(u64::MAX)));

    let mut back = DynamicMessage::new(descriptor);
    parse(&doc, &mut back).unwrap();
    assert_eq!(back, msg);
}
