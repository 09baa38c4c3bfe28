#![allow(missing_docs)]

mod common;

use aeromap::{Mapped, MapperError, RecordKey, Result, Value, decode, encode};
use common::{Item, expected_dict, new_test_record};

#[test]
fn test_encode_decoded_item() -> Result<()> {
    let record = new_test_record();
    let mut item = Item::default();
    decode(&record, &mut item)?;

    let encoded = encode(&item)?;
    tracing::debug!(?encoded, "encoded item");

    let Some(key) = &record.key else {
        panic!("test record must carry a key");
    };

    // metadata fields
    assert_eq!(encoded.key.namespace, "ns1");
    assert_eq!(encoded.key.set_name, "set1");
    assert_eq!(encoded.key_value.user_key, Value::from("key1"));
    assert_eq!(&encoded.key.digest[..], key.digest());
    assert_eq!(encoded.metadata.generation, 3);
    assert_eq!(encoded.metadata.expiration, 1_000);

    // bin fields
    assert_eq!(encoded.bin("label"), None); // omit tag
    assert_eq!(encoded.bin("length"), Some(&Value::from(10)));
    assert_eq!(encoded.bin("title"), Some(&Value::from("title1")));
    assert_eq!(encoded.bin("description"), None); // omitempty tag
    assert_eq!(encoded.bin("offset"), None); // omitempty tag
    assert_eq!(encoded.bin("list"), Some(&Value::from(vec![1, 2, 3])));
    assert_eq!(encoded.bins.len(), 4);

    let mut copy = Item::default();
    decode(&encoded, &mut copy)?;
    assert_eq!(copy.dict, expected_dict());
    Ok(())
}

#[test]
fn test_encode_does_not_touch_input() -> Result<()> {
    let mut item = Item::default();
    decode(&new_test_record(), &mut item)?;
    let before = format!("{item:?}");
    encode(&item)?;
    assert_eq!(format!("{item:?}"), before);
    Ok(())
}

#[derive(Debug, Default, Mapped)]
struct Listing {
    #[aero("desc,omitempty")]
    desc: String,
    #[aero("stock,omitempty")]
    stock: u32,
    #[aero("price")]
    price: f64,
    #[aero("tags")]
    tags: Vec<String>,
    #[aero("note")]
    note: Option<String>,
    #[aero("secret,omit")]
    secret: String,
}

#[test]
fn test_omitempty_skips_empty_values() -> Result<()> {
    let encoded = encode(&Listing::default())?;
    assert_eq!(encoded.bin("desc"), None);
    assert!(!encoded.bins.contains_key("desc"));
    assert_eq!(encoded.bin("stock"), None);
    Ok(())
}

#[test]
fn test_omitempty_keeps_non_empty_values() -> Result<()> {
    let listing = Listing {
        desc: "boxed".into(),
        stock: 4,
        ..Listing::default()
    };
    let encoded = encode(&listing)?;
    assert_eq!(encoded.bin("desc"), Some(&Value::from("boxed")));
    assert_eq!(encoded.bin("stock"), Some(&Value::from(4)));
    Ok(())
}

#[test]
fn test_empty_fields_are_written_as_zero_values() -> Result<()> {
    let encoded = encode(&Listing::default())?;
    assert_eq!(encoded.bin("price"), Some(&Value::Float(0.0)));
    assert_eq!(encoded.bin("tags"), Some(&Value::List(Vec::new())));
    assert_eq!(encoded.bin("note"), Some(&Value::Nil));
    assert_eq!(encoded.bins.len(), 3);
    Ok(())
}

#[test]
fn test_omit_is_never_written() -> Result<()> {
    for secret in ["", "hunter2"] {
        let listing = Listing {
            secret: secret.into(),
            ..Listing::default()
        };
        assert_eq!(encode(&listing)?.bin("secret"), None);
    }
    Ok(())
}

#[derive(Debug, Default, Mapped)]
struct BadUserKey {
    #[aero("meta,user_key")]
    user_key: String,
}

#[test]
fn test_metadata_type_mismatch() -> Result<()> {
    // empty values are never routed, so the mismatch goes unnoticed
    encode(&BadUserKey::default())?;

    let err = encode(&BadUserKey {
        user_key: "k".into(),
    });
    assert!(matches!(
        err,
        Err(MapperError::TypeMismatch { ref name, .. }) if name == "user_key"
    ));
    Ok(())
}

#[derive(Debug, Default, Mapped)]
struct LoneMeta {
    #[aero("meta")]
    value: i32,
    #[aero("meta,ttl")]
    ttl: u32,
}

#[test]
fn test_lone_meta_is_a_bin() -> Result<()> {
    let encoded = encode(&LoneMeta { value: 8, ttl: 30 })?;
    assert_eq!(encoded.bin("meta"), Some(&Value::from(8)));
    // unknown metadata names route nowhere
    assert_eq!(encoded.bins.len(), 1);
    assert_eq!(encoded.metadata.expiration, 0);
    Ok(())
}

#[derive(Debug, Default, Mapped)]
struct Counter {
    #[aero("count,omitempty")]
    count: Option<i32>,
    #[aero("limit")]
    limit: Option<i32>,
}

#[test]
fn test_optional_field_is_empty_when_pointee_is_empty() -> Result<()> {
    let encoded = encode(&Counter {
        count: Some(0),
        limit: Some(0),
    })?;
    assert_eq!(encoded.bin("count"), None);
    // no omit flag: written as the field type's zero value
    assert_eq!(encoded.bin("limit"), Some(&Value::Nil));

    let encoded = encode(&Counter {
        count: Some(2),
        limit: Some(5),
    })?;
    assert_eq!(encoded.bin("count"), Some(&Value::from(2)));
    assert_eq!(encoded.bin("limit"), Some(&Value::from(5)));
    Ok(())
}

#[derive(Debug, Default, PartialEq, Mapped)]
struct Blob {
    #[aero("raw")]
    raw: Vec<u8>,
    #[aero("fixed")]
    fixed: [u8; 4],
}

#[test]
fn test_byte_containers_encode_as_bytes() -> Result<()> {
    let blob = Blob {
        raw: vec![1, 2],
        fixed: [3, 4, 5, 6],
    };
    let encoded = encode(&blob)?;
    assert_eq!(encoded.bin("raw"), Some(&Value::Bytes(vec![1, 2])));
    assert_eq!(encoded.bin("fixed"), Some(&Value::Bytes(vec![3, 4, 5, 6])));

    let mut copy = Blob::default();
    decode(&encoded, &mut copy)?;
    assert_eq!(copy, blob);
    Ok(())
}
