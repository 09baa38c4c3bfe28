//! Storage-client stand-ins shared by the integration tests.
#![allow(dead_code)]

use aeromap::{
    Bins, Component, Key, KeyValue, Mapped, Metadata, RecordKey, RecordSource, Shape, UserValue,
    Value,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// A client key: namespace, set, user key and the digest derived from them.
#[derive(Debug, Clone)]
pub struct TestKey {
    namespace: String,
    set_name: String,
    user_key: Value,
    digest: [u8; 20],
}

impl TestKey {
    pub fn new(namespace: &str, set_name: &str, user_key: impl Into<Value>) -> Self {
        let user_key = user_key.into();
        let hash = Sha256::digest(format!("{set_name}:{user_key}").as_bytes());
        let mut digest = [0u8; 20];
        digest.copy_from_slice(&hash[..20]);
        Self {
            namespace: namespace.to_string(),
            set_name: set_name.to_string(),
            user_key,
            digest,
        }
    }
}

impl RecordKey for TestKey {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn set_name(&self) -> &str {
        &self.set_name
    }

    fn value(&self) -> Option<&dyn UserValue> {
        (!self.user_key.is_nil()).then_some(&self.user_key as &dyn UserValue)
    }

    fn digest(&self) -> &[u8] {
        &self.digest
    }
}

/// A client record.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub key: Option<TestKey>,
    pub bins: Bins,
    pub generation: u32,
    pub expiration: u32,
}

impl RecordSource for TestRecord {
    fn shape(&self) -> Shape<'_> {
        let mut components = Vec::new();
        if let Some(key) = &self.key {
            components.push(Component::Key(key));
        }
        components.push(Component::Bins(&self.bins));
        components.push(Component::Generation);
        components.push(Component::Expiration);
        Shape::Struct {
            name: "TestRecord",
            components,
        }
    }

    fn generation(&self) -> Option<u32> {
        Some(self.generation)
    }

    fn expiration(&self) -> Option<u32> {
        Some(self.expiration)
    }
}

/// A batch command result wrapping a record.
#[derive(Debug, Clone, Default)]
pub struct BatchRecord {
    pub key: Option<TestKey>,
    pub record: Option<TestRecord>,
    pub result_code: i32,
    pub in_doubt: bool,
}

impl RecordSource for BatchRecord {
    fn shape(&self) -> Shape<'_> {
        let mut components = Vec::new();
        if let Some(key) = &self.key {
            components.push(Component::Key(key));
        }
        if let Some(record) = &self.record {
            components.push(Component::Record(record));
        }
        Shape::Struct {
            name: "BatchRecord",
            components,
        }
    }
}

/// A batch read request embedding its result.
#[derive(Debug, Clone, Default)]
pub struct BatchRead {
    pub batch_record: BatchRecord,
    pub bin_names: Vec<String>,
    pub read_all_bins: bool,
}

impl RecordSource for BatchRead {
    fn shape(&self) -> Shape<'_> {
        Shape::Struct {
            name: "BatchRead",
            components: vec![Component::BatchRecord(&self.batch_record)],
        }
    }
}

#[derive(Debug, Default, PartialEq, Mapped)]
pub struct Item1 {
    #[aero("title")]
    pub title: String,
}

#[derive(Debug, Default, PartialEq, Mapped)]
pub struct Item2 {
    #[aero("name")]
    pub name: String,
    #[aero("empty")]
    pub empty: bool,
    #[aero("size")]
    pub size: u64,
}

#[derive(Debug, Default, PartialEq, Mapped)]
pub struct Item {
    #[aero(flatten)]
    pub key: Key,
    #[aero(flatten)]
    pub key_value: KeyValue,
    #[aero(flatten)]
    pub metadata: Metadata,
    #[aero(flatten)]
    pub item1: Item1,
    #[aero(flatten)]
    pub item2: Option<Item2>,
    #[aero("label,omit")]
    pub label: String,
    #[aero("length")]
    pub length: i64,
    #[aero("offset, omitempty")]
    pub offset: Option<i64>,
    #[aero("description ,omitempty")]
    pub description: String,
    #[aero("list")]
    pub int_list: Vec<i64>,
    #[aero("dict,omitempty")]
    pub dict: HashMap<String, i64>,
}

pub fn test_bins() -> Bins {
    let mut bins = Bins::new();
    bins.insert("label".into(), Value::from("label1"));
    bins.insert("length".into(), Value::from(10));
    bins.insert("title".into(), Value::from("title1"));
    bins.insert("name".into(), Value::from("name1"));
    bins.insert("empty".into(), Value::from(true));
    bins.insert("list".into(), Value::from(vec![1, 2, 3]));
    bins.insert(
        "dict".into(),
        Value::Map(vec![
            (Value::from("a"), Value::from(1)),
            (Value::from("b"), Value::from(2)),
            (Value::from("c"), Value::from(3)),
        ]),
    );
    bins
}

pub fn new_test_record() -> TestRecord {
    TestRecord {
        key: Some(TestKey::new("ns1", "set1", "key1")),
        bins: test_bins(),
        generation: 3,
        expiration: 1_000,
    }
}

pub fn expected_dict() -> HashMap<String, i64> {
    [("a", 1), ("b", 2), ("c", 3)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
