//! The `Mapper` facade over encoding, decoding and inspection.

use crate::decoder;
use crate::encoder;
use crate::error::Result;
use crate::inspector::{MappingInspector, MappingReport};
use crate::metadata::Record;
use crate::schema::Mapped;
use crate::source::RecordSource;

/// The main entry point for mapping structs to and from records.
#[derive(Debug)]
pub struct Mapper;

impl Mapper {
    /// Encodes a mapped struct into a new record.
    ///
    /// # Arguments
    /// * `value`: The struct to encode. Must derive `Mapped`.
    pub fn encode<T: Mapped>(value: &T) -> Result<Record> {
        encoder::encode(value)
    }

    /// Decodes a record-shaped source into `target`.
    ///
    /// # Arguments
    /// * `source`: A record, batch record, or any type describing itself as one.
    /// * `target`: The struct to populate. Fields absent from the source keep their value.
    pub fn decode<S, T>(source: &S, target: &mut T) -> Result<()>
    where
        S: RecordSource,
        T: Mapped,
    {
        decoder::decode(source, target)
    }

    /// Decodes into a fresh default instance of `T`.
    pub fn decode_new<S, T>(source: &S) -> Result<T>
    where
        S: RecordSource,
        T: Mapped + Default,
    {
        let mut target = T::default();
        decoder::decode(source, &mut target)?;
        Ok(target)
    }

    /// Returns the mapping report of `T`.
    pub fn inspect<T: Mapped + Default>() -> Result<MappingReport> {
        MappingInspector::inspect::<T>()
    }
}
