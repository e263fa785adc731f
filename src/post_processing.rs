use std::convert::Infallible;

use crate::dictionary::SliceObject;
use crate::volume::Volume;

/// A step applied to every assembled series before it is written out.
///
/// `slices` holds the metadata records of the series,
/// in the same order as the slices of `volume`.
/// It is never empty.
pub trait PostProcessor {
    type Error: std::error::Error + Send + Sync + 'static;

    fn process(&self, volume: Volume, slices: &[SliceObject]) -> Result<Volume, Self::Error>;
}

/// Leaves every volume as it was assembled
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl PostProcessor for Identity {
    type Error = Infallible;

    fn process(&self, volume: Volume, _slices: &[SliceObject]) -> Result<Volume, Infallible> {
        Ok(volume)
    }
}

impl<F, E> PostProcessor for F
where
    F: Fn(Volume, &[SliceObject]) -> Result<Volume, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn process(&self, volume: Volume, slices: &[SliceObject]) -> Result<Volume, E> {
        self(volume, slices)
    }
}
