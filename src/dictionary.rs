//! Registration of the vendor private PET attributes.
//!
//! Some scanners store the SUV scale factors in a private group
//! which the standard dictionary knows nothing about.
//! [`PetPrivateDictionary`] layers those definitions over the
//! [`StandardDataDictionary`], so that the scale factors
//! can be looked up by name and tag.
//!
//! The definitions do not reach the parser.
//! In files with an implicit VR transfer syntax
//! the scale factors are still read with VR `UN`,
//! and [`SliceRecord::decimal`](crate::metadata::SliceRecord::decimal)
//! reads those bytes as the decimal string they hold.

use dicom::core::dictionary::{DataDictionary, DataDictionaryEntryRef, TagRange, VirtualVr};
use dicom::core::{Tag, VR};
use dicom::object::{FileDicomObject, InMemDicomObject};
use dicom_dictionary_std::StandardDataDictionary;

/// Private creator of the block holding the scale factors.
pub const PRIVATE_CREATOR: &str = "Philips PET Private Group";

/// SUV Scale Factor (7053,1000), DS, VM 1
pub const SUV_SCALE_FACTOR: Tag = Tag(0x7053, 0x1000);

/// Activity Concentration Scale Factor (7053,1009), DS, VM 1
pub const ACTIVITY_CONCENTRATION_SCALE_FACTOR: Tag = Tag(0x7053, 0x1009);

static PRIVATE_ENTRIES: [DataDictionaryEntryRef<'static>; 2] = [
    DataDictionaryEntryRef {
        tag: TagRange::Single(SUV_SCALE_FACTOR),
        alias: "SUVScaleFactor",
        vr: VirtualVr::Exact(VR::DS),
    },
    DataDictionaryEntryRef {
        tag: TagRange::Single(ACTIVITY_CONCENTRATION_SCALE_FACTOR),
        alias: "ActivityConcentrationScaleFactor",
        vr: VirtualVr::Exact(VR::DS),
    },
];

/// The standard data dictionary extended with the private PET scale factors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PetPrivateDictionary;

impl DataDictionary for PetPrivateDictionary {
    type Entry = DataDictionaryEntryRef<'static>;

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        PRIVATE_ENTRIES
            .iter()
            .find(|entry| entry.tag.inner() == tag)
            .or_else(|| StandardDataDictionary.by_tag(tag))
    }

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        PRIVATE_ENTRIES
            .iter()
            .find(|entry| entry.alias == name)
            .or_else(|| StandardDataDictionary.by_name(name))
    }
}

/// The metadata record of a single slice.
pub type SliceObject = InMemDicomObject<PetPrivateDictionary>;

/// A slice as read from a DICOM file.
pub type SliceFile = FileDicomObject<SliceObject>;
