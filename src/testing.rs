//! Builders for in-memory slice records used across the unit tests.

use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::object::mem::InMemElement;

use crate::dictionary::{PetPrivateDictionary, SliceObject};

pub(crate) fn text(tag: Tag, vr: VR, value: &str) -> InMemElement<PetPrivateDictionary> {
    DataElement::new(tag, vr, PrimitiveValue::from(value))
}

pub(crate) fn slice_object(elements: Vec<InMemElement<PetPrivateDictionary>>) -> SliceObject {
    let mut object = SliceObject::new_empty_with_dict(PetPrivateDictionary);
    for element in elements {
        object.put(element);
    }
    object
}
