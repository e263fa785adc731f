//! Typed access to the attributes of a slice record.
//!
//! Every accessor returns `Ok(None)` when the attribute is absent,
//! and fails only if the attribute is present but cannot be interpreted.
//! Defaults are only ever applied in [`SeriesIdentity`],
//! which exists for diagnostics.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveTime;
use dicom::core::{PrimitiveValue, Tag, VR};
use dicom::object::mem::InMemElement;
use dicom_dictionary_std::tags;
use thiserror::Error;

use crate::dictionary::{PetPrivateDictionary, SliceObject};

/// Time of day layout of the TM attributes consulted here.
const TIME_FORMAT: &str = "%H%M%S";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Could not read {tag} as {expected}: {source}")]
    Convert {
        tag: Tag,
        expected: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Value {value:?} of {tag} is not a decimal string")]
    InvalidDecimal { tag: Tag, value: String },

    #[error("Value {value:?} of {tag} is not a time of day formatted as HHMMSS")]
    InvalidTime {
        tag: Tag,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Read-only view over the attributes of one slice
/// (or of one item of a sequence within it).
#[derive(Debug, Clone, Copy)]
pub struct SliceRecord<'a> {
    object: &'a SliceObject,
}

impl<'a> SliceRecord<'a> {
    pub fn new(object: &'a SliceObject) -> Self {
        Self { object }
    }

    fn element(&self, tag: Tag) -> Option<&'a InMemElement<PetPrivateDictionary>> {
        self.object.get(tag)
    }

    /// Whether the attribute is present, regardless of its value
    pub fn contains(&self, tag: Tag) -> bool {
        self.element(tag).is_some()
    }

    /// Retrieve a single string value, with padding removed
    pub fn string(&self, tag: Tag) -> Result<Option<String>, MetadataError> {
        let Some(element) = self.element(tag) else {
            return Ok(None);
        };
        let value = element.to_str().map_err(|e| MetadataError::Convert {
            tag,
            expected: "a string",
            source: e.into(),
        })?;
        Ok(Some(trim_padding(&value).to_owned()))
    }

    /// Retrieve all values of a multi-valued string attribute
    pub fn strings(&self, tag: Tag) -> Result<Option<Vec<String>>, MetadataError> {
        let Some(element) = self.element(tag) else {
            return Ok(None);
        };
        let values = element
            .to_multi_str()
            .map_err(|e| MetadataError::Convert {
                tag,
                expected: "a list of strings",
                source: e.into(),
            })?;
        Ok(Some(
            values
                .iter()
                .map(|value| trim_padding(value).to_owned())
                .collect(),
        ))
    }

    /// Retrieve a decimal value.
    ///
    /// An attribute without a value, or holding only padding,
    /// reads as absent.
    /// Attributes left with an unknown value representation
    /// are read as the ASCII decimal string they are expected to hold.
    pub fn decimal(&self, tag: Tag) -> Result<Option<f64>, MetadataError> {
        let Some(element) = self.element(tag).filter(|element| !is_blank(element)) else {
            return Ok(None);
        };

        if element.vr() == VR::UN {
            let bytes = element
                .value()
                .primitive()
                .map(|value| value.to_bytes())
                .unwrap_or(Cow::Borrowed(&[]));
            let text = String::from_utf8_lossy(&bytes);
            let text = trim_padding(&text);
            return text
                .parse::<f64>()
                .map(Some)
                .map_err(|_| MetadataError::InvalidDecimal {
                    tag,
                    value: text.to_owned(),
                });
        }

        element
            .to_float64()
            .map(Some)
            .map_err(|e| MetadataError::Convert {
                tag,
                expected: "a decimal",
                source: e.into(),
            })
    }

    /// Retrieve all values of a multi-valued decimal attribute
    pub fn decimals(&self, tag: Tag) -> Result<Option<Vec<f64>>, MetadataError> {
        let Some(element) = self.element(tag) else {
            return Ok(None);
        };
        element
            .to_multi_float64()
            .map(Some)
            .map_err(|e| MetadataError::Convert {
                tag,
                expected: "a list of decimals",
                source: e.into(),
            })
    }

    /// Retrieve a time of day in the form `HHMMSS`
    pub fn time(&self, tag: Tag) -> Result<Option<NaiveTime>, MetadataError> {
        let Some(value) = self.string(tag)? else {
            return Ok(None);
        };
        NaiveTime::parse_from_str(&value, TIME_FORMAT)
            .map(Some)
            .map_err(|source| MetadataError::InvalidTime { tag, value, source })
    }

    /// Retrieve the items of a sequence attribute
    pub fn items(&self, tag: Tag) -> Option<&'a [SliceObject]> {
        self.element(tag).and_then(|element| element.value().items())
    }

    /// Collect the identification attributes of the record
    pub fn identity(&self) -> SeriesIdentity {
        let patient_name = self
            .string(tags::PATIENT_NAME)
            .ok()
            .flatten()
            .and_then(|name| name.split('^').next().map(str::to_owned))
            .unwrap_or_default();
        let study_date = self
            .string(tags::STUDY_DATE)
            .ok()
            .flatten()
            .unwrap_or_else(|| "19000101".to_owned());
        let series_description = self
            .string(tags::SERIES_DESCRIPTION)
            .ok()
            .flatten()
            .unwrap_or_else(|| "Unkn".to_owned());
        let series_number = self
            .element(tags::SERIES_NUMBER)
            .and_then(|element| element.to_int::<i32>().ok())
            .unwrap_or(-1);

        SeriesIdentity {
            patient_name,
            study_date,
            series_number,
            series_description,
        }
    }
}

fn trim_padding(value: &str) -> &str {
    value.trim_matches(|c: char| c == ' ' || c == '\0')
}

fn is_blank(element: &InMemElement<PetPrivateDictionary>) -> bool {
    match element.value().primitive() {
        Some(PrimitiveValue::Empty) => true,
        Some(PrimitiveValue::Str(value)) => trim_padding(value).is_empty(),
        Some(PrimitiveValue::Strs(values)) => {
            values.iter().all(|value| trim_padding(value).is_empty())
        }
        Some(PrimitiveValue::U8(bytes)) => bytes.iter().all(|&b| b == b' ' || b == 0),
        _ => false,
    }
}

/// Attributes identifying a series in log messages and output names.
/// They never take part in any computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesIdentity {
    pub patient_name: String,
    pub study_date: String,
    pub series_number: i32,
    pub series_description: String,
}

impl fmt::Display for SeriesIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patient {}, studydate {} series {}. {}",
            self.patient_name, self.study_date, self.series_number, self.series_description
        )
    }
}
