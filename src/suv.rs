//! Conversion of PET volumes to Standardized Uptake Values (SUV).
//!
//! The conversion constant is derived from the metadata of the first slice,
//! which is taken to describe the whole series.
//! Three sources are supported, tried in this order:
//!
//!  - the vendor SUV scale factor (7053,1000) over the activity concentration
//!    scale factor (7053,1009), for images in Bq/ml;
//!  - the vendor SUV scale factor alone, for images in counts;
//!  - body weight over the injected dose,
//!    decayed to the acquisition start when the images are decay corrected
//!    to that time.
//!
//! Series which do not look like attenuation and decay corrected PET
//! are passed through untouched.

use std::fmt;

use dicom::core::Tag;
use dicom_dictionary_std::tags;
use thiserror::Error;
use tracing::{info, warn, warn_span};

use crate::dictionary::{ACTIVITY_CONCENTRATION_SCALE_FACTOR, SUV_SCALE_FACTOR, SliceObject};
use crate::enums::{DecayCorrection, Units};
use crate::metadata::{MetadataError, SliceRecord};
use crate::post_processing::PostProcessor;
use crate::volume::Volume;

#[derive(Debug, Error)]
pub enum SuvError {
    #[error("No slice records given for the volume")]
    NoSlices,

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Missing required attribute {name} {tag}")]
    MissingAttribute { name: &'static str, tag: Tag },

    #[error("Radiopharmaceutical information sequence has no items")]
    EmptyRadiopharmaceuticalSequence,

    #[error("Cannot divide by {name}, which is zero")]
    ZeroDivisor { name: &'static str },
}

/// Why a volume was left unconverted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No radiopharmaceutical information, probably not PET
    NotPet,
    MissingSanityTag(&'static str),
    /// The corrections applied to the images are not supported
    SanityChecksFailed,
    UnexpectedUnits(Units),
    MissingRequiredTag(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotPet => f.write_str("Radionuclide information sequence not found"),
            SkipReason::MissingSanityTag(name) => {
                write!(f, "Missing required sanity check tag \"{name}\"")
            }
            SkipReason::SanityChecksFailed => f.write_str("Sanity checks failed"),
            SkipReason::UnexpectedUnits(units) => write!(f, "Unexpected units \"{units}\""),
            SkipReason::MissingRequiredTag(name) => write!(f, "Missing required tag \"{name}\""),
        }
    }
}

/// The values a conversion constant was computed from
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionPath {
    /// Vendor scale factors, images in Bq/ml
    ActivityConcentration {
        suv_scale_factor: f64,
        activity_concentration_scale_factor: f64,
    },
    /// Vendor scale factor, images in counts
    Counts { suv_scale_factor: f64 },
    /// Body weight over the decayed injected dose
    DecayCorrected {
        /// in kg
        body_weight: f64,
        /// in Bq
        injected_dose: f64,
        /// in s
        half_life: f64,
        /// Seconds between administration and acquisition start,
        /// if the dose had to be decayed
        decay_time: Option<f64>,
        /// in Bq
        decayed_dose: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConstant {
    pub value: f64,
    pub path: ConversionPath,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuvConversion {
    Skip(SkipReason),
    Scale(ConversionConstant),
}

/// Converts PET volumes to SUV.
///
/// The first slice record is taken to be representative of the whole volume:
/// callers must only pass records of a single series.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuvEvaluator;

impl SuvEvaluator {
    /// Decide how the volume described by `slices` should be converted,
    /// without touching any voxels.
    ///
    /// # Errors
    ///
    /// Returns an error if `slices` is empty,
    /// or if an attribute needed for the conversion is present but malformed.
    pub fn conversion(&self, slices: &[SliceObject]) -> Result<SuvConversion, SuvError> {
        let record = first_record(slices)?;
        let _span = series_span(&record).entered();
        decide(&record)
    }

    /// Convert the volume to SUV, or return it unchanged if it does not qualify.
    ///
    /// # Errors
    ///
    /// Same as [`conversion`](SuvEvaluator::conversion).
    pub fn evaluate(&self, mut volume: Volume, slices: &[SliceObject]) -> Result<Volume, SuvError> {
        let record = first_record(slices)?;
        let _span = series_span(&record).entered();

        match decide(&record)? {
            SuvConversion::Skip(_) => Ok(volume),
            SuvConversion::Scale(constant) => {
                info!(
                    suv_constant = constant.value,
                    path = ?constant.path,
                    "Applying SUV conversion"
                );
                volume.scale(constant.value as f32);
                Ok(volume)
            }
        }
    }
}

impl PostProcessor for SuvEvaluator {
    type Error = SuvError;

    fn process(&self, volume: Volume, slices: &[SliceObject]) -> Result<Volume, SuvError> {
        self.evaluate(volume, slices)
    }
}

fn first_record(slices: &[SliceObject]) -> Result<SliceRecord<'_>, SuvError> {
    slices.first().map(SliceRecord::new).ok_or(SuvError::NoSlices)
}

fn series_span(record: &SliceRecord<'_>) -> tracing::Span {
    let identity = record.identity();
    warn_span!(
        "suv",
        patient_name = %identity.patient_name,
        study_date = %identity.study_date,
        series_number = identity.series_number,
        series_description = %identity.series_description,
    )
}

fn skip(reason: SkipReason) -> Result<SuvConversion, SuvError> {
    warn!("{reason}, skipping");
    Ok(SuvConversion::Skip(reason))
}

fn decide(record: &SliceRecord<'_>) -> Result<SuvConversion, SuvError> {
    let Some(radiopharmaceutical) = record.items(tags::RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE)
    else {
        return skip(SkipReason::NotPet);
    };

    let Some(corrected_image) = record.strings(tags::CORRECTED_IMAGE)? else {
        return skip(SkipReason::MissingSanityTag("CorrectedImage"));
    };
    let Some(decay_correction) = record.string(tags::DECAY_CORRECTION)? else {
        return skip(SkipReason::MissingSanityTag("DecayCorrection"));
    };
    let Some(units) = record.string(tags::UNITS)? else {
        return skip(SkipReason::MissingSanityTag("Units"));
    };
    let decay_correction = DecayCorrection::from(decay_correction.as_str());
    let units = Units::from(units.as_str());

    let attenuation_corrected = corrected_image.iter().any(|c| c == "ATTN");
    let decay_corrected = corrected_image.iter().any(|c| c == "DECAY" || c == "DECY");
    let known_reference = matches!(
        decay_correction,
        DecayCorrection::Start | DecayCorrection::Admin
    );
    if !(attenuation_corrected && decay_corrected && known_reference) {
        return skip(SkipReason::SanityChecksFailed);
    }

    if record.contains(SUV_SCALE_FACTOR) {
        return vendor_scale_factor(record, units);
    }

    if units != Units::Bqml {
        return skip(SkipReason::UnexpectedUnits(units));
    }
    decay_corrected_dose(record, radiopharmaceutical, &decay_correction)
}

fn required_decimal(
    record: &SliceRecord<'_>,
    tag: Tag,
    name: &'static str,
) -> Result<f64, SuvError> {
    record
        .decimal(tag)?
        .ok_or(SuvError::MissingAttribute { name, tag })
}

fn nonzero(value: f64, name: &'static str) -> Result<f64, SuvError> {
    if value == 0.0 {
        return Err(SuvError::ZeroDivisor { name });
    }
    Ok(value)
}

fn vendor_scale_factor(record: &SliceRecord<'_>, units: Units) -> Result<SuvConversion, SuvError> {
    let (value, path) = match units {
        Units::Bqml => {
            let suv_scale_factor = required_decimal(record, SUV_SCALE_FACTOR, "SUVScaleFactor")?;
            let activity_concentration_scale_factor = required_decimal(
                record,
                ACTIVITY_CONCENTRATION_SCALE_FACTOR,
                "ActivityConcentrationScaleFactor",
            )?;
            let value = suv_scale_factor
                / nonzero(
                    activity_concentration_scale_factor,
                    "ActivityConcentrationScaleFactor",
                )?;
            (
                value,
                ConversionPath::ActivityConcentration {
                    suv_scale_factor,
                    activity_concentration_scale_factor,
                },
            )
        }
        Units::Cnts => {
            let suv_scale_factor = required_decimal(record, SUV_SCALE_FACTOR, "SUVScaleFactor")?;
            (suv_scale_factor, ConversionPath::Counts { suv_scale_factor })
        }
        other => return skip(SkipReason::UnexpectedUnits(other)),
    };

    Ok(SuvConversion::Scale(ConversionConstant { value, path }))
}

fn decay_corrected_dose(
    record: &SliceRecord<'_>,
    radiopharmaceutical: &[SliceObject],
    decay_correction: &DecayCorrection,
) -> Result<SuvConversion, SuvError> {
    if !record.contains(tags::SERIES_TIME) {
        return skip(SkipReason::MissingRequiredTag("SeriesTime"));
    }
    let Some(body_weight) = record.decimal(tags::PATIENT_WEIGHT)? else {
        return skip(SkipReason::MissingRequiredTag("PatientWeight"));
    };

    let item = radiopharmaceutical
        .first()
        .map(SliceRecord::new)
        .ok_or(SuvError::EmptyRadiopharmaceuticalSequence)?;
    let Some(half_life) = item.decimal(tags::RADIONUCLIDE_HALF_LIFE)? else {
        return skip(SkipReason::MissingRequiredTag("RadionuclideHalfLife"));
    };
    let Some(injected_dose) = item.decimal(tags::RADIONUCLIDE_TOTAL_DOSE)? else {
        return skip(SkipReason::MissingRequiredTag("RadionuclideTotalDose"));
    };
    if !item.contains(tags::RADIOPHARMACEUTICAL_START_TIME) {
        return skip(SkipReason::MissingRequiredTag(
            "RadiopharmaceuticalStartTime",
        ));
    }

    let (decay_time, decayed_dose) = if *decay_correction == DecayCorrection::Start {
        // images are decay corrected to the acquisition start,
        // so the dose has to be decayed over the time since administration
        let series_time = record
            .time(tags::SERIES_TIME)?
            .ok_or(SuvError::MissingAttribute {
                name: "SeriesTime",
                tag: tags::SERIES_TIME,
            })?;
        let admin_time = item
            .time(tags::RADIOPHARMACEUTICAL_START_TIME)?
            .ok_or(SuvError::MissingAttribute {
                name: "RadiopharmaceuticalStartTime",
                tag: tags::RADIOPHARMACEUTICAL_START_TIME,
            })?;
        // same day assumed
        let decay_time = (series_time - admin_time).num_milliseconds() as f64 / 1000.0;
        let half_life = nonzero(half_life, "RadionuclideHalfLife")?;
        (
            Some(decay_time),
            injected_dose * 2_f64.powf(-decay_time / half_life),
        )
    } else {
        (None, injected_dose)
    };

    let value = body_weight * 1000.0 / nonzero(decayed_dose, "decayed dose")?;

    Ok(SuvConversion::Scale(ConversionConstant {
        value,
        path: ConversionPath::DecayCorrected {
            body_weight,
            injected_dose,
            half_life,
            decay_time,
            decayed_dose,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::PetPrivateDictionary;
    use crate::volume::{Geometry, VoxelData};
    use dicom::core::value::DataSetSequence;
    use dicom::core::{DataElement, PrimitiveValue, VR, dicom_value};
    use crate::testing::{slice_object, text};
    use dicom::object::mem::InMemElement;
    use ndarray::{Array3, array};

    const F18_HALF_LIFE: &str = "6588";

    fn radiopharmaceutical(
        elements: Vec<InMemElement<PetPrivateDictionary>>,
    ) -> InMemElement<PetPrivateDictionary> {
        DataElement::new(
            tags::RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![slice_object(elements)]),
        )
    }

    /// A decay corrected PET slice in Bq/ml without vendor scale factors
    fn pet_slice(decay_correction: &str) -> SliceObject {
        slice_object(vec![
            text(tags::PATIENT_NAME, VR::PN, "Doe^John"),
            text(tags::STUDY_DATE, VR::DA, "20200101"),
            text(tags::SERIES_NUMBER, VR::IS, "3"),
            text(tags::SERIES_DESCRIPTION, VR::LO, "PET WB"),
            DataElement::new(
                tags::CORRECTED_IMAGE,
                VR::CS,
                dicom_value!(Strs, ["ATTN", "DECY"]),
            ),
            text(tags::DECAY_CORRECTION, VR::CS, decay_correction),
            text(tags::UNITS, VR::CS, "BQML"),
            text(tags::SERIES_TIME, VR::TM, "120000"),
            text(tags::PATIENT_WEIGHT, VR::DS, "70.0"),
            radiopharmaceutical(vec![
                text(tags::RADIONUCLIDE_HALF_LIFE, VR::DS, F18_HALF_LIFE),
                text(tags::RADIONUCLIDE_TOTAL_DOSE, VR::DS, "3.7e8"),
                text(tags::RADIOPHARMACEUTICAL_START_TIME, VR::TM, "113000"),
            ]),
        ])
    }

    fn with(mut object: SliceObject, element: InMemElement<PetPrivateDictionary>) -> SliceObject {
        object.put(element);
        object
    }

    fn without(mut object: SliceObject, tag: Tag) -> SliceObject {
        object.remove_element(tag);
        object
    }

    fn constant(slices: &[SliceObject]) -> ConversionConstant {
        match SuvEvaluator.conversion(slices).expect("conversion should succeed") {
            SuvConversion::Scale(constant) => constant,
            SuvConversion::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    fn skip_reason(slices: &[SliceObject]) -> SkipReason {
        match SuvEvaluator.conversion(slices).expect("conversion should succeed") {
            SuvConversion::Skip(reason) => reason,
            SuvConversion::Scale(constant) => panic!("unexpected conversion: {constant:?}"),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            ((actual - expected) / expected).abs() < 1e-9,
            "{actual} is not close to {expected}"
        );
    }

    #[test]
    fn empty_slices_are_an_error() {
        assert!(matches!(
            SuvEvaluator.conversion(&[]),
            Err(SuvError::NoSlices)
        ));
    }

    #[test]
    fn skips_series_without_radiopharmaceutical_information() {
        let slice = without(
            pet_slice("START"),
            tags::RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
        );
        assert_eq!(skip_reason(&[slice]), SkipReason::NotPet);
    }

    #[test]
    fn skips_series_missing_sanity_tags() {
        for (tag, name) in [
            (tags::CORRECTED_IMAGE, "CorrectedImage"),
            (tags::DECAY_CORRECTION, "DecayCorrection"),
            (tags::UNITS, "Units"),
        ] {
            let slice = without(pet_slice("START"), tag);
            assert_eq!(skip_reason(&[slice]), SkipReason::MissingSanityTag(name));
        }
    }

    #[test]
    fn skips_unsupported_correction_models() {
        let no_attenuation = with(
            pet_slice("START"),
            DataElement::new(tags::CORRECTED_IMAGE, VR::CS, dicom_value!(Strs, ["DECY"])),
        );
        let no_decay = with(
            pet_slice("START"),
            DataElement::new(tags::CORRECTED_IMAGE, VR::CS, dicom_value!(Strs, ["ATTN"])),
        );
        let no_reference = pet_slice("NONE");

        for slice in [no_attenuation, no_decay, no_reference] {
            assert_eq!(skip_reason(&[slice]), SkipReason::SanityChecksFailed);
        }
    }

    #[test]
    fn accepts_both_decay_spellings() {
        let slice = with(
            pet_slice("ADMIN"),
            DataElement::new(
                tags::CORRECTED_IMAGE,
                VR::CS,
                dicom_value!(Strs, ["NORM", "DECAY", "ATTN"]),
            ),
        );
        assert!(matches!(
            SuvEvaluator.conversion(&[slice]).unwrap(),
            SuvConversion::Scale(_)
        ));
    }

    #[test]
    fn vendor_factors_in_bqml() {
        let slice = with(
            with(
                pet_slice("START"),
                text(SUV_SCALE_FACTOR, VR::DS, "0.00025"),
            ),
            text(ACTIVITY_CONCENTRATION_SCALE_FACTOR, VR::DS, "0.5"),
        );
        let constant = constant(&[slice]);
        assert_close(constant.value, 0.0005);
        assert_eq!(
            constant.path,
            ConversionPath::ActivityConcentration {
                suv_scale_factor: 0.00025,
                activity_concentration_scale_factor: 0.5,
            }
        );
    }

    #[test]
    fn vendor_factor_in_counts() {
        let slice = with(
            with(pet_slice("START"), text(tags::UNITS, VR::CS, "CNTS")),
            text(SUV_SCALE_FACTOR, VR::DS, "0.00031"),
        );
        let constant = constant(&[slice]);
        assert_eq!(constant.value, 0.00031);
        assert_eq!(
            constant.path,
            ConversionPath::Counts {
                suv_scale_factor: 0.00031
            }
        );
    }

    #[test]
    fn vendor_factor_with_other_units_is_skipped() {
        let slice = with(
            with(pet_slice("START"), text(tags::UNITS, VR::CS, "GML")),
            text(SUV_SCALE_FACTOR, VR::DS, "0.00031"),
        );
        assert_eq!(
            skip_reason(&[slice]),
            SkipReason::UnexpectedUnits(Units::Other("GML".to_owned()))
        );
    }

    #[test]
    fn missing_activity_concentration_factor_is_an_error() {
        let slice = with(
            pet_slice("START"),
            text(SUV_SCALE_FACTOR, VR::DS, "0.00025"),
        );
        assert!(matches!(
            SuvEvaluator.conversion(&[slice]),
            Err(SuvError::MissingAttribute { tag, .. }) if tag == ACTIVITY_CONCENTRATION_SCALE_FACTOR
        ));
    }

    #[test]
    fn zero_activity_concentration_factor_is_an_error() {
        let slice = with(
            with(
                pet_slice("START"),
                text(SUV_SCALE_FACTOR, VR::DS, "0.00025"),
            ),
            text(ACTIVITY_CONCENTRATION_SCALE_FACTOR, VR::DS, "0"),
        );
        assert!(matches!(
            SuvEvaluator.conversion(&[slice]),
            Err(SuvError::ZeroDivisor { .. })
        ));
    }

    #[test]
    fn decay_path_requires_bqml() {
        let slice = with(pet_slice("START"), text(tags::UNITS, VR::CS, "CNTS"));
        assert_eq!(
            skip_reason(&[slice]),
            SkipReason::UnexpectedUnits(Units::Cnts)
        );
    }

    #[test]
    fn decay_path_skips_missing_required_tags() {
        for (tag, name) in [
            (tags::SERIES_TIME, "SeriesTime"),
            (tags::PATIENT_WEIGHT, "PatientWeight"),
        ] {
            let slice = without(pet_slice("START"), tag);
            assert_eq!(skip_reason(&[slice]), SkipReason::MissingRequiredTag(name));
        }

        let slice = with(
            pet_slice("START"),
            radiopharmaceutical(vec![
                text(tags::RADIONUCLIDE_HALF_LIFE, VR::DS, F18_HALF_LIFE),
                text(tags::RADIOPHARMACEUTICAL_START_TIME, VR::TM, "113000"),
            ]),
        );
        assert_eq!(
            skip_reason(&[slice]),
            SkipReason::MissingRequiredTag("RadionuclideTotalDose")
        );
    }

    #[test]
    fn decay_path_skips_blank_required_values() {
        let slice = with(
            pet_slice("START"),
            DataElement::new(tags::PATIENT_WEIGHT, VR::DS, PrimitiveValue::Empty),
        );
        assert_eq!(
            skip_reason(&[slice]),
            SkipReason::MissingRequiredTag("PatientWeight")
        );

        let slice = with(pet_slice("START"), text(tags::PATIENT_WEIGHT, VR::DS, ""));
        assert_eq!(
            skip_reason(&[slice]),
            SkipReason::MissingRequiredTag("PatientWeight")
        );

        let slice = with(
            pet_slice("START"),
            radiopharmaceutical(vec![
                text(tags::RADIONUCLIDE_HALF_LIFE, VR::DS, F18_HALF_LIFE),
                DataElement::new(tags::RADIONUCLIDE_TOTAL_DOSE, VR::DS, PrimitiveValue::Empty),
                text(tags::RADIOPHARMACEUTICAL_START_TIME, VR::TM, "113000"),
            ]),
        );
        assert_eq!(
            skip_reason(&[slice]),
            SkipReason::MissingRequiredTag("RadionuclideTotalDose")
        );

        let slice = with(
            pet_slice("START"),
            radiopharmaceutical(vec![
                text(tags::RADIONUCLIDE_HALF_LIFE, VR::DS, " "),
                text(tags::RADIONUCLIDE_TOTAL_DOSE, VR::DS, "3.7e8"),
                text(tags::RADIOPHARMACEUTICAL_START_TIME, VR::TM, "113000"),
            ]),
        );
        assert_eq!(
            skip_reason(&[slice]),
            SkipReason::MissingRequiredTag("RadionuclideHalfLife")
        );
    }

    #[test]
    fn empty_radiopharmaceutical_sequence_is_an_error() {
        let slice = with(
            pet_slice("START"),
            DataElement::new(
                tags::RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
                VR::SQ,
                DataSetSequence::<SliceObject>::from(Vec::new()),
            ),
        );
        assert!(matches!(
            SuvEvaluator.conversion(&[slice]),
            Err(SuvError::EmptyRadiopharmaceuticalSequence)
        ));
    }

    #[test]
    fn admin_reference_ignores_times() {
        let slice = with(
            pet_slice("ADMIN"),
            text(tags::SERIES_TIME, VR::TM, "not a time"),
        );
        let constant = constant(&[slice]);
        assert_close(constant.value, 70.0 * 1000.0 / 3.7e8);
        assert!(matches!(
            constant.path,
            ConversionPath::DecayCorrected {
                decay_time: None,
                ..
            }
        ));
    }

    #[test]
    fn start_reference_without_elapsed_time_keeps_dose() {
        let slice = with(
            pet_slice("START"),
            text(tags::SERIES_TIME, VR::TM, "113000"),
        );
        let constant = constant(&[slice]);
        assert_close(constant.value, 70.0 * 1000.0 / 3.7e8);
    }

    #[test]
    fn start_reference_after_one_half_life_halves_dose() {
        // 6588 s after 11:30:00
        let slice = with(
            pet_slice("START"),
            text(tags::SERIES_TIME, VR::TM, "131948"),
        );
        let constant = constant(&[slice]);
        match constant.path {
            ConversionPath::DecayCorrected {
                decayed_dose,
                decay_time,
                ..
            } => {
                assert_eq!(decay_time, Some(6588.0));
                assert_close(decayed_dose, 3.7e8 / 2.0);
            }
            other => panic!("unexpected path {other:?}"),
        }
        assert_close(constant.value, 70.0 * 1000.0 / (3.7e8 / 2.0));
    }

    #[test]
    fn malformed_time_is_an_error() {
        let slice = with(
            pet_slice("START"),
            text(tags::SERIES_TIME, VR::TM, "12:00:00"),
        );
        assert!(matches!(
            SuvEvaluator.conversion(&[slice]),
            Err(SuvError::Metadata(MetadataError::InvalidTime { .. }))
        ));
    }

    #[test]
    fn malformed_dose_is_an_error() {
        let slice = with(
            pet_slice("START"),
            radiopharmaceutical(vec![
                text(tags::RADIONUCLIDE_HALF_LIFE, VR::DS, F18_HALF_LIFE),
                text(tags::RADIONUCLIDE_TOTAL_DOSE, VR::DS, "lots"),
                text(tags::RADIOPHARMACEUTICAL_START_TIME, VR::TM, "113000"),
            ]),
        );
        assert!(matches!(
            SuvEvaluator.conversion(&[slice]),
            Err(SuvError::Metadata(_))
        ));
    }

    #[test]
    fn only_first_slice_is_consulted() {
        let second = slice_object(vec![]);
        let constant = constant(&[pet_slice("ADMIN"), second]);
        assert_close(constant.value, 70.0 * 1000.0 / 3.7e8);
    }

    #[test]
    fn evaluate_scales_voxels() {
        let slice = with(
            with(pet_slice("START"), text(tags::UNITS, VR::CS, "CNTS")),
            text(SUV_SCALE_FACTOR, VR::DS, "0.5"),
        );
        let volume = Volume::new(array![[[2_u16, 4], [6, 8]]], Geometry::default());
        let volume = SuvEvaluator.evaluate(volume, &[slice]).unwrap();
        assert_eq!(
            volume.data(),
            &VoxelData::F32(array![[[1.0_f32, 2.0], [3.0, 4.0]]])
        );
    }

    #[test]
    fn evaluate_passes_skipped_volumes_through() {
        let slice = without(
            pet_slice("START"),
            tags::RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE,
        );
        let data = Array3::<u16>::from_elem((2, 2, 2), 7);
        let volume = Volume::new(data.clone(), Geometry::default());
        let volume = SuvEvaluator.evaluate(volume, &[slice]).unwrap();
        assert_eq!(volume.data(), &VoxelData::U16(data));
    }
}
