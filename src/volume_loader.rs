use crate::{
    dictionary::{PetPrivateDictionary, SliceFile, SliceObject},
    enums::SortBy,
    metadata::{SeriesIdentity, SliceRecord},
    volume::{Geometry, Volume, VoxelData},
};

use dicom::{
    object::OpenFileOptions,
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, Array3, s};
use rayon::prelude::*;
use std::{collections::BTreeMap, fs, path::Path};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Missing spacing information")]
    MissingSpacing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}

/// A series stacked into a volume,
/// along with the metadata records of its slices in stacking order.
/// The records no longer hold their pixel data.
#[derive(Debug)]
pub struct SeriesVolume {
    pub series_instance_uid: String,
    pub volume: Volume,
    pub slices: Vec<SliceObject>,
}

impl SeriesVolume {
    pub fn identity(&self) -> SeriesIdentity {
        let empty = SliceObject::new_empty_with_dict(PetPrivateDictionary);
        SliceRecord::new(self.slices.first().unwrap_or(&empty)).identity()
    }
}

type SliceWithOrder = (Option<f32>, Array2<f32>, SliceObject);

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from the DICOM objects of a single series
    ///
    /// # Arguments
    ///
    /// * `dicom_objects` - DICOM file objects of the series
    /// * `sort_by` - Method to sort the slices
    ///
    /// # Errors
    ///
    /// Returns error if no valid images found, dimensions are inconsistent
    /// or the spacing between voxels cannot be determined
    pub fn load_from_dicom_objects(
        dicom_objects: Vec<SliceFile>,
        sort_by: SortBy,
    ) -> Result<SeriesVolume, VolumeLoaderError> {
        let series_instance_uid = dicom_objects
            .first()
            .map(|dicom_object| Self::series_key(dicom_object))
            .unwrap_or_default();

        let mut slices_with_order: Vec<_> = dicom_objects
            .into_par_iter()
            .filter_map(|dicom_object| Self::extract_slice_with_order(dicom_object, &sort_by))
            .collect();

        if slices_with_order.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::sort_slices(&mut slices_with_order, sort_by);

        let (images, slices): (Vec<_>, Vec<_>) = slices_with_order
            .into_iter()
            .map(|(_, image, slice)| (image, slice))
            .unzip();

        Self::validate_dimensions(&images)?;

        let volume_array = Self::build_volume_array(&images);
        let data = Self::voxel_data(volume_array, &slices);
        let geometry = Self::get_geometry(&slices).ok_or(VolumeLoaderError::MissingSpacing)?;

        Ok(SeriesVolume {
            series_instance_uid,
            volume: Volume::new(data, geometry),
            slices,
        })
    }

    /// Open a DICOM file with the private PET attributes registered
    pub fn open_file(path: impl AsRef<Path>) -> Result<SliceFile, VolumeLoaderError> {
        Ok(OpenFileOptions::new()
            .dictionary(PetPrivateDictionary)
            .open_file(path.as_ref())?)
    }

    /// Open every file which can be read as DICOM, skipping the others
    pub fn open_files(paths: &[impl AsRef<Path> + Sync]) -> Vec<SliceFile> {
        paths
            .par_iter()
            .filter_map(|path| match Self::open_file(path) {
                Ok(dicom_object) => Some(dicom_object),
                Err(e) => {
                    debug!("Skipping {}: {}", path.as_ref().display(), e);
                    None
                }
            })
            .collect()
    }

    /// Split DICOM objects by their Series Instance UID
    pub fn group_by_series(dicom_objects: Vec<SliceFile>) -> BTreeMap<String, Vec<SliceFile>> {
        let mut series: BTreeMap<String, Vec<SliceFile>> = BTreeMap::new();
        for dicom_object in dicom_objects {
            series
                .entry(Self::series_key(&dicom_object))
                .or_default()
                .push(dicom_object);
        }
        series
    }

    /// Load one volume per series from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path> + Sync],
        sort_by: SortBy,
    ) -> Vec<Result<SeriesVolume, VolumeLoaderError>> {
        Self::group_by_series(Self::open_files(paths))
            .into_values()
            .map(|dicom_objects| Self::load_from_dicom_objects(dicom_objects, sort_by))
            .collect()
    }

    /// Load one volume per series from the files of a directory
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Vec<Result<SeriesVolume, VolumeLoaderError>>, VolumeLoaderError> {
        let paths = Self::list_files(path)?;
        Ok(Self::load_from_file_paths(&paths, sort_by))
    }

    /// List the regular files of a directory
    pub fn list_files(
        path: impl AsRef<Path>,
    ) -> Result<Vec<std::path::PathBuf>, VolumeLoaderError> {
        let paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();

        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }
        Ok(paths)
    }

    pub(crate) fn series_key(dicom_object: &SliceObject) -> String {
        SliceRecord::new(dicom_object)
            .string(tags::SERIES_INSTANCE_UID)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    fn extract_slice_with_order(
        dicom_object: SliceFile,
        sort_by: &SortBy,
    ) -> Option<SliceWithOrder> {
        let order = Self::get_sort_order(&dicom_object, sort_by)?;
        let image_2d = Self::decode_image(&dicom_object)?;
        let mut slice = dicom_object.into_inner();
        slice.remove_element(tags::PIXEL_DATA);
        Some((order, image_2d, slice))
    }

    fn get_sort_order(dicom_object: &SliceObject, sort_by: &SortBy) -> Option<Option<f32>> {
        let record = SliceRecord::new(dicom_object);
        match sort_by {
            SortBy::ImagePositionPatient => {
                let pos = record.decimals(tags::IMAGE_POSITION_PATIENT).ok()??;
                Some(pos.get(2).map(|&z| z as f32))
            }
            SortBy::TablePosition => {
                let pos = record.decimal(tags::TABLE_POSITION).ok().flatten();
                Some(pos.map(|p| p as f32))
            }
            SortBy::InstanceNumber => {
                let num = record.decimal(tags::INSTANCE_NUMBER).ok().flatten();
                Some(num.map(|n| n as f32))
            }
            SortBy::None => Some(Some(0.0)),
        }
    }

    fn decode_image(dicom_object: &SliceFile) -> Option<Array2<f32>> {
        let pixel_data = match dicom_object.decode_pixel_data() {
            Ok(pixel_data) => pixel_data,
            Err(e) => {
                debug!("Skipping slice without decodable pixel data: {}", e);
                return None;
            }
        };
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::Default)
            .with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }

    fn sort_slices(slices_with_order: &mut [SliceWithOrder], sort_by: SortBy) {
        if !matches!(sort_by, SortBy::None) {
            slices_with_order
                .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        }

        if matches!(sort_by, SortBy::ImagePositionPatient) {
            slices_with_order.reverse();
        }
    }

    fn validate_dimensions(images: &[Array2<f32>]) -> Result<(), VolumeLoaderError> {
        let first_dim = images[0].dim();
        if images.iter().any(|img| img.dim() != first_dim) {
            return Err(VolumeLoaderError::InconsistentDimensions);
        }
        Ok(())
    }

    fn build_volume_array(images: &[Array2<f32>]) -> Array3<f32> {
        let (height, width) = images[0].dim();
        let depth = images.len();
        let mut volume = Array3::<f32>::zeros((depth, height, width));

        for (i, image) in images.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(image);
        }

        volume
    }

    /// Keep the stored integer type unless some slice is rescaled
    fn voxel_data(volume: Array3<f32>, slices: &[SliceObject]) -> VoxelData {
        let rescaled = slices.iter().any(|slice| {
            let record = SliceRecord::new(slice);
            let slope = record.decimal(tags::RESCALE_SLOPE).ok().flatten();
            let intercept = record.decimal(tags::RESCALE_INTERCEPT).ok().flatten();
            slope.is_some_and(|slope| slope != 1.0) || intercept.is_some_and(|i| i != 0.0)
        });

        let record = SliceRecord::new(&slices[0]);
        let bits_allocated = record.decimal(tags::BITS_ALLOCATED).ok().flatten();
        if rescaled || bits_allocated.is_some_and(|bits| bits > 16.0) {
            return VoxelData::F32(volume);
        }

        let signed = record
            .decimal(tags::PIXEL_REPRESENTATION)
            .ok()
            .flatten()
            .is_some_and(|representation| representation == 1.0);
        if signed {
            VoxelData::I16(volume.mapv(|v| v as i16))
        } else {
            VoxelData::U16(volume.mapv(|v| v as u16))
        }
    }

    fn get_geometry(slices: &[SliceObject]) -> Option<Geometry> {
        let records: Vec<_> = slices.iter().map(SliceRecord::new).collect();

        // Pixel Spacing holds the row spacing (y) first
        let (y_spacing, x_spacing) = records.iter().find_map(|record| {
            let pixel_spacing = record.decimals(tags::PIXEL_SPACING).ok()??;
            Some((*pixel_spacing.first()?, *pixel_spacing.get(1)?))
        })?;

        let orientation = records
            .first()
            .and_then(|record| record.decimals(tags::IMAGE_ORIENTATION_PATIENT).ok()?)
            .filter(|orientation| orientation.len() == 6);
        let (row, column) = match orientation {
            Some(o) => ([o[0], o[1], o[2]], [o[3], o[4], o[5]]),
            None => ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        };

        let positions: Vec<_> = records
            .iter()
            .take(2)
            .filter_map(|record| record.decimals(tags::IMAGE_POSITION_PATIENT).ok()?)
            .filter(|position| position.len() == 3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();

        let step = match positions.as_slice() {
            [first, second] => {
                let step = sub(*second, *first);
                Some(step).filter(|step| norm(*step) > 0.0)
            }
            _ => None,
        };
        let (z_spacing, slice_direction) = match step {
            Some(step) => {
                let length = norm(step);
                (length, step.map(|v| v / length))
            }
            None => {
                let slice_thickness = records.iter().find_map(|record| {
                    record.decimal(tags::SLICE_THICKNESS).ok().flatten()
                })?;
                (slice_thickness, cross(row, column))
            }
        };

        Some(Geometry {
            spacing: (x_spacing as f32, y_spacing as f32, z_spacing as f32),
            origin: positions.first().copied().unwrap_or([0.0; 3]),
            direction: [row, column, slice_direction],
        })
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
