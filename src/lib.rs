//! # DICOM-SUV library
//!
//! This crate assembles DICOM series into volumes and converts PET volumes
//! to Standardized Uptake Values (SUV)
//!
//! This library is part of the dicom-rs ecosystem and leverages its component
//! to read the slices of a series and stack them into a volume.
//! Files are opened in parallel using rayon and grouped by
//! Series Instance UID. Each assembled series is then handed to a
//! [`PostProcessor`], such as the [`SuvEvaluator`], before being written
//! out as a NRRD file.
//!
//!  The SUV conversion constant is taken from one of three sources:
//!   - Vendor SUV and activity concentration scale factors (images in BQML)
//!   - Vendor SUV scale factor (images in CNTS)
//!   - Patient weight over the injected dose, decayed to the acquisition
//!     start if needed (images in BQML)
//!
//!  Series which are not PET, or whose attenuation and decay corrections
//!  are not understood, are written out unchanged.
//!  DICOM files are assumed to have the following attributes:
//!   - No multiframe (always the first frame is used)
//!   - Metadata relevant to the conversion is identical across the slices
//!     of a series (only the first slice is consulted)
//!
//! # Examples
//!
//! ## Converting a directory of PET slices
//!
//! ```no_run
//! # use dicom_suv::{Pipeline, SortBy, SuvEvaluator, nrrd};
//! let pipeline = Pipeline::new(SuvEvaluator, SortBy::ImagePositionPatient);
//! let outcomes = pipeline
//!     .process_directory("dicom")
//!     .expect("should have listed files in directory");
//! for outcome in outcomes {
//!     if let Ok(series) = outcome.result {
//!         let name = nrrd::output_file_name(&series.identity());
//!         nrrd::write_nrrd(&series.volume, name).expect("should have written volume");
//!     }
//! }
//! ```

pub mod dictionary;
pub mod enums;
pub mod metadata;
pub mod nrrd;
pub mod pipeline;
pub mod post_processing;
pub mod suv;
#[cfg(test)]
mod testing;
pub mod volume;
pub mod volume_loader;

pub use dictionary::{PetPrivateDictionary, SliceObject};
pub use enums::SortBy;
pub use pipeline::Pipeline;
pub use post_processing::{Identity, PostProcessor};
pub use suv::SuvEvaluator;
pub use volume::Volume;
pub use volume_loader::VolumeLoader;
