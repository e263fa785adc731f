//! Conversion of a set of DICOM files into one volume per series.
//!
//! Every series is assembled by the [`VolumeLoader`]
//! and then handed to the [`PostProcessor`] the pipeline was built with.
//! A series that fails never prevents the others from being converted.

use std::path::Path;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info};

use crate::enums::SortBy;
use crate::post_processing::PostProcessor;
use crate::volume_loader::{SeriesVolume, VolumeLoader, VolumeLoaderError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] VolumeLoaderError),

    #[error("Post-processing failed: {0}")]
    PostProcessing(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The result of converting one series
#[derive(Debug)]
pub struct SeriesOutcome {
    pub series_instance_uid: String,
    pub result: Result<SeriesVolume, PipelineError>,
}

pub struct Pipeline<P> {
    post_processor: P,
    sort_by: SortBy,
}

impl<P> Pipeline<P>
where
    P: PostProcessor + Sync,
{
    pub fn new(post_processor: P, sort_by: SortBy) -> Self {
        Self {
            post_processor,
            sort_by,
        }
    }

    /// Apply the post-processing step to an assembled series
    pub fn process_series(&self, series: SeriesVolume) -> Result<SeriesVolume, PipelineError> {
        let SeriesVolume {
            series_instance_uid,
            volume,
            slices,
        } = series;
        let volume = self
            .post_processor
            .process(volume, &slices)
            .map_err(|e| PipelineError::PostProcessing(e.into()))?;
        Ok(SeriesVolume {
            series_instance_uid,
            volume,
            slices,
        })
    }

    /// Assemble and post-process every series found in the given files
    pub fn process_files(&self, paths: &[impl AsRef<Path> + Sync]) -> Vec<SeriesOutcome> {
        let series = VolumeLoader::group_by_series(VolumeLoader::open_files(paths));
        info!("Found {} series in {} files", series.len(), paths.len());

        series
            .into_par_iter()
            .map(|(series_instance_uid, dicom_objects)| {
                let result = VolumeLoader::load_from_dicom_objects(dicom_objects, self.sort_by)
                    .map_err(PipelineError::from)
                    .and_then(|series| self.process_series(series));
                if let Err(e) = &result {
                    error!(
                        series_instance_uid = %series_instance_uid,
                        "Failed to convert series: {}", e
                    );
                }
                SeriesOutcome {
                    series_instance_uid,
                    result,
                }
            })
            .collect()
    }

    /// Assemble and post-process every series found in a directory
    pub fn process_directory(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<SeriesOutcome>, VolumeLoaderError> {
        let paths = VolumeLoader::list_files(path)?;
        Ok(self.process_files(&paths))
    }
}
