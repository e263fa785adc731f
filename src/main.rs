//! A CLI tool for converting the DICOM series of a directory
//! into NRRD volumes, scaling PET series to SUV.
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use dicom_suv::{Identity, Pipeline, PostProcessor, SortBy, SuvEvaluator, nrrd};
use tracing::{Level, error, info, warn};

/// Convert DICOM series into NRRD volumes, applying SUV conversion to PET
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// Directory holding the DICOM files to convert
    input: PathBuf,

    /// Directory to write the NRRD files to
    #[arg(short = 'o', long = "out", default_value = ".")]
    output: PathBuf,

    /// Order in which the slices of a series are stacked
    #[arg(long = "sort-by", value_enum, default_value = "ipp")]
    sort_by: SortArg,

    /// Write volumes as assembled, without SUV conversion
    #[arg(long = "no-suv")]
    no_suv: bool,

    /// Print more information about the conversion
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// Image Position (Patient), head first
    Ipp,
    /// Table Position
    Table,
    /// Instance Number
    Instance,
    /// Keep the order in which files were read
    None,
}

impl From<SortArg> for SortBy {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Ipp => SortBy::ImagePositionPatient,
            SortArg::Table => SortBy::TablePosition,
            SortArg::Instance => SortBy::InstanceNumber,
            SortArg::None => SortBy::None,
        }
    }
}

fn main() {
    let App {
        input,
        output,
        sort_by,
        no_suv,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!("[ERROR] Could not set up global logging subscriber: {}", e);
    });

    std::fs::create_dir_all(&output).unwrap_or_else(|e| {
        error!("Could not create {}: {}", output.display(), e);
        std::process::exit(-1);
    });

    let sort_by = SortBy::from(sort_by);
    let written = if no_suv {
        convert(Pipeline::new(Identity, sort_by), &input, &output)
    } else {
        convert(Pipeline::new(SuvEvaluator, sort_by), &input, &output)
    };

    if written == 0 {
        error!("No series could be converted from {}", input.display());
        std::process::exit(-2);
    }
}

/// Run the pipeline over `input` and write every converted series to `output`,
/// returning the number of volumes written
fn convert<P>(pipeline: Pipeline<P>, input: &Path, output: &Path) -> usize
where
    P: PostProcessor + Sync,
{
    let outcomes = pipeline.process_directory(input).unwrap_or_else(|e| {
        error!("Could not read {}: {}", input.display(), e);
        std::process::exit(-1);
    });

    let mut names = nrrd::OutputNames::new();
    outcomes
        .into_iter()
        .filter_map(|outcome| outcome.result.ok())
        .filter(|series| {
            let identity = series.identity();
            let name = names.assign(&identity);
            if name != nrrd::output_file_name(&identity) {
                warn!(
                    series_instance_uid = %series.series_instance_uid,
                    "Another series is also named after {}, writing {}", identity, name
                );
            }
            let path = output.join(name);
            match nrrd::write_nrrd(&series.volume, &path) {
                Ok(()) => {
                    info!("Volume saved to {}", path.display());
                    true
                }
                Err(e) => {
                    error!("Could not write {}: {}", path.display(), e);
                    false
                }
            }
        })
        .count()
}
