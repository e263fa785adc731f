//! Writing volumes as NRRD files (header followed by raw voxels).

use std::{
    collections::HashSet,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use thiserror::Error;

use crate::{
    metadata::SeriesIdentity,
    volume::{Volume, VoxelData},
};

#[derive(Debug, Error)]
pub enum NrrdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Voxel data is not contiguous in memory")]
    NonContiguous,
}

fn nrrd_type(data: &VoxelData) -> &'static str {
    match data {
        VoxelData::U16(_) => "unsigned short",
        VoxelData::I16(_) => "short",
        VoxelData::F32(_) => "float",
    }
}

fn endian() -> &'static str {
    if cfg!(target_endian = "little") {
        "little"
    } else {
        "big"
    }
}

fn vector(v: [f64; 3]) -> String {
    format!("({},{},{})", v[0], v[1], v[2])
}

/// Render the NRRD header of a volume, including the blank line ending it
pub fn header(volume: &Volume) -> String {
    let (depth, height, width) = volume.dim();
    let geometry = volume.geometry();
    let (x_spacing, y_spacing, z_spacing) = geometry.spacing;
    let [row, column, slice] = geometry.direction;
    let scaled = |direction: [f64; 3], spacing: f32| direction.map(|v| v * f64::from(spacing));

    format!(
        "NRRD0004\n\
         type: {}\n\
         dimension: 3\n\
         space: left-posterior-superior\n\
         sizes: {} {} {}\n\
         space directions: {} {} {}\n\
         kinds: domain domain domain\n\
         endian: {}\n\
         encoding: raw\n\
         space origin: {}\n\
         \n",
        nrrd_type(volume.data()),
        width,
        height,
        depth,
        vector(scaled(row, x_spacing)),
        vector(scaled(column, y_spacing)),
        vector(scaled(slice, z_spacing)),
        endian(),
        vector(geometry.origin),
    )
}

fn voxel_bytes(data: &VoxelData) -> Option<&[u8]> {
    match data {
        VoxelData::U16(data) => data.as_slice().map(bytemuck::cast_slice),
        VoxelData::I16(data) => data.as_slice().map(bytemuck::cast_slice),
        VoxelData::F32(data) => data.as_slice().map(bytemuck::cast_slice),
    }
}

/// Write a volume to `path` as an attached-header NRRD file
pub fn write_nrrd(volume: &Volume, path: impl AsRef<Path>) -> Result<(), NrrdError> {
    let bytes = voxel_bytes(volume.data()).ok_or(NrrdError::NonContiguous)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writer.write_all(header(volume).as_bytes())?;
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

fn file_stem(identity: &SeriesIdentity) -> String {
    format!(
        "{}_{}_{}_{}",
        identity.patient_name,
        identity.study_date,
        identity.series_number,
        identity.series_description
    )
    .chars()
    .map(|c| {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        }
    })
    .collect()
}

/// File name of the NRRD file for a series:
/// `<patient>_<studydate>_<seriesnumber>_<description>.nrrd`
pub fn output_file_name(identity: &SeriesIdentity) -> String {
    format!("{}.nrrd", file_stem(identity))
}

/// Hands out distinct file names to the series written in one run.
///
/// Series sharing an identity get a counter appended to the name,
/// starting at `_2` for the second one.
#[derive(Debug, Default)]
pub struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a file name for the series
    pub fn assign(&mut self, identity: &SeriesIdentity) -> String {
        let stem = file_stem(identity);
        let mut name = format!("{stem}.nrrd");
        let mut counter = 1;
        while !self.taken.insert(name.clone()) {
            counter += 1;
            name = format!("{stem}_{counter}.nrrd");
        }
        name
    }
}
