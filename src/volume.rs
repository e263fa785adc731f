use ndarray::Array3;

/// Voxel storage of a volume, indexed as (depth, height, width)
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelData {
    U16(Array3<u16>),
    I16(Array3<i16>),
    F32(Array3<f32>),
}

impl Default for VoxelData {
    fn default() -> Self {
        VoxelData::F32(Array3::zeros((0, 0, 0)))
    }
}

impl VoxelData {
    pub fn dim(&self) -> (usize, usize, usize) {
        match self {
            VoxelData::U16(data) => data.dim(),
            VoxelData::I16(data) => data.dim(),
            VoxelData::F32(data) => data.dim(),
        }
    }

    /// Convert the voxels to 32-bit floating point
    pub fn into_float32(self) -> Array3<f32> {
        match self {
            VoxelData::U16(data) => data.mapv(f32::from),
            VoxelData::I16(data) => data.mapv(f32::from),
            VoxelData::F32(data) => data,
        }
    }
}

impl From<Array3<u16>> for VoxelData {
    fn from(data: Array3<u16>) -> Self {
        VoxelData::U16(data)
    }
}

impl From<Array3<i16>> for VoxelData {
    fn from(data: Array3<i16>) -> Self {
        VoxelData::I16(data)
    }
}

impl From<Array3<f32>> for VoxelData {
    fn from(data: Array3<f32>) -> Self {
        VoxelData::F32(data)
    }
}

/// Placement of the voxel grid in patient space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Distance between voxel centres along x (columns), y (rows) and z (slices), in mm
    pub spacing: (f32, f32, f32),
    /// Patient coordinates of the centre of the first voxel
    pub origin: [f64; 3],
    /// Unit vectors of the column, row and slice axes
    pub direction: [[f64; 3]; 3],
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            spacing: (1.0, 1.0, 1.0),
            origin: [0.0; 3],
            direction: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl Geometry {
    pub fn with_spacing(spacing: (f32, f32, f32)) -> Self {
        Self {
            spacing,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Volume {
    data: VoxelData,
    geometry: Geometry,
}

impl Volume {
    pub fn new(data: impl Into<VoxelData>, geometry: Geometry) -> Self {
        Self {
            data: data.into(),
            geometry,
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &VoxelData {
        &self.data
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Cast the voxels to 32-bit floating point
    pub fn into_float32(self) -> Self {
        Self {
            data: VoxelData::F32(self.data.into_float32()),
            geometry: self.geometry,
        }
    }

    /// Multiply every voxel by `factor`, casting to 32-bit floating point first
    pub fn scale(&mut self, factor: f32) {
        let mut data = std::mem::take(&mut self.data).into_float32();
        data.par_mapv_inplace(|v| v * factor);
        self.data = VoxelData::F32(data);
    }
}
