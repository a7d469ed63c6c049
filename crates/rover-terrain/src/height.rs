//! Analytic terrain height field, surface normals, and the sampled vertex grid.
//!
//! All trigonometry goes through `libm` so the same coordinates produce
//! bit-identical elevations on every platform.

use glam::DVec3;

use crate::biome::{Biome, HeightParams};

/// Side length of the square terrain patch in world units.
pub const TERRAIN_SIZE: f64 = 120.0;
/// Quads per side of the terrain mesh.
pub const TERRAIN_SEGMENTS: usize = 80;
/// Step used for the central-difference normal.
pub const NORMAL_EPSILON: f64 = 0.1;

/// Largest `|x|` or `|z|` the rover may reach.
pub fn terrain_limit() -> f64 {
    TERRAIN_SIZE * 0.5 - 1.0
}

impl HeightParams {
    /// Elevation at world `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let ridge = libm::sin(x * self.ridge_freq)
            * libm::cos(z * self.ridge_freq * 0.625)
            * self.ridge_amp;
        let dunes = libm::sin((x + z) * self.dune_freq) * self.dune_amp;
        let noise = libm::sin(x * self.noise_freq + z * self.noise_freq * 0.63) * self.noise_amp;
        ridge + dunes + noise
    }

    /// Unit surface normal at world `(x, z)`.
    pub fn normal(&self, x: f64, z: f64) -> DVec3 {
        let e = NORMAL_EPSILON;
        let nx = self.sample(x - e, z) - self.sample(x + e, z);
        let ny = 2.0 * e;
        let nz = self.sample(x, z - e) - self.sample(x, z + e);
        let len = libm::sqrt(nx * nx + ny * ny + nz * nz);
        let len = if len == 0.0 { 1.0 } else { len };
        DVec3::new(nx / len, ny / len, nz / len)
    }
}

/// Terrain elevation for `biome` at world `(x, z)`.
pub fn height(x: f64, z: f64, biome: &Biome) -> f64 {
    biome.height.sample(x, z)
}

/// Terrain surface normal for `biome` at world `(x, z)`.
pub fn normal(x: f64, z: f64, biome: &Biome) -> DVec3 {
    biome.height.normal(x, z)
}

/// Elevations and normals sampled on a square vertex grid centred on the origin.
///
/// Vertex `(i, j)` sits at `x = -size/2 + i * step`, `z = -size/2 + j * step`.
#[derive(Clone, Debug)]
pub struct HeightGrid {
    size: f64,
    segments: usize,
    heights: Vec<f64>,
    normals: Vec<DVec3>,
}

impl HeightGrid {
    /// Samples the standard `TERRAIN_SIZE` x `TERRAIN_SEGMENTS` patch.
    pub fn for_biome(biome: &Biome) -> Self {
        Self::sample(biome, TERRAIN_SIZE, TERRAIN_SEGMENTS)
    }

    pub fn sample(biome: &Biome, size: f64, segments: usize) -> Self {
        let segments = segments.max(1);
        let row = segments + 1;
        let step = size / segments as f64;
        let half = size * 0.5;

        let mut heights = Vec::with_capacity(row * row);
        let mut normals = Vec::with_capacity(row * row);
        for j in 0..row {
            let z = -half + j as f64 * step;
            for i in 0..row {
                let x = -half + i as f64 * step;
                heights.push(biome.height.sample(x, z));
                normals.push(biome.height.normal(x, z));
            }
        }

        tracing::debug!(
            biome = %biome.id,
            vertices = heights.len(),
            "Sampled terrain height grid"
        );

        Self {
            size,
            segments,
            heights,
            normals,
        }
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Vertices per row (`segments + 1`).
    pub fn row_len(&self) -> usize {
        self.segments + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.heights.len()
    }

    /// World-space position of vertex `(i, j)`, or `None` outside the grid.
    pub fn vertex(&self, i: usize, j: usize) -> Option<DVec3> {
        let index = self.index(i, j)?;
        let step = self.size / self.segments as f64;
        let half = self.size * 0.5;
        Some(DVec3::new(
            -half + i as f64 * step,
            self.heights[index],
            -half + j as f64 * step,
        ))
    }

    pub fn normal(&self, i: usize, j: usize) -> Option<DVec3> {
        self.index(i, j).map(|index| self.normals[index])
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// Lowest and highest sampled elevation.
    pub fn height_range(&self) -> (f64, f64) {
        self.heights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    /// Two counter-clockwise triangles per quad, indexing into the vertex list.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let row = self.row_len() as u32;
        let mut indices = Vec::with_capacity(self.segments * self.segments * 6);
        for j in 0..self.segments as u32 {
            for i in 0..self.segments as u32 {
                let a = j * row + i;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        indices
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        let row = self.row_len();
        (i < row && j < row).then(|| j * row + i)
    }
}
