//! Procedural terrain for the rover simulator: biomes, the analytic height
//! field and its normals, the sampled mesh grid, and seeded rock scatter.

pub mod biome;
mod height;
mod obstacles;
mod rng;

pub use biome::{
    Biome, BiomeId, BiomePalette, BiomeRegistry, BiomeRegistryError, HeightParams, UnknownBiome,
};
pub use height::{
    HeightGrid, NORMAL_EPSILON, TERRAIN_SEGMENTS, TERRAIN_SIZE, height, normal, terrain_limit,
};
pub use obstacles::{Obstacle, ROCK_COUNT, ROCK_RADIUS_RANGE, ROCK_SPREAD, scatter_obstacles};
pub use rng::{SeededRng, create_seeded_rng};
