//! Static rock placement.

use std::f64::consts::PI;

use glam::DVec3;

use crate::biome::Biome;
use crate::rng::SeededRng;

/// Rocks scattered per biome.
pub const ROCK_COUNT: usize = 18;
/// Inclusive-exclusive `(min, max)` rock radius.
pub const ROCK_RADIUS_RANGE: (f64, f64) = (0.6, 1.6);
/// Side of the square around the origin that rocks are scattered over.
pub const ROCK_SPREAD: f64 = 70.0;
/// Fraction of the radius a rock sits above the ground.
const ROCK_EMBED: f64 = 0.4;

/// A static obstacle the rover collides with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub position: DVec3,
    pub radius: f64,
    /// Euler rotation for rendering only; physics treats rocks as spheres.
    pub rotation: DVec3,
}

/// Scatters `count` rocks for `biome` using the biome's seed.
///
/// Draw order per rock is radius, x, z, then three rotation angles, so the
/// layout for a given seed never changes.
pub fn scatter_obstacles(biome: &Biome, count: usize) -> Vec<Obstacle> {
    let mut rng = SeededRng::new(biome.seed);
    let (min_r, max_r) = ROCK_RADIUS_RANGE;

    let obstacles: Vec<Obstacle> = (0..count)
        .map(|_| {
            let radius = rng.range(min_r, max_r);
            let x = (rng.next_f64() - 0.5) * ROCK_SPREAD;
            let z = (rng.next_f64() - 0.5) * ROCK_SPREAD;
            let y = biome.height.sample(x, z) + radius * ROCK_EMBED;
            let rotation = DVec3::new(
                rng.next_f64() * PI,
                rng.next_f64() * PI,
                rng.next_f64() * PI,
            );
            Obstacle {
                position: DVec3::new(x, y, z),
                radius,
                rotation,
            }
        })
        .collect();

    tracing::debug!(biome = %biome.id, count = obstacles.len(), "Scattered obstacles");
    obstacles
}
