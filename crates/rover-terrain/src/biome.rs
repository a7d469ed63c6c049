//! Biome definitions and the built-in biome registry.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;

/// Identifier of a built-in biome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BiomeId {
    #[default]
    Mars,
    Icy,
    Dunes,
}

impl BiomeId {
    /// All built-in biomes, in menu order.
    pub const ALL: [BiomeId; 3] = [BiomeId::Mars, BiomeId::Icy, BiomeId::Dunes];

    /// Stable lowercase identifier used in config files and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            BiomeId::Mars => "mars",
            BiomeId::Icy => "icy",
            BiomeId::Dunes => "dunes",
        }
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a biome identifier that is not built in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown biome: {0}")]
pub struct UnknownBiome(pub String);

impl FromStr for BiomeId {
    type Err = UnknownBiome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mars" => Ok(BiomeId::Mars),
            "icy" => Ok(BiomeId::Icy),
            "dunes" => Ok(BiomeId::Dunes),
            _ => Err(UnknownBiome(s.to_string())),
        }
    }
}

/// Coefficients of the three sinusoidal terms of the height field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightParams {
    pub ridge_freq: f64,
    pub ridge_amp: f64,
    pub dune_freq: f64,
    pub dune_amp: f64,
    pub noise_freq: f64,
    pub noise_amp: f64,
}

impl HeightParams {
    /// Parameters producing a perfectly flat plane at elevation 0.
    pub const FLAT: Self = Self {
        ridge_freq: 0.0,
        ridge_amp: 0.0,
        dune_freq: 0.0,
        dune_amp: 0.0,
        noise_freq: 0.0,
        noise_amp: 0.0,
    };
}

/// Colours used by the renderer, as `#rrggbb` strings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomePalette {
    pub terrain: &'static str,
    pub rock: &'static str,
    pub sky: &'static str,
    pub fog: &'static str,
}

/// Immutable description of a biome.
#[derive(Clone, Debug, PartialEq)]
pub struct Biome {
    pub id: BiomeId,
    /// Human-readable name shown in the UI.
    pub name: String,
    /// Seed for the obstacle scatter RNG.
    pub seed: u64,
    pub palette: BiomePalette,
    /// Fog `(near, far)` distances in world units.
    pub fog_range: (f64, f64),
    pub height: HeightParams,
}

impl Biome {
    /// Definition of a built-in biome.
    pub fn builtin(id: BiomeId) -> Self {
        match id {
            BiomeId::Mars => Self {
                id,
                name: "Mars Plateau".to_string(),
                seed: 42,
                palette: BiomePalette {
                    terrain: "#b86b2f",
                    rock: "#7a4f2c",
                    sky: "#080f1f",
                    fog: "#0b1224",
                },
                fog_range: (30.0, 140.0),
                height: HeightParams {
                    ridge_freq: 0.08,
                    ridge_amp: 2.4,
                    dune_freq: 0.15,
                    dune_amp: 1.4,
                    noise_freq: 0.35,
                    noise_amp: 0.6,
                },
            },
            BiomeId::Icy => Self {
                id,
                name: "Icy Plain".to_string(),
                seed: 1337,
                palette: BiomePalette {
                    terrain: "#7ca3c7",
                    rock: "#9db4d5",
                    sky: "#0a1220",
                    fog: "#0d1726",
                },
                fog_range: (20.0, 110.0),
                height: HeightParams {
                    ridge_freq: 0.06,
                    ridge_amp: 1.6,
                    dune_freq: 0.09,
                    dune_amp: 0.9,
                    noise_freq: 0.25,
                    noise_amp: 0.4,
                },
            },
            BiomeId::Dunes => Self {
                id,
                name: "Windy Dunes".to_string(),
                seed: 31415,
                palette: BiomePalette {
                    terrain: "#c89b5e",
                    rock: "#a6743a",
                    sky: "#0c0e1b",
                    fog: "#0f1422",
                },
                fog_range: (25.0, 130.0),
                height: HeightParams {
                    ridge_freq: 0.04,
                    ridge_amp: 1.8,
                    dune_freq: 0.2,
                    dune_amp: 1.8,
                    noise_freq: 0.3,
                    noise_amp: 0.6,
                },
            },
        }
    }

    /// A featureless biome, handy for isolating vehicle behaviour from slopes.
    pub fn flat() -> Self {
        Self {
            name: "Flat".to_string(),
            height: HeightParams::FLAT,
            ..Self::builtin(BiomeId::Mars)
        }
    }
}

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this id is already registered.
    #[error("duplicate biome id: {0}")]
    DuplicateId(BiomeId),
}

/// Biome definitions keyed by id.
#[derive(Debug, Default)]
pub struct BiomeRegistry {
    biomes: HashMap<BiomeId, Biome>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in biome.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for id in BiomeId::ALL {
            registry.biomes.insert(id, Biome::builtin(id));
        }
        registry
    }

    /// Registers a biome definition.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateId`] if the id is taken.
    pub fn register(&mut self, biome: Biome) -> Result<(), BiomeRegistryError> {
        if self.biomes.contains_key(&biome.id) {
            return Err(BiomeRegistryError::DuplicateId(biome.id));
        }
        self.biomes.insert(biome.id, biome);
        Ok(())
    }

    pub fn get(&self, id: BiomeId) -> Option<&Biome> {
        self.biomes.get(&id)
    }

    /// Looks up a biome by its identifier string (`"mars"`, ...).
    pub fn lookup(&self, name: &str) -> Result<&Biome, UnknownBiome> {
        let id: BiomeId = name.parse()?;
        self.get(id).ok_or_else(|| UnknownBiome(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}
