use serde::{Deserialize, Serialize};

/// One cell of the background layer. Purely decorative: terrain never
/// participates in occupancy or movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrain {
    /// Image key the renderer uses to pick the background tile.
    pub key: String,
}

impl Terrain {
    /// Create a terrain cell with the given image key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new("grass")
    }
}
