use std::collections::HashMap;

/// Pattern id meaning "no surface on this side".
pub const NO_SURFACE: u16 = 65535;

/// Classification of a wall segment.
///
/// Codes above 255 that are not one of the special wall codes select a
/// fence from the fence catalog by GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallType {
    Normal,
    ThinFence,
    Roof,
    DeckInvisible,
    Deck,
    Foundation,
    Deck2,
    Deck3,
    Pool,
    /// Solid wall from the object-based building set.
    SolidSpecial,
    /// Screen from the object-based building set.
    Screen,
    /// Fence selected by catalog GUID.
    Fence(u32),
    /// Any other code at or below 255.
    Other(u32),
}

impl WallType {
    /// Decodes a raw wall type code.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Normal,
            2 => Self::ThinFence,
            3 => Self::Roof,
            4 => Self::DeckInvisible,
            16 => Self::Deck,
            23 => Self::Foundation,
            24 => Self::Deck2,
            26 => Self::Deck3,
            29 => Self::Pool,
            300 => Self::SolidSpecial,
            301 => Self::Screen,
            guid if guid > 255 => Self::Fence(guid),
            other => Self::Other(other),
        }
    }

    /// Returns the raw code for this wall type.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::ThinFence => 2,
            Self::Roof => 3,
            Self::DeckInvisible => 4,
            Self::Deck => 16,
            Self::Foundation => 23,
            Self::Deck2 => 24,
            Self::Deck3 => 26,
            Self::Pool => 29,
            Self::SolidSpecial => 300,
            Self::Screen => 301,
            Self::Fence(code) | Self::Other(code) => code,
        }
    }

    /// Whether walls of this type have thickness, miter joints and end caps.
    #[must_use]
    pub fn is_thick(self) -> bool {
        match self {
            Self::Normal | Self::Roof | Self::Foundation | Self::Pool | Self::SolidSpecial => true,
            Self::ThinFence
            | Self::DeckInvisible
            | Self::Deck
            | Self::Deck2
            | Self::Deck3
            | Self::Screen
            | Self::Fence(_)
            | Self::Other(_) => false,
        }
    }

    /// Returns the fence catalog GUID if this is a fence.
    #[must_use]
    pub fn fence_guid(self) -> Option<u32> {
        match self {
            Self::Fence(guid) => Some(guid),
            _ => None,
        }
    }
}

/// A wall layer entry: type plus the pattern on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub id: u32,
    pub wall_type: WallType,
    /// Pattern on the left side, `None` for no surface.
    pub left_pattern: Option<u16>,
    /// Pattern on the right side, `None` for no surface.
    pub right_pattern: Option<u16>,
}

impl Layer {
    /// Creates a layer from raw codes, mapping [`NO_SURFACE`] to `None`.
    #[must_use]
    pub fn new(id: u32, wall_type: u32, pattern1: u16, pattern2: u16) -> Self {
        let side = |p: u16| (p != NO_SURFACE).then_some(p);
        Self {
            id,
            wall_type: WallType::from_code(wall_type),
            left_pattern: side(pattern1),
            right_pattern: side(pattern2),
        }
    }

    /// Layer substituted for segments whose layer id is unknown.
    #[must_use]
    pub fn fallback(id: u32) -> Self {
        Self::new(id, WallType::ThinFence.code(), NO_SURFACE, NO_SURFACE)
    }
}

/// Wall layers keyed by layer id.
#[derive(Debug, Clone, Default)]
pub struct LayerTable {
    layers: HashMap<u32, Layer>,
}

impl LayerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a layer.
    pub fn insert(&mut self, layer: Layer) {
        self.layers.insert(layer.id, layer);
    }

    /// Looks up a layer.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Looks up a layer, substituting [`Layer::fallback`] when absent.
    #[must_use]
    pub fn get_or_fallback(&self, id: u32) -> Layer {
        match self.layers.get(&id) {
            Some(layer) => *layer,
            None => {
                tracing::warn!(layer = id, "unknown wall layer, using thin default");
                Layer::fallback(id)
            }
        }
    }
}

impl FromIterator<Layer> for LayerTable {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().map(|l| (l.id, l)).collect(),
        }
    }
}
