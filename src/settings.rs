use serde::{Deserialize, Serialize};

/// Backdrop the generated headshot is composited onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStyle {
    Office,
    StudioGrey,
    StudioWhite,
    OutdoorPark,
    Bookshelf,
    BrickWall,
}

impl BackgroundStyle {
    pub const ALL: [BackgroundStyle; 6] = [
        BackgroundStyle::Office,
        BackgroundStyle::StudioGrey,
        BackgroundStyle::StudioWhite,
        BackgroundStyle::OutdoorPark,
        BackgroundStyle::Bookshelf,
        BackgroundStyle::BrickWall,
    ];

    /// Descriptive text interpolated verbatim into the generation prompt.
    pub fn description(&self) -> &'static str {
        match self {
            BackgroundStyle::Office => "Modern bright office with soft focus",
            BackgroundStyle::StudioGrey => "Professional studio grey seamless backdrop",
            BackgroundStyle::StudioWhite => "Clean high-key white studio background",
            BackgroundStyle::OutdoorPark => "Blurred city park bokeh, golden hour",
            BackgroundStyle::Bookshelf => "Executive library with wooden bookshelves",
            BackgroundStyle::BrickWall => "Modern loft exposed brick wall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingStyle {
    Soft,
    Dramatic,
    Natural,
    Cinematic,
}

impl LightingStyle {
    pub const ALL: [LightingStyle; 4] = [
        LightingStyle::Soft,
        LightingStyle::Dramatic,
        LightingStyle::Natural,
        LightingStyle::Cinematic,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            LightingStyle::Soft => "Soft, diffused studio lighting",
            LightingStyle::Dramatic => "Dramatic rembrandt lighting with contrast",
            LightingStyle::Natural => "Natural window light",
            LightingStyle::Cinematic => "Cinematic color grading with rim light",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClothingStyle {
    BusinessSuit,
    Blazer,
    Tshirt,
    /// Leave the subject's own clothing in place; the prompt only asks for a
    /// cleanup pass instead of a replacement.
    KeepOriginal,
}

impl ClothingStyle {
    pub const ALL: [ClothingStyle; 4] = [
        ClothingStyle::BusinessSuit,
        ClothingStyle::Blazer,
        ClothingStyle::Tshirt,
        ClothingStyle::KeepOriginal,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            ClothingStyle::BusinessSuit => "Dark navy business suit and tie",
            ClothingStyle::Blazer => "Smart casual blazer and crisp shirt",
            ClothingStyle::Tshirt => "Clean solid color t-shirt",
            ClothingStyle::KeepOriginal => "Keep original clothing but clean up wrinkles",
        }
    }
}

/// The fixed, finite choices parameterizing one generation call. Always fully
/// populated; immutable per call. Unknown values are unrepresentable, so the
/// prompt builder needs no validation branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadshotSettings {
    pub background: BackgroundStyle,
    pub lighting: LightingStyle,
    pub clothing: ClothingStyle,
    pub enhance_face: bool,
}

impl Default for HeadshotSettings {
    fn default() -> Self {
        HeadshotSettings {
            background: BackgroundStyle::Office,
            lighting: LightingStyle::Soft,
            clothing: ClothingStyle::KeepOriginal,
            enhance_face: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_are_distinct() {
        let backgrounds: Vec<_> = BackgroundStyle::ALL.iter().map(|b| b.description()).collect();
        for (i, text) in backgrounds.iter().enumerate() {
            assert!(!text.is_empty());
            assert!(!backgrounds[i + 1..].contains(text));
        }
    }

    #[test]
    fn defaults_match_session_start() {
        let settings = HeadshotSettings::default();
        assert_eq!(settings.background, BackgroundStyle::Office);
        assert_eq!(settings.lighting, LightingStyle::Soft);
        assert_eq!(settings.clothing, ClothingStyle::KeepOriginal);
        assert!(settings.enhance_face);
    }

    #[test]
    fn settings_round_trip_as_json() {
        let settings = HeadshotSettings {
            background: BackgroundStyle::OutdoorPark,
            lighting: LightingStyle::Cinematic,
            clothing: ClothingStyle::Blazer,
            enhance_face: false,
        };
        let encoded = serde_json::to_string(&settings).unwrap();
        let decoded: HeadshotSettings = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, settings);
    }
}
