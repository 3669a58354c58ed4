use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropGroup {
    Legumes,
    Grains,
    Vegetables,
    LeafyGreens,
    RootVegetables,
    FruitVegetables,
    Brassicas,
}

impl CropGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropGroup::Legumes => "Legumes",
            CropGroup::Grains => "Grains",
            CropGroup::Vegetables => "Vegetables",
            CropGroup::LeafyGreens => "Leafy Greens",
            CropGroup::RootVegetables => "Root Vegetables",
            CropGroup::FruitVegetables => "Fruit Vegetables",
            CropGroup::Brassicas => "Brassicas",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "legumes" | "legume" => Some(CropGroup::Legumes),
            "grains" | "grain" => Some(CropGroup::Grains),
            "vegetables" | "vegetable" => Some(CropGroup::Vegetables),
            "leafygreens" | "leafygreen" => Some(CropGroup::LeafyGreens),
            "rootvegetables" | "rootvegetable" => Some(CropGroup::RootVegetables),
            "fruitvegetables" | "fruitvegetable" => Some(CropGroup::FruitVegetables),
            "brassicas" | "brassica" => Some(CropGroup::Brassicas),
            _ => None,
        }
    }

    /// Groups in table order. The "first group containing" lookup walks this order.
    pub fn all() -> &'static [CropGroup] {
        &[
            CropGroup::Legumes,
            CropGroup::Grains,
            CropGroup::Vegetables,
            CropGroup::LeafyGreens,
            CropGroup::RootVegetables,
            CropGroup::FruitVegetables,
            CropGroup::Brassicas,
        ]
    }

    pub fn vegetable_family() -> &'static [CropGroup] {
        &[
            CropGroup::Vegetables,
            CropGroup::LeafyGreens,
            CropGroup::RootVegetables,
            CropGroup::FruitVegetables,
            CropGroup::Brassicas,
        ]
    }

    pub fn is_vegetable_family(&self) -> bool {
        Self::vegetable_family().contains(self)
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            CropGroup::Legumes => Color::Green,
            CropGroup::Grains => Color::Yellow,
            CropGroup::Vegetables => Color::LightRed,
            CropGroup::LeafyGreens => Color::LightGreen,
            CropGroup::RootVegetables => Color::Magenta,
            CropGroup::FruitVegetables => Color::Red,
            CropGroup::Brassicas => Color::Cyan,
        }
    }
}

impl std::fmt::Display for CropGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
