use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

pub const TRADEUP_SIZE: usize = 10;
pub const CURRENCY: &str = "£";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Consumer,
    Industrial,
    #[serde(rename = "Mil-Spec")]
    MilSpec,
    Restricted,
    Classified,
    Covert,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Consumer,
        Rarity::Industrial,
        Rarity::MilSpec,
        Rarity::Restricted,
        Rarity::Classified,
        Rarity::Covert,
    ];

    /// The tier a trade-up of this rarity produces. Covert has none.
    pub fn next(self) -> Option<Rarity> {
        match self {
            Rarity::Consumer => Some(Rarity::Industrial),
            Rarity::Industrial => Some(Rarity::MilSpec),
            Rarity::MilSpec => Some(Rarity::Restricted),
            Rarity::Restricted => Some(Rarity::Classified),
            Rarity::Classified => Some(Rarity::Covert),
            Rarity::Covert => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Consumer => "Consumer",
            Rarity::Industrial => "Industrial",
            Rarity::MilSpec => "Mil-Spec",
            Rarity::Restricted => "Restricted",
            Rarity::Classified => "Classified",
            Rarity::Covert => "Covert",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts both the short names and the "... Grade" spellings used by
/// market feeds, case-insensitively.
impl FromStr for Rarity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_suffix(" grade").unwrap_or(&lower);
        match name {
            "consumer" => Ok(Rarity::Consumer),
            "industrial" => Ok(Rarity::Industrial),
            "mil-spec" | "milspec" => Ok(Rarity::MilSpec),
            "restricted" => Ok(Rarity::Restricted),
            "classified" => Ok(Rarity::Classified),
            "covert" => Ok(Rarity::Covert),
            _ => Err(ParseError::InvalidRarity(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wear {
    #[serde(rename = "Factory New")]
    FactoryNew,
    #[serde(rename = "Minimal Wear")]
    MinimalWear,
    #[serde(rename = "Field-Tested")]
    FieldTested,
    #[serde(rename = "Well-Worn")]
    WellWorn,
    #[serde(rename = "Battle-Scarred")]
    BattleScarred,
}

/// Float brackets, best condition first. Both ends are inclusive, so a
/// float sitting exactly on a boundary belongs to the lower bracket.
const WEAR_BRACKETS: [(Wear, f64, f64); 5] = [
    (Wear::FactoryNew, 0.00, 0.07),
    (Wear::MinimalWear, 0.07, 0.15),
    (Wear::FieldTested, 0.15, 0.38),
    (Wear::WellWorn, 0.38, 0.45),
    (Wear::BattleScarred, 0.45, 1.00),
];

impl Wear {
    pub const ALL: [Wear; 5] = [
        Wear::FactoryNew,
        Wear::MinimalWear,
        Wear::FieldTested,
        Wear::WellWorn,
        Wear::BattleScarred,
    ];

    pub fn bracket(self) -> (f64, f64) {
        let (_, low, high) = WEAR_BRACKETS[self as usize];
        (low, high)
    }

    /// Nominal float the scanner assumes for a copy in this condition.
    pub fn midpoint(self) -> f64 {
        match self {
            Wear::FactoryNew => 0.035,
            Wear::MinimalWear => 0.11,
            Wear::FieldTested => 0.265,
            Wear::WellWorn => 0.415,
            Wear::BattleScarred => 0.725,
        }
    }

    /// Bracket containing `float`, or `None` outside [0, 1] (and for NaN).
    pub fn from_float(float: f64) -> Option<Wear> {
        WEAR_BRACKETS
            .iter()
            .find(|(_, low, high)| *low <= float && float <= *high)
            .map(|(wear, _, _)| *wear)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Wear::FactoryNew => "Factory New",
            Wear::MinimalWear => "Minimal Wear",
            Wear::FieldTested => "Field-Tested",
            Wear::WellWorn => "Well-Worn",
            Wear::BattleScarred => "Battle-Scarred",
        }
    }
}

impl fmt::Display for Wear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Wear {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Wear::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::InvalidWear(s.to_string()))
    }
}

/// One catalog row: a skin in one wear condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub market_hash_name: String,
    pub base_name: String,
    pub collection: String,
    pub rarity: Rarity,
    pub wear: Wear,
    pub float_min: f64,
    pub float_max: f64,
    /// `None` when the feed has no listing for this variant.
    pub min_price: Option<f64>,
}

impl ItemRecord {
    pub fn contains_float(&self, float: f64) -> bool {
        self.float_min <= float && float <= self.float_max
    }
}

/// One of the ten legs of a trade-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSkin {
    pub market_hash_name: String,
    pub collection: String,
    pub rarity: Rarity,
    pub wear_float: f64,
    pub price: f64,
}

impl InputSkin {
    pub fn from_record(record: &ItemRecord, wear_float: f64, price: f64) -> Self {
        InputSkin {
            market_hash_name: record.market_hash_name.clone(),
            collection: record.collection.clone(),
            rarity: record.rarity,
            wear_float,
            price,
        }
    }
}

/// Probability of one distinct output skin, whether or not it could be priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbability {
    pub base_name: String,
    pub probability: f64,
}

/// A priced outcome as it appears in a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeLine {
    pub market_hash_name: String,
    pub wear: Wear,
    pub float: f64,
    pub probability: f64,
    pub price: f64,
}

impl fmt::Display for OutcomeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {:.4} ({:.2}%) → {}{:.2}",
            self.market_hash_name,
            self.float,
            self.probability * 100.0,
            CURRENCY,
            self.price
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub expected_value: f64,
    pub total_cost: f64,
    pub roi: f64,
    /// Priced outcomes, in the order their skins first entered the bag.
    pub breakdown: Vec<OutcomeLine>,
    /// Every distinct outcome, priced or not, same order.
    pub distribution: Vec<OutcomeProbability>,
}

impl SimulationResult {
    pub fn empty(total_cost: f64) -> Self {
        SimulationResult {
            expected_value: 0.0,
            total_cost,
            roi: 0.0,
            breakdown: Vec::new(),
            distribution: Vec::new(),
        }
    }

    pub fn breakdown_text(&self) -> String {
        self.breakdown
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A uniform trade-up that cleared the scanner's ROI threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHit {
    pub input: InputSkin,
    pub wear: Wear,
    pub expected_value: f64,
    pub cost: f64,
    pub roi: f64,
    pub breakdown: Vec<OutcomeLine>,
}

impl ScanHit {
    pub fn inputs_description(&self) -> String {
        format!(
            "{}x {} @ {:.3} ({}{:.2} each)",
            TRADEUP_SIZE,
            self.input.market_hash_name,
            self.input.wear_float,
            CURRENCY,
            self.input.price
        )
    }

    pub fn breakdown_text(&self) -> String {
        self.breakdown
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
