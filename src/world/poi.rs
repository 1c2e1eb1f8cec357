//! Points of interest scattered around the world

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoiKind {
    Mine,
    Forest,
    Dungeon,
    Ruin,
    Shrine,
    Nest,
    BankVault,
    Forge,
    MarketStall,
}

impl PoiKind {
    pub const ALL: [PoiKind; 9] = [
        PoiKind::Mine,
        PoiKind::Forest,
        PoiKind::Dungeon,
        PoiKind::Ruin,
        PoiKind::Shrine,
        PoiKind::Nest,
        PoiKind::BankVault,
        PoiKind::Forge,
        PoiKind::MarketStall,
    ];

    /// Gathering agents home toward these
    pub fn is_resource(&self) -> bool {
        matches!(self, PoiKind::Mine | PoiKind::Forest)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PoiKind::Mine => "Mine",
            PoiKind::Forest => "Forest",
            PoiKind::Dungeon => "Dungeon",
            PoiKind::Ruin => "Ruin",
            PoiKind::Shrine => "Shrine",
            PoiKind::Nest => "Nest",
            PoiKind::BankVault => "Bank Vault",
            PoiKind::Forge => "Forge",
            PoiKind::MarketStall => "Market Stall",
        }
    }
}

pub const LORE_POOL: [&str; 7] = [
    "The Matrix was built upon the ruins of an older world.",
    "A whispering signal in the mountains speaks of the Great Recursion.",
    "Petra Markgraf is honored as keeper of the first axioms.",
    "Corruption eats its way through the unguarded sectors.",
    "Only those who awaken can see the threads of the Ouroboros.",
    "Data fragments of forgotten souls rest in the caves.",
    "Stability is an illusion of the observers.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub kind: PoiKind,
    pub position: Position,
    pub is_discovered: bool,
    pub discovery_radius: f32,
    pub reward_insight: u32,
    pub threat_level: f32,
    pub lore_fragment: Option<String>,
}

/// The fixed central landmarks: a bank vault and a forge
pub fn central_pois() -> Vec<PointOfInterest> {
    vec![
        PointOfInterest {
            id: "poi_bank_central".into(),
            kind: PoiKind::BankVault,
            position: Position::new(5.0, -5.0),
            is_discovered: true,
            discovery_radius: 20.0,
            reward_insight: 0,
            threat_level: 0.0,
            lore_fragment: None,
        },
        PointOfInterest {
            id: "poi_forge_central".into(),
            kind: PoiKind::Forge,
            position: Position::new(-5.0, 5.0),
            is_discovered: true,
            discovery_radius: 20.0,
            reward_insight: 0,
            threat_level: 0.0,
            lore_fragment: None,
        },
    ]
}

/// Scatter `count` undiscovered POIs 30-230 units from the origin
pub fn generate_pois<R: Rng>(count: usize, rng: &mut R) -> Vec<PointOfInterest> {
    (0..count)
        .map(|_| {
            let kind = *PoiKind::ALL.choose(rng).unwrap_or(&PoiKind::Ruin);
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let distance = 30.0 + rng.gen::<f32>() * 200.0;
            let suffix = Uuid::new_v4().simple().to_string();

            PointOfInterest {
                id: format!("poi_{}", &suffix[..8]),
                kind,
                position: Position::new(angle.cos() * distance, angle.sin() * distance),
                is_discovered: false,
                discovery_radius: if kind == PoiKind::Nest { 15.0 } else { 10.0 },
                reward_insight: rng.gen_range(5..=20),
                threat_level: if matches!(kind, PoiKind::Nest | PoiKind::Dungeon) { 0.6 } else { 0.1 },
                lore_fragment: if kind == PoiKind::Ruin {
                    LORE_POOL.choose(rng).map(|s| s.to_string())
                } else {
                    None
                },
            }
        })
        .collect()
}

/// The resource POI closest to `from`, if any exist
pub fn nearest_resource<'a>(
    pois: &'a [PointOfInterest],
    from: &Position,
) -> Option<&'a PointOfInterest> {
    pois.iter()
        .filter(|p| p.kind.is_resource())
        .min_by(|a, b| {
            a.position
                .distance(from)
                .total_cmp(&b.position.distance(from))
        })
}
