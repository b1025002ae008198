use serde::{Deserialize, Serialize};

/// Daily price snapshot for one printing, mirroring the six price keys the
/// expression schema exposes. Each field is the raw Scryfall string —
/// parsing to a finite float (or `null`) happens only in the projector,
/// never here, so the typed and JSON ingestion paths stay convertible
/// without loss.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Prices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub usd_etched: Option<String>,
    pub eur: Option<String>,
    pub eur_foil: Option<String>,
    pub tix: Option<String>,
}

/// A Scryfall-shaped card record, read-only from the engine's point of
/// view. The Scryfall upstream client that produces these is out of scope
/// — this struct is the contract boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardRecord {
    pub scryfall_id: String,
    #[serde(default)]
    pub oracle_id: String,
    pub name: String,
    pub set: String,
    pub set_name: String,
    pub set_type: String,
    pub rarity: String,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub oracle_text: String,
    #[serde(default)]
    pub mana_cost: String,
    #[serde(default)]
    pub cmc: f64,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub frame: String,
    #[serde(default)]
    pub border_color: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub power: String,
    #[serde(default)]
    pub toughness: String,
    #[serde(default)]
    pub loyalty: String,
    #[serde(default)]
    pub edhrec_rank: i64,

    #[serde(default)]
    pub promo: bool,
    #[serde(default)]
    pub reprint: bool,
    #[serde(default)]
    pub digital: bool,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default)]
    pub foil: bool,
    #[serde(default)]
    pub nonfoil: bool,
    #[serde(default)]
    pub oversized: bool,
    #[serde(default)]
    pub full_art: bool,
    #[serde(default)]
    pub booster: bool,
    #[serde(default)]
    pub textless: bool,

    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub finishes: Vec<String>,
    #[serde(default)]
    pub promo_types: Vec<String>,
    #[serde(default)]
    pub frame_effects: Vec<String>,

    #[serde(default)]
    pub prices: Prices,

    /// Scryfall sometimes serves these as `"0001-01-01T00:00:00Z"` instead
    /// of omitting them; the projector normalizes that before unmarshaling
    /// raw JSON. The typed struct stores the already-normalized form.
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub preview_previewed_at: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GetCardError {
    #[error("no card found with scryfall_id `{0}`")]
    NotFound(String),
    #[error(transparent)]
    Unknown(#[from] std::sync::Arc<anyhow::Error>),
}
