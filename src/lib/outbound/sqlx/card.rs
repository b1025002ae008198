// =============================================================================
// IMPORTS
// =============================================================================

use sqlx::FromRow;

use crate::domain::card::{CardRepository, CardRecord, GetCardError, Prices};
use crate::outbound::sqlx::postgres::Postgres;

// =============================================================================
// DATABASE TYPES
// =============================================================================

/// Mirrors `CardRecord` field for field. Kept as its own `FromRow` struct
/// rather than deriving `FromRow` on `CardRecord` directly so the domain
/// type stays free of `sqlx` in its signature.
#[derive(Debug, Clone, FromRow)]
struct DatabaseCard {
    scryfall_id: String,
    oracle_id: String,
    name: String,
    set: String,
    set_name: String,
    set_type: String,
    rarity: String,
    type_line: String,
    oracle_text: String,
    mana_cost: String,
    cmc: f64,
    layout: String,
    frame: String,
    border_color: String,
    collector_number: String,
    artist: String,
    power: String,
    toughness: String,
    loyalty: String,
    edhrec_rank: i64,
    promo: bool,
    reprint: bool,
    digital: bool,
    reserved: bool,
    foil: bool,
    nonfoil: bool,
    oversized: bool,
    full_art: bool,
    booster: bool,
    textless: bool,
    colors: Vec<String>,
    color_identity: Vec<String>,
    keywords: Vec<String>,
    finishes: Vec<String>,
    promo_types: Vec<String>,
    frame_effects: Vec<String>,
    price_usd: Option<String>,
    price_usd_foil: Option<String>,
    price_usd_etched: Option<String>,
    price_eur: Option<String>,
    price_eur_foil: Option<String>,
    price_tix: Option<String>,
    released_at: Option<String>,
    preview_previewed_at: Option<String>,
}

impl From<DatabaseCard> for CardRecord {
    fn from(value: DatabaseCard) -> Self {
        Self {
            scryfall_id: value.scryfall_id,
            oracle_id: value.oracle_id,
            name: value.name,
            set: value.set,
            set_name: value.set_name,
            set_type: value.set_type,
            rarity: value.rarity,
            type_line: value.type_line,
            oracle_text: value.oracle_text,
            mana_cost: value.mana_cost,
            cmc: value.cmc,
            layout: value.layout,
            frame: value.frame,
            border_color: value.border_color,
            collector_number: value.collector_number,
            artist: value.artist,
            power: value.power,
            toughness: value.toughness,
            loyalty: value.loyalty,
            edhrec_rank: value.edhrec_rank,
            promo: value.promo,
            reprint: value.reprint,
            digital: value.digital,
            reserved: value.reserved,
            foil: value.foil,
            nonfoil: value.nonfoil,
            oversized: value.oversized,
            full_art: value.full_art,
            booster: value.booster,
            textless: value.textless,
            colors: value.colors,
            color_identity: value.color_identity,
            keywords: value.keywords,
            finishes: value.finishes,
            promo_types: value.promo_types,
            frame_effects: value.frame_effects,
            prices: Prices {
                usd: value.price_usd,
                usd_foil: value.price_usd_foil,
                usd_etched: value.price_usd_etched,
                eur: value.price_eur,
                eur_foil: value.price_eur_foil,
                tix: value.price_tix,
            },
            released_at: value.released_at,
            preview_previewed_at: value.preview_previewed_at,
        }
    }
}

const SELECT_FIELDS: &str = "scryfall_id, oracle_id, name, set, set_name, set_type, rarity, type_line,
    oracle_text, mana_cost, cmc, layout, frame, border_color, collector_number, artist,
    power, toughness, loyalty, edhrec_rank, promo, reprint, digital, reserved, foil,
    nonfoil, oversized, full_art, booster, textless, colors, color_identity, keywords,
    finishes, promo_types, frame_effects, price_usd, price_usd_foil, price_usd_etched,
    price_eur, price_eur_foil, price_tix, released_at, preview_previewed_at";

// =============================================================================
// REPOSITORY IMPLEMENTATION
// =============================================================================

impl CardRepository for Postgres {
    async fn get_card(&self, scryfall_id: &str) -> Result<CardRecord, GetCardError> {
        let row: Option<DatabaseCard> =
            sqlx::query_as(&format!("SELECT {SELECT_FIELDS} FROM scryfall_cards WHERE scryfall_id = $1"))
                .bind(scryfall_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| GetCardError::Unknown(std::sync::Arc::new(
                    anyhow::Error::from(e).context("failed to look up card"),
                )))?;

        row.map(Into::into).ok_or_else(|| GetCardError::NotFound(scryfall_id.to_string()))
    }
}
