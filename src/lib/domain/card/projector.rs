use thiserror::Error;

use crate::domain::expr::Value;

use super::models::{CardRecord, Prices};

const ZERO_TIME_SENTINEL: &str = "0001-01-01T00:00:00Z";

/// Failure projecting a raw (JSON-sourced) card record. The typed-struct
/// path (`project`) cannot fail — `CardRecord` is already well-formed —
/// but raw JSON may be missing required identity fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("card JSON is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("card JSON field `{field}` has the wrong type")]
    WrongType { field: &'static str },
}

/// Normalizes Scryfall's zero-time sentinel and truncates timestamps to
/// their leading date portion. Idempotent: running it twice produces
/// the same result as running it once.
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw == ZERO_TIME_SENTINEL || raw.is_empty() {
        return None;
    }
    Some(raw.split('T').next().unwrap_or(raw).to_string())
}

/// Projects a typed [`CardRecord`] plus a treatment into the flat mapping
/// the expression runtime consumes. This is one of the two ingestion
/// paths that must agree with [`project_from_json`].
pub fn project(card: &CardRecord, treatment: &str, quantity: Option<i64>) -> Value {
    Value::map([
        ("scryfall_id", Value::str(&card.scryfall_id)),
        ("oracle_id", Value::str(&card.oracle_id)),
        ("name", Value::str(&card.name)),
        ("set", Value::str(&card.set)),
        ("set_name", Value::str(&card.set_name)),
        ("set_type", Value::str(&card.set_type)),
        ("rarity", Value::str(&card.rarity)),
        ("type_line", Value::str(&card.type_line)),
        ("oracle_text", Value::str(&card.oracle_text)),
        ("mana_cost", Value::str(&card.mana_cost)),
        ("cmc", Value::Num(card.cmc)),
        ("layout", Value::str(&card.layout)),
        ("frame", Value::str(&card.frame)),
        ("border_color", Value::str(&card.border_color)),
        ("collector_number", Value::str(&card.collector_number)),
        ("artist", Value::str(&card.artist)),
        ("power", Value::str(&card.power)),
        ("toughness", Value::str(&card.toughness)),
        ("loyalty", Value::str(&card.loyalty)),
        ("edhrec_rank", Value::Num(card.edhrec_rank as f64)),
        ("promo", Value::Bool(card.promo)),
        ("reprint", Value::Bool(card.reprint)),
        ("digital", Value::Bool(card.digital)),
        ("reserved", Value::Bool(card.reserved)),
        ("foil", Value::Bool(card.foil)),
        ("nonfoil", Value::Bool(card.nonfoil)),
        ("oversized", Value::Bool(card.oversized)),
        ("full_art", Value::Bool(card.full_art)),
        ("booster", Value::Bool(card.booster)),
        ("textless", Value::Bool(card.textless)),
        ("colors", Value::str_array(card.colors.clone())),
        ("color_identity", Value::str_array(card.color_identity.clone())),
        ("keywords", Value::str_array(card.keywords.clone())),
        ("finishes", Value::str_array(card.finishes.clone())),
        ("promo_types", Value::str_array(card.promo_types.clone())),
        ("frame_effects", Value::str_array(card.frame_effects.clone())),
        ("prices", project_prices(&card.prices)),
        ("treatment", Value::str(treatment)),
        ("quantity", Value::Num(quantity.unwrap_or(0) as f64)),
    ])
}

fn project_prices(prices: &Prices) -> Value {
    Value::map([
        ("usd", parse_price(prices.usd.as_deref())),
        ("usd_foil", parse_price(prices.usd_foil.as_deref())),
        ("usd_etched", parse_price(prices.usd_etched.as_deref())),
        ("eur", parse_price(prices.eur.as_deref())),
        ("eur_foil", parse_price(prices.eur_foil.as_deref())),
        ("tix", parse_price(prices.tix.as_deref())),
    ])
}

/// A price string parses to a finite float, or to `Value::Null` if it is
/// empty, unparseable, or non-finite — e.g. the literal string `"N/A"` that
/// some Scryfall printings carry for unset markets.
fn parse_price(raw: Option<&str>) -> Value {
    match raw.and_then(|s| s.parse::<f64>().ok()) {
        Some(n) if n.is_finite() => Value::Num(n),
        _ => Value::Null,
    }
}

/// Projects a raw Scryfall JSON document plus a treatment into the same
/// flat mapping as [`project`], after normalizing the `released_at`
/// zero-time sentinel and truncating it to its date portion. Must yield a
/// map equal to `project` for the same card identity and treatment — the
/// numeric/null price values must match, not the raw strings.
pub fn project_from_json(
    raw: &serde_json::Value,
    treatment: &str,
    quantity: Option<i64>,
) -> Result<Value, ProjectionError> {
    let mut normalized = raw.clone();
    if let Some(obj) = normalized.as_object_mut() {
        if let Some(v) = obj.get("released_at") {
            let date = normalize_date(v.as_str());
            obj.insert(
                "released_at".to_string(),
                date.map(serde_json::Value::String).unwrap_or(serde_json::Value::Null),
            );
        }
    }

    let card: CardRecord = serde_json::from_value(normalized)
        .map_err(|_| ProjectionError::WrongType { field: "<root>" })?;

    if card.scryfall_id.is_empty() {
        return Err(ProjectionError::MissingField("scryfall_id"));
    }

    Ok(project(&card, treatment, quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> CardRecord {
        CardRecord {
            scryfall_id: "abc".to_string(),
            oracle_id: "ORA".to_string(),
            name: "Lightning Bolt".to_string(),
            set: "lea".to_string(),
            set_name: "Limited Edition Alpha".to_string(),
            rarity: "mythic".to_string(),
            cmc: 1.0,
            colors: vec!["R".to_string()],
            color_identity: vec!["R".to_string()],
            finishes: vec!["nonfoil".to_string(), "foil".to_string()],
            prices: Prices {
                usd: Some("25.00".to_string()),
                usd_foil: None,
                usd_etched: Some("".to_string()),
                eur: Some("N/A".to_string()),
                eur_foil: None,
                tix: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn missing_price_projects_to_null_not_zero() {
        let projected = project(&sample_card(), "foil", Some(1));
        let prices = projected.get("prices").unwrap();
        assert_eq!(prices.get("usd_foil").unwrap(), &Value::Null);
        assert_eq!(prices.get("usd_etched").unwrap(), &Value::Null);
        assert_eq!(prices.get("eur").unwrap(), &Value::Null, "\"N/A\" must not coerce to 0");
    }

    #[test]
    fn present_price_parses_to_float() {
        let projected = project(&sample_card(), "foil", Some(1));
        let prices = projected.get("prices").unwrap();
        assert_eq!(prices.get("usd").unwrap(), &Value::Num(25.0));
    }

    #[test]
    fn treatment_and_quantity_are_injected() {
        let projected = project(&sample_card(), "foil", Some(3));
        assert_eq!(projected.get("treatment").unwrap(), &Value::str("foil"));
        assert_eq!(projected.get("quantity").unwrap(), &Value::Num(3.0));
    }

    #[test]
    fn missing_quantity_defaults_to_zero() {
        let projected = project(&sample_card(), "foil", None);
        assert_eq!(projected.get("quantity").unwrap(), &Value::Num(0.0));
    }

    #[test]
    fn date_normalization_replaces_zero_time_sentinel() {
        assert_eq!(normalize_date(Some(ZERO_TIME_SENTINEL)), None);
        assert_eq!(normalize_date(Some("2021-01-05T00:00:00Z")), Some("2021-01-05".to_string()));
        assert_eq!(normalize_date(None), None);
    }

    #[test]
    fn date_normalization_is_idempotent() {
        let once = normalize_date(Some("2021-01-05T00:00:00Z"));
        let twice = normalize_date(once.as_deref());
        assert_eq!(once, twice);
    }

    #[test]
    fn typed_and_json_paths_project_equal_maps() {
        let card = sample_card();
        let from_struct = project(&card, "foil", Some(2));

        let json = serde_json::to_value(&card).unwrap();
        let from_json = project_from_json(&json, "foil", Some(2)).unwrap();

        assert_eq!(from_struct, from_json);
    }

    #[test]
    fn json_path_rejects_missing_scryfall_id() {
        let json = serde_json::json!({
            "scryfall_id": "",
            "name": "Nameless",
            "set": "lea",
            "set_name": "Limited Edition Alpha",
            "rarity": "common",
        });
        assert_eq!(
            project_from_json(&json, "nonfoil", Some(1)),
            Err(ProjectionError::MissingField("scryfall_id"))
        );
    }
}
