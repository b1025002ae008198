/// Declared type of a schema field, used only at compile time to catch
/// unknown fields and type mismatches before a rule is ever evaluated.
///
/// `Num` fields under `prices` are allowed to be absent (`Value::Null`) at
/// evaluation time; that is a runtime concern handled by the comparison
/// operators, not a distinct static type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Num,
    Bool,
    StrArray,
    Map(&'static [(&'static str, FieldType)]),
}

/// The full card schema the expression compiler validates rule source
/// against. `treatment` and `quantity` are appended by the pipeline,
/// not sourced from Scryfall, but are part of the same projected mapping.
pub const CARD_SCHEMA: &[(&str, FieldType)] = &[
    ("scryfall_id", FieldType::Str),
    ("oracle_id", FieldType::Str),
    ("name", FieldType::Str),
    ("set", FieldType::Str),
    ("set_name", FieldType::Str),
    ("set_type", FieldType::Str),
    ("rarity", FieldType::Str),
    ("type_line", FieldType::Str),
    ("oracle_text", FieldType::Str),
    ("mana_cost", FieldType::Str),
    ("cmc", FieldType::Num),
    ("layout", FieldType::Str),
    ("frame", FieldType::Str),
    ("border_color", FieldType::Str),
    ("collector_number", FieldType::Str),
    ("artist", FieldType::Str),
    ("power", FieldType::Str),
    ("toughness", FieldType::Str),
    ("loyalty", FieldType::Str),
    ("edhrec_rank", FieldType::Num),
    ("promo", FieldType::Bool),
    ("reprint", FieldType::Bool),
    ("digital", FieldType::Bool),
    ("reserved", FieldType::Bool),
    ("foil", FieldType::Bool),
    ("nonfoil", FieldType::Bool),
    ("oversized", FieldType::Bool),
    ("full_art", FieldType::Bool),
    ("booster", FieldType::Bool),
    ("textless", FieldType::Bool),
    ("colors", FieldType::StrArray),
    ("color_identity", FieldType::StrArray),
    ("keywords", FieldType::StrArray),
    ("finishes", FieldType::StrArray),
    ("promo_types", FieldType::StrArray),
    ("frame_effects", FieldType::StrArray),
    (
        "prices",
        FieldType::Map(&[
            ("usd", FieldType::Num),
            ("usd_foil", FieldType::Num),
            ("usd_etched", FieldType::Num),
            ("eur", FieldType::Num),
            ("eur_foil", FieldType::Num),
            ("tix", FieldType::Num),
        ]),
    ),
    ("treatment", FieldType::Str),
    ("quantity", FieldType::Num),
];

/// Resolves a dotted member path (e.g. `["prices", "usd"]`) against a schema,
/// returning the declared type at the end of the path or `None` if any
/// segment is unknown.
pub fn resolve(schema: &'static [(&'static str, FieldType)], path: &[String]) -> Option<FieldType> {
    let (head, rest) = path.split_first()?;
    let field = schema.iter().find(|(name, _)| name == head)?.1;
    if rest.is_empty() {
        return Some(field);
    }
    match field {
        FieldType::Map(nested) => resolve(nested, rest),
        _ => None,
    }
}
