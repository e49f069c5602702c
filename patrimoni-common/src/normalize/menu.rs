//! Normalization of the grouped histoires menu
//!
//! Shape: `{ typology: { period: [item, ...] } }`. Grouping keys are kept
//! verbatim; only the leaf items go through the item alias table.

use serde_json::Value;
use std::collections::BTreeMap;

use super::to_canonical;
use crate::models::{MenuHistoires, MenuItem};
use crate::Result;

/// Normalize a raw menu; malformed levels collapse to empty rather than fail
pub fn normalize_menu(raw: &Value) -> Result<MenuHistoires> {
    let mut menu = MenuHistoires::new();
    let Some(typologies) = raw.as_object() else {
        return Ok(menu);
    };

    for (typology, periods) in typologies {
        let mut by_period = BTreeMap::new();
        if let Some(periods) = periods.as_object() {
            for (period, items) in periods {
                let items = match items.as_array() {
                    Some(items) => items
                        .iter()
                        .map(to_canonical::<MenuItem>)
                        .collect::<Result<Vec<_>>>()?,
                    None => Vec::new(),
                };
                by_period.insert(period.clone(), items);
            }
        }
        menu.insert(typology.clone(), by_period);
    }

    Ok(menu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_menu_keeps_grouping_keys_and_normalizes_items() {
        let raw = json!({
            "Légende": {
                "Antiquité": [
                    {"id": 1, "titre": "La Tarasque", "description_courte": "Un monstre"},
                    {"id": 2, "titre": "Les Saintes", "descriptionCourte": "Arrivée"}
                ]
            },
            "Histoire": {
                "XXe siècle": []
            }
        });

        let menu = normalize_menu(&raw).unwrap();
        assert_eq!(menu.len(), 2);
        let items = &menu["Légende"]["Antiquité"];
        assert_eq!(items[0].short_description, "Un monstre");
        assert_eq!(items[1].short_description, "Arrivée");
        assert_eq!(items[1].id, Some(2));
        assert!(menu["Histoire"]["XXe siècle"].is_empty());
    }

    #[test]
    fn test_menu_tolerates_malformed_levels() {
        assert!(normalize_menu(&json!(null)).unwrap().is_empty());
        assert!(normalize_menu(&json!([1, 2])).unwrap().is_empty());

        let menu = normalize_menu(&json!({
            "Légende": "pas un objet",
            "Histoire": {"Moyen Âge": "pas une liste"}
        }))
        .unwrap();
        assert!(menu["Légende"].is_empty());
        assert!(menu["Histoire"]["Moyen Âge"].is_empty());
    }

    #[test]
    fn test_menu_is_idempotent() {
        let raw = json!({"Légende": {"Antiquité": [{"id": 1, "titre": "A", "description_courte": "x"}]}});
        let once = normalize_menu(&raw).unwrap();
        let twice = normalize_menu(&serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }
}
