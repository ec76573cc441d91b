use crate::error::{Error, Result};
use crate::model::RawCheck;
use serde_json::Value;

pub const BUNDLED_CATALOG: &str = include_str!("../assets/locations.json");

/// Parses a catalog document. The first malformed record fails the whole load.
pub fn parse_catalog(json: &str) -> Result<Vec<RawCheck>> {
    let document: Value = serde_json::from_str(json)?;
    let Value::Array(records) = document else {
        return Err(Error::BrokenCatalog);
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| decode_check(index, record))
        .collect()
}

pub fn bundled_catalog() -> Result<Vec<RawCheck>> {
    parse_catalog(BUNDLED_CATALOG)
}

fn decode_check(index: usize, record: &Value) -> Result<RawCheck> {
    let malformed = |reason: &str| Error::MalformedRecord {
        index,
        reason: reason.to_string(),
    };

    let Value::Object(fields) = record else {
        return Err(malformed("record is not an object"));
    };

    let name = match fields.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        Some(Value::String(_)) => return Err(malformed("name is blank")),
        Some(_) => return Err(malformed("name is not a string")),
        None => return Err(malformed("missing name")),
    };

    let region = match fields.get("region") {
        Some(Value::String(region)) => region.clone(),
        Some(Value::Null) => String::new(),
        Some(_) => return Err(malformed("region is not a string")),
        None => return Err(malformed("missing region")),
    };

    let categories = match fields.get("category").or_else(|| fields.get("categories")) {
        Some(value) => decode_categories(value).ok_or_else(|| malformed("bad category list"))?,
        None => return Err(malformed("missing category")),
    };

    Ok(RawCheck {
        name,
        region,
        categories,
    })
}

fn decode_categories(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::String(single) => Some(vec![single.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_list_single_and_null_categories() {
        let checks = parse_catalog(
            r#"[
                {"name": "22", "region": "Red", "category": ["Red", "Standard"]},
                {"name": "Sweeter Than Fiction", "region": "", "category": "Short Songs"},
                {"name": "Bonus", "region": "Bonus Locations", "category": null}
            ]"#,
        )
        .expect("parse");

        assert_eq!(checks.len(), 3);
        assert_eq!(checks[0].categories, vec!["Red", "Standard"]);
        assert_eq!(checks[1].categories, vec!["Short Songs"]);
        assert!(checks[2].categories.is_empty());
    }

    #[test]
    fn missing_fields_fail_fast_with_index() {
        let err = parse_catalog(
            r#"[
                {"name": "22", "region": "Red", "category": []},
                {"region": "Red", "category": []}
            ]"#,
        )
        .expect_err("missing name");
        assert!(
            matches!(err, Error::MalformedRecord { index: 1, .. }),
            "unexpected error: {err}"
        );

        let err = parse_catalog(r#"[{"name": "22", "category": []}]"#).expect_err("no region");
        assert!(matches!(err, Error::MalformedRecord { index: 0, .. }));

        let err = parse_catalog(r#"[{"name": "22", "region": "Red"}]"#).expect_err("no category");
        assert!(matches!(err, Error::MalformedRecord { index: 0, .. }));

        let err = parse_catalog(r#"[{"name": "  ", "region": "Red", "category": []}]"#)
            .expect_err("blank name");
        assert!(matches!(err, Error::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn non_array_document_is_a_broken_catalog() {
        assert!(matches!(
            parse_catalog(r#"{"name": "22"}"#),
            Err(Error::BrokenCatalog)
        ));
        assert!(matches!(parse_catalog("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn bundled_catalog_loads() {
        let checks = bundled_catalog().expect("bundled catalog");
        assert!(!checks.is_empty());
    }
}
