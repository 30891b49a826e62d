use crate::config::AliasTable;
use serde_json::{Map, Value};
use tracing::debug;

static TAGS_FIELD: &str = "tags";
static SCORES_FIELD: &str = "scores";

/// Records keyed by identifier, plus how many list entries had no usable key.
#[derive(Debug, Default)]
pub struct Keyed {
    pub records: Map<String, Value>,
    pub dropped: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CanonStats {
    pub tags_rewritten: usize,
    pub score_keys_rewritten: usize,
}

/// Reshapes a list of records into a map keyed by `id_field`.
///
/// Only entries without the identifier field (including non-objects) are
/// dropped; any present identifier, `null` included, becomes a key. A
/// repeated key keeps its first position and takes the later record.
pub fn key_by_identifier(records: Vec<Value>, id_field: &str) -> Keyed {
    let mut keyed = Keyed::default();

    for (index, record) in records.into_iter().enumerate() {
        let Some(key) = record.get(id_field).map(identifier_key) else {
            debug!(index, id_field, "dropping record without identifier");
            keyed.dropped += 1;
            continue;
        };
        if keyed.records.insert(key.clone(), record).is_some() {
            debug!(%key, "duplicate identifier, keeping the later record");
        }
    }

    keyed
}

/// Renders an identifier the way the existing data files spell their keys:
/// strings verbatim, `None`/`True`/`False` for the JSON literals, and
/// list/dict literal syntax for containers.
pub fn identifier_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => {
            let mut out = String::new();
            write_literal(other, &mut out);
            out
        }
    }
}

fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_quoted(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(k, out);
                out.push_str(": ");
                write_literal(v, out);
            }
            out.push('}');
        }
    }
}

// single quotes unless the text contains one and no double quote
fn write_quoted(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Rewrites aliased tag strings and score keys in every record.
pub fn canonicalize(records: &mut Map<String, Value>, aliases: &AliasTable) -> CanonStats {
    let mut stats = CanonStats::default();
    for record in records.values_mut() {
        canonicalize_record(record, aliases, &mut stats);
    }
    stats
}

pub fn canonicalize_record(record: &mut Value, aliases: &AliasTable, stats: &mut CanonStats) {
    let Some(obj) = record.as_object_mut() else {
        return;
    };

    if let Some(Value::Array(tags)) = obj.get_mut(TAGS_FIELD) {
        for tag in tags.iter_mut() {
            if let Value::String(s) = tag {
                if let Some(canonical) = aliases.canonical(s) {
                    if canonical != s.as_str() {
                        *s = canonical.to_string();
                        stats.tags_rewritten += 1;
                    }
                }
            }
        }
    }

    if let Some(Value::Object(scores)) = obj.get_mut(SCORES_FIELD) {
        let source = std::mem::take(scores);
        for (key, value) in source {
            let key = match aliases.canonical(&key) {
                Some(canonical) if canonical != key => {
                    stats.score_keys_rewritten += 1;
                    canonical.to_string()
                }
                _ => key,
            };
            scores.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn list(v: Value) -> Vec<Value> {
        match v {
            Value::Array(items) => items,
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn keys_list_by_appid() {
        let keyed = key_by_identifier(
            list(json!([{"appid": 1, "tags": []}, {"appid": "abc"}, {"tags": ["x"]}, 5])),
            "appid",
        );
        assert_eq!(keyed.dropped, 2);
        let keys: Vec<_> = keyed.records.keys().cloned().collect();
        assert_eq!(keys, vec!["1".to_string(), "abc".to_string()]);
    }

    #[test]
    fn literal_identifiers_are_kept() {
        let keyed = key_by_identifier(
            list(json!([
                {"appid": null, "tags": ["music"]},
                {"appid": true, "tags": []},
                {"appid": false},
                {"appid": 2.5}
            ])),
            "appid",
        );
        assert_eq!(keyed.dropped, 0);
        let keys: Vec<_> = keyed.records.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["None", "True", "False", "2.5"]);
        assert_eq!(keyed.records["None"]["tags"], json!(["music"]));
    }

    #[test]
    fn container_identifiers_use_literal_syntax() {
        assert_eq!(identifier_key(&json!([1, "a", null])), "[1, 'a', None]");
        assert_eq!(identifier_key(&json!({"k": [true]})), "{'k': [True]}");
        assert_eq!(identifier_key(&json!(["it's"])), r#"["it's"]"#);
        assert_eq!(identifier_key(&json!("plain")), "plain");
    }

    #[test]
    fn duplicate_identifier_keeps_first_position() {
        let keyed = key_by_identifier(
            list(json!([{"appid": 2, "v": "a"}, {"appid": 1}, {"appid": 2, "v": "b"}])),
            "appid",
        );
        let keys: Vec<_> = keyed.records.keys().cloned().collect();
        assert_eq!(keys, vec!["2".to_string(), "1".to_string()]);
        assert_eq!(keyed.records["2"]["v"], json!("b"));
    }

    #[test]
    fn canonicalizes_tags_case_insensitively() {
        let input = list(json!([{"appid": 1, "tags": ["music", "Story"]}]));
        let mut keyed = key_by_identifier(input, "appid").records;
        let stats = canonicalize(&mut keyed, &AliasTable::default());
        assert_eq!(Value::Object(keyed), json!({"1": {"appid": 1, "tags": ["Music", "Story"]}}));
        assert_eq!(stats.tags_rewritten, 1);
    }

    #[test]
    fn unmatched_tags_are_untouched() {
        let mut records = Map::new();
        records.insert("7".into(), json!({"tags": ["sOundTrack", "MUSIC", 3]}));
        canonicalize(&mut records, &AliasTable::default());
        assert_eq!(records["7"]["tags"], json!(["sOundTrack", "Music", 3]));
    }

    #[test]
    fn rewrites_score_keys_in_source_order() {
        let mut records = Map::new();
        records.insert(
            "10".into(),
            json!({"scores": {"user_interface": 3, "Graphics": 4.5, "custom_key": 1, "DLC": -2}}),
        );
        let stats = canonicalize(&mut records, &AliasTable::default());

        let scores = records["10"]["scores"].as_object().unwrap();
        let keys: Vec<_> = scores.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["User Interface", "Graphics", "custom_key", "DLC"]);
        assert_eq!(scores["User Interface"], json!(3));
        assert_eq!(scores["Graphics"], json!(4.5));
        assert_eq!(stats.score_keys_rewritten, 1);
    }

    #[test]
    fn colliding_score_keys_take_later_value() {
        let mut records = Map::new();
        records.insert("1".into(), json!({"scores": {"music": 1, "story": 2, "Music": 3}}));
        canonicalize(&mut records, &AliasTable::default());
        assert_eq!(records["1"]["scores"], json!({"Music": 3, "Story": 2}));
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let mut records = key_by_identifier(
            list(json!([
                {
                    "appid": 1,
                    "tags": ["game_mechanics", "PLAYER_SKILL", "Co-op"],
                    "scores": {"mods": 2, "dlc": 1}
                },
                {"appid": 2, "tags": ["content_volume"], "scores": {"Immersion": 5}}
            ])),
            "appid",
        )
        .records;
        let aliases = AliasTable::default();
        canonicalize(&mut records, &aliases);
        let once = records.clone();

        let stats = canonicalize(&mut records, &aliases);
        assert_eq!(records, once);
        assert_eq!(stats, CanonStats::default());
    }

    #[test]
    fn odd_field_shapes_are_left_alone() {
        let mut records = Map::new();
        records.insert("1".into(), json!({"tags": "music", "scores": [1, 2]}));
        records.insert("2".into(), json!("not an object"));
        let before = records.clone();
        canonicalize(&mut records, &AliasTable::default());
        assert_eq!(records, before);
    }
}
