//! JSON生成
//!
//! 1リード1オブジェクト。項目はグループ（company/contact/assessment/verification）
//! ごとにまとめ、値が無い項目は出力しない。

use super::fields::{json_value, FieldSelection};
use crate::error::Result;
use crate::types::Lead;
use serde_json::{Map, Value};

pub fn lead_to_json(lead: &Lead, selection: &FieldSelection) -> Value {
    let mut root = Map::new();

    for def in selection.definitions() {
        let Some(value) = json_value(lead, def.field) else {
            continue;
        };
        let group = root
            .entry(def.group.json_key())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = group {
            map.insert(def.json_key.to_string(), value);
        }
    }

    Value::Object(root)
}

/// 整形済みJSON配列
pub fn generate_json(leads: &[Lead], selection: &FieldSelection) -> Result<String> {
    let items: Vec<Value> = leads.iter().map(|l| lead_to_json(l, selection)).collect();
    Ok(serde_json::to_string_pretty(&items)?)
}
