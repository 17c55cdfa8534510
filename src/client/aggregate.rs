//! Aggregate selection and result decoding for `aggregate` / `group_by`.

use std::collections::BTreeMap;

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, EntityTrait, IdenStatic, QuerySelect, Select};
use serde::Serialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use super::args::AggregateArgs;

const COUNT_ALIAS: &str = "_count";

/// Aggregated values keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Aggregates {
    #[serde(rename = "_count", skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(rename = "_avg", skip_serializing_if = "BTreeMap::is_empty")]
    pub avg: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "_sum", skip_serializing_if = "BTreeMap::is_empty")]
    pub sum: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "_min", skip_serializing_if = "BTreeMap::is_empty")]
    pub min: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "_max", skip_serializing_if = "BTreeMap::is_empty")]
    pub max: BTreeMap<String, serde_json::Value>,
}

/// One `group_by` bucket: the grouping key values plus its aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct GroupRow {
    pub key: BTreeMap<String, serde_json::Value>,
    #[serde(flatten)]
    pub aggregates: Aggregates,
}

impl GroupRow {
    /// Key value for `column`, as a string when the column holds text.
    pub fn key_str(&self, column: &str) -> Option<&str> {
        self.key.get(column).and_then(JsonValue::as_str)
    }
}

#[derive(Clone, Copy)]
enum Op {
    Avg,
    Sum,
    Min,
    Max,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Avg => "avg",
            Op::Sum => "sum",
            Op::Min => "min",
            Op::Max => "max",
        }
    }

    fn apply(self, expr: Expr) -> SimpleExpr {
        match self {
            Op::Avg => Func::avg(expr).into(),
            Op::Sum => Func::sum(expr).into(),
            Op::Min => Func::min(expr).into(),
            Op::Max => Func::max(expr).into(),
        }
    }
}

fn alias(op: Op, column: &str) -> String {
    format!("_{}__{}", op.name(), column)
}

/// Adds the requested aggregate expressions to `select`.
pub(crate) fn select_aggregates<E: EntityTrait>(
    mut select: Select<E>,
    args: &AggregateArgs<E>,
) -> Select<E> {
    if args.count {
        select = select.column_as(Expr::val(1).count(), COUNT_ALIAS);
    }
    let groups = [
        (Op::Avg, &args.avg),
        (Op::Sum, &args.sum),
        (Op::Min, &args.min),
        (Op::Max, &args.max),
    ];
    for (op, columns) in groups {
        for column in columns {
            select = select.column_as(op.apply(column.into_expr()), alias(op, column.as_str()));
        }
    }
    select
}

/// Splits a result row into grouping keys and aggregate values.
pub(crate) fn decode_row(row: JsonValue) -> GroupRow {
    let mut out = GroupRow::default();
    let JsonValue::Object(map) = row else {
        return out;
    };
    for (name, value) in map {
        if name == COUNT_ALIAS {
            out.aggregates.count = value.as_i64();
            continue;
        }
        let parsed = name
            .strip_prefix('_')
            .and_then(|rest| rest.split_once("__"))
            .map(|(op, column)| (op.to_string(), column.to_string()));
        let bucket = match parsed.as_ref().map(|(op, _)| op.as_str()) {
            Some("avg") => &mut out.aggregates.avg,
            Some("sum") => &mut out.aggregates.sum,
            Some("min") => &mut out.aggregates.min,
            Some("max") => &mut out.aggregates.max,
            _ => {
                out.key.insert(name, value);
                continue;
            }
        };
        if let Some((_, column)) = parsed {
            bucket.insert(column, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_row_splits_keys_and_aggregates() {
        let row = json!({
            "type": "fixed",
            "_count": 3,
            "_avg__amount": 12.5,
            "_max__amount": 20.0,
        });
        let decoded = decode_row(row);
        assert_eq!(decoded.key_str("type"), Some("fixed"));
        assert_eq!(decoded.aggregates.count, Some(3));
        assert_eq!(decoded.aggregates.avg.get("amount"), Some(&json!(12.5)));
        assert_eq!(decoded.aggregates.max.get("amount"), Some(&json!(20.0)));
        assert!(decoded.aggregates.sum.is_empty());
    }

    #[test]
    fn test_decode_non_object_is_empty() {
        assert_eq!(decode_row(JsonValue::Null), GroupRow::default());
    }

    #[test]
    fn test_serialized_shape_uses_underscore_keys() {
        let mut aggregates = Aggregates {
            count: Some(2),
            ..Default::default()
        };
        aggregates.sum.insert("percent".into(), json!(30.0));
        let value = serde_json::to_value(&aggregates).unwrap();
        assert_eq!(value, json!({"_count": 2, "_sum": {"percent": 30.0}}));
    }
}
