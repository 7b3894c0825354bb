//! Result types for gateway calls. Rows are mapped to JSON objects here so
//! the HTTP layer never sees driver types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// One row as a JSON object, in column order.
pub type JsonRow = serde_json::Map<String, Value>;

/// Trailing status of a `CALL`.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatus {
    pub affected_rows: u64,
    pub insert_id: u64,
}

/// Everything a stored procedure call produced.
///
/// Serializes the way MySQL clients conventionally report a `CALL`: one array
/// per result set followed by the status object, or just the status object
/// when the procedure selected nothing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CallOutcome {
    pub result_sets: Vec<Vec<JsonRow>>,
    pub status: CallStatus,
}

/// Item of a multi-result stream, already decoded.
#[derive(Debug)]
pub enum CallItem {
    Row(JsonRow),
    Done { affected_rows: u64, insert_id: u64 },
}

impl CallOutcome {
    /// Group a flat stream of rows and completion packets into result sets.
    /// Every completion closes the set before it; the final one is the status
    /// packet of the `CALL` itself.
    pub fn collect<I>(items: I) -> Self
    where
        I: IntoIterator<Item = CallItem>,
    {
        let mut sets: Vec<(Vec<JsonRow>, CallStatus)> = Vec::new();
        let mut current = Vec::new();

        for item in items {
            match item {
                CallItem::Row(row) => current.push(row),
                CallItem::Done { affected_rows, insert_id } => {
                    sets.push((std::mem::take(&mut current), CallStatus { affected_rows, insert_id }));
                }
            }
        }

        // Rows without a closing packet only happen on a truncated stream.
        if !current.is_empty() {
            sets.push((current, CallStatus::default()));
        }

        let status = match sets.pop() {
            Some((rows, status)) if rows.is_empty() => status,
            Some(last) => {
                sets.push(last);
                CallStatus::default()
            }
            None => CallStatus::default(),
        };

        Self {
            result_sets: sets.into_iter().map(|(rows, _)| rows).collect(),
            status,
        }
    }

    /// First result set, or empty when the procedure selected nothing.
    pub fn first_set(&self) -> &[JsonRow] {
        self.result_sets.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_first_set(self) -> Vec<JsonRow> {
        self.result_sets.into_iter().next().unwrap_or_default()
    }
}

impl Serialize for CallOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.result_sets.is_empty() {
            return self.status.serialize(serializer);
        }
        let mut seq = serializer.serialize_seq(Some(self.result_sets.len() + 1))?;
        for set in &self.result_sets {
            seq.serialize_element(set)?;
        }
        seq.serialize_element(&self.status)?;
        seq.end()
    }
}

/// How a column's wire value is turned into JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Double,
    Date,
    DateTime,
    Timestamp,
    Time,
    Json,
    Binary,
    /// Character data, and `DECIMAL`, which travels as an exact decimal string.
    Text,
}

/// Classify a MySQL type name as reported by the driver.
pub fn column_kind(type_name: &str) -> ColumnKind {
    let name = type_name.to_ascii_uppercase();
    if name.ends_with(" UNSIGNED") {
        return ColumnKind::Unsigned;
    }
    match name.as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "BOOLEAN" => ColumnKind::Signed,
        "YEAR" => ColumnKind::Unsigned,
        "FLOAT" => ColumnKind::Float,
        "DOUBLE" => ColumnKind::Double,
        "DATE" => ColumnKind::Date,
        "DATETIME" => ColumnKind::DateTime,
        "TIMESTAMP" => ColumnKind::Timestamp,
        "TIME" => ColumnKind::Time,
        "JSON" => ColumnKind::Json,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => ColumnKind::Binary,
        _ => ColumnKind::Text,
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn float_value(v: f64) -> Value {
    serde_json::Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Convert a driver row into a JSON object.
pub fn row_to_json(row: &MySqlRow) -> Result<JsonRow, sqlx::Error> {
    let mut out = JsonRow::with_capacity(row.len());
    for column in row.columns() {
        let idx = column.ordinal();
        let value = if row.try_get_raw(idx)?.is_null() {
            Value::Null
        } else {
            decode_column(row, idx, column_kind(column.type_info().name()))?
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn decode_column(row: &MySqlRow, idx: usize, kind: ColumnKind) -> Result<Value, sqlx::Error> {
    let value = match kind {
        // Integer widths vary per column; the unchecked decoders read whatever width arrives.
        ColumnKind::Signed => Value::from(row.try_get_unchecked::<i64, _>(idx)?),
        ColumnKind::Unsigned => Value::from(row.try_get_unchecked::<u64, _>(idx)?),
        ColumnKind::Float => float_value(f64::from(row.try_get::<f32, _>(idx)?)),
        ColumnKind::Double => float_value(row.try_get::<f64, _>(idx)?),
        ColumnKind::Date => {
            Value::String(row.try_get::<NaiveDate, _>(idx)?.format("%Y-%m-%d").to_string())
        }
        ColumnKind::DateTime => {
            Value::String(format_timestamp(row.try_get::<NaiveDateTime, _>(idx)?.and_utc()))
        }
        ColumnKind::Timestamp => {
            Value::String(format_timestamp(row.try_get::<DateTime<Utc>, _>(idx)?))
        }
        ColumnKind::Time => {
            Value::String(row.try_get::<NaiveTime, _>(idx)?.format("%H:%M:%S").to_string())
        }
        ColumnKind::Json => {
            let raw: String = row.try_get_unchecked(idx)?;
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        }
        ColumnKind::Binary => Value::from(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        ColumnKind::Text => Value::String(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn row(v: Value) -> JsonRow {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn classifies_driver_type_names() {
        assert_eq!(column_kind("INT"), ColumnKind::Signed);
        assert_eq!(column_kind("BOOLEAN"), ColumnKind::Signed);
        assert_eq!(column_kind("BIGINT UNSIGNED"), ColumnKind::Unsigned);
        assert_eq!(column_kind("DECIMAL"), ColumnKind::Text);
        assert_eq!(column_kind("VARCHAR"), ColumnKind::Text);
        assert_eq!(column_kind("ENUM"), ColumnKind::Text);
        assert_eq!(column_kind("datetime"), ColumnKind::DateTime);
        assert_eq!(column_kind("LONGBLOB"), ColumnKind::Binary);
        assert_eq!(column_kind("FLOAT"), ColumnKind::Float);
    }

    #[test]
    fn timestamps_render_as_utc_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 3, 14, 7, 9).unwrap();
        assert_eq!(format_timestamp(ts), "2024-05-03T14:07:09.000Z");
    }

    #[test]
    fn select_in_procedure_yields_set_then_status() {
        let outcome = CallOutcome::collect(vec![
            CallItem::Row(row(json!({"idPublicacion": 1}))),
            CallItem::Row(row(json!({"idPublicacion": 2}))),
            CallItem::Done { affected_rows: 0, insert_id: 0 },
            CallItem::Done { affected_rows: 0, insert_id: 0 },
        ]);
        assert_eq!(outcome.result_sets.len(), 1);
        assert_eq!(outcome.first_set().len(), 2);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!([
                [{"idPublicacion": 1}, {"idPublicacion": 2}],
                {"affectedRows": 0, "insertId": 0}
            ])
        );
    }

    #[test]
    fn empty_select_still_counts_as_a_set() {
        let outcome = CallOutcome::collect(vec![
            CallItem::Done { affected_rows: 0, insert_id: 0 },
            CallItem::Done { affected_rows: 0, insert_id: 0 },
        ]);
        assert_eq!(outcome.result_sets, vec![Vec::<JsonRow>::new()]);
        assert!(outcome.first_set().is_empty());
    }

    #[test]
    fn procedure_without_select_serializes_status_only() {
        let outcome = CallOutcome::collect(vec![CallItem::Done { affected_rows: 1, insert_id: 31 }]);
        assert!(outcome.result_sets.is_empty());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"affectedRows": 1, "insertId": 31})
        );
    }

    #[test]
    fn multiple_sets_keep_their_order() {
        let outcome = CallOutcome::collect(vec![
            CallItem::Row(row(json!({"a": 1}))),
            CallItem::Done { affected_rows: 0, insert_id: 0 },
            CallItem::Row(row(json!({"b": 2}))),
            CallItem::Done { affected_rows: 0, insert_id: 0 },
            CallItem::Done { affected_rows: 3, insert_id: 0 },
        ]);
        assert_eq!(outcome.result_sets.len(), 2);
        assert_eq!(outcome.status.affected_rows, 3);
        assert_eq!(outcome.into_first_set(), vec![row(json!({"a": 1}))]);
    }
}
