use crate::domain::model::{FailureRecord, IndicatorRecord};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use serde_json::Value;

/// 把每個回應本文解析成 JSON 陣列並攤平成一串故障紀錄。
/// 空白本文略過。
pub fn flatten_failure_batches<S: AsRef<str>>(bodies: &[S]) -> Result<Vec<FailureRecord>> {
    let mut records = Vec::new();

    for (index, body) in bodies.iter().enumerate() {
        let body = body.as_ref();
        if body.trim().is_empty() {
            tracing::debug!("Skipping empty response body #{}", index);
            continue;
        }

        let items = match serde_json::from_str::<Value>(body)? {
            Value::Array(items) => items,
            other => {
                return Err(EtlError::processing(format!(
                    "failure feed response #{} is not a JSON array (got {})",
                    index,
                    json_kind(&other)
                )))
            }
        };

        for item in items {
            match item {
                Value::Object(object) => records.push(FailureRecord::from_object(&object)),
                other => {
                    return Err(EtlError::processing(format!(
                        "failure feed response #{} contains a non-object item ({})",
                        index,
                        json_kind(&other)
                    )))
                }
            }
        }
    }

    Ok(records)
}

/// 把扁平的 key/value 物件轉成指標紀錄，日期一律使用執行日期
pub fn indicator_records(payload: Value, date: NaiveDate) -> Result<Vec<IndicatorRecord>> {
    match payload {
        Value::Object(object) => Ok(object
            .into_iter()
            .map(|(prop, value)| IndicatorRecord { prop, value, date })
            .collect()),
        other => Err(EtlError::processing(format!(
            "indicator response is not a JSON object (got {})",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
