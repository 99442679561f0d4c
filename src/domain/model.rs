use chrono::NaiveDate;
use serde_json::{Map, Value};

/// 依照目標欄位順序排列的一列資料
pub type Row = Vec<Value>;

/// 目標資料表：名稱、明確的欄位清單，以及寫入後是否需要 OPTIMIZE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub compact_after_insert: bool,
}

impl TableSpec {
    pub fn optimize_statement(&self) -> String {
        format!("OPTIMIZE TABLE {} FINAL", self.name)
    }
}

pub const FAILURE_CONFIRMATION_TABLE: TableSpec = TableSpec {
    name: "grafana.failureConfirmationTime",
    columns: &[
        "id",
        "name",
        "openingDate",
        "closingDate",
        "confirmationDate",
        "importance",
    ],
    compact_after_insert: true,
};

pub const INDICATORS_TABLE: TableSpec = TableSpec {
    name: "grafana.indicators",
    columns: &["prop", "value", "date"],
    compact_after_insert: false,
};

/// 轉成目標資料表的一列
pub trait IntoRow {
    fn into_row(self) -> Row;
}

/// 故障確認紀錄。欄位保留來源的原始 JSON 值，缺少的欄位為 null。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailureRecord {
    pub id: Value,
    pub name: Value,
    pub opening_date: Value,
    pub closing_date: Value,
    pub confirmation_date: Value,
    pub importance: Value,
}

impl FailureRecord {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let field = |key: &str| object.get(key).cloned().unwrap_or(Value::Null);

        Self {
            id: field("id"),
            name: field("name"),
            opening_date: field("openingDate"),
            closing_date: field("closingDate"),
            confirmation_date: field("confirmationDate"),
            importance: field("importance"),
        }
    }
}

impl IntoRow for FailureRecord {
    fn into_row(self) -> Row {
        vec![
            self.id,
            self.name,
            self.opening_date,
            self.closing_date,
            self.confirmation_date,
            self.importance,
        ]
    }
}

/// 指標快照：一個 key/value 配上執行日期
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    pub prop: String,
    pub value: Value,
    pub date: NaiveDate,
}

impl IntoRow for IndicatorRecord {
    fn into_row(self) -> Row {
        vec![
            Value::String(self.prop),
            self.value,
            Value::String(self.date.format("%Y-%m-%d").to_string()),
        ]
    }
}

/// 單一資料表的寫入結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub table: &'static str,
    pub rows_inserted: usize,
    pub compacted: bool,
}

impl LoadOutcome {
    pub fn empty(table: &TableSpec) -> Self {
        Self {
            table: table.name,
            rows_inserted: 0,
            compacted: false,
        }
    }
}
