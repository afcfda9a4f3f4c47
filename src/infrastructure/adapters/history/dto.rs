//! History Service DTOs

use serde::Deserialize;

use crate::domain::history::{HistoryRecord, RecordId};
use crate::domain::inspection::ReportedVerdict;
use crate::domain::Timestamp;

/// GET /qc/history 响应中的一条记录
///
/// `image_name`、`items` 和 `ratio` 可能为 null。
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecordDto {
    pub id_qc: i64,
    #[serde(default)]
    pub image_name: Option<String>,
    pub total_weight: f64,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub items: Option<Vec<HistoryItemDto>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItemDto {
    #[serde(rename = "class")]
    pub category: String,
    pub weight: f64,
    #[serde(default)]
    pub ratio: Option<f64>,
}

impl From<HistoryRecordDto> for HistoryRecord {
    fn from(dto: HistoryRecordDto) -> Self {
        HistoryRecord::with_raw_items(
            RecordId::new(dto.id_qc),
            dto.image_name.unwrap_or_default(),
            dto.total_weight,
            ReportedVerdict::from_raw(&dto.status),
            Timestamp::parse(dto.created_at),
            dto.items
                .unwrap_or_default()
                .into_iter()
                .map(|item| (item.category, item.weight, item.ratio.unwrap_or_default()))
                .collect(),
        )
    }
}

/// 解析响应体；不是 JSON 数组时返回 None
///
/// 数组中无法解析的单条记录被跳过，其余记录照常显示。
pub fn parse_records(body: &str) -> Option<Vec<HistoryRecord>> {
    let entries = serde_json::from_str::<Vec<serde_json::Value>>(body).ok()?;
    let records = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<HistoryRecordDto>(entry) {
                Ok(dto) => Some(HistoryRecord::from(dto)),
                Err(e) => {
                    tracing::warn!(index = index, error = %e, "Skipping malformed history record");
                    None
                }
            }
        })
        .collect();
    Some(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records() {
        let records = parse_records(
            r#"[{"id_qc":3,"image_name":"a.jpg","total_weight":50.2,"status":"PASS",
                 "created_at":"2024-05-01T10:00:00+00:00",
                 "items":[{"class":"fillet","weight":40.16,"ratio":0.8}]},
                {"id_qc":2,"image_name":"b.jpg","total_weight":61.0,"status":"FAIL",
                 "created_at":"2024-05-01T09:00:00+00:00"}]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), RecordId::new(3));
        assert!((records[0].items()[0].share.value() - 80.0).abs() < 1e-9);
        assert!(records[1].items().is_empty());
    }

    #[test]
    fn test_unexpected_shapes() {
        assert!(parse_records(r#"{"error":"db down"}"#).is_none());
        assert!(parse_records("<html></html>").is_none());
        assert_eq!(parse_records(r#"[{"id":1}]"#).map(|r| r.len()), Some(0));
        assert_eq!(parse_records("[]").map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_bad_record_does_not_hide_the_rest() {
        let records = parse_records(
            r#"[{"id_qc":1,"image_name":"a.jpg","total_weight":50.2,"status":"PASS",
                 "created_at":"2024-05-01T10:00:00+00:00","items":null},
                {"id_qc":2,"image_name":null,"total_weight":61.0,"status":"FAIL",
                 "created_at":"2024-05-01T09:00:00+00:00",
                 "items":[{"class":"bone","weight":12.0,"ratio":null}]},
                {"id_qc":3,"image_name":"c.jpg","total_weight":null,"status":"PASS",
                 "created_at":"2024-05-01T08:00:00+00:00"},
                "garbage"]"#,
        )
        .unwrap();

        let ids: Vec<i64> = records.iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(records[0].items().is_empty());
        assert_eq!(records[1].image_name(), "");
        assert_eq!(records[1].items()[0].share.value(), 0.0);
    }
}
