mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::{config_for, RecordingConnector};
use grafana_etl::EtlError;
use httpmock::prelude::*;
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_failure_feed_lands_in_failure_table() -> Result<()> {
    let server = MockServer::start();

    let feed_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/anydata")
            .query_param("query", "failureConfirmationTime")
            .query_param("dt_dt", "20250301");
        then.status(200).body(
            r#"[{"id":1,"name":"X","openingDate":"2025-03-01","closingDate":"2025-03-02","confirmationDate":"2025-03-02","importance":"high"}]"#,
        );
    });
    let indicator_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/site")
            .query_param("request", "getAdditionData");
        then.status(200).json_body(json!({}));
    });

    let connector = RecordingConnector::default();
    let report = grafana_etl::run(&config_for(&server), connector.clone(), date(2025, 3, 2)).await?;

    feed_mock.assert();
    indicator_mock.assert();

    let inserts = connector.inserts_into("grafana.failureConfirmationTime");
    assert_eq!(inserts.len(), 1);
    assert_eq!(
        inserts[0].columns,
        vec!["id", "name", "openingDate", "closingDate", "confirmationDate", "importance"]
    );
    assert_eq!(
        inserts[0].rows,
        vec![vec![
            json!(1),
            json!("X"),
            json!("2025-03-01"),
            json!("2025-03-02"),
            json!("2025-03-02"),
            json!("high")
        ]]
    );
    assert_eq!(
        connector.commands(),
        vec!["OPTIMIZE TABLE grafana.failureConfirmationTime FINAL".to_string()]
    );
    assert_eq!(report.failures.rows_inserted, 1);
    Ok(())
}

#[tokio::test]
async fn test_indicator_snapshot_tagged_with_run_date() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/anydata");
        then.status(200).body("[]");
    });
    let indicator_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/site")
            .query_param("request", "getAdditionData");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(r#"{"metricA": 42, "metricB": 7}"#);
    });

    let connector = RecordingConnector::default();
    let report = grafana_etl::run(&config_for(&server), connector.clone(), date(2025, 6, 1)).await?;

    indicator_mock.assert();

    let inserts = connector.inserts_into("grafana.indicators");
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].columns, vec!["prop", "value", "date"]);
    assert_eq!(
        inserts[0].rows,
        vec![
            vec![json!("metricA"), json!(42), json!("2025-06-01")],
            vec![json!("metricB"), json!(7), json!("2025-06-01")],
        ]
    );
    assert_eq!(report.indicators.rows_inserted, 2);
    assert!(!report.indicators.compacted);
    Ok(())
}

#[tokio::test]
async fn test_empty_feed_inserts_nothing() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/anydata");
        then.status(200).body("");
    });
    server.mock(|when, then| {
        when.method(GET).path("/site");
        then.status(200).json_body(json!({}));
    });

    let connector = RecordingConnector::default();
    let report = grafana_etl::run(&config_for(&server), connector.clone(), date(2025, 3, 2)).await?;

    assert!(connector.inserts().is_empty());
    assert!(connector.commands().is_empty());
    assert_eq!(report.failures.rows_inserted, 0);
    assert_eq!(report.indicators.rows_inserted, 0);

    let (opened, closed) = connector.sessions();
    assert_eq!(opened, closed);
    Ok(())
}

#[tokio::test]
async fn test_rerun_for_same_day_inserts_duplicates() -> Result<()> {
    let server = MockServer::start();

    let feed_mock = server.mock(|when, then| {
        when.method(GET).path("/anydata").query_param("dt_dt", "20250301");
        then.status(200)
            .body(r#"[{"id":1,"name":"X"},{"id":2,"name":"Y"}]"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/site");
        then.status(200).json_body(json!({"metricA": 1}));
    });

    let connector = RecordingConnector::default();
    let config = config_for(&server);
    grafana_etl::run(&config, connector.clone(), date(2025, 3, 2)).await?;
    grafana_etl::run(&config, connector.clone(), date(2025, 3, 2)).await?;

    feed_mock.assert_hits(2);

    let inserts = connector.inserts_into("grafana.failureConfirmationTime");
    assert_eq!(inserts.len(), 2);
    assert_eq!(inserts[0].rows, inserts[1].rows);
    assert_eq!(connector.inserts_into("grafana.indicators").len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_transport_error_aborts_run_without_inserts() {
    let server = MockServer::start();

    let feed_mock = server.mock(|when, then| {
        when.method(GET).path("/anydata");
        then.status(503).body("service unavailable");
    });
    let indicator_mock = server.mock(|when, then| {
        when.method(GET).path("/site");
        then.status(200).json_body(json!({"metricA": 1}));
    });

    let connector = RecordingConnector::default();
    let result = grafana_etl::run(&config_for(&server), connector.clone(), date(2025, 3, 2)).await;

    feed_mock.assert();
    // 第一條 pipeline 失敗後不會再執行指標
    indicator_mock.assert_hits(0);

    let err = result.unwrap_err();
    assert!(matches!(err, EtlError::ApiError(_)));
    assert!(err.exit_code() > 0);
    assert!(connector.inserts().is_empty());
    assert_eq!(connector.sessions(), (0, 0));
}

#[tokio::test]
async fn test_malformed_indicator_payload_fails_after_failure_load() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/anydata");
        then.status(200).body(r#"[{"id":9}]"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/site");
        then.status(200).body(r#"["not", "a", "map"]"#);
    });

    let connector = RecordingConnector::default();
    let result = grafana_etl::run(&config_for(&server), connector.clone(), date(2025, 3, 2)).await;

    assert!(matches!(result, Err(EtlError::ProcessingError { .. })));
    assert_eq!(connector.inserts_into("grafana.failureConfirmationTime").len(), 1);
    assert!(connector.inserts_into("grafana.indicators").is_empty());
}

#[tokio::test]
async fn test_since_window_fetches_every_day_through_yesterday() -> Result<()> {
    let server = MockServer::start();

    let day_mocks: Vec<_> = ["20250227", "20250228", "20250301"]
        .iter()
        .enumerate()
        .map(|(i, day)| {
            server.mock(|when, then| {
                when.method(GET).path("/anydata").query_param("dt_dt", *day);
                then.status(200).body(format!(r#"[{{"id":{}}}]"#, i + 1));
            })
        })
        .collect();
    server.mock(|when, then| {
        when.method(GET).path("/site");
        then.status(200).json_body(json!({}));
    });

    let mut config = config_for(&server);
    config.fetch.start_date = Some(date(2025, 2, 27));

    let connector = RecordingConnector::default();
    let report = grafana_etl::run(&config, connector.clone(), date(2025, 3, 2)).await?;

    for mock in &day_mocks {
        mock.assert();
    }

    let inserts = connector.inserts_into("grafana.failureConfirmationTime");
    assert_eq!(inserts.len(), 1);
    let ids: Vec<_> = inserts[0].rows.iter().map(|row| row[0].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(report.failures.rows_inserted, 3);
    Ok(())
}
