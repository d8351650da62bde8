use std::collections::HashMap;
use std::fs;
use tracing::info;

use fxcache::core::{ErrorKind, RateCache, RateStore};
use fxcache::providers::CurrencyLayerProvider;
use fxcache::store::DiskRateStore;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const ACCESS_KEY: &str = "integration-key";

    pub async fn create_mock_server(mock_response: &str, expected_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/live"))
            .and(query_param("access_key", ACCESS_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
provider:
  base_url: "{}"
  access_key: "{}"
currency: "USD"
data_path: "{}"
"#,
            base_url,
            ACCESS_KEY,
            dir.join("data").display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

const VALID_RESPONSE: &str = r#"{
    "success": true,
    "source": "USD",
    "quotes": {"USDJPY": 110.0, "USDEUR": 0.9}
}"#;

#[test_log::test(tokio::test)]
async fn test_refresh_and_pivot_with_disk_store() {
    let mock_server = test_utils::create_mock_server(VALID_RESPONSE, 1).await;
    let dir = tempfile::tempdir().unwrap();

    let api = CurrencyLayerProvider::new(&mock_server.uri(), test_utils::ACCESS_KEY).unwrap();
    let store = DiskRateStore::open(dir.path()).unwrap();
    let rates = RateCache::new(api, store);

    rates.refresh_rates().await.unwrap();

    let stored: HashMap<String, f64> = rates
        .store()
        .list_all()
        .unwrap()
        .into_iter()
        .map(|r| (r.code, r.rate))
        .collect();
    let expected: HashMap<String, f64> =
        [("JPY".to_string(), 110.0), ("EUR".to_string(), 0.9)].into();
    assert_eq!(stored, expected);

    let mut codes = rates.list_currency_codes().unwrap();
    codes.sort();
    assert_eq!(codes, vec!["EUR", "JPY", "USD"]);

    let jpy = rates.compute_rates("JPY").unwrap();
    info!(?jpy, "Pivoted to JPY");
    assert_eq!(jpy["JPY"], 1.0);
    assert!((jpy["USD"] - 1.0 / 110.0).abs() < 1e-12);
    assert!((jpy["EUR"] - 0.9 / 110.0).abs() < 1e-12);

    // Second refresh inside the cooldown never reaches the server
    let err = rates.refresh_rates().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoUpdates);
}

#[test_log::test(tokio::test)]
async fn test_foreign_base_payload_leaves_store_untouched() {
    let seed_server = test_utils::create_mock_server(VALID_RESPONSE, 1).await;
    let bad_server = test_utils::create_mock_server(
        r#"{"success": true, "quotes": {"USDJPY": 150.0, "EURJPY": 160.0}}"#,
        1,
    )
    .await;
    let dir = tempfile::tempdir().unwrap();

    {
        let api = CurrencyLayerProvider::new(&seed_server.uri(), test_utils::ACCESS_KEY).unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();
        RateCache::new(api, store).refresh_rates().await.unwrap();
    }

    let api = CurrencyLayerProvider::new(&bad_server.uri(), test_utils::ACCESS_KEY).unwrap();
    let store = DiskRateStore::open(dir.path()).unwrap();
    let before = store.last_update().unwrap();
    // No cooldown so the second refresh reaches the bad server
    let rates = RateCache::with_cooldown(api, store, chrono::Duration::zero());

    let err = rates.refresh_rates().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedData);

    let jpy_rate = rates.compute_rates("USD").unwrap()["JPY"];
    assert_eq!(jpy_rate, 110.0);
    assert_eq!(rates.store().list_all().unwrap().len(), 2);
    assert_eq!(rates.last_update().unwrap(), before);
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    // Convert refreshes once, the following commands are inside the cooldown
    let mock_server = test_utils::create_mock_server(VALID_RESPONSE, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    let result = fxcache::run_command(
        fxcache::AppCommand::Convert {
            amount: 100.0,
            from: Some("jpy".to_string()),
        },
        Some(config_path),
    )
    .await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());

    let result = fxcache::run_command(fxcache::AppCommand::Currencies, Some(config_path)).await;
    assert!(result.is_ok(), "Currencies failed with: {:?}", result.err());

    let result =
        fxcache::run_command(fxcache::AppCommand::Refresh { retries: 0 }, Some(config_path)).await;
    assert!(result.is_ok(), "Refresh failed with: {:?}", result.err());

    assert!(dir.path().join("data").join("rates").exists());
}

#[test_log::test(tokio::test)]
async fn test_app_flow_with_bad_response_falls_back_to_stored_rates() {
    let mock_server = test_utils::create_mock_server(r#"{"success": false}"#, 2).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    // Refresh fails, but USD is always convertible
    let result = fxcache::run_command(
        fxcache::AppCommand::Convert {
            amount: 5.0,
            from: None,
        },
        Some(config_path),
    )
    .await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());

    // A failed refresh does not start the cooldown, so this reaches the server again
    let result = fxcache::run_command(
        fxcache::AppCommand::Convert {
            amount: 5.0,
            from: Some("JPY".to_string()),
        },
        Some(config_path),
    )
    .await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Unknown currency code JPY"));
}

#[test_log::test(tokio::test)]
async fn test_refresh_command_reports_failure() {
    let mock_server = test_utils::create_mock_server(r#"{"success": false}"#, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = fxcache::run_command(
        fxcache::AppCommand::Refresh { retries: 0 },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("bad response"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");

    let result = fxcache::run_command(
        fxcache::AppCommand::Currencies,
        Some(missing.to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    assert!(
        fs::metadata(&missing).is_err(),
        "Config file should not be created"
    );
}
