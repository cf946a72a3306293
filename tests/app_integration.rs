use fxconv::core::storage::KeyValueStorage;
use fxconv::core::{CurrencyCode, Favorites, History};
use fxconv::store::disk::DiskStorage;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/{base}.json");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let data_path = dir.join("data");
        let config_content = format!(
            r#"
            provider:
              base_url: "{}"
              timeout_secs: 5
            defaults:
              from: "inr"
              targets: ["usd"]
              new_target: "eur"
            data_path: "{}"
        "#,
            base_url,
            data_path.display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

const INR_RATES: &str = r#"{
    "date": "2024-05-01",
    "inr": {"usd": 0.012, "eur": 0.011, "gbp": 0.0096}
}"#;

fn open_storage(dir: &Path) -> Arc<dyn KeyValueStorage> {
    Arc::new(DiskStorage::open(&dir.join("data").join("storage")).expect("open storage"))
}

#[test_log::test(tokio::test)]
async fn test_full_convert_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("inr", INR_RATES).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: 100.0,
            from: "INR".to_string(),
            to: vec!["usd".to_string(), "gbp".to_string()],
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());

    let history = History::load(open_storage(temp_dir.path()));
    assert_eq!(history.len(), 1);
    let entry = &history.entries()[0];
    assert_eq!(entry.from, CurrencyCode::new("inr").unwrap());
    assert_eq!(
        entry.targets,
        vec![
            CurrencyCode::new("usd").unwrap(),
            CurrencyCode::new("gbp").unwrap()
        ]
    );
    assert!((entry.amounts[0].unwrap() - 1.2).abs() < 1e-9);
    assert!((entry.amounts[1].unwrap() - 0.96).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_history_accumulates_across_runs() {
    let mock_server = test_utils::create_mock_server("inr", INR_RATES).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    for amount in [1.0, 2.0, 3.0] {
        fxconv::run_command(
            fxconv::AppCommand::Convert {
                amount,
                from: "inr".to_string(),
                to: vec!["eur".to_string()],
            },
            Some(config_path.to_str().unwrap()),
        )
        .await
        .expect("convert");
    }

    let result = fxconv::run_command(
        fxconv::AppCommand::History,
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "History failed with: {:?}", result.err());

    let history = History::load(open_storage(temp_dir.path()));
    let amounts: Vec<f64> = history
        .entries()
        .iter()
        .map(|e| e.amounts[0].unwrap())
        .collect();
    assert_eq!(amounts.len(), 3);
    for (got, amount) in amounts.iter().zip([1.0, 2.0, 3.0]) {
        assert!((got - amount * 0.011).abs() < 1e-12);
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_fails_when_rates_unavailable() {
    // Nothing mounted for usd, the mock answers 404
    let mock_server = test_utils::create_mock_server("inr", INR_RATES).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: 1.0,
            from: "usd".to_string(),
            to: vec!["inr".to_string()],
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());

    let history = History::load(open_storage(temp_dir.path()));
    assert!(history.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_favorites_toggle_persists() {
    let mock_server = test_utils::create_mock_server("inr", INR_RATES).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let toggle = || fxconv::AppCommand::Favorites {
        toggle: Some(("inr".to_string(), "usd".to_string())),
    };

    fxconv::run_command(toggle(), Some(config_path.to_str().unwrap()))
        .await
        .expect("first toggle");
    {
        let favorites = Favorites::load(open_storage(temp_dir.path()));
        assert_eq!(
            favorites.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            vec!["inr_usd"]
        );
    }

    fxconv::run_command(toggle(), Some(config_path.to_str().unwrap()))
        .await
        .expect("second toggle");
    let favorites = Favorites::load(open_storage(temp_dir.path()));
    assert!(favorites.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_corrupt_history_is_ignored() {
    let mock_server = test_utils::create_mock_server("inr", INR_RATES).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    {
        let storage = open_storage(temp_dir.path());
        storage.set("history", "{definitely not json").unwrap();
    }

    fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: 10.0,
            from: "inr".to_string(),
            to: vec!["usd".to_string()],
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .expect("convert over corrupt history");

    let history = History::load(open_storage(temp_dir.path()));
    assert_eq!(history.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_rates_command_with_mock() {
    let mock_server = test_utils::create_mock_server("inr", INR_RATES).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Rates {
            base: "inr".to_string(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("nope.yaml");
    fs::remove_file(&missing).ok();

    let result =
        fxconv::run_command(fxconv::AppCommand::History, Some(missing.to_str().unwrap())).await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
#[ignore = "hits the public rate service"]
async fn test_real_currency_api() {
    use fxconv::core::RateProvider;
    use fxconv::core::config::DEFAULT_RATES_URL;
    use fxconv::providers::currency_api::CurrencyApiProvider;

    let provider = CurrencyApiProvider::new(DEFAULT_RATES_URL, std::time::Duration::from_secs(10))
        .expect("client");
    let base = CurrencyCode::new("inr").unwrap();
    info!(%base, "Fetching rates from the public currency api");

    match provider.fetch_rates(&base).await {
        Ok(table) => {
            info!(rates = table.len(), "Received rate table");
            assert!(table.rate(&CurrencyCode::new("usd").unwrap()).is_some());
            assert_eq!(table.rate(&base), Some(1.0));
        }
        Err(e) => {
            error!("Rate API request failed: {e}\n{e:?}");
            panic!("Rate API request failed: {e}");
        }
    }
}
