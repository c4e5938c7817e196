// tests/runtime_e2e.rs
use std::fs;

use currency_monitor::config::monitor::parse;
use currency_monitor::ingest::fetch::{Fetcher, RetryPolicy};
use currency_monitor::ingest::registry::SourceRegistry;
use currency_monitor::ingest::store::{JsonlStore, StoredRecord};
use currency_monitor::notify::UnsupportedNotifier;
use currency_monitor::{MonitorRuntime, RatePair};
use serial_test::serial;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn config_to_jsonl_with_stubbed_upstreams() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/privat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fs::read_to_string("tests/fixtures/privatbank.json").unwrap()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/open"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fs::read_to_string("tests/fixtures/open_er_api.json").unwrap()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currencyapi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"valid": false}"#))
        .mount(&server)
        .await;

    let cfg_text = format!(
        r#"
base_currency = "UAH"
main_currencies = "USD EUR"

[notifications]
resource_limit = 1

[[resources]]
name = "PrivatBank"
url = "{uri}/privat"
do_notifications = true

[[resources]]
name = "Monobank"
url = "{uri}/mono"

[[resources]]
name = "CurrencyAPI"
url = "{uri}/currencyapi"

[[resources]]
name = "OpenExchangeRateAPI"
url = "{uri}/open"
do_notifications = true
"#,
        uri = server.uri()
    );
    let cfg = parse(&cfg_text, "toml").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("rates.jsonl");
    let fetcher = Fetcher::new(RetryPolicy::immediate(3)).unwrap();
    let runtime = MonitorRuntime::with_parts(
        &cfg,
        SourceRegistry::with_defaults(fetcher, &cfg.base_currency, None),
        Box::new(JsonlStore::new(&out)),
        Box::new(UnsupportedNotifier::new("test")),
    );

    let report = runtime.run_once().await.unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.successes, 2);
    assert_eq!(report.last_index, 4);

    let lines: Vec<StoredRecord> = fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].resource_name, "PrivatBank");
    assert_eq!(
        lines[0].currencies["USD"],
        RatePair(Some(38.2418), Some(38.2418))
    );
    assert_eq!(lines[1].resource_name, "OpenExchangeRateAPI");
    assert_eq!(lines[1].currencies["EUR"], RatePair::single(41.6487));
}

#[serial]
#[test]
fn reload_picks_up_edits_and_survives_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("monitor.toml");
    let store = dir.path().join("rates.jsonl").display().to_string();
    let write = |limit: usize, names: &[&str]| {
        let mut text = format!(
            "base_currency = \"UAH\"\nmain_currencies = \"USD\"\n[notifications]\nresource_limit = {limit}\n[storage]\npath = {store:?}\n"
        );
        for n in names {
            text.push_str(&format!("[[resources]]\nname = \"{n}\"\nurl = \"http://127.0.0.1:9/{n}\"\n"));
        }
        fs::write(&cfg_path, text).unwrap();
    };

    write(1, &["PrivatBank"]);
    let mut runtime = MonitorRuntime::from_path(&cfg_path).unwrap();
    assert_eq!(runtime.resources.len(), 1);
    assert_eq!(runtime.settings.notification_limit, 1);

    write(5, &["PrivatBank", "OpenExchangeRateAPI"]);
    runtime.reload(&cfg_path).unwrap();
    assert_eq!(runtime.resources.len(), 2);
    assert_eq!(runtime.resources[1].name, "OpenExchangeRateAPI");
    assert_eq!(runtime.settings.notification_limit, 5);

    fs::write(&cfg_path, "base_currency = ").unwrap();
    assert!(runtime.reload(&cfg_path).is_err());
    assert_eq!(runtime.resources.len(), 2);
    assert_eq!(runtime.settings.notification_limit, 5);
}
