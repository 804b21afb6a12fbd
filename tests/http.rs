use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct ChartFrame {
    revision: u64,
    labels: Vec<String>,
    datasets: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Dataset {
    label: String,
    data: Vec<u64>,
    border_color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateResponse {
    ready: bool,
    selected_countries: Vec<String>,
    chips: Vec<Chip>,
}

#[derive(Debug, Deserialize)]
struct Chip {
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryRow {
    name: String,
    selected: bool,
    total_cases: u64,
    last_week_cases: i64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn write_fixture_report() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("pandemic_dashboard_http_{}_{}.json", std::process::id(), nanos));

    let report = json!({
        "A": [
            { "date": "1/1", "confirmed": 0, "deaths": 0, "recovered": 0 },
            { "date": "1/2", "confirmed": 0, "deaths": 0, "recovered": 0 },
            { "date": "1/3", "confirmed": 5, "deaths": 1, "recovered": 0 }
        ],
        "B": [
            { "date": "1/1", "confirmed": 0, "deaths": 0, "recovered": 0 },
            { "date": "1/2", "confirmed": 2, "deaths": 0, "recovered": 0 },
            { "date": "1/3", "confirmed": 9, "deaths": 0, "recovered": 1 }
        ],
        "Broken": { "date": "1/1" }
    });
    std::fs::write(&path, serde_json::to_vec(&report).unwrap()).expect("write fixture report");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/state")).send().await {
            if let Ok(state) = resp.json::<StateResponse>().await {
                if state.ready {
                    return;
                }
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let report_path = write_fixture_report();
    let child = Command::new(env!("CARGO_BIN_EXE_pandemic_dashboard"))
        .env("PORT", port.to_string())
        .env("REPORT_PATH", report_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn post(client: &Client, server: &TestServer, path: &str, body: Value) -> ChartFrame {
    let response = client
        .post(format!("{}{path}", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success(), "{path} -> {}", response.status());
    response.json().await.unwrap()
}

/// Brings the shared server back to an empty selection aligned by date.
async fn reset(client: &Client, server: &TestServer) {
    let state: StateResponse = client
        .get(format!("{}/api/state", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    for country in state.selected_countries {
        post(client, server, "/api/countries/remove", json!({ "country": country })).await;
    }
    post(client, server, "/api/strategy", json!({ "kind": "byDate" })).await;
    post(client, server, "/api/metric", json!({ "metric": "confirmed" })).await;
}

#[tokio::test]
async fn http_chart_follows_selection_and_strategy() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset(&client, &server).await;

    let empty: ChartFrame = client
        .get(format!("{}/api/chart", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.labels.is_empty());
    assert!(empty.datasets.is_empty());

    post(&client, &server, "/api/countries/add", json!({ "country": "A" })).await;
    let frame = post(&client, &server, "/api/countries/add", json!({ "country": "B" })).await;
    assert!(frame.revision > empty.revision);
    assert_eq!(frame.labels, ["1/2", "1/3"]);
    assert_eq!(frame.datasets[0].label, "A");
    assert_eq!(frame.datasets[0].data, [0, 5]);
    assert_eq!(frame.datasets[1].data, [2, 9]);
    assert!(frame.datasets[1].border_color.starts_with("rgba("));

    let clicked = post(&client, &server, "/api/chart/click", json!({ "index": 1 })).await;
    assert_eq!(clicked.labels, ["1/3"]);
    assert_eq!(clicked.datasets[0].data, [5]);

    let by_day = post(&client, &server, "/api/strategy", json!({ "kind": "byDay" })).await;
    assert_eq!(by_day.labels, ["1", "2"]);
    assert_eq!(by_day.datasets[0].data, [5]);
    assert_eq!(by_day.datasets[1].data, [2, 9]);

    let deaths = post(&client, &server, "/api/metric", json!({ "metric": "deaths" })).await;
    assert_eq!(deaths.labels, ["1"]);
    assert_eq!(deaths.datasets[0].data, [1]);
}

#[tokio::test]
async fn http_unknown_countries_are_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset(&client, &server).await;

    post(&client, &server, "/api/countries/add", json!({ "country": "Broken" })).await;
    let frame = post(&client, &server, "/api/countries/toggle", json!({ "country": "B" })).await;
    assert_eq!(frame.datasets.len(), 1);
    assert_eq!(frame.datasets[0].label, "B");

    let state: StateResponse = client
        .get(format!("{}/api/state", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let chips: Vec<_> = state.chips.iter().map(|chip| chip.name.as_str()).collect();
    assert_eq!(chips, ["Broken", "B"]);
    assert!(state.chips.iter().all(|chip| chip.color.starts_with('#')));
}

#[tokio::test]
async fn http_country_table_sorts_and_marks_selection() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset(&client, &server).await;
    post(&client, &server, "/api/countries/add", json!({ "country": "A" })).await;

    let rows: Vec<CountryRow> = client
        .get(format!("{}/api/countries?sort=total&order=desc", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, ["B", "A"]);
    assert_eq!(rows[0].total_cases, 9);
    assert_eq!(rows[0].last_week_cases, 9);
    assert!(rows[1].selected);
    assert!(!rows[0].selected);

    let response = client
        .get(format!("{}/api/countries?sort=population", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_rejects_invalid_requests() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for (path, body) in [
        ("/api/strategy", json!({ "kind": "weekly" })),
        ("/api/metric", json!({ "metric": "tests" })),
        ("/api/countries/remove", json!({ "country": "  " })),
        ("/api/current", json!({})),
    ] {
        let response = client
            .post(format!("{}{path}", server.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let payload: Value = response.json().await.unwrap();
        assert!(payload["error"].is_string());
    }
}

#[tokio::test]
async fn http_index_lists_report_countries() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset(&client, &server).await;

    let html = client
        .get(&server.base_url)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"<option value="A""#));
    assert!(html.contains(r#"<option value="B""#));
    assert!(!html.contains("Broken"));
}
