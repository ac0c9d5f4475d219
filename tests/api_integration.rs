//! Process-level tests: the simulator binary over real TCP.

mod common;

use std::fs;
use std::net::TcpStream;
use std::time::Duration;

use serde_json::{Value, json};

use common::SimulatorGuard;

#[test]
fn state_round_trip_over_http() {
    let sim = SimulatorGuard::start(&["--preset", "baseline"]);

    let doc = json!({
        "site": { "grid": { "power": 42 } },
        "vehicles": [{ "soc": 5, "range": 9 }],
    });
    let (status, body) = sim
        .post("/api/state", &doc.to_string())
        .expect("POST /api/state should succeed");
    assert_eq!(status, 200);
    assert!(body.is_empty());

    let (status, body) = sim.get("/api/state").expect("GET /api/state should succeed");
    assert_eq!(status, 200);
    assert_eq!(body, doc.to_string());

    let (status, body) = sim
        .get("/rest/channel/_sum/GridActivePower")
        .expect("channel read should succeed");
    assert_eq!(status, 200);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "value": 42 }));
}

#[test]
fn preset_seeds_initial_state() {
    let sim = SimulatorGuard::start(&["--preset", "daytime"]);
    let (status, body) = sim
        .get("/rest/channel/_sum/ProductionActivePower")
        .expect("channel read should succeed");
    assert_eq!(status, 200);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["value"].as_f64(), Some(6000.0));
}

#[test]
fn shutdown_acknowledges_then_stops_listening() {
    let mut sim = SimulatorGuard::start(&[]);
    let addr = sim.addr.clone();

    let (status, body) = sim
        .post("/api/shutdown", "")
        .expect("shutdown should be acknowledged");
    assert_eq!(status, 200);
    assert!(body.is_empty());

    assert!(
        sim.shutdown(Duration::from_secs(5)),
        "process should exit cleanly after shutdown"
    );
    assert!(TcpStream::connect(&addr).is_err(), "listener should be gone");
}

#[test]
fn journal_written_on_shutdown() {
    let dir = std::env::temp_dir().join(format!("device-sim-journal-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("journal.csv");
    let path_arg = path.to_str().unwrap().to_string();

    let mut sim = SimulatorGuard::start(&["--journal-out", &path_arg]);
    sim.get("/currentjson/1").unwrap();
    sim.get("/unknown").unwrap();
    assert!(sim.shutdown(Duration::from_secs(5)));

    let csv = fs::read_to_string(&path).expect("journal should be written");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "seq,method,uri,handler,status");
    assert!(lines.iter().any(|l| l.ends_with(",GET,/currentjson/1,vehicle,200")));
    assert!(lines.iter().any(|l| l.ends_with(",GET,/unknown,unclaimed,404")));
    assert!(lines.iter().any(|l| l.ends_with(",POST,/api/shutdown,state,200")));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_config_exits_with_error() {
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_device-sim"))
        .args(["--preset", "nonexistent"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .expect("device-sim should run");
    assert!(!status.success());
}
