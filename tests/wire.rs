use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use stayd::engine::Desk;
use stayd::store::MemoryStore;
use stayd::wire;

// ── Test infrastructure ──────────────────────────────────────

async fn start_test_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let desk = Arc::new(Desk::new(Arc::new(MemoryStore::new())));

    tokio::spawn(async move {
        loop {
            let (socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let desk = desk.clone();
            tokio::spawn(async move {
                let _ = wire::process_connection(socket, desk).await;
            });
        }
    });

    addr
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let socket = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = socket.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn send_line(&mut self, line: &str) -> Value {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        let mut response = String::new();
        self.reader.read_line(&mut response).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    async fn request(&mut self, request: Value) -> Value {
        self.send_line(&request.to_string()).await
    }

    async fn create(&mut self, guest: &str, unit: &str, check_in: &str, nights: u32) -> Value {
        self.request(json!({
            "op": "create",
            "booking": {
                "guestName": guest,
                "unitID": unit,
                "checkInDate": check_in,
                "numberOfNights": nights,
            }
        }))
        .await
    }
}

// ── End-to-end scenarios ─────────────────────────────────────

#[tokio::test]
async fn health_probe_alive() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;
    let response = client.request(json!({"op": "health"})).await;
    assert_eq!(response["status"], "alive");
}

#[tokio::test]
async fn create_then_get_roundtrip() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;

    let created = client.create("Alice", "U1", "2024-01-10", 3).await;
    assert_eq!(created["status"], "created");
    let booking = &created["booking"];
    assert_eq!(booking["guestName"], "Alice");
    assert_eq!(booking["unitID"], "U1");
    assert_eq!(booking["checkInDate"], "2024-01-10");
    assert_eq!(booking["numberOfNights"], 3);
    let id = booking["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let found = client.request(json!({"op": "get", "id": id})).await;
    assert_eq!(found["status"], "found");
    assert_eq!(found["booking"], *booking);
}

#[tokio::test]
async fn admission_rules_over_the_wire() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;

    let first = client.create("Alice", "U1", "2024-01-10", 3).await;
    assert_eq!(first["status"], "created");

    // Same guest, same unit.
    let repeat = client.create("Alice", "U1", "2024-02-01", 1).await;
    assert_eq!(repeat["status"], "rejected");
    assert_eq!(
        repeat["reason"],
        "The given guest name cannot book the same unit multiple times"
    );

    // Same guest, different unit.
    let elsewhere = client.create("Alice", "U2", "2024-02-01", 1).await;
    assert_eq!(elsewhere["status"], "rejected");
    assert_eq!(
        elsewhere["reason"],
        "The same guest cannot be in multiple units at the same time"
    );

    // Check-in one day into Alice's stay.
    let clash = client.create("Bob", "U1", "2024-01-11", 2).await;
    assert_eq!(clash["status"], "rejected");
    assert_eq!(
        clash["reason"],
        "For the given check-in date, the unit is already occupied"
    );

    // Ten days out clears the three-night stay.
    let clear = client.create("Carol", "U1", "2024-01-20", 2).await;
    assert_eq!(clear["status"], "created");
}

#[tokio::test]
async fn extend_happy_path() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;

    let created = client.create("Alice", "U1", "2024-01-10", 3).await;
    let id = created["booking"]["id"].as_str().unwrap().to_string();

    let extended = client
        .request(json!({"op": "extend", "id": id, "additionalNights": 2}))
        .await;
    assert_eq!(extended["status"], "extended");
    assert_eq!(extended["booking"]["numberOfNights"], 5);
    assert_eq!(extended["booking"]["checkInDate"], "2024-01-10");
    assert_eq!(extended["booking"]["id"].as_str().unwrap(), id);
}

#[tokio::test]
async fn extend_unknown_id_not_found() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;
    let response = client
        .request(json!({
            "op": "extend",
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "additionalNights": 2
        }))
        .await;
    assert_eq!(response["status"], "not_found");
}

#[tokio::test]
async fn get_unknown_id_not_found() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;
    let response = client
        .request(json!({"op": "get", "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV"}))
        .await;
    assert_eq!(response["status"], "not_found");
}

#[tokio::test]
async fn malformed_requests_are_invalid() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;

    let garbage = client.send_line("this is not json").await;
    assert_eq!(garbage["status"], "invalid");

    let unknown_op = client.request(json!({"op": "teleport"})).await;
    assert_eq!(unknown_op["status"], "invalid");

    let bad_id = client
        .request(json!({"op": "get", "id": "not-a-ulid"}))
        .await;
    assert_eq!(bad_id["status"], "invalid");

    let bad_date = client.create("Alice", "U1", "eleventy", 3).await;
    assert_eq!(bad_date["status"], "invalid");

    // The connection stays usable after invalid requests.
    let health = client.request(json!({"op": "health"})).await;
    assert_eq!(health["status"], "alive");
}

#[tokio::test]
async fn zero_nights_invalid_and_not_stored() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;

    let response = client.create("Alice", "U1", "2024-01-10", 0).await;
    assert_eq!(response["status"], "invalid");

    let listing = client
        .request(json!({"op": "bookings", "unitID": "U1"}))
        .await;
    assert_eq!(listing["status"], "bookings");
    assert_eq!(listing["bookings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn timestamp_check_in_normalized_to_date() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;

    let created = client
        .create("Alice", "U1", "2024-01-10T15:30:00Z", 3)
        .await;
    assert_eq!(created["status"], "created");
    assert_eq!(created["booking"]["checkInDate"], "2024-01-10");

    // The normalized date participates in conflict detection.
    let clash = client.create("Bob", "U1", "2024-01-11", 1).await;
    assert_eq!(clash["status"], "rejected");
}

#[tokio::test]
async fn bookings_listing_per_unit() {
    let addr = start_test_server().await;
    let mut client = Client::connect(addr).await;

    client.create("Alice", "U1", "2024-01-10", 3).await;
    client.create("Carol", "U1", "2024-01-20", 2).await;
    client.create("Bob", "U2", "2024-01-10", 1).await;

    let listing = client
        .request(json!({"op": "bookings", "unitID": "U1"}))
        .await;
    let bookings = listing["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0]["guestName"], "Alice");
    assert_eq!(bookings[1]["guestName"], "Carol");
}

#[tokio::test]
async fn concurrent_clients_one_winner_per_slot() {
    let addr = start_test_server().await;

    let mut handles = Vec::new();
    for guest in ["Alice", "Bob", "Carol", "Dave"] {
        handles.push(tokio::spawn(async move {
            let mut client = Client::connect(addr).await;
            client.create(guest, "U1", "2024-01-10", 3).await
        }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        let response = handle.await.unwrap();
        match response["status"].as_str().unwrap() {
            "created" => created += 1,
            "rejected" => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(rejected, 3);
}
