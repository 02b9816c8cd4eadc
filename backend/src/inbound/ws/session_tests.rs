//! WebSocket session tests against an in-process server.

use super::*;
use crate::domain::ports::{
    MessageRepository, MockProductRepository, ProductRepository, ProductRepositoryError,
};
use crate::domain::{Author, CollectionStores, MessageId, MessageRecord, ProductRecord};
use crate::inbound::ws;
use crate::outbound::memory::{InMemoryMessageRepository, InMemoryProductRepository};
use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle, http::header};
use async_trait::async_trait;
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message as ClientMessage};
use futures_util::{SinkExt, StreamExt};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use url::Url;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

const ORIGIN: &str = "http://localhost:3000";

fn ws_state(products: Arc<dyn ProductRepository>, messages: Arc<dyn MessageRepository>) -> WsState {
    let connections = Arc::new(ConnectionManager::new());
    let coordinator = BroadcastCoordinator::new(
        CollectionStores { products, messages },
        connections.clone(),
        Arc::new(DefaultClock),
    );
    let origin = Url::parse(ORIGIN).expect("valid origin");
    WsState::new(coordinator, connections, [origin])
}

fn globe() -> ProductRecord {
    ProductRecord::try_new(Some(1), "Globe", 10.0, "globe.png").expect("valid product")
}

fn seeded_message() -> MessageRecord {
    let mut profile = Map::new();
    profile.insert("alias".to_owned(), json!("ed"));
    let author = Author::try_new("e@x.com", profile).expect("valid author");
    MessageRecord::new(
        MessageId::new("a").expect("valid id"),
        author,
        "hola",
        "16/10/2026, 09:30:00",
    )
}

fn seeded_state() -> WsState {
    ws_state(
        Arc::new(InMemoryProductRepository::with_products([globe()])),
        Arc::new(InMemoryMessageRepository::with_messages([seeded_message()])),
    )
}

fn start_ws_server(state: WsState) -> (String, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    (format!("http://{addr}"), server)
}

async fn connect(url: &str) -> Socket {
    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .set_header(header::ORIGIN, ORIGIN)
        .connect()
        .await
        .expect("websocket connect");
    socket
}

#[fixture]
async fn server_url() -> (String, ServerHandle) {
    let (url, server) = start_ws_server(seeded_state());
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (url, handle)
}

/// Read the next event, answering heartbeats so the session stays open.
async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json event"),
            Frame::Ping(payload) => {
                socket
                    .send(ClientMessage::Pong(payload))
                    .await
                    .expect("send pong");
            }
            Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn send_event(socket: &mut Socket, event: Value) {
    socket
        .send(ClientMessage::Text(event.to_string().into()))
        .await
        .expect("send text");
}

async fn skip_initial_snapshots(socket: &mut Socket) {
    next_event(socket).await;
    next_event(socket).await;
}

#[rstest]
#[actix_rt::test]
async fn sends_products_then_messages_on_connect(
    #[future] server_url: (String, ServerHandle),
) {
    let (url, _server) = server_url.await;
    let mut socket = connect(&url).await;

    let products = next_event(&mut socket).await;
    assert_eq!(products["event"], "productos");
    assert_eq!(products["data"][0]["title"], "Globe");

    let messages = next_event(&mut socket).await;
    assert_eq!(messages["event"], "mensajes");
    assert_eq!(messages["data"]["result"], "mensajes");
    let entities = &messages["data"]["entities"];
    assert_eq!(entities["author"]["e@x.com"]["alias"], "ed");
    assert_eq!(entities["post"]["a"]["author"], "e@x.com");
    assert_eq!(entities["post"]["a"]["text"], "hola");
    assert_eq!(entities["posts"]["mensajes"]["mensajes"], json!(["a"]));
}

#[rstest]
#[actix_rt::test]
async fn product_update_reaches_every_session_including_sender(
    #[future] server_url: (String, ServerHandle),
) {
    let (url, _server) = server_url.await;
    let mut writer = connect(&url).await;
    skip_initial_snapshots(&mut writer).await;
    let mut observer = connect(&url).await;
    skip_initial_snapshots(&mut observer).await;

    send_event(
        &mut writer,
        json!({
            "event": "update",
            "data": { "id": 2, "title": "Map", "price": "4.50", "thumbnail": "map.png" }
        }),
    )
    .await;

    for socket in [&mut writer, &mut observer] {
        let event = next_event(socket).await;
        assert_eq!(event["event"], "productos");
        let titles: Vec<_> = event["data"]
            .as_array()
            .expect("product list")
            .iter()
            .map(|product| product["title"].clone())
            .collect();
        assert_eq!(titles, [json!("Globe"), json!("Map")]);
    }
}

#[rstest]
#[actix_rt::test]
async fn new_message_is_stamped_and_normalised(#[future] server_url: (String, ServerHandle)) {
    let (url, _server) = server_url.await;
    let mut socket = connect(&url).await;
    skip_initial_snapshots(&mut socket).await;

    send_event(
        &mut socket,
        json!({
            "event": "nuevoMensaje",
            "data": { "id": "m1", "author": { "email": "e@x.com", "alias": "ed" }, "text": "hola" }
        }),
    )
    .await;

    let event = next_event(&mut socket).await;
    assert_eq!(event["event"], "mensajes");
    let entities = &event["data"]["entities"];
    assert_eq!(entities["author"]["e@x.com"]["alias"], "ed");
    assert_eq!(entities["post"]["m1"]["author"], "e@x.com");
    assert!(entities["post"]["m1"]["fyh"].as_str().is_some_and(|fyh| !fyh.is_empty()));
    assert_eq!(entities["posts"]["mensajes"]["mensajes"], json!(["a", "m1"]));
}

#[rstest]
#[actix_rt::test]
async fn update_without_id_is_acknowledged_only_to_sender(
    #[future] server_url: (String, ServerHandle),
) {
    let (url, _server) = server_url.await;
    let mut writer = connect(&url).await;
    skip_initial_snapshots(&mut writer).await;
    let mut observer = connect(&url).await;
    skip_initial_snapshots(&mut observer).await;

    send_event(
        &mut writer,
        json!({ "event": "update", "data": { "title": "X", "price": 1, "thumbnail": "t" } }),
    )
    .await;
    let ack = next_event(&mut writer).await;
    assert_eq!(ack["event"], "error");
    assert_eq!(ack["data"]["code"], "validation_failure");
    assert_eq!(ack["data"]["details"]["field"], "id");

    // A later valid update must be the observer's next event, proving the
    // rejected one was never broadcast.
    send_event(
        &mut writer,
        json!({ "event": "update", "data": { "id": 1, "title": "Globe 2", "price": 1, "thumbnail": "t" } }),
    )
    .await;
    let event = next_event(&mut observer).await;
    assert_eq!(event["event"], "productos");
    assert_eq!(event["data"][0]["title"], "Globe 2");
}

#[rstest]
#[actix_rt::test]
async fn malformed_frame_is_acknowledged_and_session_stays_open(
    #[future] server_url: (String, ServerHandle),
) {
    let (url, _server) = server_url.await;
    let mut socket = connect(&url).await;
    skip_initial_snapshots(&mut socket).await;

    socket
        .send(ClientMessage::Text("not-json".into()))
        .await
        .expect("send text");
    let ack = next_event(&mut socket).await;
    assert_eq!(ack["event"], "error");
    assert_eq!(ack["data"]["code"], "validation_failure");

    send_event(
        &mut socket,
        json!({ "event": "update", "data": { "id": 9, "title": "Pen", "price": 2, "thumbnail": "p" } }),
    )
    .await;
    let event = next_event(&mut socket).await;
    assert_eq!(event["event"], "productos");
}

#[rstest]
#[actix_rt::test]
async fn storage_failure_is_acknowledged_without_broadcast() {
    let mut products = MockProductRepository::new();
    products.expect_list_all().returning(|| Ok(Vec::new()));
    products
        .expect_save()
        .returning(|_| Err(ProductRepositoryError::connection("refused")));
    let (url, server) = start_ws_server(ws_state(
        Arc::new(products),
        Arc::new(InMemoryMessageRepository::new()),
    ));
    let _handle = server.handle();
    actix_web::rt::spawn(server);

    let mut socket = connect(&url).await;
    skip_initial_snapshots(&mut socket).await;
    send_event(
        &mut socket,
        json!({ "event": "update", "data": { "id": 1, "title": "X", "price": 1, "thumbnail": "t" } }),
    )
    .await;

    let ack = next_event(&mut socket).await;
    assert_eq!(ack["event"], "error");
    assert_eq!(ack["data"]["code"], "storage_unavailable");
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(
    #[future] server_url: (String, ServerHandle),
) {
    let (url, _server) = server_url.await;
    let mut socket = connect(&url).await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) | Frame::Text(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}

/// Catalogue whose first read stalls, after taking its rows, until released.
struct StalledFirstRead {
    inner: InMemoryProductRepository,
    gate: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

#[async_trait]
impl ProductRepository for StalledFirstRead {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, ProductRepositoryError> {
        let rows = self.inner.list_all().await?;
        let gate = self.gate.lock().expect("gate lock").take();
        if let Some((read_taken, release)) = gate {
            read_taken.send(()).expect("test awaits the read");
            release.await.expect("test releases the read");
        }
        Ok(rows)
    }

    async fn save(&self, product: ProductRecord) -> Result<ProductRecord, ProductRepositoryError> {
        self.inner.save(product).await
    }
}

fn drain(outbound: &mut Outbound) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = outbound.try_recv() {
        frames.push(serde_json::from_str(&frame).expect("json frame"));
    }
    frames
}

#[rstest]
#[tokio::test]
async fn initial_catalogue_read_overtaken_by_an_update_is_not_delivered() {
    let (read_taken_tx, read_taken) = oneshot::channel();
    let (release, release_rx) = oneshot::channel();
    let products = StalledFirstRead {
        inner: InMemoryProductRepository::with_products([globe()]),
        gate: Mutex::new(Some((read_taken_tx, release_rx))),
    };
    let state = ws_state(Arc::new(products), Arc::new(InMemoryMessageRepository::new()));
    let (id, mut outbound) = state.connections.register();
    let session = WsSession {
        id,
        coordinator: state.coordinator.clone(),
        connections: &state.connections,
    };
    let map = ProductRecord::try_new(Some(2), "Map", 4.5, "map.png").expect("valid product");

    let (initial, update) = tokio::join!(session.queue_initial_snapshots(), async {
        read_taken.await.expect("initial read started");
        let sessions = state.coordinator.handle_product_update(map).await;
        release.send(()).expect("initial read still waiting");
        sessions
    });
    assert!(initial.is_ok());
    assert_eq!(update.expect("update broadcast"), 1);

    let frames = drain(&mut outbound);
    let catalogues: Vec<_> = frames
        .iter()
        .filter(|frame| frame["event"] == "productos")
        .collect();
    assert_eq!(catalogues.len(), 1);
    let titles: Vec<_> = catalogues[0]["data"]
        .as_array()
        .expect("product list")
        .iter()
        .map(|product| product["title"].clone())
        .collect();
    assert_eq!(titles, [json!("Globe"), json!("Map")]);
    assert_eq!(frames.last().expect("message frame")["event"], "mensajes");
}
