//! End-to-end test: a full bot session against a fake chat service.
//!
//! The fake service is an axum WebSocket endpoint. Frames the bot sends are
//! forwarded to the test, and the test pushes frames back to the bot.

use std::{sync::Arc, time::Duration};

use arcadebot::{
    bot::Bot,
    client::run_bot,
    config::BotConfig,
    domain::{AuthError, AuthToken, DelayRange, TokenProvider},
};
use arcadebot_shared::time::SystemClock;
use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Token provider that always hands out the same token
struct StaticToken;

#[async_trait]
impl TokenProvider for StaticToken {
    async fn fetch_token(&self, username: &str, password: &str) -> Result<AuthToken, AuthError> {
        assert_eq!(username, "ArcadeBot");
        assert_eq!(password, "secret");
        AuthToken::new("tok-e2e".to_string()).map_err(|_| AuthError::MissingToken)
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: String,
}

struct FakeState {
    /// Frames the bot sent (parsed JSON)
    from_bot: mpsc::UnboundedSender<Value>,
    /// Frames to push to the bot; taken by the first connection
    to_bot: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    tokens: mpsc::UnboundedSender<String>,
}

/// Test side of the fake chat service
struct FakeService {
    ws_url: String,
    from_bot: mpsc::UnboundedReceiver<Value>,
    to_bot: mpsc::UnboundedSender<String>,
    tokens: mpsc::UnboundedReceiver<String>,
}

impl FakeService {
    async fn start() -> Self {
        let (from_bot_tx, from_bot) = mpsc::unbounded_channel();
        let (to_bot, to_bot_rx) = mpsc::unbounded_channel();
        let (tokens_tx, tokens) = mpsc::unbounded_channel();
        let state = Arc::new(FakeState {
            from_bot: from_bot_tx,
            to_bot: Mutex::new(Some(to_bot_rx)),
            tokens: tokens_tx,
        });

        let app = Router::new()
            .route("/ws", get(upgrade))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            ws_url: format!("ws://{}/ws", addr),
            from_bot,
            to_bot,
            tokens,
        }
    }

    fn push(&self, frame: Value) {
        self.to_bot.send(frame.to_string()).unwrap();
    }

    /// Wait for the next frame with the given handler, skipping others
    async fn expect(&mut self, handler: &str) -> Value {
        let wait = async {
            loop {
                let frame = self.from_bot.recv().await.expect("fake service closed");
                if frame["handler"] == handler {
                    return frame;
                }
            }
        };
        tokio::time::timeout(FRAME_TIMEOUT, wait)
            .await
            .unwrap_or_else(|_| panic!("no '{}' frame within {:?}", handler, FRAME_TIMEOUT))
    }
}

async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<FakeState>>,
    Query(query): Query<TokenQuery>,
) -> impl IntoResponse {
    state.tokens.send(query.token).unwrap();
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(socket: WebSocket, state: Arc<FakeState>) {
    let Some(mut to_bot) = state.to_bot.lock().await.take() else {
        return;
    };
    let (mut sink, mut stream) = socket.split();

    let push_task = tokio::spawn(async move {
        while let Some(frame) = to_bot.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        if let Message::Text(text) = message {
            let frame: Value = serde_json::from_str(text.as_str()).unwrap();
            let _ = state.from_bot.send(frame);
        }
    }
    push_task.abort();
}

fn test_config(ws_url: String) -> BotConfig {
    let mut config = BotConfig::default();
    config.password = Some("secret".to_string());
    config.ws_url = ws_url;
    config.startup_rooms = vec!["life".to_string()];
    config.masters = vec!["boss".to_string()];
    config.quiz.answer_delay = DelayRange::fixed(Duration::from_millis(20));
    config.connection.room_join_delay = Duration::from_millis(10);
    config.validated().unwrap()
}

#[tokio::test]
async fn test_quiz_round_trip_over_websocket() {
    // テスト項目: ログイン → 起動時ルーム参加 → `!quiz on` → 出題とヒントへの回答 が一連で動く
    // given (前提条件):
    let mut service = FakeService::start().await;
    let bot = Arc::new(Bot::new(
        test_config(service.ws_url.clone()),
        Arc::new(SystemClock),
    ));
    let handle = tokio::spawn(run_bot(bot.clone(), Arc::new(StaticToken)));

    // when (操作): ログインと参加
    let login = service.expect("login").await;
    service.push(json!({"handler": "login", "status": "success", "userID": 1}));
    let join = service.expect("joinchatroom").await;
    service.push(json!({"handler": "joinchatroom", "error": 0, "roomid": 42, "name": "life"}));

    // then (期待する結果):
    assert_eq!(service.tokens.recv().await.as_deref(), Some("tok-e2e"));
    assert_eq!(
        login,
        json!({"handler": "login", "username": "ArcadeBot", "password": "secret", "token": "tok-e2e"})
    );
    assert_eq!(
        join,
        json!({"handler": "joinchatroom", "name": "life", "roomPassword": "", "__source": "startup_join"})
    );

    // when (操作): マスターがクイズの監視を有効にする
    service.push(json!({
        "handler": "chatroommessage", "roomid": 42, "userid": 5,
        "username": "boss", "text": "!quiz on QuizBot"
    }));
    let enabled = service.expect("chatroommessage").await;

    // then (期待する結果):
    assert_eq!(
        enabled["text"],
        "✅ Quiz solver enabled. Watching for questions from 'quizbot'."
    );

    // when (操作): 出題
    service.push(json!({
        "handler": "chatroommessage", "roomid": 42, "userid": 9,
        "username": "QuizBot", "text": "*Maths - 3+4=?*  #77"
    }));
    let answer = service.expect("chatroommessage").await;

    // then (期待する結果): roomid は数値のまま送り返される
    assert_eq!(
        answer,
        json!({"handler": "chatroommessage", "type": "text", "roomid": 42, "text": "7"})
    );

    // when (操作): ヒント
    service.push(json!({
        "handler": "chatroommessage", "roomid": 42, "userid": 9,
        "username": "QuizBot", "text": "Hint: ?+5=12"
    }));
    let hint_answer = service.expect("chatroommessage").await;

    // then (期待する結果):
    assert_eq!(hint_answer["text"], "7");

    bot.shutdown().await;
    tokio::time::timeout(FRAME_TIMEOUT, handle)
        .await
        .expect("bot did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_own_messages_and_guests_are_ignored() {
    // テスト項目: ボット自身の発言とマスター以外のコマンドには反応しない
    // given (前提条件):
    let mut service = FakeService::start().await;
    let bot = Arc::new(Bot::new(
        test_config(service.ws_url.clone()),
        Arc::new(SystemClock),
    ));
    let handle = tokio::spawn(run_bot(bot.clone(), Arc::new(StaticToken)));
    service.expect("login").await;
    service.push(json!({"handler": "login", "status": "success", "userID": 1}));
    service.expect("joinchatroom").await;
    service.push(json!({"handler": "joinchatroom", "error": 0, "roomid": 42, "name": "life"}));

    // when (操作):
    service.push(json!({
        "handler": "chatroommessage", "roomid": 42, "userid": 1,
        "username": "ArcadeBot", "text": "!help"
    }));
    service.push(json!({
        "handler": "chatroommessage", "roomid": 42, "userid": 5,
        "username": "guest", "text": "!quiz on QuizBot"
    }));
    service.push(json!({
        "handler": "chatroommessage", "roomid": 42, "userid": 5,
        "username": "guest", "text": "!help"
    }));
    let reply = service.expect("chatroommessage").await;

    // then (期待する結果): 最初に届く返信はゲストの !help に対するもの
    assert!(
        reply["text"]
            .as_str()
            .unwrap()
            .starts_with("🤖 **ArcadeBot Help Menu** 🤖")
    );

    bot.shutdown().await;
    tokio::time::timeout(FRAME_TIMEOUT, handle)
        .await
        .expect("bot did not stop")
        .unwrap();
}
