//! In-memory transport and listener doubles shared by the client tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::client::credentials::EphemeralToken;
use crate::client::listener::SessionListener;
use crate::client::signaling::{MockSignaling, Signaling};
use crate::client::transport::{
    AudioTrack, ChannelFrame, DataChannel, PeerConnection, PeerTransport, TransportEvent, TransportEventSender,
};
use crate::error::{SessionError, TransportError};
use crate::types::{ServerEvent, SessionConfig};

pub(crate) const FAKE_OFFER: &str = "v=0\r\no=- fake offer";
pub(crate) const FAKE_ANSWER: &str = "v=0\r\no=- fake answer";

#[derive(Default)]
pub(crate) struct FakeTrack {
    enabled: AtomicBool,
    stopped: AtomicBool,
}

impl FakeTrack {
    pub fn enabled() -> Arc<Self> {
        let track = Self::default();
        track.enabled.store(true, Ordering::SeqCst);
        Arc::new(track)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl AudioTrack for FakeTrack {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct FakeChannel {
    open: AtomicBool,
    closed: AtomicBool,
    sent: Mutex<Vec<String>>,
}

impl FakeChannel {
    pub fn sent(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    pub fn sent_types(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|v| v["type"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl DataChannel for FakeChannel {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.is_closed()
    }

    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::new("channel closed"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

pub(crate) struct FakePeer {
    events: TransportEventSender,
    pub microphone: Arc<FakeTrack>,
    pub channel: Arc<FakeChannel>,
    answer: Mutex<Option<String>>,
    closed: AtomicBool,
    stall_offer: Option<Arc<Notify>>,
}

impl FakePeer {
    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    pub fn open_channel(&self) {
        self.channel.open.store(true, Ordering::SeqCst);
        self.emit(TransportEvent::ChannelOpen);
    }

    pub fn receive(&self, value: Value) {
        self.emit(TransportEvent::ChannelMessage(ChannelFrame::Text(value.to_string())));
    }

    pub fn receive_raw(&self, frame: ChannelFrame) {
        self.emit(TransportEvent::ChannelMessage(frame));
    }

    /// Hands the client a remote audio track and returns it.
    pub fn attach_speaker(&self) -> Arc<FakeTrack> {
        let track = FakeTrack::enabled();
        let remote: Arc<dyn AudioTrack> = track.clone();
        self.emit(TransportEvent::RemoteAudioTrack(remote));
        track
    }

    pub fn answer(&self) -> Option<String> {
        self.answer.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerConnection for FakePeer {
    fn add_microphone_track(&self) -> Result<Arc<dyn AudioTrack>, TransportError> {
        let track: Arc<dyn AudioTrack> = self.microphone.clone();
        Ok(track)
    }

    fn create_data_channel(&self, _label: &str) -> Result<Arc<dyn DataChannel>, TransportError> {
        let channel: Arc<dyn DataChannel> = self.channel.clone();
        Ok(channel)
    }

    async fn create_offer(&self) -> Result<String, TransportError> {
        if let Some(reached) = &self.stall_offer {
            reached.notify_one();
            std::future::pending::<()>().await;
        }
        Ok(FAKE_OFFER.to_string())
    }

    async fn set_remote_answer(&self, sdp: &str) -> Result<(), TransportError> {
        *self.answer.lock().unwrap() = Some(sdp.to_string());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

type CreateHook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub(crate) struct FakeTransport {
    peers: Mutex<Vec<Arc<FakePeer>>>,
    stall: Option<(Stall, Arc<Notify>)>,
    on_create: Mutex<Option<CreateHook>>,
}

impl FakeTransport {
    /// Parks at `stall` (peer creation or offer) and signals `reached` when it gets there.
    pub fn stalling(stall: Stall, reached: Arc<Notify>) -> Self {
        Self {
            stall: Some((stall, reached)),
            ..Self::default()
        }
    }

    /// Runs `hook` once, after the next peer is built and before it is handed back.
    pub fn on_create(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_create.lock().unwrap() = Some(Box::new(hook));
    }

    fn stall_at(&self, step: Stall) -> Option<Arc<Notify>> {
        match &self.stall {
            Some((stall, reached)) if *stall == step => Some(reached.clone()),
            _ => None,
        }
    }

    pub fn last_peer(&self) -> Arc<FakePeer> {
        self.peers.lock().unwrap().last().cloned().expect("no peer connection was created")
    }

    pub fn peer_count(&self) -> usize {
        self.peers.lock().unwrap().len()
    }

    pub fn open_peers(&self) -> usize {
        self.peers.lock().unwrap().iter().filter(|p| !p.is_closed()).count()
    }
}

#[async_trait]
impl PeerTransport for FakeTransport {
    async fn create_peer_connection(&self, events: TransportEventSender) -> Result<Arc<dyn PeerConnection>, TransportError> {
        if let Some(reached) = self.stall_at(Stall::PeerConnection) {
            reached.notify_one();
            std::future::pending::<()>().await;
        }
        let peer = Arc::new(FakePeer {
            events,
            microphone: Arc::new(FakeTrack::default()),
            channel: Arc::new(FakeChannel::default()),
            answer: Mutex::new(None),
            closed: AtomicBool::new(false),
            stall_offer: self.stall_at(Stall::Offer),
        });
        self.peers.lock().unwrap().push(peer.clone());
        let hook = self.on_create.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        let peer: Arc<dyn PeerConnection> = peer;
        Ok(peer)
    }
}

/// Records callbacks as short strings, e.g. `connected` or `event:session.created`.
#[derive(Default)]
pub(crate) struct RecordingListener {
    log: Mutex<Vec<String>>,
    events: Mutex<Vec<ServerEvent>>,
    veto: AtomicBool,
}

impl RecordingListener {
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log().iter().filter(|e| *e == entry).count()
    }

    pub fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn saw(&self, event_type: &str) -> bool {
        self.events().iter().any(|e| e.event_type() == event_type)
    }

    pub fn veto_frames(&self, veto: bool) {
        self.veto.store(veto, Ordering::SeqCst);
    }

    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl SessionListener for RecordingListener {
    fn on_connecting(&self) {
        self.push("connecting".to_string());
    }

    fn on_connected(&self) {
        self.push("connected".to_string());
    }

    fn on_disconnected(&self, error: Option<&SessionError>) {
        match error {
            Some(_) => self.push("disconnected:error".to_string()),
            None => self.push("disconnected".to_string()),
        }
    }

    fn on_error(&self, error: &SessionError) {
        self.push(format!("error:{:?}", error.kind()));
    }

    fn on_session_expired(&self, error: &SessionError) {
        self.push(format!("expired:{:?}:{}", error.kind(), error.is_retryable()));
    }

    fn on_server_event(&self, event: &ServerEvent) {
        self.push(format!("event:{}", event.event_type()));
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_raw_frame(&self, _frame: &ChannelFrame) -> bool {
        self.veto.load(Ordering::SeqCst)
    }
}

pub(crate) fn ready_signaling() -> MockSignaling {
    let mut signaling = MockSignaling::new();
    signaling
        .expect_fetch_token()
        .returning(|_| Ok(EphemeralToken::new("ek_test", Some(1_734_626_723))));
    signaling
        .expect_negotiate()
        .returning(|_, _, _| Ok(FAKE_ANSWER.to_string()));
    signaling
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stall {
    Token,
    PeerConnection,
    Offer,
    Answer,
}

/// Parks forever at one signaling step, announcing when it got there.
pub(crate) struct StalledSignaling {
    pub stall: Stall,
    pub reached: Arc<Notify>,
}

#[async_trait]
impl Signaling for StalledSignaling {
    async fn fetch_token(&self, _session: &SessionConfig) -> Result<EphemeralToken, SessionError> {
        if self.stall == Stall::Token {
            self.reached.notify_one();
            std::future::pending::<()>().await;
        }
        Ok(EphemeralToken::new("ek_test", None))
    }

    async fn negotiate(&self, _token: &EphemeralToken, _model: &str, _offer_sdp: &str) -> Result<String, SessionError> {
        if self.stall == Stall::Answer {
            self.reached.notify_one();
            std::future::pending::<()>().await;
        }
        Ok(FAKE_ANSWER.to_string())
    }
}

/// Lets spawned tasks drain their queues.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub(crate) fn session_created(session: &SessionConfig) -> Value {
    json!({
        "type": "session.created",
        "event_id": "event_srv_created",
        "session": {
            "id": "sess_001",
            "object": "realtime.session",
            "expires_at": 1_734_628_523,
            "model": session.model(),
            "voice": session.voice().as_str(),
        }
    })
}

pub(crate) fn response_created(id: &str) -> Value {
    json!({
        "type": "response.created",
        "event_id": "event_srv_resp_created",
        "response": {"id": id, "object": "realtime.response", "status": "in_progress", "output": []}
    })
}

pub(crate) fn response_done(id: &str) -> Value {
    json!({
        "type": "response.done",
        "event_id": "event_srv_resp_done",
        "response": {
            "id": id,
            "object": "realtime.response",
            "status": "completed",
            "output": [],
            "usage": {"total_tokens": 30, "input_tokens": 12, "output_tokens": 18}
        }
    })
}

pub(crate) fn response_cancelled(id: &str) -> Value {
    json!({
        "type": "response.done",
        "event_id": "event_srv_resp_cancelled",
        "response": {
            "id": id,
            "object": "realtime.response",
            "status": "cancelled",
            "status_details": {"type": "cancelled", "reason": "client_cancelled"},
            "output": []
        }
    })
}

pub(crate) fn output_started(response_id: &str) -> Value {
    json!({"type": "output_audio_buffer.started", "event_id": "event_srv_started", "response_id": response_id})
}

pub(crate) fn output_stopped(response_id: &str) -> Value {
    json!({"type": "output_audio_buffer.stopped", "event_id": "event_srv_stopped", "response_id": response_id})
}

pub(crate) fn server_error(code: &str) -> Value {
    json!({
        "type": "error",
        "event_id": "event_srv_error",
        "error": {"type": "invalid_request_error", "code": code, "message": "request failed"}
    })
}
