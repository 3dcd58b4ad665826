use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::client::cancellation::ResponseCancellation;
use crate::client::consts::COMMAND_CHANNEL_LABEL;
use crate::client::listener::ListenerRegistry;
use crate::client::router::Route;
use crate::client::state::AudioGate;
use crate::client::transport::TransportEventReceiver;
use crate::error::SessionError;
use crate::types::audio::Base64EncodedAudioBytes;
use crate::types::events::server::SessionResource;
use crate::types::{ClientEvent, Item, ServerEvent, SessionConfig};

mod cancellation;
mod commands;
mod config;
mod consts;
mod credentials;
mod listener;
mod router;
mod signaling;
mod state;
mod stats;
#[cfg(test)]
mod testing;
mod transport;
mod utils;

pub use cancellation::CancellationState;
pub use config::{Config, ConfigBuilder};
pub use credentials::EphemeralToken;
pub use listener::{ListenerId, SessionListener};
pub use router::decode_frame;
pub use signaling::{HttpSignaling, Signaling};
pub use state::ConnectionState;
pub use stats::Stats;
pub use transport::{
    AudioTrack, ChannelFrame, DataChannel, PeerConnection, PeerState, PeerTransport, TransportEvent,
    TransportEventSender,
};

type ServerTx = broadcast::Sender<ServerEvent>;
pub type ServerRx = broadcast::Receiver<ServerEvent>;

/// Transport primitives owned by the current session.
struct Live {
    peer: Arc<dyn PeerConnection>,
    microphone: Option<Arc<dyn AudioTrack>>,
    channel: Option<Arc<dyn DataChannel>>,
    speaker: Option<Arc<dyn AudioTrack>>,
}

impl Live {
    fn close(self) {
        if let Some(channel) = &self.channel {
            channel.close();
        }
        if let Some(microphone) = &self.microphone {
            microphone.set_enabled(false);
            microphone.stop();
        }
        self.peer.close();
    }
}

#[derive(Default)]
struct SessionState {
    connection: ConnectionState,
    /// Bumped by every `connect`. Callbacks and timers carry the value they
    /// were started with and do nothing once it is stale.
    attempt: u64,
    cancel: Option<CancellationToken>,
    live: Option<Live>,
    session: Option<SessionConfig>,
    active: Option<SessionResource>,
    audio: AudioGate,
    cancellation: ResponseCancellation,
}

impl SessionState {
    fn is_current(&self, attempt: u64) -> bool {
        self.attempt == attempt && self.connection.is_connecting_or_connected()
    }

    fn channel(&self) -> Option<Arc<dyn DataChannel>> {
        self.live.as_ref().and_then(|live| live.channel.clone())
    }

    fn apply_microphone(&self) {
        if let Some(microphone) = self.live.as_ref().and_then(|live| live.microphone.as_ref()) {
            microphone.set_enabled(self.audio.microphone);
        }
    }

    fn apply_output(&self) {
        if let Some(speaker) = self.live.as_ref().and_then(|live| live.speaker.as_ref()) {
            speaker.set_enabled(self.audio.output_enabled());
        }
    }
}

struct Inner {
    config: Config,
    signaling: Arc<dyn Signaling>,
    transport: Arc<dyn PeerTransport>,
    listeners: ListenerRegistry,
    s_tx: ServerTx,
    state: Mutex<SessionState>,
    stats: Mutex<Stats>,
    span: tracing::Span,
}

/// A handle to one realtime voice session. Clones share the session.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    pub fn new(config: Config, transport: Arc<dyn PeerTransport>) -> Self {
        let signaling = Arc::new(HttpSignaling::new(config.base_url(), config.api_key()));
        Self::with_signaling(config, signaling, transport)
    }

    pub fn with_signaling(config: Config, signaling: Arc<dyn Signaling>, transport: Arc<dyn PeerTransport>) -> Self {
        let (s_tx, _) = broadcast::channel(config.event_capacity());
        let span = tracing::info_span!("realtime_session", model = %config.session().model());
        Self {
            inner: Arc::new(Inner {
                config,
                signaling,
                transport,
                listeners: ListenerRegistry::default(),
                s_tx,
                state: Mutex::new(SessionState::default()),
                stats: Mutex::new(Stats::new()),
                span,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn add_listener(&self, listener: Arc<dyn SessionListener>) -> ListenerId {
        self.inner.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Every server event forwarded to listeners is also published here.
    pub fn server_events(&self) -> ServerRx {
        self.inner.s_tx.subscribe()
    }

    pub fn stats(&self) -> Stats {
        self.inner.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.lock_state().connection
    }

    /// True only after the server sent `session.created`.
    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    pub fn is_connecting_or_connected(&self) -> bool {
        self.connection_state().is_connecting_or_connected()
    }

    pub fn has_transport(&self) -> bool {
        self.inner.lock_state().live.is_some()
    }

    /// The session as last reported by `session.created` or `session.updated`.
    pub fn active_session(&self) -> Option<SessionResource> {
        self.inner.lock_state().active.clone()
    }

    pub fn cancellation_state(&self) -> CancellationState {
        self.inner.lock_state().cancellation.state()
    }

    pub fn is_microphone_enabled(&self) -> bool {
        self.inner.lock_state().audio.microphone
    }

    /// Whether model audio is audible: the speaker is on and no cancellation holds it muted.
    pub fn is_output_enabled(&self) -> bool {
        self.inner.lock_state().audio.output_enabled()
    }

    /// Runs the handshake and returns the ephemeral token it used. The session
    /// is `Connecting` until the server confirms it with `session.created`.
    pub async fn connect(&self) -> Result<EphemeralToken, SessionError> {
        let (attempt, cancel) = self.inner.begin_connect()?;
        self.inner.listeners.notify(|l| l.on_connecting());

        let span = self.inner.span.clone();
        match self.inner.handshake(attempt, &cancel).instrument(span).await {
            Ok(token) => {
                tracing::info!(parent: &self.inner.span, "sdp exchange complete");
                Ok(token)
            }
            Err(SessionError::Cancelled) => {
                tracing::info!(parent: &self.inner.span, "connect abandoned");
                Err(SessionError::Cancelled)
            }
            Err(err) => {
                self.inner.teardown(Some(attempt), Some(err.clone()));
                Err(err)
            }
        }
    }

    /// Tears the session down. Returns false if there was nothing to tear down.
    pub fn disconnect(&self) -> bool {
        self.inner.teardown(None, None)
    }

    pub fn set_microphone_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        let mut state = self.inner.lock_state();
        if state.live.is_none() {
            return Err(SessionError::NotConnected);
        }
        state.audio.microphone = enabled;
        state.apply_microphone();
        Ok(())
    }

    pub fn set_speaker_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        let mut state = self.inner.lock_state();
        if state.live.is_none() {
            return Err(SessionError::NotConnected);
        }
        state.audio.speaker = enabled;
        state.apply_output();
        Ok(())
    }

    pub fn push_to_talk_pressed(&self) -> Result<(), SessionError> {
        self.set_microphone_enabled(true)
    }

    /// Stops capturing, commits the buffered input and asks for a response.
    pub fn push_to_talk_released(&self) -> Result<(), SessionError> {
        self.set_microphone_enabled(false)?;
        self.inner.send(commands::input_audio_commit())?;
        self.inner.send(commands::response_create())?;
        if self.inner.config.push_to_talk() {
            self.set_speaker_enabled(true)?;
        }
        Ok(())
    }

    /// Patches the live session. Model and voice are fixed for the lifetime
    /// of a session.
    pub fn update_session(&self, session: SessionConfig) -> Result<String, SessionError> {
        if let Some(current) = &self.inner.lock_state().session {
            if current.model() != session.model() {
                return Err(SessionError::RequiresReconnect("model"));
            }
            if current.voice() != session.voice() {
                return Err(SessionError::RequiresReconnect("voice"));
            }
        }
        let event_id = self.inner.send(commands::session_update(session.clone()))?;
        self.inner.lock_state().session = Some(session);
        Ok(event_id)
    }

    pub fn append_input_audio_buffer(&self, audio: Base64EncodedAudioBytes) -> Result<String, SessionError> {
        self.inner.send(commands::input_audio_append(audio))
    }

    pub fn commit_input_audio_buffer(&self) -> Result<String, SessionError> {
        self.inner.send(commands::input_audio_commit())
    }

    pub fn clear_input_audio_buffer(&self) -> Result<String, SessionError> {
        self.inner.send(commands::input_audio_clear())
    }

    pub fn create_response(&self) -> Result<String, SessionError> {
        self.inner.send(commands::response_create())
    }

    /// Interrupts the response in flight. Output is muted before the command
    /// leaves and stays muted until the server reports the output buffer
    /// stopped and the drain delay has passed. Returns false when there is
    /// nothing to cancel.
    pub fn cancel_response(&self, response_id: Option<&str>) -> Result<bool, SessionError> {
        let _enter = self.inner.span.enter();
        let mut state = self.inner.lock_state();
        if state.connection != ConnectionState::Connected {
            return Ok(false);
        }
        let Some(target) = state.cancellation.target(response_id) else {
            return Ok(false);
        };
        let channel = state.channel().ok_or(SessionError::ChannelNotOpen)?;

        // Mute, send and Cancelling happen under one lock.
        state.audio.muted_for_cancel = true;
        state.apply_output();
        if let Err(e) = send_on(channel.as_ref(), &commands::response_cancel(target.as_deref())) {
            state.audio.muted_for_cancel = false;
            state.apply_output();
            return Err(e);
        }
        state.cancellation.begin();
        tracing::info!(response_id = target.as_deref().unwrap_or("-"), "cancelling response");
        Ok(true)
    }

    pub fn truncate_item(&self, item_id: &str, audio_end_ms: u32) -> Result<String, SessionError> {
        self.inner.send(commands::item_truncate(item_id, audio_end_ms))
    }

    pub fn create_user_message(&self, text: &str) -> Result<String, SessionError> {
        self.create_conversation_item(Item::user_text(text))
    }

    pub fn create_function_call_output(&self, call_id: &str, output: &str) -> Result<String, SessionError> {
        self.create_conversation_item(Item::function_call_output(call_id, output))
    }

    pub fn create_conversation_item(&self, item: Item) -> Result<String, SessionError> {
        self.inner.send(commands::item_create(item))
    }

    pub fn delete_item(&self, item_id: &str) -> Result<String, SessionError> {
        self.inner.send(commands::item_delete(item_id))
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_connect(&self) -> Result<(u64, CancellationToken), SessionError> {
        let mut state = self.lock_state();
        match state.connection {
            ConnectionState::Connecting | ConnectionState::Connected => return Err(SessionError::AlreadyConnected),
            ConnectionState::Disconnecting => return Err(SessionError::InvalidState(ConnectionState::Disconnecting)),
            ConnectionState::Disconnected => {}
        }
        let cancel = CancellationToken::new();
        state.attempt += 1;
        state.connection = ConnectionState::Connecting;
        state.cancel = Some(cancel.clone());
        state.session = Some(self.config.session().clone());
        Ok((state.attempt, cancel))
    }

    async fn handshake(self: &Arc<Self>, attempt: u64, cancel: &CancellationToken) -> Result<EphemeralToken, SessionError> {
        let session = self.config.session();

        let token = until_cancelled(cancel, self.signaling.fetch_token(session)).await??;
        self.ensure_current(attempt, cancel)?;
        tracing::debug!(expires_at = ?token.expires_at(), "ephemeral token issued");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let peer = until_cancelled(cancel, self.transport.create_peer_connection(events_tx)).await??;
        self.adopt_peer(attempt, cancel, peer.clone(), events_rx)?;

        let microphone = peer.add_microphone_track()?;
        microphone.set_enabled(false);
        self.attach(attempt, cancel, |live| live.microphone = Some(microphone.clone()))
            .inspect_err(|_| microphone.stop())?;

        let channel = peer.create_data_channel(COMMAND_CHANNEL_LABEL)?;
        self.attach(attempt, cancel, |live| live.channel = Some(channel.clone()))
            .inspect_err(|_| channel.close())?;

        let offer = until_cancelled(cancel, peer.create_offer()).await??;
        self.ensure_current(attempt, cancel)?;
        let answer = until_cancelled(cancel, self.signaling.negotiate(&token, session.model(), &offer)).await??;
        self.ensure_current(attempt, cancel)?;
        until_cancelled(cancel, peer.set_remote_answer(&answer)).await??;
        self.ensure_current(attempt, cancel)?;
        Ok(token)
    }

    fn ensure_current(&self, attempt: u64, cancel: &CancellationToken) -> Result<(), SessionError> {
        if cancel.is_cancelled() || !self.lock_state().is_current(attempt) {
            return Err(SessionError::Cancelled);
        }
        Ok(())
    }

    fn adopt_peer(
        self: &Arc<Self>,
        attempt: u64,
        cancel: &CancellationToken,
        peer: Arc<dyn PeerConnection>,
        events: TransportEventReceiver,
    ) -> Result<(), SessionError> {
        {
            let mut state = self.lock_state();
            if cancel.is_cancelled() || !state.is_current(attempt) {
                drop(state);
                peer.close();
                return Err(SessionError::Cancelled);
            }
            state.live = Some(Live {
                peer,
                microphone: None,
                channel: None,
                speaker: None,
            });
        }
        let inner = self.clone();
        let cancel = cancel.clone();
        tokio::spawn(inner.pump(attempt, cancel, events).instrument(self.span.clone()));
        Ok(())
    }

    fn attach(&self, attempt: u64, cancel: &CancellationToken, f: impl FnOnce(&mut Live)) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        if cancel.is_cancelled() || !state.is_current(attempt) {
            return Err(SessionError::Cancelled);
        }
        match state.live.as_mut() {
            Some(live) => {
                f(live);
                Ok(())
            }
            None => Err(SessionError::Cancelled),
        }
    }

    async fn pump(self: Arc<Self>, attempt: u64, cancel: CancellationToken, mut events: TransportEventReceiver) {
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            match event {
                TransportEvent::ChannelOpen => self.on_channel_open(attempt),
                TransportEvent::ChannelMessage(frame) => self.on_frame(attempt, frame),
                TransportEvent::ChannelClosed => self.on_transport_lost(attempt, "command channel closed".to_string()),
                TransportEvent::PeerStateChanged(state) if state.is_terminal() => {
                    self.on_transport_lost(attempt, format!("peer connection {:?}", state))
                }
                TransportEvent::PeerStateChanged(state) => tracing::debug!(?state, "peer connection state changed"),
                TransportEvent::RemoteAudioTrack(track) => self.on_remote_track(attempt, track),
            }
        }
        tracing::debug!("transport event loop finished");
    }

    fn on_channel_open(&self, attempt: u64) {
        let session = {
            let state = self.lock_state();
            if !state.is_current(attempt) {
                return;
            }
            state.session.clone()
        };
        tracing::info!("command channel open");
        if let Some(session) = session {
            if let Err(e) = self.send(commands::session_update(session)) {
                tracing::warn!("failed to send initial session.update: {}", e);
            }
        }
    }

    fn on_remote_track(&self, attempt: u64, track: Arc<dyn AudioTrack>) {
        let mut state = self.lock_state();
        if !state.is_current(attempt) {
            return;
        }
        if let Some(live) = state.live.as_mut() {
            live.speaker = Some(track);
        }
        state.apply_output();
        tracing::debug!("remote audio track attached");
    }

    fn on_transport_lost(&self, attempt: u64, detail: String) {
        self.teardown(Some(attempt), Some(SessionError::Transport(detail)));
    }

    fn on_frame(self: &Arc<Self>, attempt: u64, frame: ChannelFrame) {
        if !self.lock_state().is_current(attempt) {
            return;
        }
        if self.config.log().log_frames {
            tracing::trace!(?frame, "inbound frame");
        }
        if self.listeners.snapshot().iter().any(|l| l.on_raw_frame(&frame)) {
            tracing::trace!("frame consumed by listener");
            return;
        }

        let event = match router::decode_frame(&frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("dropping inbound frame: {}", e);
                return;
            }
        };
        tracing::debug!(event_type = event.event_type(), event_id = event.event_id(), "received server event");

        let settled = {
            let mut state = self.lock_state();
            if !state.is_current(attempt) {
                return;
            }
            state.cancellation.observe(&event);
            if let ServerEvent::SessionUpdated(e) = &event {
                state.active = Some(e.session().clone());
            }
            matches!(event, ServerEvent::ResponseDone(_)) && state.cancellation.confirm_done()
        };
        self.record_usage(&event);
        if settled {
            self.drain(attempt, event);
            return;
        }

        match router::route(&event) {
            Route::Ready => self.on_ready(attempt, &event),
            Route::SessionExpired(details) => {
                tracing::warn!("session expired: {}", details);
                let err = SessionError::SessionExpired(details.clone());
                self.listeners.notify(|l| l.on_session_expired(&err));
                self.forward(&event);
            }
            Route::ServerError(details) => {
                tracing::error!("server reported an error: {}", details);
                let err = SessionError::Protocol(details.clone());
                self.listeners.notify(|l| l.on_error(&err));
                self.forward(&event);
            }
            Route::OutputStopped => self.on_output_stopped(attempt, event.clone()),
            Route::Forward => self.forward(&event),
        }
    }

    fn on_ready(&self, attempt: u64, event: &ServerEvent) {
        let became_ready = {
            let mut state = self.lock_state();
            if !state.is_current(attempt) {
                return;
            }
            if let ServerEvent::SessionCreated(e) = event {
                state.active = Some(e.session().clone());
            }
            if state.connection == ConnectionState::Connecting {
                state.connection = ConnectionState::Connected;
                let push_to_talk = self.config.push_to_talk();
                state.audio.microphone = !push_to_talk;
                state.audio.speaker = !push_to_talk;
                state.apply_microphone();
                state.apply_output();
                true
            } else {
                false
            }
        };
        if became_ready {
            tracing::info!("session ready");
            self.listeners.notify(|l| l.on_connected());
        }
        self.forward(event);
    }

    fn on_output_stopped(self: &Arc<Self>, attempt: u64, event: ServerEvent) {
        let confirmed = {
            let mut state = self.lock_state();
            state.is_current(attempt) && state.cancellation.confirm_stopped()
        };
        if !confirmed {
            self.forward(&event);
            return;
        }
        self.drain(attempt, event);
    }

    /// Holds `event` back until the drain delay passes, then unmutes output
    /// and forwards it.
    fn drain(self: &Arc<Self>, attempt: u64, event: ServerEvent) {
        let delay = self.config.drain_delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "cancellation confirmed, draining output");
        let inner = self.clone();
        tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                inner.finish_drain(attempt, event);
            }
            .instrument(self.span.clone()),
        );
    }

    fn finish_drain(&self, attempt: u64, event: ServerEvent) {
        {
            let mut state = self.lock_state();
            if !state.is_current(attempt) {
                tracing::debug!("session ended while draining output");
                return;
            }
            // A newer cancellation keeps the output muted.
            if state.cancellation.state() == CancellationState::Idle {
                state.audio.muted_for_cancel = false;
                state.apply_output();
            }
        }
        self.forward(&event);
    }

    fn record_usage(&self, event: &ServerEvent) {
        if let ServerEvent::ResponseDone(response) = event {
            if let Some(usage) = response.response().usage() {
                let total_tokens = usage.total_tokens();
                let input_tokens = usage.input_tokens();
                let output_tokens = usage.output_tokens();
                self.stats
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .update_usage(total_tokens, input_tokens, output_tokens);
                tracing::debug!(total_tokens, input_tokens, output_tokens, "response usage");
            }
        }
    }

    fn forward(&self, event: &ServerEvent) {
        self.listeners.notify(|l| l.on_server_event(event));
        if self.s_tx.receiver_count() > 0 {
            if let Err(e) = self.s_tx.send(event.clone()) {
                tracing::error!("failed to publish event: {}", e);
            }
        }
    }

    fn send(&self, event: ClientEvent) -> Result<String, SessionError> {
        let _enter = self.span.enter();
        let channel = self.lock_state().channel().ok_or(SessionError::ChannelNotOpen)?;
        send_on(channel.as_ref(), &event)
    }

    /// Ends the session owned by `attempt`, or whichever session is live when
    /// `attempt` is `None`. Listeners hear about it exactly once.
    fn teardown(&self, attempt: Option<u64>, error: Option<SessionError>) -> bool {
        let _enter = self.span.enter();
        let (live, cancel) = {
            let mut state = self.lock_state();
            if !state.connection.is_connecting_or_connected() {
                return false;
            }
            if attempt.is_some_and(|attempt| attempt != state.attempt) {
                return false;
            }
            state.connection = ConnectionState::Disconnecting;
            state.session = None;
            state.active = None;
            state.audio = AudioGate::default();
            state.cancellation.reset();
            (state.live.take(), state.cancel.take())
        };

        if let Some(cancel) = cancel {
            cancel.cancel();
        }
        if let Some(live) = live {
            live.close();
        }
        self.lock_state().connection = ConnectionState::Disconnected;

        match &error {
            Some(err) => {
                tracing::warn!("session ended: {}", err);
                self.listeners.notify(|l| l.on_error(err));
            }
            None => tracing::info!("session closed"),
        }
        self.listeners.notify(|l| l.on_disconnected(error.as_ref()));
        true
    }
}

/// Builds a client from `config` and runs the handshake. The ephemeral token
/// is dropped once negotiation succeeds.
pub async fn connect(config: Config, transport: Arc<dyn PeerTransport>) -> Result<Client, SessionError> {
    let client = Client::new(config, transport);
    client.connect().await?;
    Ok(client)
}

fn send_on(channel: &dyn DataChannel, event: &ClientEvent) -> Result<String, SessionError> {
    if !channel.is_open() {
        return Err(SessionError::ChannelNotOpen);
    }
    let (event_id, text) = commands::encode(event)?;
    channel.send_text(&text)?;
    tracing::debug!(event_type = event.event_type(), event_id = %event_id, "sent client event");
    Ok(event_id)
}

/// Runs `step` unless `cancel` fires first.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, step: F) -> Result<F::Output, SessionError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SessionError::Cancelled),
        output = step => Ok(output),
    }
}
