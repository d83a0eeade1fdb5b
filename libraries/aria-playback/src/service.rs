//! Player service - core orchestration
//!
//! One spawned task owns the queue engine and the playback session and
//! serializes every state transition: transport commands, session load
//! results, completion polling, and the persistence and library-refresh
//! timers all funnel through a single `select!` loop, so no half-updated
//! (queue, cursor) state is ever observable. Background work (catalog
//! queries, snapshot writes) runs on spawned tasks and reports back in;
//! it never touches the engine directly.
//!
//! The timers are owned by the loop, so dropping out of it on any exit
//! path cancels them; nothing fires after teardown begins.

use crate::error::{PlaybackError, Result};
use crate::events::{EventBus, PlayerEvent, TrackChangeReason};
use crate::queue::QueueEngine;
use crate::session::{LoadOutcome, MediaBackend, PlaybackSession, SessionEvent, SessionState};
use crate::types::{PlaybackStatus, PlayerConfig, QueueTrack};
use aria_core::types::{PlayMode, TrackId};
use aria_library::TrackCache;
use aria_storage::PlayerStateStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Transport commands accepted by the service
///
/// Each maps 1:1 to a transport control on the session/notification
/// surface.
enum PlayerCommand {
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    SeekTo(u64),
    ToggleMode,
    ToggleFavorite,
    StartPlayback {
        tracks: Vec<QueueTrack>,
        start_index: usize,
    },
    PlayFromQueue(usize),
    RefreshLibrary,
    Query(oneshot::Sender<PlayerStatusView>),
    Shutdown(oneshot::Sender<()>),
}

/// Point-in-time view of the player, returned by [`PlayerHandle::query`]
///
/// Events are advisory; this is the authoritative state consumers
/// re-derive from after any notification.
#[derive(Debug, Clone)]
pub struct PlayerStatusView {
    /// The track under the cursor
    pub current_track: Option<QueueTrack>,

    /// Cursor position in the queue
    pub current_index: Option<usize>,

    /// The active play order
    pub queue: Vec<QueueTrack>,

    /// Active playback mode
    pub mode: PlayMode,

    /// Play/pause/load status
    pub status: PlaybackStatus,

    /// Position within the current track, milliseconds
    pub position_ms: u64,

    /// Duration of the current track, milliseconds
    pub duration_ms: u64,
}

/// Cloneable handle to a running player service
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    events: EventBus,
}

impl PlayerHandle {
    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Start or resume playback
    pub async fn play(&self) -> Result<()> {
        self.send(PlayerCommand::Play).await
    }

    /// Pause playback
    pub async fn pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause).await
    }

    /// Toggle between playing and paused
    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.send(PlayerCommand::TogglePlayPause).await
    }

    /// Advance to the next track per the active mode
    pub async fn next(&self) -> Result<()> {
        self.send(PlayerCommand::Next).await
    }

    /// Step back to the previous track per the active mode
    pub async fn previous(&self) -> Result<()> {
        self.send(PlayerCommand::Previous).await
    }

    /// Seek within the current track
    pub async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.send(PlayerCommand::SeekTo(position_ms)).await
    }

    /// Cycle the playback mode
    pub async fn toggle_mode(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleMode).await
    }

    /// Toggle the favorite flag on the current track
    pub async fn toggle_favorite(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleFavorite).await
    }

    /// Start playing an explicit track list from the given index
    pub async fn start_playback(&self, tracks: Vec<QueueTrack>, start_index: usize) -> Result<()> {
        self.send(PlayerCommand::StartPlayback {
            tracks,
            start_index,
        })
        .await
    }

    /// Jump to a position in the current queue
    pub async fn play_from_queue(&self, index: usize) -> Result<()> {
        self.send(PlayerCommand::PlayFromQueue(index)).await
    }

    /// Ask the library to refresh from the media catalog
    ///
    /// Used when the platform signals that device content changed; the
    /// refresh itself runs off the playback context.
    pub async fn refresh_library(&self) -> Result<()> {
        self.send(PlayerCommand::RefreshLibrary).await
    }

    /// Fetch the current player state
    pub async fn query(&self) -> Result<PlayerStatusView> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::Query(tx)).await?;
        rx.await.map_err(|_| PlaybackError::ServiceStopped)
    }

    /// Stop the service after a final persistence flush
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::Shutdown(tx)).await?;
        rx.await.map_err(|_| PlaybackError::ServiceStopped)
    }

    async fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::ServiceStopped)
    }
}

/// The playback execution context
pub struct PlayerService {
    engine: QueueEngine,
    session: PlaybackSession,
    cache: Arc<TrackCache>,
    store: PlayerStateStore,
    events: EventBus,
    config: PlayerConfig,

    /// Whether the in-flight load should start playing once prepared
    autoplay_on_ready: bool,

    /// Seek applied once the in-flight load is prepared (restore resume)
    pending_seek_ms: Option<u64>,

    /// Consecutive load failures in the current streak
    load_failures: usize,

    /// Streak bound, fixed to the queue length at the first failure
    failure_cap: usize,
}

impl PlayerService {
    /// Spawn the service and return a handle to it
    ///
    /// Restores persisted state (queue, cursor, mode, position) before
    /// processing any command, then kicks off the initial library load in
    /// the background.
    pub fn spawn(
        cache: Arc<TrackCache>,
        backend: Arc<dyn MediaBackend>,
        store: PlayerStateStore,
        config: PlayerConfig,
    ) -> PlayerHandle {
        let (commands_tx, commands_rx) = mpsc::channel(64);
        let (session_tx, session_rx) = mpsc::channel(16);
        let events = EventBus::default();

        let handle = PlayerHandle {
            commands: commands_tx,
            events: events.clone(),
        };

        let service = Self {
            engine: QueueEngine::new(),
            session: PlaybackSession::new(backend, session_tx),
            cache,
            store,
            events,
            config,
            autoplay_on_ready: true,
            pending_seek_ms: None,
            load_failures: 0,
            failure_cap: 0,
        };
        tokio::spawn(service.run(commands_rx, session_rx));

        handle
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<PlayerCommand>,
        mut session_events: mpsc::Receiver<SessionEvent>,
    ) {
        self.restore().await;

        // Warm the library cache without blocking the playback context
        {
            let cache = Arc::clone(&self.cache);
            tokio::spawn(async move {
                cache.load().await;
            });
        }

        let now = tokio::time::Instant::now();
        let mut poll = interval_at(now + self.config.poll_interval, self.config.poll_interval);
        let mut persist = interval_at(
            now + self.config.persist_interval,
            self.config.persist_interval,
        );
        let mut refresh = interval_at(
            now + self.config.library_refresh_interval,
            self.config.library_refresh_interval,
        );
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        persist.set_missed_tick_behavior(MissedTickBehavior::Skip);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_command = commands.recv() => match maybe_command {
                    Some(PlayerCommand::Shutdown(done)) => {
                        self.flush_snapshot().await;
                        let _ = done.send(());
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => {
                        // Every handle dropped: flush and stop
                        self.flush_snapshot().await;
                        break;
                    }
                },
                Some(event) = session_events.recv() => self.handle_session_event(event),
                _ = poll.tick() => self.handle_poll(),
                _ = persist.tick() => self.persist_snapshot(),
                _ = refresh.tick() => self.maybe_refresh_library(),
            }
        }

        info!("player service stopped");
    }

    // ===== Commands =====

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Play => self.resume_or_start(),
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::TogglePlayPause => {
                if self.session.state() == SessionState::Playing {
                    self.pause();
                } else {
                    self.resume_or_start();
                }
            }
            PlayerCommand::Next => {
                if let Some(track) = self.engine.next() {
                    self.play_engine_result(track, TrackChangeReason::Skipped);
                }
            }
            PlayerCommand::Previous => {
                if let Some(track) = self.engine.previous() {
                    self.play_engine_result(track, TrackChangeReason::Skipped);
                }
            }
            PlayerCommand::SeekTo(position_ms) => self.session.seek_ms(position_ms),
            PlayerCommand::ToggleMode => self.toggle_mode(),
            PlayerCommand::ToggleFavorite => self.toggle_favorite(),
            PlayerCommand::StartPlayback {
                tracks,
                start_index,
            } => {
                if let Some(track) = self.engine.start_playback(tracks, start_index) {
                    self.events.publish(PlayerEvent::QueueChanged {
                        length: self.engine.len(),
                    });
                    self.start_track(track, TrackChangeReason::Started);
                }
            }
            PlayerCommand::PlayFromQueue(index) => {
                if let Some(track) = self.engine.play_from_queue(index) {
                    self.start_track(track, TrackChangeReason::Started);
                }
            }
            PlayerCommand::RefreshLibrary => self.spawn_library_refresh(),
            PlayerCommand::Query(reply) => {
                let _ = reply.send(self.view());
            }
            PlayerCommand::Shutdown(_) => unreachable!("handled in run loop"),
        }
    }

    fn resume_or_start(&mut self) {
        if self.session.play() {
            self.emit_status();
            return;
        }

        match self.session.state() {
            SessionState::Completed => {
                if self.session.replay() {
                    self.emit_status();
                }
            }
            SessionState::Loading => {
                // Prepared track should start as soon as it lands
                self.autoplay_on_ready = true;
            }
            SessionState::Idle => {
                if let Some(track) = self.engine.current_track().cloned() {
                    self.start_track(track, TrackChangeReason::Started);
                }
            }
            _ => {}
        }
    }

    fn pause(&mut self) {
        if self.session.state() == SessionState::Loading {
            // Pausing mid-load means: finish preparing but don't start
            self.autoplay_on_ready = false;
            return;
        }
        if self.session.pause() {
            self.emit_status();
        }
    }

    fn toggle_mode(&mut self) {
        let mode = self.engine.toggle_mode();

        // Shuffle rebuilds can move the cursor; keep it anchored to the
        // track the session actually has loaded.
        let loaded = self.session.track().map(|t| t.id.clone());
        self.engine.verify_sync(loaded.as_ref());

        self.events.publish(PlayerEvent::ModeChanged { mode });
        self.events.publish(PlayerEvent::QueueChanged {
            length: self.engine.len(),
        });
        self.persist_snapshot();
    }

    fn toggle_favorite(&mut self) {
        let Some(track) = self.engine.current_track() else {
            return;
        };

        let id = track.id.clone();
        let cache = Arc::clone(&self.cache);
        let events = self.events.clone();
        let status = self.session.status();
        tokio::spawn(async move {
            if cache.toggle_favorite(&id).await.is_some() {
                // Nudge consumers to re-query; the flag lives on the track
                events.publish(PlayerEvent::PlaybackStateChanged { status });
            }
        });
    }

    // ===== Track transitions =====

    /// Begin playing a track the engine just selected
    ///
    /// When the engine re-selected the track the session already holds
    /// (repeat-one), replay in place instead of reloading.
    fn play_engine_result(&mut self, track: QueueTrack, reason: TrackChangeReason) {
        let already_loaded =
            self.session.is_ready() && self.session.track().map(|t| &t.id) == Some(&track.id);
        if already_loaded {
            self.session.replay();
            self.emit_status();
            self.persist_snapshot();
            return;
        }
        self.start_track(track, reason);
    }

    fn start_track(&mut self, track: QueueTrack, reason: TrackChangeReason) {
        self.autoplay_on_ready = true;
        self.pending_seek_ms = None;
        self.session.begin_load(track.clone());

        self.events.publish(PlayerEvent::TrackChanged {
            track_id: track.id,
            reason,
        });
        self.emit_status();

        // Snapshot on every track start
        self.persist_snapshot();
    }

    // ===== Session events =====

    fn handle_session_event(&mut self, event: SessionEvent) {
        match self.session.apply_load(event) {
            LoadOutcome::Stale => {}
            LoadOutcome::Ready { track_id } => {
                self.load_failures = 0;
                if let Some(position_ms) = self.pending_seek_ms.take() {
                    self.session.seek_ms(position_ms);
                }
                if self.autoplay_on_ready {
                    self.session.play();
                }
                self.engine.verify_sync(Some(&track_id));
                self.emit_status();
            }
            LoadOutcome::Failed { track_id, reason } => self.handle_load_failure(track_id, reason),
        }
    }

    /// Advance past a track the backend could not prepare
    ///
    /// Bounded: a streak of consecutive failures is capped at the queue
    /// length measured when the streak began, so an all-broken queue
    /// stops instead of looping forever.
    fn handle_load_failure(&mut self, track_id: TrackId, reason: String) {
        let error = PlaybackError::TrackLoadFailed { track_id, reason };
        warn!(%error, "advancing past unplayable track");

        if self.load_failures == 0 {
            self.failure_cap = self.engine.len().max(1);
        }
        self.load_failures += 1;

        if self.load_failures >= self.failure_cap {
            error!(
                failures = self.load_failures,
                "every queued track failed to load, stopping playback"
            );
            self.load_failures = 0;
            self.session.stop();
            self.emit_status();
            return;
        }

        if let Some(next) = self.engine.next() {
            self.start_track(next, TrackChangeReason::LoadFailed);
        } else {
            self.session.stop();
            self.emit_status();
        }
    }

    // ===== Ticks =====

    fn handle_poll(&mut self) {
        if let Some(track_id) = self.session.poll_completion() {
            self.handle_completed(&track_id);
        }
    }

    fn handle_completed(&mut self, track_id: &TrackId) {
        debug!(%track_id, "track completed");

        if self.engine.mode() == PlayMode::RepeatOne {
            // Replay in place; no queue dispatch, no reload
            self.session.replay();
            self.emit_status();
            return;
        }

        if let Some(next) = self.engine.next() {
            self.play_engine_result(next, TrackChangeReason::Completed);
        } else {
            self.session.stop();
            self.emit_status();
        }
    }

    fn maybe_refresh_library(&self) {
        if self.cache.is_stale(Instant::now()) {
            self.spawn_library_refresh();
        }
    }

    fn spawn_library_refresh(&self) {
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            if let Err(e) = cache.refresh().await {
                warn!(error = %e, "library refresh failed");
            }
        });
    }

    // ===== Persistence =====

    /// Snapshot current state and write it off the playback context
    fn persist_snapshot(&self) {
        let snapshot = self.engine.snapshot(self.session.position_ms());
        if snapshot.is_empty() {
            // Nothing queued this session; keep the previous snapshot
            return;
        }

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(snapshot).await {
                warn!(error = %e, "failed to save playback snapshot");
            }
        });
    }

    /// Final synchronous flush on shutdown
    async fn flush_snapshot(&mut self) {
        let snapshot = self.engine.snapshot(self.session.position_ms());
        if snapshot.is_empty() {
            return;
        }
        if let Err(e) = self.store.save(snapshot).await {
            warn!(error = %e, "failed to flush playback snapshot");
        }
    }

    async fn restore(&mut self) {
        let Some(snapshot) = self.store.load().await else {
            return;
        };
        if snapshot.is_empty() {
            return;
        }

        let cache = Arc::clone(&self.cache);
        self.engine = QueueEngine::restore(&snapshot, |id| {
            cache.get(id).map(|track| QueueTrack::from(&track))
        });
        if self.engine.is_empty() {
            return;
        }

        info!(
            queue_len = self.engine.len(),
            mode = %self.engine.mode(),
            "restored playback state"
        );
        self.events.publish(PlayerEvent::QueueChanged {
            length: self.engine.len(),
        });
        self.events.publish(PlayerEvent::ModeChanged {
            mode: self.engine.mode(),
        });

        if let Some(track) = self.engine.current_track().cloned() {
            // Reinstate the last track paused at its saved position
            self.autoplay_on_ready = false;
            self.pending_seek_ms = Some(snapshot.last_position_ms);
            self.session.begin_load(track.clone());
            self.events.publish(PlayerEvent::TrackChanged {
                track_id: track.id,
                reason: TrackChangeReason::Restored,
            });
            self.emit_status();
        }
    }

    // ===== Helpers =====

    fn emit_status(&self) {
        self.events.publish(PlayerEvent::PlaybackStateChanged {
            status: self.session.status(),
        });
    }

    fn view(&self) -> PlayerStatusView {
        PlayerStatusView {
            current_track: self.engine.current_track().cloned(),
            current_index: self.engine.current_index(),
            queue: self.engine.tracks().to_vec(),
            mode: self.engine.mode(),
            status: self.session.status(),
            position_ms: self.session.position_ms(),
            duration_ms: self.session.duration_ms(),
        }
    }
}
