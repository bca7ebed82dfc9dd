//! Telemetry Hub: SSE fan-out, monotonic per-stream ids, bounded replay
//! buffer, jittered heartbeats (spec §4.5).
//!
//! A "stream" is the unit that owns a monotonic id sequence and a replay
//! buffer: the unfiltered `GET /telemetry` subscription is one stream; each
//! `GET /telemetry?radio=<id>` subscription filter is its own independent
//! stream, so that "no gaps within one subscriber's session" (spec §8,
//! invariant 5) holds even though a filtered subscriber only ever sees a
//! subset of published events.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time::Instant;

use crate::model::{TelemetryEvent, TelemetryPayload};

const RING_CAPACITY: usize = 50;
const RETENTION: Duration = Duration::from_secs(3600);

/// Key identifying a stream: `None` is the unfiltered "all radios" stream.
type StreamKey = Option<String>;

#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    pub base: Duration,
    pub jitter: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(15),
            jitter: Duration::from_secs(2),
        }
    }
}

struct BufferedEvent {
    event: TelemetryEvent,
    stored_at: Instant,
}

struct StreamState {
    next_id: AtomicU64,
    buffer: Mutex<VecDeque<BufferedEvent>>,
    subscribers: Mutex<Vec<mpsc::Sender<TelemetryEvent>>>,
    last_activity: Mutex<Instant>,
}

impl StreamState {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            buffer: Mutex::new(VecDeque::with_capacity(RING_CAPACITY)),
            subscribers: Mutex::new(Vec::new()),
            last_activity: Mutex::new(Instant::now()),
        }
    }
}

pub struct Subscription {
    pub rx: mpsc::Receiver<TelemetryEvent>,
}

pub struct TelemetryHub {
    streams: RwLock<HashMap<StreamKey, Arc<StreamState>>>,
    queue_capacity: usize,
    heartbeat: HeartbeatConfig,
}

impl TelemetryHub {
    pub fn new(heartbeat: HeartbeatConfig) -> Arc<Self> {
        Arc::new(Self {
            streams: RwLock::new(HashMap::new()),
            queue_capacity: 64,
            heartbeat,
        })
    }

    async fn stream_for(&self, key: &StreamKey) -> Arc<StreamState> {
        if let Some(s) = self.streams.read().await.get(key) {
            return s.clone();
        }
        let mut streams = self.streams.write().await;
        streams
            .entry(key.clone())
            .or_insert_with(|| Arc::new(StreamState::new()))
            .clone()
    }

    /// Publish `payload` to the unfiltered stream, and additionally to the
    /// per-radio stream when the payload carries a `radioId`.
    pub async fn publish(self: &Arc<Self>, payload: TelemetryPayload) {
        let radio_id = radio_id_of(&payload);
        self.publish_to(&None, payload.clone()).await;
        if let Some(id) = radio_id {
            self.publish_to(&Some(id), payload).await;
        }
    }

    async fn publish_to(self: &Arc<Self>, key: &StreamKey, payload: TelemetryPayload) {
        let stream = self.stream_for(key).await;
        let id = stream.next_id.fetch_add(1, Ordering::SeqCst);
        let event = TelemetryEvent { id, payload };

        {
            let mut buf = stream.buffer.lock().await;
            buf.push_back(BufferedEvent {
                event: event.clone(),
                stored_at: Instant::now(),
            });
            evict(&mut buf);
        }
        *stream.last_activity.lock().await = Instant::now();

        let mut subs = stream.subscribers.lock().await;
        subs.retain(|tx| tx.try_send(event.clone()).is_ok());
    }

    /// Subscribe to `radio_filter` (`None` = all radios). Delivers a
    /// `Ready` snapshot first, replays events with `id > last_event_id` when
    /// given, then streams live. Spawns the per-subscriber heartbeat timer.
    pub async fn subscribe(
        self: &Arc<Self>,
        radio_filter: Option<String>,
        last_event_id: Option<u64>,
        snapshot: serde_json::Value,
    ) -> Subscription {
        let key = radio_filter.clone();
        let stream = self.stream_for(&key).await;
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        // Ready consumes the next id in the stream's own sequence, so ids
        // stay strictly increasing from 1 across Ready/replay/live events.
        let ready_id = stream.next_id.fetch_add(1, Ordering::SeqCst);
        let _ = tx.try_send(TelemetryEvent {
            id: ready_id,
            payload: TelemetryPayload::Ready { snapshot },
        });

        if let Some(since) = last_event_id {
            let buf = stream.buffer.lock().await;
            let stale = buf.front().is_some_and(|oldest| since < oldest.event.id);
            if !stale {
                for buffered in buf.iter() {
                    if buffered.event.id > since {
                        let _ = tx.try_send(buffered.event.clone());
                    }
                }
            }
        }

        stream.subscribers.lock().await.push(tx.clone());
        self.spawn_heartbeat(stream.clone(), tx);

        Subscription { rx }
    }

    fn spawn_heartbeat(self: &Arc<Self>, stream: Arc<StreamState>, tx: mpsc::Sender<TelemetryEvent>) {
        let heartbeat = self.heartbeat;
        let hub = self.clone();
        tokio::spawn(async move {
            loop {
                let jittered = jittered_interval(heartbeat);
                tokio::time::sleep(jittered).await;
                if tx.is_closed() {
                    return;
                }
                let idle = stream.last_activity.lock().await.elapsed();
                if idle >= jittered {
                    hub.emit_heartbeat(&stream).await;
                }
            }
        });
    }

    async fn emit_heartbeat(self: &Arc<Self>, stream: &Arc<StreamState>) {
        let id = stream.next_id.fetch_add(1, Ordering::SeqCst);
        let event = TelemetryEvent {
            id,
            payload: TelemetryPayload::Heartbeat { ts: chrono::Utc::now() },
        };
        {
            let mut buf = stream.buffer.lock().await;
            buf.push_back(BufferedEvent {
                event: event.clone(),
                stored_at: Instant::now(),
            });
            evict(&mut buf);
        }
        *stream.last_activity.lock().await = Instant::now();
        let mut subs = stream.subscribers.lock().await;
        subs.retain(|tx| tx.try_send(event.clone()).is_ok());
    }
}

fn radio_id_of(payload: &TelemetryPayload) -> Option<&str> {
    match payload {
        TelemetryPayload::PowerChanged { radio_id, .. } => Some(radio_id),
        TelemetryPayload::ChannelChanged { radio_id, .. } => Some(radio_id),
        TelemetryPayload::Fault { radio_id, .. } => Some(radio_id),
        TelemetryPayload::Ready { .. } | TelemetryPayload::Heartbeat { .. } => None,
    }
}

fn evict(buf: &mut VecDeque<BufferedEvent>) {
    while buf.len() > RING_CAPACITY {
        buf.pop_front();
    }
    let cutoff = Instant::now().checked_sub(RETENTION);
    if let Some(cutoff) = cutoff {
        while let Some(front) = buf.front() {
            if front.stored_at < cutoff {
                buf.pop_front();
            } else {
                break;
            }
        }
    }
}

fn jittered_interval(cfg: HeartbeatConfig) -> Duration {
    let jitter_ms = cfg.jitter.as_millis() as i64;
    let offset = if jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(-jitter_ms..=jitter_ms)
    };
    let base_ms = cfg.base.as_millis() as i64;
    Duration::from_millis((base_ms + offset).max(0) as u64)
}
