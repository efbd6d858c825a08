//! Async driver for [`SessionRunner`].
//!
//! One background task owns the runner and reacts to three sources: the
//! tick interval, narration completions and control commands. Effects are
//! executed in the order the runner returned them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::clock::{Clock, TokioClock};
use super::runner::{Effect, RunnerOptions, SessionRunner, Utterance};
use crate::catalog::Catalog;
use crate::error::{CoreError, SessionError};
use crate::events::Event;
use crate::history::{HistoryStore, TrainingHistoryEntry};
use crate::narration::Narrator;
use crate::storage::Config;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

/// Settings for [`SessionService`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    pub runner: RunnerOptions,
    pub tick_interval: Duration,
    pub max_entries: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ServiceOptions {
    fn from(config: &Config) -> Self {
        Self {
            runner: RunnerOptions::from(config),
            tick_interval: Duration::from_millis(config.session.tick_interval_ms.max(1)),
            max_entries: config.history.max_entries,
        }
    }
}

enum Command {
    Start {
        script: Catalog,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Pause {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Resume {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Stop {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Event>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Background owner of the single session runner.
pub struct SessionService<N, H, C = TokioClock> {
    runner: SessionRunner,
    narrator: Arc<N>,
    history: H,
    clock: C,
    max_entries: usize,
    tick_interval: Duration,
    events: broadcast::Sender<Event>,
    finished: watch::Sender<Option<TrainingHistoryEntry>>,
    settled_tx: mpsc::UnboundedSender<u64>,
    settled_rx: mpsc::UnboundedReceiver<u64>,
    speaking: Option<JoinHandle<()>>,
}

impl<N: Narrator, H: HistoryStore + 'static> SessionService<N, H> {
    /// Spawn the service on the current tokio runtime.
    pub fn spawn(options: ServiceOptions, narrator: N, history: H) -> SessionHandle {
        Self::spawn_with_clock(options, narrator, history, TokioClock::new())
    }
}

impl<N: Narrator, H: HistoryStore + 'static, C: Clock> SessionService<N, H, C> {
    pub fn spawn_with_clock(
        options: ServiceOptions,
        narrator: N,
        history: H,
        clock: C,
    ) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (finished, finished_rx) = watch::channel(None);
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();

        let service = Self {
            runner: SessionRunner::new(options.runner),
            narrator: Arc::new(narrator),
            history,
            clock,
            max_entries: options.max_entries,
            tick_interval: options.tick_interval,
            events: events.clone(),
            finished,
            settled_tx,
            settled_rx,
            speaking: None,
        };
        tokio::spawn(service.run(commands_rx));

        SessionHandle {
            commands: commands_tx,
            events,
            finished: finished_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let effects = self.runner.tick(self.clock.now_ms());
                    self.apply(effects).await;
                }
                Some(id) = self.settled_rx.recv() => {
                    let effects = self.runner.narration_settled(id, self.clock.now_ms());
                    self.apply(effects).await;
                }
                command = commands.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        self.shutdown().await;
                        let _ = reply.send(());
                        break;
                    }
                    Some(command) => self.handle(command).await,
                    None => {
                        self.shutdown().await;
                        break;
                    }
                },
            }
        }
        debug!("session service stopped");
    }

    async fn handle(&mut self, command: Command) {
        let now = self.clock.now_ms();
        match command {
            Command::Start { script, reply } => {
                let result = self.runner.start(script, now);
                let result = match result {
                    Ok(effects) => {
                        self.apply(effects).await;
                        self.finished.send_replace(None);
                        Ok(())
                    }
                    Err(e) => Err(e),
                };
                let _ = reply.send(result);
            }
            Command::Pause { reply } => {
                let result = self.runner.pause(now);
                let _ = reply.send(self.apply_result(result).await);
            }
            Command::Resume { reply } => {
                let result = self.runner.resume(now);
                let _ = reply.send(self.apply_result(result).await);
            }
            Command::Stop { reply } => {
                let result = self.runner.stop(now);
                let _ = reply.send(self.apply_result(result).await);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.runner.snapshot(now));
            }
            Command::Shutdown { .. } => {}
        }
    }

    async fn apply_result(
        &mut self,
        result: Result<Vec<Effect>, SessionError>,
    ) -> Result<(), SessionError> {
        let effects = result?;
        self.apply(effects).await;
        Ok(())
    }

    async fn shutdown(&mut self) {
        if self.runner.status().is_active() {
            info!("stopping active session on shutdown");
            if let Ok(effects) = self.runner.stop(self.clock.now_ms()) {
                self.apply(effects).await;
            }
        }
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Speak(utterance) => self.speak(utterance),
                Effect::CancelSpeech => self.cancel_speech().await,
                Effect::Persist(entry) => {
                    if let Err(e) = self.history.append(entry.clone(), self.max_entries) {
                        warn!(error = %e, id = %entry.id, "failed to save training history");
                    }
                    self.finished.send_replace(Some(entry));
                }
                Effect::Emit(event) => {
                    // No subscribers is fine.
                    let _ = self.events.send(event);
                }
            }
        }
    }

    fn speak(&mut self, utterance: Utterance) {
        let narrator = Arc::clone(&self.narrator);
        let settled = self.settled_tx.clone();
        self.speaking = Some(tokio::spawn(async move {
            let Utterance {
                id,
                text,
                language,
                rate,
                ..
            } = utterance;
            if let Err(e) = narrator.speak(&text, &language, rate).await {
                warn!(error = %e, id, "narration failed, continuing");
            }
            let _ = settled.send(id);
        }));
    }

    /// Stop the engine, then drop the speak task. A task that has not been
    /// polled yet would miss the engine's stop and overlap the next one.
    async fn cancel_speech(&mut self) {
        self.narrator.stop().await;
        if let Some(task) = self.speaking.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

/// Cloneable control surface of a running [`SessionService`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
    finished: watch::Receiver<Option<TrainingHistoryEntry>>,
}

impl SessionHandle {
    pub async fn start(&self, script: Catalog) -> Result<(), CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { script, reply }).await?;
        Ok(rx.await.map_err(|_| CoreError::ServiceClosed)??)
    }

    pub async fn pause(&self) -> Result<(), CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Pause { reply }).await?;
        Ok(rx.await.map_err(|_| CoreError::ServiceClosed)??)
    }

    pub async fn resume(&self) -> Result<(), CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Resume { reply }).await?;
        Ok(rx.await.map_err(|_| CoreError::ServiceClosed)??)
    }

    pub async fn stop(&self) -> Result<(), CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stop { reply }).await?;
        Ok(rx.await.map_err(|_| CoreError::ServiceClosed)??)
    }

    /// Current state as a [`Event::StateSnapshot`].
    pub async fn snapshot(&self) -> Result<Event, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| CoreError::ServiceClosed)
    }

    /// Stop any active session and end the background task.
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply }).await?;
        rx.await.map_err(|_| CoreError::ServiceClosed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Resolves with the record of the most recent session once it has
    /// completed or stopped.
    pub async fn wait_finished(&self) -> Result<TrainingHistoryEntry, CoreError> {
        let mut finished = self.finished.clone();
        let entry = finished
            .wait_for(Option::is_some)
            .await
            .map_err(|_| CoreError::ServiceClosed)?;
        entry.clone().ok_or(CoreError::ServiceClosed)
    }

    async fn send(&self, command: Command) -> Result<(), CoreError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::ServiceClosed)
    }
}
