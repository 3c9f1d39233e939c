//! Participant registry: the single source of truth for who is present.
//!
//! Each member pairs a `Participant` with the outbound queue of its
//! connection. All mutations go through one lock. Joins and leaves bump a
//! roster generation that the roster task watches.

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use exhibit_common::ParticipantId;
use tokio::sync::{mpsc, watch, RwLock};

use crate::participant::{Participant, Transform};

/// One serialized outbound text frame, shared by every recipient.
pub type Frame = Utf8Bytes;

struct Member {
    participant: Participant,
    tx: mpsc::Sender<Frame>,
}

impl Member {
    /// Queue without waiting. A slow or gone recipient only loses this frame.
    fn deliver(&self, frame: &Frame) -> bool {
        match self.tx.try_send(frame.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    participant = %self.participant.id,
                    "Send queue full, dropping frame"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    participant = %self.participant.id,
                    "Send queue closed, dropping frame"
                );
                false
            }
        }
    }
}

/// Thread-safe registry handle. Clones share state.
#[derive(Clone)]
pub struct Registry {
    members: Arc<RwLock<Vec<Member>>>,
    roster_generation: Arc<watch::Sender<u64>>,
    send_queue: usize,
}

impl Registry {
    pub fn new(send_queue: usize) -> Self {
        let (roster_generation, _) = watch::channel(0);
        Self {
            members: Arc::new(RwLock::new(Vec::new())),
            roster_generation: Arc::new(roster_generation),
            send_queue: send_queue.max(1),
        }
    }

    /// Add a participant for a new connection.
    ///
    /// Returns the fresh record and the receiving end of its outbound queue,
    /// or `None` if `id` is already present.
    pub async fn join(&self, id: ParticipantId) -> Option<(Participant, mpsc::Receiver<Frame>)> {
        let participant = Participant::new(id);
        let (tx, rx) = mpsc::channel(self.send_queue);
        {
            let mut members = self.members.write().await;
            if members.iter().any(|m| m.participant.id == participant.id) {
                return None;
            }
            members.push(Member {
                participant: participant.clone(),
                tx,
            });
        }
        self.mark_roster_dirty();
        Some((participant, rx))
    }

    /// Remove a participant. Returns `None` if it was already gone.
    pub async fn leave(&self, id: &ParticipantId) -> Option<Participant> {
        let removed = {
            let mut members = self.members.write().await;
            let index = members.iter().position(|m| &m.participant.id == id)?;
            members.remove(index).participant
        };
        self.mark_roster_dirty();
        Some(removed)
    }

    /// Overwrite a participant's transform. Returns false on a lookup miss.
    pub async fn update_transform(&self, id: &ParticipantId, transform: Transform) -> bool {
        let mut members = self.members.write().await;
        match members.iter_mut().find(|m| &m.participant.id == id) {
            Some(member) => {
                member.participant.set_transform(transform);
                true
            }
            None => false,
        }
    }

    /// Queue `frame` for every member except `origin`. Returns the number
    /// of members that accepted it.
    pub async fn fan_out(&self, origin: &ParticipantId, frame: Frame) -> usize {
        let members = self.members.read().await;
        members
            .iter()
            .filter(|m| &m.participant.id != origin)
            .filter(|m| m.deliver(&frame))
            .count()
    }

    /// Queue `frame` for every member.
    pub async fn broadcast(&self, frame: Frame) -> usize {
        let members = self.members.read().await;
        members.iter().filter(|m| m.deliver(&frame)).count()
    }

    /// Current roster in join order, optionally without one id.
    pub async fn snapshot(&self, exclude: Option<&str>) -> Vec<Participant> {
        let members = self.members.read().await;
        members
            .iter()
            .filter(|m| exclude.map_or(true, |id| m.participant.id.as_str() != id))
            .map(|m| m.participant.clone())
            .collect()
    }

    #[cfg(test)]
    pub async fn get(&self, id: &ParticipantId) -> Option<Participant> {
        let members = self.members.read().await;
        members
            .iter()
            .find(|m| &m.participant.id == id)
            .map(|m| m.participant.clone())
    }

    pub async fn contains(&self, id: &ParticipantId) -> bool {
        self.members
            .read()
            .await
            .iter()
            .any(|m| &m.participant.id == id)
    }

    /// Number of connected participants.
    pub async fn count(&self) -> usize {
        self.members.read().await.len()
    }

    /// Watch for joins and leaves. The value is a change counter.
    pub fn roster_changes(&self) -> watch::Receiver<u64> {
        self.roster_generation.subscribe()
    }

    fn mark_roster_dirty(&self) {
        self.roster_generation.send_modify(|generation| *generation += 1);
    }
}
