use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::GameError;
use crate::protocol::{PlayerAction, PlayerInput, Sequence, ServerMessage};
use crate::resonance::{AlchemistOracle, ResonanceController, ResonanceOutcome};
use crate::store::GameStore;

/// Channel for replies that go back to the client that sent the action.
pub type ReplyTx = mpsc::UnboundedSender<ServerMessage>;

/// Applies player actions to the store.
///
/// Clicks, purchases and selections are applied immediately. Incantations
/// are spawned so the caller never waits on the remote service.
pub struct Dispatcher<O> {
    store: GameStore,
    resonance: Arc<ResonanceController<O>>,
}

impl<O> Clone for Dispatcher<O> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            resonance: Arc::clone(&self.resonance),
        }
    }
}

impl<O: AlchemistOracle> Dispatcher<O> {
    pub fn new(store: GameStore, resonance: Arc<ResonanceController<O>>) -> Self {
        Self { store, resonance }
    }

    pub fn handle(&self, input: PlayerInput, reply: &ReplyTx) {
        let seq = input.seq;
        let result = match input.action {
            PlayerAction::Click => self.store.transition(|state| state.click()).map(|_| ()),
            PlayerAction::SelectResource { resource } => self
                .store
                .transition(|state| state.select_resource(resource)),
            PlayerAction::Purchase { upgrade_id } => self
                .store
                .transition(|state| state.purchase(&upgrade_id))
                .map(|receipt| {
                    info!(
                        "Purchased {} level {} for {} {}",
                        receipt.upgrade_id, receipt.new_level, receipt.cost, receipt.resource
                    );
                }),
            PlayerAction::CastIncantation { text } => {
                self.spawn_incantation(seq, text, reply.clone());
                Ok(())
            }
        };

        if let Err(e) = result {
            reject(seq, &e, reply);
        }
    }

    fn spawn_incantation(&self, seq: Sequence, text: String, reply: ReplyTx) {
        let resonance = Arc::clone(&self.resonance);
        tokio::spawn(async move {
            let msg = match resonance.cast_incantation(&text).await {
                Ok(ResonanceOutcome::Resonated { message, .. }) => {
                    ServerMessage::ResonanceFinished {
                        seq,
                        accepted: true,
                        message,
                    }
                }
                Ok(ResonanceOutcome::FellBack { reason })
                | Ok(ResonanceOutcome::Preserved { reason }) => ServerMessage::ResonanceFinished {
                    seq,
                    accepted: false,
                    message: reason.to_string(),
                },
                Err(e) => ServerMessage::ActionRejected {
                    seq,
                    reason: e.to_string(),
                },
            };
            let _ = reply.send(msg);
        });
    }
}

fn reject(seq: Sequence, error: &GameError, reply: &ReplyTx) {
    debug!("Action {} rejected: {}", seq, error);
    let _ = reply.send(ServerMessage::ActionRejected {
        seq,
        reason: error.to_string(),
    });
}
