//! The room session: one participant's view of, and control over, a room.
//!
//! A [`RoomSession`] owns a [`SessionContext`] and, while joined, one set
//! of store subscriptions: the room meta listener, the players listener
//! and a batch hook. Store notifications are applied to a [`RoomSnapshot`]
//! published through a `watch` channel, so views observe the room without
//! holding the session.
//!
//! # Staged publication
//!
//! A single store write (for example the multi-path update behind
//! [`RoomSession::start_new_voting`]) can notify both listeners. Each
//! listener only stages its decoded value; the batch hook, which the store
//! runs after the last listener of that write, publishes everything staged
//! in one `watch` update. A receiver therefore never sees the new round id
//! next to the previous round's votes.
//!
//! Phase changes are cooperative: any participant may call any mutator.
//! Under [`TransitionPolicy::Strict`] the mutators are checked against the
//! phase in the local snapshot first.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use planpoker_protocol::layout::{self, meta_field, player_field};
use planpoker_protocol::{
    Codec, JsonCodec, ParticipantId, Player, RoomId, RoomMeta, ensure_deck_or,
};
use planpoker_session::SessionContext;
use planpoker_store::{BatchHook, Listener, Store, Subscription};
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::{
    Membership, PhaseTransition, RoomConfig, RoomError, RoomPhase, RoomSnapshot,
    TransitionPolicy,
};

/// The listeners and batch hook held while joined.
struct RoomSubscriptions {
    flush: Subscription,
    meta: Subscription,
    players: Subscription,
}

impl RoomSubscriptions {
    fn close(self) {
        self.meta.close();
        self.players.close();
        self.flush.close();
    }
}

/// Listener output waiting for the end of the store write.
#[derive(Debug, Default)]
struct Pending {
    /// `Some(None)` stages a deleted meta record.
    meta: Option<Option<RoomMeta>>,
    players: Option<BTreeMap<ParticipantId, Player>>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.meta.is_none() && self.players.is_none()
    }

    fn apply_to(self, snapshot: &mut RoomSnapshot) {
        if let Some(meta) = self.meta {
            snapshot.meta = meta;
        }
        if let Some(players) = self.players {
            snapshot.players = players;
        }
    }
}

/// Shared between the two listeners and the flush hook of one join.
type Staging = Arc<Mutex<Pending>>;

/// Creates, joins, leaves and drives one room for the local participant.
pub struct RoomSession<S: Store> {
    ctx: SessionContext<S>,
    config: RoomConfig,
    codec: JsonCodec,
    membership: Membership,
    state: Arc<watch::Sender<RoomSnapshot>>,
    subscriptions: Option<RoomSubscriptions>,
}

impl<S: Store> RoomSession<S> {
    pub fn new(ctx: SessionContext<S>, config: RoomConfig) -> Self {
        let (state, _) = watch::channel(RoomSnapshot {
            me: ctx.participant().cloned(),
            ..RoomSnapshot::default()
        });
        Self {
            ctx,
            config,
            codec: JsonCodec,
            membership: Membership::Unjoined,
            state: Arc::new(state),
            subscriptions: None,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// A copy of the current room state.
    pub fn snapshot(&self) -> RoomSnapshot {
        self.state.borrow().clone()
    }

    /// A receiver that is notified whenever the room state changes.
    pub fn watch(&self) -> watch::Receiver<RoomSnapshot> {
        self.state.subscribe()
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    /// The room this session is joined to.
    pub fn room_id(&self) -> Option<&RoomId> {
        match &self.membership {
            Membership::Joined(room) => Some(room),
            _ => None,
        }
    }

    pub fn phase(&self) -> Option<RoomPhase> {
        self.state.borrow().phase()
    }

    /// Time left on the room's running countdown, by the local clock.
    pub fn countdown_remaining(&self) -> Option<Duration> {
        let now = self.ctx.now();
        self.phase()
            .and_then(|phase| phase.countdown_remaining(now, &self.config))
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn context(&self) -> &SessionContext<S> {
        &self.ctx
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Creates a room named `room_name` and joins it as `creator_name`.
    ///
    /// The room id is the slug of `room_name`. `deck` falls back to the
    /// configured default when absent or empty.
    ///
    /// # Errors
    /// - [`RoomError::InvalidName`] if the name has no usable characters
    /// - [`RoomError::Unauthenticated`] if no identity is established
    /// - [`RoomError::AlreadyExists`] if the slug is taken; nothing is
    ///   overwritten
    pub async fn create_room(
        &mut self,
        room_name: &str,
        creator_name: &str,
        deck: Option<Vec<String>>,
    ) -> Result<RoomId, RoomError> {
        let room_id = RoomId::from_name(room_name).ok_or(RoomError::InvalidName)?;
        self.participant()?;

        let deck = ensure_deck_or(deck, self.config.default_deck.iter().cloned());
        let meta = RoomMeta::new(room_name, deck, self.ctx.now());
        let value = self.codec.encode(&meta)?;

        let created = self
            .ctx
            .store()
            .write_if_absent(&layout::meta(&room_id), value)
            .await?;
        if !created {
            return Err(RoomError::AlreadyExists(room_id));
        }
        tracing::info!(%room_id, name = room_name, "room created");

        self.join_room(&room_id, creator_name).await?;
        Ok(room_id)
    }

    /// Joins an existing room as `name`.
    ///
    /// Re-joining with the same identity keeps the vote already stored for
    /// it. Listeners from a previous room are closed before the new ones
    /// are installed.
    ///
    /// # Errors
    /// - [`RoomError::Unauthenticated`] if no identity is established
    /// - [`RoomError::RoomNotFound`] if the room has no meta record
    pub async fn join_room(&mut self, room_id: &RoomId, name: &str) -> Result<(), RoomError> {
        let me = self.participant()?;
        if !self.ctx.store().exists(&layout::meta(room_id)).await? {
            return Err(RoomError::RoomNotFound(room_id.clone()));
        }

        let previous =
            std::mem::replace(&mut self.membership, Membership::Joining(room_id.clone()));
        if let Err(e) = self.upsert_player(room_id, &me, name).await {
            self.membership = previous;
            return Err(e);
        }

        self.teardown_subscriptions();
        self.state.send_replace(RoomSnapshot {
            room_id: Some(room_id.clone()),
            me: Some(me.clone()),
            my_name: name.to_string(),
            ..RoomSnapshot::default()
        });

        match self.install_subscriptions(room_id).await {
            Ok(subscriptions) => {
                self.subscriptions = Some(subscriptions);
                self.membership = Membership::Joined(room_id.clone());
                tracing::info!(%room_id, participant = %me, "joined room");
                Ok(())
            }
            Err(e) => {
                self.membership = Membership::Unjoined;
                self.reset_state();
                Err(e)
            }
        }
    }

    /// Leaves the current room.
    ///
    /// Listeners are closed first. Removing the player record is best
    /// effort: a failure is logged and otherwise ignored.
    pub async fn leave_room(&mut self) {
        self.teardown_subscriptions();

        if let Some(room_id) = self.membership.room().cloned() {
            self.membership = Membership::Leaving(room_id.clone());
            if let Some(me) = self.ctx.participant() {
                let path = layout::player(&room_id, me);
                match self.ctx.store().remove(&path).await {
                    Ok(()) => tracing::info!(%room_id, participant = %me, "left room"),
                    Err(e) => tracing::warn!(
                        %room_id,
                        participant = %me,
                        error = %e,
                        "failed to remove player record"
                    ),
                }
            }
        }

        self.membership = Membership::Unjoined;
        self.reset_state();
    }

    /// Leaves the room and ends the session context.
    pub async fn shutdown(mut self) {
        self.leave_room().await;
        self.ctx.shutdown();
    }

    // -----------------------------------------------------------------
    // Voting and phases
    // -----------------------------------------------------------------

    /// Sets (or with `None`, clears) the local participant's vote.
    ///
    /// Does nothing when not joined.
    ///
    /// # Errors
    /// [`RoomError::InvalidVote`] if vote validation is enabled and the
    /// value is not in the deck.
    pub async fn vote(&self, value: Option<&str>) -> Result<(), RoomError> {
        let (Some(room_id), Some(me)) = (self.room_id(), self.ctx.participant()) else {
            return Ok(());
        };

        if let Some(label) = value {
            if self.config.validate_votes && !self.deck_has(label) {
                return Err(RoomError::InvalidVote(label.to_string()));
            }
        }

        let mut fields = Map::new();
        fields.insert(
            player_field::VOTE.to_string(),
            value.map_or(Value::Null, Value::from),
        );
        self.ctx
            .store()
            .patch(&layout::player(room_id, me), fields)
            .await?;
        tracing::debug!(%room_id, participant = %me, voted = value.is_some(), "vote written");
        Ok(())
    }

    /// Starts the vote-entry countdown. Clears any reveal in progress.
    pub async fn start_round_countdown(&self) -> Result<(), RoomError> {
        let Some(room_id) = self.room_id() else {
            return Ok(());
        };
        self.check_transition(PhaseTransition::StartRoundCountdown)?;

        let now = self.ctx.now();
        self.patch_meta(
            room_id,
            [
                (meta_field::COUNTDOWN_START, Value::from(now)),
                (meta_field::REVEAL_COUNTDOWN_START, Value::Null),
                (meta_field::REVEALED, Value::Bool(false)),
            ],
        )
        .await
    }

    /// Starts the countdown to reveal.
    pub async fn start_reveal_countdown(&self) -> Result<(), RoomError> {
        let Some(room_id) = self.room_id() else {
            return Ok(());
        };
        self.check_transition(PhaseTransition::StartRevealCountdown)?;

        let now = self.ctx.now();
        self.patch_meta(
            room_id,
            [(meta_field::REVEAL_COUNTDOWN_START, Value::from(now))],
        )
        .await
    }

    /// Reveals every vote of the current round.
    pub async fn reveal(&self) -> Result<(), RoomError> {
        let Some(room_id) = self.room_id() else {
            return Ok(());
        };
        self.check_transition(PhaseTransition::Reveal)?;

        self.patch_meta(
            room_id,
            [
                (meta_field::REVEALED, Value::Bool(true)),
                (meta_field::REVEAL_COUNTDOWN_START, Value::Null),
            ],
        )
        .await?;
        tracing::info!(%room_id, "votes revealed");
        Ok(())
    }

    /// Starts a new round: clears every vote, both countdowns and the
    /// reveal flag, and moves to a new round id, in one atomic update.
    pub async fn start_new_voting(&self) -> Result<(), RoomError> {
        let Some(room_id) = self.room_id() else {
            return Ok(());
        };
        self.check_transition(PhaseTransition::StartNewVoting)?;

        let store = self.ctx.store();
        let now = self.ctx.now();
        let round_id = self
            .state
            .borrow()
            .meta
            .as_ref()
            .map_or(now, |meta| meta.next_round_id(now));

        let mut updates = BTreeMap::new();
        if let Some(Value::Object(players)) = store.read(&layout::players(room_id)).await? {
            for key in players.keys() {
                let vote = layout::players(room_id)
                    .child(key.as_str())
                    .child(player_field::VOTE);
                updates.insert(vote, Value::Null);
            }
        }
        let cleared = updates.len();
        updates.insert(
            layout::meta_field(room_id, meta_field::REVEALED),
            Value::Bool(false),
        );
        updates.insert(
            layout::meta_field(room_id, meta_field::COUNTDOWN_START),
            Value::Null,
        );
        updates.insert(
            layout::meta_field(room_id, meta_field::REVEAL_COUNTDOWN_START),
            Value::Null,
        );
        updates.insert(
            layout::meta_field(room_id, meta_field::ROUND_ID),
            Value::from(round_id),
        );

        store.multi_patch(updates).await?;
        tracing::info!(%room_id, round_id, players = cleared, "new voting round");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn participant(&self) -> Result<ParticipantId, RoomError> {
        self.ctx
            .participant()
            .cloned()
            .ok_or(RoomError::Unauthenticated)
    }

    fn deck_has(&self, label: &str) -> bool {
        let state = self.state.borrow();
        match &state.meta {
            Some(meta) => meta.has_card(label),
            None => self.config.default_deck.iter().any(|card| card == label),
        }
    }

    fn check_transition(&self, transition: PhaseTransition) -> Result<(), RoomError> {
        if self.config.transitions == TransitionPolicy::Permissive {
            return Ok(());
        }
        match self.phase() {
            Some(phase) if !phase.permits(transition) => {
                Err(RoomError::InvalidTransition { phase, transition })
            }
            _ => Ok(()),
        }
    }

    async fn upsert_player(
        &self,
        room_id: &RoomId,
        me: &ParticipantId,
        name: &str,
    ) -> Result<(), RoomError> {
        let store = self.ctx.store();
        let vote = store
            .read(&layout::player_vote(room_id, me))
            .await?
            .and_then(|v| v.as_str().map(str::to_string));
        let player = Player {
            name: name.to_string(),
            vote,
            joined_at: self.ctx.now(),
        };
        let fields = self.codec.encode_fields(&player)?;
        store.patch(&layout::player(room_id, me), fields).await?;
        Ok(())
    }

    async fn patch_meta<const N: usize>(
        &self,
        room_id: &RoomId,
        fields: [(&str, Value); N],
    ) -> Result<(), RoomError> {
        let fields: Map<String, Value> = fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.ctx
            .store()
            .patch(&layout::meta(room_id), fields)
            .await?;
        Ok(())
    }

    async fn install_subscriptions(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomSubscriptions, RoomError> {
        let store = self.ctx.store();
        let staging = Staging::default();

        // The hook goes in first so the initial deliveries below are
        // published as well.
        let flush = store
            .on_batch_end(flush_hook(Arc::clone(&staging), Arc::clone(&self.state)))
            .await?;
        let meta = match store
            .subscribe(
                &layout::meta(room_id),
                meta_listener(
                    Arc::clone(&staging),
                    self.config.default_deck.clone(),
                    room_id.clone(),
                ),
            )
            .await
        {
            Ok(meta) => meta,
            Err(e) => {
                flush.close();
                return Err(e.into());
            }
        };
        let players = match store
            .subscribe(
                &layout::players(room_id),
                players_listener(Arc::clone(&staging), room_id.clone()),
            )
            .await
        {
            Ok(players) => players,
            Err(e) => {
                meta.close();
                flush.close();
                return Err(e.into());
            }
        };
        Ok(RoomSubscriptions {
            flush,
            meta,
            players,
        })
    }

    fn teardown_subscriptions(&mut self) {
        if let Some(subscriptions) = self.subscriptions.take() {
            subscriptions.close();
            tracing::debug!("room listeners closed");
        }
    }

    fn reset_state(&self) {
        self.state.send_replace(RoomSnapshot {
            me: self.ctx.participant().cloned(),
            ..RoomSnapshot::default()
        });
    }
}

impl<S: Store> Drop for RoomSession<S> {
    fn drop(&mut self) {
        self.teardown_subscriptions();
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

fn stage(staging: &Staging, room_id: &RoomId, update: impl FnOnce(&mut Pending)) {
    match staging.lock() {
        Ok(mut pending) => update(&mut pending),
        Err(_) => tracing::warn!(%room_id, "room staging poisoned, dropping update"),
    }
}

/// Publishes whatever the listeners staged during one store write, as a
/// single snapshot change.
fn flush_hook(staging: Staging, state: Arc<watch::Sender<RoomSnapshot>>) -> BatchHook {
    Box::new(move || {
        let pending = match staging.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        if !pending.is_empty() {
            state.send_modify(|snapshot| pending.apply_to(snapshot));
        }
    })
}

/// Stages each meta notification, with deck fallback. A deleted meta
/// record stages a cleared meta.
fn meta_listener(staging: Staging, fallback_deck: Vec<String>, room_id: RoomId) -> Listener {
    Box::new(move |value| {
        let meta = match value.map(|v| JsonCodec.decode::<RoomMeta>(v)).transpose() {
            Ok(meta) => meta.map(|meta| meta.normalized(&fallback_deck)),
            Err(e) => {
                tracing::warn!(%room_id, error = %e, "ignoring malformed room meta");
                return;
            }
        };
        stage(&staging, &room_id, |pending| pending.meta = Some(meta));
    })
}

/// Stages each players notification as the full replacement map.
fn players_listener(staging: Staging, room_id: RoomId) -> Listener {
    Box::new(move |value| {
        let players = decode_players(value, &room_id);
        stage(&staging, &room_id, |pending| pending.players = Some(players));
    })
}

/// Decodes a players map, skipping entries that are not valid records.
fn decode_players(value: Option<Value>, room_id: &RoomId) -> BTreeMap<ParticipantId, Player> {
    let Some(Value::Object(entries)) = value else {
        return BTreeMap::new();
    };
    entries
        .into_iter()
        .filter_map(|(key, raw)| {
            let decoded = ParticipantId::parse(key.as_str())
                .and_then(|id| JsonCodec.decode::<Player>(raw).map(|player| (id, player)));
            match decoded {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(%room_id, participant = %key, error = %e, "skipping malformed player");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_players_skips_malformed_entries() {
        let room_id = RoomId::parse("r").unwrap();
        let players = decode_players(
            Some(json!({
                "u1": {"name": "Alice", "joinedAt": 1},
                "u2": {"name": 7},
            })),
            &room_id,
        );
        assert_eq!(players.len(), 1);
        let u1 = ParticipantId::parse("u1").unwrap();
        assert_eq!(players[&u1].name, "Alice");
        assert_eq!(players[&u1].vote, None);
    }

    #[test]
    fn test_decode_players_absent_is_empty() {
        let room_id = RoomId::parse("r").unwrap();
        assert!(decode_players(None, &room_id).is_empty());
        assert!(decode_players(Some(json!("junk")), &room_id).is_empty());
    }

    fn staged() -> (Staging, BatchHook, watch::Receiver<RoomSnapshot>) {
        let (tx, rx) = watch::channel(RoomSnapshot::default());
        let staging = Staging::default();
        let flush = flush_hook(Arc::clone(&staging), Arc::new(tx));
        (staging, flush, rx)
    }

    #[test]
    fn test_meta_listener_applies_deck_fallback() {
        let (staging, flush, rx) = staged();
        let listener = meta_listener(
            staging,
            vec!["S".into(), "M".into()],
            RoomId::parse("r").unwrap(),
        );

        listener(Some(json!({"createdAt": 1, "name": "R", "roundId": 1, "deck": []})));
        flush();
        assert_eq!(
            rx.borrow().meta.as_ref().map(|m| m.deck.clone()),
            Some(vec!["S".to_string(), "M".to_string()])
        );

        listener(None);
        flush();
        assert!(rx.borrow().meta.is_none());
    }

    #[test]
    fn test_meta_listener_keeps_last_good_meta_on_malformed_update() {
        let (staging, flush, rx) = staged();
        let listener = meta_listener(staging, vec![], RoomId::parse("r").unwrap());

        listener(Some(json!({"createdAt": 1, "name": "R", "roundId": 1})));
        flush();
        listener(Some(json!({"name": 5})));
        flush();
        assert_eq!(rx.borrow().meta.as_ref().map(|m| m.name.as_str()), Some("R"));
    }

    #[test]
    fn test_listeners_publish_only_on_flush() {
        let (staging, flush, mut rx) = staged();
        let room_id = RoomId::parse("r").unwrap();
        let meta = meta_listener(Arc::clone(&staging), vec![], room_id.clone());
        let players = players_listener(staging, room_id);

        meta(Some(json!({"createdAt": 1, "name": "R", "roundId": 7})));
        players(Some(json!({"u1": {"name": "Alice", "joinedAt": 1, "vote": "5"}})));
        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow().meta.is_none());

        flush();
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.meta.map(|m| m.round_id), Some(7));
        assert_eq!(snapshot.players.len(), 1);

        flush();
        assert!(!rx.has_changed().unwrap());
    }
}
