//! Two participants estimate one story in the "Sprint 42" room, sharing an
//! in-memory store.
//!
//! Run with `RUST_LOG=debug` to see store traffic.

use std::sync::Arc;

use planpoker::prelude::*;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(title: &str, snapshot: &RoomSnapshot) {
    let phase = snapshot
        .phase()
        .map_or_else(|| "no room".to_string(), |p| p.to_string());
    println!("--- {title} [{phase}] ---");
    for (id, player) in snapshot.players_in_join_order() {
        let vote = match snapshot.vote_view(id) {
            VoteView::Missing => "…".to_string(),
            VoteView::Hidden => "🂠".to_string(),
            VoteView::Shown(card) => card.to_string(),
        };
        println!("  {:<16} {vote}", display_name(&player.name));
    }
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), PlanPokerError> {
    init_tracing("info,planpoker_store=warn");

    let store = Arc::new(MemoryStore::new());
    let mut karol = ClientBuilder::new()
        .connect(
            Arc::clone(&store),
            &StaticIdentity::new(ParticipantId::parse("u1")?),
        )
        .await?;
    let mut ana = ClientBuilder::new()
        .connect(
            Arc::clone(&store),
            &StaticIdentity::new(ParticipantId::parse("u2")?),
        )
        .await?;

    let room_id = karol.create_room("Sprint 42", "Karol", None).await?;
    ana.join_room(&room_id, "Anastasiya").await?;
    tracing::info!(%room_id, deck = ?DEFAULT_DECK, "room ready");

    let mut ana_view = ana.watch();

    karol.start_round_countdown().await?;
    karol.vote(Some("5")).await?;
    ana.vote(Some("8")).await?;
    if ana_view.has_changed().unwrap_or(false) {
        render("Anastasiya sees", &ana_view.borrow_and_update());
    }

    ana.start_reveal_countdown().await?;
    karol.reveal().await?;
    render("after reveal", &karol.snapshot());

    karol.start_new_voting().await?;
    render("new round", &ana.snapshot());

    ana.leave_room().await;
    render("after Anastasiya left", &karol.snapshot());

    karol.shutdown().await;
    ana.shutdown().await;
    store.close();
    Ok(())
}
