use crate::game::Side::{Red, White};
use crate::game::{Match, Move, Outcome, Side};
use crate::messages::{Event, GameOutcome, Message, PROTOCOL_VERSION};
use crate::server::dispatcher::Dispatcher;
use async_std::sync::Mutex;
use async_std::task;
use log::{debug, error, info, trace};
use std::sync::Arc;
use std::time::Duration;

const WAITING_FOR_PLAYERS_INTERVAL: Duration = Duration::from_millis(250);
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawn the authoritative match loop over the seated players.
///
/// The loop idles until both seats are filled, then polls each side
/// once per iteration and applies whatever valid gameplay messages
/// arrive. Messages failing validation are dropped without a reply.
/// The loop keeps running after the match is decided so that late
/// messages drain harmlessly.
pub fn run_game_loop(seats: Arc<Mutex<Dispatcher>>) {
    task::spawn(async move {
        let mut game = Match::new();
        let mut finished = false;
        loop {
            let mut seats_guard = seats.lock().await;
            seats_guard.reap_disconnected();
            if !seats_guard.session_full() {
                drop(seats_guard);
                task::sleep(WAITING_FOR_PLAYERS_INTERVAL).await;
                continue;
            }
            let mut handled_any = false;
            for side in [Red, White] {
                if let Some(message) = seats_guard.try_receive(side) {
                    handle_message(&mut game, &mut finished, &seats_guard, side, message);
                    handled_any = true;
                }
            }
            drop(seats_guard);
            if !handled_any {
                task::sleep(IDLE_POLL_INTERVAL).await;
            }
        }
    });
}

fn handle_message(
    game: &mut Match,
    finished: &mut bool,
    seats: &Dispatcher,
    sender: Side,
    message: Message,
) {
    if message.version != PROTOCOL_VERSION {
        debug!(
            "ignoring message with unsupported version {} from {:?}",
            message.version, sender
        );
        return;
    }
    match message.event {
        Event::Move(claimed, mv) => handle_move(game, finished, seats, sender, claimed, mv),
        Event::Resign(_) => handle_resign(finished, seats, sender),
        event => trace!("ignoring event {:?} from {:?}", event, sender),
    }
}

/// Validate and apply one move claim. The sender must hold the turn and
/// own the source piece regardless of the side named in the message;
/// the broadcast to both players carries the true mover.
fn handle_move(
    game: &mut Match,
    finished: &mut bool,
    seats: &Dispatcher,
    sender: Side,
    claimed: Side,
    mv: Move,
) {
    if *finished {
        trace!("match already decided, ignoring move from {:?}", sender);
        return;
    }
    if claimed != sender {
        debug!("{:?} claimed to move as {:?}", sender, claimed);
    }
    if game.turn() != sender {
        debug!("{:?} moved out of turn", sender);
        return;
    }
    if !game.is_legal_partial_move(mv) {
        debug!("{:?} sent an illegal move {:?}", sender, mv);
        return;
    }
    let owns_source = game
        .board()
        .piece_at(mv.start)
        .map_or(false, |piece| piece.owner == sender);
    if !owns_source {
        debug!("{:?} tried to move an opposing piece", sender);
        return;
    }
    if let Err(e) = game.apply_move(mv) {
        error!("move application failed: {:?}", e);
        *finished = true;
        return;
    }
    info!(
        "{:?} moved ({}, {}) -> ({}, {})",
        sender, mv.start.row, mv.start.col, mv.end.row, mv.end.col
    );
    seats.broadcast(Message::game_move(sender, mv));
    // a verdict is only announced once no jump chain is pending
    if game.forced().is_none() {
        if let Some(outcome) = decided(game.outcome()) {
            info!("match decided: {:?}", outcome);
            seats.broadcast(Message::outcome(outcome));
            *finished = true;
        }
    }
}

/// The resigning side is the sender, whatever side the message claims,
/// and both players hear the verdict.
fn handle_resign(finished: &mut bool, seats: &Dispatcher, sender: Side) {
    if *finished {
        trace!(
            "match already decided, ignoring resignation from {:?}",
            sender
        );
        return;
    }
    let outcome = match sender {
        Red => GameOutcome::RedResigned,
        White => GameOutcome::WhiteResigned,
        _ => return,
    };
    info!("{:?} resigned", sender);
    seats.broadcast(Message::outcome(outcome));
    *finished = true;
}

fn decided(outcome: Outcome) -> Option<GameOutcome> {
    match outcome {
        Outcome::RedWins => Some(GameOutcome::RedWins),
        Outcome::WhiteWins => Some(GameOutcome::WhiteWins),
        Outcome::Draw => Some(GameOutcome::Draw),
        Outcome::Undecided => None,
    }
}
