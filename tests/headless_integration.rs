use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pairmatch::{
    config::Config,
    leaderboard::MemoryStore,
    runtime::{FixedFrameRate, GameEvent, Runner, TestEventSource},
    CardState, RevealOutcome, Session, SessionState,
};

// Headless integration using the internal runtime + Session without a TTY.
// Cards are addressed by a base-36 digit key so the flow needs no cursor.

fn session(names: &[&str], mismatch_delay_ms: u64) -> Session {
    let config = Config {
        symbols: names.iter().map(|s| s.to_string()).collect(),
        mismatch_delay_ms,
        ..Config::default()
    };
    Session::seeded(&config, Box::new(MemoryStore::new()), 2024).unwrap()
}

fn positions(session: &Session, name: &str) -> Vec<usize> {
    session
        .deck()
        .cards()
        .iter()
        .filter(|c| c.symbol.name() == name)
        .map(|c| c.position)
        .collect()
}

fn press(tx: &mpsc::Sender<GameEvent>, position: usize) {
    let c = std::char::from_digit(position as u32, 36).unwrap();
    tx.send(GameEvent::Key(KeyEvent::new(
        KeyCode::Char(c),
        KeyModifiers::NONE,
    )))
    .unwrap();
}

/// One pass of the event loop: advance the clock, then apply the event.
fn step<E, T>(runner: &mut Runner<E, T>, session: &mut Session) -> Option<RevealOutcome>
where
    E: pairmatch::runtime::GameEventSource,
    T: pairmatch::runtime::FrameRate,
{
    let (event, dt) = runner.wait();
    session.advance(dt);
    match event {
        GameEvent::Key(key) => match key.code {
            KeyCode::Char(c) => c
                .to_digit(36)
                .map(|pos| session.reveal_card(pos as usize)),
            _ => None,
        },
        GameEvent::Resize | GameEvent::Frame => None,
    }
}

#[test]
fn headless_game_flow_completes() {
    let mut session = session(&["anchor", "bolt"], 300);
    assert!(session.start());

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(
        TestEventSource::new(rx),
        FixedFrameRate::new(Duration::from_millis(5)),
    );

    for name in ["anchor", "bolt"] {
        for pos in positions(&session, name) {
            press(&tx, pos);
        }
    }

    let mut won = None;
    for _ in 0..100u32 {
        if let Some(RevealOutcome::Matched { won: Some(summary) }) = step(&mut runner, &mut session)
        {
            won = Some(summary);
            break;
        }
    }

    let summary = won.expect("game should have been won");
    assert_eq!(session.state(), SessionState::Won);
    assert_eq!(summary.move_count, 2);
    assert_eq!(summary.star_rating, 3);
    assert!(summary.new_record);
    assert_eq!(session.best_time(), Some(summary.elapsed_secs));
    assert_eq!(session.deck().count_in(CardState::Matched), 4);
}

#[test]
fn headless_mismatch_hides_after_delay() {
    let mut session = session(&["anchor", "bolt"], 30);
    session.start();
    let a = positions(&session, "anchor")[0];
    let b = positions(&session, "bolt")[0];

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(
        TestEventSource::new(rx),
        FixedFrameRate::new(Duration::from_millis(5)),
    );
    press(&tx, a);
    press(&tx, b);

    let mut saw_mismatch = false;
    for _ in 0..200u32 {
        if step(&mut runner, &mut session) == Some(RevealOutcome::Mismatched) {
            saw_mismatch = true;
        }
        if saw_mismatch && !session.pending().is_locked() {
            break;
        }
    }

    assert!(saw_mismatch);
    assert!(!session.pending().is_locked());
    assert_eq!(session.deck().get(a).unwrap().state, CardState::Hidden);
    assert_eq!(session.deck().get(b).unwrap().state, CardState::Hidden);
    assert_eq!(session.score().move_count, 1);
    assert_eq!(session.score().match_count, 0);
}

#[test]
fn headless_paused_session_ignores_input_and_time() {
    let mut session = session(&["anchor", "bolt"], 300);
    session.start();
    session.pause();

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(
        TestEventSource::new(rx),
        FixedFrameRate::new(Duration::from_millis(5)),
    );
    press(&tx, 0);

    for _ in 0..10u32 {
        assert_ne!(step(&mut runner, &mut session), Some(RevealOutcome::Opened));
    }
    // ten idle steps are far below a second, but nothing may tick anyway
    session.advance(Duration::from_secs(5));

    assert_eq!(session.state(), SessionState::Paused);
    assert_eq!(session.score().elapsed_secs, 0);
    assert_eq!(session.deck().count_in(CardState::Hidden), 4);
}
