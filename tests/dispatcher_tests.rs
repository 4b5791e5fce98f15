//! Dispatch ordering and registration lifecycle tests.

use std::cell::RefCell;
use std::rc::Rc;

use relay_ccg::{
    Game, GameEvent, GameEventArgs, PlayerId, Trigger, TriggerCondition, TriggerContext,
};

fn p(index: u8) -> PlayerId {
    PlayerId::new(index)
}

fn tagged(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Trigger {
    let log = log.clone();
    Trigger::relay(
        Rc::new(move |_, _| log.borrow_mut().push(tag)),
        TriggerCondition::Global,
    )
}

#[test]
fn higher_priority_fires_first() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    game.dispatcher
        .register(GameEvent::GameStart, None, tagged(&log, "b").with_priority(-10));
    game.dispatcher
        .register(GameEvent::GameStart, None, tagged(&log, "a").with_priority(10));
    game.dispatcher
        .register(GameEvent::GameStart, None, tagged(&log, "m"));

    game.fire(GameEvent::GameStart, &GameEventArgs::new(p(0)));

    assert_eq!(*log.borrow(), vec!["a", "m", "b"]);
}

#[test]
fn equal_priority_keeps_registration_order() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        game.dispatcher
            .register(GameEvent::TurnEnd, None, tagged(&log, tag).with_priority(3));
    }

    game.fire(GameEvent::TurnEnd, &GameEventArgs::new(p(0)));

    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn unregister_is_idempotent() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    let id = game
        .dispatcher
        .register(GameEvent::TurnEnd, None, tagged(&log, "x"));

    game.dispatcher.unregister(GameEvent::TurnEnd, id);
    game.dispatcher.unregister(GameEvent::TurnEnd, id);
    assert!(game.dispatcher.is_empty());

    game.fire(GameEvent::TurnEnd, &GameEventArgs::new(p(0)));
    assert!(log.borrow().is_empty());
}

#[test]
fn unregister_wrong_event_is_a_no_op() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    let id = game
        .dispatcher
        .register(GameEvent::TurnEnd, None, tagged(&log, "x"));

    game.dispatcher.unregister(GameEvent::TurnStart, id);
    assert!(game.dispatcher.contains(id));

    game.fire(GameEvent::TurnEnd, &GameEventArgs::new(p(0)));
    assert_eq!(*log.borrow(), vec!["x"]);
}

#[test]
fn same_trigger_on_multiple_events() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    let trigger = tagged(&log, "both");
    game.dispatcher
        .register(GameEvent::TurnStart, None, trigger.clone());
    game.dispatcher
        .register(GameEvent::TurnEnd, None, trigger);

    let args = GameEventArgs::new(p(0));
    game.fire(GameEvent::TurnStart, &args);
    game.fire(GameEvent::TurnEnd, &args);

    assert_eq!(*log.borrow(), vec!["both", "both"]);
}

#[test]
fn set_owner_moves_the_ownership_gate() {
    let mut game = Game::new(3, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    let sink = log.clone();
    let trigger = Trigger::relay(
        Rc::new(move |_: &mut Game, ctx: &TriggerContext<'_>| {
            sink.borrow_mut().push(ctx.owner);
        }),
        TriggerCondition::OwnerIsSource,
    );
    let id = game
        .dispatcher
        .register(GameEvent::PhaseStart, Some(p(0)), trigger);

    game.fire(GameEvent::PhaseStart, &GameEventArgs::new(p(0)));
    assert_eq!(*log.borrow(), vec![Some(p(0))]);

    assert!(game.dispatcher.set_owner(id, Some(p(2))));

    // The old owner no longer matches; the new one does and the context
    // reflects the reassignment.
    game.fire(GameEvent::PhaseStart, &GameEventArgs::new(p(0)));
    game.fire(GameEvent::PhaseStart, &GameEventArgs::new(p(2)));
    assert_eq!(*log.borrow(), vec![Some(p(0)), Some(p(2))]);
}

#[test]
fn set_owner_on_unknown_id_reports_false() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    let id = game
        .dispatcher
        .register(GameEvent::PhaseStart, None, tagged(&log, "x"));
    game.dispatcher.unregister(GameEvent::PhaseStart, id);

    assert!(!game.dispatcher.set_owner(id, Some(p(1))));
}

#[test]
fn reentrant_fire_preserves_outer_order() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    game.dispatcher
        .register(GameEvent::CardsLost, None, tagged(&log, "nested"));

    let sink = log.clone();
    let outer = Trigger::relay(
        Rc::new(move |game: &mut Game, ctx: &TriggerContext<'_>| {
            sink.borrow_mut().push("outer");
            game.fire(GameEvent::CardsLost, &GameEventArgs::new(ctx.args.source));
        }),
        TriggerCondition::Global,
    )
    .with_priority(1);
    game.dispatcher.register(GameEvent::CardUsed, None, outer);
    game.dispatcher
        .register(GameEvent::CardUsed, None, tagged(&log, "after"));

    game.fire(GameEvent::CardUsed, &GameEventArgs::new(p(0)));

    assert_eq!(*log.borrow(), vec!["outer", "nested", "after"]);
}

#[test]
fn trigger_removed_mid_fire_does_not_run() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    let victim = game.dispatcher.register(
        GameEvent::DamageInflicted,
        None,
        tagged(&log, "victim").with_priority(-1),
    );
    let killer = Trigger::relay(
        Rc::new(move |game: &mut Game, _: &TriggerContext<'_>| {
            game.dispatcher.unregister(GameEvent::DamageInflicted, victim);
        }),
        TriggerCondition::Global,
    )
    .with_priority(1);
    game.dispatcher
        .register(GameEvent::DamageInflicted, None, killer);

    game.fire(GameEvent::DamageInflicted, &GameEventArgs::new(p(0)));

    assert!(log.borrow().is_empty());
}

#[test]
fn trigger_added_mid_fire_waits_for_next_fire() {
    let mut game = Game::new(2, 1);
    let log = Rc::new(RefCell::new(Vec::new()));

    let sink = log.clone();
    let registrar = Trigger::relay(
        Rc::new(move |game: &mut Game, _: &TriggerContext<'_>| {
            let sink = sink.clone();
            let late = Trigger::relay(
                Rc::new(move |_, _| sink.borrow_mut().push("late")),
                TriggerCondition::Global,
            )
            .with_priority(i32::MAX);
            game.dispatcher.register(GameEvent::PlayerDying, None, late);
        }),
        TriggerCondition::Global,
    );
    game.dispatcher
        .register(GameEvent::PlayerDying, None, registrar);

    let args = GameEventArgs::new(p(0));
    game.fire(GameEvent::PlayerDying, &args);
    assert!(log.borrow().is_empty());

    game.fire(GameEvent::PlayerDying, &args);
    assert_eq!(*log.borrow(), vec!["late"]);
}
