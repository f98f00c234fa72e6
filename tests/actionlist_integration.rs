//! Action list scenarios driven through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cadence::actionlist::ActionList;
use cadence::actions::{Action, ActionContext, ScheduledAction, Span};
use cadence::actions::instant::{FunctionCaller, Setter};
use cadence::actions::interpolator::Interpolator;
use cadence::actions::second_order::SecondOrder;
use cadence::actions::timed::{Condition, Looper, Wait};
use cadence::dynamics::DynamicsParams;
use cadence::value::{Value, ValueRef};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn scalar(v: &ValueRef) -> f64 {
    v.read().as_scalar().unwrap()
}

/// Timed action that records what the list does to it.
struct Recorder {
    seconds: f64,
    log: Rc<RefCell<Vec<String>>>,
}

impl Action for Recorder {
    fn span(&self) -> Span {
        Span::seconds(self.seconds)
    }

    fn enter(&mut self, _ctx: &mut ActionContext<'_>) {
        self.log.borrow_mut().push("enter".into());
    }

    fn update(&mut self, progress: f64, ctx: &mut ActionContext<'_>) {
        self.log
            .borrow_mut()
            .push(format!("update {:.1} {:.2}", ctx.elapsed(), progress));
    }

    fn exit(&mut self, _ctx: &mut ActionContext<'_>) {
        self.log.borrow_mut().push("exit".into());
    }
}

#[test]
fn instant_and_timed_actions_over_three_frames() {
    let calls = Rc::new(Cell::new(0));
    let log = Rc::new(RefCell::new(Vec::new()));

    let mut list = ActionList::new();
    let c = Rc::clone(&calls);
    list.push_action(FunctionCaller::new(move || c.set(c.get() + 1)));
    list.push_action(Recorder {
        seconds: 2.0,
        log: Rc::clone(&log),
    });

    list.update(1.0);
    assert_eq!(calls.get(), 1);
    assert_eq!(list.len(), 1);
    let timed = list.iter().next().unwrap();
    assert!(approx_eq(timed.elapsed(), 1.0));
    assert!(!timed.is_done());
    assert_eq!(*log.borrow(), vec!["enter", "update 1.0 0.50"]);

    list.update(1.0);
    assert_eq!(calls.get(), 1);
    assert!(list.is_empty());
    assert_eq!(
        *log.borrow(),
        vec!["enter", "update 1.0 0.50", "update 2.0 1.00", "exit"]
    );

    list.update(1.0);
    assert_eq!(calls.get(), 1);
    assert!(list.is_empty());
    assert_eq!(log.borrow().len(), 4);
    assert_eq!(list.frame(), 3);
}

#[test]
fn condition_gate_releases_a_group() {
    let open = Rc::new(Cell::new(false));
    let (door, _cell) = ValueRef::new_cell(0.0);

    let mut list = ActionList::new();
    let o = Rc::clone(&open);
    list.push(ScheduledAction::new(Condition::new(move || o.get())).blocking(&[2]));
    list.push(ScheduledAction::new(Setter::new(door.clone(), 1.0)).in_groups(&[2]));

    for _ in 0..5 {
        list.update(0.1);
    }
    assert!(approx_eq(scalar(&door), 0.0));
    assert_eq!(list.len(), 2);

    open.set(true);
    // The condition finishes this frame, so the setter is no longer blocked
    // when the walk reaches it.
    list.update(0.1);
    assert!(approx_eq(scalar(&door), 1.0));
    assert!(list.is_empty());
}

#[test]
fn reversal_unwinds_a_tween_back_to_its_start() {
    let (gauge, _cell) = ValueRef::new_cell(0.0);
    let mut list = ActionList::new();
    list.push_action(Interpolator::between(gauge.clone(), 0.0, 10.0, 4.0));
    let mut asked = false;
    list.push_action(Looper::timed(3.0, move |ctx, _| {
        if !asked && ctx.elapsed() >= 2.0 {
            asked = true;
            ctx.reverse_list();
        }
    }));

    list.update(1.0);
    assert!(approx_eq(scalar(&gauge), 2.5));
    list.update(1.0);
    assert!(approx_eq(scalar(&gauge), 5.0));
    assert!(list.is_dirty_by_reverse());
    assert!(list.iter().all(|a| a.is_reversed()));

    list.update(1.0);
    assert!(approx_eq(scalar(&gauge), 2.5));
    list.update(1.0);
    assert!(approx_eq(scalar(&gauge), 0.0));
    assert!(list.is_empty());
}

#[test]
fn spring_trails_a_tween_and_settles() {
    let (leader, _l) = ValueRef::new_cell([0.0, 0.0]);
    let (follower, _f) = ValueRef::new_cell([0.0, 0.0]);

    let mut list = ActionList::new();
    list.push_action(Interpolator::to(leader.clone(), [3.0, -6.0], 1.0));
    list.push_action(
        SecondOrder::new(DynamicsParams::new(2.0, 1.0, 0.0), leader, follower.clone())
            .finish_when_settled(1e-4),
    );

    let mut frames = 0;
    while !list.is_empty() && frames < 1200 {
        list.update(1.0 / 60.0);
        frames += 1;
    }
    assert!(list.is_empty(), "follower never settled");
    let Value::Vec2([x, y]) = follower.read() else {
        panic!("follower changed shape");
    };
    assert!((x - 3.0).abs() < 1e-3);
    assert!((y + 6.0).abs() < 1e-3);
}

#[test]
fn delayed_actions_wait_their_turn() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut list = ActionList::new();
    for (name, delay) in [("late", 0.25), ("early", 0.15), ("now", 0.0)] {
        let o = Rc::clone(&order);
        list.push(
            ScheduledAction::new(FunctionCaller::new(move || o.borrow_mut().push(name)))
                .with_delay(delay),
        );
    }
    for _ in 0..4 {
        list.update(0.1);
    }
    assert_eq!(*order.borrow(), vec!["now", "early", "late"]);
}

/// Build the same pseudo-random script twice and check both lists replay
/// identically.
#[test]
fn identical_scripts_replay_identically() {
    fn run(seed: u64) -> Vec<(usize, usize)> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut list = ActionList::new();
        for id in 0..40 {
            let t = Rc::clone(&trace);
            let mut frame = 0;
            let action = ScheduledAction::new(Looper::timed(
                rng.f64() * 2.0,
                move |_, _| {
                    t.borrow_mut().push((id, frame));
                    frame += 1;
                },
            ))
            .with_delay(rng.f64())
            .in_groups(&[rng.usize(0..4)]);
            let action = if rng.bool() {
                action.blocking(&[rng.usize(0..4)])
            } else {
                action
            };
            list.push(action);
        }
        list.push(ScheduledAction::new(Wait::new(0.25)));
        for _ in 0..300 {
            list.update(1.0 / 30.0);
        }
        trace.take()
    }

    let a = run(42);
    assert!(!a.is_empty());
    assert_eq!(a, run(42));
}

#[test]
fn fast_forward_rests_an_overdamped_follower_on_its_target() {
    let (target, _t) = ValueRef::new_cell(5.0);
    let (output, _o) = ValueRef::new_cell(0.0);
    let mut list = ActionList::new();
    list.push_action(SecondOrder::new(
        DynamicsParams::new(1.0, 2.0, 0.0),
        target,
        output.clone(),
    ));

    list.update(1.0 / 60.0);
    list.fast_forward();
    assert!(approx_eq(scalar(&output), 5.0));
    // The follower is indefinite, so it survives and keeps running.
    assert_eq!(list.len(), 1);

    list.update(1.0 / 60.0);
    let next = scalar(&output);
    assert!(next.is_finite());
    assert!(approx_eq(next, 5.0));
}
