//! Scheduler tick integration tests: world time, frame and fixed phases,
//! and signals delivered through the ECS message queue.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bevy_ecs::prelude::*;

use cadence::actionlist::ActionList;
use cadence::actions::ScheduledAction;
use cadence::actions::signal::SignalEmitter;
use cadence::actions::timed::{Looper, Wait};
use cadence::events::actionsignal::ActionSignal;
use cadence::resources::actionscheduler::{ActionScheduler, ListHandle, UpdatePhase};
use cadence::resources::fixedclock::FixedClock;
use cadence::resources::schedulerconfig::SchedulerConfig;
use cadence::resources::signalbridge::{SignalBridge, setup_signal_bridge};
use cadence::resources::worldtime::WorldTime;
use cadence::systems::actionlist::{update_fixed_action_lists, update_frame_action_lists};
use cadence::systems::signals::{poll_action_signals, update_action_signal_messages};
use cadence::systems::time::update_world_time;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Resource, Default)]
struct Received(Vec<ActionSignal>);

fn collect_signals(mut reader: MessageReader<ActionSignal>, mut received: ResMut<Received>) {
    received.0.extend(reader.read().cloned());
}

fn make_world(time_scale: f64, fixed_timestep: f64) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(time_scale));
    world.insert_resource(FixedClock::new(fixed_timestep));
    world.init_resource::<Received>();
    setup_signal_bridge(&mut world);
    world.insert_non_send_resource(ActionScheduler::new());
    world
}

fn make_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            update_fixed_action_lists,
            update_frame_action_lists,
            poll_action_signals,
            update_action_signal_messages,
            collect_signals,
        )
            .chain(),
    );
    schedule
}

fn register(world: &mut World, phase: UpdatePhase, list: ActionList) -> ListHandle {
    world
        .non_send_resource_mut::<ActionScheduler>()
        .register(phase, list)
}

fn first_elapsed(world: &World, handle: ListHandle) -> f64 {
    world
        .non_send_resource::<ActionScheduler>()
        .get(handle)
        .and_then(|list| list.iter().next())
        .map(ScheduledAction::elapsed)
        .unwrap()
}

#[test]
fn update_world_time_applies_time_scale() {
    let mut world = make_world(0.5, 1.0 / 60.0);
    update_world_time(&mut world, 0.2);
    update_world_time(&mut world, 0.2);
    let time = world.resource::<WorldTime>();
    assert!(approx_eq(time.elapsed, 0.2));
    assert!(approx_eq(time.delta, 0.1));
    assert!(approx_eq(time.unscaled_delta, 0.2));
    assert_eq!(time.frame_count, 2);
}

#[test]
fn frame_lists_honour_time_scale_unless_ignoring_it() {
    let mut world = make_world(0.5, 1.0 / 60.0);
    let mut scaled = SchedulerConfig::new().new_list();
    scaled.push(ScheduledAction::new(Wait::new(10.0)));
    let mut config = SchedulerConfig::new();
    config.ignore_time_scale = true;
    let mut unscaled = config.new_list();
    unscaled.push(ScheduledAction::new(Wait::new(10.0)));

    let scaled = register(&mut world, UpdatePhase::Frame, scaled);
    let unscaled = register(&mut world, UpdatePhase::Frame, unscaled);

    let mut schedule = make_schedule();
    update_world_time(&mut world, 1.0);
    schedule.run(&mut world);

    assert!(approx_eq(first_elapsed(&world, scaled), 0.5));
    assert!(approx_eq(first_elapsed(&world, unscaled), 1.0));
}

#[test]
fn fixed_lists_step_once_per_timestep() {
    let mut world = make_world(1.0, 0.25);
    let steps = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&steps);
    let mut list = SchedulerConfig::new().new_list();
    list.push_action(Looper::new(move |ctx, _| s.borrow_mut().push(ctx.dt())));
    register(&mut world, UpdatePhase::Fixed, list);

    let frame_hits = Rc::new(Cell::new(0));
    let f = Rc::clone(&frame_hits);
    let mut frame_list = SchedulerConfig::new().new_list();
    frame_list.push_action(Looper::new(move |_, _| f.set(f.get() + 1)));
    register(&mut world, UpdatePhase::Frame, frame_list);

    let mut schedule = make_schedule();
    update_world_time(&mut world, 1.0);
    schedule.run(&mut world);
    assert_eq!(*steps.borrow(), vec![0.25; 4]);
    assert_eq!(frame_hits.get(), 1);

    // Not enough for a whole step: only the frame list runs.
    update_world_time(&mut world, 0.1);
    schedule.run(&mut world);
    assert_eq!(steps.borrow().len(), 4);
    assert_eq!(frame_hits.get(), 2);
}

#[test]
fn signals_reach_the_message_queue() {
    let mut world = make_world(1.0, 1.0 / 60.0);
    let sender = world.resource::<SignalBridge>().sender();
    let mut list = SchedulerConfig::new().new_list();
    list.push(ScheduledAction::new(SignalEmitter::new(
        sender.clone(),
        ActionSignal::new("spawn").with_payload(3.0),
    )));
    list.push(
        ScheduledAction::new(SignalEmitter::new(sender, ActionSignal::new("late")))
            .with_delay(0.5),
    );
    register(&mut world, UpdatePhase::Frame, list);

    let mut schedule = make_schedule();
    update_world_time(&mut world, 0.25);
    schedule.run(&mut world);
    assert_eq!(
        world.resource::<Received>().0,
        vec![ActionSignal::new("spawn").with_payload(3.0)]
    );

    update_world_time(&mut world, 0.25);
    schedule.run(&mut world);
    update_world_time(&mut world, 0.25);
    schedule.run(&mut world);
    let names: Vec<_> = world
        .resource::<Received>()
        .0
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["spawn", "late"]);
    assert_eq!(world.non_send_resource::<ActionScheduler>().pending_actions(), 0);
}

#[test]
fn deregistered_lists_stop_updating() {
    let mut world = make_world(1.0, 1.0 / 60.0);
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let mut list = SchedulerConfig::new().new_list();
    list.push_action(Looper::new(move |_, _| h.set(h.get() + 1)));
    let handle = register(&mut world, UpdatePhase::Frame, list);

    let mut schedule = make_schedule();
    update_world_time(&mut world, 0.1);
    schedule.run(&mut world);
    assert_eq!(hits.get(), 1);

    let removed = world
        .non_send_resource_mut::<ActionScheduler>()
        .deregister(handle);
    assert_eq!(removed.map(|l| l.len()), Some(1));

    update_world_time(&mut world, 0.1);
    schedule.run(&mut world);
    assert_eq!(hits.get(), 1);
    assert!(world.non_send_resource::<ActionScheduler>().is_empty());
}
