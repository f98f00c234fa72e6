//! Cadence demo entry point.
//!
//! Builds a bevy world with an [`ActionScheduler`], registers a scripted
//! frame-phase list and a fixed-phase list, and steps the world a fixed
//! number of frames while logging what the actions do.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --frames 300
//! ```

use bevy_ecs::prelude::*;
use cadence::actionlist::ActionList;
use cadence::actions::ScheduledAction;
use cadence::actions::instant::FunctionCaller;
use cadence::actions::interpolator::{Easing, Interpolator};
use cadence::actions::second_order::SecondOrder;
use cadence::actions::signal::SignalEmitter;
use cadence::actions::timed::{Looper, Wait};
use cadence::events::actionsignal::ActionSignal;
use cadence::resources::actionscheduler::{ActionScheduler, UpdatePhase};
use cadence::resources::fixedclock::FixedClock;
use cadence::resources::schedulerconfig::SchedulerConfig;
use cadence::resources::signalbridge::{SignalBridge, setup_signal_bridge};
use cadence::resources::worldtime::WorldTime;
use cadence::systems::actionlist::{update_fixed_action_lists, update_frame_action_lists};
use cadence::systems::signals::{
    log_action_signals, poll_action_signals, update_action_signal_messages,
};
use cadence::systems::time::update_world_time;
use cadence::value::{SharedValue, ValueRef};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

/// Seconds per simulated frame.
const FRAME_DT: f64 = 1.0 / 60.0;

/// Group gated behind the opening tween.
const TWEEN_GROUP: usize = 0;

const TWEEN_END: [f64; 2] = [10.0, 5.0];

/// Cadence action scheduler demo
#[derive(Parser)]
#[command(version, about = "Steps a scripted set of action lists and logs the result.")]
struct Cli {
    /// Configuration file (default: ./cadence.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, value_name = "N", default_value_t = 240)]
    frames: u32,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => SchedulerConfig::with_path(path),
        None => SchedulerConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        warn!("{e}; using defaults");
    }

    if cli.dump_config {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    world.insert_resource(FixedClock::new(config.fixed_timestep));
    setup_signal_bridge(&mut world);

    let mut scheduler = ActionScheduler::new();
    let sender = world.resource::<SignalBridge>().sender();
    let (script, position, follower) = build_script(&config, sender);
    let (gauge_list, gauge) = build_gauge(&config);
    scheduler.register(UpdatePhase::Frame, script);
    scheduler.register(UpdatePhase::Fixed, gauge_list);
    world.insert_non_send_resource(scheduler);
    world.insert_resource(config);

    let mut update = Schedule::default();
    update.add_systems(
        (
            update_fixed_action_lists,
            update_frame_action_lists,
            poll_action_signals,
            update_action_signal_messages,
            log_action_signals,
        )
            .chain(),
    );

    // --------------- Main loop ---------------
    info!("Simulating {} frames", cli.frames);
    for _ in 0..cli.frames {
        update_world_time(&mut world, FRAME_DT);
        update.run(&mut world);
        if world.non_send_resource::<ActionScheduler>().pending_actions() == 0 {
            break;
        }
    }

    let time = world.resource::<WorldTime>();
    info!(
        "Stopped after {} frames ({:.3}s): position {:?}, follower {:?}, gauge {:?}",
        time.frame_count,
        time.elapsed,
        position.borrow(),
        follower.borrow(),
        gauge.borrow()
    );

    let mut scheduler = world.non_send_resource_mut::<ActionScheduler>();
    let pending = scheduler.pending_actions();
    if pending > 0 {
        info!("Fast-forwarding {pending} pending actions");
        scheduler.fast_forward_all();
        info!("{} actions left waiting", scheduler.pending_actions());
    }
}

/// The frame-phase script: a tween, a spring that trails it, and a signal
/// once the tween is over.
fn build_script(
    config: &SchedulerConfig,
    sender: crossbeam_channel::Sender<ActionSignal>,
) -> (ActionList, SharedValue, SharedValue) {
    let (position, position_cell) = ValueRef::new_cell([0.0, 0.0]);
    let (follower, follower_cell) = ValueRef::new_cell([0.0, 0.0]);

    let mut list = config.new_list();
    list.push_action(FunctionCaller::new(|| info!("script started")).with_label("start"));
    list.push(
        ScheduledAction::new(
            Interpolator::to(position.clone(), TWEEN_END, 2.0).with_easing(Easing::CubicInOut),
        )
        .blocking(&[TWEEN_GROUP]),
    );
    list.push(ScheduledAction::new(
        SecondOrder::new(config.dynamics, position, follower).finish_when_settled(1e-3),
    ));
    list.push(
        ScheduledAction::new(SignalEmitter::new(
            sender,
            ActionSignal::new("tween_done").with_payload(TWEEN_END),
        ))
        .in_groups(&[TWEEN_GROUP]),
    );
    list.push(
        ScheduledAction::new(Wait::new(0.5))
            .in_groups(&[TWEEN_GROUP])
            .blocking(&[TWEEN_GROUP]),
    );
    list.push(
        ScheduledAction::new(FunctionCaller::new(|| info!("settle window over")))
            .with_delay(2.5),
    );

    (list, position_cell, follower_cell)
}

/// The fixed-phase list: fills a gauge, then changes its mind halfway and
/// unwinds it.
fn build_gauge(config: &SchedulerConfig) -> (ActionList, SharedValue) {
    let (gauge, gauge_cell) = ValueRef::new_cell(0.0);
    let mut list = config.new_list();
    list.push_action(Interpolator::between(gauge, 0.0, 1.0, 1.0));
    let mut reversed = false;
    list.push_action(Looper::timed(1.0, move |ctx, _| {
        if !reversed && ctx.elapsed() >= 0.5 {
            reversed = true;
            info!("gauge reversing at {:.2}s", ctx.elapsed());
            ctx.reverse_list();
        }
    }));
    (list, gauge_cell)
}
