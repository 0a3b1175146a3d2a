//! Task Processing Lifecycle
//!
//! Models a simple job queue worker: every task starts as NEW, moves to
//! IN_PROGRESS once picked up, ends in SUCCESS or FAILURE, and is then post
//! processed. Explicit states make a crashed task resumable from whichever
//! stage it last reached.
//!
//! Run with: cargo run --example task_processing
//! Set RUST_LOG=microfsm=debug to see every transition.

use microfsm::core::{Event, State};
use microfsm::{Fsm, FsmError};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug)]
struct TaskConfig {
    fail_task: bool,
}

struct Task;

impl Task {
    fn execute(&self, config: TaskConfig) -> Result<(), String> {
        if config.fail_task {
            return Err("Failure".to_string());
        }
        Ok(())
    }
}

struct Lifecycle {
    new: State,
    in_progress: State,
}

fn event(name: &str) -> Result<Event, FsmError> {
    Event::of(name)
}

fn build_lifecycle(config: TaskConfig) -> Result<Lifecycle, FsmError> {
    let start_task = event("START_TASK")?;
    let task_failed = event("TASK_FAILED")?;
    let task_success = event("TASK_SUCCESS")?;
    let post_task_failure = event("POST_TASK_FAILURE")?;
    let post_task_success = event("POST_TASK_SUCCESS")?;

    let post_success = State::builder()
        .name("POST_SUCCESS")
        .on_entry(|_| {
            println!("  >>> Updating task to Success Processed <<<");
            Ok(())
        })
        .build()?;

    let success = {
        let next = post_task_success.clone();
        State::builder()
            .name("SUCCESS")
            .on_entry(move |fsm| {
                println!("  >>> Invoking onSuccess of Task <<<");
                fsm.fire_event(&next)
            })
            .on_event(post_task_success, move |fsm| {
                fsm.transition_to(post_success.clone())
            })
            .build()?
    };

    let post_failure = State::builder()
        .name("POST_FAILURE")
        .on_entry(|_| {
            println!("  >>> Updating task to Failure Processed <<<");
            Ok(())
        })
        .build()?;

    let failure = {
        let next = post_task_failure.clone();
        State::builder()
            .name("FAILURE")
            .on_entry(move |fsm| {
                println!("  >>> Invoking onFailure of Task <<<");
                fsm.fire_event(&next)
            })
            .on_event(post_task_failure, move |fsm| {
                fsm.transition_to(post_failure.clone())
            })
            .build()?
    };

    let in_progress = {
        let (ok, failed) = (task_success.clone(), task_failed.clone());
        State::builder()
            .name("IN_PROGRESS")
            .on_entry(move |fsm| {
                println!("  >>> Executing task <<<");
                match Task.execute(config) {
                    Ok(()) => fsm.fire_event(&ok),
                    Err(reason) => {
                        println!("  >>> Task execution failed: {reason} <<<");
                        fsm.fire_event(&failed)
                    }
                }
            })
            .on_event(task_failed, move |fsm| fsm.transition_to(failure.clone()))
            .on_event(task_success, move |fsm| fsm.transition_to(success.clone()))
            .build()?
    };

    let new = {
        let fire = start_task.clone();
        let target = in_progress.clone();
        State::builder()
            .name("NEW")
            .on_entry(move |fsm| fsm.fire_event(&fire))
            .on_event(start_task, move |fsm| {
                println!("  >>> Starting task <<<");
                fsm.transition_to(target.clone())
            })
            .build()?
    };

    Ok(Lifecycle { new, in_progress })
}

fn run(title: &str, initial: State) -> Result<(), FsmError> {
    println!("{title}");
    println!("----------------------------------------");

    let mut fsm = Fsm::new();
    fsm.set_initial_state(initial)?;

    println!("  History:");
    for transition in fsm.transitions() {
        println!("    {transition}");
    }
    println!();
    Ok(())
}

fn main() -> Result<(), FsmError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Task Processing Example ===\n");

    let succeeding = build_lifecycle(TaskConfig { fail_task: false })?;
    run("Run 1: Task succeeds", succeeding.new.clone())?;

    let failing = build_lifecycle(TaskConfig { fail_task: true })?;
    run("Run 2: Task fails", failing.new)?;

    run(
        "Run 3: Resume a crashed task from IN_PROGRESS",
        succeeding.in_progress,
    )?;

    println!("=== Example Complete ===");
    Ok(())
}
