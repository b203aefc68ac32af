//! Worklist CLI - runs task queues built on the worklist object model.

use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use worklist_core::{shared, Container, Registry};
use worklist_work::{
    AddTask, ArithmeticTask, CleanupTask, Executor, ExecutorConfig, ObjectsInProgramCountTask,
    Operation, TaskQueue, TaskRef, TasksWithResultCountTask,
};

#[derive(Parser)]
#[command(name = "worklist")]
#[command(about = "Doubly-linked task queues and the tasks that run on them", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sample queue, print pending statuses, then drain it
    Demo {
        /// Print the drain summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a single arithmetic task
    #[command(allow_negative_numbers = true)]
    Calc {
        /// Left operand (integer or float)
        left: String,
        /// Operation
        #[arg(value_enum)]
        op: OpArg,
        /// Right operand (integer or float)
        right: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OpArg {
    Add,
    Sub,
    Mul,
    Div,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Demo { json } => run_demo(json),
        Commands::Calc { left, op, right } => run_calc(&left, parse_op(op), &right),
    }
}

/// Ten tasks mixing arithmetic, counting and queue mutation.
fn build_tasks(registry: &Registry, queue: &TaskQueue) -> Vec<TaskRef> {
    vec![
        Rc::new(ArithmeticTask::new(registry, 1.0_f64, 2.0, Operation::Add)),
        Rc::new(ObjectsInProgramCountTask::new(registry)),
        Rc::new(TasksWithResultCountTask::new(registry, queue)),
        Rc::new(AddTask::new(
            registry,
            Rc::new(TasksWithResultCountTask::new(registry, queue)),
            queue,
        )),
        Rc::new(TasksWithResultCountTask::new(registry, queue)),
        Rc::new(ArithmeticTask::new(registry, 1, 2, Operation::Subtract)),
        Rc::new(ArithmeticTask::new(registry, 1, 2, Operation::Multiply)),
        Rc::new(ArithmeticTask::new(registry, 1, 2, Operation::Divide)),
        Rc::new(CleanupTask::new(registry, queue)),
        Rc::new(TasksWithResultCountTask::new(registry, queue)),
    ]
}

fn run_demo(json: bool) -> Result<()> {
    let registry = Registry::new();
    let queue: TaskQueue = shared(Container::new());
    let tasks = build_tasks(&registry, &queue);

    {
        let mut queue = queue.borrow_mut();
        for (i, task) in tasks.iter().enumerate() {
            if i % 2 == 0 {
                queue.push_back(Rc::clone(task));
            } else {
                queue.push_front(Rc::clone(task));
            }
        }
    }

    let live_before = registry.live();
    let pending: Container<String> = queue.borrow().iter().map(|t| t.to_string()).collect();

    let executor = Executor::new().with_config(ExecutorConfig::new().with_stop_on_error(false));
    let summary = executor.drain(&queue)?;

    drop(tasks);
    let live_after = registry.live();
    info!(live_before, live_after, executed = summary.executed(), "demo finished");

    if json {
        let out = serde_json::json!({
            "live_before": live_before,
            "pending": pending.iter().collect::<Vec<_>>(),
            "summary": summary,
            "live_after": live_after,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", live_before);
    for info in &pending {
        println!("{}", info);
    }
    println!("\nNow tasks are going to be executed\n");
    for status in summary.statuses() {
        println!("{}", status);
    }
    println!("{}", live_after);

    Ok(())
}

fn run_calc(left: &str, operation: Operation, right: &str) -> Result<()> {
    let registry = Registry::new();
    let task: TaskRef = match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(l), Ok(r)) => Rc::new(ArithmeticTask::new(&registry, l, r, operation)),
        _ => {
            let l: f64 = left
                .parse()
                .with_context(|| format!("invalid operand: {}", left))?;
            let r: f64 = right
                .parse()
                .with_context(|| format!("invalid operand: {}", right))?;
            Rc::new(ArithmeticTask::new(&registry, l, r, operation))
        }
    };

    let report = Executor::new().run(&*task);
    println!("{}", report.status);
    match report.error {
        Some(error) => anyhow::bail!(error),
        None => Ok(()),
    }
}

fn parse_op(op: OpArg) -> Operation {
    match op {
        OpArg::Add => Operation::Add,
        OpArg::Sub => Operation::Subtract,
        OpArg::Mul => Operation::Multiply,
        OpArg::Div => Operation::Divide,
    }
}
