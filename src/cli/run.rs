use crate::cli::RunArgs;
use caseflow::config::Config;
use caseflow::dispatch::CommandDispatcher;
use caseflow::output::write_review;
use caseflow::runner::{ExecutionObserver, TaskExecutor, TracingObserver};
use caseflow::session::SessionScript;
use caseflow::workflow::{OverallStatus, PlanTask, TaskExecutionResult, WorkflowOrchestrator};
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    // Load and validate config
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(report_dir) = args.report_dir {
        config.report_dir = report_dir;
    }
    config.validate()?;

    info!("Loading session from {:?}", args.session);
    let script = SessionScript::load(&args.session)?;

    let mut workflow = WorkflowOrchestrator::new();
    let validation = script.replay(&mut workflow)?;
    if !validation.is_valid {
        for message in &validation.errors {
            error!("{}", message);
        }
        anyhow::bail!(
            "Session stopped in {}: {}",
            workflow.phase(),
            validation.errors.join("; ")
        );
    }

    let dispatcher = CommandDispatcher::from_config(&config);
    let tasks = workflow
        .state()
        .plan
        .as_ref()
        .map(|p| p.tasks.clone())
        .unwrap_or_default();
    for task in &tasks {
        if let Some(ref call) = task.tool {
            if !dispatcher.has_tool(&call.name) {
                warn!("Task {} uses unconfigured tool '{}'", task.id, call.name);
            }
        }
    }

    if args.dry_run {
        info!("DRY RUN - no tools will be invoked");
        print_execution_plan(&config, &tasks);
        return Ok(());
    }

    let executor = TaskExecutor::new(Arc::new(dispatcher))
        .with_observer(Arc::new(TracingObserver))
        .with_observer(Arc::new(ConsoleObserver));

    // Ctrl-C cancels remaining tasks; the current one runs to completion
    let control = executor.control();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining tasks");
            control.cancel();
        }
    });

    let results = workflow.execute_plan(&executor).await;
    interrupt.abort();
    results?;

    let state = workflow.state();
    if let Err(e) = state.save(&config.state_dir) {
        warn!("Failed to save workflow snapshot: {}", e);
    }

    // Create dated report directory (reports/YYYY-MM-DD/)
    let date_str = Local::now().format("%Y-%m-%d").to_string();
    let report_dir = config.report_dir.join(&date_str);
    let report_path = write_review(&report_dir, state)?;
    info!("Review written to {:?}", report_path);

    let Some(review) = state.review.as_ref() else {
        anyhow::bail!("Execution finished without a review");
    };
    println!("\n{} ({})", review.summary, review.overall_status);
    println!("Report: {}", report_path.display());

    if args.fail_on_error && review.overall_status != OverallStatus::Success {
        error!("Exiting with error: run was {}", review.overall_status);
        std::process::exit(1);
    }

    Ok(())
}

/// One line per finished task on stdout
struct ConsoleObserver;

impl ExecutionObserver for ConsoleObserver {
    fn on_task_start(&self, task: &PlanTask) {
        println!("  → {}", task.title);
    }

    fn on_task_complete(&self, task: &PlanTask, result: &TaskExecutionResult) {
        if result.success {
            println!("  ✓ {}", task.title);
        } else {
            println!(
                "  ✗ {}: {}",
                task.title,
                result.error.as_deref().unwrap_or("failed")
            );
        }
    }
}

fn print_execution_plan(config: &Config, tasks: &[PlanTask]) {
    println!("\n=== Execution Plan ===\n");
    println!("State dir: {:?}", config.state_dir);
    println!("Report dir: {:?}", config.report_dir);

    let mut ordered: Vec<&PlanTask> = tasks.iter().collect();
    ordered.sort_by_key(|t| t.order);

    println!("\nTasks to run:");
    for task in ordered {
        let tool = task
            .tool
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        let deps = if task.dependencies.is_empty() {
            String::new()
        } else {
            format!(" after [{}]", task.dependencies.join(", "))
        };
        println!("  {}. {} ({}) tool: {}{}", task.order, task.title, task.id, tool, deps);
    }
    println!();
}
