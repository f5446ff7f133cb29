use crate::cli::StatusArgs;
use caseflow::config::Config;
use caseflow::workflow::ConversationWorkflowState;

pub fn execute(args: StatusArgs) -> anyhow::Result<()> {
    let config = Config::load_or_default(&args.config)?;
    let Some(state) = ConversationWorkflowState::load(&config.state_dir)? else {
        println!("No saved workflow in {:?}", config.state_dir);
        return Ok(());
    };

    println!("Session: {}", state.session_id);
    println!("Phase: {}", state.phase);
    if !state.clarification.original_request.is_empty() {
        println!("Request: {}", state.clarification.original_request);
    }

    if let Some(ref plan) = state.plan {
        let confirmed = if plan.is_confirmed() { "confirmed" } else { "draft" };
        println!("\nPlan: {} (v{}, {})", plan.title, plan.version, confirmed);
        for task in &plan.tasks {
            println!("  [{}] {}", task.status, task.title);
        }
    }

    let progress = &state.execution.progress;
    if progress.total_tasks > 0 {
        println!(
            "\nProgress: {}% ({} done, {} failed of {})",
            progress.percentage,
            progress.completed_tasks,
            progress.failed_tasks,
            progress.total_tasks
        );
    }

    if let Some(ref review) = state.review {
        println!("\nReview: {} ({})", review.summary, review.overall_status);
    }

    Ok(())
}
