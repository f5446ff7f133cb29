use crate::cli::ValidateArgs;
use caseflow::session::SessionScript;
use caseflow::workflow::WorkflowOrchestrator;

pub fn execute(args: ValidateArgs) -> anyhow::Result<()> {
    let script = SessionScript::load(&args.session)?;
    let mut workflow = WorkflowOrchestrator::new();
    let validation = script.replay(&mut workflow)?;

    if !validation.is_valid {
        for message in &validation.errors {
            println!("✗ {}", message);
        }
        anyhow::bail!(
            "Session is not ready to execute (stopped in {})",
            workflow.phase()
        );
    }

    let tasks = workflow
        .state()
        .plan
        .as_ref()
        .map(|p| p.tasks.len())
        .unwrap_or(0);
    println!("✓ Session is valid: {} task(s) ready to execute", tasks);
    Ok(())
}
