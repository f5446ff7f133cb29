use caseflow::config::Config;
use schemars::schema_for;

/// Print the config JSON Schema, for editor completion of `caseflow.yaml`
pub fn execute() -> anyhow::Result<()> {
    let schema = schema_for!(Config);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{}", json);
    Ok(())
}
