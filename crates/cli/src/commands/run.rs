//! `agentic run`: One task, or an interactive loop over stdin.

use std::path::Path;

use agentic_agent::AgentRuntime;
use agentic_core::agent::{Agent, AgentResult, AgentTask};
use agentic_core::error::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

use super::{CmdResult, load_config};

pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
    session: Option<String>,
    max_steps: Option<u32>,
    verbose: bool,
) -> CmdResult {
    let mut config = load_config(config_path)?;
    if let Some(steps) = max_steps {
        config.agent.max_steps = steps;
    }
    let runtime = AgentRuntime::from_config(&config).await?;

    match message {
        Some(instruction) => {
            let task = task_for(instruction, session.as_deref());
            let result = run_cancellable(&runtime, task).await?;
            print!("{}", render(&result, verbose));
        }
        None => interactive(&runtime, session.as_deref(), verbose).await?,
    }
    Ok(())
}

fn task_for(instruction: String, session: Option<&str>) -> AgentTask {
    let task = AgentTask::new(instruction);
    match session {
        Some(id) => task.with_session(id),
        None => task,
    }
}

/// Run one task; Ctrl-C cancels it.
async fn run_cancellable(runtime: &AgentRuntime, task: AgentTask) -> Result<AgentResult, Error> {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let result = runtime.agent.run(task, cancel).await;
    watcher.abort();
    result
}

async fn interactive(runtime: &AgentRuntime, session: Option<&str>, verbose: bool) -> CmdResult {
    eprintln!();
    eprintln!("  agentic interactive mode");
    eprintln!(
        "  Session: {}   Tools: {}",
        session.unwrap_or(agentic_core::DEFAULT_SESSION),
        runtime.tools.names().join(", ")
    );
    eprintln!("  Type 'exit' to quit. Ctrl+C cancels the running task.");
    eprintln!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        match run_cancellable(runtime, task_for(line.to_string(), session)).await {
            Ok(result) => {
                stdout.write_all(render(&result, verbose).as_bytes()).await?;
            }
            Err(e) if e.is_cancelled() => eprintln!("  [cancelled]"),
            Err(e) => eprintln!("  [error] {e}"),
        }
    }
    Ok(())
}

fn render(result: &AgentResult, verbose: bool) -> String {
    let mut out = format!("{}\n", result.output);
    if verbose {
        out.push_str(&format!(
            "-- {} step(s), {} tool call(s)\n",
            result.steps,
            result.tool_invocations.len()
        ));
        for invocation in &result.tool_invocations {
            out.push_str(&format!(
                "   {} {} -> {}\n",
                invocation.tool_name,
                serde_json::Value::Object(invocation.arguments.clone()),
                invocation.result
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentic_core::agent::ToolInvocation;
    use serde_json::json;

    fn sample() -> AgentResult {
        AgentResult {
            output: "4".into(),
            steps: 2,
            tool_invocations: vec![ToolInvocation {
                tool_name: "calculator".into(),
                arguments: json!({"expr": "2+2"}).as_object().cloned().unwrap(),
                result: json!({"result": 4}),
            }],
        }
    }

    #[test]
    fn quiet_render_is_just_the_output() {
        assert_eq!(render(&sample(), false), "4\n");
    }

    #[test]
    fn verbose_render_lists_tool_calls() {
        let text = render(&sample(), true);
        assert!(text.contains("2 step(s), 1 tool call(s)"));
        assert!(text.contains(r#"calculator {"expr":"2+2"} -> {"result":4}"#));
    }

    #[test]
    fn session_is_optional() {
        assert_eq!(task_for("x".into(), None).session_id, None);
        assert_eq!(
            task_for("x".into(), Some("s1")).session_id.as_deref(),
            Some("s1")
        );
    }
}
