//! `studybuddy chat`: interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use studybuddy_agent::{AgentResult, ModelGateway, StudyBuddy};
use studybuddy_config::AppConfig;
use studybuddy_core::event::{DomainEvent, EventBus};
use studybuddy_store::build_store;

pub async fn run(
    message: Option<String>,
    materials: Vec<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    // Check for API key early, with a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    STUDYBUDDY_API_KEY=...   (generic)");
        eprintln!("    OPENAI_API_KEY=sk-...    (OpenAI)");
        eprintln!("    OPENROUTER_API_KEY=...   (OpenRouter)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = studybuddy_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let store = build_store(&config.storage).await?;

    let event_bus = Arc::new(EventBus::default());
    let session = StudyBuddy::from_config(
        ModelGateway::from_config(provider, &config),
        store.clone(),
        &config.agent,
    )?
    .with_event_bus(event_bus.clone());

    if verbose {
        spawn_event_printer(&event_bus);
    }

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let result = session.run(&msg, &materials).await;
        eprint!("\r              \r");
        let result = result?;
        if verbose {
            print_thought_process(&result);
        }
        println!("{}", result.final_answer);
        return Ok(());
    }

    println!();
    println!("  StudyBuddy, interactive mode");
    println!();
    println!("  Provider:   {}", config.default_provider);
    println!("  Model:      {}", config.default_model);
    println!("  Materials:  {}", store.count().await?);
    if !materials.is_empty() {
        println!("  Focus:      {}", materials.join(", "));
    }
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "exit" || line == "quit" {
            break;
        }
        if line.is_empty() {
            prompt()?;
            continue;
        }

        eprint!("  ...");
        match session.run(line, &materials).await {
            Ok(result) => {
                eprint!("\r     \r");
                if verbose {
                    print_thought_process(&result);
                }
                println!();
                for text in result.final_answer.lines() {
                    println!("  StudyBuddy > {text}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_thought_process(result: &AgentResult) {
    for (i, entry) in result.thought_process.iter().enumerate() {
        eprintln!("  [{}] Thought: {}", i + 1, entry.thought);
        if let Some(id) = &entry.action_id {
            eprintln!(
                "      Action: {id}({})",
                entry.action_input.as_deref().unwrap_or_default()
            );
        }
        eprintln!("      Observation: {}", entry.observation.replace('\n', " "));
    }
    eprintln!("  ({} model calls, {:?})", result.iterations, result.outcome);
}

fn spawn_event_printer(event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event.as_ref() {
                DomainEvent::ResponseGenerated {
                    model,
                    iteration,
                    duration_ms,
                    ..
                } => eprintln!("  · {model} replied (iteration {iteration}, {duration_ms} ms)"),
                DomainEvent::ToolExecuted {
                    tool_name,
                    success,
                    duration_ms,
                    ..
                } => eprintln!("  · {tool_name} {} in {duration_ms} ms", if *success { "ran" } else { "failed" }),
                DomainEvent::ActionRejected { reason, .. } => eprintln!("  · rejected: {reason}"),
                _ => {}
            }
        }
    });
}
