//! services/api/src/bin/runner.rs
//!
//! A terminal interview runner: drives the interview flow against either the
//! in-process engine (offline/dev mode) or a remote interview API, selected
//! once at startup from configuration. Each line typed on stdin is submitted
//! as the answer to the current question.

use api_lib::{
    adapters::{FileAutosaveStore, HttpInterviewBackend, MemorySessionStore},
    config::Config,
    engine::{EngineConfig, InterviewEngine},
    error::ApiError,
    questions::question_pool,
};
use chrono::Duration as ChronoDuration;
use interview_core::flow::{
    FinalReport, FlowCommand, FlowConfig, FlowEvent, FlowHandle, InterviewFlow,
};
use interview_core::ports::{AutosaveStore, InterviewBackend};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Backend selection is a startup decision, never inferred per call.
    let backend: Arc<dyn InterviewBackend> = match &config.interview_api_url {
        Some(url) => {
            info!("Using remote interview backend at {url}");
            Arc::new(HttpInterviewBackend::new(url)?)
        }
        None => {
            info!("INTERVIEW_API_URL not set; running against the in-process engine");
            let session_ttl = ChronoDuration::from_std(config.session_ttl)
                .map_err(|e| ApiError::Internal(format!("invalid SESSION_TTL_SECS: {e}")))?;
            Arc::new(InterviewEngine::new(
                Arc::new(MemorySessionStore::new()),
                None,
                question_pool(),
                EngineConfig {
                    total_questions: config.total_questions,
                    session_ttl,
                },
            ))
        }
    };

    let autosave = Arc::new(FileAutosaveStore::new(config.autosave_path.clone()));
    if let Ok(Some(snapshot)) = autosave.load().await {
        println!(
            "(recovered an unsent draft for question {}: \"{}\")",
            snapshot.question_id, snapshot.draft
        );
    }

    let (flow, handle) = InterviewFlow::new(
        backend,
        Some(autosave),
        FlowConfig {
            total_questions: config.total_questions,
            question_time_limit: config.question_time_limit,
        },
    );

    println!("Welcome to the interview. You will be asked {} questions;", config.total_questions);
    println!(
        "each has a {}-second budget. Type your answer and press Enter.",
        config.question_time_limit.as_secs()
    );
    println!();

    let run = tokio::spawn(flow.run());
    drive_terminal(handle).await;

    match run.await {
        Ok(Ok(outcome)) => {
            use interview_core::flow::FlowOutcome;
            match outcome {
                FlowOutcome::Completed(report) => print_report(&report).await,
                FlowOutcome::Abandoned => println!("Interview abandoned."),
            }
        }
        Ok(Err(e)) => {
            eprintln!("The interview could not be started: {e}");
            eprintln!("Check INTERVIEW_API_URL, or unset it to run offline.");
        }
        Err(e) => warn!("flow task failed: {e}"),
    }
    Ok(())
}

/// Pumps stdin lines into the flow and renders its events until it finishes.
async fn drive_terminal(mut handle: FlowHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = handle.events.recv() => match event {
                Some(event) => render_event(event),
                // The flow is done and dropped its sender.
                None => break,
            },
            line = lines.next_line() => {
                if let Ok(Some(text)) = line {
                    if !text.trim().is_empty() {
                        let _ = handle.commands.send(FlowCommand::Draft(text)).await;
                        let _ = handle.commands.send(FlowCommand::Submit).await;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nAbandoning the interview...");
                handle.cancel.cancel();
            }
        }
    }
}

fn render_event(event: FlowEvent) {
    match event {
        FlowEvent::QuestionPresented {
            index, question, ..
        } => {
            println!();
            println!("Question {}: {}", index + 1, question.text);
        }
        FlowEvent::Tick { seconds_left } => {
            // Don't spam the terminal: announce the half-minute marks and the
            // final ten seconds.
            if seconds_left > 0 && (seconds_left % 30 == 0 || seconds_left <= 10) {
                println!("  ({seconds_left}s left)");
            }
        }
        FlowEvent::AnswerRecorded {
            accepted_by_backend,
            ..
        } => {
            if accepted_by_backend {
                println!("  answer saved.");
            } else {
                println!("  answer kept locally (the backend did not confirm the save).");
            }
        }
        FlowEvent::TurnAbandoned { .. } => {
            println!("  time is up, moving on.");
        }
        FlowEvent::Error { message } => eprintln!("error: {message}"),
        FlowEvent::Phase(_) | FlowEvent::Completed(_) => {}
    }
}

async fn print_report(report: &FinalReport) {
    use interview_core::flow::ArtifactOrigin;

    println!();
    println!("=== Interview finished ===");
    if let Some(result) = &report.result {
        println!(
            "Score: {}/100  ({} questions answered, {:.0}% complete)",
            result.performance_score, result.questions_answered, result.completion_rate
        );
    } else {
        println!("Tier (estimated locally): {}", report.tier.label());
    }
    if report.summary_origin == ArtifactOrigin::Heuristic {
        println!("(the analysis below was estimated locally)");
    }
    println!();
    println!("{}", report.summary);

    match tokio::fs::write("interview_glyph.svg", &report.glyph.svg).await {
        Ok(()) => println!("\nYour glyph was saved to interview_glyph.svg"),
        Err(e) => eprintln!("could not write the glyph file: {e}"),
    }
}
