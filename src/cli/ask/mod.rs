//! Ask command - interactive question answering
//!
//! Reads one question per line, runs it through the loop and prints the
//! verified answer, or the failure reason with any best-effort answer.

use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::domain::crag::{CragOutcome, CragRun};
use crate::infrastructure::crag::Orchestrator;

const RULE: &str = "------------------------------";

/// Arguments for the ask command
#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Print the states the loop went through for each question
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum retrieval/generation retries per question (overrides config)
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Answer a single question and exit; exit code 1 when no verified answer
    #[arg(short, long)]
    pub question: Option<String>,

    /// With --question, print the run as JSON instead of text
    #[arg(long, requires = "question")]
    pub json: bool,
}

/// Run the ask command
pub async fn run(config_path: Option<&Path>, args: AskArgs) -> anyhow::Result<ExitCode> {
    let mut config = super::bootstrap(config_path)?;

    if let Some(max_iterations) = args.max_iterations {
        config.crag.max_iterations = max_iterations;
        config.validate()?;
    }

    let orchestrator = crate::create_orchestrator(&config).await?;
    let mut out = std::io::stdout();

    match args.question {
        Some(question) => {
            let run = orchestrator.run(&question).await;
            if args.json {
                serde_json::to_writer_pretty(&mut out, &run.summary())?;
                writeln!(out)?;
            } else {
                render(&mut out, &run, args.verbose)?;
            }

            if run.outcome.is_done() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
        None => {
            let input = BufReader::new(tokio::io::stdin());
            repl(&orchestrator, input, &mut out, args.verbose, interrupted()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// The read-answer loop. Ends on `exit`/`quit`, end of input, `interrupt`
/// resolving, or an I/O error reading the next line.
pub async fn repl<R, W, I>(
    orchestrator: &Orchestrator,
    input: R,
    out: &mut W,
    verbose: bool,
    interrupt: I,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    let mut lines = input.lines();

    writeln!(out, "Agentic RAG")?;
    writeln!(
        out,
        "Max iterations: {}",
        orchestrator.config().max_iterations
    )?;
    writeln!(out, "Type 'exit' or 'quit' to stop.")?;
    writeln!(out, "{}", RULE)?;

    loop {
        write!(out, "You: ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = &mut interrupt => {
                writeln!(out, "\nGoodbye!")?;
                return Ok(());
            }
        };

        let question = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                writeln!(out, "\nGoodbye!")?;
                return Ok(());
            }
            Err(e) => {
                error!(error = %e, "Failed to read input");
                writeln!(out, "An error occurred: {}", e)?;
                return Ok(());
            }
        };

        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            writeln!(out, "Goodbye!")?;
            return Ok(());
        }

        writeln!(out, "Agent: Processing...")?;
        out.flush()?;

        let run = tokio::select! {
            run = orchestrator.run(question) => run,
            _ = &mut interrupt => {
                writeln!(out, "\nGoodbye!")?;
                return Ok(());
            }
        };

        info!(status = run.outcome.label(), iterations = run.iterations, "Answered");
        render(out, &run, verbose)?;
        writeln!(out, "{}", RULE)?;
    }
}

/// Print one run's result
pub fn render<W: Write>(out: &mut W, run: &CragRun, verbose: bool) -> std::io::Result<()> {
    if verbose {
        for state in run.trace.iter().filter(|s| !s.is_terminal()) {
            writeln!(out, "Finished Node: {}", state)?;
        }
        if run.iterations > 0 {
            writeln!(
                out,
                "Iterations: {} (final question: {})",
                run.iterations, run.final_question
            )?;
        }
    }

    match &run.outcome {
        CragOutcome::Done { answer } => writeln!(out, "\nAgent: {}\n", answer),
        CragOutcome::Failed {
            reason,
            best_answer,
        } => {
            writeln!(out, "\nAgent: Unable to give a verified answer ({})", reason)?;
            match best_answer {
                Some(answer) => writeln!(out, "Best effort answer (unverified): {}\n", answer),
                None => writeln!(out, "No answer could be produced.\n"),
            }
        }
    }
}
