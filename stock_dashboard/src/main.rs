use chrono::Local;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use stock_dashboard::cli::{parse_command, Args, Command, HELP};
use stock_dashboard::{logging, DashboardConfig, InputCollector, Pipeline, RunOutcome, Session};
use tracing::error;

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Rendered {
            ticker,
            history_rows,
            forecast_rows,
            page,
        } => println!(
            "{}: {} trading days, {} forecast rows -> {}",
            ticker,
            history_rows,
            forecast_rows,
            page.display()
        ),
        RunOutcome::Failed {
            ticker,
            message,
            page,
        } => println!("{}: {} -> {}", ticker, message, page.display()),
    }
}

fn run(args: Args) -> stock_dashboard::Result<bool> {
    let config = DashboardConfig::load(args.config.as_deref())?;

    let mut inputs = InputCollector::new(Local::now().date_naive(), config.ticker_choices()?);
    for event in args.events() {
        inputs.apply(event)?;
    }

    let pipeline = Pipeline::new(config.build_provider()?, config.build_model()?);
    let output = args.output.clone().unwrap_or_else(|| config.output.clone());
    let mut session = Session::new(inputs, pipeline, output);

    let outcome = session.refresh()?;
    report(&outcome);
    if !args.interactive {
        return Ok(outcome.is_success());
    }

    println!("{}", HELP);
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let result = match parse_command(&line) {
            Ok(Command::Input(event)) => session.handle(event),
            Ok(Command::Show) => session.refresh().map(Some),
            Ok(Command::Help) => {
                println!("{}", HELP);
                continue;
            }
            Ok(Command::Quit) => break,
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(outcome)) => report(&outcome),
            Ok(None) => println!("selection unchanged"),
            Err(e) => println!("{}", e),
        }
    }

    Ok(true)
}

fn main() -> ExitCode {
    logging::init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "stock-dashboard failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
