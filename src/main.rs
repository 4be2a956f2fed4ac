use anyhow::Context;
use clap::Parser;
use numcheck::adapters::csv_input;
use numcheck::core::normalizer::normalize;
use numcheck::utils::error::{CheckerError, ErrorSeverity};
use numcheck::utils::{logger, validation, validation::Validate};
use numcheck::{bootstrap, CliCommand, CliConfig, Delivery, JsonReport, TomlConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting numcheck");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        std::process::exit(report_failure(&e));
    }
}

/// Logs the failure and returns the exit code for it.
fn report_failure(error: &anyhow::Error) -> i32 {
    let Some(e) = error.downcast_ref::<CheckerError>() else {
        tracing::error!("❌ {:#}", error);
        eprintln!("❌ {:#}", error);
        return 1;
    };

    tracing::error!(
        "❌ {:#} (Category: {:?}, Severity: {:?})",
        error,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

async fn run(cli: &CliConfig) -> anyhow::Result<()> {
    let config = cli.resolve()?;
    config.validate()?;

    match &cli.command {
        CliCommand::Check {
            numbers,
            file,
            no_notify,
            json,
        } => check(&config, numbers.as_deref(), file.as_deref(), *no_notify, *json).await,
        CliCommand::SetTarget { number } => {
            let app = bootstrap(&config).await?;
            let target = app.service.set_target(number).await?;
            println!("✅ Notification target set to {}", target.identifier());
            Ok(())
        }
        CliCommand::ShowTarget => {
            let app = bootstrap(&config).await?;
            match app.service.target().await {
                Some(target) => println!("{}", target.identifier()),
                None => println!("No notification target set. Use `numcheck set-target <number>`."),
            }
            Ok(())
        }
        CliCommand::Chat => chat(&config).await,
    }
}

async fn check(
    config: &TomlConfig,
    numbers: Option<&str>,
    file: Option<&str>,
    no_notify: bool,
    json: bool,
) -> anyhow::Result<()> {
    if numbers.is_none() && file.is_none() {
        return Err(CheckerError::MissingConfigError {
            field: "numbers or --file".to_string(),
        }
        .into());
    }

    let mut identifiers = numbers.map(normalize).unwrap_or_default();
    if let Some(path) = file {
        validation::validate_file_extension("file", path, &["csv", "txt"])?;
        let from_file = csv_input::read_number_file(path)
            .with_context(|| format!("reading numbers from {}", path))?;
        tracing::info!("Read {} numbers from {}", from_file.len(), path);
        identifiers.extend(from_file);
    }

    let app = bootstrap(config).await?;
    app.refresh_session().await;

    let delivery = if no_notify {
        Delivery::Skip
    } else {
        app.default_delivery()
    };
    let report = app.service.check_identifiers(identifiers, delivery).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&JsonReport::from(&report))?);
    } else {
        println!("{}", report.text);
    }
    if let Some(outcome) = &report.notification {
        if !outcome.is_delivered() {
            tracing::warn!("Summary was not delivered: {}", outcome);
        }
        eprintln!("📨 Notification: {}", outcome);
    }

    if !report.result.is_empty() && report.result.error_count() == report.result.len() {
        tracing::warn!("Every lookup failed; check the bridge connection");
    }
    Ok(())
}

/// Line protocol: `<sender>: <message>` in, `<sender>: <reply>` out.
async fn chat(config: &TomlConfig) -> anyhow::Result<()> {
    let app = bootstrap(config).await?;
    let handler = app.command_handler();
    tracing::info!("Chat mode ready, reading messages from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some((sender, text)) = line.split_once(':') else {
            if !line.trim().is_empty() {
                tracing::warn!("Ignoring line without a sender: {}", line);
            }
            continue;
        };
        let sender = sender.trim();

        let state = app.refresh_session().await;
        tracing::debug!(sender, "Session state before message: {}", state);
        if let Some(reply) = handler.handle(sender, text.trim()).await {
            for reply_line in reply.lines() {
                println!("{}: {}", sender, reply_line);
            }
        }
    }

    tracing::info!("stdin closed, leaving chat mode");
    Ok(())
}
