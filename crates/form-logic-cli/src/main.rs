use clap::{Parser, Subcommand};
use form_logic::{EngineConfig, FormDefinition, ValidationResult};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form conditional logic runner",
    long_about = "Evaluates element and option visibility for a form definition and cleans, validates or checks submissions against it"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the visibility annotation tree for a submission.
    Visibility {
        /// Path to the form definition JSON (object or bare element array).
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the submission JSON.
        #[arg(long, value_name = "SUBMISSION")]
        submission: PathBuf,
    },
    /// Remove hidden values from a submission and collect captcha tokens.
    Clean {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "SUBMISSION")]
        submission: PathBuf,
        /// Drop attachment values and content element flags.
        #[arg(long)]
        strip_binary_data: bool,
        /// Optional engine config JSON; flags take precedence.
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
    /// Validate the visible part of a submission.
    Validate {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "SUBMISSION")]
        submission: PathBuf,
    },
    /// Report duplicate ids, dangling references and circular logic.
    Check {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Print the JSON schema of a form definition.
    Schema,
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Visibility { form, submission } => run_visibility(&form, &submission),
        Command::Clean {
            form,
            submission,
            strip_binary_data,
            config,
        } => run_clean(&form, &submission, strip_binary_data, config.as_deref()),
        Command::Validate { form, submission } => run_validate(&form, &submission),
        Command::Check { form } => run_check(&form),
        Command::Schema => print_json(&schemars::schema_for!(FormDefinition)),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn run_visibility(form_path: &Path, submission_path: &Path) -> CliResult<()> {
    let form = load_form(form_path)?;
    let submission = load_submission(submission_path)?;
    let tree = form.visibility(&submission)?;
    print_json(&tree)
}

fn run_clean(
    form_path: &Path,
    submission_path: &Path,
    strip_binary_data: bool,
    config_path: Option<&Path>,
) -> CliResult<()> {
    let form = load_form(form_path)?;
    let submission = load_submission(submission_path)?;
    let mut config = match config_path {
        Some(path) => EngineConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if strip_binary_data {
        config.strip_binary_data = true;
    }
    debug!(?config, "cleaning submission");

    let cleaned = form.clean(&submission, &config)?;
    println!("{}", cleaned.to_json_pretty()?);
    Ok(())
}

fn run_validate(form_path: &Path, submission_path: &Path) -> CliResult<()> {
    let form = load_form(form_path)?;
    let submission = load_submission(submission_path)?;

    let result = form.validate(&submission)?;
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(
                "  {} - {}",
                error.path.as_deref().unwrap_or("<unknown>"),
                error.message
            );
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required values: {}",
            result.missing_required.join(", ")
        );
    }
    if !result.unknown_fields.is_empty() {
        println!("Unknown fields: {}", result.unknown_fields.join(", "));
    }
}

fn run_check(form_path: &Path) -> CliResult<()> {
    let form = load_form(form_path)?;
    let report = form.check();
    print_json(&report)?;

    if report.valid {
        Ok(())
    } else {
        Err(format!("definition has {} issue(s)", report.issues.len()).into())
    }
}

fn load_form(path: &Path) -> CliResult<FormDefinition> {
    let json = fs::read_to_string(path)?;
    Ok(FormDefinition::from_json_str(&json)?)
}

fn load_submission(path: &Path) -> CliResult<Value> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
