mod report;

use clap::{Parser, Subcommand, ValueEnum};
use component_branch::{audit_rules, eligible_targets, next as branch_next, options, walk};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOG_ENV: &str = "GREENTIC_BRANCH_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Survey branching rule helper",
    long_about = "Checks stored branching rules and previews respondent navigation for a survey definition"
)]
struct Cli {
    /// Emit debug logs (overrides GREENTIC_BRANCH_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Audit every stored rule against the survey's questions.
    Check {
        /// Path to the survey JSON.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Decide the question that follows QUESTION for the given answers.
    Next {
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        /// Question the respondent just answered.
        #[arg(long, value_name = "QUESTION")]
        question: String,
        /// JSON file with answers recorded so far.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the questions a respondent with these answers is shown.
    Walk {
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the options a condition on QUESTION can select.
    Options {
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        #[arg(long, value_name = "QUESTION")]
        question: String,
    },
    /// List the questions a rule owned by QUESTION may jump to.
    Targets {
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        #[arg(long, value_name = "QUESTION")]
        question: String,
    },
    /// Print the JSON schema of survey definitions.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Check { survey, format } => run_check(&survey, format),
        Command::Next {
            survey,
            question,
            answers,
            format,
        } => run_next(&survey, &question, answers.as_deref(), format),
        Command::Walk {
            survey,
            answers,
            format,
        } => run_walk(&survey, answers.as_deref(), format),
        Command::Options { survey, question } => run_options(&survey, &question),
        Command::Targets { survey, question } => run_targets(&survey, &question),
        Command::Schema => run_schema(),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(survey_path: &Path) -> CliResult<String> {
    let contents = fs::read_to_string(survey_path)
        .map_err(|err| format!("cannot read survey {}: {}", survey_path.display(), err))?;
    Ok(json!({ "survey_json": contents }).to_string())
}

fn load_answers(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)
            .map_err(|err| format!("cannot read answers {}: {}", path.display(), err))?),
        None => Ok("{}".to_string()),
    }
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }
    Ok(value)
}

fn print_json(value: &Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_check(survey_path: &Path, format: OutputFormat) -> CliResult<()> {
    let config = load_config(survey_path)?;
    let result = parse_component_result(&audit_rules(&config))?;
    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => print!("{}", report::describe_audit(&result)),
    }
    if result["valid"].as_bool().unwrap_or(false) {
        Ok(())
    } else {
        Err("rule check failed".into())
    }
}

fn run_next(
    survey_path: &Path,
    question: &str,
    answers_path: Option<&Path>,
    format: OutputFormat,
) -> CliResult<()> {
    let config = load_config(survey_path)?;
    let answers = load_answers(answers_path)?;
    let result = parse_component_result(&branch_next(&config, question, &answers))?;
    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => println!("{}", report::describe_navigation(&result)),
    }
    Ok(())
}

fn run_walk(survey_path: &Path, answers_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
    let config = load_config(survey_path)?;
    let answers = load_answers(answers_path)?;
    let result = parse_component_result(&walk(&config, &answers))?;
    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => print!("{}", report::describe_walk(&result)),
    }
    Ok(())
}

fn run_options(survey_path: &Path, question: &str) -> CliResult<()> {
    let config = load_config(survey_path)?;
    let result = parse_component_result(&options(&config, question))?;
    let options = result["options"].as_array().cloned().unwrap_or_default();
    if options.is_empty() {
        println!("Question '{}' offers no selectable options.", question);
    }
    for option in options {
        println!("{}", option.as_str().unwrap_or_default());
    }
    Ok(())
}

fn run_targets(survey_path: &Path, question: &str) -> CliResult<()> {
    let config = load_config(survey_path)?;
    let result = parse_component_result(&eligible_targets(&config, question))?;
    print!("{}", report::describe_questions(&result["questions"]));
    Ok(())
}

fn run_schema() -> CliResult<()> {
    tracing::debug!("printing survey schema");
    let schema = serde_json::to_value(branch_spec::survey_schema())?;
    print_json(&schema)
}
