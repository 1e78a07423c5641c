use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use component_survey::{
    Operation, authorize as survey_authorize, check_bounds as survey_check_bounds,
    list as survey_list, validate_answer as survey_validate_answer,
};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use survey_core::{AccessGate, Answer, MemoryStore, SurveyConfig, SurveyError, identify};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Survey access and answer checks",
    long_about = "Runs the questionnaire access gate and answer validation against JSON record snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OperationArg {
    Admin,
    QuestionAdmin,
    ResultRead,
    ResponseRead,
    ResponseOwner,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Admin => Operation::Admin,
            OperationArg::QuestionAdmin => Operation::QuestionAdmin,
            OperationArg::ResultRead => Operation::ResultRead,
            OperationArg::ResponseRead => Operation::ResponseRead,
            OperationArg::ResponseOwner => Operation::ResponseOwner,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Check that Number question bounds are well formed.
    CheckBounds {
        #[arg(long, default_value = "")]
        min: String,
        #[arg(long, default_value = "")]
        max: String,
    },
    /// Validate one answer against a question definition.
    Validate {
        /// JSON file with the question type and its side data.
        #[arg(long, value_name = "QUESTION")]
        question: PathBuf,
        /// Answer body as JSON: a string, or a list for checkboxes.
        #[arg(long, value_name = "JSON")]
        answer: String,
    },
    /// Run one access gate operation against a record snapshot.
    Authorize {
        #[arg(long, value_name = "STORE")]
        store: PathBuf,
        /// Caller identity; omit for an anonymous request.
        #[arg(long)]
        user: Option<String>,
        #[arg(long, value_enum)]
        op: OperationArg,
        /// Raw resource id as it appears in the request path.
        #[arg(long)]
        id: String,
        /// Optional JSON config file (SURVEY_* environment variables override it).
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
    /// Dry-run a submission: validate every answer and show the rows it would write.
    Submit {
        #[arg(long, value_name = "STORE")]
        store: PathBuf,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        questionnaire: String,
        /// JSON file holding the list of answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
    /// List questionnaires the way the index page does.
    List {
        #[arg(long, value_name = "STORE")]
        store: PathBuf,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value = "")]
        sort: String,
        #[arg(long)]
        page: Option<String>,
        #[arg(long, conflicts_with = "nontargeted")]
        targeted: bool,
        #[arg(long)]
        nontargeted: bool,
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::CheckBounds { min, max } => report(&survey_check_bounds(&min, &max)),
        Command::Validate { question, answer } => run_validate(question, answer),
        Command::Authorize {
            store,
            user,
            op,
            id,
            config,
        } => run_authorize(store, user, op, id, config),
        Command::Submit {
            store,
            user,
            questionnaire,
            answers,
            config,
        } => run_submit(store, user, questionnaire, answers, config),
        Command::List {
            store,
            user,
            sort,
            page,
            targeted,
            nontargeted,
            config,
        } => {
            let filter = if targeted {
                "targeted"
            } else if nontargeted {
                "nontargeted"
            } else {
                "all"
            };
            let request = json!({ "user": user, "sort": sort, "page": page, "filter": filter });
            let store_json = fs::read_to_string(store)?;
            let config_json = config_json(config.as_deref())?;
            report(&survey_list(&store_json, &config_json, &request.to_string()))
        }
    }
}

fn run_validate(question_path: PathBuf, answer: String) -> CliResult<()> {
    let question_json = fs::read_to_string(question_path)?;
    report(&survey_validate_answer(&question_json, &answer))
}

fn run_authorize(
    store_path: PathBuf,
    user: Option<String>,
    op: OperationArg,
    id: String,
    config: Option<PathBuf>,
) -> CliResult<()> {
    let store_json = fs::read_to_string(store_path)?;
    let config_json = config_json(config.as_deref())?;
    let request = json!({
        "user": user,
        "operation": Operation::from(op),
        "id": id,
    });
    report(&survey_authorize(
        &store_json,
        &config_json,
        &request.to_string(),
    ))
}

fn run_submit(
    store_path: PathBuf,
    user: Option<String>,
    questionnaire: String,
    answers_path: PathBuf,
    config: Option<PathBuf>,
) -> CliResult<()> {
    let store = MemoryStore::from_json(&fs::read_to_string(store_path)?)?;
    let answers: Vec<Answer> = serde_json::from_str(&fs::read_to_string(answers_path)?)?;
    let config = SurveyConfig::load(config.as_deref())?;

    let outcome = identify(user.as_deref()).and_then(|caller| {
        let mut gate = AccessGate::new(store, config.superusers);
        gate.submit(&caller, &questionnaire, &answers, Utc::now())
    });
    match outcome {
        Ok(submitted) => {
            debug!(response_id = %submitted.response_id, "dry run, snapshot left untouched");
            let payload = json!({
                "response_id": submitted.response_id,
                "rows": submitted.rows,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(err) => reject(&err),
    }
}

fn config_json(path: Option<&Path>) -> CliResult<String> {
    let config = SurveyConfig::load(path)?;
    Ok(serde_json::to_string(&config)?)
}

fn reject(err: &SurveyError) -> CliResult<()> {
    println!("Rejected: {} {}", err.status().code(), err.kind().as_str());
    println!("  {err}");
    Err(format!("request rejected ({})", err.kind().as_str()).into())
}

fn report(payload: &str) -> CliResult<()> {
    let value: Value = serde_json::from_str(payload)?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        let status = value.get("status").and_then(Value::as_u64).unwrap_or(500);
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or("internal");
        println!("Rejected: {status} {kind}");
        println!("  {message}");
        return Err(format!("request rejected ({kind})").into());
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
