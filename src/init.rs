use crate::{
    api::Backend,
    channel::WsConnector,
    config::{self, Profile},
    language::Language,
    message::request::{QuestionQuery, SubmissionQuery},
    projector,
    question::{Difficulty, QuestionDraft},
    session::{Outcome, SessionStatus, SubmissionSession},
    verdict::Verdict,
    workbench::Workbench,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct CLIArgs {
    #[clap(short, long)]
    pub config: Option<String>,

    /// Backend to use: development or production
    #[clap(short, long)]
    pub profile: Option<Profile>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a solution for judging and wait for the verdict
    Submit {
        #[clap(short, long)]
        question: String,
        #[clap(short, long)]
        language: Language,
        #[clap(short, long)]
        file: PathBuf,
    },
    /// Run a solution against ad-hoc inputs
    Debug {
        #[clap(short, long)]
        language: Language,
        #[clap(short, long)]
        file: PathBuf,
        /// Standard input of one case; repeat for more cases
        #[clap(short, long = "input")]
        inputs: Vec<String>,
        /// File holding the standard input of one case; repeatable
        #[clap(long = "input-file")]
        input_files: Vec<PathBuf>,
    },
    /// Browse the question list
    Questions {
        #[clap(flatten)]
        filter: QuestionFilter,
    },
    /// Show, add, edit or delete a question
    Question {
        #[clap(subcommand)]
        action: QuestionAction,
    },
    /// List submission records
    History {
        #[clap(short, long)]
        question: Option<String>,
        #[clap(short, long)]
        language: Option<Language>,
        /// 0 pending, 1 judging, 2 accepted, 3 wrong answer
        #[clap(short, long)]
        status: Option<i64>,
        #[clap(long, default_value = "1")]
        page: u64,
        #[clap(long, default_value = "10")]
        page_size: u64,
    },
    /// Print the starter program for a language
    Template {
        #[clap(short, long)]
        language: Language,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuestionAction {
    /// Show a question with its limits and sample cases
    Show { id: String },
    /// Create a question from a TOML file
    Add { file: PathBuf },
    /// Replace a question with the contents of a TOML file
    Edit { id: String, file: PathBuf },
    /// Delete a question
    Delete {
        id: String,
        /// Confirm the deletion; it cannot be undone
        #[clap(long)]
        yes: bool,
    },
    /// List the questions you created
    Mine {
        #[clap(flatten)]
        filter: QuestionFilter,
    },
}

#[derive(Args, Debug)]
pub struct QuestionFilter {
    /// Only questions whose title contains this text
    #[clap(short, long)]
    title: Option<String>,
    /// easy, medium or hard
    #[clap(short, long)]
    difficulty: Option<Difficulty>,
    /// title, update-time, accepted, submitted or difficulty
    #[clap(long, default_value = "update-time")]
    sort: QuestionSort,
    #[clap(long)]
    ascending: bool,
    #[clap(long, default_value = "1")]
    page: u64,
    #[clap(long, default_value = "10")]
    page_size: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionSort {
    Title,
    UpdateTime,
    Accepted,
    Submitted,
    Difficulty,
}

impl QuestionSort {
    fn field(&self) -> &'static str {
        match self {
            QuestionSort::Title => "title",
            QuestionSort::UpdateTime => "updateTime",
            QuestionSort::Accepted => "acceptedNum",
            QuestionSort::Submitted => "submitNum",
            QuestionSort::Difficulty => "difficulty",
        }
    }
}

impl std::str::FromStr for QuestionSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(QuestionSort::Title),
            "update-time" | "updated" => Ok(QuestionSort::UpdateTime),
            "accepted" => Ok(QuestionSort::Accepted),
            "submitted" => Ok(QuestionSort::Submitted),
            "difficulty" => Ok(QuestionSort::Difficulty),
            other => Err(format!(
                "unknown sort {other:?}, expected title, update-time, accepted, submitted or difficulty"
            )),
        }
    }
}

impl QuestionFilter {
    fn query(&self) -> QuestionQuery {
        QuestionQuery {
            current: self.page,
            page_size: self.page_size,
            title: self
                .title
                .as_deref()
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_string),
            difficulty: self.difficulty,
            sort_field: self.sort.field().to_string(),
            sort_order: if self.ascending { "ascend" } else { "descend" }.to_string(),
        }
    }
}

pub async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli_args = CLIArgs::parse();

    let config: config::Config = match &cli_args.config {
        Some(path) => {
            let config = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {path}"))?;
            toml::from_str(&config).context("Config is invalid")?
        }
        None => config::Config::default(),
    };

    let profile = cli_args
        .profile
        .or(config.backend.profile)
        .unwrap_or_else(Profile::from_build);
    let host = config.backend.host(profile).to_string();
    let access_token = config
        .backend
        .access_token
        .clone()
        .or_else(|| std::env::var("OJ_ACCESS_TOKEN").ok());
    tracing::debug!(?profile, %host, "using backend");

    let backend = Backend::new(host, access_token)?;

    match cli_args.command {
        Command::Submit {
            question,
            language,
            file,
        } => {
            let connector = WsConnector::new(config::push_base(backend.host())?);
            let mut workbench = Workbench::new(connector, backend, language)
                .with_result_timeout(config.channel.result_timeout());
            workbench.code = read_source(&file)?;

            println!("submitting {} as {}", file.display(), language.display_name());
            let session = workbench.submit(&question).await;
            print_session(session);

            let accepted = matches!(
                session.status(),
                SessionStatus::Completed(Outcome::Judge(judge)) if judge.verdict == Verdict::Accepted
            );
            Ok(exit_code(accepted))
        }
        Command::Debug {
            language,
            file,
            mut inputs,
            input_files,
        } => {
            for path in &input_files {
                inputs.push(
                    std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read input from {}", path.display()))?,
                );
            }

            let connector = WsConnector::new(config::push_base(backend.host())?);
            let mut workbench = Workbench::new(connector, backend, language)
                .with_result_timeout(config.channel.result_timeout());
            workbench.code = read_source(&file)?;
            workbench.case_inputs = inputs;

            let finished = match workbench.run_debug().await {
                Ok(session) => {
                    print_session(session);
                    matches!(session.status(), SessionStatus::Completed(Outcome::Debug(_)))
                }
                Err(e) => {
                    println!("[warning] {e}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            println!(
                "{}",
                projector::render_cases(&workbench.case_inputs, workbench.case_outputs())
            );
            Ok(exit_code(finished))
        }
        Command::Questions { filter } => {
            let questions = backend
                .questions(&filter.query())
                .await
                .context("Failed to load questions")?;
            println!("{}", projector::render_questions(&questions));
            Ok(ExitCode::SUCCESS)
        }
        Command::Question { action } => run_question_action(&backend, action).await,
        Command::History {
            question,
            language,
            status,
            page,
            page_size,
        } => {
            let query = SubmissionQuery {
                current: page,
                page_size,
                language,
                status,
                question_id: question,
                sort_field: "createTime".to_string(),
                sort_order: "desc".to_string(),
            };
            let records = backend
                .submissions(&query)
                .await
                .context("Failed to load submissions")?;
            println!("{}", projector::render_submissions(&records));
            Ok(ExitCode::SUCCESS)
        }
        Command::Template { language } => {
            print!("{}", language.snippet());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_question_action(backend: &Backend, action: QuestionAction) -> Result<ExitCode> {
    match action {
        QuestionAction::Show { id } => {
            let question = backend
                .question(&id)
                .await
                .with_context(|| format!("Failed to load question {id}"))?;
            print!("{}", question.render());
        }
        QuestionAction::Add { file } => {
            let draft = read_draft(&file)?;
            let id = backend
                .add_question(&draft)
                .await
                .context("Failed to add question")?;
            println!("[success] added question {id}");
        }
        QuestionAction::Edit { id, file } => {
            let draft = read_draft(&file)?;
            backend
                .edit_question(&id, &draft)
                .await
                .with_context(|| format!("Failed to edit question {id}"))?;
            println!("[success] saved question {id}");
        }
        QuestionAction::Delete { id, yes } => {
            if !yes {
                bail!("Deleting question {id} cannot be undone, pass --yes to confirm");
            }
            backend
                .delete_question(&id)
                .await
                .with_context(|| format!("Failed to delete question {id}"))?;
            println!("[success] deleted question {id}");
        }
        QuestionAction::Mine { filter } => {
            let questions = backend
                .my_questions(&filter.query())
                .await
                .context("Failed to load your questions")?;
            println!("{}", projector::render_questions(&questions));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read_draft(path: &Path) -> Result<QuestionDraft> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read question from {}", path.display()))?;
    Ok(QuestionDraft::from_toml(&text)?)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source code from {}", path.display()))
}

fn print_session(session: &SubmissionSession) {
    tracing::debug!(sid = %session.sid(), channel = ?session.channel(), "session finished");
    for notice in session.notices() {
        println!("{}", projector::render_notice(notice));
    }
    let projection = projector::project(session).render();
    if !projection.is_empty() {
        println!("{projection}");
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
