//! markwise CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "markwise", version, about = "AI-assisted exam grading")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a marking guide and answer sheet for a module
    Ingest {
        /// Module identifier (e.g. "cs101-2026-s1")
        #[arg(long)]
        module: String,

        /// Module display name
        #[arg(long)]
        name: String,

        /// Module code (e.g. "CS101")
        #[arg(long, default_value = "")]
        code: String,

        /// Student batch
        #[arg(long, default_value = "")]
        batch: String,

        /// Academic year
        #[arg(long, default_value = "")]
        academic_year: String,

        /// Semester
        #[arg(long, default_value = "")]
        semester: String,

        /// Marking guide CSV
        #[arg(long)]
        guide: PathBuf,

        /// Student answer sheet CSV
        #[arg(long)]
        answers: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a marking guide CSV without saving it
    Validate {
        /// Marking guide CSV
        #[arg(long)]
        guide: PathBuf,
    },

    /// Grade every student of a module
    Grade {
        /// Module identifier
        #[arg(long)]
        module: String,

        /// Model override, "provider/model" or bare model id
        #[arg(long)]
        model: Option<String>,

        /// Max concurrent scoring requests
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show graded results for a module or one student
    Results {
        /// Module identifier
        #[arg(long)]
        module: String,

        /// Show one student's answers and feedback in full
        #[arg(long)]
        student: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manually override one answer's marks and recompute the total
    SetMarks {
        /// Module identifier
        #[arg(long)]
        module: String,

        /// Student identifier
        #[arg(long)]
        student: String,

        /// Question number
        #[arg(long)]
        question: u32,

        /// Marks to award (clamped to the question's allocation)
        #[arg(long)]
        marks: u32,

        /// Replacement feedback
        #[arg(long)]
        feedback: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export graded results
    Export {
        /// Module identifier
        #[arg(long)]
        module: String,

        /// Output format: csv or html
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample CSVs
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("markwise=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest {
            module,
            name,
            code,
            batch,
            academic_year,
            semester,
            guide,
            answers,
            config,
        } => {
            commands::ingest::execute(
                module,
                name,
                code,
                batch,
                academic_year,
                semester,
                guide,
                answers,
                config,
            )
            .await
        }
        Commands::Validate { guide } => commands::validate::execute(guide),
        Commands::Grade {
            module,
            model,
            parallelism,
            config,
        } => commands::grade::execute(module, model, parallelism, config).await,
        Commands::Results {
            module,
            student,
            config,
        } => commands::results::execute(module, student, config).await,
        Commands::SetMarks {
            module,
            student,
            question,
            marks,
            feedback,
            config,
        } => commands::set_marks::execute(module, student, question, marks, feedback, config).await,
        Commands::Export {
            module,
            format,
            output,
            config,
        } => commands::export::execute(module, format, output, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
