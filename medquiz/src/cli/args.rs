// src/cli/args.rs
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{DateRange, Difficulty, SessionFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to the TOML config file (default: ./medquiz.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding Modules/ and mst.json; overrides the config file
    #[arg(long, value_name = "DIR", global = true)]
    pub public_dir: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the JSON API and the public directory over HTTP
    Serve {
        /// Keep mst.json in sync with the content tree while serving
        #[arg(short, long)]
        watch: bool,

        /// Bind address; overrides config and MEDQUIZ_HOST
        #[arg(long)]
        host: Option<String>,

        /// Port; overrides config and MEDQUIZ_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write mst.json from the current content tree
    Generate,

    /// Regenerate mst.json whenever the content tree changes
    Watch,

    /// List modules, subjects of a module, or topics of a subject
    Scan {
        #[arg(value_name = "MODULE")]
        module: Option<String>,

        #[arg(value_name = "SUBJECT")]
        subject: Option<String>,
    },

    /// Show the topic catalog
    Catalog {
        /// Case-insensitive match on title or subject
        #[arg(short, long)]
        search: Option<String>,

        /// easy, medium or hard
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Exam type, e.g. USMLE
        #[arg(long)]
        exam: Option<String>,

        /// Exact subject name
        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        year: Option<u32>,

        /// Output entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Take a quiz, e.g. `medquiz quiz HEM/Pathology/anemia/anemia`
    Quiz {
        /// module/subject/topicFolder/topicFile
        #[arg(value_name = "SLUG")]
        slug: String,
    },

    /// Study timer and session log
    Study {
        #[command(subcommand)]
        action: StudyCommand,
    },

    /// Streak statistics from a JSON list of {"date", "count"} records
    Streak {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Day to evaluate (YYYY-MM-DD); defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Write a config file with all defaults
    Init {
        #[arg(value_name = "PATH", default_value = "medquiz.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum StudyCommand {
    /// Start the timer for a subject
    Start {
        #[arg(value_name = "SUBJECT")]
        subject: String,

        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,

        #[arg(short, long, default_value = "")]
        notes: String,
    },
    Pause,
    Resume,
    /// Stop the timer and save the session
    Stop,
    /// Discard the running timer
    Reset,
    Status,
    List {
        #[command(flatten)]
        filter: SessionFilterArgs,
    },
    /// Time studied today and in the last 7 days
    Stats,
    /// Export sessions as CSV
    Export {
        #[command(flatten)]
        filter: SessionFilterArgs,

        /// Write to file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SessionFilterArgs {
    /// Subject contains (case-insensitive)
    #[arg(long)]
    pub subject: Option<String>,

    /// Any tag contains (case-insensitive)
    #[arg(long)]
    pub tag: Option<String>,

    /// all, 7d or 30d
    #[arg(long, default_value = "all")]
    pub range: DateRange,
}

impl From<SessionFilterArgs> for SessionFilter {
    fn from(args: SessionFilterArgs) -> Self {
        Self {
            subject: args.subject,
            tag: args.tag,
            range: args.range,
        }
    }
}
