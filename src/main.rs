// ==========================================
// 现场项目跟踪器 - 命令行入口
// ==========================================
// 用法: lpt [--data-dir DIR] [--locale en|zh-CN] <命令>
// ==========================================

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use live_project_tracker::api::{ApiError, ApiResult, TrackerApi};
use live_project_tracker::config::{default_data_dir, ConfigManager};
use live_project_tracker::domain::Task;
use live_project_tracker::i18n::{self, t, t_with_args};
use live_project_tracker::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lpt")]
#[command(about = "Live project tracker: import MS Project plans and track shift progress")]
#[command(version)]
struct Cli {
    /// Data directory (defaults to LPT_DATA_DIR or the user data dir)
    #[arg(long, global = true, env = "LPT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Interface language (en, zh-CN)
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a .csv or MSPDI .xml project file, replacing current tasks
    Import {
        /// Path to the project file
        file: PathBuf,
    },

    /// List tasks in the rolling window
    List {
        /// Show every task regardless of planned start
        #[arg(long)]
        all: bool,
    },

    /// Start or resume a task
    Start {
        /// Task UID
        uid: String,
    },

    /// Pause a running task and record a delay
    Pause {
        /// Task UID
        uid: String,

        /// Delay reason (required)
        #[arg(short, long)]
        reason: String,

        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Finish a task
    Finish {
        /// Task UID
        uid: String,
    },

    /// Show the delay log, newest first
    Delays,

    /// Export the shift report CSV
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Export the delay log CSV
    ExportDelays {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Clear current project tasks
    Clear,

    /// Clear the delay log
    ClearDelays,

    /// Show or change configuration
    Config {
        /// Set a value, e.g. --set hierarchy_strategy=outline_stack
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    tracing::debug!(data_dir = %data_dir.display(), "使用数据目录");

    let api = TrackerApi::open(&data_dir).map_err(into_report)?;
    let locale = cli.locale.clone().unwrap_or_else(|| api.config().locale());
    i18n::set_locale(&locale);

    run(cli.command, api, data_dir).await.map_err(into_report)
}

fn into_report(err: ApiError) -> anyhow::Error {
    tracing::error!(code = err.code(), error = %err, "命令执行失败");
    anyhow::anyhow!("{}", err.user_message())
}

async fn run(command: Commands, api: TrackerApi, data_dir: PathBuf) -> ApiResult<()> {
    match command {
        Commands::Import { file } => {
            let summary = api.import_file(&file).await?;
            println!(
                "{}",
                t_with_args(
                    "cli.imported",
                    &[
                        ("count", &summary.task_count.to_string()),
                        ("file", &summary.file_name),
                        ("format", &summary.format),
                    ],
                )
            );
            if summary.duplicate_uids > 0 {
                println!(
                    "{}",
                    t_with_args(
                        "cli.duplicate_uids",
                        &[("count", &summary.duplicate_uids.to_string())]
                    )
                );
            }
            if summary.unparsed_dates > 0 {
                println!(
                    "{}",
                    t_with_args(
                        "cli.unparsed_dates",
                        &[("count", &summary.unparsed_dates.to_string())]
                    )
                );
            }
        }
        Commands::List { all } => {
            if all {
                let tasks = api.list_all()?;
                print_tasks(&tasks);
            } else {
                let view = api.list_window(Local::now().date_naive())?;
                print_tasks(&view.tasks);
                let summary = view.summary;
                println!(
                    "{}",
                    t_with_args(
                        "cli.window_summary",
                        &[
                            ("shown", &summary.shown.to_string()),
                            ("total", &summary.total.to_string()),
                            ("from", &summary.from.to_string()),
                            ("to", &summary.to.to_string()),
                        ],
                    )
                );
            }
        }
        Commands::Start { uid } => {
            let task = api.start_task(&uid, Utc::now())?;
            print_state(&task);
        }
        Commands::Pause { uid, reason, notes } => {
            let task = api.pause_task(&uid, &reason, &notes, Utc::now())?;
            print_state(&task);
        }
        Commands::Finish { uid } => {
            let task = api.finish_task(&uid, Utc::now())?;
            print_state(&task);
        }
        Commands::Delays => {
            let entries = api.list_delay_log()?;
            if entries.is_empty() {
                println!("{}", t("cli.no_delays"));
            }
            for entry in entries {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    local_text(entry.logged_at),
                    entry.task_uid,
                    entry.task_name,
                    entry.reason,
                    entry.notes
                );
            }
        }
        Commands::Export { out } => {
            let path = api.export_shift_report(&out, Local::now())?;
            println!(
                "{}",
                t_with_args("cli.exported", &[("path", &path.display().to_string())])
            );
        }
        Commands::ExportDelays { out } => {
            let path = api.export_delay_log(&out, Local::now())?;
            println!(
                "{}",
                t_with_args("cli.exported", &[("path", &path.display().to_string())])
            );
        }
        Commands::Clear => {
            api.clear_project()?;
            println!("{}", t("cli.project_cleared"));
        }
        Commands::ClearDelays => {
            api.clear_delay_log()?;
            println!("{}", t("cli.delays_cleared"));
        }
        Commands::Config { set } => {
            let mut config = ConfigManager::from_data_dir(&data_dir)?;
            for pair in &set {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    ApiError::InvalidInput(format!("配置项格式应为 KEY=VALUE: {}", pair))
                })?;
                config.set_config_value(key.trim(), value.trim());
            }
            if !set.is_empty() {
                config.save()?;
            }
            println!("{}", config.get_config_snapshot());
        }
    }
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", t("cli.no_tasks"));
        return;
    }
    for task in tasks {
        let planned = match task.planned_start {
            Some(_) => local_text(task.planned_start),
            None => task.planned_start_raw.clone(),
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}%",
            task.task_uid,
            task.state,
            planned,
            task.task_name,
            task.summary_task_name,
            task.department,
            task.percent_complete
        );
    }
}

fn print_state(task: &Task) {
    println!(
        "{}",
        t_with_args(
            "cli.task_state",
            &[
                ("uid", &task.task_uid),
                ("name", &task.task_name),
                ("state", task.state.as_str()),
            ],
        )
    );
}

fn local_text(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|v| v.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
