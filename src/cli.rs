//! # CLI Module / 命令行模块
//!
//! Builds the command-line interface and dispatches to the subcommands.
//! Help texts are localized, so the language is detected before the parser
//! is built.
//!
//! 构建命令行接口并分派到子命令。帮助文本已本地化，因此在构建解析器之前先检测语言。

pub mod commands;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::t;
use commands::run::RunArgs;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|arg| arg == "--lang")
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("validation-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("cli.arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .default_value("ValidationMatrix.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.arg_jobs", locale = locale).to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("tool")
                        .long("tool")
                        .help(t!("cli.arg_tool", locale = locale).to_string())
                        .value_name("TOOL")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .help(t!("cli.arg_filter", locale = locale).to_string())
                        .value_name("PATTERN")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("total-runners")
                        .long("total-runners")
                        .help(t!("cli.arg_total_runners", locale = locale).to_string())
                        .value_name("TOTAL_RUNNERS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("runner-index"),
                )
                .arg(
                    Arg::new("runner-index")
                        .long("runner-index")
                        .help(t!("cli.arg_runner_index", locale = locale).to_string())
                        .value_name("RUNNER_INDEX")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("total-runners"),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("cli.arg_html", locale = locale).to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.arg_json", locale = locale).to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.arg_output", locale = locale).to_string())
                        .value_name("PATH")
                        .default_value("ValidationMatrix.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.arg_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Extracts the `run` subcommand's arguments.
pub fn run_args(matches: &ArgMatches) -> RunArgs {
    RunArgs {
        config: matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("ValidationMatrix.toml")),
        jobs: matches.get_one::<usize>("jobs").copied(),
        tool: matches.get_one::<String>("tool").cloned(),
        filter: matches.get_one::<String>("filter").cloned(),
        total_runners: matches.get_one::<usize>("total-runners").copied(),
        runner_index: matches.get_one::<usize>("runner-index").copied(),
        html: matches.get_one::<PathBuf>("html").cloned(),
        json: matches.get_one::<PathBuf>("json").cloned(),
        lang: matches.get_one::<String>("lang").cloned(),
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let explicit_language = pre_parse_language();
    let language = explicit_language.clone().unwrap_or_else(crate::detect_locale);
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            commands::run::execute(run_args(run_matches)).await?;
        }
        Some(("init", init_matches)) => {
            let output = init_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("ValidationMatrix.toml"));
            let force = init_matches.get_flag("force");
            let non_interactive = init_matches.get_flag("non-interactive");

            if explicit_language.is_none() {
                println!(
                    "{}",
                    t!("init.system_language_detected", locale = &language, lang = &language)
                );
            }
            commands::init::execute(output, force, non_interactive, &language)?;
        }
        // subcommand_required 保证不会走到这里。
        _ => {}
    }
    Ok(())
}
