use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wfinterop_api::Trs;
use wfinterop_config::{ConfigStore, Section};
use wfinterop_engine::{HttpConnector, Orchestrator, load_params_dir, load_params_file};
use wfinterop_types::RunStatus;
use wfinterop_util::expand_tilde;

mod requests;

use requests::{QueueRequest, ServiceRequest, parse_data};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_tracing(default_log_level(&matches));

    let store = open_store(&matches);
    debug!(path = %store.path().display(), "using config file");

    match matches.subcommand() {
        Some(("config", sub)) => run_config_cmd(&store, sub),
        Some(("trs", sub)) => run_trs_cmd(&store, sub).await,
        Some(("run", sub)) => run_orchestrator_cmd(store, sub).await,
        _ => bail!("expected one of: config, trs, run"),
    }
}

/// `RUST_LOG` wins; otherwise `--quiet`/`--debug` pick the level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_log_level(matches: &ArgMatches) -> &'static str {
    if matches.get_flag("quiet") {
        "error"
    } else if matches.get_flag("debug") {
        "debug"
    } else {
        "info"
    }
}

fn open_store(matches: &ArgMatches) -> ConfigStore {
    match matches.get_one::<String>("config") {
        Some(path) => ConfigStore::new(expand_tilde(path)),
        None => ConfigStore::from_default_path(),
    }
}

fn build_cli() -> Command {
    Command::new("wfinterop")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Query GA4GH tool registries and run workflows on execution services")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("debug")
                .help("Only log errors"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug detail"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .action(ArgAction::Set)
                .value_name("PATH")
                .help("Config file to use instead of the default location"),
        )
        .subcommand(config_cli())
        .subcommand(trs_cli())
        .subcommand(run_cli())
}

fn data_arg() -> Arg {
    Arg::new("data")
        .long("data")
        .short('d')
        .required(true)
        .action(ArgAction::Set)
        .help("Entry as a YAML or JSON mapping")
}

fn config_cli() -> Command {
    Command::new("config")
        .about("Inspect and edit the configuration file")
        .subcommand_required(true)
        .subcommand(
            Command::new("show").about("Print the configuration").arg(
                Arg::new("section")
                    .long("section")
                    .action(ArgAction::Set)
                    .value_parser(Section::ALL.map(|section| section.as_str()))
                    .help("Only print one section"),
            ),
        )
        .subcommand(
            Command::new("add-queue")
                .about("Add a workflow queue (workflow_id, version_id, workflow_type, trs_id, wes_default, wes_opts)")
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("add-trs")
                .about("Add a tool registry (service, host, proto, auth, auth_type)")
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("add-wes")
                .about("Add a workflow execution service (service, host, proto, auth, auth_type)")
                .arg(data_arg()),
        )
}

fn trs_cli() -> Command {
    let trs_arg = || {
        Arg::new("trs")
            .long("trs")
            .default_value("dockstore")
            .action(ArgAction::Set)
            .help("Tool registry from the toolregistries section")
    };
    let workflow_arg = || Arg::new("workflow-id").required(true).help("Workflow id, with or without #workflow/");
    let version_args = |command: Command| {
        command
            .arg(trs_arg())
            .arg(workflow_arg())
            .arg(Arg::new("version-id").required(true))
            .arg(Arg::new("type").required(true).help("Descriptor type, e.g. CWL or WDL"))
    };

    Command::new("trs")
        .about("Query a tool registry")
        .subcommand_required(true)
        .subcommand(Command::new("metadata").about("Registry metadata").arg(trs_arg()))
        .subcommand(Command::new("workflow").about("One workflow").arg(trs_arg()).arg(workflow_arg()))
        .subcommand(
            Command::new("versions")
                .about("Versions of a workflow")
                .arg(trs_arg())
                .arg(workflow_arg()),
        )
        .subcommand(
            version_args(Command::new("descriptor").about("Workflow descriptor")).arg(
                Arg::new("relative-path")
                    .long("relative-path")
                    .action(ArgAction::Set)
                    .help("Secondary descriptor path relative to the primary one"),
            ),
        )
        .subcommand(version_args(Command::new("tests").about("Test parameter files")))
        .subcommand(version_args(Command::new("files").about("Files in a workflow version")))
}

fn run_cli() -> Command {
    let queue_arg = || Arg::new("queue").long("queue").required(true).action(ArgAction::Set);
    let wes_arg = || {
        Arg::new("wes")
            .long("wes")
            .action(ArgAction::Set)
            .help("Execution service; defaults to the queue's wes_default")
    };

    Command::new("run")
        .about("Retrieve and run workflows")
        .subcommand_required(true)
        .subcommand(
            Command::new("single")
                .about("Run a workflow job in a single environment")
                .arg(queue_arg())
                .arg(wes_arg())
                .arg(
                    Arg::new("params")
                        .long("params")
                        .action(ArgAction::Set)
                        .help("Workflow parameters file (JSON or YAML)"),
                ),
        )
        .subcommand(
            Command::new("multi")
                .about("Run all workflow jobs in a queue in a single environment")
                .arg(queue_arg())
                .arg(wes_arg())
                .arg(
                    Arg::new("params-dir")
                        .long("params-dir")
                        .required(true)
                        .action(ArgAction::Set)
                        .help("Directory of parameter files; one run per file"),
                ),
        )
        .subcommand(run_id_args(Command::new("status").about("State of a submitted run")))
        .subcommand(run_id_args(Command::new("log").about("Log, outputs and task logs of a run")))
        .subcommand(run_id_args(Command::new("cancel").about("Cancel a run")))
        .subcommand(
            Command::new("list")
                .about("Runs known to an execution service")
                .arg(target_wes_arg())
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("page-token")
                        .long("page-token")
                        .action(ArgAction::Set)
                        .help("next_page_token from a previous page"),
                ),
        )
}

fn target_wes_arg() -> Arg {
    Arg::new("wes")
        .long("wes")
        .required(true)
        .action(ArgAction::Set)
        .help("Execution service from the workflowservices section")
}

fn run_id_args(command: Command) -> Command {
    command.arg(target_wes_arg()).arg(Arg::new("run-id").required(true))
}

/// `run status` output; `terminal` tells scripts to stop polling.
#[derive(Debug, Serialize)]
struct StatusReport {
    #[serde(flatten)]
    status: RunStatus,
    terminal: bool,
}

impl From<RunStatus> for StatusReport {
    fn from(status: RunStatus) -> Self {
        let terminal = status.state.is_terminal();
        Self { status, terminal }
    }
}

/// Positional/flag value that clap guarantees through `required` or a default.
fn arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument '{name}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_config_cmd(store: &ConfigStore, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub)) => {
            let output = match sub.get_one::<String>("section") {
                Some(section) => {
                    let section: Section = section.parse()?;
                    serde_yaml::to_string(&store.get_section(section)?)?
                }
                None => store.show()?,
            };
            print!("{output}");
        }
        Some(("add-queue", sub)) => {
            let request: QueueRequest = parse_data(arg(sub, "data")?)?;
            let key = store.add_queue(request.into_entry())?;
            println!("{key}");
        }
        Some(("add-trs", sub)) => {
            let request: ServiceRequest = parse_data(arg(sub, "data")?)?;
            let (service, entry) = request.into_entry();
            store.add_tool_registry(&service, entry)?;
            println!("{service}");
        }
        Some(("add-wes", sub)) => {
            let request: ServiceRequest = parse_data(arg(sub, "data")?)?;
            let (service, entry) = request.into_entry();
            store.add_workflow_service(&service, entry)?;
            println!("{service}");
        }
        _ => bail!("expected one of: show, add-queue, add-trs, add-wes"),
    }
    Ok(())
}

async fn run_trs_cmd(store: &ConfigStore, matches: &ArgMatches) -> Result<()> {
    let (name, sub) = matches.subcommand().context("expected a trs subcommand")?;
    let trs_id = arg(sub, "trs")?;
    let trs = Trs::from_config(store, trs_id).with_context(|| format!("could not connect to tool registry '{trs_id}'"))?;

    match name {
        "metadata" => print_json(&trs.get_metadata().await?),
        "workflow" => print_json(&trs.get_workflow(arg(sub, "workflow-id")?).await?),
        "versions" => print_json(&trs.get_workflow_versions(arg(sub, "workflow-id")?).await?),
        "descriptor" | "tests" | "files" => {
            let workflow_id = arg(sub, "workflow-id")?;
            let version_id = arg(sub, "version-id")?;
            let descriptor_type = arg(sub, "type")?;
            match (name, sub.get_one::<String>("relative-path")) {
                ("descriptor", Some(relative_path)) => print_json(
                    &trs.get_workflow_descriptor_relative(workflow_id, version_id, descriptor_type, relative_path)
                        .await?,
                ),
                ("descriptor", None) => print_json(&trs.get_workflow_descriptor(workflow_id, version_id, descriptor_type).await?),
                ("tests", _) => print_json(&trs.get_workflow_tests(workflow_id, version_id, descriptor_type).await?),
                _ => print_json(&trs.get_workflow_files(workflow_id, version_id, descriptor_type).await?),
            }
        }
        other => bail!("unknown trs subcommand '{other}'"),
    }
}

async fn run_orchestrator_cmd(store: ConfigStore, matches: &ArgMatches) -> Result<()> {
    let orchestrator = Orchestrator::new(store, Arc::new(HttpConnector));

    match matches.subcommand() {
        Some(("single", sub)) => {
            let params = match sub.get_one::<String>("params") {
                Some(path) => load_params_file(expand_tilde(path))?,
                None => Value::Object(Map::new()),
            };
            let submission = orchestrator
                .run_single(arg(sub, "queue")?, sub.get_one::<String>("wes").map(String::as_str), params)
                .await?;
            print_json(&submission)
        }
        Some(("multi", sub)) => {
            let params_dir = expand_tilde(arg(sub, "params-dir")?);
            let jobs = load_params_dir(&params_dir)?;
            if jobs.is_empty() {
                bail!("no .json, .yaml or .yml files in {}", params_dir.display());
            }
            let outcomes = orchestrator
                .run_multi(arg(sub, "queue")?, sub.get_one::<String>("wes").map(String::as_str), jobs)
                .await?;
            print_json(&outcomes)?;
            let failed = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
            if failed > 0 {
                bail!("{failed} of {} jobs failed to submit", outcomes.len());
            }
            Ok(())
        }
        Some(("status", sub)) => {
            let status = orchestrator.run_status(arg(sub, "wes")?, arg(sub, "run-id")?).await?;
            print_json(&StatusReport::from(status))
        }
        Some(("log", sub)) => print_json(&orchestrator.run_log(arg(sub, "wes")?, arg(sub, "run-id")?).await?),
        Some(("cancel", sub)) => print_json(&orchestrator.cancel_run(arg(sub, "wes")?, arg(sub, "run-id")?).await?),
        Some(("list", sub)) => {
            let page_size = sub.get_one::<u32>("page-size").copied();
            let page_token = sub.get_one::<String>("page-token").map(String::as_str);
            print_json(&orchestrator.list_runs(arg(sub, "wes")?, page_size, page_token).await?)
        }
        _ => bail!("expected one of: single, multi, status, log, cancel, list"),
    }
}
