//! provkit CLI
//!
//! Entry point for the `provkit` command-line tool.

use clap::{Parser, Subcommand};
use provkit::config::{toml_to_json, user_config_path};
use provkit::{
    format_instance_name, merge, print_stdout, write_template, Inventory, Mapping,
    PlaybookInvocation, ScenarioConfig, ScenarioState, StateError,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "provkit")]
#[command(about = "Helpers for provisioning test scenarios", version)]
struct Cli {
    /// Scenario config file
    #[arg(long, global = true, default_value = "molecule.toml")]
    molecule_file: PathBuf,

    /// Print the merged config and its sources before running
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deep-merge two JSON or TOML files and print the result as JSON
    Merge {
        /// Base mapping
        base: PathBuf,

        /// Overlay mapping (wins on conflict)
        overlay: PathBuf,

        /// Fail instead of overwriting when scalar values differ
        #[arg(long)]
        raise_on_conflict: bool,
    },

    /// Print the host name of an instance on a platform
    InstanceName {
        /// Base instance name
        name: String,

        /// Platform label
        platform: String,
    },

    /// Render a template to a file
    Render {
        /// Template file name
        template: String,

        /// Destination path
        dest: PathBuf,

        /// Directory to look the template up in
        #[arg(long, default_value = "templates")]
        template_dir: PathBuf,

        /// Template context as a JSON object
        #[arg(long, default_value = "{}")]
        context: String,
    },

    /// Generate the ansible inventory file
    Inventory {
        /// JSON file mapping host names to SSH connection details
        #[arg(long)]
        hosts: PathBuf,

        /// Platform (default: stored selection, else the first configured)
        #[arg(long, short = 'p')]
        platform: Option<String>,

        /// Output path (default: molecule.inventory_file from config)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Show or change the default platform
    Platform {
        /// Platform to store as the default
        #[arg(long)]
        set: Option<String>,
    },

    /// Show or change the default provider
    Provider {
        /// Provider to store as the default
        #[arg(long)]
        set: Option<String>,
    },

    /// Print the ansible-playbook environment and command line
    Playbook {
        /// Only run plays and tasks tagged with these values
        #[arg(long)]
        tags: Option<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let scenario = Scenario {
        molecule_file: cli.molecule_file,
        debug: cli.debug,
    };

    match cli.command {
        Commands::Merge {
            base,
            overlay,
            raise_on_conflict,
        } => run_merge(&base, &overlay, raise_on_conflict),
        Commands::InstanceName { name, platform } => {
            run_instance_name(&name, &platform, &scenario)
        }
        Commands::Render {
            template,
            dest,
            template_dir,
            context,
        } => run_render(&template, &dest, &template_dir, &context),
        Commands::Inventory {
            hosts,
            platform,
            out,
        } => run_inventory(&hosts, platform, out, &scenario),
        Commands::Platform { set } => run_selection(Choice::Platform, set, &scenario),
        Commands::Provider { set } => run_selection(Choice::Provider, set, &scenario),
        Commands::Playbook { tags } => run_playbook(tags.as_deref(), &scenario),
    }
}

/// Global options for commands that read the scenario config
struct Scenario {
    molecule_file: PathBuf,
    debug: bool,
}

impl Scenario {
    fn load(&self) -> ScenarioConfig {
        let config =
            ScenarioConfig::load_scenario(user_config_path().as_deref(), &self.molecule_file, None)
                .unwrap_or_else(|e| fail(e));

        if self.debug {
            match config.to_json() {
                Ok(json) => emit(&format!("{}\n", json)),
                Err(e) => fail(e),
            }
        }
        config
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn emit(text: &str) {
    if let Err(e) = print_stdout(text) {
        fail(e);
    }
}

/// Read a JSON or TOML file (by extension) into a mapping
fn load_mapping(path: &Path) -> Result<Mapping, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    let value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str::<toml::Value>(&contents)
            .map(toml_to_json)
            .map_err(|e| format!("{}: {}", path.display(), e))?,
        _ => serde_json::from_str::<Value>(&contents)
            .map_err(|e| format!("{}: {}", path.display(), e))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("{}: top level must be a mapping", path.display())),
    }
}

fn run_merge(base: &Path, overlay: &Path, raise_on_conflict: bool) {
    let base = load_mapping(base).unwrap_or_else(|e| fail(e));
    let overlay = load_mapping(overlay).unwrap_or_else(|e| fail(e));

    let merged = merge(&base, &overlay, raise_on_conflict).unwrap_or_else(|e| fail(e));

    match serde_json::to_string_pretty(&merged) {
        Ok(json) => emit(&format!("{}\n", json)),
        Err(e) => fail(e),
    }
}

fn run_instance_name(name: &str, platform: &str, scenario: &Scenario) {
    let config = scenario.load();
    let instances = config.instances().unwrap_or_else(|e| fail(e));

    match format_instance_name(name, platform, &instances) {
        Some(vm_name) => emit(&format!("{}\n", vm_name)),
        None => fail(format!("unknown instance '{}'", name)),
    }
}

fn run_render(template: &str, dest: &Path, template_dir: &Path, context: &str) {
    let context: Value =
        serde_json::from_str(context).unwrap_or_else(|e| fail(format!("invalid context: {}", e)));

    if let Err(e) = write_template(template, dest, &context, template_dir) {
        fail(e);
    }
    eprintln!("Wrote: {}", dest.display());
}

fn state_path(config: &ScenarioConfig) -> PathBuf {
    PathBuf::from(
        config
            .get_str("molecule.state_file")
            .unwrap_or(".molecule/state"),
    )
}

fn run_inventory(hosts: &Path, platform: Option<String>, out: Option<PathBuf>, scenario: &Scenario) {
    let config = scenario.load();
    let instances = config.instances().unwrap_or_else(|e| fail(e));

    let platform = match platform {
        Some(platform) => platform,
        None => ScenarioState::load_or_default(&state_path(&config))
            .unwrap_or_else(|e| fail(e))
            .platform(&config.platform_names()),
    };

    let connections: BTreeMap<String, provkit::HostConnection> = fs::read_to_string(hosts)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
        .unwrap_or_else(|e| fail(format!("{}: {}", hosts.display(), e)));

    let out = out.unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_str("molecule.inventory_file")
                .unwrap_or(".molecule/ansible_inventory"),
        )
    });

    let inventory = Inventory::build(&instances, &platform, &connections);
    if let Err(e) = inventory.write(&out) {
        eprintln!("Warning: could not write inventory file {}: {}", out.display(), e);
        return;
    }
    eprintln!("Wrote: {}", out.display());
}

#[derive(Clone, Copy)]
enum Choice {
    Platform,
    Provider,
}

fn run_selection(choice: Choice, set: Option<String>, scenario: &Scenario) {
    let config = scenario.load();
    let path = state_path(&config);
    let mut state = ScenarioState::load_or_default(&path).unwrap_or_else(|e| fail(e));

    let (heading, names) = match choice {
        Choice::Platform => ("AVAILABLE PLATFORMS", config.platform_names()),
        Choice::Provider => ("AVAILABLE PROVIDERS", config.provider_names()),
    };
    let current = |state: &ScenarioState| match choice {
        Choice::Platform => state.platform(&names),
        Choice::Provider => state.provider(&names),
    };

    if let Some(name) = set {
        let selected = match choice {
            Choice::Platform => state.select_platform(&name, &names),
            Choice::Provider => state.select_provider(&name, &names),
        };
        match selected {
            Ok(()) => {
                if let Err(e) = state.save(&path) {
                    fail(e);
                }
            }
            Err(e @ StateError::UnknownChoice { .. }) => {
                eprintln!("{}", e);
                print_choices(heading, &names, &current(&state));
                process::exit(1);
            }
            Err(e) => fail(e),
        }
    }

    print_choices(heading, &names, &current(&state));
}

fn print_choices(heading: &str, names: &[String], default: &str) {
    let mut text = format!("{}\n", heading);
    for name in names {
        let marker = if name == default { " (default)" } else { "" };
        text.push_str(&format!("{}{}\n", name, marker));
    }
    emit(&text);
}

fn run_playbook(tags: Option<&str>, scenario: &Scenario) {
    let config = scenario.load();
    let invocation = PlaybookInvocation::from_config(&config, tags).unwrap_or_else(|e| fail(e));
    emit(&format!("{}\n", invocation));
}
