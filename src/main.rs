//! Offer engine entry point — CLI wiring around the calculation pipeline.

use std::fs;
use std::path::Path;
use std::process;

use pv_offer_engine::config::EngineConstants;
use pv_offer_engine::engine::run_offer_pipeline;
use pv_offer_engine::input::{ProjectState, derive_input};
use pv_offer_engine::io::export::{export_cashflow_csv, export_monthly_csv};
use pv_offer_engine::report::print_offer_report;

/// Parsed CLI arguments.
struct CliArgs {
    project_path: Option<String>,
    preset: Option<String>,
    constants_path: Option<String>,
    snapshot_out: Option<String>,
    monthly_out: Option<String>,
    cashflow_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("pv-offer-engine — PV offer calculation from a wizard project state");
    eprintln!();
    eprintln!("Usage: pv-offer-engine [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --project <path>         Load wizard project state from a JSON file");
    eprintln!("  --preset <name>          Use a built-in sample project (family-home)");
    eprintln!("  --constants <path>       Override engine constants from a TOML file");
    eprintln!("  --snapshot-out <path>    Write the computed offer as JSON");
    eprintln!("  --monthly-out <path>     Export the monthly yield table as CSV");
    eprintln!("  --cashflow-out <path>    Export the cumulative cash flow as CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after computing");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --project or --preset is given, the family-home preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        project_path: None,
        preset: None,
        constants_path: None,
        snapshot_out: None,
        monthly_out: None,
        cashflow_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--project" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --project requires a path argument");
                    process::exit(1);
                }
                cli.project_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--constants" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --constants requires a path argument");
                    process::exit(1);
                }
                cli.constants_path = Some(args[i].clone());
            }
            "--snapshot-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --snapshot-out requires a path argument");
                    process::exit(1);
                }
                cli.snapshot_out = Some(args[i].clone());
            }
            "--monthly-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --monthly-out requires a path argument");
                    process::exit(1);
                }
                cli.monthly_out = Some(args[i].clone());
            }
            "--cashflow-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --cashflow-out requires a path argument");
                    process::exit(1);
                }
                cli.cashflow_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    if cli.project_path.is_some() && cli.preset.is_some() {
        eprintln!("error: --project and --preset are mutually exclusive");
        process::exit(1);
    }

    // Load project state: --project takes priority, then --preset, then the default preset
    let project = if let Some(ref path) = cli.project_path {
        let content = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("error: cannot read \"{path}\": {e}");
            process::exit(1);
        });
        match ProjectState::from_json_str(&content) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        let name = cli.preset.as_deref().unwrap_or("family-home");
        match ProjectState::from_preset(name) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    };

    // Load constants and validate
    let constants = if let Some(ref path) = cli.constants_path {
        match EngineConstants::from_toml_file(Path::new(path)) {
            Ok(constants) => constants,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        EngineConstants::default()
    };
    let errors = constants.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Derive and run
    let input = derive_input(&project, &constants);
    let result = run_offer_pipeline(&input, &constants);

    print_offer_report(&result);

    // Write the display snapshot if requested
    if let Some(ref path) = cli.snapshot_out {
        let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
            eprintln!("error: failed to serialize snapshot: {e}");
            process::exit(1);
        });
        if let Err(e) = fs::write(path, json) {
            eprintln!("error: failed to write snapshot: {e}");
            process::exit(1);
        }
        eprintln!("Snapshot written to {path}");
    }

    // Export chart tables if requested
    if let Some(ref path) = cli.monthly_out {
        if let Err(e) = export_monthly_csv(&result, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Monthly yield table written to {path}");
    }
    if let Some(ref path) = cli.cashflow_out {
        if let Err(e) = export_cashflow_csv(&result, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Cash-flow table written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(pv_offer_engine::api::AppState {
            constants,
            input,
            result,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(pv_offer_engine::api::serve(state, addr));
    }
}
