use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mos_core::analysis::{AnalysisPlan, Terminal};
use mos_core::engine::Engine;
use mos_core::result_store::{AnalysisType, ResultStore, RunResult, RunStatus};
use mos_devices::mosfet::{
    build_device_params, parse_model_card, parse_number, ActivationMode, DeviceParams,
    ModelSelector, Terminals,
};

/// MOSFET drain current and operating region calculator
#[derive(Parser, Debug)]
#[command(name = "mos-cli", version)]
struct Cli {
    /// Device polarity: nmos or pmos (default: from card, else nmos)
    #[arg(long)]
    mode: Option<ActivationMode>,

    /// Channel model: lcm (long) or scm (short)
    #[arg(long)]
    model: Option<ModelSelector>,

    /// Gate voltage
    #[arg(long, default_value = "0", value_parser = parse_voltage, allow_hyphen_values = true)]
    vg: f64,

    /// Source voltage
    #[arg(long, default_value = "0", value_parser = parse_voltage, allow_hyphen_values = true)]
    vs: f64,

    /// Drain voltage
    #[arg(long, default_value = "0", value_parser = parse_voltage, allow_hyphen_values = true)]
    vd: f64,

    /// Body voltage
    #[arg(long, default_value = "0", value_parser = parse_voltage, allow_hyphen_values = true)]
    vb: f64,

    /// Model card file (`.model name nmos key=value ...`)
    #[arg(long)]
    card: Option<PathBuf>,

    /// Parameter override, applied after the card (repeatable)
    #[arg(long = "param", short = 'p', value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Sweep a terminal: gate, source, drain or body
    #[arg(long)]
    sweep: Option<Terminal>,

    /// Sweep start voltage
    #[arg(long, value_parser = parse_voltage, allow_hyphen_values = true)]
    start: Option<f64>,

    /// Sweep stop voltage
    #[arg(long, value_parser = parse_voltage, allow_hyphen_values = true)]
    stop: Option<f64>,

    /// Sweep step (negative to sweep downwards)
    #[arg(long, value_parser = parse_voltage, allow_hyphen_values = true)]
    step: Option<f64>,

    /// Write results to PSF text file
    #[arg(long, short = 'o')]
    psf: Option<PathBuf>,

    /// Print the run as JSON
    #[arg(long)]
    json: bool,

    /// Output precision (1-15 significant digits)
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(1..=15))]
    precision: u8,

    /// Serve the HTTP API on this address instead of evaluating
    #[arg(long)]
    serve: Option<String>,
}

fn parse_voltage(s: &str) -> Result<f64, String> {
    parse_number(s).ok_or_else(|| format!("invalid voltage: {:?}", s))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() && !v.is_empty() => {
            Ok((k.trim().to_ascii_lowercase(), v.trim().to_string()))
        }
        _ => Err(format!("expected key=value, found {:?}", s)),
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Some(addr) = cli.serve.clone() {
        serve(addr);
        return;
    }

    let device = load_device(&cli).unwrap_or_else(|e| {
        eprintln!("device configuration error: {}", e);
        process::exit(2);
    });

    let terminals = Terminals::new(cli.vg, cli.vs, cli.vd, cli.vb);
    let plan = match cli.sweep {
        Some(terminal) => {
            let (Some(start), Some(stop), Some(step)) = (cli.start, cli.stop, cli.step) else {
                eprintln!("--sweep requires --start, --stop and --step");
                process::exit(2);
            };
            AnalysisPlan::sweep(terminals, terminal, start, stop, step)
        }
        None => AnalysisPlan::op(terminals),
    };

    let engine = Engine::new(device);
    let mut store = ResultStore::new();
    let run_id = engine.run_with_store(&plan, &mut store).unwrap_or_else(|e| {
        eprintln!("run failed: {}", e);
        process::exit(2);
    });
    let run = match store.get(run_id) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    let precision = usize::from(cli.precision);

    if cli.json {
        match serde_json::to_string_pretty(run) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("failed to encode json: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_run(run, precision);
    }

    if let Some(path) = &cli.psf {
        if let Err(err) = store.write_psf_text(run_id, path, precision) {
            eprintln!("failed to write psf: {}", err);
            process::exit(1);
        }
        println!("psf written: {}", path.display());
    }

    if matches!(run.status, RunStatus::NonFinite) {
        eprintln!(
            "run produced non-finite current: {}",
            run.message.as_deref().unwrap_or("")
        );
        process::exit(1);
    }
}

fn load_device(cli: &Cli) -> Result<DeviceParams, String> {
    let mut params: HashMap<String, String> = HashMap::new();
    let mut card_mode = None;

    if let Some(path) = &cli.card {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {}", path.display(), e))?;
        let card = parse_model_card(&text).map_err(|e| format!("{}: {}", path.display(), e))?;
        if let Some(name) = &card.name {
            tracing::info!(model = name.as_str(), path = %path.display(), "loaded model card");
        }
        card_mode = card.mode;
        params = card.params;
    }
    for (key, value) in &cli.params {
        params.insert(key.clone(), value.clone());
    }

    let mode = cli.mode.or(card_mode).unwrap_or_default();
    let mut device = build_device_params(&params, mode).map_err(|e| e.to_string())?;
    if let Some(model) = cli.model {
        device.model = model;
    }
    Ok(device)
}

/// Exponent notation with `significant` digits.
fn format_value(value: f64, significant: usize) -> String {
    format!("{:.*e}", significant.max(1) - 1, value)
}

fn print_run(run: &RunResult, precision: usize) {
    println!("{} {} {:?}", run.mode, run.model, run.analysis);
    match run.analysis {
        AnalysisType::Op => {
            if let Some(p) = run.points.first() {
                println!(
                    "region: {}, current: {}",
                    p.region,
                    format_value(p.current, precision)
                );
            }
        }
        AnalysisType::Sweep => {
            let terminal = run.sweep_terminal.unwrap_or(Terminal::Gate);
            println!("sweep {}: {} points", terminal, run.points.len());
            for p in &run.points {
                let value = match terminal {
                    Terminal::Gate => p.terminals.vg,
                    Terminal::Source => p.terminals.vs,
                    Terminal::Drain => p.terminals.vd,
                    Terminal::Body => p.terminals.vb,
                };
                println!(
                    "  {}={}  {:<9}  {}",
                    terminal,
                    format_value(value, precision),
                    p.region.as_str(),
                    format_value(p.current, precision)
                );
            }
        }
    }
}

fn serve(addr: String) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("failed to start runtime: {}", e);
            process::exit(1);
        });
    let config = mos_api::HttpServerConfig { bind_addr: addr };
    if let Err(e) = runtime.block_on(mos_api::run(config)) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
