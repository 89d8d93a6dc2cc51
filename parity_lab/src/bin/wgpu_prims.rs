use std::{env, path::PathBuf, process};

use anyhow::{bail, Context, Result};

use parity_lab::{
    case_io::{export_case_sets_to_json, import_case_sets_from_json},
    device::DeviceContext,
    suite::{build_case_sets, first_failures, run_suite},
};
use prim_core::config::HarnessSettings;
use tracer::init_tracing;

struct CliOptions {
    size: Option<usize>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    tolerance: Option<f32>,
    input_json: Option<PathBuf>,
    export_json: Option<PathBuf>,
    skip_dispatch: bool,
    unified: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let options = parse_options()?;
    let settings = resolve_settings(&options)?;

    let case_sets = if let Some(ref path) = options.input_json {
        println!("Loading parity case sets from {}", path.display());
        import_case_sets_from_json(path)?
    } else {
        println!(
            "Generating parity cases (size={}, base seed=0x{:X}, {} seeds)",
            settings.size,
            settings.base_seed,
            settings.seed_schedule().len()
        );
        build_case_sets(&settings)
    };

    if let Some(ref path) = options.export_json {
        export_case_sets_to_json(&case_sets, path)?;
        println!("Exported {} case sets to {}", case_sets.len(), path.display());
    }

    if options.skip_dispatch {
        println!("Skip-dispatch flag set; exiting after case preparation.");
        return Ok(());
    }

    let ctx = DeviceContext::new(settings.unified_memory).unwrap_or_else(|err| fatal(err));
    println!(
        "Running {} case sets on '{}' ({:?} buffers)",
        case_sets.len(),
        ctx.adapter_name(),
        ctx.strategy()
    );
    let outcome = run_suite(&ctx, &case_sets, &settings).unwrap_or_else(|err| fatal(err));

    for case in &outcome.cases {
        let status = if case.passed() { "ok" } else { "FAILED" };
        println!(
            "  {:<40} {:<24} {:>6} compared  {status}",
            case.label,
            case.kind,
            case.report.checked()
        );
    }
    for (label, failure) in first_failures(&outcome) {
        println!("  first failure in '{label}': {failure}");
    }

    let failed = outcome.failed_count();
    println!("{} of {} case sets passed", outcome.cases.len() - failed, outcome.cases.len());
    if failed > 0 {
        bail!("{failed} case set(s) diverged from the host reference");
    }
    Ok(())
}

fn fatal(err: parity_lab::HarnessError) -> ! {
    eprintln!("fatal device error: {err}");
    process::exit(err.exit_code());
}

fn resolve_settings(options: &CliOptions) -> Result<HarnessSettings> {
    let mut settings = match options.config {
        Some(ref path) => HarnessSettings::from_json_file(path)?,
        None => HarnessSettings::default(),
    }
    .apply_env();

    if let Some(size) = options.size {
        settings.size = size;
    }
    if let Some(seed) = options.seed {
        settings.base_seed = seed;
    }
    if options.tolerance.is_some() {
        settings.tolerance = options.tolerance;
    }
    if options.unified {
        settings.unified_memory = true;
    }
    Ok(settings)
}

fn parse_options() -> Result<CliOptions> {
    let mut opts = CliOptions {
        size: None,
        seed: None,
        config: None,
        tolerance: None,
        input_json: None,
        export_json: None,
        skip_dispatch: false,
        unified: false,
    };

    for arg in env::args().skip(1) {
        if let Some(value) = arg.strip_prefix("--size=") {
            opts.size = Some(value.parse().context("invalid --size value")?);
        } else if let Some(value) = arg.strip_prefix("--seed=") {
            opts.seed = Some(parse_seed(value).context("invalid --seed value")?);
        } else if let Some(value) = arg.strip_prefix("--config=") {
            opts.config = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--tolerance=") {
            opts.tolerance = Some(value.parse().context("invalid --tolerance value")?);
        } else if let Some(value) = arg.strip_prefix("--cases-json=") {
            opts.input_json = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--export-json=") {
            opts.export_json = Some(PathBuf::from(value));
        } else if arg == "--skip-dispatch" {
            opts.skip_dispatch = true;
        } else if arg == "--unified" {
            opts.unified = true;
        } else {
            bail!("unrecognized argument: {arg}");
        }
    }

    Ok(opts)
}

fn parse_seed(value: &str) -> Result<u64> {
    if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).context("expected hex literal")
    } else {
        value.parse().context("expected integer seed")
    }
}

mod tracer {
    use tracing_subscriber::EnvFilter;

    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
