use clap::{Parser, ValueEnum};
use log::info;

use optpcasl::{
    ATTDist, BuxtonPcasl, CostMeasure, DOptimalCost, LOptimalCost, LdStrategy, Limits, Optimizer,
    PcaslProtocol, PhysParams, ScanParams,
};

/// Optimization target; determines the cost criterion.
///
/// Costs are not comparable between criteria: a D-optimal cost and an
/// L-optimal cost live on different scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    /// Minimize CBF variance (L-optimal).
    Cbf,
    /// Minimize ATT variance (L-optimal).
    Att,
    /// Minimize joint CBF/ATT uncertainty (D-optimal).
    Both,
}

#[derive(Parser)]
#[command(name = "optpcasl")]
#[command(about = "PCASL protocol optimizer: search PLDs and label durations for the most informative scan", long_about = None)]
struct Cli {
    /// Optimization target
    #[arg(long, value_enum, default_value_t = Target::Both)]
    optimize: Target,

    /// Perform an initial grid search before the main optimization loop
    #[arg(long, default_value_t = false)]
    init_gridsearch: bool,

    /// Max number of points in the initial grid search
    #[arg(long, default_value_t = 100_000)]
    init_gridsearch_npts: usize,

    /// Desired scan duration (s)
    #[arg(long, default_value_t = 300.0)]
    scan_duration: f64,

    /// Number of PLDs
    #[arg(long, default_value_t = 6)]
    scan_npld: usize,

    /// Scan readout (non-ASL) time (s)
    #[arg(long, default_value_t = 0.5)]
    scan_readout: f64,

    /// Labelling duration (s)
    #[arg(long, default_value_t = 1.4)]
    scan_ld: f64,

    /// Additive noise std.dev. relative to M0
    #[arg(long, default_value_t = 0.002)]
    scan_noise: f64,

    /// Number of slices in the acquisition
    #[arg(long, default_value_t = 1)]
    scan_nslices: usize,

    /// Time increase per slice for 2D readout (s)
    #[arg(long, default_value_t = 0.0)]
    scan_slicedt: f64,

    /// CBF value to optimize for (internal s^-1 units)
    #[arg(short, default_value_t = 50.0 / 6000.0)]
    f: f64,

    /// Starting value for ATT distribution (s)
    #[arg(long, default_value_t = 0.2)]
    att_start: f64,

    /// Ending value for ATT distribution (s)
    #[arg(long, default_value_t = 2.1)]
    att_end: f64,

    /// Step value for ATT distribution (s)
    #[arg(long, default_value_t = 0.001)]
    att_step: f64,

    /// Length of taper for ATT distribution (s)
    #[arg(long, default_value_t = 0.3)]
    att_taper: f64,

    /// Minimum PLD (s)
    #[arg(long, default_value_t = 0.1)]
    pld_min: f64,

    /// Maximum PLD (s)
    #[arg(long, default_value_t = 3.0)]
    pld_max: f64,

    /// Step to search for optimal PLDs (s)
    #[arg(long, default_value_t = 0.025)]
    pld_step: f64,

    /// Optimize over varying labelling durations
    #[arg(long, default_value_t = false)]
    optimize_ld: bool,

    /// Allow an independent label duration for each PLD
    #[arg(long, default_value_t = false, requires = "optimize_ld")]
    multi_ld: bool,

    /// Minimum LD (s)
    #[arg(long, default_value_t = 0.1)]
    ld_min: f64,

    /// Maximum LD (s)
    #[arg(long, default_value_t = 1.8)]
    ld_max: f64,

    /// Step to search for optimal LD (s)
    #[arg(long, default_value_t = 0.025)]
    ld_step: f64,
}

fn format_seconds(values: &ndarray::Array1<f64>) -> String {
    values.iter().map(|v| format!("{v:.3}")).collect::<Vec<_>>().join(", ")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let welcome = format!("OPTPCASL - PCASL protocol optimizer {}", env!("CARGO_PKG_VERSION"));
    println!("{welcome}");
    println!("{}", "=".repeat(welcome.len()));

    let phys = PhysParams::new(cli.f, cli.scan_noise)?;
    let att_dist = ATTDist::new(cli.att_start, cli.att_end, cli.att_step, cli.att_taper)?;
    let scan = ScanParams::new(
        cli.scan_duration,
        cli.scan_npld,
        cli.scan_readout,
        cli.scan_ld,
        cli.scan_noise,
        cli.scan_nslices,
        cli.scan_slicedt,
    )?;
    let pld_lims = Limits::new("PLD", cli.pld_min, cli.pld_max, cli.pld_step)?;

    let criterion: Box<dyn CostMeasure> = match cli.optimize {
        Target::Cbf => Box::new(LOptimalCost::cbf()),
        Target::Att => Box::new(LOptimalCost::att()),
        Target::Both => Box::new(DOptimalCost::new()),
    };

    let (strategy, ld_lims) = if cli.optimize_ld {
        let lims = Limits::new("LD", cli.ld_min, cli.ld_max, cli.ld_step)?;
        let strategy = if cli.multi_ld { LdStrategy::PerPld } else { LdStrategy::Shared };
        (strategy, Some(lims))
    } else {
        (LdStrategy::Fixed, None)
    };

    let model = BuxtonPcasl::new(phys);
    let protocol = PcaslProtocol::new(model, scan, att_dist, pld_lims, ld_lims, strategy)?;
    let optimizer = Optimizer::new(&protocol, criterion.as_ref());
    info!(
        "searching {} protocol with {} criterion",
        protocol.strategy().label(),
        optimizer.criterion_name()
    );

    let initial = if cli.init_gridsearch {
        Some(optimizer.gridsearch(cli.init_gridsearch_npts)?)
    } else {
        None
    };
    let output = optimizer.optimize(initial)?;

    println!();
    println!("Criterion: {}", optimizer.criterion_name());
    println!("Optimal PLDs: {}", format_seconds(&output.timing.plds));
    if protocol.strategy() != LdStrategy::Fixed {
        println!("Optimal label durations: {}", format_seconds(&output.timing.lds));
    }
    println!("Number of repeats: {}", output.num_av);
    println!("Scan time: {:.1}s", output.scan_time);
    println!("Cost: {:.6}", output.cost);
    println!("DONE");
    Ok(())
}
