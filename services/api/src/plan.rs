use clap::Args;
use offer_planner::error::AppError;
use offer_planner::planning::{format_plan, plan_locally, LocalPlan, OptimizeError, ResponseShape};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// JSON request file in any accepted dialect
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Response shape (verbose or compact). Defaults to the request's dialect.
    #[arg(long, value_parser = crate::infra::parse_shape)]
    pub(crate) format: Option<ResponseShape>,
    /// Print the per-channel allocation as CSV instead of JSON
    #[arg(long)]
    pub(crate) csv: bool,
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let raw = std::fs::read(&args.input)?;
    let body: serde_json::Value = serde_json::from_slice(&raw)?;

    let plan = match plan_locally(&body) {
        Ok(plan) => plan,
        Err(OptimizeError::Validation(messages)) => {
            eprintln!("Request rejected:");
            for message in &messages {
                eprintln!("- {}", message);
            }
            return Err(OptimizeError::Validation(messages).into());
        }
        Err(other) => return Err(other.into()),
    };

    for warning in &plan.warnings {
        eprintln!("warning: {}", warning);
    }

    let stdout = std::io::stdout();
    if args.csv {
        write_channel_csv(&plan, stdout.lock())
    } else {
        write_plan_json(&plan, args.format, stdout.lock())
    }
}

pub(crate) fn write_plan_json<W: Write>(
    plan: &LocalPlan,
    format: Option<ResponseShape>,
    mut out: W,
) -> Result<(), AppError> {
    let shape = format.unwrap_or_else(|| plan.request.preferred_shape());
    serde_json::to_writer_pretty(&mut out, &format_plan(&plan.outcome, shape))
        .map_err(|err| AppError::Io(err.into()))?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn write_channel_csv<W: Write>(plan: &LocalPlan, out: W) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for result in &plan.outcome.channels {
        writer
            .serialize(result)
            .map_err(|err| AppError::Io(err.into()))?;
    }
    writer.flush()?;
    Ok(())
}
