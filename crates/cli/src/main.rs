//! Command-line entry point: reads a market export and prints the analysis as JSON.

use anyhow::{bail, Context, Result};
use mercato_analytics::{AnalysisEngine, RankKey};
use mercato_core::Config;
use mercato_ingestion::MarketExport;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: mercato <export.json> [--config <config.json>] [--rank-by <key>]";

struct Args {
    export: PathBuf,
    config: Option<PathBuf>,
    rank_key: RankKey,
}

fn parse_rank_key(raw: &str) -> Result<RankKey> {
    Ok(match raw {
        "quality_score" => RankKey::QualityScore,
        "win_rate" => RankKey::WinRate,
        "value_efficiency" => RankKey::ValueEfficiency,
        "total_bids" => RankKey::TotalBids,
        "spent" => RankKey::Spent,
        "won" => RankKey::Won,
        other => bail!("unknown rank key '{other}'"),
    })
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut export = None;
    let mut config = None;
    let mut rank_key = RankKey::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--rank-by" => {
                let key = args.next().context("--rank-by needs a key")?;
                rank_key = parse_rank_key(&key)?;
            }
            "-h" | "--help" => bail!(USAGE),
            _ if export.is_none() => export = Some(PathBuf::from(arg)),
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        }
    }

    Ok(Args {
        export: export.context(USAGE)?,
        config,
        rank_key,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let export = MarketExport::from_json_file(&args.export)
        .with_context(|| format!("reading export {}", args.export.display()))?;
    info!(
        days = export.mercato.len(),
        teams = export.teams.len(),
        "Loaded export"
    );

    let engine = AnalysisEngine::for_export(config, &export)
        .context("invalid configuration")?
        .with_rank_key(args.rank_key);
    let (report, normalization) = engine.run_export(&export);

    if normalization.resolved == 0 {
        warn!("No resolved auctions in export");
    }

    println!("{}", report.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<Args> {
        parse_args(raw.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_export_only() {
        let parsed = args(&["export.json"]).unwrap();
        assert_eq!(parsed.export, PathBuf::from("export.json"));
        assert!(parsed.config.is_none());
        assert_eq!(parsed.rank_key, RankKey::QualityScore);
    }

    #[test]
    fn test_parse_options() {
        let parsed = args(&["--config", "cfg.json", "export.json", "--rank-by", "win_rate"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(parsed.rank_key, RankKey::WinRate);
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
        assert!(args(&["a.json", "--config"]).is_err());
        assert!(args(&["a.json", "--rank-by", "luck"]).is_err());
    }
}
