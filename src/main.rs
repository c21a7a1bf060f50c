mod report;

use std::{env, fs, io};

use anyhow::{bail, Context, Result};
use log::info;
use orchestrator::configs::LdaConfig;
use topic_model::corpus::StopWords;

use report::Report;

const USAGE: &str = "usage: lda-orchestration <corpus> <stop_words> [config.json]";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let (Some(corpus), Some(stop_words)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };

    let config = match args.next() {
        Some(path) => LdaConfig::load(path)?,
        None => LdaConfig::default(),
    };

    let text = fs::read_to_string(&corpus).with_context(|| format!("reading corpus {corpus}"))?;
    let docs: Vec<&str> = text.lines().collect();
    let stop_words = StopWords::load(&stop_words)?;

    info!("fitting {} topics over {} documents", config.topics, docs.len());
    let output = orchestrator::fit(&docs, stop_words, &config)?;

    let report = Report::new(&output, docs.len());
    serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
    println!();

    Ok(())
}
