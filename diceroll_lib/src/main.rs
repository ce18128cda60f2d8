use std::{
	env,
	io,
	path::PathBuf,
};

use anyhow::Context;
use diceroll_lib::{
	bootstrap,
	config::AppConfig,
	dice_store,
	dice_utils::strategy::StrategyKind,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Rolls every dice expression given on the command line and prints each roll as a JSON line.
///
/// Usage: `diceroll [--config <path>] [--strategy <standard|advantage|disadvantage>] <dice>...`
fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(io::stderr)
		.init();

	let mut config_path: Option<PathBuf> = None;
	let mut strategy: Option<StrategyKind> = None;
	let mut notations = Vec::new();

	let mut args = env::args().skip(1);
	while let Some(arg) = args.next() {
		match arg.as_str() {
			"--config" => {
				config_path = Some(PathBuf::from(args.next().context("--config needs a path")?));
			},
			"--strategy" => {
				let name = args.next().context("--strategy needs a name")?;
				strategy = Some(name.parse()?);
			},
			_ => notations.push(arg),
		}
	}
	if notations.is_empty() {
		notations.push(String::from("1d20"));
	}

	let config = AppConfig::load(config_path.as_deref())?;
	let container = bootstrap(config);
	let store = dice_store(&container)?;

	for notation in notations {
		let record = store.roll(&notation, strategy).with_context(|| format!("couldn't roll {:?}", notation))?;
		println!("{}", serde_json::to_string(&*record)?);
	}

	debug!(pending = store.network().pending(), "finished rolling");
	return Ok(());
}
