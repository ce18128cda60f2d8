mod dice_store;

use crate::config::AppConfig;

/// Config with a fixed seed so failures can be reproduced
pub(crate) fn seeded_config() -> AppConfig {
	return AppConfig {
		seed: Some(7),
		..AppConfig::default()
	};
}
