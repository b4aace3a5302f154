//! `lingobridge modes` — List the available modes.

use lingobridge_config::AppConfig;
use lingobridge_core::mode::{ModeConfig, ModeConfigRegistry};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = config.mode_registry()?;
    print!("{}", render(&registry, &config.default_mode));
    Ok(())
}

fn render(registry: &ModeConfigRegistry, active: &str) -> String {
    let active = registry.lookup(active).id.clone();
    let mut out = String::from("\n  Available modes:\n\n");
    for mode in registry.modes() {
        let marker = if mode.id == active { "*" } else { " " };
        out.push_str(&format!("  {marker} {:<10} {}\n", mode.id, mode.description));
        out.push_str(&format!("               {}\n", summary(mode)));
    }
    out.push_str("\n  * = starting mode\n\n");
    out
}

fn summary(mode: &ModeConfig) -> String {
    let g = &mode.generation;
    format!(
        "max_new_tokens {}, temperature {}, beams {}, context {} turns, input {} tokens",
        g.max_new_tokens, g.temperature, g.beam_count, mode.max_context_turns, mode.max_input_length
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_builtin_modes_and_marks_active() {
        let out = render(&ModeConfigRegistry::default(), "SMART");
        assert!(out.contains("  * smart"));
        assert!(out.contains("    fast"));
        assert!(out.contains("max_new_tokens 128"));
        assert!(out.contains("context 5 turns"));
    }

    #[test]
    fn unknown_active_marks_default() {
        let out = render(&ModeConfigRegistry::default(), "turbo");
        assert!(out.contains("  * balanced"));
    }
}
