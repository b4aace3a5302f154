//! `lingobridge config` — Configuration management commands.

use lingobridge_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            let registry = config.mode_registry()?;
            println!();
            println!("   Mode:        {}", registry.lookup(&config.default_mode).id);
            println!("   Modes:       {}", registry.len());
            println!("   Generation:  {} ({})", config.generation.backend, config.generation.api_url);
            println!("   Fallbacks:   {}", config.generation.fallback_urls.len());
            println!("   Translation: {} ({})", config.translation.backend, config.translation.api_url);
            println!("   Detector:    {}", config.translation.detector);
            println!(
                "   Languages:   display {}, bridge {}, intermediate {}",
                config.languages.display,
                config.languages.bridge_language().unwrap_or("off"),
                config.languages.intermediate
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Settings that load fine but probably are not what the user wants.
fn warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let registry = config.mode_registry().ok();
    if let Some(registry) = &registry {
        if !registry.contains(&config.default_mode) {
            warnings.push(format!(
                "default_mode '{}' is unknown; '{}' will be used",
                config.default_mode,
                registry.default_mode().id
            ));
        }
    }

    let display = &config.languages.display;
    if !config
        .languages
        .passthrough
        .iter()
        .any(|lang| lingobridge_core::same_language(lang, display))
    {
        warnings.push(format!(
            "passthrough languages do not include the display language '{display}'; every answer will be re-translated"
        ));
    }

    if config.translation.backend == "none" && config.languages.bridge_language().is_some() {
        warnings.push("translation backend is 'none' but a bridge language is set; questions reach the model untranslated".into());
    }

    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.generation.api_key.is_some() {
        config.generation.api_key = Some("***".into());
    }
    if config.translation.api_key.is_some() {
        config.translation.api_key = Some("***".into());
    }
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
