//! `lingobridge doctor` — Diagnose configuration and services.

use lingobridge_config::AppConfig;
use lingobridge_providers::build_from_config;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 LingoBridge Doctor — System Diagnostics");
    println!("=========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `lingobridge onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  {} issue(s) found. See above for details.", issues + 1);
            return Ok(());
        }
    };

    let services = build_from_config(&config);
    match services.generator.health_check().await {
        Ok(true) => println!("  ✅ Generation service reachable ({})", services.generator.name()),
        Ok(false) => {
            println!("  ❌ Generation service unhealthy ({})", services.generator.name());
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Generation service unreachable: {e}");
            issues += 1;
        }
    }

    println!(
        "  ℹ️  Translation: {} via {} (detector: {})",
        services.translator.name(),
        config.translation.api_url,
        services.detector.name()
    );

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
