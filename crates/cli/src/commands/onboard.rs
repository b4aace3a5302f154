//! `lingobridge onboard` — First-time setup.

use lingobridge_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("LingoBridge — First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Point [generation].api_url at your text-generation-inference server");
        println!("   2. Point [translation].api_url at a LibreTranslate server (or set backend = \"none\")");
        println!("   3. Run: lingobridge doctor");
        println!("   4. Run: lingobridge chat\n");
    }

    println!("Setup complete! Run `lingobridge chat` to start chatting.\n");

    Ok(())
}
