use config_migrator::{BundledTemplate, ConfigMigrator, FileDocumentStore, Resource};

#[derive(Resource)]
#[resource(path = "demos/resources/config.yml")]
struct LatestConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let temp_dir = tempfile::tempdir()?;
    let data_dir = temp_dir.path();

    // A v1 config written by an older release (no use-tls yet)
    let v1_config = r#"
config-version: 1
server:
  host: production.example.com
  port: 443
motd: Hello from v1
"#;

    println!("Before migration:");
    println!("{}", v1_config);

    std::fs::write(data_dir.join("config.yml"), v1_config)?;

    let mut store = FileDocumentStore::init(data_dir, "config.yml")?;
    let migrator = ConfigMigrator::new(BundledTemplate::new(LatestConfig::NAME));

    migrator.migrate(&mut store)?;

    println!("After migration:");
    println!("{}", std::fs::read_to_string(data_dir.join("config.yml"))?);

    println!("Backup:");
    println!(
        "{}",
        std::fs::read_to_string(data_dir.join("backups/configs/config-1.yml"))?
    );

    Ok(())
}
