use config_migrator::{ConfigMigrator, DocumentStore, FileDocumentStore, FileTemplate, MigratorOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let temp_dir = tempfile::tempdir()?;
    let data_dir = temp_dir.path();

    std::fs::write(
        data_dir.join("app.toml"),
        "schema = 1\nname = \"my-app\"\nworkers = 16\n",
    )?;
    std::fs::write(
        data_dir.join("app.template.toml"),
        "schema = 2\nname = \"app\"\nworkers = 4\n\n[cache]\nttl = 60\n",
    )?;

    let options = MigratorOptions::builder()
        .version_path("schema")
        .backup_path("old-configs")
        .build()?;

    let mut store = FileDocumentStore::init(data_dir, "app.toml")?;
    let migrator =
        ConfigMigrator::with_options(FileTemplate::new(data_dir.join("app.template.toml")), options);

    println!(
        "installed: {}, latest: {}",
        migrator.installed_version(&store),
        migrator.latest_version()?
    );

    if migrator.migrate(&mut store)? {
        println!("migrated to schema {}", store.version("schema"));
        println!("{}", std::fs::read_to_string(store.raw_file_path())?);
    }

    Ok(())
}
