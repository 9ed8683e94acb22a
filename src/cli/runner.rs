//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::EtlConfig;
use crate::error::{Result, ResultExt};
use crate::orchestrator::{BatchOrchestrator, RunReport};
use crate::pipeline::{FileKind, Pipeline};
use crate::store::DuckDbStore;
use serde_json::{json, Value};
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Init { reset } => self.init(&config, *reset),
            Commands::Run {
                song_data,
                log_data,
            } => {
                let mut config = config;
                if let Some(path) = song_data {
                    config = config.with_song_data(path);
                }
                if let Some(path) = log_data {
                    config = config.with_log_data(path);
                }
                config.validate()?;
                self.load(&config, &[FileKind::Song, FileKind::Log])
            }
            Commands::Songs { path } => {
                let config = match path {
                    Some(path) => config.with_song_data(path),
                    None => config,
                };
                config.validate()?;
                self.load(&config, &[FileKind::Song])
            }
            Commands::Logs { path } => {
                let config = match path {
                    Some(path) => config.with_log_data(path),
                    None => config,
                };
                config.validate()?;
                self.load(&config, &[FileKind::Log])
            }
            Commands::Summary => self.summary(&config),
            Commands::Export { output } => self.export(&config, output),
        }
    }

    /// Configuration file merged with command-line overrides
    fn load_config(&self) -> Result<EtlConfig> {
        let mut config = EtlConfig::load(self.cli.config.as_deref())?;

        if let Some(database) = &self.cli.database {
            config = config.with_database(database.clone());
        }
        if let Some(ambiguity) = self.cli.ambiguity {
            config = config.with_ambiguity(ambiguity);
        }

        config.validate()?;
        Ok(config)
    }

    fn open_store(&self, config: &EtlConfig) -> Result<DuckDbStore> {
        let store = DuckDbStore::open(&config.database)?;
        tracing::info!("Using database {}", store.location());
        Ok(store)
    }

    /// Create the schema, optionally dropping it first
    fn init(&self, config: &EtlConfig, reset: bool) -> Result<()> {
        let store = self.open_store(config)?;

        if reset {
            store.reset_schema()?;
        } else {
            store.create_schema()?;
        }

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": if reset { "Schema reset" } else { "Schema ready" }
            }
        }));
        Ok(())
    }

    /// Load the requested file families, in order
    fn load(&self, config: &EtlConfig, kinds: &[FileKind]) -> Result<()> {
        let store = self.open_store(config)?;
        if config.create_schema {
            store.create_schema()?;
        }

        let pipeline = Pipeline::new(config.ambiguity);
        let orchestrator = BatchOrchestrator::new(&store, &pipeline);

        let mut report = RunReport::default();
        for kind in kinds {
            let root = match kind {
                FileKind::Song => &config.song_data,
                FileKind::Log => &config.log_data,
            };
            report.push(orchestrator.process_data(root, *kind)?);
        }

        let totals = report.totals();
        tracing::info!(
            "Loaded {} files: {} songs, {} songplays ({} resolved)",
            report.files_processed(),
            totals.songs,
            totals.songplays,
            totals.songplays_resolved
        );

        self.output_message(&json!({
            "type": "REPORT",
            "report": report,
            "totals": totals
        }));
        Ok(())
    }

    /// Print row counts per table
    fn summary(&self, config: &EtlConfig) -> Result<()> {
        let store = self.open_store(config)?;
        let counts = store
            .table_counts()
            .context("Failed to count rows (run `init` first?)")?;

        self.output_message(&json!({
            "type": "SUMMARY",
            "database": store.location(),
            "tables": counts
        }));
        Ok(())
    }

    /// Write every table to Parquet files
    fn export(&self, config: &EtlConfig, output: &Path) -> Result<()> {
        let store = self.open_store(config)?;
        let written = store.export_parquet(output)?;

        let files: Vec<String> = written
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        self.output_message(&json!({
            "type": "EXPORT",
            "files": files
        }));
        Ok(())
    }

    /// Output a message in the configured format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use clap::Parser;

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::parse_from(args))
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.yaml");
        std::fs::write(&path, "database: from-file.duckdb\nambiguity: first\n").unwrap();

        let runner = runner(&[
            "sparkify-etl",
            "--config",
            path.to_str().unwrap(),
            "--database",
            ":memory:",
            "summary",
        ]);
        let config = runner.load_config().unwrap();
        assert_eq!(config.database, ":memory:");
        assert_eq!(config.ambiguity, crate::pipeline::AmbiguityPolicy::First);
    }

    #[test]
    fn test_run_command_against_data_tree() {
        let dir = tempfile::tempdir().unwrap();
        let songs = dir.path().join("song_data");
        let logs = dir.path().join("log_data");
        std::fs::create_dir_all(&songs).unwrap();
        std::fs::create_dir_all(&logs).unwrap();
        std::fs::write(
            songs.join("s.json"),
            json!({
                "song_id": "S1", "title": "T", "artist_id": "A1", "year": 1,
                "duration": 1.5, "artist_name": "N", "artist_location": null,
                "artist_latitude": null, "artist_longitude": null
            })
            .to_string(),
        )
        .unwrap();
        std::fs::write(logs.join("l.json"), "").unwrap();
        let db = dir.path().join("warehouse.duckdb");

        runner(&[
            "sparkify-etl",
            "--database",
            db.to_str().unwrap(),
            "run",
            "--song-data",
            songs.to_str().unwrap(),
            "--log-data",
            logs.to_str().unwrap(),
        ])
        .run()
        .unwrap();

        let store = DuckDbStore::open(db.to_str().unwrap()).unwrap();
        assert_eq!(store.table_counts().unwrap().songs, 1);
    }

    #[test]
    fn test_empty_database_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let songs = dir.path().to_str().unwrap();

        for args in [
            vec!["sparkify-etl", "--database", "", "songs", songs],
            vec!["sparkify-etl", "--database", " ", "logs"],
            vec!["sparkify-etl", "--database", "", "init"],
            vec!["sparkify-etl", "--database", "", "summary"],
        ] {
            let err = runner(&args).run().unwrap_err();
            assert!(
                matches!(err, Error::Config { .. }),
                "{args:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_path_override_equal_to_other_root_is_rejected() {
        let err = runner(&["sparkify-etl", "songs", "data/log_data"])
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("song_data and log_data must differ"));
    }

    #[test]
    fn test_summary_without_schema_fails() {
        let err = runner(&["sparkify-etl", "--database", ":memory:", "summary"])
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("run `init` first"));
    }
}
