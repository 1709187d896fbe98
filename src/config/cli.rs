use crate::domain::model::{MovieForm, MovieId};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cartelera")]
#[command(about = "Manage the cinema movie catalog and print its billboard")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./cartelera.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the catalog file from the configuration
    #[arg(long, global = true)]
    pub store: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every movie in creation order
    List,
    /// Show one movie
    Get { id: i64 },
    /// Add a movie
    Create(MovieArgs),
    /// Replace all fields of a movie
    Update(UpdateArgs),
    /// Remove a movie
    Delete { id: i64 },
    /// Write the catalog report as PDF
    Export {
        /// Output directory (overrides report.output_path)
        #[arg(short, long)]
        output_dir: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct MovieArgs {
    #[arg(long)]
    pub title: String,

    /// Release date as YYYY-MM-DD
    #[arg(long)]
    pub release_date: String,

    #[arg(long, default_value = "")]
    pub genre: String,

    #[arg(long)]
    pub price: String,
}

impl MovieArgs {
    pub fn to_form(&self) -> MovieForm {
        MovieForm::new(
            self.title.clone(),
            self.release_date.clone(),
            self.genre.clone(),
            self.price.clone(),
        )
    }
}

#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    pub id: i64,

    /// Id carried by the submitted record; must match ID (defaults to ID)
    #[arg(long = "id")]
    pub record_id: Option<i64>,

    /// Version shown by `get` before editing
    #[arg(long)]
    pub version: u64,

    #[command(flatten)]
    pub movie: MovieArgs,
}

impl UpdateArgs {
    pub fn target(&self) -> MovieId {
        MovieId(self.id)
    }

    /// Builds the update form, defaulting the record id to the target id.
    pub fn to_form(&self) -> MovieForm {
        self.movie
            .to_form()
            .with_id(MovieId(self.record_id.unwrap_or(self.id)))
            .with_version(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = CliConfig::parse_from([
            "cartelera",
            "create",
            "--title",
            "Dune",
            "--release-date",
            "2021-10-22",
            "--genre",
            "Sci-Fi",
            "--price",
            "8.50",
        ]);

        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.to_form(), MovieForm::new("Dune", "2021-10-22", "Sci-Fi", "8.50"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_defaults_record_id() {
        let cli = CliConfig::parse_from([
            "cartelera",
            "--verbose",
            "update",
            "3",
            "--version",
            "2",
            "--title",
            "Dune",
            "--release-date",
            "2021-10-22",
            "--price",
            "9",
        ]);
        assert!(cli.verbose);

        let Command::Update(args) = cli.command else {
            panic!("expected update");
        };
        let form = args.to_form();
        assert_eq!(args.target(), MovieId(3));
        assert_eq!(form.id, Some(MovieId(3)));
        assert_eq!(form.version, Some(2));
        assert_eq!(form.genre, "");
    }

    #[test]
    fn test_parse_update_with_mismatched_record_id() {
        let cli = CliConfig::parse_from([
            "cartelera",
            "update",
            "3",
            "--id",
            "4",
            "--version",
            "1",
            "--title",
            "Dune",
            "--release-date",
            "2021-10-22",
            "--price",
            "9",
        ]);

        let Command::Update(args) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.to_form().id, Some(MovieId(4)));
    }

    #[test]
    fn test_update_requires_version() {
        let result = CliConfig::try_parse_from([
            "cartelera",
            "update",
            "3",
            "--title",
            "Dune",
            "--release-date",
            "2021-10-22",
            "--price",
            "9",
        ]);
        assert!(result.is_err());
    }
}
