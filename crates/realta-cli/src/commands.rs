use clap::{Args, Parser, Subcommand};
use realta_core::xnat::ScanField;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "realta")]
#[command(about = "Classify and reconcile XNAT MR scan tags", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report the tag verdict of every family for the selected sessions
    Audit(AuditArgs),
    /// Prepend missing tags to scan notes for one session
    SetTags(SetTagsArgs),
    /// Compare scan types with a series description mapping
    SetTypes(SetTypesArgs),
    /// Set a single scan field
    Set(SetArgs),
    /// Print configuration values
    PrintConfig,
    /// Remove cached scan listings
    ClearCache,
}

/// Which XNAT instance to talk to.
#[derive(Debug, Args)]
pub struct XnatArgs {
    /// XNAT alias from the configuration
    #[arg(long, default_value = "cbscentral")]
    pub xnat: String,

    /// XNAT project
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub xnat: XnatArgs,

    /// Label of XNAT MR Session
    #[arg(long)]
    pub session: Option<String>,

    /// Hide OK and NO_MATCH_FOUND rows
    #[arg(long)]
    pub hide: bool,

    /// Serve scan listings from the local cache
    #[arg(long)]
    pub cache: bool,

    /// Tag rules file, overrides the configured one
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SetTagsArgs {
    #[command(flatten)]
    pub xnat: XnatArgs,

    /// Label of XNAT MR Session
    #[arg(long)]
    pub session: String,

    /// Write the planned updates as JSON
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Prompt to confirm every update
    #[arg(long)]
    pub confirm: bool,

    /// Execute updates
    #[arg(long)]
    pub do_updates: bool,

    #[arg(long)]
    pub cache: bool,

    /// Tag rules file, overrides the configured one
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SetTypesArgs {
    #[command(flatten)]
    pub xnat: XnatArgs,

    #[arg(long)]
    pub session: Option<String>,

    /// Series description to type CSV, overrides the configured one
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    #[arg(long)]
    pub confirm: bool,

    /// Execute updates
    #[arg(long)]
    pub do_updates: bool,

    #[arg(long)]
    pub cache: bool,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub xnat: XnatArgs,

    #[arg(long)]
    pub session: String,

    #[arg(long)]
    pub scan: String,

    /// note, type or quality
    #[arg(long)]
    pub field: ScanField,

    #[arg(long)]
    pub value: String,

    /// Execute the update
    #[arg(long)]
    pub do_updates: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_audit_defaults() {
        let cli = Cli::try_parse_from(["realta", "audit", "--project", "STAR"]).unwrap();
        match cli.command {
            Some(Commands::Audit(args)) => {
                assert_eq!(args.xnat.xnat, "cbscentral");
                assert_eq!(args.xnat.project.as_deref(), Some("STAR"));
                assert!(args.session.is_none());
                assert!(!args.hide);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_set_tags_requires_session() {
        assert!(Cli::try_parse_from(["realta", "set-tags"]).is_err());
        let cli = Cli::try_parse_from([
            "realta",
            "set-tags",
            "--session",
            "STAR01_MR1",
            "-o",
            "updates.json",
            "--do-updates",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::SetTags(args)) => {
                assert_eq!(args.output_file, Some(PathBuf::from("updates.json")));
                assert!(args.do_updates);
                assert!(!args.confirm);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_set_rejects_unknown_field() {
        assert!(Cli::try_parse_from([
            "realta", "set", "--session", "S", "--scan", "1", "--field", "series", "--value", "x",
        ])
        .is_err());
        let cli = Cli::try_parse_from([
            "realta", "set", "--session", "S", "--scan", "1", "--field", "quality", "--value",
            "usable",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Set(SetArgs { field: ScanField::Quality, .. }))
        ));
    }
}
