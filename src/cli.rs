use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Generate readable color palettes and keep the ones you like.
#[derive(Parser, Debug)]
#[command(name = "lazytints", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Account email for commands that need a signed-in user
    #[arg(long, global = true, env = "LAZYTINTS_EMAIL")]
    pub email: Option<String>,

    /// Account password for commands that need a signed-in user
    #[arg(long, global = true, env = "LAZYTINTS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a random palette
    Generate {
        /// Dark or light palette family
        #[arg(short, long, value_enum, default_value_t = ThemeMode::Light)]
        mode: ThemeMode,

        /// Print a colored terminal preview of the palette
        #[arg(long)]
        preview: bool,

        /// Export format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,

        /// Write the export to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the export to `<name>-palette.<ext>` in the current directory
        #[arg(long, conflicts_with = "output")]
        download: bool,

        /// Save the palette to your account (needs --email and --password)
        #[arg(long)]
        save: bool,

        /// Do not report generation and download counts
        #[arg(long)]
        no_stats: bool,

        /// Copy one color of the palette to the clipboard
        #[arg(long, value_enum, value_name = "ROLE")]
        copy: Option<ColorRole>,
    },

    /// Copy a color of one of your saved palettes to the clipboard
    Copy {
        id: String,

        #[arg(value_enum)]
        role: ColorRole,
    },

    /// Pick black or white text for a background color
    Contrast {
        /// Background color as #RRGGBB
        background: String,
    },

    /// Register a new account
    SignUp,

    /// Confirm an email address with the token from the verification mail
    Verify {
        token: String,
    },

    /// List your saved palettes, newest first
    List,

    /// Delete one of your saved palettes
    Delete {
        id: String,
    },

    /// Show global generation and download counts
    Stats,

    /// Create the saved palettes table if it does not exist
    InitDb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
}

/// One of the five colors of a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Background,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Text,
    Css,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_defaults() {
        let args = Args::try_parse_from(["lazytints", "generate"]).unwrap();
        match args.command {
            Command::Generate {
                mode,
                format,
                output,
                download,
                save,
                ..
            } => {
                assert_eq!(mode, ThemeMode::Light);
                assert_eq!(format, ExportFormat::Text);
                assert!(output.is_none());
                assert!(!download);
                assert!(!save);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn output_conflicts_with_download() {
        let err = Args::try_parse_from(["lazytints", "generate", "-o", "p.css", "--download"]);
        assert!(err.is_err());
    }

    #[test]
    fn credentials_are_global() {
        let args = Args::try_parse_from([
            "lazytints",
            "list",
            "--email",
            "a@example.com",
            "--password",
            "pw",
        ])
        .unwrap();
        assert_eq!(args.email.as_deref(), Some("a@example.com"));
        assert_eq!(args.password.as_deref(), Some("pw"));
        assert!(matches!(args.command, Command::List));
    }

    #[test]
    fn copy_takes_a_role() {
        let args = Args::try_parse_from(["lazytints", "generate", "--copy", "accent"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Generate {
                copy: Some(ColorRole::Accent),
                ..
            }
        ));

        let args = Args::try_parse_from(["lazytints", "copy", "abc", "text"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Copy { ref id, role: ColorRole::Text } if id == "abc"
        ));

        assert!(Args::try_parse_from(["lazytints", "copy", "abc", "border"]).is_err());
    }

    #[test]
    fn verify_takes_token() {
        let args = Args::try_parse_from(["lazytints", "verify", "tok-123"]).unwrap();
        assert!(matches!(args.command, Command::Verify { token } if token == "tok-123"));
    }
}
