use clap::{Args, Parser, Subcommand, ValueEnum};
use tessera_vcard::VCardVersion;

#[derive(Debug, Parser)]
#[command(name = "tessera", version, about = "Convert vCards between syntaxes and versions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read cards from stdin and write them to stdout in another syntax.
    Convert(ConvertArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Syntax of the input.
    #[arg(long, value_enum)]
    pub from: Syntax,

    /// Syntax of the output.
    #[arg(long, value_enum)]
    pub to: Syntax,

    /// Version to write ("2.1", "3.0" or "4.0"). Defaults to the configured
    /// text version; xCard and jCard only accept 4.0, hCard only 3.0.
    #[arg(long, value_parser = parse_version)]
    pub target_version: Option<VCardVersion>,

    /// Leave out the PRODID property.
    #[arg(long)]
    pub no_prodid: bool,

    /// Indent xCard and jCard output.
    #[arg(long)]
    pub pretty: bool,

    /// Print every warning to stderr as a JSON report.
    #[arg(long)]
    pub json_warnings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Syntax {
    /// Plain-text vCard (.vcf).
    Text,
    /// xCard (RFC 6351).
    Xml,
    /// jCard (RFC 7095).
    Json,
    /// hCard microformat.
    Html,
}

fn parse_version(value: &str) -> Result<VCardVersion, String> {
    VCardVersion::parse(value)
        .ok_or_else(|| format!("unsupported vCard version \"{value}\" (expected 2.1, 3.0 or 4.0)"))
}
