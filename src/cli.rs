//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};

/// Call a web console's `/api/` endpoints with session headers and retries.
#[derive(Debug, Parser)]
#[command(name = "console-api", disable_version_flag = true)]
pub struct Args {
    /// Path to config file (default: ./console.toml or ~/.config/console-api/console.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override the organization id sent with every request.
    #[arg(long = "org")]
    pub org: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print version and build metadata.
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// GET an endpoint; parameters travel in the query string.
    Get {
        path: String,
        /// Query parameter; repeat a key to send a list.
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// DELETE an endpoint; parameters travel in the query string.
    Delete {
        path: String,
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    /// POST a JSON object body.
    Post {
        path: String,
        /// JSON object sent as the request body.
        #[arg(long = "json", value_name = "BODY")]
        json: Option<String>,
    },
    /// POST files as multipart form data.
    Upload {
        path: String,
        /// File to attach under a form field.
        #[arg(long = "file", value_name = "KEY=FILE", required = true)]
        files: Vec<String>,
        /// JSON object sent alongside the files.
        #[arg(long = "json", value_name = "PARAMS")]
        json: Option<String>,
    },
    /// GET a binary body and write it to a file.
    Blob {
        path: String,
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Destination file.
        #[arg(short = 'o', long = "out")]
        out: String,
    },
    /// Print the absolute link the console would render for a target.
    Href {
        target: String,
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Treat the target as an in-app route even when it is not root-relative.
        #[arg(long = "internal")]
        internal: bool,
    },
}
