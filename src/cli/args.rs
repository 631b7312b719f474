//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Organizational chart editor: hierarchical positions, teams with leaders, JSON import/export
#[derive(Parser, Debug)]
#[command(name = "orgchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug logging (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Data directory (overrides config and ORGCHART_BASE_DIR)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a chart with a single root node
    New {
        /// Chart name
        name: Option<String>,
        /// Chart description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// List saved charts, most recently updated first
    List,

    /// Show a chart's tree and groups
    Show {
        /// Chart id or name
        chart: String,
    },

    /// Delete a saved chart
    Delete {
        /// Chart id or name
        chart: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Edit nodes of a chart
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Manage groups (teams) of a chart
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Export a chart as JSON
    Export {
        /// Chart id or name
        chart: String,
        /// Output directory (default: <base_dir>/exports)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,
        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Import a chart from a JSON file and save it
    Import {
        /// JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Keep the record id from the file (overwrite instead of creating a new chart)
        #[arg(long)]
        keep_id: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Add a child node
    Add {
        /// Chart id or name
        chart: String,
        /// Parent node id
        parent: String,
        /// Name of the new node
        #[arg(short, long)]
        name: Option<String>,
        /// Position of the new node
        #[arg(short, long)]
        position: Option<String>,
    },

    /// Change name and/or position of a node
    Edit {
        /// Chart id or name
        chart: String,
        /// Node id (interactive selection if omitted)
        node: Option<String>,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New position
        #[arg(short, long)]
        position: Option<String>,
    },

    /// Delete a node and its subtree
    Rm {
        /// Chart id or name
        chart: String,
        /// Node id (interactive selection if omitted)
        node: Option<String>,
    },

    /// Show a node and its path from the root
    Find {
        /// Chart id or name
        chart: String,
        /// Node id
        node: String,
    },

    /// List all nodes in tree order
    List {
        /// Chart id or name
        chart: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a group
    Add {
        /// Chart id or name
        chart: String,
        /// Group name
        name: String,
        /// Group description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// Remove a group
    Rm {
        /// Chart id or name
        chart: String,
        /// Group id
        group: String,
    },

    /// Add a node to a group
    Assign {
        /// Chart id or name
        chart: String,
        /// Group id
        group: String,
        /// Node id
        node: String,
        /// Make the node a leader of the group
        #[arg(short, long)]
        leader: bool,
    },

    /// Remove a node from a group
    Unassign {
        /// Chart id or name
        chart: String,
        /// Group id
        group: String,
        /// Node id
        node: String,
    },

    /// Show groups with their resolved leaders and members
    Show {
        /// Chart id or name
        chart: String,
    },

    /// Drop group references to nodes that no longer exist
    Prune {
        /// Chart id or name
        chart: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Create the global config file from a template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the global config file path
    Path,
}
