//! Command dispatch: each subcommand loads a chart, edits it through an
//! `EditorSession` and saves the resulting snapshot.

use std::io::{self, BufRead};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::render::{render_groups, render_tree};
use crate::application::EditorSession;
use crate::cli::args::{Cli, Commands, ConfigCommands, GroupCommands, NodeCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{DomainError, NodeId, NodeUpdate};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, SelectionItem};
use crate::infrastructure::InfraError;

/// Run the parsed command line.
pub fn execute(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    dispatch(&ServiceContainer::new(settings), command)
}

/// Run a chart command against the given services.
pub fn dispatch(container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::New { name, description } => {
            cmd_new(container, name.as_deref(), description.as_deref())
        }
        Commands::List => cmd_list(container),
        Commands::Show { chart } => cmd_show(container, chart),
        Commands::Delete { chart, yes } => cmd_delete(container, chart, *yes),
        Commands::Node { command } => node_command(container, command),
        Commands::Group { command } => group_command(container, command),
        Commands::Export {
            chart,
            output,
            stdout,
        } => cmd_export(container, chart, output.as_deref(), *stdout),
        Commands::Import { file, keep_id } => cmd_import(container, file, *keep_id),
        Commands::Config { command } => config_command(container, command),
        Commands::Completion { .. } => Err(CliError::Usage(
            "completion is handled before services are created".into(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load()?;
    Ok(match &cli.base_dir {
        Some(dir) => settings.with_base_dir(dir.clone()),
        None => settings,
    })
}

fn open_session(container: &ServiceContainer, chart: &str) -> CliResult<EditorSession> {
    let service = container.chart_service();
    let chart = service.load(chart)?;
    debug!("open_session: chart {:?} with {} nodes", chart.id, chart.data.count());
    Ok(service.session(chart))
}

fn save_session(container: &ServiceContainer, session: EditorSession) -> CliResult<()> {
    container.chart_service().save(session.into_chart())?;
    Ok(())
}

/// Use the given node id, or let the user pick one from the flattened tree.
fn resolve_node(
    container: &ServiceContainer,
    session: &EditorSession,
    node: Option<&str>,
    prompt: &str,
) -> CliResult<NodeId> {
    if let Some(id) = node {
        return Ok(NodeId::from(id));
    }
    let items: Vec<SelectionItem> = session
        .flatten()
        .into_iter()
        .map(|s| SelectionItem {
            display: format!("{} [{}]", s, s.id),
            value: s.id.to_string(),
        })
        .collect();
    let selected = container
        .selector
        .select_one(&items, prompt)
        .map_err(|message| InfraError::Selector { message })?;
    match selected {
        Some(item) => Ok(NodeId::from(item.value)),
        None => Err(CliError::Aborted),
    }
}

fn confirm(question: &str) -> CliResult<bool> {
    output::prompt(&format!("{question} [y/N]"));
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| InfraError::io("read confirmation", e))?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

// ============================================================
// charts
// ============================================================

#[instrument(skip(container))]
fn cmd_new(
    container: &ServiceContainer,
    name: Option<&str>,
    description: Option<&str>,
) -> CliResult<()> {
    let service = container.chart_service();
    let chart = service.save(service.new_chart(name, description))?;
    output::success(&format!("Created chart '{}'", chart.name));
    output::detail(&format!("id:   {}", chart.id.as_deref().unwrap_or("-")));
    output::detail(&format!("root: {}", chart.root_id()));
    Ok(())
}

fn cmd_list(container: &ServiceContainer) -> CliResult<()> {
    let charts = container.chart_service().list()?;
    if charts.is_empty() {
        output::info("No charts yet. Create one with `orgchart new <name>`.");
        return Ok(());
    }
    for chart in charts {
        let updated = chart
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        output::info(&format!(
            "{}  {}  {}  ({} nodes, {} groups)",
            chart.id.as_deref().unwrap_or("-"),
            updated,
            chart.name,
            chart.data.count(),
            chart.groups.len()
        ));
        if let Some(description) = chart.description.as_deref().filter(|d| !d.is_empty()) {
            output::detail(description);
        }
    }
    Ok(())
}

fn cmd_show(container: &ServiceContainer, chart: &str) -> CliResult<()> {
    let session = open_session(container, chart)?;
    let chart = session.chart();
    output::header(&chart.name);
    if let Some(description) = chart.description.as_deref().filter(|d| !d.is_empty()) {
        output::detail(description);
    }
    let shape = session.shape()?;
    output::detail(&format!(
        "{} nodes, {} levels, {} leaves",
        shape.nodes, shape.depth, shape.leaves
    ));
    output::info(&render_tree(&chart.data));
    if !chart.groups.is_empty() {
        output::info(&render_groups(chart));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_delete(container: &ServiceContainer, chart: &str, yes: bool) -> CliResult<()> {
    let service = container.chart_service();
    let chart = service.load(chart)?;
    let id = chart
        .id
        .clone()
        .ok_or_else(|| CliError::Usage(format!("chart '{}' has no id", chart.name)))?;
    if !yes && !confirm(&format!("Delete chart '{}'?", chart.name))? {
        return Err(CliError::Aborted);
    }
    service.delete(&id)?;
    output::action("Deleted", &chart.name);
    Ok(())
}

fn cmd_export(
    container: &ServiceContainer,
    chart: &str,
    dir: Option<&std::path::Path>,
    stdout: bool,
) -> CliResult<()> {
    let session = open_session(container, chart)?;
    if stdout {
        output::info(&session.export_json()?);
        return Ok(());
    }
    let dir = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| container.settings.exports_dir());
    let path = container
        .export_service()
        .export_json(session.chart(), &dir)?;
    output::action("Exported", &path.display());
    Ok(())
}

fn cmd_import(container: &ServiceContainer, file: &std::path::Path, keep_id: bool) -> CliResult<()> {
    let chart = container.export_service().import_json(file, keep_id)?;
    let saved = container.chart_service().save(chart)?;
    output::success(&format!("Imported chart '{}'", saved.name));
    output::detail(&format!("id: {}", saved.id.as_deref().unwrap_or("-")));
    Ok(())
}

// ============================================================
// nodes
// ============================================================

fn node_command(container: &ServiceContainer, command: &NodeCommands) -> CliResult<()> {
    match command {
        NodeCommands::Add {
            chart,
            parent,
            name,
            position,
        } => {
            let mut session = open_session(container, chart)?;
            let parent = NodeId::from(parent.as_str());
            if session.find_node(&parent).is_none() && !session.policy().strict_node_ids {
                output::warning(&format!("parent node not found, chart unchanged: {parent}"));
                return Ok(());
            }
            let id = session.add_child(&parent, name.as_deref(), position.as_deref())?;
            save_session(container, session)?;
            output::success(&format!("Added node {id}"));
            Ok(())
        }
        NodeCommands::Edit {
            chart,
            node,
            name,
            position,
        } => {
            let update = NodeUpdate {
                name: name.clone(),
                position: position.clone(),
            };
            if update.is_empty() {
                return Err(CliError::InvalidArgs(
                    "nothing to change: pass --name and/or --position".into(),
                ));
            }
            let mut session = open_session(container, chart)?;
            let id = resolve_node(container, &session, node.as_deref(), "edit> ")?;
            session.update_node(&id, &update)?;
            save_session(container, session)?;
            output::success(&format!("Updated node {id}"));
            Ok(())
        }
        NodeCommands::Rm { chart, node } => {
            let mut session = open_session(container, chart)?;
            let id = resolve_node(container, &session, node.as_deref(), "delete> ")?;
            let removed = session.delete_node(&id)?;
            if removed.is_empty() {
                output::warning(&format!("node not found, chart unchanged: {id}"));
                return Ok(());
            }
            save_session(container, session)?;
            output::success(&format!("Deleted {} node(s)", removed.len()));
            Ok(())
        }
        NodeCommands::Find { chart, node } => {
            let session = open_session(container, chart)?;
            let id = NodeId::from(node.as_str());
            let found = session
                .find_node(&id)
                .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;
            let path = session.path_to(&id)?;
            output::header(&found.summary());
            output::detail(&format!("id:       {}", found.id));
            output::detail(&format!(
                "path:     {}",
                path.iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" > ")
            ));
            output::detail(&format!("depth:    {}", path.len()));
            output::detail(&format!("children: {}", found.children.len()));
            Ok(())
        }
        NodeCommands::List { chart } => {
            let session = open_session(container, chart)?;
            for summary in session.flatten() {
                output::info(&format!(
                    "{}\t{}\t{}",
                    summary.id, summary.name, summary.position
                ));
            }
            Ok(())
        }
    }
}

// ============================================================
// groups
// ============================================================

fn group_command(container: &ServiceContainer, command: &GroupCommands) -> CliResult<()> {
    match command {
        GroupCommands::Add {
            chart,
            name,
            description,
        } => {
            let mut session = open_session(container, chart)?;
            let id = session.add_group(name, description.clone());
            save_session(container, session)?;
            output::success(&format!("Created group '{name}'"));
            output::detail(&format!("id: {id}"));
            Ok(())
        }
        GroupCommands::Rm { chart, group } => {
            let mut session = open_session(container, chart)?;
            let removed = session.remove_group(group)?;
            save_session(container, session)?;
            output::action("Removed group", &removed.name);
            Ok(())
        }
        GroupCommands::Assign {
            chart,
            group,
            node,
            leader,
        } => {
            let mut session = open_session(container, chart)?;
            let id = NodeId::from(node.as_str());
            if session.find_node(&id).is_none() {
                output::warning(&format!("node {id} is not in the chart"));
            }
            let changed = session.assign(group, &id, *leader)?;
            if changed {
                save_session(container, session)?;
                let role = if *leader { "leader" } else { "member" };
                output::success(&format!("Assigned {id} as {role}"));
            } else {
                output::info("Already assigned, nothing changed");
            }
            Ok(())
        }
        GroupCommands::Unassign { chart, group, node } => {
            let mut session = open_session(container, chart)?;
            let id = NodeId::from(node.as_str());
            if session.unassign(group, &id)? {
                save_session(container, session)?;
                output::success(&format!("Removed {id} from group"));
            } else {
                output::info("Not assigned, nothing changed");
            }
            Ok(())
        }
        GroupCommands::Show { chart } => {
            let session = open_session(container, chart)?;
            output::info(&render_groups(session.chart()));
            Ok(())
        }
        GroupCommands::Prune { chart } => {
            let mut session = open_session(container, chart)?;
            let pruned = session.prune_stale_references();
            if pruned > 0 {
                save_session(container, session)?;
            }
            output::action("Pruned references", &pruned);
            Ok(())
        }
    }
}

// ============================================================
// config
// ============================================================

fn config_command(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&path.display()),
                None => output::warning("no config directory available on this platform"),
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("no config directory available on this platform".into())
            })?;
            init_config(container.fs.as_ref(), &path, *force)?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}

/// Write the commented settings template to `path`.
fn init_config(fs: &dyn FileSystem, path: &Path, force: bool) -> CliResult<()> {
    if fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "config already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    debug!("init_config: wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;
    use crate::infrastructure::traits::RealFileSystem;

    /// Real filesystem that records every path written through it
    #[derive(Default)]
    struct RecordingFileSystem {
        written: Mutex<Vec<std::path::PathBuf>>,
    }

    impl FileSystem for RecordingFileSystem {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            RealFileSystem.read_to_string(path)
        }
        fn write(&self, path: &Path, content: &str) -> io::Result<()> {
            self.written.lock().unwrap().push(path.to_path_buf());
            RealFileSystem.write(path, content)
        }
        fn exists(&self, path: &Path) -> bool {
            RealFileSystem.exists(path)
        }
        fn is_file(&self, path: &Path) -> bool {
            RealFileSystem.is_file(path)
        }
        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            RealFileSystem.create_dir_all(path)
        }
        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            RealFileSystem.rename(from, to)
        }
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            RealFileSystem.remove_file(path)
        }
        fn ensure_parent(&self, path: &Path) -> io::Result<()> {
            RealFileSystem.ensure_parent(path)
        }
    }

    #[test]
    fn given_missing_config_when_initializing_then_template_written_through_fs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/orgchart/orgchart.toml");
        let fs = RecordingFileSystem::default();

        init_config(&fs, &path, false).unwrap();

        assert_eq!(*fs.written.lock().unwrap(), vec![path.clone()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), Settings::template());
    }

    #[test]
    fn given_existing_config_when_initializing_without_force_then_usage_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("orgchart.toml");
        std::fs::write(&path, "root_name = \"Keep\"\n").unwrap();
        let fs = RecordingFileSystem::default();

        let err = init_config(&fs, &path, false).unwrap_err();

        assert!(matches!(err, CliError::Usage(_)));
        assert!(fs.written.lock().unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "root_name = \"Keep\"\n");
    }

    #[test]
    fn given_existing_config_when_initializing_with_force_then_overwritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("orgchart.toml");
        std::fs::write(&path, "root_name = \"Old\"\n").unwrap();

        init_config(&RealFileSystem, &path, true).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), Settings::template());
    }
}
