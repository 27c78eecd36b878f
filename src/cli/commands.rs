//! Command dispatch: one function per subcommand.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{CalculationReport, OrderCalculator};
use crate::application::{demo_order, load_order, IoResultExt, LoadedOrder};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings, LOCAL_CONFIG_FILE};
use crate::domain::{
    Catalog, DeliveryVisitor, DiscountVisitor, NodeId, TaxVisitor, TreeNodeConvert,
};
use crate::util::path::{ensure_file_exists, expand_path};

const VISITOR_NAMES: [&str; 3] = [DeliveryVisitor::NAME, TaxVisitor::NAME, DiscountVisitor::NAME];

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Calc { order, only }) => {
            let settings = load_settings(cli)?;
            let order = load_order(&resolve_order_path(order)?)?;
            cmd_calc(&settings, &order, only)
        }
        Some(Commands::Demo { only }) => {
            let settings = load_settings(cli)?;
            cmd_calc(&settings, &demo_order()?, only)
        }
        Some(Commands::Tree { order }) => {
            let order = load_order(&resolve_order_path(order)?)?;
            cmd_tree(&order)
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Init { global } => cmd_config_init(*global),
            ConfigCommands::Path => cmd_config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `cartcalc --help`".to_string(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let local = cli.config.as_deref().map(expand_path);
    Ok(Settings::load(local.as_deref())?)
}

fn resolve_order_path(path: &Path) -> CliResult<PathBuf> {
    let path = expand_path(path);
    ensure_file_exists(&path)?;
    Ok(path)
}

/// Build the calculator, keeping only the requested visitors.
fn build_calculator(settings: &Settings, only: &[String]) -> CliResult<OrderCalculator> {
    let mut calculator = OrderCalculator::with_visitors(settings)?;
    if only.is_empty() {
        return Ok(calculator);
    }
    let only: Vec<String> = only.iter().map(|name| name.trim().to_lowercase()).collect();
    if let Some(unknown) = only.iter().find(|name| !VISITOR_NAMES.contains(&name.as_str())) {
        return Err(CliError::InvalidArgs(format!(
            "unknown visitor '{}', expected one of: {}",
            unknown,
            VISITOR_NAMES.iter().join(", ")
        )));
    }
    calculator.retain(&only);
    Ok(calculator)
}

#[instrument(level = "debug", skip(settings, order))]
fn cmd_calc(settings: &Settings, order: &LoadedOrder, only: &[String]) -> CliResult<()> {
    let calculator = build_calculator(settings, only)?;
    debug!("visitors: {:?}", calculator.names());
    let report = calculator.run(&order.catalog, order.root)?;

    let root = order.catalog.node_ref(order.root)?;
    output::header(&format!("Order '{}'", root.name()));
    print_report(&order.catalog, order.root, &report)?;
    Ok(())
}

fn print_report(catalog: &Catalog, root: NodeId, report: &CalculationReport) -> CliResult<()> {
    let goods = catalog.price_excl_packaging(root)?;
    let price = catalog.price_incl_packaging(root)?;
    output::amount("goods", goods);
    output::amount("packaging", price - goods);
    for (name, value) in report.iter() {
        output::amount(name, value);
    }
    output::total("payable", report.total_payable(price));
    Ok(())
}

fn cmd_tree(order: &LoadedOrder) -> CliResult<()> {
    let catalog = &order.catalog;
    let root = catalog.node_ref(order.root)?;
    output::info(&root.to_tree_string());
    output::amount("weight", catalog.total_weight(order.root)?);
    output::amount("goods", catalog.price_excl_packaging(order.root)?);
    output::amount("with boxes", catalog.price_incl_packaging(order.root)?);
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            let status = if path.exists() { "exists" } else { "not found" };
            output::detail(&format!("global: {} ({})", path.display(), status));
        }
        None => output::warning("no home directory, global config disabled"),
    }
    let local = Path::new(LOCAL_CONFIG_FILE);
    let status = if local.exists() { "exists" } else { "not found" };
    output::detail(&format!("local:  {} ({})", local.display(), status));
    Ok(())
}

fn cmd_config_init(global: bool) -> CliResult<()> {
    let path = if global {
        global_config_path()
            .ok_or_else(|| CliError::Usage("cannot determine global config dir".to_string()))?
    } else {
        PathBuf::from(LOCAL_CONFIG_FILE)
    };
    if path.exists() {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_path_context("create config dir", parent)?;
    }
    std::fs::write(&path, Settings::template()).with_path_context("write config", &path)?;
    output::success(&format!("Created {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_calculator_filters_and_normalises_names() {
        let calculator =
            build_calculator(&Settings::default(), &[" Tax".to_string()]).unwrap();
        assert_eq!(calculator.names(), vec!["tax"]);
    }

    #[test]
    fn test_build_calculator_rejects_unknown_visitor() {
        let err = build_calculator(&Settings::default(), &["shipping".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgs(_)));
    }

    #[test]
    fn test_demo_runs() {
        let order = demo_order().unwrap();
        cmd_calc(&Settings::default(), &order, &[]).unwrap();
        cmd_tree(&order).unwrap();
    }
}
