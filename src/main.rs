use anyhow::Context;
use clap::Parser;
use smithy_scaffold::utils::error::ErrorSeverity;
use smithy_scaffold::utils::logger;
use smithy_scaffold::{
    CliConfig, GenerationRunner, LocalStorage, ScaffoldConfig, ScaffoldError, Synthesizer, Workspace,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting smithy-scaffold");
    tracing::debug!("CLI config: {:?}", cli);

    let mut config = ScaffoldConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config file '{}'", cli.config))?;
    if let Some(root) = &cli.root {
        tracing::info!("🔧 Workspace root overridden to: {}", root);
        config.workspace.root = root.clone();
    }

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ smithy-scaffold failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &ScaffoldConfig) -> Result<(), ScaffoldError> {
    let workspace = Workspace::from_config(config)?;

    let synthesizer = Synthesizer::new(LocalStorage::new(workspace.root())).with_dry_run(cli.dry_run);
    for project in workspace.projects() {
        synthesizer.synthesize(&project.context).await?;
        if cli.dry_run {
            for step in project.context.generation_steps() {
                println!("[{}] {}", project.name(), step);
            }
        }
        println!(
            "📄 {} -> {}",
            project.name(),
            project.specification_path().display()
        );
    }

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - generation steps were not executed");
        return Ok(());
    }

    if cli.generate {
        let reports = GenerationRunner::new()
            .with_inherited_output(cli.verbose)
            .run_workspace(&workspace)
            .await?;
        println!("✅ Generated {} project(s)", reports.len());
    } else {
        println!("✅ Synthesized {} project(s); run with --generate to build them", workspace.projects().len());
    }

    Ok(())
}
