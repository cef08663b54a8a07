use anyhow::Result;

use dojo::config::DojoConfig;
use dojo::preflight::{ContainerStatus, Preflight, PullOutcome};
use dojo::runtime::{get_config, get_repos, get_runtime, set_runtime};
use dojo::startup::StartupContext;

pub async fn run_check(
    config: DojoConfig,
    no_github: bool,
    no_git: bool,
    no_container: bool,
) -> Result<()> {
    let mut ctx = StartupContext::new(config, Preflight::system())
        .with_github(!no_github)
        .with_git(!no_git)
        .with_container(!no_container);

    let state = ctx.ensure_all().await?;
    set_runtime(state);

    let Some(state) = get_runtime() else {
        return Ok(());
    };

    println!("✅ All startup checks passed");
    if let Some(config) = get_config() {
        println!("   Cache dir: {}", config.cache_dir.display());
    }
    if let Some(repos) = get_repos() {
        match repos.login() {
            Some(login) => println!("   GitHub: authenticated as {}", login),
            None => println!("   GitHub: anonymous"),
        }
        println!("   Lean 4: {}", repos.lean4().html_url);
        println!("   Lean 4 nightly: {}", repos.lean4_nightly().html_url);
    }
    if let Some(version) = &state.git_version {
        println!("   git: {}", version);
    }
    match &state.container {
        ContainerStatus::Skipped => println!("   Container: none"),
        ContainerStatus::Ready(PullOutcome::Pulled) => println!("   Container: docker (image up to date)"),
        ContainerStatus::Ready(PullOutcome::Failed(reason)) => {
            println!("   Container: docker (⚠️  image pull failed: {})", reason)
        }
    }

    Ok(())
}
