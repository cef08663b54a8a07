use anyhow::{Context, Result};

use dojo::config::DojoConfig;
use dojo::constants::{DOCKER_TAG, LEAN3_DEPS_DIR, LEAN4_DEPS_DIR, MIN_GIT_VERSION, VERSION};

pub async fn run_config(config: &DojoConfig, json: bool) -> Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        println!("{}", text);
        return Ok(());
    }

    println!("LeanDojo {}", VERSION);
    println!("   Cache dir: {}", config.cache_dir.display());
    println!(
        "   Remote cache: {}{}",
        config.remote_cache_url,
        if config.disable_remote_cache {
            " (disabled)"
        } else {
            ""
        }
    );
    match &config.tmp_dir {
        Some(dir) => println!("   Temp dir: {}", dir.display()),
        None => println!("   Temp dir: system default"),
    }
    println!(
        "   Processes: {} ({} workers, max {})",
        config.num_procs, config.num_workers, config.max_num_procs
    );
    println!("   Load used deps only: {}", config.load_used_deps_only);
    println!(
        "   Tactics: timeout {} ms, {} CPU(s), memory {}",
        config.tactic_timeout_ms, config.tactic_cpu_limit, config.tactic_memory_limit
    );
    println!("   Container: {} ({})", config.container_mode, DOCKER_TAG);
    println!("   Min Lean 3: v{}", config.min_lean3_version);
    println!("   Min git: {}", MIN_GIT_VERSION);
    println!("   Deps dirs: {} (Lean 3), {} (Lean 4)", LEAN3_DEPS_DIR, LEAN4_DEPS_DIR);
    println!(
        "   GitHub: {} ({})",
        config.github_api_url,
        if config.has_github_token() {
            "token set"
        } else {
            "anonymous"
        }
    );

    Ok(())
}
