use anyhow::{Context, Result};

use dojo::config::DojoConfig;
use dojo::github::RepoClient;

pub async fn run_repo(config: &DojoConfig, url: &str) -> Result<()> {
    let client = RepoClient::build(config).await?;

    let repo = client
        .repo_for_url(url, 1)
        .await
        .with_context(|| format!("Failed to resolve {}", url))?;
    let sha = client
        .latest_commit(url)
        .await
        .with_context(|| format!("Failed to get the latest commit of {}", url))?;

    println!("{}", repo.full_name);
    println!("   URL: {}", repo.html_url);
    println!("   Clone: {}", repo.clone_url);
    println!("   Default branch: {}", repo.default_branch);
    if let Some(pushed_at) = repo.pushed_at {
        println!("   Last push: {}", pushed_at.to_rfc3339());
    }
    println!("   Latest commit: {}", sha);

    Ok(())
}
