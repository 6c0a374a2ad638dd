//! Repo-scoped providers: base metadata, branch protection, branch rules,
//! and the full ruleset list.

use super::keys;
use crate::client::ClientError;
use crate::error::FetchError;
use crate::provider::{FetchCtx, FetcherBuilder, FetchSubject};
use crate::disposition::Disposition;
use repowarden_core::Priority;
use repowarden_core::Scope;

fn client_error_to_fetch(key: repowarden_core::DependencyKey, err: ClientError) -> FetchError {
    match err {
        ClientError::Status { status, message } => {
            FetchError::provider(key, format!("HTTP {status}: {message}"), Some(status))
        }
        ClientError::Transport { method, url, message } => {
            FetchError::provider(key, format!("{method} {url}: {message}"), None)
        }
    }
}

fn repo_path(ctx: &FetchCtx, suffix: &str) -> Result<String, FetchError> {
    match &ctx.subject {
        FetchSubject::Repo(repo) => {
            if suffix.is_empty() {
                Ok(format!("repos/{}", repo.full_name()))
            } else {
                Ok(format!("repos/{}{}", repo.full_name(), suffix))
            }
        }
        FetchSubject::Org(_) => unreachable!("repo-scoped provider called with an org subject"),
    }
}

pub fn register(builder: &mut FetcherBuilder) -> Result<(), FetchError> {
    builder.register_provider(
        keys::REPO_METADATA,
        Scope::Repo,
        Priority::Critical,
        Disposition::Hard,
        std::sync::Arc::new(|ctx| {
            Box::pin(async move {
                let path = repo_path(&ctx, "")?;
                let (value, meta) = ctx
                    .client
                    .get_json(&path)
                    .await
                    .map_err(|e| client_error_to_fetch(keys::REPO_METADATA, e))?;
                Ok((value, meta))
            })
        }),
    )?;

    builder.register_provider(
        keys::REPO_DEFAULT_BRANCH_PROTECTION,
        Scope::Repo,
        Priority::Governance,
        // Many forge plans gate branch protection behind a paid tier —
        // "forbidden" here is expected absence, not a scanner fault.
        Disposition::Skip,
        std::sync::Arc::new(|ctx| {
            Box::pin(async move {
                let path = repo_path(&ctx, "/branches/default/protection")?;
                let (value, meta) = ctx
                    .client
                    .get_json(&path)
                    .await
                    .map_err(|e| client_error_to_fetch(keys::REPO_DEFAULT_BRANCH_PROTECTION, e))?;
                Ok((value, meta))
            })
        }),
    )?;

    builder.register_provider(
        keys::REPO_DEFAULT_BRANCH_RULES,
        Scope::Repo,
        Priority::Governance,
        Disposition::Skip,
        std::sync::Arc::new(|ctx| {
            Box::pin(async move {
                let path = repo_path(&ctx, "/rules/branches/default")?;
                let (value, meta) = ctx
                    .client
                    .get_json(&path)
                    .await
                    .map_err(|e| client_error_to_fetch(keys::REPO_DEFAULT_BRANCH_RULES, e))?;
                Ok((value, meta))
            })
        }),
    )?;

    builder.register_provider(
        keys::REPO_ALL_RULESETS,
        Scope::Repo,
        Priority::Extra,
        Disposition::Hard,
        std::sync::Arc::new(|ctx| {
            Box::pin(async move {
                let path = repo_path(&ctx, "/rulesets")?;
                let (value, meta) = ctx
                    .client
                    .get_json(&path)
                    .await
                    .map_err(|e| client_error_to_fetch(keys::REPO_ALL_RULESETS, e))?;
                Ok((value, meta))
            })
        }),
    )?;

    Ok(())
}
