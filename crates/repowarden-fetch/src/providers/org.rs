//! Org-scoped providers: data cached once per owning organization across
//! every repo in the scan.

use super::keys;
use crate::client::ClientError;
use crate::disposition::Disposition;
use crate::error::FetchError;
use crate::provider::{FetchCtx, FetcherBuilder, FetchSubject};
use repowarden_core::{Priority, Scope};

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

fn org_name(ctx: &FetchCtx) -> &str {
    match &ctx.subject {
        FetchSubject::Org(owner) => owner,
        FetchSubject::Repo(_) => unreachable!("org-scoped provider called with a repo subject"),
    }
}

pub fn register(builder: &mut FetcherBuilder) -> Result<(), FetchError> {
    builder.register_provider(
        keys::ORG_MERGE_BASELINE,
        Scope::Org,
        Priority::Governance,
        Disposition::Hard,
        std::sync::Arc::new(|ctx| {
            Box::pin(async move {
                let path = format!("orgs/{}/merge-baseline", org_name(&ctx));
                let (value, meta) = ctx
                    .client
                    .get_json(&path)
                    .await
                    .map_err(|e| client_error_to_fetch(keys::ORG_MERGE_BASELINE, e))?;
                Ok((value, meta))
            })
        }),
    )?;

    Ok(())
}
