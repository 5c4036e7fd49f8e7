use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use repodash_core::RecordSet;

use crate::evaluate::evaluate;

/// Worker-pool size when the caller has no opinion: one evaluation per
/// available processing unit.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Discovery may hand back the same root more than once when start
/// directories overlap; keep the first occurrence of each.
pub fn dedup_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    roots.into_iter().filter(|root| seen.insert(root.clone())).collect()
}

/// Evaluate every root under a pool of at most `concurrency` workers and
/// collect the results into a fresh record set. Only repositories that
/// evaluate successfully and have a remote are appended; everything else
/// is logged and excluded. Returns once every worker has finished, so
/// the set is complete and its order final.
pub async fn scan(roots: Vec<PathBuf>, concurrency: usize) -> Arc<RecordSet> {
    let set = Arc::new(RecordSet::new());
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut workers = JoinSet::new();

    for root in dedup_roots(roots) {
        let set = Arc::clone(&set);
        let semaphore = Arc::clone(&semaphore);
        workers.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let eval_root = root.clone();
            // Evaluation blocks on libgit2; keep it off the runtime
            // threads, and take no lock around it.
            match tokio::task::spawn_blocking(move || evaluate(&eval_root)).await {
                Ok(Ok(record)) if record.has_remote => {
                    set.append(record);
                }
                Ok(Ok(_)) => {
                    debug!(path = %root.display(), "no remote named origin; excluded");
                }
                Ok(Err(err)) => {
                    warn!(path = %root.display(), error = %err, "evaluation failed; excluded");
                }
                Err(err) => {
                    warn!(path = %root.display(), error = %err, "evaluation worker died");
                }
            }
        });
    }

    while workers.join_next().await.is_some() {}
    set
}
