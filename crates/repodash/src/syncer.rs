use std::path::Path;

use tokio::process::Command;
use tracing::{info, warn};

use repodash_core::display::branch_tail;
use repodash_core::RecordHandle;

use crate::evaluate::evaluate;

/// Captured result of one external command. Nonzero exit is data, not an
/// error; the caller decides what failure text is worth showing.
pub struct CommandOutput {
    pub success: bool,
    pub output: String,
}

/// Run `program` in `cwd` and capture stdout and stderr together. A
/// command that cannot even start yields its launch error as output.
/// No timeout: a hung command blocks only the worker that ran it.
pub async fn run_captured(program: &str, args: &[&str], cwd: &Path) -> CommandOutput {
    match Command::new(program).args(args).current_dir(cwd).output().await {
        Ok(done) => {
            let mut output = String::from_utf8_lossy(&done.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&done.stderr));
            CommandOutput {
                success: done.status.success(),
                output,
            }
        }
        Err(err) => CommandOutput {
            success: false,
            output: format!("failed to run {program}: {err}"),
        },
    }
}

/// The table renderer splits cell content on line breaks; a status
/// message must stay a single line or it corrupts the layout.
pub fn flatten_output(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ").trim().to_string()
}

pub fn sync_candidates(handles: &[RecordHandle]) -> Vec<RecordHandle> {
    handles
        .iter()
        .filter(|handle| handle.is_out_of_sync())
        .cloned()
        .collect()
}

/// Launch one independent pull+push worker per out-of-sync record.
/// Fire-and-forget: completion shows up through record mutation on a
/// later redraw. Returns the number of workers launched.
pub fn spawn_sync_all(handles: Vec<RecordHandle>) -> usize {
    let candidates = sync_candidates(&handles);
    let launched = candidates.len();
    for handle in candidates {
        tokio::spawn(sync_one(handle));
    }
    launched
}

/// Pull with rebase, push the current branch, then re-evaluate so every
/// derived field reflects the post-sync repository. Only this worker's
/// record is touched.
async fn sync_one(handle: RecordHandle) {
    let record = handle.snapshot();
    let path = record.path;
    let branch = branch_tail(&record.branch_ref).to_string();

    let pull = run_captured("git", &["pull", "--rebase", "--autostash"], &path).await;
    let push = run_captured("git", &["push", "origin", &branch], &path).await;

    if pull.success && push.success {
        info!(path = %path.display(), branch, "sync action finished");
    } else {
        warn!(path = %path.display(), branch, "sync action failed");
    }
    let message = flatten_output(&format!("{} {}", pull.output, push.output));
    handle.set_status_message(message);

    let eval_path = path.clone();
    match tokio::task::spawn_blocking(move || evaluate(&eval_path)).await {
        Ok(Ok(evaluated)) => handle.apply_evaluation(evaluated),
        Ok(Err(err)) => {
            warn!(path = %path.display(), error = %err, "re-evaluation after sync failed");
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "re-evaluation worker died");
        }
    }
}
