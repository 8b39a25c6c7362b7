// Post review commands

use async_lock::RwLock;
use clap::Subcommand;
use portal_app::{workflows, AppCore, BatchAction, BatchOutcome, Outcome, Platform, Post, PostId};
use portal_core::PhysicalTime;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum PostsCommand {
    /// List posts grouped by status
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Submit a new post for review
    Submit {
        /// Post copy
        body: String,

        /// Target platforms (facebook, instagram, linkedin, x, tiktok)
        #[arg(short, long, value_delimiter = ',', required = true)]
        platforms: Vec<Platform>,
    },

    /// Approve one post
    Approve {
        /// Post id
        id: String,

        /// Publish slot, milliseconds since the epoch
        #[arg(long)]
        at_ms: Option<u64>,
    },

    /// Approve every pending post
    ApproveAll,

    /// Approve the given pending posts
    ApproveSelected {
        /// Post ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Send one post back for changes
    RequestEdit {
        /// Post id
        id: String,

        /// What to change
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Send the given pending posts back for changes
    RequestEditSelected {
        /// What to change
        #[arg(short, long, default_value = "")]
        note: String,

        /// Post ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Return an edited post to review
    Resubmit {
        /// Post id
        id: String,

        /// Replacement copy
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Mark a scheduled post as published
    Publish {
        /// Post id
        id: String,
    },
}

pub async fn run(app: &Arc<RwLock<AppCore>>, command: PostsCommand) -> anyhow::Result<()> {
    match command {
        PostsCommand::List { json } => {
            let state = workflows::load_posts(app).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state.to_vec())?);
            } else {
                for post in state.iter() {
                    print_post(post);
                }
            }
        }
        PostsCommand::Submit { body, platforms } => {
            let post = workflows::submit_post(app, &body, &platforms).await?;
            println!("Submitted {}", post.id());
        }
        PostsCommand::Approve { id, at_ms } => {
            let at = at_ms.map(PhysicalTime::from_ms);
            report_single(workflows::approve_post(app, &PostId::from(id.as_str()), at).await?);
        }
        PostsCommand::ApproveAll => {
            report_batch(workflows::approve_all(app).await?);
        }
        PostsCommand::ApproveSelected { ids } => {
            let ids = to_ids(&ids);
            report_batch(workflows::approve_selected(app, &ids, BatchAction::Approve).await?);
        }
        PostsCommand::RequestEdit { id, note } => {
            report_single(workflows::request_edit(app, &PostId::from(id.as_str()), &note).await?);
        }
        PostsCommand::RequestEditSelected { note, ids } => {
            let ids = to_ids(&ids);
            report_batch(workflows::request_edit_selected(app, &ids, &note).await?);
        }
        PostsCommand::Resubmit { id, body } => {
            report_single(workflows::resubmit(app, &PostId::from(id.as_str()), body).await?);
        }
        PostsCommand::Publish { id } => {
            report_single(workflows::publish(app, &PostId::from(id.as_str())).await?);
        }
    }

    let status = workflows::sync_status(app).await;
    if let Some(message) = status.message {
        println!("Sync: {} ({message})", status.level);
    }
    Ok(())
}

fn to_ids(raw: &[String]) -> Vec<PostId> {
    raw.iter().map(|s| PostId::from(s.as_str())).collect()
}

fn print_post(post: &Post) {
    let platforms: Vec<&str> = post.platforms().iter().map(|p| p.as_str()).collect();
    let slot = post
        .published_at()
        .or(post.scheduled_at())
        .map(|t| t.ts_ms.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<16} {:<15} {:<14} {:<24} {}",
        post.id().as_str(),
        post.status().as_str(),
        slot,
        platforms.join(","),
        post.body()
    );
    if let Some(note) = post.edit_note() {
        println!("{:<16} note: {note}", "");
    }
}

fn report_single(outcome: Outcome<Post>) {
    match outcome {
        Outcome::Applied(post) => println!("{} is now {}", post.id(), post.status().as_str()),
        Outcome::Refused(refusal) => println!("Nothing changed: {refusal:?}"),
    }
}

fn report_batch(outcome: Outcome<BatchOutcome>) {
    match outcome {
        Outcome::Applied(batch) => {
            println!("Updated {} post(s)", batch.applied.len());
            if !batch.skipped.is_empty() {
                let skipped: Vec<&str> = batch.skipped.iter().map(PostId::as_str).collect();
                println!("Skipped: {}", skipped.join(", "));
            }
        }
        Outcome::Refused(refusal) => println!("Nothing changed: {refusal:?}"),
    }
}
