use std::{
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::Local;
use registry::{
    transfer::export_file_name, views, Change, ClaimRequest, Decision, ImageUpload, Registry,
    ReportDraft,
};
use shared::{
    domain::{ClaimId, ItemId, ItemStatus, ReportId, Role},
    error::{AppError, ErrorCode},
};
use storage::{KeyValueStore, Persisted};
use tracing::info;

use crate::Command;

/// Source of yes/no answers for destructive commands.
pub trait Prompter {
    fn decide(&mut self, prompt: &str) -> Result<Decision>;
}

pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn decide(&mut self, prompt: &str) -> Result<Decision> {
        let mut stderr = io::stderr();
        write!(stderr, "{prompt} [y/N] ")?;
        stderr.flush()?;
        let mut answer = String::new();
        io::stdin()
            .read_line(&mut answer)
            .context("failed to read confirmation")?;
        Ok(Decision::from_answer(&answer))
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}

fn require_admin<S: KeyValueStore>(registry: &Registry<S>) -> Result<(), AppError> {
    if registry.role().is_admin() {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorCode::Validation,
            "this command needs the admin role; run `temu-balik role admin` first",
        ))
    }
}

fn note_persistence(out: &mut impl Write, persisted: Persisted) -> io::Result<()> {
    if !persisted.is_saved() {
        writeln!(out, "note: storage unavailable, change kept for this session only")?;
    }
    Ok(())
}

fn decide(prompter: &mut dyn Prompter, assume_yes: bool, prompt: &str) -> Result<Decision> {
    if assume_yes {
        return Ok(Decision::Confirmed);
    }
    prompter.decide(prompt)
}

async fn read_image(path: &Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image '{}'", path.display()))?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(ImageUpload { bytes, mime_type })
}

pub(crate) async fn run<S: KeyValueStore>(
    registry: &mut Registry<S>,
    command: Command,
    out: &mut impl Write,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    match command {
        Command::Role { role: None } => {
            writeln!(out, "role={}", role_label(registry.role()))?;
        }
        Command::Role { role: Some(role) } => {
            let persisted = registry.set_role(role.into()).await;
            writeln!(out, "role={}", role_label(registry.role()))?;
            note_persistence(out, persisted)?;
        }
        Command::Gallery { query } => {
            let items = registry.public_gallery(&query);
            if items.is_empty() {
                writeln!(out, "no items match \"{}\"", query.trim())?;
            }
            for item in items {
                writeln!(out, "{}\t{}\t{}\t{}", item.id, item.date, item.title, item.location)?;
            }
        }
        Command::Show { item_id } => {
            let snapshot = registry.snapshot();
            let item = snapshot.item(&ItemId(item_id.clone())).ok_or_else(|| {
                AppError::new(ErrorCode::NotFound, format!("item {item_id} not found"))
            })?;
            writeln!(out, "id: {}", item.id)?;
            writeln!(out, "title: {}", item.title)?;
            writeln!(out, "location: {}", item.location)?;
            writeln!(out, "date: {}", item.date)?;
            let status = match item.status {
                ItemStatus::Available => "available",
                ItemStatus::Claimed => "claimed",
            };
            writeln!(out, "status: {status}")?;
            if let Some(description) = &item.description {
                writeln!(out, "description: {description}")?;
            }
            if let Some(contact) = &item.contact {
                writeln!(out, "contact: {contact}")?;
            }
            writeln!(out, "image: {}", if item.image.is_some() { "yes" } else { "no" })?;
        }
        Command::Report {
            title,
            location,
            date,
            description,
            contact,
            image,
        } => {
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            let report_id = registry
                .submit_report(ReportDraft {
                    title,
                    description,
                    location,
                    date,
                    contact,
                    image,
                })
                .await?;
            writeln!(out, "queued report_id={report_id}; an admin will verify it")?;
        }
        Command::Claim {
            item_id,
            name,
            contact,
            note,
        } => {
            let claim_id = registry
                .submit_claim(ClaimRequest {
                    item_id: ItemId(item_id),
                    name,
                    contact,
                    note,
                })
                .await?;
            writeln!(out, "submitted claim_id={claim_id}")?;
        }
        Command::Queue { query } => {
            require_admin(registry)?;
            let entries = registry.queue_matching(&query);
            if entries.is_empty() {
                writeln!(out, "queue is empty")?;
            }
            for (n, entry) in entries.iter().enumerate() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    n + 1,
                    entry.id,
                    entry.date,
                    entry.title,
                    entry.location
                )?;
            }
        }
        Command::Approve { report_id } => {
            require_admin(registry)?;
            match registry.approve(&ReportId(report_id.clone())).await {
                Change::Applied { value, persisted } => {
                    writeln!(out, "approved report_id={report_id} item_id={value}")?;
                    note_persistence(out, persisted)?;
                }
                Change::Unchanged => writeln!(out, "no queued report {report_id}")?,
            }
        }
        Command::Reject { report_id } => {
            require_admin(registry)?;
            match registry.reject(&ReportId(report_id.clone())).await {
                Change::Applied { persisted, .. } => {
                    writeln!(out, "rejected report_id={report_id}")?;
                    note_persistence(out, persisted)?;
                }
                Change::Unchanged => writeln!(out, "no queued report {report_id}")?,
            }
        }
        Command::Claims => {
            require_admin(registry)?;
            let snapshot = registry.snapshot();
            let pending = views::pending_claims(&snapshot);
            if pending.is_empty() {
                writeln!(out, "no pending claims")?;
            }
            for entry in pending {
                let title = entry.item.map(|i| i.title.as_str()).unwrap_or("<missing item>");
                writeln!(
                    out,
                    "{}\t{}\t{}\t{} <{}>",
                    entry.claim.id, entry.claim.item_id, title, entry.claim.name, entry.claim.contact
                )?;
            }
        }
        Command::AcceptClaim { claim_id } => {
            require_admin(registry)?;
            match registry.accept_claim(&ClaimId(claim_id.clone())).await {
                Change::Applied { persisted, .. } => {
                    writeln!(out, "accepted claim_id={claim_id}")?;
                    note_persistence(out, persisted)?;
                }
                Change::Unchanged => {
                    writeln!(out, "claim {claim_id} is not pending or its item is gone")?
                }
            }
        }
        Command::RejectClaim { claim_id } => {
            require_admin(registry)?;
            match registry.reject_claim(&ClaimId(claim_id.clone())).await {
                Change::Applied { persisted, .. } => {
                    writeln!(out, "rejected claim_id={claim_id}")?;
                    note_persistence(out, persisted)?;
                }
                Change::Unchanged => writeln!(out, "claim {claim_id} is not pending")?,
            }
        }
        Command::Stats => {
            require_admin(registry)?;
            let stats = registry.dashboard_stats();
            writeln!(out, "available={} claimed={}", stats.available, stats.claimed)?;
            for (date, count) in stats.per_date {
                writeln!(out, "{date}\t{count}")?;
            }
        }
        Command::Export { out: path } => {
            require_admin(registry)?;
            let path =
                path.unwrap_or_else(|| export_file_name(Local::now().date_naive()).into());
            let document = registry.export()?;
            tokio::fs::write(&path, document)
                .await
                .with_context(|| format!("failed to write export '{}'", path.display()))?;
            info!(path = %path.display(), "state exported");
            writeln!(out, "exported to {}", path.display())?;
        }
        Command::Import { path, yes } => {
            require_admin(registry)?;
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read import '{}'", path.display()))?;
            let raw = String::from_utf8(bytes).map_err(|_| {
                AppError::malformed_import(format!("{} is not a UTF-8 text file", path.display()))
            })?;
            let intent = registry.import_intent(&raw)?;
            let decision = decide(prompter, yes, intent.prompt())?;
            let confirmed = intent.resolve(decision)?;
            let persisted = registry.import(confirmed).await;
            let snapshot = registry.snapshot();
            writeln!(
                out,
                "imported items={} queue={} claims={}",
                snapshot.items.len(),
                snapshot.queue.len(),
                snapshot.claims.len()
            )?;
            note_persistence(out, persisted)?;
        }
        Command::Reset { yes } => {
            require_admin(registry)?;
            let intent = registry.reset_intent();
            let decision = decide(prompter, yes, intent.prompt())?;
            let confirmed = intent.resolve(decision)?;
            let persisted = registry.reset(confirmed).await;
            writeln!(out, "reset to demo data")?;
            note_persistence(out, persisted)?;
        }
    }

    Ok(())
}
