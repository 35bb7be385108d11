//! change command - Changelist workflows

use super::Context;
use crate::core::types::ChangelistId;
use crate::ui::output;
use anyhow::Result;

/// Create a pending changelist and print its number.
pub fn change_create(ctx: &Context) -> Result<()> {
    let id = ctx.with_session(|session| session.create_changelist())?;
    output::value(id);
    Ok(())
}

/// Open files for edit.
pub fn change_edit(ctx: &Context, change: ChangelistId, paths: &[String]) -> Result<()> {
    ctx.with_session(|session| session.edit_files(change, paths))?;
    output::print(
        format!("Opened {} file(s) in change {}", paths.len(), change),
        ctx.verbosity,
    );
    Ok(())
}

/// Describe and submit a changelist.
pub fn change_commit(ctx: &Context, change: ChangelistId, message: &str) -> Result<()> {
    let submitted = ctx.with_session(|session| session.commit(change, message))?;

    output::print(
        format!("Submitted change {} ({} file(s))", change, submitted.len()),
        ctx.verbosity,
    );
    let lines: Vec<String> = submitted.iter().map(output::format_file).collect();
    if !lines.is_empty() {
        output::print(output::format_list(&lines, "  "), ctx.verbosity);
    }
    Ok(())
}

/// Revert all files and delete the changelist.
pub fn change_revert(ctx: &Context, change: ChangelistId) -> Result<()> {
    ctx.with_session(|session| session.revert(change))?;
    output::print(format!("Reverted change {}", change), ctx.verbosity);
    Ok(())
}

/// Delete a pending changelist.
pub fn change_delete(ctx: &Context, change: ChangelistId) -> Result<()> {
    if change.is_default() {
        output::warn("the default changelist is never deleted", ctx.verbosity);
        return Ok(());
    }
    ctx.with_session(|session| session.delete_changelist(change))?;
    output::print(format!("Deleted change {}", change), ctx.verbosity);
    Ok(())
}

/// Print the default changelist identifier.
///
/// Needs no connection.
pub fn change_default(_ctx: &Context) -> Result<()> {
    output::value(ChangelistId::DEFAULT);
    Ok(())
}
