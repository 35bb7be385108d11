//! label command - Create or delete labels

use super::Context;
use crate::core::types::ChangelistId;
use crate::ui::output;
use anyhow::Result;

/// Create a label pinned to `change`.
pub fn label_create(
    ctx: &Context,
    name: &str,
    description: &str,
    change: ChangelistId,
) -> Result<()> {
    ctx.with_session(|session| session.create_label(name, description, change))?;
    output::print(
        format!("Created label {} at {}", name, change.revision_spec()),
        ctx.verbosity,
    );
    Ok(())
}

/// Delete a label.
pub fn label_delete(ctx: &Context, name: &str) -> Result<()> {
    ctx.with_session(|session| session.delete_label(name))?;
    output::print(format!("Deleted label {}", name), ctx.verbosity);
    Ok(())
}
